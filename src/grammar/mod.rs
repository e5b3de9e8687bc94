mod types;

pub use types::*;

use crate::fields::{Confidence, Field, FieldSet, Identification, Mode, Timestamp};
use once_cell::sync::Lazy;
use regex::Regex;

// Photographer name code, five letters: "DaKle"
static PHOTOGRAPHER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{5}$").unwrap());

// Site string: <country>-<area>-<site>, e.g. "IDN-Bangka-HRS"
static SITE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}-[A-Za-z]+-[A-Z0-9]{3}$").unwrap());

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}-\d{2}-\d{2}$").unwrap());

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());
static LOWER_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]+$").unwrap());
static HYPHEN_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\-]+$").unwrap());
static FAMILY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0?-?[A-Za-z]+$").unwrap());
static CONFIDENCE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2}$").unwrap());

// Camera tag: <maker initial>-<model>, e.g. "S-A7IV"
static CAMERA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]-[A-Za-z0-9]+$").unwrap());

fn pattern_for(field: Field) -> Option<(&'static Regex, &'static str)> {
    let entry: (&'static Regex, &'static str) = match field {
        Field::Family => (&*FAMILY_REGEX, "letters, optionally prefixed by '0-'"),
        Field::Genus => (&*WORD_REGEX, "letters"),
        Field::Species => (&*LOWER_WORD_REGEX, "lowercase letters"),
        Field::Confidence => (&*CONFIDENCE_REGEX, "two lowercase letters"),
        Field::LifeStage => (&*WORD_REGEX, "letters"),
        Field::ColorVariant | Field::Behavior => (&*HYPHEN_WORD_REGEX, "letters or '-'"),
        Field::Photographer => (&*PHOTOGRAPHER_REGEX, "five letters"),
        Field::Site => (&*SITE_REGEX, "AAA-Area-XXX"),
        Field::Activity => (&*WORD_REGEX, "letters"),
        Field::Camera => (&*CAMERA_REGEX, "X-Model"),
        _ => return None,
    };
    Some(entry)
}

/// Whether a value fits the sub-grammar of its slot.
/// Slots without a sub-grammar (stem, head, extension) always match.
pub fn matches_pattern(field: Field, value: &str) -> bool {
    pattern_for(field).map_or(true, |(re, _)| re.is_match(value))
}

/// Human-readable description of a slot's sub-grammar
pub fn pattern_description(field: Field) -> &'static str {
    pattern_for(field).map_or("any text", |(_, desc)| desc)
}

pub fn is_site_code(value: &str) -> bool {
    SITE_REGEX.is_match(value)
}

pub fn is_camera_tag(value: &str) -> bool {
    CAMERA_REGEX.is_match(value)
}

/// Split a filename into stem and extension. A leading dot is not an extension separator.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < filename.len() => {
            (&filename[..idx], Some(&filename[idx + 1..]))
        }
        _ => (filename, None),
    }
}

/// Normalize a raw file stem into a single token by dropping delimiters
pub fn sanitize_stem(stem: &str) -> String {
    stem.chars().filter(|&c| c != DELIMITER).collect()
}

/// Layout of an existing filename, if it follows one of the fixed grammars
pub fn detect_layout(filename: &str) -> Option<Layout> {
    if parse(filename, Mode::Identify).is_ok() {
        Some(Layout::Identified)
    } else if parse(filename, Mode::Basic).is_ok() {
        Some(Layout::Basic)
    } else {
        None
    }
}

/// Assemble a filename from fields under the given mode.
///
/// Pure and deterministic. Reference-table membership is not checked here.
pub fn assemble(fields: &FieldSet, mode: Mode) -> Result<String, AssembleError> {
    let mut tokens: Vec<&str> = Vec::new();

    match mode {
        Mode::Basic => push_basic(&mut tokens, fields, mode)?,
        Mode::Identify => {
            let id = fields.identification.as_ref().ok_or(AssembleError::MissingField {
                mode,
                field: Field::Family,
            })?;
            push_identification(&mut tokens, id);
            push_basic(&mut tokens, fields, mode)?;
        }
        Mode::Edit => {
            if let Some(id) = &fields.identification {
                push_identification(&mut tokens, id);
            }
            push_basic(&mut tokens, fields, mode)?;
        }
        Mode::Meta => {
            tokens.extend(fields.head.iter().map(String::as_str));
            push_segment_and_stem(&mut tokens, fields, mode)?;
        }
    }

    let mut name = tokens.join("_");
    if let Some(ext) = &fields.extension {
        name.push('.');
        name.push_str(ext);
    }
    Ok(name)
}

fn require<'a>(value: &'a Option<String>, mode: Mode, field: Field) -> Result<&'a str, AssembleError> {
    value
        .as_deref()
        .ok_or(AssembleError::MissingField { mode, field })
}

fn push_identification<'a>(tokens: &mut Vec<&'a str>, id: &'a Identification) {
    tokens.push(id.family.as_deref().unwrap_or(FAMILY_PLACEHOLDER));
    tokens.push(id.genus.as_deref().unwrap_or(GENUS_PLACEHOLDER));
    tokens.push(id.species.as_deref().unwrap_or(SPECIES_PLACEHOLDER));
    tokens.push(ID_SEPARATOR);
    tokens.push(id.confidence.map(|c| c.code()).unwrap_or(UNSPECIFIED));
    tokens.push(id.life_stage.as_deref().unwrap_or(UNSPECIFIED));
    tokens.push(id.color_variant.as_deref().unwrap_or(UNSPECIFIED));
    tokens.push(id.behavior.as_deref().unwrap_or(UNSPECIFIED));
}

fn push_basic<'a>(
    tokens: &mut Vec<&'a str>,
    fields: &'a FieldSet,
    mode: Mode,
) -> Result<(), AssembleError> {
    tokens.push(require(&fields.photographer_code, mode, Field::Photographer)?);
    tokens.push(require(&fields.site_code, mode, Field::Site)?);
    let timestamp = fields.timestamp.as_ref().ok_or(AssembleError::MissingField {
        mode,
        field: Field::Timestamp,
    })?;
    // One slot, two tokens
    tokens.push(timestamp.as_str());
    tokens.push(require(&fields.activity_code, mode, Field::Activity)?);
    push_segment_and_stem(tokens, fields, mode)
}

fn push_segment_and_stem<'a>(
    tokens: &mut Vec<&'a str>,
    fields: &'a FieldSet,
    mode: Mode,
) -> Result<(), AssembleError> {
    if fields.gps_marker {
        tokens.push(GPS_MARKER);
    }
    if let Some(camera) = &fields.camera_tag {
        tokens.push(camera);
    }
    tokens.push(require(&fields.original_stem, mode, Field::OriginalStem)?);
    Ok(())
}

/// Parse a filename back into fields under the given mode.
///
/// Edit mode accepts either fixed layout; which one is decided by the
/// separator token position.
pub fn parse(filename: &str, mode: Mode) -> Result<FieldSet, ParseError> {
    let (stem, extension) = split_extension(filename);
    if stem.is_empty() {
        return Err(ParseError::Empty);
    }

    let tokens: Vec<&str> = stem.split(DELIMITER).collect();

    let mut fields = match mode {
        Mode::Basic => parse_basic(&tokens, 0, mode, stem)?,
        Mode::Identify => parse_identified(&tokens, mode, stem)?,
        Mode::Edit => {
            if tokens.get(3) == Some(&ID_SEPARATOR) {
                parse_identified(&tokens, mode, stem)?
            } else {
                parse_basic(&tokens, 0, mode, stem)?
            }
        }
        Mode::Meta => parse_meta(&tokens)?,
    };

    fields.extension = extension.map(str::to_string);
    Ok(fields)
}

fn check_token(tokens: &[&str], index: usize, field: Field) -> Result<String, ParseError> {
    let token = tokens[index];
    if token.is_empty() || !matches_pattern(field, token) {
        return Err(ParseError::InvalidToken {
            position: index + 1,
            field,
            token: token.to_string(),
            expected: pattern_description(field),
        });
    }
    Ok(token.to_string())
}

fn placeholder_to_none(value: String, placeholder: &str) -> Option<String> {
    if value == placeholder {
        None
    } else {
        Some(value)
    }
}

fn token_count_error(tokens: &[&str], mode: Mode, min: usize, name: &str) -> ParseError {
    ParseError::TokenCount {
        mode,
        min,
        max: min + 2,
        found: tokens.len(),
        name: name.to_string(),
    }
}

fn parse_identified(tokens: &[&str], mode: Mode, name: &str) -> Result<FieldSet, ParseError> {
    if tokens.len() < IDENTIFY_TOKENS || tokens.len() > IDENTIFY_TOKENS + 2 {
        return Err(token_count_error(tokens, mode, IDENTIFY_TOKENS, name));
    }

    let family = check_token(tokens, 0, Field::Family)?;
    let genus = check_token(tokens, 1, Field::Genus)?;
    let species = check_token(tokens, 2, Field::Species)?;

    if tokens[3] != ID_SEPARATOR {
        return Err(ParseError::InvalidToken {
            position: 4,
            field: Field::Separator,
            token: tokens[3].to_string(),
            expected: "'B'",
        });
    }

    let confidence_token = check_token(tokens, 4, Field::Confidence)?;
    let confidence = if confidence_token == UNSPECIFIED {
        None
    } else {
        Some(
            Confidence::from_code(&confidence_token).ok_or(ParseError::InvalidToken {
                position: 5,
                field: Field::Confidence,
                token: confidence_token.clone(),
                expected: "ok, cf, no or zz",
            })?,
        )
    };

    let identification = Identification {
        family: placeholder_to_none(family, FAMILY_PLACEHOLDER),
        genus: placeholder_to_none(genus, GENUS_PLACEHOLDER),
        species: placeholder_to_none(species, SPECIES_PLACEHOLDER),
        confidence,
        life_stage: placeholder_to_none(check_token(tokens, 5, Field::LifeStage)?, UNSPECIFIED),
        color_variant: placeholder_to_none(
            check_token(tokens, 6, Field::ColorVariant)?,
            UNSPECIFIED,
        ),
        behavior: placeholder_to_none(check_token(tokens, 7, Field::Behavior)?, UNSPECIFIED),
    };

    let fields = parse_basic(tokens, 8, mode, name)?;
    Ok(fields.with_identification(identification))
}

fn parse_basic(
    tokens: &[&str],
    offset: usize,
    mode: Mode,
    name: &str,
) -> Result<FieldSet, ParseError> {
    let min = offset + BASIC_TOKENS;
    if tokens.len() < min || tokens.len() > min + 2 {
        return Err(token_count_error(tokens, mode, min, name));
    }

    let photographer = check_token(tokens, offset, Field::Photographer)?;
    let site = check_token(tokens, offset + 1, Field::Site)?;

    let date = tokens[offset + 2];
    let time = tokens[offset + 3];
    let bad_timestamp = |position: usize, token: &str| ParseError::InvalidToken {
        position,
        field: Field::Timestamp,
        token: token.to_string(),
        expected: "YYYY-MM-DD_HH-MM-SS",
    };
    if !DATE_REGEX.is_match(date) {
        return Err(bad_timestamp(offset + 3, date));
    }
    if !TIME_REGEX.is_match(time) {
        return Err(bad_timestamp(offset + 4, time));
    }
    let raw_timestamp = format!("{}_{}", date, time);
    let timestamp = Timestamp::parse_filename_form(&raw_timestamp)
        .ok_or_else(|| bad_timestamp(offset + 3, &raw_timestamp))?;

    let activity = check_token(tokens, offset + 4, Field::Activity)?;

    let mut fields = FieldSet {
        photographer_code: Some(photographer),
        site_code: Some(site),
        timestamp: Some(timestamp),
        activity_code: Some(activity),
        ..Default::default()
    };

    let mut i = offset + 5;
    let last = tokens.len() - 1;

    if i < last && tokens[i] == GPS_MARKER {
        fields.gps_marker = true;
        i += 1;
    }
    if i < last && CAMERA_REGEX.is_match(tokens[i]) {
        fields.camera_tag = Some(tokens[i].to_string());
        i += 1;
    }
    if i != last {
        return Err(token_count_error(tokens, mode, min, name));
    }

    fields.original_stem = Some(check_stem(tokens, last)?);
    Ok(fields)
}

fn check_stem(tokens: &[&str], index: usize) -> Result<String, ParseError> {
    let token = tokens[index];
    if token.is_empty() {
        return Err(ParseError::InvalidToken {
            position: index + 1,
            field: Field::OriginalStem,
            token: String::new(),
            expected: "a non-empty name",
        });
    }
    Ok(token.to_string())
}

fn parse_meta(tokens: &[&str]) -> Result<FieldSet, ParseError> {
    let last = tokens.len() - 1;
    let mut fields = FieldSet {
        original_stem: Some(check_stem(tokens, last)?),
        ..Default::default()
    };

    // The marker segment is read right to left, just before the stem.
    // A camera tag only counts directly after the GPS marker.
    let mut end = last;
    if end > 1 && tokens[end - 2] == GPS_MARKER && CAMERA_REGEX.is_match(tokens[end - 1]) {
        fields.camera_tag = Some(tokens[end - 1].to_string());
        end -= 1;
    }
    if end > 0 && tokens[end - 1] == GPS_MARKER {
        fields.gps_marker = true;
        end -= 1;
    }

    fields.head = tokens[..end].iter().map(|t| t.to_string()).collect();
    fields.site_code = fields.head.iter().find(|t| is_site_code(t)).cloned();

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamp() -> Timestamp {
        Timestamp::parse_filename_form("2025-03-31_10-15-53").unwrap()
    }

    fn basic_fields() -> FieldSet {
        FieldSet::basic(
            "DaKle",
            "IDN-Bangka-HRS",
            timestamp(),
            "snork",
            "DST0875",
            Some("JPG".to_string()),
        )
    }

    fn identification() -> Identification {
        Identification {
            family: Some("Pomacentridae".to_string()),
            genus: Some("Amphiprion".to_string()),
            species: Some("clarkii".to_string()),
            confidence: Some(Confidence::Certain),
            life_stage: Some("ad".to_string()),
            color_variant: Some("ty".to_string()),
            behavior: None,
        }
    }

    // ============ Assembly ============

    #[test]
    fn test_assemble_basic() {
        let name = assemble(&basic_fields(), Mode::Basic).unwrap();
        assert_eq!(name, "DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG");
    }

    #[test]
    fn test_assemble_identify() {
        let fields = basic_fields().with_identification(identification());
        let name = assemble(&fields, Mode::Identify).unwrap();
        assert_eq!(
            name,
            "Pomacentridae_Amphiprion_clarkii_B_ok_ad_ty_zz_DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG"
        );
    }

    #[test]
    fn test_assemble_identify_uses_placeholders() {
        let fields = basic_fields().with_identification(Identification::default());
        let name = assemble(&fields, Mode::Identify).unwrap();
        assert!(name.starts_with("0-Fam_genus_spec_B_zz_zz_zz_zz_DaKle_"));
    }

    #[test]
    fn test_assemble_missing_field() {
        let mut fields = basic_fields();
        fields.activity_code = None;
        assert_eq!(
            assemble(&fields, Mode::Basic),
            Err(AssembleError::MissingField {
                mode: Mode::Basic,
                field: Field::Activity
            })
        );
        assert!(matches!(
            assemble(&basic_fields(), Mode::Identify),
            Err(AssembleError::MissingField { .. })
        ));
    }

    #[test]
    fn test_assemble_without_extension() {
        let mut fields = basic_fields();
        fields.extension = None;
        let name = assemble(&fields, Mode::Basic).unwrap();
        assert!(name.ends_with("_DST0875"));
    }

    #[test]
    fn test_assemble_does_not_check_reference_tables() {
        let mut fields = basic_fields();
        fields.photographer_code = Some("ZZzzz".to_string());
        assert!(assemble(&fields, Mode::Basic).is_ok());
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let fields = basic_fields().with_identification(identification());
        let first = assemble(&fields, Mode::Edit).unwrap();
        let second = assemble(&fields.clone(), Mode::Edit).unwrap();
        assert_eq!(first, second);
    }

    // ============ Round trips ============

    #[test]
    fn test_round_trip_basic() {
        let fields = basic_fields();
        let name = assemble(&fields, Mode::Basic).unwrap();
        assert_eq!(parse(&name, Mode::Basic).unwrap(), fields);
    }

    #[test]
    fn test_round_trip_identify_with_placeholders() {
        let fields = basic_fields().with_identification(Identification {
            genus: Some("Amphiprion".to_string()),
            confidence: Some(Confidence::Uncertain),
            ..Default::default()
        });
        let name = assemble(&fields, Mode::Identify).unwrap();
        assert_eq!(parse(&name, Mode::Identify).unwrap(), fields);
    }

    #[test]
    fn test_round_trip_with_marker_segment() {
        let mut fields = basic_fields().with_identification(identification());
        fields.gps_marker = true;
        fields.camera_tag = Some("S-A7IV".to_string());
        let name = assemble(&fields, Mode::Edit).unwrap();
        assert!(name.contains("_snork_G_S-A7IV_DST0875"));
        assert_eq!(parse(&name, Mode::Edit).unwrap(), fields);
    }

    #[test]
    fn test_round_trip_meta() {
        let fields = FieldSet {
            head: vec!["dive".to_string()],
            gps_marker: true,
            camera_tag: Some("S-A7IV".to_string()),
            original_stem: Some("NKM08085".to_string()),
            extension: Some("JPG".to_string()),
            ..Default::default()
        };
        let name = assemble(&fields, Mode::Meta).unwrap();
        assert_eq!(name, "dive_G_S-A7IV_NKM08085.JPG");
        assert_eq!(parse(&name, Mode::Meta).unwrap(), fields);
    }

    // ============ Parsing ============

    #[test]
    fn test_parse_basic_fields() {
        let fields =
            parse("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG", Mode::Basic).unwrap();
        assert_eq!(fields.photographer_code.as_deref(), Some("DaKle"));
        assert_eq!(fields.site_code.as_deref(), Some("IDN-Bangka-HRS"));
        assert_eq!(fields.timestamp, Some(timestamp()));
        assert_eq!(fields.activity_code.as_deref(), Some("snork"));
        assert_eq!(fields.original_stem.as_deref(), Some("DST0875"));
        assert_eq!(fields.extension.as_deref(), Some("JPG"));
        assert!(!fields.gps_marker);
    }

    #[test]
    fn test_parse_keeps_extension_case() {
        let fields =
            parse("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.jpeg", Mode::Basic).unwrap();
        assert_eq!(fields.extension.as_deref(), Some("jpeg"));
    }

    #[test]
    fn test_parse_token_count_mismatch() {
        let result = parse("DaKle_IDN-Bangka-HRS_2025-03-31.JPG", Mode::Basic);
        assert!(matches!(
            result,
            Err(ParseError::TokenCount { found: 3, min: 6, .. })
        ));
    }

    #[test]
    fn test_parse_reports_failing_position() {
        let result = parse("DaKle_IDN-Bangka-HRS_2025-3-31_10-15-53_snork_DST0875.JPG", Mode::Basic);
        match result {
            Err(ParseError::InvalidToken { position, field, .. }) => {
                assert_eq!(position, 3);
                assert_eq!(field, Field::Timestamp);
            }
            other => panic!("Expected InvalidToken, got {:?}", other),
        }

        let result = parse("Dave_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG", Mode::Basic);
        assert_eq!(result.unwrap_err().field(), Some(Field::Photographer));
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        let result = parse("DaKle_IDN-Bangka-HRS_2025-13-31_10-15-53_snork_DST0875.JPG", Mode::Basic);
        assert_eq!(result.unwrap_err().field(), Some(Field::Timestamp));
    }

    #[test]
    fn test_parse_unknown_confidence_code() {
        let name = "Pomacentridae_Amphiprion_clarkii_B_qq_ad_ty_zz_DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG";
        assert_eq!(
            parse(name, Mode::Identify).unwrap_err().field(),
            Some(Field::Confidence)
        );
    }

    #[test]
    fn test_parse_unknown_codes_are_not_parse_errors() {
        // Unknown photographer/site codes are validator territory
        let fields =
            parse("ZZzzz_XXX-Nowhere-000_2025-03-31_10-15-53_snork_DST0875.JPG", Mode::Edit).unwrap();
        assert_eq!(fields.photographer_code.as_deref(), Some("ZZzzz"));
    }

    #[test]
    fn test_parse_stem_that_looks_like_marker() {
        let fields = parse("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_G.JPG", Mode::Basic).unwrap();
        assert!(!fields.gps_marker);
        assert_eq!(fields.original_stem.as_deref(), Some("G"));
    }

    #[test]
    fn test_parse_edit_detects_layout() {
        let basic =
            parse("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG", Mode::Edit).unwrap();
        assert!(!basic.is_identified());

        let identified = parse(
            "0-Fam_genus_spec_B_zz_zz_zz_zz_DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG",
            Mode::Edit,
        )
        .unwrap();
        assert_eq!(identified.identification, Some(Identification::default()));
    }

    #[test]
    fn test_parse_meta_plain_file() {
        let fields = parse("dive_NKM08085.JPG", Mode::Meta).unwrap();
        assert_eq!(fields.head, vec!["dive".to_string()]);
        assert_eq!(fields.original_stem.as_deref(), Some("NKM08085"));
        assert!(fields.site_code.is_none());
        assert!(!fields.gps_marker);
    }

    #[test]
    fn test_parse_meta_extracts_site() {
        let fields =
            parse("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_G_DST0875.JPG", Mode::Meta).unwrap();
        assert_eq!(fields.site_code.as_deref(), Some("IDN-Bangka-HRS"));
        assert!(fields.gps_marker);
        assert!(fields.camera_tag.is_none());
        assert_eq!(fields.head.len(), 5);
    }

    #[test]
    fn test_meta_reassembly_replaces_segment() {
        let mut fields = parse("dive_G_C-R5_NKM08085.JPG", Mode::Meta).unwrap();
        fields.gps_marker = true;
        fields.camera_tag = Some("S-A7IV".to_string());
        assert_eq!(
            assemble(&fields, Mode::Meta).unwrap(),
            "dive_G_S-A7IV_NKM08085.JPG"
        );
    }

    #[test]
    fn test_camera_tag_does_not_move_other_tokens() {
        let mut fields =
            parse("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_G_DST0875.JPG", Mode::Meta).unwrap();
        fields.camera_tag = Some("S-A7IV".to_string());
        let name = assemble(&fields, Mode::Meta).unwrap();
        assert_eq!(
            name,
            "DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_G_S-A7IV_DST0875.JPG"
        );
        // Still a valid Basic name with the same positional tokens
        let basic = parse(&name, Mode::Basic).unwrap();
        assert_eq!(basic.activity_code.as_deref(), Some("snork"));
        assert_eq!(basic.original_stem.as_deref(), Some("DST0875"));
    }

    #[test]
    fn test_parse_meta_keeps_camera_like_head_token() {
        let fields = parse("P-1_IMG.JPG", Mode::Meta).unwrap();
        assert!(fields.camera_tag.is_none());
        assert!(!fields.gps_marker);
        assert_eq!(fields.head, vec!["P-1".to_string()]);

        let mut tagged = fields.clone();
        tagged.gps_marker = true;
        tagged.camera_tag = Some("S-A7IV".to_string());
        assert_eq!(assemble(&tagged, Mode::Meta).unwrap(), "P-1_G_S-A7IV_IMG.JPG");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("", Mode::Meta), Err(ParseError::Empty));
        assert_eq!(parse(".JPG", Mode::Meta).unwrap().original_stem.as_deref(), Some(".JPG"));
    }

    // ============ Helpers ============

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.JPG"), ("a", Some("JPG")));
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", Some("gz")));
        assert_eq!(split_extension("noext"), ("noext", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("trailing."), ("trailing.", None));
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("IMG_0001"), "IMG0001");
        assert_eq!(sanitize_stem("DST0875"), "DST0875");
    }

    #[test]
    fn test_detect_layout() {
        assert_eq!(
            detect_layout("DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG"),
            Some(Layout::Basic)
        );
        assert_eq!(
            detect_layout("Pomacentridae_Amphiprion_clarkii_B_ok_ad_ty_zz_DaKle_IDN-Bangka-HRS_2025-03-31_10-15-53_snork_DST0875.JPG"),
            Some(Layout::Identified)
        );
        assert_eq!(detect_layout("DST0875.JPG"), None);
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern(Field::Camera, "S-A7IV"));
        assert!(!matches_pattern(Field::Camera, "A7IV"));
        assert!(matches_pattern(Field::OriginalStem, "anything"));
        assert!(is_site_code("IDN-Bangka-HRS"));
        assert!(!is_site_code("Bangka"));
    }
}
