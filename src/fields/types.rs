use chrono::NaiveDateTime;
use std::fmt;

/// Format of the timestamp slot as it appears in a filename (two tokens).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Naming mode, selects the grammar and the required slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Basic,
    Identify,
    Edit,
    Meta,
}

impl Mode {
    pub fn description(&self) -> &'static str {
        match self {
            Mode::Basic => "Basic",
            Mode::Identify => "Identify",
            Mode::Edit => "Edit",
            Mode::Meta => "Meta",
        }
    }
}

/// Named slot of a filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Family,
    Genus,
    Species,
    Separator,
    Confidence,
    LifeStage,
    ColorVariant,
    Behavior,
    Photographer,
    Site,
    Timestamp,
    Activity,
    GpsMarker,
    Camera,
    Head,
    OriginalStem,
    Extension,
    /// The assembled name as a whole (collisions)
    Target,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Family => "family",
            Field::Genus => "genus",
            Field::Species => "species",
            Field::Separator => "separator",
            Field::Confidence => "confidence_flag",
            Field::LifeStage => "life_stage",
            Field::ColorVariant => "color_variant",
            Field::Behavior => "behavior_flag",
            Field::Photographer => "photographer_code",
            Field::Site => "site_code",
            Field::Timestamp => "timestamp",
            Field::Activity => "activity_code",
            Field::GpsMarker => "gps_marker",
            Field::Camera => "camera_tag",
            Field::Head => "head",
            Field::OriginalStem => "original_stem",
            Field::Extension => "extension",
            Field::Target => "target_name",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identification confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// Identification is certain
    Certain,
    /// Identification is uncertain (cf.)
    Uncertain,
    /// No identification possible
    NoId,
}

impl Confidence {
    pub fn code(&self) -> &'static str {
        match self {
            Confidence::Certain => "ok",
            Confidence::Uncertain => "cf",
            Confidence::NoId => "no",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ok" => Some(Confidence::Certain),
            "cf" => Some(Confidence::Uncertain),
            "no" => Some(Confidence::NoId),
            _ => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Capture timestamp of a photo.
///
/// Keeps the exact text it was read from so that a filename can be
/// reassembled byte-for-byte. There is no setter: once a timestamp is
/// attached to a field set it is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    raw: String,
    value: NaiveDateTime,
}

impl Timestamp {
    pub fn from_datetime(value: NaiveDateTime) -> Self {
        Self {
            raw: value.format(TIMESTAMP_FORMAT).to_string(),
            value,
        }
    }

    /// Parse the `YYYY-MM-DD_HH-MM-SS` form used inside filenames
    pub fn parse_filename_form(raw: &str) -> Option<Self> {
        let value = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            raw: raw.to_string(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Taxonomic identification group (Identify layout)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identification {
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub confidence: Option<Confidence>,
    pub life_stage: Option<String>,
    pub color_variant: Option<String>,
    pub behavior: Option<String>,
}

/// Typed components of a filename.
///
/// A single record serves all modes; which slots are required is decided
/// by the mode at validation and assembly time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub identification: Option<Identification>,
    pub photographer_code: Option<String>,
    pub site_code: Option<String>,
    pub timestamp: Option<Timestamp>,
    pub activity_code: Option<String>,
    /// GPS coordinates were written into the file
    pub gps_marker: bool,
    pub camera_tag: Option<String>,
    /// Leading tokens kept verbatim (Meta layout only)
    pub head: Vec<String>,
    pub original_stem: Option<String>,
    pub extension: Option<String>,
}

impl FieldSet {
    /// Build the Basic slots from user-supplied values
    pub fn basic(
        photographer_code: impl Into<String>,
        site_code: impl Into<String>,
        timestamp: Timestamp,
        activity_code: impl Into<String>,
        original_stem: impl Into<String>,
        extension: Option<String>,
    ) -> Self {
        Self {
            photographer_code: Some(photographer_code.into()),
            site_code: Some(site_code.into()),
            timestamp: Some(timestamp),
            activity_code: Some(activity_code.into()),
            original_stem: Some(original_stem.into()),
            extension,
            ..Default::default()
        }
    }

    /// Attach an identification group (Basic -> Identify)
    pub fn with_identification(mut self, identification: Identification) -> Self {
        self.identification = Some(identification);
        self
    }

    pub fn is_identified(&self) -> bool {
        self.identification.is_some()
    }

    /// Apply user edits. Slots the request leaves unset keep their value.
    pub fn apply_edits(&mut self, edits: &EditRequest) {
        if let Some(code) = &edits.photographer_code {
            self.photographer_code = Some(code.clone());
        }
        if let Some(code) = &edits.site_code {
            self.site_code = Some(code.clone());
        }
        if let Some(code) = &edits.activity_code {
            self.activity_code = Some(code.clone());
        }

        if let Some(id) = self.identification.as_mut() {
            if let Some(v) = &edits.family {
                id.family = Some(v.clone());
            }
            if let Some(v) = &edits.genus {
                id.genus = Some(v.clone());
            }
            if let Some(v) = &edits.species {
                id.species = Some(v.clone());
            }
            if let Some(v) = edits.confidence {
                id.confidence = Some(v);
            }
            if let Some(v) = &edits.life_stage {
                id.life_stage = Some(v.clone());
            }
            if let Some(v) = &edits.color_variant {
                id.color_variant = Some(v.clone());
            }
            if let Some(v) = &edits.behavior {
                id.behavior = Some(v.clone());
            }
        }
    }
}

/// Slots a user may change in Edit mode. The timestamp is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRequest {
    pub photographer_code: Option<String>,
    pub site_code: Option<String>,
    pub activity_code: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub confidence: Option<Confidence>,
    pub life_stage: Option<String>,
    pub color_variant: Option<String>,
    pub behavior: Option<String>,
}

impl EditRequest {
    pub fn is_empty(&self) -> bool {
        self.edited_fields().is_empty()
    }

    pub fn touches_identification(&self) -> bool {
        self.edited_fields().iter().any(|f| {
            !matches!(f, Field::Photographer | Field::Site | Field::Activity)
        })
    }

    /// Slots this request changes, in filename order
    pub fn edited_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        if self.family.is_some() {
            fields.push(Field::Family);
        }
        if self.genus.is_some() {
            fields.push(Field::Genus);
        }
        if self.species.is_some() {
            fields.push(Field::Species);
        }
        if self.confidence.is_some() {
            fields.push(Field::Confidence);
        }
        if self.life_stage.is_some() {
            fields.push(Field::LifeStage);
        }
        if self.color_variant.is_some() {
            fields.push(Field::ColorVariant);
        }
        if self.behavior.is_some() {
            fields.push(Field::Behavior);
        }
        if self.photographer_code.is_some() {
            fields.push(Field::Photographer);
        }
        if self.site_code.is_some() {
            fields.push(Field::Site);
        }
        if self.activity_code.is_some() {
            fields.push(Field::Activity);
        }
        fields
    }
}
