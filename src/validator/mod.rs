mod types;

pub use types::*;

use crate::fields::{Confidence, Field, FieldSet, Identification, Mode};
use crate::grammar::{self, DELIMITER};
use crate::reference::{LabelCategory, LabelStatus, ReferenceLookup};
use tracing::debug;

/// Check a field set for the given mode.
///
/// Pure: the filesystem is never touched. Slot syntax, reference-table
/// membership and cross-field rules are all reported, in filename order.
pub fn validate(fields: &FieldSet, mode: Mode, refs: &dyn ReferenceLookup) -> ValidationReport {
    let mut report = ValidationReport::new();

    match mode {
        Mode::Basic | Mode::Identify | Mode::Edit => {
            match (&fields.identification, mode) {
                (Some(id), _) => check_identification(&mut report, id, refs),
                (None, Mode::Identify) => {
                    report.error(Field::Family, "Identification is required in Identify mode")
                }
                (None, _) => {}
            }
            check_basic(&mut report, fields, refs);
        }
        Mode::Meta => check_meta(&mut report, fields, refs),
    }

    check_marker_segment(&mut report, fields, refs);
    check_stem(&mut report, fields);

    if fields.extension.is_none() {
        report.warning(Field::Extension, "File has no extension");
    }

    debug!(
        mode = mode.description(),
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "Validated fields"
    );
    report
}

/// Characters and values that would break the token structure or the path
fn token_safety_problem(value: &str) -> Option<String> {
    if value.is_empty() {
        Some("must not be empty".to_string())
    } else if value.contains(DELIMITER) {
        Some(format!("'{}' contains the delimiter '{}'", value, DELIMITER))
    } else if value.contains('/') || value.contains('\\') {
        Some(format!("'{}' contains a path separator", value))
    } else if value == "." || value == ".." {
        Some(format!("'{}' is not a valid name", value))
    } else {
        None
    }
}

/// Delimiter safety plus the slot's sub-grammar. Returns whether the value is usable.
fn check_syntax(report: &mut ValidationReport, field: Field, value: &str) -> bool {
    if let Some(problem) = token_safety_problem(value) {
        report.error(field, problem);
        return false;
    }
    if !grammar::matches_pattern(field, value) {
        report.error(
            field,
            format!(
                "'{}' does not match the expected form ({})",
                value,
                grammar::pattern_description(field)
            ),
        );
        return false;
    }
    true
}

fn check_required<'a>(
    report: &mut ValidationReport,
    field: Field,
    value: &'a Option<String>,
) -> Option<&'a str> {
    match value.as_deref() {
        Some(v) => Some(v),
        None => {
            report.error(field, "Required value is missing");
            None
        }
    }
}

fn check_label(
    report: &mut ValidationReport,
    field: Field,
    category: LabelCategory,
    code: &str,
    refs: &dyn ReferenceLookup,
) {
    match refs.label(category, code) {
        LabelStatus::Known => {}
        LabelStatus::Unknown => report.error(
            field,
            format!("'{}' is not a known {} code", code, category.key()),
        ),
        LabelStatus::Unavailable => report.warning(
            field,
            format!("{} labels are not loaded, '{}' was not checked", category.key(), code),
        ),
    }
}

fn check_identification(
    report: &mut ValidationReport,
    id: &Identification,
    refs: &dyn ReferenceLookup,
) {
    let taxonomy = [
        (Field::Family, &id.family),
        (Field::Genus, &id.genus),
        (Field::Species, &id.species),
    ];
    let mut taxonomy_ok = true;
    for (field, value) in taxonomy {
        if let Some(v) = value {
            taxonomy_ok &= check_syntax(report, field, v);
        }
    }

    match (&id.family, &id.genus, &id.species) {
        (Some(family), Some(genus), Some(species)) => {
            if taxonomy_ok && !refs.has_species(family, genus, species) {
                report.warning(
                    Field::Species,
                    format!("{} {} ({}) is not in the species list", genus, species, family),
                );
            }
        }
        _ => report.warning(Field::Family, "Taxonomy is incomplete, placeholders will be used"),
    }

    let labels = [
        (Field::LifeStage, LabelCategory::Phase, &id.life_stage),
        (Field::ColorVariant, LabelCategory::Colour, &id.color_variant),
        (Field::Behavior, LabelCategory::Behaviour, &id.behavior),
    ];
    for (field, category, value) in labels {
        if let Some(code) = value {
            if check_syntax(report, field, code) {
                check_label(report, field, category, code, refs);
            }
        }
    }

    if id.confidence == Some(Confidence::NoId) && id.life_stage.is_some() {
        report.error(
            Field::LifeStage,
            "A life stage cannot be given when the confidence is 'no' (no identification)",
        );
    }
}

fn check_basic(report: &mut ValidationReport, fields: &FieldSet, refs: &dyn ReferenceLookup) {
    if let Some(code) = check_required(report, Field::Photographer, &fields.photographer_code) {
        if check_syntax(report, Field::Photographer, code) && refs.photographer(code).is_none() {
            report.error(
                Field::Photographer,
                format!("'{}' is not in the photographer list", code),
            );
        }
    }

    if let Some(code) = check_required(report, Field::Site, &fields.site_code) {
        if check_syntax(report, Field::Site, code) && refs.site(code).is_none() {
            report.error(Field::Site, format!("'{}' is not in the dive site list", code));
        }
    }

    if fields.timestamp.is_none() {
        report.error(Field::Timestamp, "Capture date and time are missing");
    }

    if let Some(code) = check_required(report, Field::Activity, &fields.activity_code) {
        if check_syntax(report, Field::Activity, code) && !refs.has_activity(code) {
            report.error(Field::Activity, format!("'{}' is not in the activity list", code));
        }
    }
}

fn check_meta(report: &mut ValidationReport, fields: &FieldSet, refs: &dyn ReferenceLookup) {
    for token in &fields.head {
        if let Some(problem) = token_safety_problem(token) {
            report.error(Field::Head, problem);
        }
    }

    let Some(code) = fields.site_code.as_deref() else {
        report.error(
            Field::Site,
            "No site found in the filename and no fallback site was given",
        );
        return;
    };

    if !check_syntax(report, Field::Site, code) {
        return;
    }
    match refs.site(code) {
        None => report.error(Field::Site, format!("'{}' is not in the dive site list", code)),
        Some(site) if site.coordinates().is_none() => report.error(
            Field::Site,
            format!("{} has no coordinates", site.display_name()),
        ),
        Some(_) => {}
    }
}

fn check_marker_segment(
    report: &mut ValidationReport,
    fields: &FieldSet,
    refs: &dyn ReferenceLookup,
) {
    if let Some(camera) = &fields.camera_tag {
        if check_syntax(report, Field::Camera, camera) {
            check_label(report, Field::Camera, LabelCategory::Camera, camera, refs);
        }
    }
}

fn check_stem(report: &mut ValidationReport, fields: &FieldSet) {
    if let Some(stem) = check_required(report, Field::OriginalStem, &fields.original_stem) {
        if let Some(problem) = token_safety_problem(stem) {
            report.error(Field::OriginalStem, problem);
        }
    }
    if let Some(ext) = &fields.extension {
        if ext.contains('/') || ext.contains('\\') {
            report.error(Field::Extension, format!("'{}' contains a path separator", ext));
        }
    }
}
