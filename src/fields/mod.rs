mod types;

pub use types::*;

use std::collections::BTreeMap;

/// Value of a slot rendered for comparison across a selection
fn slot_values(fields: &FieldSet) -> Vec<(Field, Option<String>)> {
    let id = fields.identification.as_ref();
    vec![
        (Field::Family, id.and_then(|i| i.family.clone())),
        (Field::Genus, id.and_then(|i| i.genus.clone())),
        (Field::Species, id.and_then(|i| i.species.clone())),
        (
            Field::Confidence,
            id.and_then(|i| i.confidence.map(|c| c.code().to_string())),
        ),
        (Field::LifeStage, id.and_then(|i| i.life_stage.clone())),
        (Field::ColorVariant, id.and_then(|i| i.color_variant.clone())),
        (Field::Behavior, id.and_then(|i| i.behavior.clone())),
        (Field::Photographer, fields.photographer_code.clone()),
        (Field::Site, fields.site_code.clone()),
        (
            Field::Timestamp,
            fields.timestamp.as_ref().map(|t| t.as_str().to_string()),
        ),
        (Field::Activity, fields.activity_code.clone()),
        (Field::Camera, fields.camera_tag.clone()),
        (Field::OriginalStem, fields.original_stem.clone()),
    ]
}

/// Slots holding the same value across every field set of a selection.
///
/// Only those slots are offered for editing; the map value is the shared
/// value (`None` when the slot is uniformly absent).
pub fn shared_fields(selection: &[FieldSet]) -> BTreeMap<Field, Option<String>> {
    let mut shared = BTreeMap::new();

    let Some((first, rest)) = selection.split_first() else {
        return shared;
    };

    let rest_values: Vec<_> = rest.iter().map(slot_values).collect();

    for (i, (field, value)) in slot_values(first).into_iter().enumerate() {
        if rest_values.iter().all(|other| other[i].1 == value) {
            shared.insert(field, value);
        }
    }

    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(photographer: &str, activity: &str, stem: &str) -> FieldSet {
        FieldSet::basic(
            photographer,
            "IDN-Bangka-HRS",
            Timestamp::parse_filename_form("2025-03-31_10-15-53").unwrap(),
            activity,
            stem,
            Some("JPG".to_string()),
        )
    }

    #[test]
    fn test_shared_fields_detects_common_values() {
        let selection = vec![
            make("DaKle", "snork", "DST0875"),
            make("DaKle", "dive", "DST0876"),
        ];

        let shared = shared_fields(&selection);

        assert_eq!(shared.get(&Field::Photographer), Some(&Some("DaKle".to_string())));
        assert_eq!(
            shared.get(&Field::Site),
            Some(&Some("IDN-Bangka-HRS".to_string()))
        );
        assert!(!shared.contains_key(&Field::Activity));
        assert!(!shared.contains_key(&Field::OriginalStem));
        assert_eq!(shared.get(&Field::Family), Some(&None));
    }

    #[test]
    fn test_shared_fields_empty_selection() {
        assert!(shared_fields(&[]).is_empty());
    }

    #[test]
    fn test_shared_fields_single_file_shares_everything() {
        let shared = shared_fields(&[make("DaKle", "snork", "DST0875")]);
        assert_eq!(
            shared.get(&Field::OriginalStem),
            Some(&Some("DST0875".to_string()))
        );
    }
}
