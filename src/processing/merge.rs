use crate::models::ExtractedFields;

/// FieldMerger combines the MRZ decode with the visual scan. Per field the
/// MRZ value wins when non-empty; fields the MRZ never carries (place of
/// birth, date of issue) always come from the visual side, which the same
/// rule covers since the decoder leaves them empty.
pub struct FieldMerger;

impl FieldMerger {
    pub fn merge(mrz: &ExtractedFields, visual: &ExtractedFields) -> ExtractedFields {
        ExtractedFields {
            passport_number: Self::pick(&mrz.passport_number, &visual.passport_number),
            full_name: Self::pick(&mrz.full_name, &visual.full_name),
            date_of_birth: Self::pick(&mrz.date_of_birth, &visual.date_of_birth),
            place_of_birth: Self::pick(&mrz.place_of_birth, &visual.place_of_birth),
            date_of_issue: Self::pick(&mrz.date_of_issue, &visual.date_of_issue),
            date_of_expiry: Self::pick(&mrz.date_of_expiry, &visual.date_of_expiry),
            nationality: Self::pick(&mrz.nationality, &visual.nationality),
            gender: Self::pick(&mrz.gender, &visual.gender),
        }
    }

    fn pick(mrz: &str, visual: &str) -> String {
        if mrz.is_empty() {
            visual.to_string()
        } else {
            mrz.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtractedFields {
        ExtractedFields {
            passport_number: "EF1234567".to_string(),
            full_name: "DOE, JOHN".to_string(),
            date_of_birth: "12 MAY 1990".to_string(),
            place_of_birth: "SICHUAN".to_string(),
            date_of_issue: "03 JUN 2019".to_string(),
            date_of_expiry: "12 MAY 2028".to_string(),
            nationality: "CHN".to_string(),
            gender: "Male".to_string(),
        }
    }

    #[test]
    fn test_empty_mrz_yields_exactly_visual() {
        let visual = sample();
        let merged = FieldMerger::merge(&ExtractedFields::default(), &visual);
        assert_eq!(merged, visual);
    }

    #[test]
    fn test_empty_visual_yields_exactly_mrz() {
        let mrz = sample();
        let merged = FieldMerger::merge(&mrz, &ExtractedFields::default());
        assert_eq!(merged, mrz);
    }

    #[test]
    fn test_mrz_wins_per_field() {
        let mrz = ExtractedFields {
            passport_number: "E8888888".to_string(),
            date_of_birth: "01 JAN 1985".to_string(),
            ..Default::default()
        };
        let visual = sample();
        let merged = FieldMerger::merge(&mrz, &visual);
        assert_eq!(merged.passport_number, "E8888888");
        assert_eq!(merged.date_of_birth, "01 JAN 1985");
        // everything the MRZ left empty falls through to the visual scan
        assert_eq!(merged.full_name, "DOE, JOHN");
        assert_eq!(merged.place_of_birth, "SICHUAN");
        assert_eq!(merged.date_of_issue, "03 JUN 2019");
    }
}
