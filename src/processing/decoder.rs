use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::models::ExtractedFields;

/// Month abbreviations for `DD MON YYYY` rendering, indexed by month - 1.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Longest passport number this engine accepts before truncating.
const PASSPORT_NUMBER_MAX_LEN: usize = 9;

/// Birth years with a two-digit year at or below this decode as 20YY,
/// above it as 19YY.
const BIRTH_CENTURY_CUTOFF: u32 = 30;

lazy_static! {
    static ref FILLER_RUN: Regex = Regex::new(r"<<+").unwrap();
    // Prefix + 8 digits: one digit too many for the number zone, which
    // happens when OCR fuses the check digit onto the number.
    static ref NUMBER_WITH_EXTRA_DIGIT: Regex = Regex::new(r"^[A-Z]{1,2}\d{8}$").unwrap();
}

/// MrzFieldDecoder turns a located line pair into structured fields by
/// fixed character offsets. Only MRZ-derivable fields are populated; the
/// rest stay empty for the merger to fill from the visual scan. A missing
/// `CHN` anchor on line 2 is not an error - the result is simply partial.
pub struct MrzFieldDecoder;

impl MrzFieldDecoder {
    pub fn decode(line1: &str, line2: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        Self::decode_name_zone(line1, &mut fields);
        Self::decode_data_zone(line2, &mut fields);
        fields
    }

    /// Line 1 carries the issuing state and the name zone: surname and
    /// given names separated by a double filler.
    fn decode_name_zone(line1: &str, fields: &mut ExtractedFields) {
        let Some(pos) = line1.find("CHN") else {
            return;
        };
        fields.nationality = "CHN".to_string();

        // K is the stock misread of the filler inside the name zone.
        let name_zone = line1[pos + 3..].replace('K', "<");
        let parts: Vec<&str> = FILLER_RUN.split(&name_zone).collect();
        if parts.len() < 2 {
            return;
        }

        // Digits in the name zone are always OCR noise, never name content.
        let surname: String = parts[0]
            .chars()
            .filter(|c| *c != '<' && !c.is_ascii_digit())
            .collect();
        let given: String = parts[1]
            .chars()
            .map(|c| if c == '<' { ' ' } else { c })
            .filter(|c| !c.is_ascii_digit())
            .collect();
        let given = given.split_whitespace().collect::<Vec<_>>().join(" ");
        let surname = surname.trim().to_string();

        if !surname.is_empty() && !given.is_empty() {
            fields.full_name = format!("{}, {}", surname, given);
            debug!("MRZ name: {}", fields.full_name);
        }
    }

    /// Line 2 layout relative to the `CHN` marker: the passport number sits
    /// before it; after it come the birth date (0..6), its check digit (6),
    /// the sex mark (7) and the expiry date (8..14).
    fn decode_data_zone(line2: &str, fields: &mut ExtractedFields) {
        let Some(pos) = line2.find("CHN") else {
            return;
        };

        let number_zone: String = line2[..pos]
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        if !number_zone.is_empty() {
            fields.passport_number = Self::repair_passport_number(number_zone);
        }

        let tail: Vec<char> = line2[pos + 3..].chars().collect();

        if tail.len() >= 6 && tail[..6].iter().all(|c| c.is_ascii_digit()) {
            let birth: String = tail[..6].iter().collect();
            if let Some(date) = Self::decode_yymmdd(&birth, false) {
                fields.date_of_birth = date;
            }
        }

        // The sex mark doubles as the anchor for the expiry block; without
        // it both fields stay empty.
        match tail.get(7) {
            Some('M') => fields.gender = "Male".to_string(),
            Some('F') => fields.gender = "Female".to_string(),
            _ => return,
        }

        if tail.len() >= 14 {
            let expiry: String = tail[8..14].iter().collect();
            if let Some(date) = Self::decode_yymmdd(&expiry, true) {
                fields.date_of_expiry = date;
            }
        }
    }

    /// Heuristic length/format repair for the number zone. This is not a
    /// check-digit validator: a duplicated trailing digit is dropped, an
    /// over-long zone is truncated, anything else passes through as-is -
    /// garbled output beats a dropped field.
    fn repair_passport_number(number: String) -> String {
        if NUMBER_WITH_EXTRA_DIGIT.is_match(&number) {
            let bytes = number.as_bytes();
            if bytes[bytes.len() - 1] == bytes[bytes.len() - 2] {
                return number[..number.len() - 1].to_string();
            }
        }
        if number.len() > PASSPORT_NUMBER_MAX_LEN {
            return number[..PASSPORT_NUMBER_MAX_LEN].to_string();
        }
        number
    }

    /// Decode a six-digit `YYMMDD` into `DD MON YYYY`. Expiry dates always
    /// resolve to 20YY; birth dates split on the fixed cutoff decade. Month
    /// and day get plausibility checks only, no month-length validation.
    pub fn decode_yymmdd(digits: &str, is_expiry: bool) -> Option<String> {
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let yy: u32 = digits[0..2].parse().ok()?;
        let month: usize = digits[2..4].parse().ok()?;
        let day: u32 = digits[4..6].parse().ok()?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }

        let year = if is_expiry || yy <= BIRTH_CENTURY_CUTOFF {
            2000 + yy
        } else {
            1900 + yy
        };

        Some(format!(
            "{:02} {} {}",
            day,
            MONTH_ABBREVIATIONS[month - 1],
            year
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE1: &str = "P<CHNDOE<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
    const LINE2: &str = "EF1234567CHN9005124M2805121<<<<<<<<<<<<<<<02";

    #[test]
    fn test_decodes_complete_line_pair() {
        let fields = MrzFieldDecoder::decode(LINE1, LINE2);
        assert_eq!(fields.full_name, "DOE, JOHN");
        assert_eq!(fields.nationality, "CHN");
        assert_eq!(fields.passport_number, "EF1234567");
        assert_eq!(fields.date_of_birth, "12 MAY 1990");
        assert_eq!(fields.gender, "Male");
        assert_eq!(fields.date_of_expiry, "12 MAY 2028");
        // fields the MRZ never carries stay empty
        assert!(fields.place_of_birth.is_empty());
        assert!(fields.date_of_issue.is_empty());
    }

    #[test]
    fn test_name_zone_strips_digits_and_fillers() {
        let line1 = "P<CHNZHANG1<<SAN2<WEI<<<<<<<<<<<<<<<<<<<<<<<";
        let fields = MrzFieldDecoder::decode(line1, LINE2);
        assert_eq!(fields.full_name, "ZHANG, SAN WEI");
    }

    #[test]
    fn test_name_zone_normalizes_k_to_filler() {
        // "KK" between surname and given names is a misread "<<"
        let line1 = "P<CHNWANG1KKLEI<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
        let fields = MrzFieldDecoder::decode(line1, LINE2);
        assert_eq!(fields.full_name, "WANG, LEI");
    }

    #[test]
    fn test_single_name_part_yields_no_full_name() {
        let line1 = "P<CHNSOLO<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
        let fields = MrzFieldDecoder::decode(line1, "NOANCHORHERE");
        // one non-empty part after the filler split: surname only, no compose
        assert!(fields.full_name.is_empty());
        assert_eq!(fields.nationality, "CHN");
    }

    #[test]
    fn test_line2_without_anchor_keeps_line1_fields_only() {
        let fields = MrzFieldDecoder::decode(LINE1, "EF1234567XXX9005124M2805121");
        assert_eq!(fields.full_name, "DOE, JOHN");
        assert_eq!(fields.nationality, "CHN");
        assert!(fields.passport_number.is_empty());
        assert!(fields.date_of_birth.is_empty());
        assert!(fields.gender.is_empty());
        assert!(fields.date_of_expiry.is_empty());
    }

    #[test]
    fn test_duplicated_trailing_digit_is_dropped() {
        let line2 = "E1234567 7CHN9005124M2805121<<<<<<<<<<<<<02";
        let fields = MrzFieldDecoder::decode(LINE1, line2);
        assert_eq!(fields.passport_number, "E1234567");
    }

    #[test]
    fn test_overlong_number_zone_is_truncated() {
        let line2 = "EF12345675CHN9005124M2805121<<<<<<<<<<<<<02";
        let fields = MrzFieldDecoder::decode(LINE1, line2);
        assert_eq!(fields.passport_number, "EF1234567");
    }

    #[test]
    fn test_malformed_gender_anchor_skips_expiry() {
        // 'X' at the sex position: gender and expiry stay empty, the
        // independently decodable fields are unaffected
        let line2 = "EF1234567CHN9005124X2805121<<<<<<<<<<<<<<02";
        let fields = MrzFieldDecoder::decode(LINE1, line2);
        assert_eq!(fields.date_of_birth, "12 MAY 1990");
        assert_eq!(fields.passport_number, "EF1234567");
        assert!(fields.gender.is_empty());
        assert!(fields.date_of_expiry.is_empty());
    }

    #[test]
    fn test_non_digit_birth_block_leaves_birth_empty() {
        let line2 = "EF1234567CHN90O5124M2805121<<<<<<<<<<<<<<02";
        let fields = MrzFieldDecoder::decode(LINE1, line2);
        assert!(fields.date_of_birth.is_empty());
        assert_eq!(fields.gender, "Male");
        assert_eq!(fields.date_of_expiry, "12 MAY 2028");
    }

    #[test]
    fn test_birth_century_splits_on_cutoff() {
        for yy in 0..=30 {
            let digits = format!("{:02}0101", yy);
            let decoded = MrzFieldDecoder::decode_yymmdd(&digits, false).unwrap();
            assert!(decoded.ends_with(&format!("{}", 2000 + yy)), "{}", decoded);
        }
        for yy in 31..=99 {
            let digits = format!("{:02}0101", yy);
            let decoded = MrzFieldDecoder::decode_yymmdd(&digits, false).unwrap();
            assert!(decoded.ends_with(&format!("{}", 1900 + yy)), "{}", decoded);
        }
    }

    #[test]
    fn test_expiry_always_resolves_to_current_century() {
        for yy in [0u32, 30, 31, 99] {
            let digits = format!("{:02}0101", yy);
            let decoded = MrzFieldDecoder::decode_yymmdd(&digits, true).unwrap();
            assert!(decoded.ends_with(&format!("{}", 2000 + yy)), "{}", decoded);
        }
    }

    #[test]
    fn test_decode_yymmdd_reference_values() {
        assert_eq!(
            MrzFieldDecoder::decode_yymmdd("990101", false).as_deref(),
            Some("01 JAN 1999")
        );
        assert_eq!(
            MrzFieldDecoder::decode_yymmdd("990101", true).as_deref(),
            Some("01 JAN 2099")
        );
    }

    #[test]
    fn test_decode_yymmdd_rejects_malformed_input() {
        assert_eq!(MrzFieldDecoder::decode_yymmdd("134512", false), None); // month 45
        assert_eq!(MrzFieldDecoder::decode_yymmdd("990132", false), None); // day 32
        assert_eq!(MrzFieldDecoder::decode_yymmdd("990100", false), None); // day 0
        assert_eq!(MrzFieldDecoder::decode_yymmdd("990001", false), None); // month 0
        assert_eq!(MrzFieldDecoder::decode_yymmdd("99011", false), None); // five digits
        assert_eq!(MrzFieldDecoder::decode_yymmdd("9901011", false), None); // seven digits
        assert_eq!(MrzFieldDecoder::decode_yymmdd("99O101", false), None); // letter O
    }
}
