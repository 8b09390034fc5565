use serde::{Deserialize, Serialize};

/// A pair of candidate MRZ lines found in recognized text.
/// Either slot may be empty; the decoder needs both, but a partial
/// result is not an error - it signals "fall back to visual scanning".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MrzLinePair {
    pub line1: Option<String>,
    pub line2: Option<String>,
}

/// The structured record produced for one document. Every field is a
/// display-formatted string; empty means "not detected". The record is
/// always fully constructed - a document with any recognized text yields
/// all eight keys, possibly empty, never a partial shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub passport_number: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub place_of_birth: String,
    pub date_of_issue: String,
    pub date_of_expiry: String,
    pub nationality: String,
    pub gender: String,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.passport_number.is_empty()
            && self.full_name.is_empty()
            && self.date_of_birth.is_empty()
            && self.place_of_birth.is_empty()
            && self.date_of_issue.is_empty()
            && self.date_of_expiry.is_empty()
            && self.nationality.is_empty()
            && self.gender.is_empty()
    }
}
