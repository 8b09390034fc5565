use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::models::MrzLinePair;

/// Line 1 of a TD3 passport opens with `P<CHN`. OCR regularly reads the
/// filler after `P` as a zero or the letter O; every variant is rewritten
/// to the canonical marker.
const LINE1_MARKERS: &[(&str, &str)] = &[
    ("P<CHN", "P<CHN"),
    ("P0CHN", "P<CHN"),
    ("POCHN", "P<CHN"),
];

/// Known garblings of the two-letter document prefix at the start of
/// line 2, checked in order (longer, more specific keys first). The CJK
/// glyphs are what the recognizer emits when the prefix letters bleed
/// together in low-quality scans.
const LINE2_PREFIX_FIXES: &[(&str, &str)] = &[
    ("国F", "EF"),
    ("国G", "EG"),
    ("巨F", "EF"),
    ("巨G", "EG"),
    (",F", "EF"),
    (",G", "EG"),
];

/// A line-2 candidate must be at least this long once whitespace is gone.
const LINE2_MIN_LEN: usize = 30;

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"\d{6}").unwrap();
    // Structural shape of line 2 used by the fallback re-scan:
    // nationality marker, birth date (sometimes with its check digit
    // fused on), sex, expiry date.
    static ref LINE2_FALLBACK: Regex = Regex::new(r"CHN\d{6,7}[MF]\d{6}").unwrap();
}

/// MrzLineLocator scans a recognized text block for the two fixed-format
/// MRZ lines. Both slots of the result are optional; an empty pair is not
/// an error, it signals "visual scanning only".
pub struct MrzLineLocator;

impl MrzLineLocator {
    pub fn locate(text: &str) -> MrzLinePair {
        let mut pair = MrzLinePair::default();
        let cleaned_lines: Vec<String> = text.lines().map(Self::clean_line).collect();

        for cleaned in &cleaned_lines {
            if pair.line1.is_none() {
                if let Some(line1) = Self::match_line1(cleaned) {
                    debug!("MRZ line 1 candidate: {}", line1);
                    pair.line1 = Some(line1);
                    continue;
                }
            }
            if pair.line1.is_some() && pair.line2.is_none() && Self::qualifies_as_line2(cleaned) {
                let line2 = Self::clean_line2(cleaned);
                debug!("MRZ line 2 candidate: {}", line2);
                pair.line2 = Some(line2);
            }
        }

        // Line 2 may sit anywhere in the block when the recognizer scrambles
        // the layout; re-scan on structure alone before giving up.
        if pair.line1.is_some() && pair.line2.is_none() {
            for cleaned in &cleaned_lines {
                if LINE2_FALLBACK.is_match(cleaned) {
                    let line2 = Self::clean_line2(cleaned);
                    debug!("MRZ line 2 recovered by structural fallback: {}", line2);
                    pair.line2 = Some(line2);
                    break;
                }
            }
        }

        pair
    }

    /// Strip internal whitespace and uppercase.
    fn clean_line(line: &str) -> String {
        line.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }

    fn match_line1(cleaned: &str) -> Option<String> {
        for (marker, canonical) in LINE1_MARKERS {
            if cleaned.contains(marker) {
                return Some(cleaned.replace(marker, canonical));
            }
        }
        None
    }

    fn qualifies_as_line2(cleaned: &str) -> bool {
        cleaned.contains("CHN")
            && cleaned.chars().count() >= LINE2_MIN_LEN
            && DIGIT_RUN.is_match(cleaned)
    }

    /// Repair the document-prefix garblings at the start of the line, then
    /// drop any stray leading punctuation the recognizer left behind.
    fn clean_line2(cleaned: &str) -> String {
        let mut line = cleaned.to_string();
        for (wrong, fixed) in LINE2_PREFIX_FIXES {
            if line.starts_with(wrong) {
                line = format!("{}{}", fixed, &line[wrong.len()..]);
                break;
            }
        }
        line.trim_start_matches(|c: char| c.is_ascii_punctuation())
            .to_string()
    }
}
