use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ExtractedFields;

/// Tokens that match the name pattern but are structural labels printed
/// near the name line, never surnames.
const NAME_LABEL_TOKENS: &[&str] = &["TYPE", "SEX", "COUNTRY", "CODE", "PASSPORT"];

/// Fixed plausibility windows for classifying free-standing dates. These
/// are not computed from the current date.
const BIRTH_YEAR_WINDOW: RangeInclusive<i32> = 1950..=2010;
const ISSUE_YEAR_WINDOW: RangeInclusive<i32> = 2015..=2025;
const EXPIRY_YEAR_MIN: i32 = 2026;

/// Province and region names as printed in the place-of-birth line, in
/// transliterated and native-script form. Matches record the
/// transliterated form.
const PROVINCE_GAZETTEER: &[(&str, &str)] = &[
    ("BEIJING", "北京"),
    ("TIANJIN", "天津"),
    ("SHANGHAI", "上海"),
    ("CHONGQING", "重庆"),
    ("HEBEI", "河北"),
    ("SHANXI", "山西"),
    ("INNER MONGOLIA", "内蒙古"),
    ("LIAONING", "辽宁"),
    ("JILIN", "吉林"),
    ("HEILONGJIANG", "黑龙江"),
    ("JIANGSU", "江苏"),
    ("ZHEJIANG", "浙江"),
    ("ANHUI", "安徽"),
    ("FUJIAN", "福建"),
    ("JIANGXI", "江西"),
    ("SHANDONG", "山东"),
    ("HENAN", "河南"),
    ("HUBEI", "湖北"),
    ("HUNAN", "湖南"),
    ("GUANGDONG", "广东"),
    ("GUANGXI", "广西"),
    ("HAINAN", "海南"),
    ("SICHUAN", "四川"),
    ("GUIZHOU", "贵州"),
    ("YUNNAN", "云南"),
    ("XIZANG", "西藏"),
    ("SHAANXI", "陕西"),
    ("GANSU", "甘肃"),
    ("QINGHAI", "青海"),
    ("NINGXIA", "宁夏"),
    ("XINJIANG", "新疆"),
    ("HONG KONG", "香港"),
    ("MACAO", "澳门"),
    ("TAIWAN", "台湾"),
];

lazy_static! {
    // Document prefix plus digit string as printed in the visible zone,
    // possibly broken up by whitespace.
    static ref PASSPORT_NUMBER_PATTERN: Regex =
        Regex::new(r"([A-Z]{1,2})\s*(\d[\s\d]{6,8})").unwrap();
    static ref FULL_NAME_PATTERN: Regex = Regex::new(r"([A-Z]{2,}),\s*([A-Z]{2,})").unwrap();
    static ref DATE_PATTERN: Regex = Regex::new(r"(?i)(\d{1,2})\s*([A-Z]{3})\s*(\d{4})").unwrap();
    static ref NATIONALITY_PATTERN: Regex = Regex::new(r"(?i)CHINESE|CHN|中\s*国").unwrap();
    static ref FEMALE_PATTERN: Regex = Regex::new(r"(?i)女|/F\b|\bFEMALE\b").unwrap();
    static ref MALE_PATTERN: Regex = Regex::new(r"(?i)男|/M\b|\bMALE\b").unwrap();
}

/// VisualFieldScanner recovers fields from the visible text zone when the
/// MRZ is silent or incomplete. The scan is a fold over lines with a
/// partial-record accumulator: the first line matching a field's pattern
/// fills it, and a filled field is never overwritten.
pub struct VisualFieldScanner;

impl VisualFieldScanner {
    pub fn scan(text: &str, capture_date_of_issue: bool) -> ExtractedFields {
        text.lines()
            .map(str::trim)
            .fold(ExtractedFields::default(), |mut acc, line| {
                Self::scan_line(line, capture_date_of_issue, &mut acc);
                acc
            })
    }

    fn scan_line(line: &str, capture_date_of_issue: bool, acc: &mut ExtractedFields) {
        if acc.passport_number.is_empty() {
            if let Some(caps) = PASSPORT_NUMBER_PATTERN.captures(line) {
                let digits: String = caps[2].chars().filter(|c| !c.is_whitespace()).collect();
                acc.passport_number = format!("{}{}", caps[1].to_uppercase(), digits);
            }
        }

        if acc.full_name.is_empty() {
            if let Some(caps) = FULL_NAME_PATTERN.captures(line) {
                if !NAME_LABEL_TOKENS.contains(&&caps[1]) {
                    acc.full_name = format!("{}, {}", &caps[1], &caps[2]);
                }
            }
        }

        if acc.place_of_birth.is_empty() {
            let upper = line.to_uppercase();
            for (romanized, native) in PROVINCE_GAZETTEER {
                if upper.contains(romanized) || line.contains(native) {
                    acc.place_of_birth = (*romanized).to_string();
                    break;
                }
            }
        }

        if acc.nationality.is_empty() && NATIONALITY_PATTERN.is_match(line) {
            acc.nationality = "CHN".to_string();
        }

        if acc.gender.is_empty() {
            // female first: "FEMALE" would otherwise satisfy the male token
            if FEMALE_PATTERN.is_match(line) {
                acc.gender = "Female".to_string();
            } else if MALE_PATTERN.is_match(line) {
                acc.gender = "Male".to_string();
            }
        }

        for caps in DATE_PATTERN.captures_iter(line) {
            let day: u32 = match caps[1].parse() {
                Ok(day) => day,
                Err(_) => continue,
            };
            let year: i32 = match caps[3].parse() {
                Ok(year) => year,
                Err(_) => continue,
            };
            let formatted = format!("{:02} {} {}", day, caps[2].to_uppercase(), &caps[3]);

            if acc.date_of_birth.is_empty() && BIRTH_YEAR_WINDOW.contains(&year) {
                acc.date_of_birth = formatted;
            } else if acc.date_of_expiry.is_empty() && year >= EXPIRY_YEAR_MIN {
                acc.date_of_expiry = formatted;
            } else if capture_date_of_issue
                && acc.date_of_issue.is_empty()
                && ISSUE_YEAR_WINDOW.contains(&year)
            {
                acc.date_of_issue = formatted;
            }
        }
    }
}
