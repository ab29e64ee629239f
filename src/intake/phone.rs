use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Seoul numbers start with the two-digit area code `02`.
const SEOUL_PREFIX: &str = "02";

/// Mobile carrier prefixes.
const MOBILE_PREFIXES: [&str; 6] = ["010", "011", "016", "017", "018", "019"];

/// Leading area code: `0` plus one or two digits, matched greedily.
static AREA_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0\d{1,2}").unwrap());

/// Format a Korean phone number as dash-separated groups.
///
/// Input is NFKC-folded so full-width digits count, then non-digits are
/// stripped. Unrecognized shapes come back as the original input, untouched.
///
/// - `02` + 9..=10 digits: `02-XXX(X)-XXXX`
/// - mobile prefix + 10..=11 digits: `XXX-XXX(X)-XXXX`
/// - other area code (`0` + 1-2 digits, greedy) with >= 9 digits:
///   `<area>-<middle>-<last 4>`
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.nfkc().filter(|c| c.is_ascii_digit()).collect();
    let len = digits.len();

    if digits.starts_with(SEOUL_PREFIX) && (9..=10).contains(&len) {
        return format!("02-{}-{}", &digits[2..len - 4], &digits[len - 4..]);
    }

    if MOBILE_PREFIXES.iter().any(|p| digits.starts_with(p)) && (10..=11).contains(&len) {
        return format!("{}-{}-{}", &digits[..3], &digits[3..len - 4], &digits[len - 4..]);
    }

    if len >= 9 {
        if let Some(area) = AREA_CODE.find(&digits) {
            let rest = &digits[area.end()..];
            let split = rest.len() - 4;
            return format!("{}-{}-{}", area.as_str(), &rest[..split], &rest[split..]);
        }
    }

    raw.to_string()
}

/// True when `s` contains at least one digit after NFKC folding.
pub fn has_digit(s: &str) -> bool {
    s.nfkc().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_eleven_digits_split_3_4_4() {
        assert_eq!(format_phone("01012345678"), "010-1234-5678");
    }

    #[test]
    fn mobile_ten_digits_split_3_3_4() {
        assert_eq!(format_phone("0111234567"), "011-123-4567");
    }

    #[test]
    fn mobile_with_spaces_is_stripped() {
        assert_eq!(format_phone("010 1234 5678"), "010-1234-5678");
    }

    #[test]
    fn seoul_ten_digits() {
        assert_eq!(format_phone("0212345678"), "02-1234-5678");
    }

    #[test]
    fn seoul_nine_digits() {
        assert_eq!(format_phone("021234567"), "02-123-4567");
    }

    #[test]
    fn regional_area_code() {
        assert_eq!(format_phone("0311234567"), "031-123-4567");
    }

    #[test]
    fn regional_eleven_digits() {
        assert_eq!(format_phone("05512345678"), "055-1234-5678");
    }

    #[test]
    fn already_formatted_is_stable() {
        assert_eq!(format_phone("010-1234-5678"), "010-1234-5678");
        assert_eq!(format_phone("02-1234-5678"), "02-1234-5678");
    }

    #[test]
    fn unrecognized_returned_unchanged() {
        assert_eq!(format_phone("1588-1234"), "1588-1234");
        assert_eq!(format_phone("call me"), "call me");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn short_number_not_formatted() {
        assert_eq!(format_phone("0311234"), "0311234");
    }

    #[test]
    fn digit_detection() {
        assert!(has_digit("20,800 kcal"));
        assert!(!has_digit("many"));
        assert!(!has_digit(""));
    }

    #[test]
    fn full_width_digits_are_folded() {
        assert_eq!(format_phone("０１０１２３４５６７８"), "010-1234-5678");
        assert_eq!(format_phone("０２－１２３４－５６７８"), "02-1234-5678");
        assert!(has_digit("２만 kcal"));
    }
}
