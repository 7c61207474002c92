//! Identity code decoding.
//!
//! The first two characters carry the birth year, the seventh carries sex.

use super::AnalysisError;
use crate::models::{DecodedAttributes, Sex};
use std::ops::RangeInclusive;

/// Year ages are computed against unless configured otherwise.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2019;

/// Reference years accepted from the command line and the config file.
pub const REFERENCE_YEARS: RangeInclusive<i32> = 1900..=9999;

/// Two-digit years that map to a birth year at or below this are moved
/// into the 2000s.
const CENTURY_PIVOT: i32 = 1901;

const SEX_DIGIT_INDEX: usize = 6;
const FEMALE_BELOW: char = '5';

/// Decode sex and age from an identity code.
pub fn decode(identity_code: &str, reference_year: i32) -> Result<DecodedAttributes, AnalysisError> {
    Ok(DecodedAttributes {
        sex: extract_sex(identity_code)?,
        age: reference_year - extract_birth_year(identity_code)?,
    })
}

/// Sex from the seventh character: below `'5'` is female.
pub fn extract_sex(identity_code: &str) -> Result<Sex, AnalysisError> {
    let digit = identity_code
        .chars()
        .nth(SEX_DIGIT_INDEX)
        .ok_or_else(|| malformed(identity_code, "shorter than 7 characters"))?;

    Ok(if digit < FEMALE_BELOW {
        Sex::Female
    } else {
        Sex::Male
    })
}

/// Four-digit birth year from the two-digit prefix.
pub fn extract_birth_year(identity_code: &str) -> Result<i32, AnalysisError> {
    let mut chars = identity_code.chars();
    let (tens, units) = match (chars.next(), chars.next()) {
        (Some(t), Some(u)) => (t, u),
        _ => return Err(malformed(identity_code, "shorter than 7 characters")),
    };

    let (tens, units) = match (tens.to_digit(10), units.to_digit(10)) {
        (Some(t), Some(u)) => (t, u),
        _ => return Err(malformed(identity_code, "year prefix is not two digits")),
    };

    let mut year = 1900 + (tens * 10 + units) as i32;
    if year <= CENTURY_PIVOT {
        year += 100;
    }

    Ok(year)
}

fn malformed(code: &str, reason: &'static str) -> AnalysisError {
    AnalysisError::MalformedIdentityCode {
        code: code.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sex_from_seventh_character() {
        assert_eq!(extract_sex("8501234567890").unwrap(), Sex::Female);
        assert_eq!(extract_sex("8501235567890").unwrap(), Sex::Male);
        assert_eq!(extract_sex("8501234").unwrap(), Sex::Female);
    }

    #[test]
    fn test_sex_boundary_digits() {
        assert_eq!(extract_sex("0000004").unwrap(), Sex::Female);
        assert_eq!(extract_sex("0000005").unwrap(), Sex::Male);
    }

    #[test]
    fn test_age_from_year_prefix() {
        assert_eq!(decode("8501234567890", 2019).unwrap().age, 34);
    }

    #[test]
    fn test_century_pivot_boundary() {
        assert_eq!(extract_birth_year("0006789").unwrap(), 2000);
        assert_eq!(extract_birth_year("0106789").unwrap(), 2001);
        assert_eq!(extract_birth_year("0206789").unwrap(), 1902);
        assert_eq!(decode("0106789", 2019).unwrap().age, 18);
        assert_eq!(decode("0206789", 2019).unwrap().age, 117);
        assert_eq!(decode("0006789", 2019).unwrap().age, 19);
    }

    #[test]
    fn test_reference_year_is_configurable() {
        assert_eq!(decode("8501234", 2024).unwrap().age, 39);
    }

    #[test]
    fn test_short_code_is_rejected() {
        let err = decode("850123", DEFAULT_REFERENCE_YEAR).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedIdentityCode { .. }));
        assert!(decode("", DEFAULT_REFERENCE_YEAR).is_err());
    }

    #[test]
    fn test_non_digit_year_is_rejected() {
        let err = decode("X501234567", DEFAULT_REFERENCE_YEAR).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MalformedIdentityCode {
                code: "X501234567".to_string(),
                reason: "year prefix is not two digits",
            }
        );
    }

    #[test]
    fn test_implausible_age_is_not_validated() {
        // Born in 2001 relative to an earlier reference year.
        assert_eq!(decode("0106789", 1990).unwrap().age, -11);
    }

    proptest! {
        #[test]
        fn prop_sex_follows_digit_rule(prefix in "[0-9]{6}", digit in 0u32..10, rest in "[0-9]{0,6}") {
            let code = format!("{}{}{}", prefix, digit, rest);
            let expected = if digit < 5 { Sex::Female } else { Sex::Male };
            prop_assert_eq!(extract_sex(&code).unwrap(), expected);
        }

        #[test]
        fn prop_birth_year_in_window(code in "[0-9]{13}") {
            let year = extract_birth_year(&code).unwrap();
            prop_assert!((1902..=2001).contains(&year));
        }
    }
}
