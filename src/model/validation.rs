use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::model::apperror::{ApplicationError, ErrorType};

/**
 * Wire and storage format of a month.
 */
pub const MONTH_FORMAT: &str = "%Y-%m-%d";

/**
 * Number of fractional digits kept for every measurement.
 */
pub const DECIMAL_SCALE: u32 = 2;

/**
 * Upper bound for `general_tufe_change_rate`.
 */
const MAX_CHANGE_RATE: f64 = 100.0;

/**
 * Parses a month string in strict `YYYY-MM-DD` form.
 *
 * Non zero padded input such as `2024-1-05` is rejected, as are dates that do not exist
 * in the calendar (`2024-13-01`, `2023-02-29`).
 *
 * # Arguments
 * `month`: The month string received on the wire.
 *
 * # Returns
 * The parsed date or an `InvalidFormat` error.
 */
pub fn parse_month(month: &str) -> Result<NaiveDate, ApplicationError> {
    let invalid = || ApplicationError::new(ErrorType::InvalidFormat, "Invalid date format. Use YYYY-MM-DD".to_string());
    let date = NaiveDate::parse_from_str(month, MONTH_FORMAT).map_err(|_| invalid())?;
    if format_month(&date) != month {
        return Err(invalid());
    }
    Ok(date)
}

/**
 * Renders a month as `YYYY-MM-DD`.
 */
pub fn format_month(month: &NaiveDate) -> String {
    month.format(MONTH_FORMAT).to_string()
}

/**
 * Validates a measurement field and converts it to a decimal with two fractional digits.
 *
 * # Arguments
 * `field`: Name of the field, used in the error message.
 * `value`: The value received on the wire.
 * `max`: Optional inclusive upper bound.
 *
 * # Returns
 * The rounded decimal or a `Validation` error naming the field and the constraint.
 */
pub fn validate_measurement(field: &str, value: f64, max: Option<f64>) -> Result<Decimal, ApplicationError> {
    if !value.is_finite() {
        return Err(ApplicationError::new(ErrorType::Validation, format!("Field {field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(ApplicationError::new(ErrorType::Validation, format!("Field {field} must be greater than or equal to 0")));
    }
    if let Some(max) = max.filter(|max| value > *max) {
        return Err(ApplicationError::new(ErrorType::Validation, format!("Field {field} must be less than or equal to {max}")));
    }
    let out_of_range = || ApplicationError::new(ErrorType::Validation, format!("Field {field} is too large to be stored"));
    let decimal = Decimal::from_f64(value).ok_or_else(out_of_range)?;
    let decimal = decimal.round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if checked_hundredths(decimal).is_none() {
        return Err(out_of_range());
    }
    Ok(decimal)
}

/**
 * Validates `general_tufe_change_rate`, which is bounded to [0, 100].
 */
pub fn validate_change_rate(value: f64) -> Result<Decimal, ApplicationError> {
    validate_measurement("general_tufe_change_rate", value, Some(MAX_CHANGE_RATE))
}

/**
 * Converts a decimal into its storage form, integer hundredths.
 *
 * # Arguments
 * `value`: Decimal to convert.
 *
 * # Returns
 * The number of hundredths or a `Validation` error if it does not fit.
 */
pub fn to_hundredths(value: Decimal) -> Result<i64, ApplicationError> {
    checked_hundredths(value).ok_or_else(|| ApplicationError::new(ErrorType::Validation, format!("Value {value} is out of range")))
}

/**
 * Number of hundredths in `value`, `None` if it does not fit an `i64`.
 */
fn checked_hundredths(value: Decimal) -> Option<i64> {
    value
        .round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.trunc().to_i64())
}

/**
 * Converts the storage form, integer hundredths, back into a decimal.
 */
pub fn from_hundredths(hundredths: i64) -> Decimal {
    Decimal::new(hundredths, DECIMAL_SCALE)
}

/**
 * Converts a decimal into the floating point number sent on the wire.
 */
pub fn to_wire_number(value: Decimal) -> f64 {
    let rounded = value.round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::MidpointAwayFromZero);
    #[allow(clippy::cast_precision_loss)]
    let mantissa = rounded.mantissa() as f64;
    #[allow(clippy::cast_possible_wrap)]
    let scale = rounded.scale() as i32;
    mantissa / 10f64.powi(scale)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_month_valid() {
        let date = parse_month("2024-03-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_month_invalid_month() {
        let err = parse_month("2024-13-01").unwrap_err();
        assert_eq!(err.error_type, ErrorType::InvalidFormat);
        assert_eq!(err.message, "Invalid date format. Use YYYY-MM-DD");
    }

    #[test]
    fn test_parse_month_leap_day() {
        assert!(parse_month("2024-02-29").is_ok());
        assert_eq!(parse_month("2023-02-29").unwrap_err().error_type, ErrorType::InvalidFormat);
    }

    #[test]
    fn test_parse_month_not_strict() {
        assert!(parse_month("2024-1-05").is_err());
        assert!(parse_month("2024-01").is_err());
        assert!(parse_month("01-03-2024").is_err());
        assert!(parse_month(" 2024-01-01").is_err());
        assert!(parse_month("").is_err());
    }

    #[test]
    fn test_format_month() {
        assert_eq!(format_month(&NaiveDate::from_ymd_opt(2024, 2, 9).unwrap()), "2024-02-09");
    }

    #[test]
    fn test_change_rate_bounds() {
        assert_eq!(validate_change_rate(150.0).unwrap_err().error_type, ErrorType::Validation);
        assert_eq!(validate_change_rate(100.0).unwrap(), Decimal::new(100, 0));
        assert_eq!(validate_change_rate(0.0).unwrap(), Decimal::ZERO);
        assert_eq!(validate_change_rate(-0.01).unwrap_err().error_type, ErrorType::Validation);
    }

    #[test]
    fn test_measurement_error_names_field() {
        let err = validate_measurement("health", -1.0, None).unwrap_err();
        assert!(err.message.contains("health"));
        assert!(err.message.contains("greater than or equal to 0"));
        let err = validate_change_rate(100.5).unwrap_err();
        assert!(err.message.contains("general_tufe_change_rate"));
        assert!(err.message.contains("less than or equal to 100"));
    }

    #[test]
    fn test_measurement_rejects_non_finite() {
        assert!(validate_measurement("energy", f64::NAN, None).is_err());
        assert!(validate_measurement("energy", f64::INFINITY, None).is_err());
    }

    #[test]
    fn test_measurement_rounds_to_two_digits() {
        assert_eq!(validate_measurement("energy", 12.3456, None).unwrap(), Decimal::new(1235, 2));
        assert_eq!(validate_measurement("energy", 0.125, None).unwrap(), Decimal::new(13, 2));
        assert_eq!(validate_measurement("energy", 12.5, None).unwrap(), Decimal::new(1250, 2));
        assert_eq!(validate_measurement("energy", 1000.0, None).unwrap(), Decimal::new(1000, 0));
    }

    #[test]
    fn test_measurement_storage_limits() {
        assert_eq!(validate_measurement("general_tufe", 9.0e16, None).unwrap(), Decimal::new(90_000_000_000_000_000, 0));
        let err = validate_measurement("general_tufe", 1.0e17, None).unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);
        assert!(err.message.contains("general_tufe"));
        assert_eq!(validate_measurement("general_tufe", 1.0e27, None).unwrap_err().error_type, ErrorType::Validation);
        assert_eq!(validate_measurement("general_tufe", 7.9e28, None).unwrap_err().error_type, ErrorType::Validation);
        assert_eq!(validate_measurement("general_tufe", f64::MAX, None).unwrap_err().error_type, ErrorType::Validation);
    }

    #[test]
    fn test_hundredths_overflow_is_an_error() {
        assert_eq!(to_hundredths(Decimal::MAX).unwrap_err().error_type, ErrorType::Validation);
        assert_eq!(to_hundredths(Decimal::new(i64::MAX, 2)).unwrap(), i64::MAX);
        assert!(to_hundredths(Decimal::new(i64::MAX, 2) + Decimal::new(1, 2)).is_err());
    }

    #[test]
    fn test_hundredths_conversion() {
        assert_eq!(to_hundredths(Decimal::new(1250, 2)).unwrap(), 1250);
        assert_eq!(to_hundredths(Decimal::new(125, 1)).unwrap(), 1250);
        assert_eq!(to_hundredths(Decimal::new(100, 0)).unwrap(), 10000);
        assert_eq!(from_hundredths(1250), Decimal::new(125, 1));
    }

    #[test]
    fn test_to_wire_number() {
        assert_eq!(to_wire_number(Decimal::new(1250, 2)), 12.5);
        assert_eq!(to_wire_number(Decimal::new(4567, 2)), 45.67);
        assert_eq!(to_wire_number(Decimal::ZERO), 0.0);
    }
}
