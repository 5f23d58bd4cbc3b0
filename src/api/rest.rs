use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{PaginationInput, TufeAddInputType, TufeDetailType, TufeUpdateInputType},
    validation::{format_month, parse_month, to_wire_number, validate_change_rate, validate_measurement},
};

/***************** Tufe models *********************/

/**
 * Request body for creating a record. Every field is required.
 */
#[derive(Debug, Deserialize)]
pub struct TufeAddRequest {
    pub month: String,
    pub general_tufe: f64,
    pub general_tufe_change_rate: f64,
    pub health: f64,
    pub energy: f64,
    pub food_and_non_alcoholic_beverages: f64,
    pub communication: f64,
    pub transportation: f64,
}

impl TryFrom<TufeAddRequest> for TufeAddInputType {
    type Error = ApplicationError;

    fn try_from(request: TufeAddRequest) -> Result<Self, Self::Error> {
        Ok(TufeAddInputType {
            month: parse_month(&request.month)?,
            general_tufe: validate_measurement("general_tufe", request.general_tufe, None)?,
            general_tufe_change_rate: validate_change_rate(request.general_tufe_change_rate)?,
            health: validate_measurement("health", request.health, None)?,
            energy: validate_measurement("energy", request.energy, None)?,
            food_and_non_alcoholic_beverages: validate_measurement("food_and_non_alcoholic_beverages", request.food_and_non_alcoholic_beverages, None)?,
            communication: validate_measurement("communication", request.communication, None)?,
            transportation: validate_measurement("transportation", request.transportation, None)?,
        })
    }
}

/**
 * Request body for a partial update. Absent and `null` fields are left untouched.
 */
#[derive(Debug, Default, Deserialize)]
pub struct TufeUpdateRequest {
    pub month: Option<String>,
    pub general_tufe: Option<f64>,
    pub general_tufe_change_rate: Option<f64>,
    pub health: Option<f64>,
    pub energy: Option<f64>,
    pub food_and_non_alcoholic_beverages: Option<f64>,
    pub communication: Option<f64>,
    pub transportation: Option<f64>,
}

impl TryFrom<TufeUpdateRequest> for TufeUpdateInputType {
    type Error = ApplicationError;

    fn try_from(request: TufeUpdateRequest) -> Result<Self, Self::Error> {
        let measurement = |field: &str, value: Option<f64>| value.map(|value| validate_measurement(field, value, None)).transpose();
        Ok(TufeUpdateInputType {
            month: request.month.as_deref().map(parse_month).transpose()?,
            general_tufe: measurement("general_tufe", request.general_tufe)?,
            general_tufe_change_rate: request.general_tufe_change_rate.map(validate_change_rate).transpose()?,
            health: measurement("health", request.health)?,
            energy: measurement("energy", request.energy)?,
            food_and_non_alcoholic_beverages: measurement("food_and_non_alcoholic_beverages", request.food_and_non_alcoholic_beverages)?,
            communication: measurement("communication", request.communication)?,
            transportation: measurement("transportation", request.transportation)?,
        })
    }
}

/**
 * Wire representation of a record. The surrogate id is not exposed.
 */
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TufeResponse {
    pub month: String,
    pub general_tufe: f64,
    pub general_tufe_change_rate: f64,
    pub health: f64,
    pub energy: f64,
    pub food_and_non_alcoholic_beverages: f64,
    pub communication: f64,
    pub transportation: f64,
}

impl From<TufeDetailType> for TufeResponse {
    fn from(record: TufeDetailType) -> Self {
        TufeResponse {
            month: format_month(&record.month),
            general_tufe: to_wire_number(record.general_tufe),
            general_tufe_change_rate: to_wire_number(record.general_tufe_change_rate),
            health: to_wire_number(record.health),
            energy: to_wire_number(record.energy),
            food_and_non_alcoholic_beverages: to_wire_number(record.food_and_non_alcoholic_beverages),
            communication: to_wire_number(record.communication),
            transportation: to_wire_number(record.transportation),
        }
    }
}

/**
 * Fixed message response used by the root and delete endpoints.
 */
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        MessageResponse { message: message.to_string() }
    }
}

/***************** Error models *********************/

/**
 * Custom error response for the application.
 */
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /**
     * The error code associated with the error type.
     */
    pub code: u16,
    /**
     * A human-readable message describing the error.
     */
    pub message: String,
}

impl ResponseError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        get_statuscode(&self.error_type)
    }

    /**
     * Generates an error response for the application error.
     */
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse { code: get_error_code(&self.error_type), message: self.message.clone() };
        HttpResponse::build(self.status_code()).json(&error_response)
    }
}

/**
* Maps application errors to HTTP status codes.
*
* # Arguments
* `application_error`: The type of error that occurred.
*
* # Returns
* The corresponding HTTP status code.
*/
fn get_statuscode(application_error: &ErrorType) -> StatusCode {
    match application_error {
        ErrorType::InvalidFormat | ErrorType::Validation | ErrorType::Conflict => StatusCode::BAD_REQUEST,
        ErrorType::NotFound => StatusCode::NOT_FOUND,
        ErrorType::Initialization | ErrorType::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/**
 * Maps application errors to error codes.
 *
 * # Arguments
 * `application_error`: The type of error that occurred.
 *
 * # Returns
 * The corresponding error code.
 */
fn get_error_code(application_error: &ErrorType) -> u16 {
    match application_error {
        ErrorType::Initialization => 1000,
        ErrorType::InvalidFormat => 1001,
        ErrorType::Validation => 1002,
        ErrorType::Conflict => 1003,
        ErrorType::NotFound => 1004,
        ErrorType::DatabaseError => 1005,
    }
}

/***************** Common models *********************/

/**
 * Pagination query parameters for the list endpoint.
 */
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    /**
     * Number of records to skip.
     */
    pub skip: Option<i64>,
    /**
     * Maximum number of records to return.
     */
    pub limit: Option<i64>,
}

impl From<PaginationQuery> for PaginationInput {
    fn from(query: PaginationQuery) -> Self {
        PaginationInput::new(query.skip, query.limit)
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    fn add_request() -> TufeAddRequest {
        TufeAddRequest {
            month: "2024-02-01".to_string(),
            general_tufe: 2000.5,
            general_tufe_change_rate: 4.53,
            health: 10.0,
            energy: 20.25,
            food_and_non_alcoholic_beverages: 30.75,
            communication: 0.0,
            transportation: 45.67,
        }
    }

    #[test]
    fn test_add_request_to_input() {
        let input = TufeAddInputType::try_from(add_request()).unwrap();
        assert_eq!(input.month, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(input.general_tufe, Decimal::new(200050, 2));
        assert_eq!(input.general_tufe_change_rate, Decimal::new(453, 2));
        assert_eq!(input.communication, Decimal::ZERO);
    }

    #[test]
    fn test_add_request_invalid_month() {
        let request = TufeAddRequest { month: "2024-13-01".to_string(), ..add_request() };
        assert_eq!(TufeAddInputType::try_from(request).unwrap_err().error_type, ErrorType::InvalidFormat);
    }

    #[test]
    fn test_add_request_out_of_range() {
        let request = TufeAddRequest { general_tufe_change_rate: 150.0, ..add_request() };
        assert_eq!(TufeAddInputType::try_from(request).unwrap_err().error_type, ErrorType::Validation);
        let request = TufeAddRequest { transportation: -0.01, ..add_request() };
        let err = TufeAddInputType::try_from(request).unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);
        assert!(err.message.contains("transportation"));
    }

    #[test]
    fn test_update_request_only_present_fields() {
        let request: TufeUpdateRequest = serde_json::from_str(r#"{"health": 12.5, "energy": null}"#).unwrap();
        let input = TufeUpdateInputType::try_from(request).unwrap();
        assert_eq!(input, TufeUpdateInputType { health: Some(Decimal::new(1250, 2)), ..Default::default() });
    }

    #[test]
    fn test_update_request_validates_present_fields() {
        let request = TufeUpdateRequest { general_tufe_change_rate: Some(100.01), ..Default::default() };
        assert_eq!(TufeUpdateInputType::try_from(request).unwrap_err().error_type, ErrorType::Validation);
        let request = TufeUpdateRequest { month: Some("2023-02-29".to_string()), ..Default::default() };
        assert_eq!(TufeUpdateInputType::try_from(request).unwrap_err().error_type, ErrorType::InvalidFormat);
    }

    #[test]
    fn test_response_hides_id() {
        let record = TufeDetailType::from_add_input(99, TufeAddInputType::try_from(add_request()).unwrap());
        let json = serde_json::to_value(TufeResponse::from(record)).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["month"], "2024-02-01");
        assert_eq!(json["general_tufe"], 2000.5);
        assert_eq!(json["transportation"], 45.67);
    }

    #[test]
    fn test_statuscode_mapping() {
        assert_eq!(get_statuscode(&ErrorType::InvalidFormat), StatusCode::BAD_REQUEST);
        assert_eq!(get_statuscode(&ErrorType::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(get_statuscode(&ErrorType::Conflict), StatusCode::BAD_REQUEST);
        assert_eq!(get_statuscode(&ErrorType::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(get_statuscode(&ErrorType::DatabaseError), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(get_statuscode(&ErrorType::Initialization), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
