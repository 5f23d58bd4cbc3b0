use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::apperror::{ApplicationError, ErrorType};

/**
 * Default number of records skipped when listing.
 */
pub const DEFAULT_SKIP: i64 = 0;

/**
 * Default maximum number of records returned when listing.
 */
pub const DEFAULT_LIMIT: i64 = 10;

/**
 * Pagination for the record list.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationInput {
    /**
     * Number of records to skip.
     */
    pub skip: i64,
    /**
     * Maximum number of records to return.
     */
    pub limit: i64,
}

impl PaginationInput {
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        PaginationInput { skip: skip.unwrap_or(DEFAULT_SKIP), limit: limit.unwrap_or(DEFAULT_LIMIT) }
    }

    /**
     * Validates the pagination input.
     *
     * # Returns
     * The pagination input or a `Validation` error if skip or limit is negative.
     */
    pub fn validate(self) -> Result<Self, ApplicationError> {
        if self.skip < 0 {
            return Err(ApplicationError::new(ErrorType::Validation, "skip must be greater than or equal to 0".to_string()));
        }
        if self.limit < 0 {
            return Err(ApplicationError::new(ErrorType::Validation, "limit must be greater than or equal to 0".to_string()));
        }
        Ok(self)
    }
}

/**
 * A stored TUFE record.
 *
 * `id` is the surrogate key assigned by the database and never leaves the service.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct TufeDetailType {
    pub id: i64,
    pub month: NaiveDate,
    pub general_tufe: Decimal,
    pub general_tufe_change_rate: Decimal,
    pub health: Decimal,
    pub energy: Decimal,
    pub food_and_non_alcoholic_beverages: Decimal,
    pub communication: Decimal,
    pub transportation: Decimal,
}

impl TufeDetailType {
    /**
     * Applies the fields present in an update over this record.
     *
     * # Arguments
     * `update`: The fields supplied by the caller.
     *
     * # Returns
     * The merged record. Absent fields keep their stored value.
     */
    pub fn merge(self, update: TufeUpdateInputType) -> Self {
        TufeDetailType {
            id: self.id,
            month: update.month.unwrap_or(self.month),
            general_tufe: update.general_tufe.unwrap_or(self.general_tufe),
            general_tufe_change_rate: update.general_tufe_change_rate.unwrap_or(self.general_tufe_change_rate),
            health: update.health.unwrap_or(self.health),
            energy: update.energy.unwrap_or(self.energy),
            food_and_non_alcoholic_beverages: update.food_and_non_alcoholic_beverages.unwrap_or(self.food_and_non_alcoholic_beverages),
            communication: update.communication.unwrap_or(self.communication),
            transportation: update.transportation.unwrap_or(self.transportation),
        }
    }

    /**
     * Builds the stored form of a freshly inserted record.
     */
    pub fn from_add_input(id: i64, input: TufeAddInputType) -> Self {
        TufeDetailType {
            id,
            month: input.month,
            general_tufe: input.general_tufe,
            general_tufe_change_rate: input.general_tufe_change_rate,
            health: input.health,
            energy: input.energy,
            food_and_non_alcoholic_beverages: input.food_and_non_alcoholic_beverages,
            communication: input.communication,
            transportation: input.transportation,
        }
    }
}

/**
 * Validated input for creating a record.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct TufeAddInputType {
    pub month: NaiveDate,
    pub general_tufe: Decimal,
    pub general_tufe_change_rate: Decimal,
    pub health: Decimal,
    pub energy: Decimal,
    pub food_and_non_alcoholic_beverages: Decimal,
    pub communication: Decimal,
    pub transportation: Decimal,
}

/**
 * Validated input for a partial update. `None` means the field was not supplied.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TufeUpdateInputType {
    pub month: Option<NaiveDate>,
    pub general_tufe: Option<Decimal>,
    pub general_tufe_change_rate: Option<Decimal>,
    pub health: Option<Decimal>,
    pub energy: Option<Decimal>,
    pub food_and_non_alcoholic_beverages: Option<Decimal>,
    pub communication: Option<Decimal>,
    pub transportation: Option<Decimal>,
}
