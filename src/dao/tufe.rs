use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::{Instrument, instrument};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    db::TufeRow,
    models::{PaginationInput, TufeAddInputType, TufeDetailType},
    validation::format_month,
};

/**
 * SQL query to retrieve a page of records ordered by month.
 */
const QUERY_TUFE_LIST: &str = "SELECT id, month, general_tufe, general_tufe_change_rate, health, energy, food_and_non_alcoholic_beverages, communication, transportation
                               FROM tuik_tufe_records ORDER BY month LIMIT ? OFFSET ?";

/**
 * SQL query to retrieve the record for a month.
 */
const QUERY_TUFE_BY_MONTH: &str = "SELECT id, month, general_tufe, general_tufe_change_rate, health, energy, food_and_non_alcoholic_beverages, communication, transportation
                                   FROM tuik_tufe_records WHERE month = ?";

/**
 * SQL query to add a new record.
 */
const ADD_TUFE: &str = "INSERT INTO tuik_tufe_records (month, general_tufe, general_tufe_change_rate, health, energy, food_and_non_alcoholic_beverages, communication, transportation)
                        VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

/**
 * SQL query to update a record identified by its surrogate id.
 */
const UPDATE_TUFE: &str = "UPDATE tuik_tufe_records SET month = ?, general_tufe = ?, general_tufe_change_rate = ?, health = ?, energy = ?, food_and_non_alcoholic_beverages = ?, communication = ?, transportation = ?
                           WHERE id = ?";

/**
 * SQL query to delete the record for a month.
 */
const DELETE_TUFE: &str = "DELETE FROM tuik_tufe_records WHERE month = ?";

/**
 * DAO for TUFE record operations.
 */
pub struct TufeDao {}

impl TufeDao {
    /**
     * Creates a new instance of `TufeDao`.
     *
     * # Returns
     * A new instance of `TufeDao`.
     */
    pub fn new() -> Self {
        TufeDao {}
    }

    /**
     * Retrieves a page of records ordered by month ascending.
     *
     * # Arguments
     * `connection`: The database connection.
     * `pagination_input`: Number of records to skip and maximum number to return.
     *
     * # Returns
     * A Result containing the records or an `ApplicationError`.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_tufe_list(&self, connection: &mut SqliteConnection, pagination_input: PaginationInput) -> Result<Vec<TufeDetailType>, ApplicationError> {
        let span = tracing::Span::current();
        let results: Vec<TufeRow> = sqlx::query_as(QUERY_TUFE_LIST)
            .bind(pagination_input.limit)
            .bind(pagination_input.skip)
            .fetch_all(connection)
            .instrument(span)
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to get tufe list: {err}")))?;
        Ok(results.into_iter().map(TufeDetailType::from).collect())
    }

    /**
     * Retrieves the record for a month.
     *
     * # Arguments
     * `connection`: The database connection.
     * `month`: The month of the record.
     *
     * # Returns
     * The record, or a `NotFound` error if no record exists for the month.
     */
    #[instrument(skip(self, connection), fields(result))]
    pub async fn get_tufe_by_month(&self, connection: &mut SqliteConnection, month: NaiveDate) -> Result<TufeDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let result: Option<TufeRow> = sqlx::query_as(QUERY_TUFE_BY_MONTH)
            .bind(month)
            .fetch_optional(connection)
            .instrument(span)
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to get tufe record: {err}")))?;
        match result {
            Some(row) => Ok(TufeDetailType::from(row)),
            None => {
                tracing::debug!("Tufe record for month {} not found", month);
                Err(ApplicationError::new(ErrorType::NotFound, "TUFE record not found".to_string()))
            }
        }
    }

    /**
     * Adds a new record to the database.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `tufe_add_input`: The validated record to add.
     *
     * # Returns
     * The stored record including its assigned id, or a `Conflict` error if the month already exists.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn add_tufe(&self, transaction: &mut SqliteConnection, tufe_add_input: TufeAddInputType) -> Result<TufeDetailType, ApplicationError> {
        let span = tracing::Span::current();
        let row = TufeRow::try_from(&tufe_add_input)?;
        let result = sqlx::query(ADD_TUFE)
            .bind(row.month)
            .bind(row.general_tufe)
            .bind(row.general_tufe_change_rate)
            .bind(row.health)
            .bind(row.energy)
            .bind(row.food_and_non_alcoholic_beverages)
            .bind(row.communication)
            .bind(row.transportation)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(err.as_database_error(), &row.month))?;
        Ok(TufeDetailType::from_add_input(result.last_insert_rowid(), tufe_add_input))
    }

    /**
     * Writes every field of a record back to the database.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `tufe_detail`: The record to store, identified by its id.
     *
     * # Returns
     * A result indicating success or failure of the operation.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn update_tufe(&self, transaction: &mut SqliteConnection, tufe_detail: &TufeDetailType) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let row = TufeRow::try_from(tufe_detail)?;
        let result = sqlx::query(UPDATE_TUFE)
            .bind(row.month)
            .bind(row.general_tufe)
            .bind(row.general_tufe_change_rate)
            .bind(row.health)
            .bind(row.energy)
            .bind(row.food_and_non_alcoholic_beverages)
            .bind(row.communication)
            .bind(row.transportation)
            .bind(row.id)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| Self::handle_database_error(err.as_database_error(), &row.month))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Tufe record with id {} not found for update", row.id);
            return Err(ApplicationError::new(ErrorType::NotFound, "TUFE record not found".to_string()));
        }
        if result.rows_affected() > 1 {
            tracing::warn!("Multiple tufe records attempted updated. Rolled back");
            return Err(ApplicationError::new(ErrorType::DatabaseError, "Multiple tufe records attempted updated. Rolled back".to_string()));
        }
        Ok(())
    }

    /**
     * Deletes the record for a month.
     *
     * # Arguments
     * `transaction`: The database transaction to execute the query within.
     * `month`: The month of the record to delete.
     *
     * # Returns
     * A result indicating success, or a `NotFound` error if no record exists for the month.
     */
    #[instrument(skip(self, transaction), fields(result))]
    pub async fn delete_tufe(&self, transaction: &mut SqliteConnection, month: NaiveDate) -> Result<(), ApplicationError> {
        let span = tracing::Span::current();
        let result = sqlx::query(DELETE_TUFE)
            .bind(month)
            .execute(transaction)
            .instrument(span)
            .await
            .map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to execute query to delete tufe record: {err}")))?;
        if result.rows_affected() == 0 {
            tracing::debug!("Tufe record for month {} not found for deletion", month);
            return Err(ApplicationError::new(ErrorType::NotFound, "TUFE record not found".to_string()));
        }
        if result.rows_affected() > 1 {
            tracing::warn!("Multiple tufe records attempted deleted. Rolled back");
            return Err(ApplicationError::new(ErrorType::DatabaseError, "Multiple tufe records attempted deleted. Rolled back".to_string()));
        }
        Ok(())
    }

    /**
     * Handles database errors from add and update and maps them to application errors.
     *
     * # Arguments
     * `error`: The database error to handle.
     * `month`: The month being written.
     *
     * # Returns
     * An `ApplicationError` corresponding to the database error.
     */
    fn handle_database_error(error: Option<&dyn sqlx::error::DatabaseError>, month: &NaiveDate) -> ApplicationError {
        if let Some(db_error) = error {
            tracing::debug!("Database error: {}", db_error);
            if db_error.is_unique_violation() {
                return ApplicationError::new(ErrorType::Conflict, format!("A record for month {} already exists", format_month(month)));
            }
            tracing::error!("Unhandled database error: {}", db_error);
            return ApplicationError::new(ErrorType::DatabaseError, format!("Unhandled database error: {db_error}"));
        }
        ApplicationError::new(ErrorType::DatabaseError, "Failed to execute database operation".to_string())
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::*;
    use crate::dao::init_test_pool;

    fn add_input(year: i32, month: u32) -> TufeAddInputType {
        TufeAddInputType {
            month: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            general_tufe: Decimal::new(180250, 2),
            general_tufe_change_rate: Decimal::new(667, 2),
            health: Decimal::new(1100, 2),
            energy: Decimal::new(2050, 2),
            food_and_non_alcoholic_beverages: Decimal::new(3075, 2),
            communication: Decimal::new(500, 2),
            transportation: Decimal::new(4000, 2),
        }
    }

    #[actix_web::test]
    async fn test_add_then_get_tufe() {
        let pool = init_test_pool().await;
        let tufe_dao = TufeDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let stored = tufe_dao.add_tufe(&mut connection, add_input(2024, 1)).await.unwrap();
        assert!(stored.id > 0);
        let fetched = tufe_dao.get_tufe_by_month(&mut connection, stored.month).await.unwrap();
        assert_eq!(fetched, stored);
    }

    #[actix_web::test]
    async fn test_add_duplicate_month_conflict() {
        let pool = init_test_pool().await;
        let tufe_dao = TufeDao::new();
        let mut connection = pool.acquire().await.unwrap();
        tufe_dao.add_tufe(&mut connection, add_input(2024, 1)).await.unwrap();
        let err = tufe_dao.add_tufe(&mut connection, add_input(2024, 1)).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::Conflict);
        assert_eq!(err.message, "A record for month 2024-01-01 already exists");
    }

    #[actix_web::test]
    async fn test_get_missing_month_not_found() {
        let pool = init_test_pool().await;
        let tufe_dao = TufeDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let err = tufe_dao.get_tufe_by_month(&mut connection, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::NotFound);
    }

    #[actix_web::test]
    async fn test_list_ordered_by_month() {
        let pool = init_test_pool().await;
        let tufe_dao = TufeDao::new();
        let mut connection = pool.acquire().await.unwrap();
        for (year, month) in [(2024, 3), (2023, 12), (2024, 1)] {
            tufe_dao.add_tufe(&mut connection, add_input(year, month)).await.unwrap();
        }
        let records = tufe_dao.get_tufe_list(&mut connection, PaginationInput { skip: 0, limit: 10 }).await.unwrap();
        let months: Vec<String> = records.iter().map(|record| format_month(&record.month)).collect();
        assert_eq!(months, vec!["2023-12-01", "2024-01-01", "2024-03-01"]);
        let records = tufe_dao.get_tufe_list(&mut connection, PaginationInput { skip: 1, limit: 1 }).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(format_month(&records[0].month), "2024-01-01");
    }

    #[actix_web::test]
    async fn test_update_then_delete_tufe() {
        let pool = init_test_pool().await;
        let tufe_dao = TufeDao::new();
        let mut transaction = pool.begin().await.unwrap();
        let stored = tufe_dao.add_tufe(&mut transaction, add_input(2024, 1)).await.unwrap();
        let changed = TufeDetailType { health: Decimal::new(1250, 2), ..stored.clone() };
        tufe_dao.update_tufe(&mut transaction, &changed).await.unwrap();
        let fetched = tufe_dao.get_tufe_by_month(&mut transaction, stored.month).await.unwrap();
        assert_eq!(fetched, changed);
        tufe_dao.delete_tufe(&mut transaction, stored.month).await.unwrap();
        let err = tufe_dao.delete_tufe(&mut transaction, stored.month).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::NotFound);
        transaction.rollback().await.unwrap();
    }

    #[actix_web::test]
    async fn test_update_onto_existing_month_conflict() {
        let pool = init_test_pool().await;
        let tufe_dao = TufeDao::new();
        let mut connection = pool.acquire().await.unwrap();
        tufe_dao.add_tufe(&mut connection, add_input(2024, 1)).await.unwrap();
        let second = tufe_dao.add_tufe(&mut connection, add_input(2024, 2)).await.unwrap();
        let moved = TufeDetailType { month: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), ..second };
        let err = tufe_dao.update_tufe(&mut connection, &moved).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::Conflict);
    }

    #[actix_web::test]
    async fn test_update_missing_id_not_found() {
        let pool = init_test_pool().await;
        let tufe_dao = TufeDao::new();
        let mut connection = pool.acquire().await.unwrap();
        let missing = TufeDetailType::from_add_input(42, add_input(2024, 1));
        let err = tufe_dao.update_tufe(&mut connection, &missing).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::NotFound);
    }
}
