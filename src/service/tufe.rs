use chrono::NaiveDate;
use sqlx::{Pool, Sqlite, Transaction, pool::PoolConnection};

use crate::{
    dao::tufe::TufeDao,
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{PaginationInput, TufeAddInputType, TufeDetailType, TufeUpdateInputType},
    },
};

/**
 * Represents the service for managing TUFE records.
 *
 * Every call acquires its own connection or transaction from the pool and releases it before returning.
 */
pub struct TufeService {
    /**
     * The DAO for TUFE record operations.
     */
    tufe_dao: TufeDao,
    /**
     * Connection pool for database operations.
     */
    connection_pool: Pool<Sqlite>,
}

impl TufeService {
    /**
     * Creates a new instance of `TufeService`.
     *
     * # Arguments
     * `tufe_dao`: The DAO for TUFE record operations.
     * `connection_pool`: Connection pool for database operations.
     *
     * # Returns
     * A new instance of `TufeService`.
     */
    pub fn new(tufe_dao: TufeDao, connection_pool: Pool<Sqlite>) -> Self {
        TufeService { tufe_dao, connection_pool }
    }

    /**
     * Retrieves a page of records.
     *
     * # Arguments
     * `pagination_input`: `PaginationInput` containing skip and limit.
     *
     * # Returns
     * A Result containing the records ordered by month or an `ApplicationError`.
     */
    pub async fn get_tufe_list(&self, pagination_input: PaginationInput) -> Result<Vec<TufeDetailType>, ApplicationError> {
        let mut connection = self.acquire().await?;
        self.tufe_dao.get_tufe_list(&mut connection, pagination_input).await
    }

    /**
     * Retrieves the record for a month.
     */
    pub async fn get_tufe(&self, month: NaiveDate) -> Result<TufeDetailType, ApplicationError> {
        let mut connection = self.acquire().await?;
        self.tufe_dao.get_tufe_by_month(&mut connection, month).await
    }

    /**
     * Adds a new record.
     *
     * # Arguments
     * `tufe_add_input`: The validated record to add.
     *
     * # Returns
     * The stored record, or a `Conflict` error if the month already has a record.
     */
    pub async fn add_tufe(&self, tufe_add_input: TufeAddInputType) -> Result<TufeDetailType, ApplicationError> {
        let mut transaction = self.begin().await?;
        let result = self.tufe_dao.add_tufe(&mut transaction, tufe_add_input).await;
        Self::finish(transaction, result).await
    }

    /**
     * Applies a partial update to the record for a month.
     *
     * # Arguments
     * `month`: The month of the record to update.
     * `tufe_update_input`: The fields supplied by the caller.
     *
     * # Returns
     * The updated record, or a `NotFound` error if no record exists for the month.
     */
    pub async fn update_tufe(&self, month: NaiveDate, tufe_update_input: TufeUpdateInputType) -> Result<TufeDetailType, ApplicationError> {
        let mut transaction = self.begin().await?;
        let result = self.merge_and_update(&mut transaction, month, tufe_update_input).await;
        Self::finish(transaction, result).await
    }

    /**
     * Deletes the record for a month.
     */
    pub async fn delete_tufe(&self, month: NaiveDate) -> Result<(), ApplicationError> {
        let mut transaction = self.begin().await?;
        let result = self.tufe_dao.delete_tufe(&mut transaction, month).await;
        Self::finish(transaction, result).await
    }

    async fn merge_and_update(&self, transaction: &mut Transaction<'static, Sqlite>, month: NaiveDate, tufe_update_input: TufeUpdateInputType) -> Result<TufeDetailType, ApplicationError> {
        let existing = self.tufe_dao.get_tufe_by_month(transaction, month).await?;
        let merged = existing.merge(tufe_update_input);
        self.tufe_dao.update_tufe(transaction, &merged).await?;
        Ok(merged)
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, ApplicationError> {
        self.connection_pool.acquire().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to acquire connection: {err}")))
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>, ApplicationError> {
        self.connection_pool.begin().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to begin transaction: {err}")))
    }

    /**
     * Commits the transaction on success and rolls it back on failure.
     */
    async fn finish<T>(transaction: Transaction<'static, Sqlite>, result: Result<T, ApplicationError>) -> Result<T, ApplicationError> {
        match result {
            Ok(value) => {
                transaction.commit().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to commit transaction: {err}")))?;
                Ok(value)
            }
            Err(err) => {
                transaction.rollback().await.map_err(|err| ApplicationError::new(ErrorType::DatabaseError, format!("Failed to rollback transaction: {err}")))?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::*;
    use crate::dao::init_test_pool;

    fn add_input(month: NaiveDate) -> TufeAddInputType {
        TufeAddInputType {
            month,
            general_tufe: Decimal::new(250000, 2),
            general_tufe_change_rate: Decimal::new(345, 2),
            health: Decimal::new(900, 2),
            energy: Decimal::new(1800, 2),
            food_and_non_alcoholic_beverages: Decimal::new(2700, 2),
            communication: Decimal::new(350, 2),
            transportation: Decimal::new(4100, 2),
        }
    }

    #[actix_web::test]
    async fn test_duplicate_add_keeps_first_record() {
        let service = TufeService::new(TufeDao::new(), init_test_pool().await);
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let first = service.add_tufe(add_input(month)).await.unwrap();
        let duplicate = TufeAddInputType { health: Decimal::new(1, 0), ..add_input(month) };
        assert_eq!(service.add_tufe(duplicate).await.unwrap_err().error_type, ErrorType::Conflict);
        assert_eq!(service.get_tufe(month).await.unwrap(), first);
    }

    #[actix_web::test]
    async fn test_update_merges_and_persists() {
        let service = TufeService::new(TufeDao::new(), init_test_pool().await);
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let stored = service.add_tufe(add_input(month)).await.unwrap();
        let updated = service.update_tufe(month, TufeUpdateInputType { health: Some(Decimal::new(1250, 2)), ..Default::default() }).await.unwrap();
        assert_eq!(updated, TufeDetailType { health: Decimal::new(1250, 2), ..stored });
        assert_eq!(service.get_tufe(month).await.unwrap(), updated);
    }

    #[actix_web::test]
    async fn test_update_missing_month_not_found() {
        let service = TufeService::new(TufeDao::new(), init_test_pool().await);
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let err = service.update_tufe(month, TufeUpdateInputType::default()).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::NotFound);
    }

    #[actix_web::test]
    async fn test_delete_then_get_not_found() {
        let service = TufeService::new(TufeDao::new(), init_test_pool().await);
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        service.add_tufe(add_input(month)).await.unwrap();
        service.delete_tufe(month).await.unwrap();
        assert_eq!(service.get_tufe(month).await.unwrap_err().error_type, ErrorType::NotFound);
        assert_eq!(service.delete_tufe(month).await.unwrap_err().error_type, ErrorType::NotFound);
    }
}
