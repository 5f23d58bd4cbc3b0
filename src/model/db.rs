use chrono::NaiveDate;

use crate::model::{
    apperror::ApplicationError,
    models::{TufeAddInputType, TufeDetailType},
    validation::{from_hundredths, to_hundredths},
};

/**
 * Row of the `tuik_tufe_records` table. Measurements are integer hundredths.
 */
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TufeRow {
    pub id: i64,
    pub month: NaiveDate,
    pub general_tufe: i64,
    pub general_tufe_change_rate: i64,
    pub health: i64,
    pub energy: i64,
    pub food_and_non_alcoholic_beverages: i64,
    pub communication: i64,
    pub transportation: i64,
}

impl From<TufeRow> for TufeDetailType {
    fn from(row: TufeRow) -> Self {
        TufeDetailType {
            id: row.id,
            month: row.month,
            general_tufe: from_hundredths(row.general_tufe),
            general_tufe_change_rate: from_hundredths(row.general_tufe_change_rate),
            health: from_hundredths(row.health),
            energy: from_hundredths(row.energy),
            food_and_non_alcoholic_beverages: from_hundredths(row.food_and_non_alcoholic_beverages),
            communication: from_hundredths(row.communication),
            transportation: from_hundredths(row.transportation),
        }
    }
}

impl TryFrom<&TufeDetailType> for TufeRow {
    type Error = ApplicationError;

    fn try_from(record: &TufeDetailType) -> Result<Self, Self::Error> {
        Ok(TufeRow {
            id: record.id,
            month: record.month,
            general_tufe: to_hundredths(record.general_tufe)?,
            general_tufe_change_rate: to_hundredths(record.general_tufe_change_rate)?,
            health: to_hundredths(record.health)?,
            energy: to_hundredths(record.energy)?,
            food_and_non_alcoholic_beverages: to_hundredths(record.food_and_non_alcoholic_beverages)?,
            communication: to_hundredths(record.communication)?,
            transportation: to_hundredths(record.transportation)?,
        })
    }
}

impl TryFrom<&TufeAddInputType> for TufeRow {
    type Error = ApplicationError;

    /**
     * Converts create input into a row. The id is assigned by the database on insert.
     */
    fn try_from(input: &TufeAddInputType) -> Result<Self, Self::Error> {
        TufeRow::try_from(&TufeDetailType::from_add_input(0, input.clone()))
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_row_to_detail() {
        let row = TufeRow {
            id: 3,
            month: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            general_tufe: 123456,
            general_tufe_change_rate: 10000,
            health: 0,
            energy: 1,
            food_and_non_alcoholic_beverages: 990,
            communication: 1250,
            transportation: 999_99,
        };
        let detail = TufeDetailType::from(row.clone());
        assert_eq!(detail.general_tufe, Decimal::new(123456, 2));
        assert_eq!(detail.general_tufe_change_rate, Decimal::new(100, 0));
        assert_eq!(detail.energy, Decimal::new(1, 2));
        assert_eq!(TufeRow::try_from(&detail).unwrap(), row);
    }
}
