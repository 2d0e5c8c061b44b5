use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Duplicate column '{0}' in table")]
    DuplicateColumn(String),

    #[error("Duplicate row for date {0} in table")]
    DuplicateDate(NaiveDate),

    #[error("Unknown instrument '{0}'")]
    UnknownInstrument(String),

    #[error("Column '{column}' has {actual} values but the table has {expected} dates")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Date arithmetic overflowed around {0}")]
    DateOverflow(NaiveDate),
}
