use crate::DbError;
use chrono::NaiveDate;
use core_types::{PriceField, PriceRequest, PriceTable};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::Row;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches one price field for every requested instrument over
    /// `[request.start, request.end]` and pivots it into a `PriceTable`.
    ///
    /// Instruments with no stored bars are absent from the result. The date
    /// index is every trade date any requested instrument has a bar for.
    pub async fn get_price_table(&self, request: &PriceRequest) -> Result<PriceTable, DbError> {
        // The column name comes from a closed enum, never from user input.
        let query = format!(
            r#"
            SELECT symbol, trade_date, {} AS price
            FROM daily_prices
            WHERE symbol = ANY($1) AND interval = $2 AND adjust_type = $3
              AND trade_date >= $4 AND trade_date <= $5
            ORDER BY trade_date ASC, symbol ASC
            "#,
            price_column(request.field)
        );

        let rows = sqlx::query(&query)
            .bind(&request.instruments)
            .bind(request.frequency.as_str())
            .bind(request.adjust.as_str())
            .bind(request.start)
            .bind(request.end)
            .fetch_all(&self.pool)
            .await?;

        let observations = rows
            .iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>("symbol")?,
                    row.try_get::<NaiveDate, _>("trade_date")?,
                    row.try_get::<Option<Decimal>, _>("price")?,
                ))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let table = PriceTable::from_observations(observations);
        tracing::info!(
            requested = request.instruments.len(),
            found = table.instruments().len(),
            rows = table.len(),
            "Loaded price history from the database"
        );
        Ok(table)
    }

    /// Lists the symbols with at least one bar for the given interval and
    /// adjustment, for diagnosing instruments the price query leaves out.
    pub async fn get_available_symbols(
        &self,
        interval: &str,
        adjust_type: &str,
    ) -> Result<Vec<String>, DbError> {
        let symbols = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT symbol FROM daily_prices WHERE interval = $1 AND adjust_type = $2 ORDER BY symbol",
        )
        .bind(interval)
        .bind(adjust_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(symbols)
    }
}

fn price_column(field: PriceField) -> &'static str {
    match field {
        PriceField::Open => "open",
        PriceField::High => "high",
        PriceField::Low => "low",
        PriceField::Close => "close",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_price_field_maps_to_a_column() {
        assert_eq!(price_column(PriceField::Open), "open");
        assert_eq!(price_column(PriceField::High), "high");
        assert_eq!(price_column(PriceField::Low), "low");
        assert_eq!(price_column(PriceField::Close), "close");
    }
}
