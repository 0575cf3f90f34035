use crate::error::AppResult;
use crate::presentation::instrument::PriceType;
use crate::storage::records::{NewPriceRecord, PersistedPriceRecord, PriceRepository};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

const COLUMNS: &str = "id, name, buy_price, sell_price, timestamp_millis, bank";

/// Price history stored in PostgreSQL, one append-only table per price type
#[derive(Debug, Clone)]
pub struct PgPriceRepository {
    pool: PgPool,
}

impl PgPriceRepository {
    /// Creates a repository over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the price tables and their indexes if they do not exist
    pub async fn initialize_tables(&self) -> Result<(), sqlx::Error> {
        info!("Initializing price history tables...");

        for price_type in [PriceType::Currency, PriceType::Metal] {
            let table = price_type.table_name();
            let scale = price_type.numeric_scale();

            sqlx::query(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id BIGSERIAL PRIMARY KEY,
                    name VARCHAR(64) NOT NULL,
                    buy_price NUMERIC(19,{scale}) NOT NULL,
                    sell_price NUMERIC(19,{scale}) NOT NULL,
                    timestamp_millis BIGINT NOT NULL,
                    bank VARCHAR(64) NOT NULL
                )
                "#
            ))
            .execute(&self.pool)
            .await?;

            let indexes = [
                format!("CREATE INDEX IF NOT EXISTS idx_{table}_name ON {table}(name)"),
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_name_ts ON {table}(name, timestamp_millis DESC)"
                ),
            ];
            for index_sql in &indexes {
                sqlx::query(index_sql).execute(&self.pool).await?;
            }
        }

        info!("Price history tables ready");
        Ok(())
    }
}

#[async_trait]
impl PriceRepository for PgPriceRepository {
    async fn find_latest_by_name(
        &self,
        price_type: PriceType,
        name: &str,
    ) -> AppResult<Option<PersistedPriceRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE name = $1 \
             ORDER BY timestamp_millis DESC, id DESC LIMIT 1",
            price_type.table_name()
        );
        let record = sqlx::query_as::<_, PersistedPriceRecord>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn save(
        &self,
        price_type: PriceType,
        record: &NewPriceRecord,
    ) -> AppResult<PersistedPriceRecord> {
        let sql = format!(
            "INSERT INTO {} (name, buy_price, sell_price, timestamp_millis, bank) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}",
            price_type.table_name()
        );
        let saved = sqlx::query_as::<_, PersistedPriceRecord>(&sql)
            .bind(&record.name)
            .bind(record.buy_price)
            .bind(record.sell_price)
            .bind(record.timestamp_millis)
            .bind(&record.bank)
            .fetch_one(&self.pool)
            .await?;
        debug!("Inserted {} row {} for {}", price_type, saved.id, saved.name);
        Ok(saved)
    }

    async fn find_latest_per_name(
        &self,
        price_type: PriceType,
    ) -> AppResult<Vec<PersistedPriceRecord>> {
        let sql = format!(
            "SELECT DISTINCT ON (name) {COLUMNS} FROM {} \
             ORDER BY name, timestamp_millis DESC, id DESC",
            price_type.table_name()
        );
        let records = sqlx::query_as::<_, PersistedPriceRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_history(
        &self,
        price_type: PriceType,
        name: &str,
        from_millis: i64,
        to_millis: i64,
    ) -> AppResult<Vec<PersistedPriceRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} \
             WHERE name = $1 AND timestamp_millis >= $2 AND timestamp_millis < $3 \
             ORDER BY timestamp_millis ASC, id ASC",
            price_type.table_name()
        );
        let records = sqlx::query_as::<_, PersistedPriceRecord>(&sql)
            .bind(name)
            .bind(from_millis)
            .bind(to_millis)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }
}
