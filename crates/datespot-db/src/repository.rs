//! Place store for PostgreSQL.
//!
//! One [`PgPlaceStore`] owns exactly one connection. A batch is written
//! row by row inside a single transaction, so a duplicate `kakao_id` within
//! the batch simply updates the row inserted moments earlier.

use datespot_core::config::StoreConfig;
use datespot_core::error::AppError;
use datespot_core::models::PlaceRow;
use datespot_core::traits::{PlaceStore, PlaceStoreConnector};
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::{debug, warn};

/// Insert-or-update statement for one place row.
///
/// Identity columns (`address`, `latitude`, `longitude`, `serial_number`) are
/// written on insert only. `image_urls` arrives as JSON text and is cast to
/// `jsonb` by the server.
pub const UPSERT_SQL: &str = r#"
    INSERT INTO places (
        name,
        category,
        address,
        review_summary,
        latitude,
        longitude,
        rating,
        image_urls,
        image_url,
        kakao_id,
        serial_number
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8::jsonb, $9, $10, $11)
    ON CONFLICT (kakao_id)
    DO UPDATE SET
        name = EXCLUDED.name,
        category = EXCLUDED.category,
        review_summary = EXCLUDED.review_summary,
        image_urls = EXCLUDED.image_urls,
        image_url = EXCLUDED.image_url,
        rating = EXCLUDED.rating
"#;

/// Opens place store connections from a [`StoreConfig`].
///
/// # Examples
///
/// ```no_run
/// use datespot_core::StoreConfig;
/// use datespot_core::traits::{PlaceStore, PlaceStoreConnector};
/// use datespot_db::PgPlaceConnector;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let connector = PgPlaceConnector::new(StoreConfig::default())?;
/// let store = connector.connect().await?;
/// store.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PgPlaceConnector {
    config: StoreConfig,
}

impl PgPlaceConnector {
    /// Creates a connector, rejecting charsets the store cannot hold Korean text in.
    pub fn new(config: StoreConfig) -> Result<Self, AppError> {
        config.client_encoding()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn connect_options(&self) -> PgConnectOptions {
        let config = &self.config;
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        // sqlx always negotiates client_encoding=UTF8, which is the only
        // encoding `client_encoding()` accepts.
        options
    }
}

impl PlaceStoreConnector for PgPlaceConnector {
    type Store = PgPlaceStore;

    async fn connect(&self) -> Result<PgPlaceStore, AppError> {
        debug!(
            host = %self.config.host,
            port = self.config.port,
            database = %self.config.database,
            "Connecting to place store"
        );
        let conn = PgConnection::connect_with(&self.connect_options()).await?;
        Ok(PgPlaceStore { conn })
    }
}

/// An open connection to the `places` table.
pub struct PgPlaceStore {
    conn: PgConnection,
}

async fn upsert_row(conn: &mut PgConnection, row: &PlaceRow) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(UPSERT_SQL)
        .bind(&row.name)
        .bind(&row.category)
        .bind(&row.address)
        .bind(&row.review_summary)
        .bind(row.latitude)
        .bind(row.longitude)
        .bind(row.rating)
        .bind(&row.image_urls)
        .bind(&row.image_url)
        .bind(&row.kakao_id)
        .bind(&row.serial_number)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

impl PlaceStore for PgPlaceStore {
    async fn upsert_all(&mut self, rows: &[PlaceRow]) -> Result<u64, AppError> {
        let mut tx = self.conn.begin().await?;
        let mut rows_affected = 0;

        for row in rows {
            match upsert_row(&mut tx, row).await {
                Ok(n) => rows_affected += n,
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "Rollback failed");
                    }
                    return Err(AppError::DatabaseError(e));
                }
            }
        }

        tx.commit().await?;
        Ok(rows_affected)
    }

    async fn close(self) -> Result<(), AppError> {
        self.conn.close().await.map_err(AppError::DatabaseError)
    }
}
