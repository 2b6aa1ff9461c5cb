//! Persistence layer.
//!
//! [`MessageStore`] defines the interface the services depend on. The default
//! implementation is [`AnyStore`], a sqlx `Any` pool. To swap to another
//! database (Postgres, MySQL, …), point the connection URL at it and add a
//! matching migration set.
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod dao;
pub mod message;

pub use dao::{MessageRecord, NewMessage};
pub use message::MessageStore;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};

#[derive(Clone, Debug)]
pub struct AnyStore {
    pool: sqlx::Pool<sqlx::Any>,
}

impl AnyStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible URL, e.g.
    /// `"sqlite://chatlog.db?mode=rwc"` or `"sqlite::memory:"` for tests.
    /// An in-memory database lives inside a single connection, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let options = AnyConnectOptions::from_str(url)?;
        let pool_options = if is_memory_url(url) {
            AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = pool_options.connect_with(options).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Round-trip a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        debug_assert_eq!(one, 1);
        Ok(())
    }

    /// Close every pooled connection. Further calls fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Same shape the store writes (`strftime('%Y-%m-%dT%H:%M:%fZ')`): fixed
/// width, millisecond precision, so text order in SQL is chronological.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A stored `created_at` that does not parse is a decode failure, never a
/// substituted value.
pub(crate) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
