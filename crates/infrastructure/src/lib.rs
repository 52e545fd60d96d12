//! Postgres-backed storage for the pipeline's durable entities (§4.9, §10.4).

pub mod database;
pub mod repositories;

pub use database::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{PostgresDownloadJobRepository, PostgresScanRecordRepository, PostgresWatchUserRepository};
