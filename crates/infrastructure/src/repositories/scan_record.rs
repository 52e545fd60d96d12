use acquisitiond_core::{Result, ScanRecord, ScanRecordRepository};
use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::database::DatabasePool;

pub struct PostgresScanRecordRepository {
    pool: DatabasePool,
}

impl PostgresScanRecordRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<ScanRecord> {
    Ok(ScanRecord {
        scan_id: row.try_get("scan_id")?,
        release_guid: row.try_get("release_guid")?,
        source_path: row.try_get("source_path")?,
        destination_path: row.try_get("destination_path")?,
        infected: row.try_get("infected")?,
        threat_name: row.try_get("threat_name")?,
        scanned_at: row.try_get("scanned_at")?,
    })
}

#[async_trait]
impl ScanRecordRepository for PostgresScanRecordRepository {
    async fn has_infected(&self, release_guid: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT count(*) as c FROM scan_records WHERE release_guid = $1 AND infected = true",
        )
        .bind(release_guid)
        .fetch_one(&self.pool)
        .await?;
        let count: i64 = row.try_get("c")?;
        Ok(count > 0)
    }

    async fn create(&self, record: &ScanRecord) -> Result<ScanRecord> {
        sqlx::query(
            "INSERT INTO scan_records (scan_id, release_guid, source_path, destination_path,
             infected, threat_name, scanned_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.scan_id)
        .bind(&record.release_guid)
        .bind(&record.source_path)
        .bind(&record.destination_path)
        .bind(record.infected)
        .bind(&record.threat_name)
        .bind(record.scanned_at)
        .execute(&self.pool)
        .await?;
        Ok(record.clone())
    }

    async fn update(&self, record: &ScanRecord) -> Result<ScanRecord> {
        sqlx::query("UPDATE scan_records SET destination_path = $2 WHERE scan_id = $1")
            .bind(record.scan_id)
            .bind(&record.destination_path)
            .execute(&self.pool)
            .await?;
        Ok(record.clone())
    }

    async fn get(&self, scan_id: Uuid) -> Result<Option<ScanRecord>> {
        let row = sqlx::query(
            "SELECT scan_id, release_guid, source_path, destination_path, infected, threat_name, scanned_at
             FROM scan_records WHERE scan_id = $1",
        )
        .bind(scan_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_record).transpose()
    }
}
