use acquisitiond_core::{DownloadJob, MediaKind, PipelineError, Result, DownloadJobRepository};
use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::database::DatabasePool;

pub struct PostgresDownloadJobRepository {
    pool: DatabasePool,
}

impl PostgresDownloadJobRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "job_id, torrent_hash, guid, release_guid, rating_key, access_token, \
     title, year, kind, file_name, created_at, updated_at";

fn row_to_job(row: &sqlx::postgres::PgRow) -> Result<DownloadJob> {
    let kind_str: String = row.try_get("kind")?;
    let kind = parse_kind(&kind_str)?;
    Ok(DownloadJob {
        job_id: row.try_get("job_id")?,
        torrent_hash: row.try_get("torrent_hash")?,
        guid: row.try_get("guid")?,
        release_guid: row.try_get("release_guid")?,
        rating_key: row.try_get("rating_key")?,
        access_token: row.try_get("access_token")?,
        title: row.try_get("title")?,
        year: row.try_get("year")?,
        kind,
        file_name: row.try_get("file_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn parse_kind(raw: &str) -> Result<MediaKind> {
    match raw {
        "movie" => Ok(MediaKind::Movie),
        "show" => Ok(MediaKind::Show),
        other => Err(PipelineError::Validation {
            field: "kind".to_string(),
            message: format!("unrecognized media kind in storage: {other}"),
        }),
    }
}

#[async_trait]
impl DownloadJobRepository for PostgresDownloadJobRepository {
    async fn get(&self, torrent_hash: &str) -> Result<Option<DownloadJob>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM download_jobs WHERE torrent_hash = $1"
        ))
        .bind(torrent_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_job).transpose()
    }

    async fn get_by_guid(&self, guid: &str) -> Result<Vec<DownloadJob>> {
        let rows = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM download_jobs WHERE guid = $1"))
            .bind(guid)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_job).collect()
    }

    async fn get_by_release_guid(&self, release_guid: &str) -> Result<Vec<DownloadJob>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM download_jobs WHERE release_guid = $1"
        ))
        .bind(release_guid)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_job).collect()
    }

    async fn is_guid_in_flight(&self, guid: &str) -> Result<bool> {
        let row = sqlx::query("SELECT count(*) as c FROM download_jobs WHERE guid = $1")
            .bind(guid)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("c")?;
        Ok(count > 0)
    }

    async fn create(&self, job: &DownloadJob) -> Result<DownloadJob> {
        sqlx::query(
            "INSERT INTO download_jobs (job_id, torrent_hash, guid, release_guid, rating_key,
             access_token, title, year, kind, file_name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(job.job_id)
        .bind(&job.torrent_hash)
        .bind(&job.guid)
        .bind(&job.release_guid)
        .bind(&job.rating_key)
        .bind(&job.access_token)
        .bind(&job.title)
        .bind(job.year)
        .bind(job.kind.to_string())
        .bind(&job.file_name)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(job.clone())
    }

    async fn update(&self, job: &DownloadJob) -> Result<DownloadJob> {
        sqlx::query(
            "UPDATE download_jobs SET file_name = $2, updated_at = $3 WHERE job_id = $1",
        )
        .bind(job.job_id)
        .bind(&job.file_name)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(job.clone())
    }

    async fn delete(&self, job_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM download_jobs WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<DownloadJob>> {
        let rows = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM download_jobs"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_job).collect()
    }
}
