mod download_job;
mod scan_record;
mod watch_user;

pub use download_job::PostgresDownloadJobRepository;
pub use scan_record::PostgresScanRecordRepository;
pub use watch_user::PostgresWatchUserRepository;
