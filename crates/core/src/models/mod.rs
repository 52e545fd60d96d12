mod download_job;
mod scan_record;
mod watch_user;
mod watchlist_entry;

pub use download_job::DownloadJob;
pub use scan_record::ScanRecord;
pub use watch_user::WatchUser;
pub use watchlist_entry::{MediaKind, WatchlistEntry};
