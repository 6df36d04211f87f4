pub mod download;
pub mod parallel;

pub use download::{DownloadConfig, Downloader};
pub use parallel::{Countdown, PoolReport, WorkerPool};
