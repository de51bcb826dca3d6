//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Writing collected page records as a CSV report
//! - Summarizing and printing crawl statistics

mod csv_report;
pub mod stats;

pub use csv_report::{write_csv_report, write_report_to, REPORT_HEADERS};
pub use stats::{print_statistics, CrawlStatistics};
