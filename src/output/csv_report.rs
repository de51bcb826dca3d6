//! CSV report generation
//!
//! One row per collected page. The link and image lists are flattened into a single
//! field each, joined by the configured delimiter.

use crate::state::PageRecord;
use crate::ReportError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names, in row order
pub const REPORT_HEADERS: [&str; 5] = [
    "page_url",
    "h1",
    "first_paragraph",
    "outgoing_link_urls",
    "image_urls",
];

/// Writes the report to a file, replacing any existing file
///
/// # Arguments
///
/// * `pages` - The records to write, in the order they should appear
/// * `output_path` - Path of the CSV file
/// * `delimiter` - Separator placed between list entries inside one field
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(ReportError)` - The file could not be created or written
pub fn write_csv_report<'a, I>(pages: I, output_path: &Path, delimiter: &str) -> Result<(), ReportError>
where
    I: IntoIterator<Item = &'a PageRecord>,
{
    let file = File::create(output_path)?;
    let written = write_report_to(file, pages, delimiter)?;

    tracing::info!("Wrote {} rows to {}", written, output_path.display());
    Ok(())
}

/// Writes the report to any writer and returns the number of data rows
///
/// The header row is always written, even when there are no pages.
pub fn write_report_to<'a, W, I>(writer: W, pages: I, delimiter: &str) -> Result<usize, ReportError>
where
    W: Write,
    I: IntoIterator<Item = &'a PageRecord>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REPORT_HEADERS)?;

    let mut rows = 0;
    for page in pages {
        csv_writer.write_record([
            page.url.as_str(),
            page.heading.as_str(),
            page.summary.as_str(),
            page.outgoing_links.join(delimiter).as_str(),
            page.image_urls.join(delimiter).as_str(),
        ])?;
        rows += 1;
    }

    csv_writer.flush()?;
    Ok(rows)
}
