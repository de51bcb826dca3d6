/// One successfully fetched and extracted page
///
/// Built once by the task that fetched the page and never modified after it
/// lands in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRecord {
    /// The address the page was fetched from
    pub url: String,

    /// Text of the first `<h1>`, empty if there is none
    pub heading: String,

    /// Text of the leading paragraph, empty if there is none
    pub summary: String,

    /// Absolute link targets, in document order
    pub outgoing_links: Vec<String>,

    /// Absolute image sources, in document order
    pub image_urls: Vec<String>,
}
