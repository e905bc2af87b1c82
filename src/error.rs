//! Error taxonomy for the scrape pipeline.
//!
//! Only session-level failures surface as errors: a browser that will not
//! launch, a review page that will not load, an artifact that will not
//! write. Everything below that level (a missing field, a filter that
//! refuses to apply, a page with no next button) is handled in place and
//! reported through logs and events, never through `Err`.

use thiserror::Error;

/// All hard failures a scrape run can produce.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid scrape config: {0}")]
    InvalidConfig(String),

    #[error("browser launch failed: {0:#}")]
    BrowserLaunch(anyhow::Error),

    #[error("navigation to {url} failed: {source:#}")]
    Navigation { url: String, source: anyhow::Error },

    #[error("export failed")]
    Export(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
