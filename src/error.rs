use ::scraper::error::SelectorErrorKind;

/// All errors that can occur while fetching and parsing VLR.gg pages.
///
/// Missing *optional* page elements and unparsable numbers are never errors;
/// parsers resolve those to defaults. Only upstream failures (bad status,
/// network problems) and missing *required* structural elements surface here.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// A required structural element was not found on the page.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },
}

impl<'a> From<SelectorErrorKind<'a>> for ScrapeError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        ScrapeError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
