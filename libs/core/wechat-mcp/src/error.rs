//! Error taxonomy for the publishing pipeline and protocol surface.
//!
//! Every remote failure aborts the publish operation that triggered it and
//! surfaces verbatim to the protocol caller; nothing in this crate retries
//! or downgrades a failure.

use thiserror::Error;

/// Result type alias for publishing operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No usable app id / app secret from call arguments or configuration
    #[error(
        "missing WeChat credentials: pass appid/appsecret or set WECHAT_APP_ID and WECHAT_APP_SECRET"
    )]
    Credential,

    /// The remote service answered with a structured error payload
    #[error("WeChat API error {code}: {message}")]
    RemoteApi { code: i64, message: String },

    /// Transport-level upload failure (non-success HTTP status)
    #[error("material upload failed with status {status}: {body}")]
    Upload { status: u16, body: String },

    /// Response shape violates the documented contract
    #[error("unexpected WeChat response during {context}")]
    UnexpectedResponse { context: String },

    /// A remote image download yielded no usable bytes
    #[error("failed to fetch image {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    /// Every article must resolve to exactly one cover image
    #[error("no cover image: supply `cover` in front matter or embed at least one image")]
    MissingCover,

    /// The requested theme id/name does not resolve
    #[error("unknown theme '{requested}'")]
    InvalidTheme { requested: String },

    /// Malformed tool arguments
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Local image file could not be read
    #[error("failed to read local image {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Underlying HTTP transport error
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_api_error_display() {
        let err = Error::RemoteApi {
            code: 40001,
            message: "invalid credential".to_string(),
        };
        assert_eq!(err.to_string(), "WeChat API error 40001: invalid credential");
    }

    #[test]
    fn test_upload_error_carries_status_and_body() {
        let err = Error::Upload {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }
}
