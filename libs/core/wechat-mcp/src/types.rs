//! Domain types for the publishing pipeline.

use serde::{Deserialize, Serialize};

/// Short-lived bearer token for the WeChat API.
///
/// Fetched fresh for every publish operation and never cached; expiry is
/// therefore not tracked. No `Display` impl: token values must not end up
/// in log output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// A Markdown document split into body and optional front-matter fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedArticle {
    pub title: Option<String>,
    pub cover: Option<String>,
    pub body: String,
}

/// Result of uploading one asset to the WeChat material store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub media_id: String,
    pub url: String,
}

impl UploadResult {
    /// Builds an upload result, rewriting an insecure-transport URL to
    /// `https://`. Prefix substitution only; the rest of the URL is kept
    /// byte for byte.
    pub fn new(media_id: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let url = match url.strip_prefix("http://") {
            Some(rest) => format!("https://{rest}"),
            None => url,
        };

        Self {
            media_id: media_id.into(),
            url,
        }
    }
}

/// One article entry in a draft-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftArticle {
    pub title: String,
    pub content: String,
    pub thumb_media_id: String,
}

impl DraftArticle {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        thumb_media_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            thumb_media_id: thumb_media_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_result_normalizes_insecure_url() {
        let result = UploadResult::new("media-1", "http://mmbiz.qpic.cn/abc.jpg");
        assert_eq!(result.url, "https://mmbiz.qpic.cn/abc.jpg");
    }

    #[test]
    fn test_upload_result_keeps_secure_url() {
        let result = UploadResult::new("media-1", "https://mmbiz.qpic.cn/abc.jpg");
        assert_eq!(result.url, "https://mmbiz.qpic.cn/abc.jpg");
    }

    #[test]
    fn test_upload_result_only_touches_the_prefix() {
        let result = UploadResult::new("m", "http://host/path?next=http://other");
        assert_eq!(result.url, "https://host/path?next=http://other");
    }

    #[test]
    fn test_access_token_debug_hides_value() {
        let token = AccessToken::new("very-secret");
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }

    #[test]
    fn test_draft_article_serializes_wire_fields() {
        let article = DraftArticle::new("Title", "<p>body</p>", "media-9");
        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["title"], "Title");
        assert_eq!(value["content"], "<p>body</p>");
        assert_eq!(value["thumb_media_id"], "media-9");
    }
}
