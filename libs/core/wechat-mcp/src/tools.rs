//! The two tools exposed to MCP sessions.

use crate::error::{Error, Result};
use crate::frontmatter;
use crate::mcp::{sealed, Tool};
use crate::publisher::DraftPublisher;
use crate::theme::{self, BuiltinTheme};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Arguments for the publish_article tool
#[derive(Debug, Deserialize)]
struct PublishArticleArgs {
    /// Markdown content, optionally with YAML front matter
    content: String,
    /// Theme id or name
    #[serde(default)]
    theme_id: Option<String>,
    /// Per-call app id override
    #[serde(default)]
    appid: Option<String>,
    /// Per-call app secret override
    #[serde(default)]
    appsecret: Option<String>,
}

/// Publishes a Markdown article to the WeChat draft box.
pub struct PublishArticleTool {
    publisher: Arc<DraftPublisher>,
}

impl PublishArticleTool {
    pub fn new(publisher: Arc<DraftPublisher>) -> Self {
        Self { publisher }
    }
}

impl sealed::Sealed for PublishArticleTool {}

#[async_trait]
impl Tool for PublishArticleTool {
    fn name(&self) -> &'static str {
        "publish_article"
    }

    fn description(&self) -> &'static str {
        "Renders a Markdown article with a theme and uploads it to the WeChat Official Account draft box. Front matter may supply `title` and `cover`; embedded images are moved onto the WeChat media store."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "Markdown article content, optionally starting with a YAML front matter block (title, cover)"
                },
                "theme_id": {
                    "type": "string",
                    "description": "Theme id or name; omit for the default theme"
                },
                "appid": {
                    "type": "string",
                    "description": "WeChat app id, overriding the configured default"
                },
                "appsecret": {
                    "type": "string",
                    "description": "WeChat app secret, overriding the configured default"
                }
            },
            "required": ["content"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String> {
        let args: PublishArticleArgs =
            serde_json::from_value(arguments).map_err(|e| Error::BadRequest {
                message: format!("invalid publish_article arguments: {e}"),
            })?;

        let article = frontmatter::split(&args.content);
        let theme = BuiltinTheme::resolve(args.theme_id.as_deref())?;
        let html = theme::render(&article.body, theme);
        let title = article.title.as_deref().unwrap_or("Untitled");

        let media_id = self
            .publisher
            .publish_to_draft(
                title,
                &html,
                article.cover.as_deref(),
                args.appid.as_deref(),
                args.appsecret.as_deref(),
            )
            .await?;

        Ok(format!("Draft created with media id: {media_id}"))
    }
}

/// Lists the registered themes.
pub struct ListThemesTool;

impl sealed::Sealed for ListThemesTool {}

#[async_trait]
impl Tool for ListThemesTool {
    fn name(&self) -> &'static str {
        "list_themes"
    }

    fn description(&self) -> &'static str {
        "Lists the available article themes with their ids, names and descriptions."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: Value) -> Result<String> {
        let mut output = String::from("Available themes:\n\n");
        for theme in BuiltinTheme::ALL {
            output.push_str(&format!(
                "- {} ({}): {}\n",
                theme.id(),
                theme.name(),
                theme.description()
            ));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWeChatApi;
    use crate::types::{AccessToken, UploadResult};
    use core_config::wechat::WeChatConfig;

    fn publish_tool(api: MockWeChatApi) -> PublishArticleTool {
        let config = WeChatConfig {
            app_id: Some("wx-app".to_string()),
            app_secret: Some("wx-secret".to_string()),
            ..WeChatConfig::default()
        };
        PublishArticleTool::new(Arc::new(DraftPublisher::new(Arc::new(api), config)))
    }

    #[tokio::test]
    async fn test_list_themes_emits_one_record_per_theme() {
        let output = ListThemesTool.execute(json!({})).await.unwrap();
        let records: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("- "))
            .collect();
        assert_eq!(records.len(), BuiltinTheme::ALL.len());
        for theme in BuiltinTheme::ALL {
            assert!(output.contains(theme.id()));
            assert!(output.contains(theme.name()));
            assert!(output.contains(theme.description()));
        }
    }

    #[tokio::test]
    async fn test_publish_requires_content_argument() {
        let tool = publish_tool(MockWeChatApi::new());
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_publish_rejects_unknown_theme_before_any_remote_call() {
        let tool = publish_tool(MockWeChatApi::new());
        let err = tool
            .execute(json!({"content": "# Hi", "theme_id": "solarpunk"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTheme { .. }));
    }

    #[tokio::test]
    async fn test_publish_uses_front_matter_title() {
        let mut api = MockWeChatApi::new();
        api.expect_fetch_access_token()
            .returning(|_, _| Ok(AccessToken::new("t")));
        api.expect_fetch_image().returning(|_| Ok(vec![1]));
        api.expect_upload_material()
            .returning(|_, _, _| Ok(UploadResult::new("media-1", "https://mmbiz.qpic.cn/a.jpg")));
        api.expect_create_draft()
            .withf(|article, _| article.title == "From Front Matter")
            .returning(|_, _| Ok("draft-9".to_string()));

        let tool = publish_tool(api);
        let content =
            "---\ntitle: From Front Matter\n---\n# Body\n\n<img src=\"https://example.com/a.png\">";
        let output = tool.execute(json!({"content": content})).await.unwrap();
        assert!(output.contains("draft-9"));
    }

    #[tokio::test]
    async fn test_publish_defaults_title_when_absent() {
        let mut api = MockWeChatApi::new();
        api.expect_fetch_access_token()
            .returning(|_, _| Ok(AccessToken::new("t")));
        api.expect_fetch_image().returning(|_| Ok(vec![1]));
        api.expect_upload_material()
            .returning(|_, _, _| Ok(UploadResult::new("media-1", "https://mmbiz.qpic.cn/a.jpg")));
        api.expect_create_draft()
            .withf(|article, _| article.title == "Untitled")
            .returning(|_, _| Ok("draft-10".to_string()));

        let tool = publish_tool(api);
        let content = "# Body\n\n<img src=\"https://example.com/a.png\">";
        let output = tool.execute(json!({"content": content})).await.unwrap();
        assert!(output.contains("draft-10"));
    }
}
