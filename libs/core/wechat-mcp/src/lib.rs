//! WeChat Official Account publishing over MCP.
//!
//! A small session-keyed MCP (Model Context Protocol) server whose single
//! real capability is publishing a Markdown article to a WeChat Official
//! Account draft box. The pipeline is sequential: split front matter,
//! render themed HTML, move embedded images onto the WeChat media store,
//! resolve a cover, create the draft.
//!
//! Modules:
//! - [`frontmatter`] - front-matter splitting
//! - [`theme`] - theme registry and themed Markdown rendering
//! - [`relocate`] - embedded-image relocation
//! - [`client`] - WeChat API surface ([`WeChatApi`] trait + reqwest impl)
//! - [`publisher`] - pipeline orchestration
//! - [`mcp`] / [`session`] / [`router`] - the protocol dispatcher

pub mod client;
pub mod error;
pub mod frontmatter;
pub mod mcp;
pub mod publisher;
pub mod relocate;
pub mod router;
pub mod session;
pub mod theme;
pub mod tools;
pub mod types;

pub use client::{DEFAULT_API_BASE, HttpWeChatApi, WeChatApi};
pub use error::{Error, Result};
pub use mcp::{McpHandler, McpRequest, McpResponse, Tool};
pub use publisher::DraftPublisher;
pub use router::{AppState, SESSION_HEADER, router};
pub use session::SessionStore;
pub use theme::BuiltinTheme;
pub use types::{AccessToken, DraftArticle, ParsedArticle, UploadResult};
