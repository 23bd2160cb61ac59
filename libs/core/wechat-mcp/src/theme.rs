//! Theme registry and themed Markdown rendering.
//!
//! Themes form a closed enumeration registered at compile time; lookup is
//! exact on id and case-insensitive on display name, with `Default` standing
//! in when no theme is requested.

use crate::error::{Error, Result};
use pulldown_cmark::{html, Options, Parser};
use std::collections::HashMap;
use std::sync::OnceLock;

/// The built-in visual styles applied when rendering Markdown to HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTheme {
    Default,
    Lapis,
    Maize,
    OrangeHeart,
    Phycat,
    Pie,
    Purple,
    Rainbow,
}

impl BuiltinTheme {
    pub const ALL: [BuiltinTheme; 8] = [
        BuiltinTheme::Default,
        BuiltinTheme::Lapis,
        BuiltinTheme::Maize,
        BuiltinTheme::OrangeHeart,
        BuiltinTheme::Phycat,
        BuiltinTheme::Pie,
        BuiltinTheme::Purple,
        BuiltinTheme::Rainbow,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BuiltinTheme::Default => "default",
            BuiltinTheme::Lapis => "lapis",
            BuiltinTheme::Maize => "maize",
            BuiltinTheme::OrangeHeart => "orangeheart",
            BuiltinTheme::Phycat => "phycat",
            BuiltinTheme::Pie => "pie",
            BuiltinTheme::Purple => "purple",
            BuiltinTheme::Rainbow => "rainbow",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinTheme::Default => "Default",
            BuiltinTheme::Lapis => "Lapis",
            BuiltinTheme::Maize => "Maize",
            BuiltinTheme::OrangeHeart => "Orange Heart",
            BuiltinTheme::Phycat => "Phycat",
            BuiltinTheme::Pie => "Pie",
            BuiltinTheme::Purple => "Purple",
            BuiltinTheme::Rainbow => "Rainbow",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BuiltinTheme::Default => "Plain typography with generous line height",
            BuiltinTheme::Lapis => "Calm blue accents on a clean white page",
            BuiltinTheme::Maize => "Warm yellow headings and soft separators",
            BuiltinTheme::OrangeHeart => "Vivid orange highlights for upbeat posts",
            BuiltinTheme::Phycat => "Teal physics-notebook styling",
            BuiltinTheme::Pie => "Magazine-style contrast with crimson accents",
            BuiltinTheme::Purple => "Muted violet tones for long-form reading",
            BuiltinTheme::Rainbow => "Playful multicolor accents",
        }
    }

    /// Container style applied to the rendered article.
    fn style(&self) -> &'static str {
        match self {
            BuiltinTheme::Default => {
                "font-size: 16px; color: #333333; line-height: 1.75; letter-spacing: 0.1px;"
            }
            BuiltinTheme::Lapis => {
                "font-size: 16px; color: #40464f; line-height: 1.75; border-top: 2px solid #4870ac;"
            }
            BuiltinTheme::Maize => {
                "font-size: 16px; color: #4a4a4a; line-height: 1.8; border-top: 2px solid #f9bf45;"
            }
            BuiltinTheme::OrangeHeart => {
                "font-size: 16px; color: #3e3e3e; line-height: 1.75; border-top: 2px solid #ef7060;"
            }
            BuiltinTheme::Phycat => {
                "font-size: 16px; color: #2b2b2b; line-height: 1.8; border-top: 2px solid #2aa198;"
            }
            BuiltinTheme::Pie => {
                "font-size: 16px; color: #2f2f2f; line-height: 1.7; border-top: 2px solid #b02a30;"
            }
            BuiltinTheme::Purple => {
                "font-size: 16px; color: #47475c; line-height: 1.8; border-top: 2px solid #8064a9;"
            }
            BuiltinTheme::Rainbow => {
                "font-size: 16px; color: #3a3a3a; line-height: 1.75; border-top: 2px solid #e74c3c;"
            }
        }
    }

    /// Resolve a requested theme by exact id or case-insensitive name.
    ///
    /// `None` (or a blank string) selects [`BuiltinTheme::Default`].
    pub fn resolve(requested: Option<&str>) -> Result<Self> {
        let Some(raw) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(BuiltinTheme::Default);
        };

        BuiltinTheme::ALL
            .iter()
            .copied()
            .find(|theme| theme.id() == raw)
            .or_else(|| name_index().get(raw.to_lowercase().as_str()).copied())
            .ok_or_else(|| Error::InvalidTheme {
                requested: raw.to_string(),
            })
    }
}

fn name_index() -> &'static HashMap<String, BuiltinTheme> {
    static NAME_INDEX: OnceLock<HashMap<String, BuiltinTheme>> = OnceLock::new();
    NAME_INDEX.get_or_init(|| {
        BuiltinTheme::ALL
            .iter()
            .map(|theme| (theme.name().to_lowercase(), *theme))
            .collect()
    })
}

/// Render Markdown to themed HTML.
///
/// Pure function of (body, theme): CommonMark plus tables, footnotes,
/// strikethrough and task lists, wrapped in a styled `<section>` container.
/// Raw inline HTML in the Markdown passes through untouched.
pub fn render(body: &str, theme: BuiltinTheme) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(body, options);
    let mut rendered = String::with_capacity(body.len() * 2);
    html::push_html(&mut rendered, parser);

    format!(
        "<section data-theme=\"{}\" style=\"{}\">\n{}</section>",
        theme.id(),
        theme.style(),
        rendered
    )
}
