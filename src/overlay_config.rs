// src/overlay_config.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_CHAPTER: &str = "default";

/// Reader manifest plus every tunable of the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub title: String,
    pub api_base: String,
    pub default_author: String,
    pub default_chapter: String,
    pub panel_anchor: PanelAnchor,
    pub timings: Timings,
    pub zoom: ZoomSettings,
    pub blocks: Vec<ChapterBlock>,
}

/// What a comment panel takes its height from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelAnchor {
    /// Rendered height of the page image.
    Image,
    /// Full scroll height of the page column holding the image.
    Column,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub image_wait_ms: u32,
    pub close_fade_ms: u32,
    pub layout_fade_ms: u32,
    pub zoom_settle_ms: u32,
    pub reveal_base_ms: u32,
    pub reveal_step_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min: u32,
    pub max: u32,
    pub default: u32,
    pub display_step: u32,
    pub actual_step: u32,
    pub hide_bubbles_threshold: u32,
}

/// A group of pages sharing one chapter accent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterBlock {
    /// Space separated class list, e.g. `"comment-block k3_finale"`.
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub pages: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            title: String::from("Manga Reader"),
            api_base: String::from("/api"),
            default_author: String::from(DEFAULT_AUTHOR),
            default_chapter: String::from(DEFAULT_CHAPTER),
            panel_anchor: PanelAnchor::Image,
            timings: Timings::default(),
            zoom: ZoomSettings::default(),
            blocks: Vec::new(),
        }
    }
}

impl Default for PanelAnchor {
    fn default() -> Self {
        PanelAnchor::Image
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            image_wait_ms: 2000,
            close_fade_ms: 170,
            layout_fade_ms: 150,
            zoom_settle_ms: 300,
            reveal_base_ms: 150,
            reveal_step_ms: 90,
        }
    }
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min: 20,
            max: 200,
            default: 100,
            display_step: 20,
            actual_step: 10,
            hide_bubbles_threshold: 130,
        }
    }
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> Result<Self, crate::error::OverlayError> {
        serde_json::from_str(json).map_err(|e| crate::error::OverlayError::Config(e.to_string()))
    }

    pub fn comments_url(&self) -> String {
        format!("{}/comments", self.api_base.trim_end_matches('/'))
    }

    pub fn get_page_count(&self) -> usize {
        self.blocks.iter().map(|b| b.pages.len()).sum()
    }
}

impl ChapterBlock {
    pub fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            pages: Vec::new(),
        }
    }

    pub fn with_page(mut self, src: &str) -> Self {
        self.pages.push(src.to_string());
        self
    }

    /// Chapter tag from the block's class list: the first class that starts
    /// with `k` and contains `_`, cut at the first `_`.
    pub fn chapter_tag(&self) -> Option<String> {
        self.class
            .split_whitespace()
            .find(|c| c.starts_with('k') && c.contains('_'))
            .and_then(|c| c.split('_').next())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
    }
}
