// src/view_state.rs
use crate::bubble::BubblePanel;
use crate::dual_page::{DualPageManager, PageColumn};
use crate::error::OverlayError;
use crate::overlay_config::OverlayConfig;
use crate::zoom::ZoomController;
use yew::Callback;

/// Global comment-mode switch. Authoring clicks are ignored while it is off.
pub struct CommentMode {
    enabled: bool,
    on_change: Vec<Callback<bool>>,
}

impl CommentMode {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            on_change: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn on_change(&mut self, callback: Callback<bool>) {
        self.on_change.push(callback);
    }

    pub fn toggle(&mut self) {
        self.set(!self.enabled);
    }

    pub fn set(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        for cb in &self.on_change {
            cb.emit(enabled);
        }
    }

    pub fn button_label(&self) -> &'static str {
        if self.enabled {
            "Comment mode: ON"
        } else {
            "Comment mode: OFF"
        }
    }

    pub fn overlay_class(&self) -> &'static str {
        if self.enabled {
            "comment-overlay"
        } else {
            "comment-overlay off"
        }
    }
}

impl Default for CommentMode {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Everything known about one page once the manifest has been scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    pub index: usize,
    pub image_id: String,
    pub chapter: String,
    pub panel: BubblePanel,
    pub panel_height: Option<f64>,
}

/// Scans the manifest into page states and one column per chapter block.
/// Pages with no image source are reported and left out.
pub fn build_pages(config: &OverlayConfig) -> (Vec<PageState>, Vec<PageColumn>) {
    let mut pages = Vec::new();
    let mut columns = Vec::new();

    for (block_idx, block) in config.blocks.iter().enumerate() {
        let chapter = block.chapter_tag().unwrap_or_else(|| config.default_chapter.clone());
        let mut column_pages = Vec::new();

        for (page_idx, src) in block.pages.iter().enumerate() {
            let src = src.trim();
            if src.is_empty() {
                let err = OverlayError::MissingStructure(format!(
                    "block {} page {} has no image source",
                    block_idx + 1,
                    page_idx + 1
                ));
                log::error!("{}", err);
                continue;
            }
            let index = pages.len();
            pages.push(PageState {
                index,
                image_id: src.to_string(),
                chapter: chapter.clone(),
                panel: BubblePanel::new(),
                panel_height: None,
            });
            column_pages.push(index);
        }

        columns.push(PageColumn::new(column_pages));
    }

    (pages, columns)
}

/// Owner of the process-wide view flags. Other parts read them through the
/// accessors and learn about changes through the registered callbacks.
pub struct ViewState {
    pub comment_mode: CommentMode,
    pub zoom: ZoomController,
    pub dual_page: DualPageManager,
}

impl ViewState {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            comment_mode: CommentMode::default(),
            zoom: ZoomController::new(config.zoom.clone()),
            dual_page: DualPageManager::new(),
        }
    }

    /// Zooming past the hide threshold in dual-page mode turns authoring off.
    /// Returns whether comment mode changed.
    pub fn handle_hide_bubbles(&mut self, hidden: bool) -> bool {
        if hidden && self.dual_page.is_dual_page() && self.comment_mode.is_enabled() {
            self.comment_mode.set(false);
            return true;
        }
        false
    }

    pub fn accepts_authoring(&self) -> bool {
        self.comment_mode.is_enabled()
    }
}
