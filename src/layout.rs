// src/layout.rs
//
// Panel height synchronization and the waits it is chained on.

use crate::overlay_config::PanelAnchor;
use futures::channel::oneshot;
use gloo::render::request_animation_frame;
use std::collections::BTreeSet;
use web_sys::HtmlElement;
use yew::NodeRef;

/// Something whose rendered height a comment panel should match.
pub trait HeightSource {
    /// Current rendered height in pixels, `None` when the element is gone.
    fn measure(&self) -> Option<f64>;
}

/// Live page element a panel follows: the image itself, or the whole column
/// when panels span every image of a block.
pub struct DomHeightSource<'a> {
    pub anchor: PanelAnchor,
    pub image: &'a NodeRef,
    pub column: &'a NodeRef,
}

impl HeightSource for DomHeightSource<'_> {
    fn measure(&self) -> Option<f64> {
        match self.anchor {
            PanelAnchor::Image => self
                .image
                .cast::<HtmlElement>()
                .map(|img| img.offset_height() as f64),
            PanelAnchor::Column => self
                .column
                .cast::<HtmlElement>()
                .map(|col| col.scroll_height() as f64),
        }
    }
}

/// Copies the live height of `source` into `panel_height`. Always re-measures;
/// returns whether the stored height changed.
pub fn sync_panel_height<S: HeightSource + ?Sized>(source: &S, panel_height: &mut Option<f64>) -> bool {
    match source.measure() {
        Some(height) => {
            let changed = *panel_height != Some(height);
            *panel_height = Some(height);
            changed
        }
        None => false,
    }
}

/// What a single image load/error event means for the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Other images are still pending.
    Pending,
    /// This was the last pending image.
    Complete,
    /// The wait was already over (a late load, or an image recreated by a
    /// layout change). Panels following it need measuring again.
    Late,
}

/// Pages whose image has not yet loaded, failed, or timed out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageWait {
    pending: BTreeSet<usize>,
    done: bool,
}

impl ImageWait {
    pub fn new(pages: impl IntoIterator<Item = usize>) -> Self {
        let pending: BTreeSet<usize> = pages.into_iter().collect();
        let done = pending.is_empty();
        Self { pending, done }
    }

    /// Marks one image settled. `Complete` is returned exactly once.
    pub fn settle(&mut self, page: usize) -> Settle {
        if self.done {
            return Settle::Late;
        }
        self.pending.remove(&page);
        if self.finish_if_empty() {
            Settle::Complete
        } else {
            Settle::Pending
        }
    }

    /// Safety timeout: everything still pending counts as settled.
    pub fn expire(&mut self) -> bool {
        if !self.pending.is_empty() {
            log::warn!("{} page image(s) still loading after timeout", self.pending.len());
        }
        self.pending.clear();
        self.finish_if_empty()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn finish_if_empty(&mut self) -> bool {
        if self.done || !self.pending.is_empty() {
            return false;
        }
        self.done = true;
        true
    }
}

/// Resolves on the next animation frame.
pub async fn next_frame() {
    let (tx, rx) = oneshot::channel();
    // Dropping the handle cancels the frame, so it lives until we are woken.
    let _frame = request_animation_frame(move |timestamp| {
        let _ = tx.send(timestamp);
    });
    if rx.await.is_err() {
        log::warn!("Animation frame was cancelled");
    }
}

pub async fn sleep_ms(ms: u32) {
    gloo::timers::future::TimeoutFuture::new(ms).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeImage(Cell<Option<f64>>);

    impl HeightSource for FakeImage {
        fn measure(&self) -> Option<f64> {
            self.0.get()
        }
    }

    #[test]
    fn test_sync_is_idempotent() {
        let image = FakeImage(Cell::new(Some(812.0)));
        let mut height = None;
        assert!(sync_panel_height(&image, &mut height));
        assert_eq!(height, Some(812.0));
        assert!(!sync_panel_height(&image, &mut height));
        assert_eq!(height, Some(812.0));
    }

    #[test]
    fn test_sync_remeasures() {
        let image = FakeImage(Cell::new(Some(812.0)));
        let mut height = None;
        sync_panel_height(&image, &mut height);
        image.0.set(Some(974.4));
        assert!(sync_panel_height(&image, &mut height));
        assert_eq!(height, Some(974.4));
    }

    #[test]
    fn test_sync_without_element_keeps_height() {
        let image = FakeImage(Cell::new(None));
        let mut height = Some(300.0);
        assert!(!sync_panel_height(&image, &mut height));
        assert_eq!(height, Some(300.0));
    }

    #[test]
    fn test_image_wait() {
        let mut wait = ImageWait::new([0, 1, 2]);
        assert_eq!(wait.settle(1), Settle::Pending);
        assert_eq!(wait.settle(1), Settle::Pending);
        assert_eq!(wait.settle(0), Settle::Pending);
        assert_eq!(wait.settle(2), Settle::Complete);
        assert!(wait.is_done());
        // Late timeout after everything loaded is a no-op.
        assert!(!wait.expire());
    }

    #[test]
    fn test_image_wait_timeout() {
        let mut wait = ImageWait::new([0, 1]);
        assert_eq!(wait.settle(0), Settle::Pending);
        assert!(wait.expire());
        // Image loading after the timeout only asks for a resync.
        assert_eq!(wait.settle(1), Settle::Late);
    }

    #[test]
    fn test_recreated_image_settles_late() {
        let mut wait = ImageWait::new([0, 1]);
        wait.settle(0);
        assert_eq!(wait.settle(1), Settle::Complete);
        // Regrouping rebuilds every <img>; their loads arrive again.
        assert_eq!(wait.settle(0), Settle::Late);
        assert_eq!(wait.settle(1), Settle::Late);
        assert!(wait.is_done());
    }

    #[test]
    fn test_image_wait_without_pages() {
        let mut wait = ImageWait::new(Vec::new());
        assert!(wait.is_done());
        assert!(!wait.expire());
    }
}
