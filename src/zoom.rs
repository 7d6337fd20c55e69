// src/zoom.rs
use crate::overlay_config::ZoomSettings;
use yew::Callback;

/// Display level that renders at native scale, whatever the starting level.
const IDENTITY_ZOOM: i64 = 100;

/// Discrete display zoom. The applied scale moves at `actual_step` per
/// `display_step`, so with the defaults display 140% renders at 120%.
pub struct ZoomController {
    settings: ZoomSettings,
    display_zoom: u32,
    bubbles_hidden: bool,
    on_zoom_change: Vec<Callback<u32>>,
    on_hide_bubbles_change: Vec<Callback<bool>>,
}

impl ZoomController {
    pub fn new(settings: ZoomSettings) -> Self {
        let display_zoom = settings.default.clamp(settings.min, settings.max);
        let mut zoom = Self {
            settings,
            display_zoom,
            bubbles_hidden: false,
            on_zoom_change: Vec::new(),
            on_hide_bubbles_change: Vec::new(),
        };
        zoom.apply_zoom();
        zoom
    }

    pub fn display_zoom(&self) -> u32 {
        self.display_zoom
    }

    pub fn actual_zoom(&self) -> u32 {
        let steps = (self.display_zoom as i64 - IDENTITY_ZOOM) / self.settings.display_step.max(1) as i64;
        (IDENTITY_ZOOM + steps * self.settings.actual_step as i64).max(0) as u32
    }

    /// Value published as `--zoom-level`.
    pub fn scale_factor(&self) -> f64 {
        self.actual_zoom() as f64 / 100.0
    }

    pub fn display_label(&self) -> String {
        format!("{}%", self.display_zoom())
    }

    pub fn is_bubbles_hidden(&self) -> bool {
        self.bubbles_hidden
    }

    pub fn on_zoom_change(&mut self, callback: Callback<u32>) {
        self.on_zoom_change.push(callback);
    }

    pub fn on_hide_bubbles_change(&mut self, callback: Callback<bool>) {
        self.on_hide_bubbles_change.push(callback);
    }

    /// Returns `false` when already at the maximum.
    pub fn zoom_in(&mut self) -> bool {
        if self.display_zoom >= self.settings.max {
            return false;
        }
        self.display_zoom = (self.display_zoom + self.settings.display_step).min(self.settings.max);
        self.apply_zoom();
        true
    }

    /// Returns `false` when already at the minimum.
    pub fn zoom_out(&mut self) -> bool {
        if self.display_zoom <= self.settings.min {
            return false;
        }
        self.display_zoom = self
            .display_zoom
            .saturating_sub(self.settings.display_step)
            .max(self.settings.min);
        self.apply_zoom();
        true
    }

    pub fn reset(&mut self) {
        self.display_zoom = self.settings.default.clamp(self.settings.min, self.settings.max);
        self.apply_zoom();
    }

    fn apply_zoom(&mut self) {
        let actual = self.actual_zoom();

        let hide = actual >= self.settings.hide_bubbles_threshold;
        if hide != self.bubbles_hidden {
            self.bubbles_hidden = hide;
            log::debug!("Bubbles hidden by zoom: {}", hide);
            for cb in &self.on_hide_bubbles_change {
                cb.emit(hide);
            }
        }

        for cb in &self.on_zoom_change {
            cb.emit(actual);
        }
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(ZoomSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, Callback<T>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, Callback::from(move |v: T| sink.borrow_mut().push(v)))
    }

    #[test]
    fn test_actual_zoom_mapping() {
        let mut zoom = ZoomController::default();
        while zoom.zoom_out() {}
        assert_eq!(zoom.display_zoom(), 20);
        loop {
            let display = zoom.display_zoom() as i64;
            assert_eq!(zoom.actual_zoom() as i64, 100 + (display - 100) / 2);
            if !zoom.zoom_in() {
                break;
            }
        }
        assert_eq!(zoom.display_zoom(), 200);
        assert_eq!(zoom.actual_zoom(), 150);
    }

    #[test]
    fn test_known_points() {
        let mut zoom = ZoomController::default();
        zoom.zoom_in();
        zoom.zoom_in();
        assert_eq!(zoom.display_zoom(), 140);
        assert_eq!(zoom.actual_zoom(), 120);
        assert_eq!(zoom.scale_factor(), 1.2);
        assert_eq!(zoom.display_label(), "140%");

        zoom.reset();
        zoom.zoom_out();
        zoom.zoom_out();
        assert_eq!(zoom.display_zoom(), 60);
        assert_eq!(zoom.actual_zoom(), 80);
    }

    #[test]
    fn test_bounds_are_noops() {
        let (changes, cb) = recorder();
        let mut zoom = ZoomController::default();
        zoom.on_zoom_change(cb);
        for _ in 0..5 {
            zoom.zoom_in();
        }
        assert_eq!(changes.borrow().len(), 5);
        assert!(!zoom.zoom_in());
        assert_eq!(changes.borrow().len(), 5);
        assert_eq!(*changes.borrow(), vec![110, 120, 130, 140, 150]);
    }

    #[test]
    fn test_hide_bubbles_edge_triggered() {
        let (hides, cb) = recorder();
        let mut zoom = ZoomController::default();
        zoom.on_hide_bubbles_change(cb);

        zoom.zoom_in(); // 120 -> 110
        zoom.zoom_in(); // 140 -> 120
        assert!(hides.borrow().is_empty());
        zoom.zoom_in(); // 160 -> 130
        assert_eq!(*hides.borrow(), vec![true]);
        assert!(zoom.is_bubbles_hidden());
        zoom.zoom_in(); // 180 -> 140
        zoom.zoom_in(); // 200 -> 150
        assert_eq!(*hides.borrow(), vec![true]);

        zoom.zoom_out();
        zoom.zoom_out();
        zoom.zoom_out(); // 140 -> 120
        assert_eq!(*hides.borrow(), vec![true, false]);
        assert!(!zoom.is_bubbles_hidden());
    }

    #[test]
    fn test_configured_default_keeps_mapping() {
        let settings = ZoomSettings {
            default: 60,
            ..ZoomSettings::default()
        };
        let mut zoom = ZoomController::new(settings);
        assert_eq!(zoom.display_zoom(), 60);
        assert_eq!(zoom.actual_zoom(), 80);

        zoom.zoom_in();
        zoom.zoom_in();
        assert_eq!(zoom.display_zoom(), 100);
        assert_eq!(zoom.actual_zoom(), 100);

        zoom.zoom_in();
        zoom.zoom_in();
        zoom.zoom_in();
        assert_eq!(zoom.display_zoom(), 160);
        assert_eq!(zoom.actual_zoom(), 130);
        assert!(zoom.is_bubbles_hidden());

        zoom.reset();
        assert_eq!(zoom.display_zoom(), 60);
        assert!(!zoom.is_bubbles_hidden());
    }

    #[test]
    fn test_reset_notifies() {
        let (changes, cb) = recorder();
        let mut zoom = ZoomController::default();
        zoom.zoom_out();
        zoom.on_zoom_change(cb);
        zoom.reset();
        assert_eq!(*changes.borrow(), vec![100]);
        assert_eq!(zoom.display_zoom(), 100);
    }
}
