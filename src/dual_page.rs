// src/dual_page.rs
use yew::Callback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn class(&self) -> &'static str {
        match self {
            Side::Left => "left-page",
            Side::Right => "right-page",
        }
    }
}

/// A page slot inside a column: the page index and its pair tag, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlot {
    pub page: usize,
    pub side: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnNode {
    Page(PageSlot),
    Pair(Vec<PageSlot>),
}

/// Ordered children of one page column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageColumn {
    pub nodes: Vec<ColumnNode>,
}

impl PageColumn {
    pub fn new(pages: impl IntoIterator<Item = usize>) -> Self {
        Self {
            nodes: pages
                .into_iter()
                .map(|page| ColumnNode::Page(PageSlot { page, side: None }))
                .collect(),
        }
    }

    /// Groups the direct page slots two by two. Each pair takes the place of
    /// its first page; an odd last page ends up alone, tagged left.
    pub fn pair_pages(&mut self) {
        // (node index, page) of every direct page slot
        let direct: Vec<(usize, usize)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                ColumnNode::Page(slot) => Some((i, slot.page)),
                ColumnNode::Pair(_) => None,
            })
            .collect();

        let mut pair_at = vec![None; self.nodes.len()];
        let mut moved = vec![false; self.nodes.len()];
        for chunk in direct.chunks(2) {
            let (first, left_page) = chunk[0];
            let mut pair = vec![PageSlot {
                page: left_page,
                side: Some(Side::Left),
            }];
            if let Some(&(second, right_page)) = chunk.get(1) {
                pair.push(PageSlot {
                    page: right_page,
                    side: Some(Side::Right),
                });
                moved[second] = true;
            }
            pair_at[first] = Some(pair);
        }

        let old = std::mem::take(&mut self.nodes);
        for (i, node) in old.into_iter().enumerate() {
            if let Some(pair) = pair_at[i].take() {
                self.nodes.push(ColumnNode::Pair(pair));
            } else if !moved[i] {
                self.nodes.push(node);
            }
        }
    }

    /// Puts every paired page back where its pair stood, in order, untagged.
    pub fn unpair_pages(&mut self) {
        let old = std::mem::take(&mut self.nodes);
        for node in old {
            match node {
                ColumnNode::Pair(slots) => {
                    self.nodes.extend(slots.into_iter().map(|slot| {
                        ColumnNode::Page(PageSlot {
                            page: slot.page,
                            side: None,
                        })
                    }));
                }
                page => self.nodes.push(page),
            }
        }
    }

    /// Page indices in document order.
    pub fn page_order(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .flat_map(|node| match node {
                ColumnNode::Page(slot) => vec![slot.page],
                ColumnNode::Pair(slots) => slots.iter().map(|s| s.page).collect(),
            })
            .collect()
    }
}

/// Where an in-flight layout change currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    Idle,
    /// Columns are fading out before the regroup.
    FadingOut,
    /// Pages regrouped; waiting for the new geometry to be read back.
    Regrouped,
    /// Waiting two animation frames for the layout to commit.
    Settling,
}

pub struct DualPageManager {
    dual_page: bool,
    phase: LayoutPhase,
    on_layout_change: Vec<Callback<()>>,
}

impl DualPageManager {
    pub fn new() -> Self {
        Self {
            dual_page: false,
            phase: LayoutPhase::Idle,
            on_layout_change: Vec::new(),
        }
    }

    pub fn is_dual_page(&self) -> bool {
        self.dual_page
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != LayoutPhase::Idle
    }

    pub fn toggle(&mut self) {
        self.dual_page = !self.dual_page;
    }

    pub fn on_layout_change(&mut self, callback: Callback<()>) {
        self.on_layout_change.push(callback);
    }

    /// Starts a layout change. `false` when one is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_transitioning() {
            log::debug!("Layout change already in flight, ignoring");
            return false;
        }
        self.phase = LayoutPhase::FadingOut;
        true
    }

    /// Regroups every column for the current mode once the fade-out is over.
    pub fn regroup(&mut self, columns: &mut [PageColumn]) {
        if self.phase != LayoutPhase::FadingOut {
            return;
        }
        for column in columns.iter_mut() {
            if self.dual_page {
                column.pair_pages();
            } else {
                column.unpair_pages();
            }
        }
        self.phase = LayoutPhase::Regrouped;
    }

    /// The regrouped layout has been read back; start waiting for frames.
    pub fn settle(&mut self) -> bool {
        if self.phase != LayoutPhase::Regrouped {
            return false;
        }
        self.phase = LayoutPhase::Settling;
        true
    }

    /// Notifies layout listeners and releases the guard.
    pub fn finish(&mut self) {
        if self.phase != LayoutPhase::Settling {
            return;
        }
        for cb in &self.on_layout_change {
            cb.emit(());
        }
        self.phase = LayoutPhase::Idle;
    }
}

impl Default for DualPageManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;
    const D: usize = 3;
    const E: usize = 4;

    fn left(page: usize) -> PageSlot {
        PageSlot {
            page,
            side: Some(Side::Left),
        }
    }

    fn right(page: usize) -> PageSlot {
        PageSlot {
            page,
            side: Some(Side::Right),
        }
    }

    #[test]
    fn test_pairing_five_pages() {
        let mut column = PageColumn::new([A, B, C, D, E]);
        column.pair_pages();
        assert_eq!(
            column.nodes,
            vec![
                ColumnNode::Pair(vec![left(A), right(B)]),
                ColumnNode::Pair(vec![left(C), right(D)]),
                ColumnNode::Pair(vec![left(E)]),
            ]
        );
    }

    #[test]
    fn test_pairing_round_trip() {
        let original = PageColumn::new([A, B, C, D, E]);
        let mut column = original.clone();
        column.pair_pages();
        assert_eq!(column.page_order(), vec![A, B, C, D, E]);
        column.unpair_pages();
        assert_eq!(column, original);
    }

    #[test]
    fn test_pairing_skips_existing_pairs() {
        let mut column = PageColumn {
            nodes: vec![
                ColumnNode::Pair(vec![left(A), right(B)]),
                ColumnNode::Page(PageSlot { page: C, side: None }),
                ColumnNode::Page(PageSlot { page: D, side: None }),
            ],
        };
        column.pair_pages();
        assert_eq!(
            column.nodes,
            vec![
                ColumnNode::Pair(vec![left(A), right(B)]),
                ColumnNode::Pair(vec![left(C), right(D)]),
            ]
        );
    }

    #[test]
    fn test_unpair_flat_column_is_noop() {
        let mut column = PageColumn::new([A, B]);
        column.unpair_pages();
        assert_eq!(column, PageColumn::new([A, B]));
    }

    #[test]
    fn test_phases_and_guard() {
        let calls = Rc::new(Cell::new(0));
        let sink = calls.clone();
        let mut manager = DualPageManager::new();
        manager.on_layout_change(Callback::from(move |_| sink.set(sink.get() + 1)));

        let mut columns = vec![PageColumn::new([A, B, C])];
        manager.toggle();
        assert!(manager.is_dual_page());
        assert!(manager.begin());
        assert!(!manager.begin());
        assert_eq!(manager.phase(), LayoutPhase::FadingOut);

        manager.regroup(&mut columns);
        assert_eq!(manager.phase(), LayoutPhase::Regrouped);
        assert_eq!(columns[0].nodes.len(), 2);
        assert!(!manager.begin());

        assert!(manager.settle());
        assert_eq!(calls.get(), 0);
        manager.finish();
        assert_eq!(calls.get(), 1);
        assert!(!manager.is_transitioning());

        manager.toggle();
        assert!(manager.begin());
        manager.regroup(&mut columns);
        assert_eq!(columns[0], PageColumn::new([A, B, C]));
    }

    #[test]
    fn test_out_of_order_steps_are_ignored() {
        let mut manager = DualPageManager::new();
        let mut columns = vec![PageColumn::new([A, B])];
        manager.toggle();
        manager.regroup(&mut columns);
        assert_eq!(columns[0], PageColumn::new([A, B]));
        assert!(!manager.settle());
        manager.finish();
        assert_eq!(manager.phase(), LayoutPhase::Idle);
    }

    #[test]
    fn test_toggle_during_fade_uses_latest_flag() {
        let mut manager = DualPageManager::new();
        let mut columns = vec![PageColumn::new([A, B])];
        manager.toggle();
        assert!(manager.begin());
        manager.toggle();
        manager.regroup(&mut columns);
        assert_eq!(columns[0], PageColumn::new([A, B]));
    }
}
