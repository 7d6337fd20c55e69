// src/bubble.rs
use crate::comment::CommentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleState {
    Closed,
    Open,
    /// Fading out; ignores clicks until the fade timer ends.
    Closing,
}

/// Two-step entrance: appended in the pre-transition state, then activated on
/// a later frame so the CSS transition sees the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entrance {
    Entering,
    Entered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub id: BubbleId,
    pub record: CommentRecord,
    pub state: BubbleState,
    pub entrance: Entrance,
}

impl Bubble {
    pub fn class(&self) -> String {
        let mut classes = vec!["comment-bubble", "bubble-enter"];
        if self.entrance == Entrance::Entered {
            classes.push("bubble-enter-active");
        }
        match self.state {
            BubbleState::Closed => {}
            BubbleState::Open => classes.push("open"),
            BubbleState::Closing => classes.extend(["open", "closing"]),
        }
        classes.join(" ")
    }

    pub fn accepts_pointer(&self) -> bool {
        self.state != BubbleState::Closing
    }
}

/// Outcome of a click, telling the caller which close timers to start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickOutcome {
    pub opened: Option<BubbleId>,
    pub closing: Vec<BubbleId>,
}

/// Bubbles rendered next to one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BubblePanel {
    bubbles: Vec<Bubble>,
    next_id: u32,
    has_open_comment: bool,
}

impl BubblePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    pub fn has_open_comment(&self) -> bool {
        self.has_open_comment
    }

    pub fn open_count(&self) -> usize {
        self.bubbles
            .iter()
            .filter(|b| b.state == BubbleState::Open)
            .count()
    }

    /// Appends a bubble in its entering state.
    pub fn append(&mut self, record: CommentRecord) -> BubbleId {
        let id = BubbleId(self.next_id);
        self.next_id += 1;
        self.bubbles.push(Bubble {
            id,
            record,
            state: BubbleState::Closed,
            entrance: Entrance::Entering,
        });
        id
    }

    /// Second step of the entrance.
    pub fn activate(&mut self, id: BubbleId) {
        if let Some(bubble) = self.get_mut(id) {
            bubble.entrance = Entrance::Entered;
        }
    }

    /// Server id for a bubble created locally.
    pub fn attach_saved(&mut self, id: BubbleId, saved: CommentRecord) {
        if let Some(bubble) = self.get_mut(id) {
            bubble.record.id = saved.id;
        }
    }

    /// Click on a bubble: closes the other open bubbles, then toggles this one.
    pub fn click(&mut self, id: BubbleId) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();
        let Some(state) = self.get(id).map(|b| b.state) else {
            return outcome;
        };
        if state == BubbleState::Closing {
            return outcome;
        }

        for bubble in self.bubbles.iter_mut() {
            if bubble.id != id && bubble.state == BubbleState::Open {
                bubble.state = BubbleState::Closing;
                outcome.closing.push(bubble.id);
            }
        }

        if let Some(bubble) = self.get_mut(id) {
            if state == BubbleState::Open {
                bubble.state = BubbleState::Closing;
                outcome.closing.push(id);
            } else {
                bubble.state = BubbleState::Open;
                outcome.opened = Some(id);
                self.has_open_comment = true;
            }
        }
        outcome
    }

    /// End of the close fade. Clears the panel marker once nothing is open.
    pub fn finish_close(&mut self, id: BubbleId) {
        match self.get_mut(id) {
            Some(bubble) if bubble.state == BubbleState::Closing => {
                bubble.state = BubbleState::Closed;
            }
            _ => return,
        }
        if self.open_count() == 0 {
            self.has_open_comment = false;
        }
    }

    fn get_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id == id)
    }
}

/// Staggered reveal order for a freshly fetched batch: ascending vertical
/// position, ties in arrival order, each paired with its delay in ms.
pub fn reveal_schedule(
    mut records: Vec<CommentRecord>,
    base_ms: u32,
    step_ms: u32,
) -> Vec<(CommentRecord, u32)> {
    records.sort_by(|a, b| a.y_pct.total_cmp(&b.y_pct));
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| (record, base_ms + idx as u32 * step_ms))
        .collect()
}
