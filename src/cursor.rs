//! Cursor and tip bookkeeping
//!
//! Decides, once per tick, whether the engine should catch up on history,
//! refresh the tip, or process the block at the tip. Noticing a new tip and
//! processing it always happen in two separate ticks.

use crate::types::{Block, Height};

/// What the current tick should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The next height is behind the tip: fetch that historical block.
    CatchUp(Height),
    /// The next height is past the tip: ask the provider for a newer tip.
    RefreshTip,
    /// The next height is the tip itself: process it.
    Process(Block),
}

/// Outcome of observing a freshly fetched latest block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipChange {
    Unchanged,
    Advanced,
}

/// Tracks the last processed height and the last observed tip.
#[derive(Debug, Clone)]
pub struct Cursor {
    /// `None` until the first block has been processed.
    last: Option<Height>,
    tip: Block,
}

impl Cursor {
    /// `start_height == 0` starts at the current tip. Any other value is
    /// treated as already seen, so processing begins at `start_height + 1`.
    pub fn new(tip: Block, start_height: Height) -> Self {
        let last = if start_height == 0 {
            None
        } else {
            Some(start_height)
        };
        Self { last, tip }
    }

    /// Height the engine intends to process next.
    ///
    /// Saturates at `Height::MAX`; see [`Cursor::step`].
    pub fn next_height(&self) -> Height {
        match self.last {
            Some(last) => last.saturating_add(1),
            None => self.tip.height,
        }
    }

    pub fn last_processed(&self) -> Option<Height> {
        self.last
    }

    pub fn tip(&self) -> &Block {
        &self.tip
    }

    pub fn step(&self) -> Step {
        // Nothing can follow the last representable height.
        if self.last == Some(Height::MAX) {
            return Step::RefreshTip;
        }
        let next = self.next_height();
        if next < self.tip.height {
            Step::CatchUp(next)
        } else if next != self.tip.height {
            Step::RefreshTip
        } else {
            Step::Process(self.tip.clone())
        }
    }

    /// Record a latest block reported by the provider. The tip never regresses.
    pub fn observe_tip(&mut self, latest: Block) -> TipChange {
        if latest.height > self.tip.height {
            self.tip = latest;
            TipChange::Advanced
        } else {
            TipChange::Unchanged
        }
    }

    /// Mark `height` as processed. The cursor never moves backwards.
    pub fn advance(&mut self, height: Height) {
        if self.last.map_or(true, |last| height > last) {
            self.last = Some(height);
        }
    }
}
