use std::ops::Range;

use log::warn;

use crate::error::Error;
use crate::node::NodeId;

/// Where a successful match may end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The match must end exactly at the region's right bound.
    Entire,
    /// The match may end anywhere.
    Prefix,
}

/// Bookkeeping for one match attempt.
///
/// A state is created for a single `attempt_match`/`attempt_find` call and is
/// never shared: the per-node slots are written while backtracking, so
/// concurrent attempts against the same program each need their own.
#[derive(Debug)]
pub struct MatchState {
    left_bound: usize,
    right_bound: usize,
    input_len: usize,
    anchoring_bounds: bool,
    transparent_bounds: bool,
    mode: MatchMode,
    /// -1 unvisited, 0 visited without consuming, >0 width of the last pass.
    consumed: Vec<isize>,
    counters: Vec<usize>,
    iteration_start: Vec<usize>,
    hit_end: bool,
    steps: usize,
    depth: usize,
    step_limit: Option<usize>,
    depth_limit: usize,
    abort: Option<Error>,
}

impl MatchState {
    /// Panics if the region is not within `0..=input_len`.
    pub fn new(input_len: usize, region: Range<usize>, slots: usize, mode: MatchMode) -> MatchState {
        assert!(
            region.start <= region.end && region.end <= input_len,
            "malformed match state: region {:?} for input of length {}",
            region,
            input_len
        );
        MatchState {
            left_bound: region.start,
            right_bound: region.end,
            input_len,
            anchoring_bounds: true,
            transparent_bounds: false,
            mode,
            consumed: vec![-1; slots],
            counters: vec![0; slots],
            iteration_start: vec![0; slots],
            hit_end: false,
            steps: 0,
            depth: 0,
            step_limit: None,
            depth_limit: usize::MAX,
            abort: None,
        }
    }

    pub fn with_bounds(mut self, anchoring: bool, transparent: bool) -> MatchState {
        self.anchoring_bounds = anchoring;
        self.transparent_bounds = transparent;
        self
    }

    pub fn with_limits(mut self, step_limit: Option<usize>, depth_limit: usize) -> MatchState {
        self.step_limit = step_limit;
        self.depth_limit = depth_limit;
        self
    }

    pub fn left_bound(&self) -> usize {
        self.left_bound
    }

    pub fn right_bound(&self) -> usize {
        self.right_bound
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn anchoring_bounds(&self) -> bool {
        self.anchoring_bounds
    }

    pub fn transparent_bounds(&self) -> bool {
        self.transparent_bounds
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn hit_end(&self) -> bool {
        self.hit_end
    }

    /// Where input starts for `^` and `\A`.
    pub fn start_bound(&self) -> usize {
        if self.anchoring_bounds {
            self.left_bound
        } else {
            0
        }
    }

    /// Where input ends for `$`, `\Z` and `\z`.
    pub fn end_bound(&self) -> usize {
        if self.anchoring_bounds {
            self.right_bound
        } else {
            self.input_len
        }
    }

    /// How far anchors may look ahead of a position.
    pub fn lookahead_bound(&self) -> usize {
        if self.transparent_bounds {
            self.input_len
        } else {
            self.right_bound
        }
    }

    /// How far back anchors may look behind a position.
    pub fn lookbehind_bound(&self) -> usize {
        if self.transparent_bounds {
            0
        } else {
            self.left_bound
        }
    }

    #[inline]
    pub(crate) fn set_hit_end(&mut self) {
        self.hit_end = true;
    }

    #[inline]
    pub fn consumed(&self, id: NodeId) -> isize {
        self.consumed[id.index()]
    }

    #[inline]
    pub(crate) fn set_consumed(&mut self, id: NodeId, value: isize) {
        self.consumed[id.index()] = value;
    }

    #[inline]
    pub fn counter(&self, id: NodeId) -> usize {
        self.counters[id.index()]
    }

    #[inline]
    pub(crate) fn set_counter(&mut self, id: NodeId, value: usize) {
        self.counters[id.index()] = value;
    }

    #[inline]
    pub(crate) fn iteration_start(&self, id: NodeId) -> usize {
        self.iteration_start[id.index()]
    }

    #[inline]
    pub(crate) fn set_iteration_start(&mut self, id: NodeId, pos: usize) {
        self.iteration_start[id.index()] = pos;
    }

    /// Copies a node's slots.
    pub(crate) fn save_slot(&self, id: NodeId) -> SavedSlot {
        let i = id.index();
        SavedSlot {
            consumed: self.consumed[i],
            counter: self.counters[i],
            iteration_start: self.iteration_start[i],
        }
    }

    /// Saves a node's slots and marks it unvisited.
    pub(crate) fn enter_slot(&mut self, id: NodeId) -> SavedSlot {
        let saved = self.save_slot(id);
        let i = id.index();
        self.consumed[i] = -1;
        self.counters[i] = 0;
        saved
    }

    pub(crate) fn restore_slot(&mut self, id: NodeId, saved: SavedSlot) {
        let i = id.index();
        self.consumed[i] = saved.consumed;
        self.counters[i] = saved.counter;
        self.iteration_start[i] = saved.iteration_start;
    }

    /// Accounts for one node transition. Returns false once the attempt has
    /// been aborted by a limit.
    #[inline]
    pub(crate) fn step(&mut self) -> bool {
        if self.abort.is_some() {
            return false;
        }
        self.steps += 1;
        if let Some(limit) = self.step_limit {
            if self.steps > limit {
                warn!("match attempt aborted after {} steps", limit);
                self.abort = Some(Error::StepLimitExceeded(limit));
                return false;
            }
        }
        true
    }

    /// Accounts for one entry pushed on the backtracking stack. Returns false,
    /// leaving the depth unchanged, when the push would exceed the limit.
    #[inline]
    pub(crate) fn enter(&mut self) -> bool {
        if self.abort.is_some() {
            return false;
        }
        if self.depth >= self.depth_limit {
            warn!("match attempt aborted at depth {}", self.depth_limit);
            self.abort = Some(Error::DepthLimitExceeded(self.depth_limit));
            return false;
        }
        self.depth += 1;
        true
    }

    /// Accounts for one entry popped off the backtracking stack.
    #[inline]
    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.abort.is_some()
    }

    pub(crate) fn take_abort(&mut self) -> Option<Error> {
        self.abort.take()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Entries currently on the backtracking stack.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedSlot {
    consumed: isize,
    counter: usize,
    iteration_start: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "malformed match state")]
    fn inverted_region_panics() {
        #[allow(clippy::reversed_empty_ranges)]
        let _ = MatchState::new(10, 5..3, 1, MatchMode::Entire);
    }

    #[test]
    #[should_panic(expected = "malformed match state")]
    fn region_past_input_panics() {
        let _ = MatchState::new(3, 0..4, 1, MatchMode::Entire);
    }

    #[test]
    fn bounds_follow_flags() {
        let st = MatchState::new(10, 2..6, 1, MatchMode::Prefix);
        assert_eq!((st.start_bound(), st.end_bound()), (2, 6));
        assert_eq!((st.lookbehind_bound(), st.lookahead_bound()), (2, 6));

        let st = MatchState::new(10, 2..6, 1, MatchMode::Prefix).with_bounds(false, true);
        assert_eq!((st.start_bound(), st.end_bound()), (0, 10));
        assert_eq!((st.lookbehind_bound(), st.lookahead_bound()), (0, 10));
    }

    #[test]
    fn slots_save_and_restore() {
        let id = NodeId(1);
        let mut st = MatchState::new(4, 0..4, 2, MatchMode::Entire);
        assert_eq!(st.consumed(id), -1);
        st.set_consumed(id, 3);
        st.set_counter(id, 2);
        let saved = st.enter_slot(id);
        assert_eq!(st.consumed(id), -1);
        assert_eq!(st.counter(id), 0);
        st.set_consumed(id, 0);
        st.restore_slot(id, saved);
        assert_eq!(st.consumed(id), 3);
        assert_eq!(st.counter(id), 2);
    }

    #[test]
    fn limits_abort() {
        let mut st = MatchState::new(0, 0..0, 1, MatchMode::Entire).with_limits(Some(2), 10);
        assert!(st.step());
        assert!(st.step());
        assert!(!st.step());
        assert!(!st.enter());
        assert_eq!(st.take_abort(), Some(Error::StepLimitExceeded(2)));

        let mut st = MatchState::new(0, 0..0, 1, MatchMode::Entire).with_limits(None, 1);
        assert!(st.enter());
        assert!(!st.enter());
        assert_eq!(st.depth(), 1);
        assert_eq!(st.take_abort(), Some(Error::DepthLimitExceeded(1)));
    }

    #[test]
    fn depth_is_released() {
        let mut st = MatchState::new(0, 0..0, 1, MatchMode::Entire).with_limits(None, 2);
        for _ in 0..10 {
            assert!(st.enter());
            assert!(st.enter());
            st.leave();
            st.leave();
        }
        assert_eq!(st.depth(), 0);
        assert!(st.take_abort().is_none());
    }
}
