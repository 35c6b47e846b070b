//! The backtracking engine and its two entry points.
//!
//! Every node is matched by "try this node at `pos`, then continue with its
//! `next` node". Whenever a node has something left to try it pushes a
//! `Frame` on an explicit stack instead of recursing, so failure pops back
//! to the nearest choice point without growing the native stack.

use std::ops::Range;

use log::trace;

use crate::error::{Error, Result};
use crate::flags::Flags;
use crate::line::LineTerminator;
use crate::node::{Anchor, Leaf, Node, NodeId};
use crate::quantifier::{Policy, Quantifier};
use crate::state::{MatchMode, MatchState, SavedSlot};

/// Backtracking stack entries allowed before an attempt is aborted.
pub const DEFAULT_DEPTH_LIMIT: usize = 1 << 20;

/// Bounds on the work a single attempt may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum node transitions; `None` is unlimited.
    pub step_limit: Option<usize>,
    /// Maximum number of pending backtracking points (choice points and the
    /// slot writes they undo) an attempt may hold at once.
    ///
    /// The engine keeps these on the heap, so this bounds memory rather than
    /// native stack frames; input length does not grow the native stack.
    pub depth_limit: usize,
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            step_limit: None,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

/// A compiled pattern: the node arena and its entry node.
#[derive(Debug)]
pub struct Program {
    nodes: Vec<Node>,
    root: NodeId,
    flags: Flags,
    limits: Limits,
}

/// The span of a match in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_str<'t>(&self, haystack: &'t str) -> &'t str {
        &haystack[self.range()]
    }
}

/// The result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub found: Option<Match>,
    /// The attempt needed input past the region's end, so more input could
    /// change the result.
    pub hit_end: bool,
}

impl MatchOutcome {
    pub fn success(&self) -> bool {
        self.found.is_some()
    }

    pub fn end(&self) -> Option<usize> {
        self.found.map(|m| m.end)
    }
}

/// The part of the input a search is confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub range: Range<usize>,
    /// `^` and `$` treat the region edges as input edges.
    pub anchoring_bounds: bool,
    /// Anchors may look at text outside the region.
    pub transparent_bounds: bool,
}

impl Region {
    pub fn new(range: Range<usize>) -> Region {
        Region {
            range,
            anchoring_bounds: true,
            transparent_bounds: false,
        }
    }

    pub fn whole(input: &str) -> Region {
        Region::new(0..input.len())
    }

    pub fn anchoring_bounds(mut self, yes: bool) -> Region {
        self.anchoring_bounds = yes;
        self
    }

    pub fn transparent_bounds(mut self, yes: bool) -> Region {
        self.transparent_bounds = yes;
        self
    }

    pub(crate) fn check(&self, input: &str) -> Result<()> {
        let Range { start, end } = self.range;
        if start > end
            || end > input.len()
            || !input.is_char_boundary(start)
            || !input.is_char_boundary(end)
        {
            return Err(Error::InvalidRegion {
                start,
                end,
                len: input.len(),
            });
        }
        Ok(())
    }
}

impl Program {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId, flags: Flags, limits: Limits) -> Program {
        Program {
            nodes,
            root,
            flags,
            limits,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node `id` refers to, or `None` if it is not part of this program.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Panics if `id` came from another program.
    #[inline]
    pub(crate) fn at(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Number of nodes, which is also the number of per-attempt slots.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Matches starting exactly at the region's left bound.
    ///
    /// With [`MatchMode::Entire`] the match must also end at the right bound.
    pub fn attempt_match(&self, input: &str, region: &Region, mode: MatchMode) -> Result<MatchOutcome> {
        region.check(input)?;
        let mut st = self.state(input, region, mode);
        let start = region.range.start;
        trace!("attempt_match {:?} at {} ({:?})", region, start, mode);
        let engine = Engine { prog: self, input };
        let found = engine.matches(self.root, start, &mut st).map(|end| Match { start, end });
        finish(st, found)
    }

    /// Finds the leftmost match starting at or after `from` within the region.
    pub fn attempt_find(&self, input: &str, region: &Region, from: usize) -> Result<MatchOutcome> {
        region.check(input)?;
        if from < region.range.start || from > region.range.end || !input.is_char_boundary(from) {
            return Err(Error::InvalidRegion {
                start: from,
                end: region.range.end,
                len: input.len(),
            });
        }
        let mut st = self.state(input, region, MatchMode::Prefix);
        trace!("attempt_find {:?} from {}", region, from);
        let engine = Engine { prog: self, input };
        let found = engine
            .find(self.root, from, &mut st)
            .map(|(start, end)| Match { start, end });
        finish(st, found)
    }

    fn state(&self, input: &str, region: &Region, mode: MatchMode) -> MatchState {
        MatchState::new(input.len(), region.range.clone(), self.nodes.len(), mode)
            .with_bounds(region.anchoring_bounds, region.transparent_bounds)
            .with_limits(self.limits.step_limit, self.limits.depth_limit)
    }
}

fn finish(mut st: MatchState, found: Option<Match>) -> Result<MatchOutcome> {
    if let Some(err) = st.take_abort() {
        return Err(err);
    }
    Ok(MatchOutcome {
        found,
        hit_end: st.hit_end(),
    })
}

#[inline]
fn prev_char_len(input: &str, pos: usize) -> usize {
    input[..pos].chars().next_back().map_or(1, char::len_utf8)
}

#[inline]
fn next_char_len(input: &str, pos: usize) -> usize {
    input[pos..].chars().next().map_or(1, char::len_utf8)
}

/// An entry on the backtracking stack: a choice point to resume, or a slot
/// write to undo when unwinding past it.
#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Try branch `index` of an alternation.
    Branch { id: NodeId, index: usize, pos: usize },
    /// Give back the last repetition of a greedy leaf quantifier.
    GiveBack { id: NodeId, pos: usize, count: usize },
    /// Take one more repetition of a reluctant leaf quantifier.
    TakeMore { id: NodeId, pos: usize, count: usize },
    /// Leave a greedy composite quantifier instead of running another pass.
    Stop { next: NodeId, pos: usize },
    /// Run another pass of a reluctant composite quantifier.
    Iterate { id: NodeId, body: NodeId, pos: usize },
    /// Retry the continuation of `.*` one character further left.
    Retreat { next: NodeId, left: usize, pos: usize },
    /// Retry the continuation of `.*` at an earlier `byte` in `left..hi`.
    RetreatTo { next: NodeId, byte: u8, left: usize, hi: usize },
    Slot { id: NodeId, saved: SavedSlot },
    IterationStart { id: NodeId, pos: usize },
    /// Undone on failure only: a matched end-of-line keeps its slot.
    Consumed { id: NodeId, value: isize },
}

fn push(stack: &mut Vec<Frame>, frame: Frame, st: &mut MatchState) -> Option<()> {
    if !st.enter() {
        return None;
    }
    stack.push(frame);
    Some(())
}

/// Empties the stack, undoing slot writes. After a match the end-of-line
/// slots that matched are left alone.
fn unwind(stack: &mut Vec<Frame>, st: &mut MatchState, matched: bool) {
    while let Some(frame) = stack.pop() {
        st.leave();
        match frame {
            Frame::Slot { id, saved } => st.restore_slot(id, saved),
            Frame::IterationStart { id, pos } => st.set_iteration_start(id, pos),
            Frame::Consumed { id, value } if !matched => st.set_consumed(id, value),
            _ => {}
        }
    }
}

struct Engine<'p, 't> {
    prog: &'p Program,
    input: &'t str,
}

impl<'p, 't> Engine<'p, 't> {
    /// Matches the chain starting at `id` from `pos`, returning where the whole
    /// match ends.
    ///
    /// Every call owns its backtracking stack and undoes its slot writes on the
    /// way out, except for end-of-line anchors that matched. Only possessive
    /// groups call back in here, so native recursion is bounded by how deeply
    /// they nest in the pattern.
    fn matches(&self, id: NodeId, pos: usize, st: &mut MatchState) -> Option<usize> {
        let mut stack = Vec::new();
        let mut resume = Some((id, pos));
        while let Some((id, pos)) = resume {
            if let Some(end) = self.run(id, pos, &mut stack, st) {
                unwind(&mut stack, st, true);
                return Some(end);
            }
            resume = self.backtrack(&mut stack, st);
        }
        unwind(&mut stack, st, false);
        None
    }

    /// Walks the chain forward from `id` until it reaches `Final` or fails,
    /// pushing a frame wherever something is left to try.
    fn run(&self, mut id: NodeId, mut pos: usize, stack: &mut Vec<Frame>, st: &mut MatchState) -> Option<usize> {
        loop {
            if !st.step() {
                return None;
            }
            match self.prog.at(id) {
                Node::Final => {
                    return match st.mode() {
                        MatchMode::Prefix => Some(pos),
                        MatchMode::Entire if pos == st.right_bound() => Some(pos),
                        MatchMode::Entire => None,
                    };
                }
                Node::Leaf { leaf, next } => {
                    pos += self.accept(leaf, pos, st)?;
                    id = *next;
                }
                Node::Anchor {
                    anchor: Anchor::EndOfLine,
                    line,
                    next,
                } => {
                    if !self.at_end_of_line(line, pos, st) {
                        return None;
                    }
                    let value = st.consumed(id);
                    push(stack, Frame::Consumed { id, value }, st)?;
                    st.set_consumed(id, 0);
                    id = *next;
                }
                Node::Anchor { anchor, line, next } => {
                    if !self.anchor_holds(*anchor, line, pos, st) {
                        return None;
                    }
                    id = *next;
                }
                Node::Alternation { branches } => {
                    let first = *branches.first()?;
                    if branches.len() > 1 {
                        push(stack, Frame::Branch { id, index: 1, pos }, st)?;
                    }
                    id = first;
                }
                Node::GreedyQuantifier {
                    leaf,
                    quantifier,
                    next,
                } => {
                    let (end, count) = self.consume_max(leaf, quantifier, pos, st);
                    if count < quantifier.min() {
                        return None;
                    }
                    if count > quantifier.min() {
                        push(stack, Frame::GiveBack { id, pos: end, count }, st)?;
                    }
                    pos = end;
                    id = *next;
                }
                Node::ReluctantQuantifier {
                    leaf,
                    quantifier,
                    next,
                } => {
                    let mut count = 0;
                    while count < quantifier.min() {
                        pos += self.accept(leaf, pos, st)?;
                        count += 1;
                    }
                    if quantifier.allows(count) {
                        push(stack, Frame::TakeMore { id, pos, count }, st)?;
                    }
                    id = *next;
                }
                Node::PossessiveQuantifier {
                    leaf,
                    quantifier,
                    next,
                } => {
                    let (end, count) = self.consume_max(leaf, quantifier, pos, st);
                    if count < quantifier.min() {
                        return None;
                    }
                    pos = end;
                    id = *next;
                }
                Node::CompositeQuantifier {
                    body,
                    quantifier,
                    policy: Policy::Possessive,
                    next,
                } => {
                    pos = self.composite_possessive(id, *body, quantifier, pos, st)?;
                    id = *next;
                }
                Node::CompositeQuantifier { .. } => {
                    let saved = st.enter_slot(id);
                    push(stack, Frame::Slot { id, saved }, st)?;
                    (id, pos) = self.repeat(id, pos, stack, st)?;
                }
                Node::GroupEnd { quantifier } => {
                    let quantifier = *quantifier;
                    let saved = st.save_slot(quantifier);
                    push(stack, Frame::Slot { id: quantifier, saved }, st)?;
                    let count = st.counter(quantifier);
                    st.set_consumed(quantifier, (pos - st.iteration_start(quantifier)) as isize);
                    st.set_counter(quantifier, count + 1);
                    if let Node::CompositeQuantifier {
                        policy: Policy::Possessive,
                        ..
                    } = self.prog.at(quantifier)
                    {
                        // A possessive pass is matched on its own; see composite_possessive.
                        return Some(pos);
                    }
                    (id, pos) = self.repeat(quantifier, pos, stack, st)?;
                }
                Node::DotQuantifier { line, next } => {
                    let right = st.right_bound();
                    let limit = match line.find(&self.input[pos..right]) {
                        Some(i) => pos + i,
                        None => {
                            st.set_hit_end();
                            right
                        }
                    };
                    if limit != pos {
                        pos = self.find_back(*next, pos, limit, stack, st)?;
                    }
                    id = *next;
                }
                Node::DotAllQuantifier { next } => {
                    st.set_hit_end();
                    pos = self.find_back(*next, pos, st.right_bound(), stack, st)?;
                    id = *next;
                }
            }
        }
    }

    /// Pops frames, undoing slot writes, until a choice point yields the next
    /// node and position to try.
    fn backtrack(&self, stack: &mut Vec<Frame>, st: &mut MatchState) -> Option<(NodeId, usize)> {
        while !st.is_aborted() {
            let frame = stack.pop()?;
            st.leave();
            match frame {
                Frame::Slot { id, saved } => st.restore_slot(id, saved),
                Frame::IterationStart { id, pos } => st.set_iteration_start(id, pos),
                Frame::Consumed { id, value } => st.set_consumed(id, value),
                Frame::Branch { id, index, pos } => {
                    if let Node::Alternation { branches } = self.prog.at(id) {
                        if index + 1 < branches.len() {
                            push(stack, Frame::Branch { id, index: index + 1, pos }, st)?;
                        }
                        return Some((branches[index], pos));
                    }
                }
                Frame::GiveBack { id, pos, count } => {
                    if let Node::GreedyQuantifier { quantifier, next, .. } = self.prog.at(id) {
                        let pos = pos - prev_char_len(self.input, pos);
                        let count = count - 1;
                        if count > quantifier.min() {
                            push(stack, Frame::GiveBack { id, pos, count }, st)?;
                        }
                        return Some((*next, pos));
                    }
                }
                Frame::TakeMore { id, pos, count } => {
                    if let Node::ReluctantQuantifier {
                        leaf,
                        quantifier,
                        next,
                    } = self.prog.at(id)
                    {
                        if let Some(width) = self.accept(leaf, pos, st) {
                            let (pos, count) = (pos + width, count + 1);
                            if quantifier.allows(count) {
                                push(stack, Frame::TakeMore { id, pos, count }, st)?;
                            }
                            return Some((*next, pos));
                        }
                    }
                }
                Frame::Stop { next, pos } => return Some((next, pos)),
                Frame::Iterate { id, body, pos } => return self.iterate(id, body, pos, stack, st),
                Frame::Retreat { next, left, pos } => {
                    let pos = pos - prev_char_len(self.input, pos);
                    if pos > left {
                        push(stack, Frame::Retreat { next, left, pos }, st)?;
                    }
                    return Some((next, pos));
                }
                Frame::RetreatTo { next, byte, left, hi } => {
                    if let Some(pos) = self.find_back_byte(next, byte, left, hi, stack, st) {
                        return Some((next, pos));
                    }
                }
            }
        }
        None
    }

    /// Runs a leaf at `pos`, raising `hit_end` when it failed for lack of input.
    #[inline]
    fn accept(&self, leaf: &Leaf, pos: usize, st: &mut MatchState) -> Option<usize> {
        let right = st.right_bound();
        match leaf.accepts(self.input, pos, right) {
            Some(width) => Some(width),
            None => {
                if leaf.overruns(self.input, pos, right) {
                    st.set_hit_end();
                }
                None
            }
        }
    }

    /// Consumes as many repetitions as allowed, returning the position and
    /// count reached.
    fn consume_max(&self, leaf: &Leaf, quantifier: &Quantifier, mut pos: usize, st: &mut MatchState) -> (usize, usize) {
        let mut count = 0;
        while quantifier.allows(count) {
            match self.accept(leaf, pos, st) {
                Some(width) => {
                    pos += width;
                    count += 1;
                }
                None => break,
            }
        }
        (pos, count)
    }

    /// Decides between another pass of a composite quantifier's body and its
    /// continuation, returning the one to run first. `counter(id)` passes have
    /// completed so far.
    fn repeat(&self, id: NodeId, pos: usize, stack: &mut Vec<Frame>, st: &mut MatchState) -> Option<(NodeId, usize)> {
        let (body, quantifier, policy, next) = match self.prog.at(id) {
            Node::CompositeQuantifier {
                body,
                quantifier,
                policy,
                next,
            } => (*body, quantifier, *policy, *next),
            _ => return None,
        };
        let count = st.counter(id);
        let can_stop = count >= quantifier.min();
        if count > 0 {
            // Both checks run so the body head's slot is always reset.
            let own = self.has_consumed(id, st);
            let head = self.has_consumed(body, st);
            if can_stop && !(own && head) {
                return Some((next, pos));
            }
        }
        let can_repeat = quantifier.allows(count);
        if policy == Policy::Reluctant {
            if can_stop {
                if can_repeat {
                    push(stack, Frame::Iterate { id, body, pos }, st)?;
                }
                return Some((next, pos));
            }
            if can_repeat {
                return self.iterate(id, body, pos, stack, st);
            }
            return None;
        }
        if can_repeat {
            if can_stop {
                push(stack, Frame::Stop { next, pos }, st)?;
            }
            return self.iterate(id, body, pos, stack, st);
        }
        if can_stop {
            return Some((next, pos));
        }
        None
    }

    fn iterate(&self, id: NodeId, body: NodeId, pos: usize, stack: &mut Vec<Frame>, st: &mut MatchState) -> Option<(NodeId, usize)> {
        let start = st.iteration_start(id);
        push(stack, Frame::IterationStart { id, pos: start }, st)?;
        st.set_iteration_start(id, pos);
        Some((body, pos))
    }

    /// Runs body passes without backtracking into them and returns where the
    /// last one ended.
    fn composite_possessive(
        &self,
        id: NodeId,
        body: NodeId,
        quantifier: &Quantifier,
        mut pos: usize,
        st: &mut MatchState,
    ) -> Option<usize> {
        let saved = st.enter_slot(id);
        let mut count = 0;
        while quantifier.allows(count) {
            st.set_iteration_start(id, pos);
            match self.matches(body, pos, st) {
                Some(end) if end == pos && count >= quantifier.min() => break,
                Some(end) => {
                    pos = end;
                    count += 1;
                }
                None => break,
            }
        }
        st.restore_slot(id, saved);
        if count < quantifier.min() || st.is_aborted() {
            return None;
        }
        Some(pos)
    }

    /// Whether the node's last visit consumed input (or it was not visited).
    fn has_consumed(&self, id: NodeId, st: &mut MatchState) -> bool {
        match self.prog.at(id) {
            Node::CompositeQuantifier { .. } => st.consumed(id) != 0,
            Node::Anchor {
                anchor: Anchor::EndOfLine,
                ..
            } => {
                // Reported once per visit, then the slot is unvisited again.
                let consumed = st.consumed(id);
                st.set_consumed(id, -1);
                consumed != 0
            }
            _ => true,
        }
    }

    /// At the end bound, or before a final `\r\n` or single line terminator.
    fn at_end_of_line(&self, line: &LineTerminator, pos: usize, st: &mut MatchState) -> bool {
        if pos >= st.right_bound() {
            st.set_hit_end();
        }
        let end = st.end_bound();
        if pos == end {
            return true;
        }
        if end > st.lookahead_bound() {
            return false;
        }
        let rest = &self.input[pos..end];
        if line.is_crlf_aware() && rest == "\r\n" {
            return true;
        }
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            // Not between the two halves of a `\r\n`.
            (Some('\n'), None)
                if line.is_crlf_aware()
                    && pos > st.lookbehind_bound()
                    && self.input[..pos].ends_with('\r') =>
            {
                false
            }
            (Some(ch), None) => line.is_line_terminator(ch),
            _ => false,
        }
    }

    fn anchor_holds(&self, anchor: Anchor, line: &LineTerminator, pos: usize, st: &mut MatchState) -> bool {
        match anchor {
            Anchor::StartOfInput => pos == st.start_bound(),
            Anchor::StartOfLine => {
                if pos == st.start_bound() {
                    return true;
                }
                if pos <= st.lookbehind_bound() || pos >= st.end_bound() {
                    return false;
                }
                let prev = match self.input[..pos].chars().next_back() {
                    Some(ch) => ch,
                    None => return false,
                };
                let next = self.input[pos..st.lookahead_bound().max(pos)].chars().next();
                line.is_after_line_terminator(prev, next)
            }
            Anchor::EndOfInput => {
                if pos >= st.right_bound() {
                    st.set_hit_end();
                }
                pos == st.end_bound()
            }
            Anchor::EndOfLine => self.at_end_of_line(line, pos, st),
            Anchor::MultiLineEnd => {
                if pos >= st.right_bound() {
                    st.set_hit_end();
                }
                if pos == st.end_bound() {
                    return true;
                }
                if pos >= st.lookahead_bound() {
                    return false;
                }
                match self.input[pos..].chars().next() {
                    // Not between the two halves of a `\r\n`.
                    Some('\n')
                        if line.is_crlf_aware()
                            && pos > st.lookbehind_bound()
                            && self.input[..pos].ends_with('\r') =>
                    {
                        false
                    }
                    Some(ch) => line.is_line_terminator(ch),
                    None => false,
                }
            }
        }
    }

    /// Tries the continuation `next` at each position from `right` down to
    /// `left`: returns the first one and leaves a frame for the rest.
    fn find_back(&self, next: NodeId, left: usize, right: usize, stack: &mut Vec<Frame>, st: &mut MatchState) -> Option<usize> {
        if let Node::Leaf { leaf, .. } = self.prog.at(next) {
            if let Some(byte) = leaf.literal_byte() {
                if right >= st.right_bound() {
                    // The leaf would have run out of input there.
                    st.set_hit_end();
                }
                let hi = (right + 1).min(st.right_bound());
                return self.find_back_byte(next, byte, left, hi, stack, st);
            }
        }
        if right > left {
            push(stack, Frame::Retreat { next, left, pos: right }, st)?;
        }
        Some(right)
    }

    /// The last `byte` in `left..hi`; only those positions can start the
    /// literal that follows.
    fn find_back_byte(&self, next: NodeId, byte: u8, left: usize, hi: usize, stack: &mut Vec<Frame>, st: &mut MatchState) -> Option<usize> {
        if hi <= left {
            return None;
        }
        let pos = left + memchr::memrchr(byte, &self.input.as_bytes()[left..hi])?;
        if pos > left {
            push(stack, Frame::RetreatTo { next, byte, left, hi: pos }, st)?;
        }
        Some(pos)
    }

    /// Finds the leftmost position at or after `from` where the chain at `id`
    /// matches, returning the match span.
    fn find(&self, id: NodeId, from: usize, st: &mut MatchState) -> Option<(usize, usize)> {
        match self.prog.at(id) {
            Node::DotQuantifier { line, next } => {
                let (at, _) = self.find(*next, from, st)?;
                // The match starts where the line containing `at` starts.
                let start = match line.rfind(&self.input[from..at]) {
                    Some(i) => from + i + next_char_len(self.input, from + i),
                    None => from,
                };
                let end = self.matches(id, start, st)?;
                Some((start, end))
            }
            Node::DotAllQuantifier { next } => {
                self.find(*next, from, st)?;
                let end = self.matches(id, from, st)?;
                Some((from, end))
            }
            Node::Anchor {
                anchor: Anchor::StartOfInput,
                ..
            } => {
                let start = st.start_bound();
                if start < from {
                    return None;
                }
                let end = self.matches(id, start, st)?;
                Some((start, end))
            }
            Node::Leaf { leaf, .. } if leaf.literal_byte().is_some() => {
                let byte = leaf.literal_byte()?;
                let right = st.right_bound();
                let bytes = self.input.as_bytes();
                let mut pos = from;
                while let Some(i) = memchr::memchr(byte, &bytes[pos..right]) {
                    let at = pos + i;
                    if let Some(end) = self.matches(id, at, st) {
                        return Some((at, end));
                    }
                    if st.is_aborted() {
                        return None;
                    }
                    pos = at + 1;
                }
                // No candidate left; the leaf ran out of region.
                st.set_hit_end();
                None
            }
            _ => {
                let right = st.right_bound();
                let mut pos = from;
                loop {
                    if let Some(end) = self.matches(id, pos, st) {
                        return Some((pos, end));
                    }
                    if pos >= right || st.is_aborted() {
                        return None;
                    }
                    pos += next_char_len(self.input, pos);
                }
            }
        }
    }
}
