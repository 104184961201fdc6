//! The stack of open control constructs.
//!
//! Each nested body increments the depth. A frame opened at depth `d` sits at stack index `d`,
//! so whenever the stack is taller than the current depth, the frames above it belong to sibling
//! constructs that have ended and must be closed ("flushed") before anything else happens at this depth.

use crate::dsl::fsm::FsmId;
use crate::hdl::statement::{Pattern, Statement};
use crate::hdl::value::Value;
use crate::src_loc::SrcLoc;
use indexmap::IndexMap;

/// Statements recorded for a single body, grouped by domain in first-use order.
pub type DomainStatements = IndexMap<String, Vec<Statement>>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum CtrlKind {
    If,
    Switch,
    #[strum(serialize = "FSM")]
    Fsm,
}

impl CtrlKind {
    /// The construct that is permitted directly inside of this one.
    pub fn secondary(self) -> &'static str {
        match self {
            CtrlKind::If => "Elif/Else",
            CtrlKind::Switch => "Case",
            CtrlKind::Fsm => "State",
        }
    }
}

#[derive(Debug)]
pub enum CtrlFrame {
    If(IfFrame),
    Switch(SwitchFrame),
    Fsm(FsmFrame),
}

/// An `if_`/`elif`/`else_` chain, built up one branch at a time.
#[derive(Debug)]
pub struct IfFrame {
    pub depth: usize,
    pub src_loc: SrcLoc,
    pub branches: Vec<IfBranch>,
}

#[derive(Debug)]
pub struct IfBranch {
    /// `None` for the final `else_` branch.
    pub test: Option<Value>,
    pub body: DomainStatements,
    pub src_loc: SrcLoc,
}

#[derive(Debug)]
pub struct SwitchFrame {
    pub test: Value,
    pub src_loc: SrcLoc,
    /// Keyed by the full pattern set, an empty set is the default case.
    pub cases: IndexMap<Vec<Pattern>, SwitchFrameCase>,
}

#[derive(Debug)]
pub struct SwitchFrameCase {
    pub body: DomainStatements,
    pub src_loc: SrcLoc,
}

/// The state machine itself lives in the module's arena, it outlives the frame.
#[derive(Debug)]
pub struct FsmFrame {
    pub fsm: FsmId,
    pub src_loc: SrcLoc,
}

impl CtrlFrame {
    pub fn kind(&self) -> CtrlKind {
        match self {
            CtrlFrame::If(_) => CtrlKind::If,
            CtrlFrame::Switch(_) => CtrlKind::Switch,
            CtrlFrame::Fsm(_) => CtrlKind::Fsm,
        }
    }
}

#[derive(Debug, Default)]
pub struct CtrlStack {
    frames: Vec<CtrlFrame>,
    /// Nesting depth of the body currently being recorded.
    pub depth: usize,
    /// Set while directly inside a `switch` or `fsm` body, outside any of its cases or states.
    pub context: Option<CtrlKind>,
}

impl CtrlStack {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The number of frames that belong to ended sibling constructs.
    pub fn stale_count(&self) -> usize {
        self.frames.len().saturating_sub(self.depth)
    }

    pub fn push(&mut self, frame: CtrlFrame) {
        log::debug!("open {} frame at depth {}", frame.kind(), self.depth);
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<CtrlFrame> {
        self.frames.pop()
    }

    /// Drop every frame above `len` without lowering it, used when the body that opened them failed.
    pub fn truncate(&mut self, len: usize) {
        if self.frames.len() > len {
            log::debug!("discard {} frames of a failed body", self.frames.len() - len);
            self.frames.truncate(len);
        }
    }

    pub fn top(&self) -> Option<&CtrlFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut CtrlFrame> {
        self.frames.last_mut()
    }

    /// The `if_` chain on top of the stack, if it was opened at the current depth and can still be extended.
    pub fn open_if_chain(&mut self) -> Option<&mut IfFrame> {
        let depth = self.depth;
        match self.frames.last_mut() {
            Some(CtrlFrame::If(frame)) if frame.depth == depth => Some(frame),
            _ => None,
        }
    }

    /// The innermost state machine that is still open.
    pub fn innermost_fsm(&self) -> Option<FsmId> {
        self.frames.iter().rev().find_map(|frame| match frame {
            CtrlFrame::Fsm(frame) => Some(frame.fsm),
            _ => None,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::dsl::frame::{CtrlFrame, CtrlStack, IfFrame};
    use crate::src_loc::SrcLoc;

    fn if_frame(depth: usize) -> CtrlFrame {
        CtrlFrame::If(IfFrame {
            depth,
            src_loc: SrcLoc::caller(),
            branches: vec![],
        })
    }

    #[test]
    fn if_chain_only_at_matching_depth() {
        let mut stack = CtrlStack::default();
        stack.push(if_frame(0));
        assert!(stack.open_if_chain().is_some());

        stack.depth = 1;
        assert!(stack.open_if_chain().is_none());
        assert_eq!(stack.stale_count(), 0);

        stack.depth = 0;
        assert_eq!(stack.stale_count(), 1);
    }

    #[test]
    fn truncate_discards_frames_above() {
        let mut stack = CtrlStack::default();
        stack.push(if_frame(0));
        stack.push(if_frame(1));
        stack.push(if_frame(1));

        stack.truncate(1);
        assert_eq!(stack.len(), 1);
        stack.truncate(3);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn no_fsm_in_plain_stack() {
        let mut stack = CtrlStack::default();
        stack.push(if_frame(0));
        assert_eq!(stack.innermost_fsm(), None);
    }
}
