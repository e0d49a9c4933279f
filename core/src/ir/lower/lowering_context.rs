//! file: core/src/ir/lower/lowering_context.rs
//! description: per-file state threaded through every lowering call.
//!
//! `LoweringContext` owns the temporary and label counters, the set of
//! already-lowered node ids, the stack of enclosing break/continue targets
//! and the current nesting depth. A fresh context is created for each file
//! and passed by `&mut`; nothing is shared between files.

use std::collections::HashSet;

use crate::ast::{AstNode, NodeId};
use crate::config::LowerOptions;

use super::err::{LowerResult, LoweringError, LoweringErrorKind};

/// Entry and exit labels of one linearized construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPair {
    pub start: String,
    pub end: String,
}

/// Enclosing construct a `break`/`continue` can target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakFrame {
    Loop { break_to: String, continue_to: String },
    /// Jumps out of a switch stay textual.
    Switch,
}

#[derive(Debug, Clone)]
pub struct LoweringContext {
    temp_counter: usize,
    label_counter: usize,
    visited: HashSet<NodeId>,
    break_frames: Vec<BreakFrame>,
    depth: usize,
    options: LowerOptions,
}

impl Default for LoweringContext {
    fn default() -> Self {
        Self::new(LowerOptions::default())
    }
}

impl LoweringContext {
    pub fn new(options: LowerOptions) -> Self {
        LoweringContext {
            temp_counter: 0,
            label_counter: 0,
            visited: HashSet::new(),
            break_frames: Vec::new(),
            depth: 0,
            options,
        }
    }

    pub fn options(&self) -> &LowerOptions {
        &self.options
    }

    /// Fresh temporary, `t0`, `t1`, ... Never reused within a file.
    pub fn new_temp(&mut self) -> String {
        let name = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        log::trace!("allocated temp {}", name);
        name
    }

    pub fn new_label(&mut self) -> LabelPair {
        let n = self.label_counter;
        self.label_counter += 1;
        log::trace!("allocated label pair L{}", n);
        LabelPair {
            start: format!("L{}", n),
            end: format!("L{}_end", n),
        }
    }

    pub fn seen(&self, id: NodeId) -> bool {
        self.visited.contains(&id)
    }

    pub fn mark(&mut self, id: NodeId) {
        self.visited.insert(id);
    }

    /// Check-then-mark in one step. False when the node was already lowered.
    pub fn enter(&mut self, id: NodeId) -> bool {
        self.visited.insert(id)
    }

    pub fn descend(&mut self, node: &AstNode) -> LowerResult<()> {
        if self.depth >= self.options.max_depth {
            return Err(LoweringError::new(
                LoweringErrorKind::NestingLimitExceeded(self.options.max_depth),
                "phptac.ir.lower.lowering_context",
                node,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn push_loop(&mut self, break_to: &str, continue_to: &str) {
        self.break_frames.push(BreakFrame::Loop {
            break_to: break_to.to_string(),
            continue_to: continue_to.to_string(),
        });
    }

    pub fn push_switch(&mut self) {
        self.break_frames.push(BreakFrame::Switch);
    }

    pub fn pop_frame(&mut self) {
        self.break_frames.pop();
    }

    /// The `levels`-th enclosing frame, innermost first (1-based).
    pub fn break_frame(&self, levels: u32) -> Option<&BreakFrame> {
        let skip = (levels.max(1) - 1) as usize;
        self.break_frames.iter().rev().nth(skip)
    }

    /// Lowers `body` with no enclosing break targets; function and class
    /// bodies cannot jump into the code around them.
    pub fn with_fresh_frames<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.break_frames);
        let result = body(self);
        self.break_frames = saved;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstNodeKind;

    #[test]
    fn temps_and_labels_count_up() {
        let mut ctx = LoweringContext::default();
        assert_eq!(ctx.new_temp(), "t0");
        assert_eq!(ctx.new_temp(), "t1");
        let first = ctx.new_label();
        let second = ctx.new_label();
        assert_eq!(first, LabelPair { start: "L0".into(), end: "L0_end".into() });
        assert_eq!(second.start, "L1");
    }

    #[test]
    fn enter_marks_once() {
        let mut ctx = LoweringContext::default();
        let node = AstNode::bare(AstNodeKind::Nop);
        let twin = AstNode::bare(AstNodeKind::Nop);
        assert!(!ctx.seen(node.get_id()));
        assert!(ctx.enter(node.get_id()));
        assert!(!ctx.enter(node.get_id()));
        assert!(ctx.enter(twin.get_id()));
    }

    #[test]
    fn break_frames_resolve_innermost_first() {
        let mut ctx = LoweringContext::default();
        ctx.push_loop("L0_end", "L0");
        ctx.push_switch();
        assert_eq!(ctx.break_frame(1), Some(&BreakFrame::Switch));
        assert_eq!(
            ctx.break_frame(2),
            Some(&BreakFrame::Loop { break_to: "L0_end".into(), continue_to: "L0".into() })
        );
        assert_eq!(ctx.break_frame(3), None);
        ctx.with_fresh_frames(|inner| assert_eq!(inner.break_frame(1), None));
        ctx.pop_frame();
        assert!(matches!(ctx.break_frame(1), Some(BreakFrame::Loop { .. })));
    }

    #[test]
    fn depth_limit_fails() {
        let mut ctx = LoweringContext::new(LowerOptions { switch_fallthrough: false, max_depth: 1 });
        let node = AstNode::bare(AstNodeKind::Nop);
        assert!(ctx.descend(&node).is_ok());
        let err = ctx.descend(&node).unwrap_err();
        assert_eq!(err.kind(), &LoweringErrorKind::NestingLimitExceeded(1));
        ctx.ascend();
        assert!(ctx.descend(&node).is_ok());
    }
}
