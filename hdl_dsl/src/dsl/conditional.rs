use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::dsl::frame::{CtrlFrame, IfBranch, IfFrame};
use crate::dsl::module::{BodyKind, Module};
use crate::error::{BuildError, BuildResult};
use crate::hdl::statement::{Pattern, Switch, SwitchCase};
use crate::hdl::value::Value;
use crate::src_loc::SrcLoc;
use crate::throw;
use annotate_snippets::Level;
use indexmap::IndexSet;
use itertools::Itertools;

impl Module {
    /// Start a new conditional chain. The chain can be continued with [Module::elif] and [Module::else_]
    /// at the same depth, it is closed by the next statement or construct at this depth.
    #[track_caller]
    pub fn if_(&mut self, cond: impl Into<Value>, body: impl FnOnce(&mut Module) -> BuildResult<()>) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        self.check_context("If", None, src_loc)?;
        let cond = self.check_signed_cond(cond.into(), src_loc);

        self.set_ctrl(CtrlFrame::If(IfFrame {
            depth: self.ctrl.depth,
            src_loc,
            branches: vec![],
        }))?;
        let chain_len = self.ctrl.len();
        let result = self.record_if_branch(Some(cond), src_loc, body);
        if result.is_err() {
            // a chain without its first branch cannot be continued
            self.ctrl.truncate(chain_len - 1);
        }
        result
    }

    #[track_caller]
    pub fn elif(&mut self, cond: impl Into<Value>, body: impl FnOnce(&mut Module) -> BuildResult<()>) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        self.check_context("Elif", None, src_loc)?;
        let cond = self.check_signed_cond(cond.into(), src_loc);

        if self.ctrl.open_if_chain().is_none() {
            throw!(BuildError::scoping("Elif without preceding If", src_loc));
        }
        self.record_if_branch(Some(cond), src_loc, body)
    }

    /// Finish the conditional chain with a branch that is taken when no earlier condition holds.
    #[track_caller]
    pub fn else_(&mut self, body: impl FnOnce(&mut Module) -> BuildResult<()>) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        self.check_context("Else", None, src_loc)?;

        if self.ctrl.open_if_chain().is_none() {
            throw!(BuildError::scoping("Else without preceding If/Elif", src_loc));
        }
        self.record_if_branch(None, src_loc, body)?;
        self.pop_ctrl()
    }

    fn record_if_branch(
        &mut self,
        test: Option<Value>,
        src_loc: SrcLoc,
        body: impl FnOnce(&mut Module) -> BuildResult<()>,
    ) -> BuildResult<()> {
        let body = self.scope_body(BodyKind::Branch, body)?;

        // nested frames were flushed at the end of the body, so the chain is back on top
        let frame = self
            .ctrl
            .open_if_chain()
            .unwrap_or_else(|| panic!("if chain should be on top of the stack after its body"));
        frame.branches.push(IfBranch { test, body, src_loc });
        Ok(())
    }

    fn check_signed_cond(&mut self, cond: Value, src_loc: SrcLoc) -> Value {
        if self.settings.warn_signed_condition && cond.shape().signed {
            let diag = Diagnostic::new(
                DiagnosticKind::SignedCondition,
                src_loc,
                "Signed values in If/Elif conditions usually result from inverting booleans with `not`, \
                which leads to unexpected results",
            )
            .footer(
                Level::Help,
                "if this is intentional, reduce the condition explicitly with `as_bool()`",
            );
            self.diags.report(diag);
        }
        cond
    }
}

/// The pattern that selects branch `index` out of `count` priority-ordered conditions.
///
/// Patterns are written most significant bit first and condition `i` ends up in bit `i`.
/// Only bit `index` is fixed: earlier conditions were handled by earlier cases of the switch,
/// later conditions do not matter once this one holds.
pub fn priority_pattern(index: usize, count: usize) -> String {
    assert!(index < count);
    (0..count).rev().map(|bit| if bit == index { '1' } else { '-' }).collect()
}

impl IfFrame {
    /// Lower the chain into one priority-encoded switch per touched domain.
    pub fn lower(self) -> Vec<(String, Switch)> {
        let IfFrame {
            depth: _,
            src_loc,
            mut branches,
        } = self;

        let domains: IndexSet<String> = branches
            .iter()
            .flat_map(|branch| branch.body.keys().cloned())
            .collect();
        if domains.is_empty() {
            return vec![];
        }

        let tests = branches.iter().filter_map(|branch| branch.test.as_ref()).collect_vec();
        let test_count = tests.len();
        let test = Value::cat(tests.iter().map(|test| test.as_bool()));

        domains
            .into_iter()
            .map(|domain| {
                let cases = branches
                    .iter_mut()
                    .enumerate()
                    .map(|(index, branch)| {
                        let patterns = match branch.test {
                            Some(_) => vec![Pattern::Bits(priority_pattern(index, test_count))],
                            None => vec![],
                        };
                        SwitchCase {
                            patterns,
                            body: branch.body.shift_remove(&domain).unwrap_or_default(),
                            src_loc: Some(branch.src_loc),
                        }
                    })
                    .collect_vec();

                let switch = Switch {
                    test: test.clone(),
                    cases,
                    src_loc,
                };
                (domain, switch)
            })
            .collect_vec()
    }
}

#[cfg(test)]
mod test {
    use crate::dsl::conditional::priority_pattern;

    #[test]
    fn priority_patterns() {
        assert_eq!(priority_pattern(0, 1), "1");
        assert_eq!(priority_pattern(0, 3), "--1");
        assert_eq!(priority_pattern(1, 3), "-1-");
        assert_eq!(priority_pattern(2, 3), "1--");
    }
}
