use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::dsl::frame::{CtrlFrame, CtrlKind, SwitchFrame, SwitchFrameCase};
use crate::dsl::module::{BodyKind, Module};
use crate::error::{BuildError, BuildResult};
use crate::hdl::statement::{Pattern, Switch, SwitchCase};
use crate::hdl::value::{bits_for, Const, Signal, Value};
use crate::src_loc::SrcLoc;
use crate::throw;
use crate::util::data::IndexMapExt;
use indexmap::IndexSet;
use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::Zero;
use unwrap_match::unwrap_match;

/// A pattern as written by the user, before validation against the switch value.
#[derive(Debug, Clone)]
pub enum CasePattern {
    /// Bits from most to least significant: `0`, `1` or `-` for don't care, whitespace is ignored.
    Bits(String),
    /// Any value that can be cast to a constant.
    Value(Value),
}

impl From<&str> for CasePattern {
    fn from(value: &str) -> Self {
        CasePattern::Bits(value.to_owned())
    }
}

impl From<String> for CasePattern {
    fn from(value: String) -> Self {
        CasePattern::Bits(value)
    }
}

impl From<Value> for CasePattern {
    fn from(value: Value) -> Self {
        CasePattern::Value(value)
    }
}

impl From<Const> for CasePattern {
    fn from(value: Const) -> Self {
        CasePattern::Value(Value::Const(value))
    }
}

impl From<&Signal> for CasePattern {
    fn from(value: &Signal) -> Self {
        CasePattern::Value(Value::from(value))
    }
}

macro_rules! impl_case_pattern_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CasePattern {
                fn from(value: $t) -> Self {
                    CasePattern::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_case_pattern_from_int!(i32, u32, i64, u64, usize, BigInt);

/// The pattern set of the default case, which always matches.
const DEFAULT_PATTERNS: &[Pattern] = &[];

impl Module {
    /// Start a multi-way branch on `test`. The body may only contain [Module::case] and [Module::default].
    #[track_caller]
    pub fn switch(&mut self, test: impl Into<Value>, body: impl FnOnce(&mut Module) -> BuildResult<()>) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        self.check_context("Switch", None, src_loc)?;

        self.set_ctrl(CtrlFrame::Switch(SwitchFrame {
            test: test.into(),
            src_loc,
            cases: Default::default(),
        }))?;
        self.scope_construct(CtrlKind::Switch, body)?;
        self.pop_ctrl()
    }

    /// Add a case that is taken when the switch value matches any of `patterns`.
    ///
    /// Patterns that can never match are dropped with a diagnostic, a case without remaining patterns is
    /// dropped entirely. If a case with the exact same patterns already exists, the first one is kept.
    #[track_caller]
    pub fn case<P: Into<CasePattern>>(
        &mut self,
        patterns: impl IntoIterator<Item = P>,
        body: impl FnOnce(&mut Module) -> BuildResult<()>,
    ) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        self.check_context("Case", Some(CtrlKind::Switch), src_loc)?;

        let width = self.top_switch().test.width();
        self.check_after_default(src_loc);

        let mut new_patterns = vec![];
        for pattern in patterns {
            if let Some(pattern) = self.normalize_pattern(pattern.into(), width, src_loc)? {
                new_patterns.push(pattern);
            }
        }

        let body = self.scope_body(BodyKind::Arm, body)?;

        if new_patterns.is_empty() {
            log::trace!("dropping case without possible patterns");
            return Ok(());
        }
        let frame = self.top_switch_mut();
        if !frame.cases.insert_if_absent(new_patterns, SwitchFrameCase { body, src_loc }) {
            log::trace!("dropping duplicate case, the first one is kept");
        }
        Ok(())
    }

    /// Add a case that is taken when no earlier case matches.
    #[track_caller]
    pub fn default(&mut self, body: impl FnOnce(&mut Module) -> BuildResult<()>) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        self.check_context("Default", Some(CtrlKind::Switch), src_loc)?;
        self.check_after_default(src_loc);

        let body = self.scope_body(BodyKind::Arm, body)?;

        self.top_switch_mut()
            .cases
            .insert_if_absent(vec![], SwitchFrameCase { body, src_loc });
        Ok(())
    }

    fn top_switch(&self) -> &SwitchFrame {
        unwrap_match!(self.ctrl.top(), Some(CtrlFrame::Switch(frame)) => frame)
    }

    fn top_switch_mut(&mut self) -> &mut SwitchFrame {
        unwrap_match!(self.ctrl.top_mut(), Some(CtrlFrame::Switch(frame)) => frame)
    }

    fn check_after_default(&mut self, src_loc: SrcLoc) {
        if self.top_switch().cases.contains_key(DEFAULT_PATTERNS) {
            self.diags.report(Diagnostic::new(
                DiagnosticKind::CaseAfterDefault,
                src_loc,
                "A case defined after the default case will never be active",
            ));
        }
    }

    /// Validate a pattern against the switch width.
    /// Returns `None` for constant patterns that can never match.
    fn normalize_pattern(&mut self, pattern: CasePattern, width: u32, src_loc: SrcLoc) -> BuildResult<Option<Pattern>> {
        match pattern {
            CasePattern::Bits(bits) => {
                if bits.chars().any(|c| !matches!(c, '0' | '1' | '-' | ' ' | '\t')) {
                    throw!(BuildError::pattern(
                        format!(
                            "Case pattern '{}' must consist of 0, 1, and - (don't care) bits, and may include whitespace",
                            bits
                        ),
                        src_loc
                    ));
                }
                let stripped: String = bits.chars().filter(|c| !c.is_whitespace()).collect();
                if stripped.len() != width as usize {
                    throw!(BuildError::pattern(
                        format!(
                            "Case pattern '{}' must have the same width as switch value (which is {})",
                            bits, width
                        ),
                        src_loc
                    ));
                }
                Ok(Some(Pattern::Bits(stripped)))
            }
            CasePattern::Value(value) => {
                let Some(constant) = value.as_const() else {
                    throw!(BuildError::pattern(
                        format!(
                            "Case pattern must be a string or a constant-castable expression, not {}",
                            value
                        ),
                        src_loc
                    ));
                };

                let pattern_value = constant.value();
                let pattern_len = if pattern_value.is_zero() { 0 } else { bits_for(pattern_value) };
                if pattern_len > width {
                    self.diags.report(Diagnostic::new(
                        DiagnosticKind::DeadCase,
                        src_loc,
                        format!(
                            "Case pattern '{}' ({}'{:b}) is wider than switch value (which has width {}); \
                            comparison will never be true",
                            value, pattern_len, pattern_value, width
                        ),
                    ));
                    return Ok(None);
                }
                Ok(Some(Pattern::Int(pattern_value.clone())))
            }
        }
    }
}

impl SwitchFrame {
    /// Lower into one switch per touched domain. Every case is present in every switch,
    /// with an empty body for domains the case does not touch.
    pub fn lower(self) -> Vec<(String, Switch)> {
        let SwitchFrame { test, src_loc, mut cases } = self;

        let domains: IndexSet<String> = cases.values().flat_map(|case| case.body.keys().cloned()).collect();

        domains
            .into_iter()
            .map(|domain| {
                let domain_cases = cases
                    .iter_mut()
                    .map(|(patterns, case)| SwitchCase {
                        patterns: patterns.clone(),
                        body: case.body.shift_remove(&domain).unwrap_or_default(),
                        src_loc: Some(case.src_loc),
                    })
                    .collect_vec();
                let switch = Switch {
                    test: test.clone(),
                    cases: domain_cases,
                    src_loc,
                };
                (domain, switch)
            })
            .collect_vec()
    }
}
