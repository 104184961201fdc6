use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::dsl::driver::DriverRegistry;
use crate::dsl::fsm::{FsmId, FsmInfo};
use crate::dsl::frame::{CtrlFrame, CtrlKind, CtrlStack, DomainStatements};
use crate::error::{BuildError, BuildResult};
use crate::hdl::fragment::{ClockDomain, Elaboratable, COMB_DOMAIN};
use crate::hdl::statement::{IntoStatements, Statement, Switch};
use crate::hdl::value::Signal;
use crate::settings::DslSettings;
use crate::src_loc::SrcLoc;
use crate::throw;
use crate::util::arena::Arena;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

/// Procedural builder for a single hardware module.
///
/// Statements are appended to named domains, optionally nested inside conditional, switch and state machine
/// constructs. Each construct takes a closure that records its body. Once the description is complete,
/// [Module::elaborate] lowers everything into a [crate::hdl::fragment::Fragment].
pub struct Module {
    pub(super) settings: DslSettings,
    pub(super) diags: Diagnostics,

    /// Statements of the body currently being recorded.
    pub(super) statements: DomainStatements,
    pub(super) ctrl: CtrlStack,
    /// State machine "ongoing" indicators, always combinational.
    pub(super) top_comb_statements: Vec<Statement>,
    pub(super) drivers: DriverRegistry,

    pub(super) named_submodules: IndexMap<String, (Box<dyn Elaboratable>, SrcLoc)>,
    pub(super) anon_submodules: Vec<(Box<dyn Elaboratable>, SrcLoc)>,
    pub(super) domains: IndexMap<String, ClockDomain>,

    pub(super) fsms: Arena<FsmId, FsmInfo>,
    pub(super) generated: IndexMap<String, FsmId>,

    pub(super) src_loc: SrcLoc,
}

/// How a body changes the builder state while it is being recorded.
#[derive(Debug, Copy, Clone)]
pub(super) enum BodyKind {
    /// The body of an `if_`, `elif` or `else_` branch: one level deeper, statements captured.
    Branch,
    /// The body of a `case`, `default` or `state`: same depth as the enclosing construct, statements captured.
    Arm,
}

impl Module {
    #[track_caller]
    pub fn new() -> Module {
        Module::with_settings(DslSettings::default())
    }

    #[track_caller]
    pub fn with_settings(settings: DslSettings) -> Module {
        Module {
            settings,
            diags: Diagnostics::new(),
            statements: IndexMap::new(),
            ctrl: CtrlStack::default(),
            top_comb_statements: vec![],
            drivers: DriverRegistry::default(),
            named_submodules: IndexMap::new(),
            anon_submodules: vec![],
            domains: IndexMap::new(),
            fsms: Arena::default(),
            generated: IndexMap::new(),
            src_loc: SrcLoc::caller(),
        }
    }

    pub fn settings(&self) -> &DslSettings {
        &self.settings
    }

    /// Advisory diagnostics reported so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diags.diagnostics()
    }

    /// Render all diagnostics reported so far, separated by empty lines.
    pub fn diagnostics_string(&self) -> String {
        let settings = self.settings.diagnostic_string_settings();
        self.diags
            .diagnostics()
            .iter()
            .map(|diag| diag.to_string(settings))
            .join("\n\n")
    }

    /// Append assignments or property checks to `domain`.
    #[track_caller]
    pub fn add(&mut self, domain: &str, statements: impl IntoStatements) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        let statements = statements.into_statements();

        if let Some(context) = self.ctrl.context {
            throw!(BuildError::scoping(
                format!(
                    "Statements are not permitted directly inside of {}; they are permitted inside of {} {}",
                    context,
                    context,
                    context.secondary()
                ),
                src_loc
            ));
        }
        for stmt in &statements {
            match stmt {
                Statement::Assign(_) | Statement::Property(_) => {}
                Statement::Switch(_) | Statement::FsmNext(_) => throw!(BuildError::scoping(
                    format!("Only assignments and property checks may be appended to d.{}", domain),
                    src_loc
                )),
            }
        }
        if domain == "submodules" {
            self.diags.report(Diagnostic::new(
                DiagnosticKind::SuspiciousDomainName,
                src_loc,
                "Adding statements to domain 'submodules', did you mean to add a submodule instead?",
            ));
        }

        self.push_statements(domain, statements, src_loc)
    }

    #[track_caller]
    pub fn comb(&mut self, statements: impl IntoStatements) -> BuildResult<()> {
        self.add(COMB_DOMAIN, statements)
    }

    #[track_caller]
    pub fn sync(&mut self, statements: impl IntoStatements) -> BuildResult<()> {
        self.add("sync", statements)
    }

    /// Append statements without checking their kind, after closing ended sibling constructs.
    /// Every written signal is checked against the driver registry before anything is recorded,
    /// so a conflict leaves both the registry and the current body untouched.
    pub(super) fn push_statements(
        &mut self,
        domain: &str,
        statements: Vec<Statement>,
        src_loc: SrcLoc,
    ) -> BuildResult<()> {
        self.flush_ctrl()?;

        let signals: IndexSet<Signal> = statements
            .iter()
            .filter_map(|stmt| match stmt {
                Statement::Assign(assign) => Some(assign.lhs.lhs_signals()),
                _ => None,
            })
            .flatten()
            .collect();
        for signal in &signals {
            self.drivers.check(signal, domain, src_loc)?;
        }
        for signal in &signals {
            self.drivers.drive(signal, domain, src_loc)?;
        }

        for stmt in statements {
            log::trace!("append to domain {} at depth {}: {:?}", domain, self.ctrl.depth, stmt);
            self.statements.entry(domain.to_owned()).or_default().push(stmt);
        }
        Ok(())
    }

    #[track_caller]
    pub fn add_submodule(&mut self, submodule: impl Elaboratable + 'static) {
        self.anon_submodules.push((Box::new(submodule), SrcLoc::caller()));
    }

    #[track_caller]
    pub fn add_named_submodule(
        &mut self,
        name: impl Into<String>,
        submodule: impl Elaboratable + 'static,
    ) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        let name = name.into();
        if self.named_submodules.contains_key(&name) {
            throw!(BuildError::naming(
                format!("Submodule named '{}' already exists", name),
                src_loc
            ));
        }
        self.named_submodules.insert(name, (Box::new(submodule), src_loc));
        Ok(())
    }

    #[track_caller]
    pub fn submodule(&self, name: &str) -> BuildResult<&dyn Elaboratable> {
        match self.named_submodules.get(name) {
            Some((submodule, _)) => Ok(submodule.as_ref()),
            None => Err(BuildError::naming(
                format!("No submodule named '{}' exists", name),
                SrcLoc::caller(),
            )),
        }
    }

    #[track_caller]
    pub fn add_domain(&mut self, domain: ClockDomain) -> BuildResult<()> {
        if self.domains.contains_key(&domain.name) {
            throw!(BuildError::naming(
                format!("Clock domain named '{}' already exists", domain.name),
                SrcLoc::caller()
            ));
        }
        self.domains.insert(domain.name.clone(), domain);
        Ok(())
    }

    /// Check that `construct` is used directly inside of `expected`, or outside of any switch/fsm if `None`.
    pub(super) fn check_context(
        &self,
        construct: &str,
        expected: Option<CtrlKind>,
        src_loc: SrcLoc,
    ) -> BuildResult<()> {
        if self.ctrl.context == expected {
            return Ok(());
        }
        let message = match (self.ctrl.context, expected) {
            (None, Some(expected)) => format!("{} is not permitted outside of {}", construct, expected),
            (Some(current), _) => format!(
                "{} is not permitted directly inside of {}; it is permitted inside of {} {}",
                construct,
                current,
                current,
                current.secondary()
            ),
            (None, None) => unreachable!(),
        };
        Err(BuildError::scoping(message, src_loc))
    }

    /// Record a body with guaranteed cleanup: whether `f` succeeds or fails,
    /// the enclosing statements, depth and context are restored before returning.
    /// Frames opened by a failed body are discarded together with its statements.
    pub(super) fn scope_body(
        &mut self,
        kind: BodyKind,
        f: impl FnOnce(&mut Module) -> BuildResult<()>,
    ) -> BuildResult<DomainStatements> {
        let outer_statements = std::mem::take(&mut self.statements);
        let outer_context = self.ctrl.context.take();
        let outer_depth = self.ctrl.depth;
        let outer_len = self.ctrl.len();
        if let BodyKind::Branch = kind {
            self.ctrl.depth += 1;
        }

        let result = f(self).and_then(|()| self.flush_ctrl());

        if result.is_err() {
            self.ctrl.truncate(outer_len);
        }
        self.ctrl.depth = outer_depth;
        self.ctrl.context = outer_context;
        let body = std::mem::replace(&mut self.statements, outer_statements);

        result.map(|()| body)
    }

    /// Record the body of a `switch` or `fsm`, which may only contain cases or states.
    /// The construct's own frame must be on top of the stack, it is discarded if the body fails.
    pub(super) fn scope_construct(
        &mut self,
        kind: CtrlKind,
        f: impl FnOnce(&mut Module) -> BuildResult<()>,
    ) -> BuildResult<()> {
        let outer_context = self.ctrl.context.replace(kind);
        let construct_len = self.ctrl.len();
        self.ctrl.depth += 1;

        let result = f(self);

        if result.is_err() {
            self.ctrl.truncate(construct_len.saturating_sub(1));
        }
        self.ctrl.depth -= 1;
        self.ctrl.context = outer_context;
        result
    }

    /// Close every frame that belongs to an ended sibling construct.
    pub(super) fn flush_ctrl(&mut self) -> BuildResult<()> {
        while self.ctrl.stale_count() > 0 {
            self.pop_ctrl()?;
        }
        Ok(())
    }

    /// Close all open frames, used once the description is complete.
    pub(super) fn flush_all(&mut self) -> BuildResult<()> {
        while !self.ctrl.is_empty() {
            self.pop_ctrl()?;
        }
        Ok(())
    }

    pub(super) fn set_ctrl(&mut self, frame: CtrlFrame) -> BuildResult<()> {
        self.flush_ctrl()?;
        self.ctrl.push(frame);
        Ok(())
    }

    /// Close the top frame, lowering it into branch statements appended to the current body.
    pub(super) fn pop_ctrl(&mut self) -> BuildResult<()> {
        let Some(frame) = self.ctrl.pop() else {
            return Ok(());
        };
        log::debug!("close {} frame, {} frames remain", frame.kind(), self.ctrl.len());

        let lowered: Vec<(String, Switch)> = match frame {
            CtrlFrame::If(frame) => frame.lower(),
            CtrlFrame::Switch(frame) => frame.lower(),
            CtrlFrame::Fsm(frame) => self.close_fsm(frame)?,
        };
        for (domain, switch) in lowered {
            self.statements.entry(domain).or_default().push(Statement::Switch(switch));
        }
        Ok(())
    }
}
