//! Finite state machines.
//!
//! States are named by strings and receive integer encodings in the order they are first referenced,
//! through [Module::state], [Module::next] or [Module::ongoing]. Transitions can refer to states that
//! are only declared later, so they are recorded as deferred statements and resolved during elaboration.
//! When the state machine closes, the initial state is moved to encoding 0 and all other states keep
//! their relative reference order.

use crate::dsl::frame::{CtrlFrame, CtrlKind, DomainStatements, FsmFrame};
use crate::dsl::module::{BodyKind, Module};
use crate::error::{BuildError, BuildResult};
use crate::hdl::fragment::COMB_DOMAIN;
use crate::hdl::statement::{FsmNext, Pattern, Statement, Switch, SwitchCase};
use crate::hdl::value::{Const, Shape, Signal, Value};
use crate::new_index_type;
use crate::src_loc::SrcLoc;
use crate::throw;
use crate::util::data::IndexMapExt;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use unwrap_match::unwrap_match;

new_index_type!(pub FsmId);

#[derive(Debug, Clone, Default)]
pub struct FsmOptions {
    pub name: Option<String>,
    pub domain: Option<String>,
    /// The initial state, defaults to the first declared state.
    pub init: Option<String>,
}

impl FsmOptions {
    pub fn new() -> Self {
        FsmOptions::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn init(mut self, init: impl Into<String>) -> Self {
        self.init = Some(init.into());
        self
    }
}

#[derive(Debug)]
pub struct FsmInfo {
    pub name: String,
    pub init: Option<String>,
    pub domain: String,
    /// Reference order while open, the final encoding once closed.
    pub encoding: IndexMap<String, u64>,
    pub ongoing: IndexMap<String, Signal>,
    pub states: IndexMap<String, FsmState>,
    /// Only exists once the state machine is closed.
    pub signal: Option<Signal>,
}

#[derive(Debug)]
pub struct FsmState {
    /// Taken during lowering.
    pub body: Option<DomainStatements>,
    pub src_loc: SrcLoc,
}

impl FsmInfo {
    /// Register a reference to `state`, giving it the next encoding and an ongoing indicator if it is new.
    fn reference(&mut self, state: &str) {
        if !self.encoding.contains_key(state) {
            let index = self.encoding.len() as u64;
            self.encoding.insert(state.to_owned(), index);
            let ongoing = Signal::new(format!("{}_ongoing_{}", self.name, state), Shape::unsigned(1));
            self.ongoing.insert(state.to_owned(), ongoing);
        }
    }

    fn is_closed(&self) -> bool {
        self.signal.is_some()
    }
}

impl Module {
    /// Start a state machine. The body may only contain [Module::state].
    #[track_caller]
    pub fn fsm(
        &mut self,
        options: FsmOptions,
        body: impl FnOnce(&mut Module, FsmId) -> BuildResult<()>,
    ) -> BuildResult<FsmId> {
        let src_loc = SrcLoc::caller();
        self.check_context("FSM", None, src_loc)?;

        let FsmOptions { name, domain, init } = options;
        let name = name.unwrap_or_else(|| self.settings.fsm_default_name.clone());
        let domain = domain.unwrap_or_else(|| self.settings.fsm_default_domain.clone());
        if domain == COMB_DOMAIN {
            throw!(BuildError::scoping(
                format!("FSM may not be driven by the '{}' domain", domain),
                src_loc
            ));
        }

        let fsm = self.fsms.push(FsmInfo {
            name: name.clone(),
            init,
            domain,
            encoding: IndexMap::new(),
            ongoing: IndexMap::new(),
            states: IndexMap::new(),
            signal: None,
        });

        self.set_ctrl(CtrlFrame::Fsm(FsmFrame { fsm, src_loc }))?;
        self.scope_construct(CtrlKind::Fsm, |m| body(m, fsm))?;
        self.pop_ctrl()?;
        self.generated.insert(name, fsm);
        Ok(fsm)
    }

    /// Declare a state of the innermost state machine, with the statements active while in that state.
    #[track_caller]
    pub fn state(&mut self, name: impl Into<String>, body: impl FnOnce(&mut Module) -> BuildResult<()>) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        let name = name.into();
        self.check_context("FSM State", Some(CtrlKind::Fsm), src_loc)?;

        let fsm = unwrap_match!(self.ctrl.top(), Some(CtrlFrame::Fsm(frame)) => frame.fsm);
        let info = &mut self.fsms[fsm];
        if info.states.contains_key(&name) {
            throw!(BuildError::naming(
                format!("FSM state '{}' is already defined", name),
                src_loc
            ));
        }
        info.reference(&name);

        let body = self.scope_body(BodyKind::Arm, body)?;

        self.fsms[fsm].states.insert_first(name, FsmState { body: Some(body), src_loc });
        Ok(())
    }

    /// Transition the innermost state machine to `state` on the next clock edge.
    /// Only permitted inside a state body, possibly nested inside other constructs.
    #[track_caller]
    pub fn next(&mut self, state: impl Into<String>) -> BuildResult<()> {
        let src_loc = SrcLoc::caller();
        let state = state.into();

        let fsm = match self.ctrl.context {
            Some(CtrlKind::Fsm) => None,
            _ => self.ctrl.innermost_fsm(),
        };
        let Some(fsm) = fsm else {
            throw!(BuildError::scoping(
                "`next` is only permitted inside an FSM state",
                src_loc
            ));
        };

        let info = &mut self.fsms[fsm];
        info.reference(&state);
        let domain = info.domain.clone();

        let stmt = Statement::FsmNext(FsmNext { fsm, state, src_loc });
        self.push_statements(&domain, vec![stmt], src_loc)
    }

    /// A single-bit signal that is high while `fsm` is in `state`.
    /// Registers `state` as referenced if the state machine is still open.
    #[track_caller]
    pub fn ongoing(&mut self, fsm: FsmId, state: &str) -> BuildResult<Value> {
        let src_loc = SrcLoc::caller();
        let Some(info) = self.fsms.get_mut(fsm) else {
            throw!(BuildError::naming(
                format!("{:?} does not belong to this module", fsm),
                src_loc
            ));
        };

        if !info.ongoing.contains_key(state) {
            if info.is_closed() {
                throw!(BuildError::naming(
                    format!("FSM '{}' has no state '{}'", info.name, state),
                    src_loc
                ));
            }
            info.reference(state);
        }
        Ok(Value::from(&info.ongoing[state]))
    }

    /// The signal holding the current state, only available once the state machine is closed.
    pub fn fsm_state(&self, fsm: FsmId) -> Option<&Signal> {
        self.fsms.get(fsm)?.signal.as_ref()
    }

    /// The encoding of each state. Only final once the state machine is closed.
    pub fn fsm_encoding(&self, fsm: FsmId) -> Option<&IndexMap<String, u64>> {
        self.fsms.get(fsm).map(|info| &info.encoding)
    }

    pub(super) fn close_fsm(&mut self, frame: FsmFrame) -> BuildResult<Vec<(String, Switch)>> {
        let FsmFrame { fsm, src_loc } = frame;
        let info = &mut self.fsms[fsm];

        for state in info.encoding.keys() {
            if !info.states.contains_key(state) {
                throw!(BuildError::naming(
                    format!("FSM state '{}' is referenced but not defined", state),
                    src_loc
                ));
            }
        }

        if let Some(init) = &info.init {
            if !info.states.contains_key(init) {
                throw!(BuildError::naming(
                    format!("FSM initial state '{}' is not defined", init),
                    src_loc
                ));
            }
        }
        let init = match info.init.clone().or_else(|| info.states.keys().next().cloned()) {
            Some(init) => init,
            None => {
                info.signal = Some(Signal::new(format!("{}_state", info.name), Shape::unsigned(0)));
                log::debug!("closed empty FSM {}", info.name);
                return Ok(vec![]);
            }
        };

        // the initial state goes first, everything else keeps its reference order
        let order = std::iter::once(init.clone())
            .chain(info.encoding.keys().filter(|&state| state != &init).cloned())
            .collect_vec();
        info.encoding = order
            .into_iter()
            .enumerate()
            .map(|(index, state)| (state, index as u64))
            .collect();

        let decoder = info
            .encoding
            .iter()
            .map(|(state, encoding)| format!("{}/{}", state, encoding))
            .collect_vec();
        let shape = Shape::for_range(info.encoding.len() as u64);
        let signal = Signal::new_decoded(format!("{}_state", info.name), shape, 0, decoder);
        info.signal = Some(signal.clone());
        log::debug!("closed FSM {} with encoding {:?}", info.name, info.encoding);

        for (state, ongoing) in &info.ongoing {
            let encoding = Const::new(info.encoding[state], shape);
            self.top_comb_statements
                .push(ongoing.assign(Value::from(&signal).equals(encoding)));
        }

        let domains: IndexSet<String> = info
            .states
            .values()
            .flat_map(|state| state.body.iter().flat_map(|body| body.keys().cloned()))
            .collect();
        let mut bodies = info
            .states
            .iter_mut()
            .map(|(name, state)| (info.encoding[name], state.src_loc, state.body.take().unwrap_or_default()))
            .collect_vec();

        let lowered = domains
            .into_iter()
            .map(|domain| {
                let cases = bodies
                    .iter_mut()
                    .map(|(encoding, state_src_loc, body)| SwitchCase {
                        patterns: vec![Pattern::Int((*encoding).into())],
                        body: body.shift_remove(&domain).unwrap_or_default(),
                        src_loc: Some(*state_src_loc),
                    })
                    .collect_vec();
                let switch = Switch {
                    test: Value::from(&signal),
                    cases,
                    src_loc,
                };
                (domain, switch)
            })
            .collect_vec();
        Ok(lowered)
    }
}
