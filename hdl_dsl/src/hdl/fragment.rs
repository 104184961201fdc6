use crate::diagnostic::Diagnostic;
use crate::error::{BuildError, BuildErrorKind, BuildResult};
use crate::hdl::statement::Statement;
use crate::hdl::value::Signal;
use crate::src_loc::SrcLoc;
use indexmap::{IndexMap, IndexSet};

/// The name of the combinational domain, which has no clock.
pub const COMB_DOMAIN: &str = "comb";

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum ClockEdge {
    #[strum(serialize = "pos")]
    Pos,
    #[strum(serialize = "neg")]
    Neg,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ClockDomain {
    pub name: String,
    pub clk_edge: ClockEdge,
    pub local: bool,
    pub async_reset: bool,
    pub reset_less: bool,
}

impl ClockDomain {
    #[track_caller]
    pub fn new(name: impl Into<String>) -> BuildResult<ClockDomain> {
        let name = name.into();
        if name == COMB_DOMAIN {
            return Err(BuildError::new(
                BuildErrorKind::Naming,
                format!("Domain '{}' may not be clocked", COMB_DOMAIN),
                SrcLoc::caller(),
            ));
        }
        Ok(ClockDomain {
            name,
            clk_edge: ClockEdge::Pos,
            local: false,
            async_reset: false,
            reset_less: false,
        })
    }
}

/// Target description passed through elaboration, opaque to the builder.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Platform {
    pub name: String,
}

/// Something that can be turned into a [Fragment].
pub trait Elaboratable {
    fn elaborate(self: Box<Self>, platform: Option<&Platform>) -> BuildResult<Fragment>;
}

/// A state machine as it was finally encoded, for external introspection.
#[derive(Debug, Clone)]
pub struct GeneratedFsm {
    pub name: String,
    pub state: Signal,
    pub encoding: IndexMap<String, u64>,
}

#[derive(Debug, Clone)]
pub enum Generated {
    Fsm(GeneratedFsm),
}

#[derive(Debug)]
pub struct Subfragment {
    pub fragment: Fragment,
    pub name: Option<String>,
    pub src_loc: SrcLoc,
}

/// The declarative result of elaborating a module.
#[derive(Debug)]
pub struct Fragment {
    pub src_loc: SrcLoc,
    pub subfragments: Vec<Subfragment>,
    pub statements: IndexMap<String, Vec<Statement>>,
    pub drivers: IndexMap<String, IndexSet<Signal>>,
    pub domains: IndexMap<String, ClockDomain>,
    pub generated: IndexMap<String, Generated>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Fragment {
    pub fn new(src_loc: SrcLoc) -> Fragment {
        Fragment {
            src_loc,
            subfragments: vec![],
            statements: IndexMap::new(),
            drivers: IndexMap::new(),
            domains: IndexMap::new(),
            generated: IndexMap::new(),
            diagnostics: vec![],
        }
    }

    pub fn add_subfragment(&mut self, fragment: Fragment, name: Option<String>, src_loc: SrcLoc) {
        self.subfragments.push(Subfragment { fragment, name, src_loc });
    }

    pub fn add_statements(&mut self, domain: &str, statements: Vec<Statement>) {
        self.statements.entry(domain.to_owned()).or_default().extend(statements);
    }

    pub fn add_driver(&mut self, signal: Signal, domain: &str) {
        self.drivers.entry(domain.to_owned()).or_default().insert(signal);
    }

    pub fn add_domains(&mut self, domains: impl IntoIterator<Item = ClockDomain>) {
        for domain in domains {
            self.domains.insert(domain.name.clone(), domain);
        }
    }

    /// The domain that drives `signal` in this fragment, not looking into subfragments.
    pub fn driver_domain(&self, signal: &Signal) -> Option<&str> {
        self.drivers
            .iter()
            .find(|(_, signals)| signals.contains(signal))
            .map(|(domain, _)| domain.as_str())
    }

    pub fn subfragment(&self, name: &str) -> Option<&Fragment> {
        self.subfragments
            .iter()
            .find(|sub| sub.name.as_deref() == Some(name))
            .map(|sub| &sub.fragment)
    }

    pub fn generated_fsm(&self, name: &str) -> Option<&GeneratedFsm> {
        match self.generated.get(name)? {
            Generated::Fsm(fsm) => Some(fsm),
        }
    }
}
