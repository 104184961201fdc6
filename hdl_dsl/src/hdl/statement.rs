use crate::dsl::fsm::FsmId;
use crate::hdl::value::{Signal, Value};
use crate::src_loc::SrcLoc;
use indexmap::IndexSet;
use num_bigint::BigInt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    Assign(Assign),
    Property(Property),
    Switch(Switch),
    /// A transition of a state machine whose state encoding is not yet known.
    /// Only exists while the builder is running, elaboration replaces it with an [Assign].
    FsmNext(FsmNext),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Assign {
    pub lhs: Value,
    pub rhs: Value,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum PropertyKind {
    #[strum(serialize = "assert")]
    Assert,
    #[strum(serialize = "assume")]
    Assume,
    #[strum(serialize = "cover")]
    Cover,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Property {
    pub kind: PropertyKind,
    pub test: Value,
    pub name: Option<String>,
}

/// Multi-way branch: the first case with a matching pattern is taken.
/// A case without any patterns always matches.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Switch {
    pub test: Value,
    pub cases: Vec<SwitchCase>,
    pub src_loc: SrcLoc,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SwitchCase {
    pub patterns: Vec<Pattern>,
    pub body: Vec<Statement>,
    pub src_loc: Option<SrcLoc>,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Pattern {
    /// Bits from most to least significant, each `0`, `1` or `-` for don't care.
    Bits(String),
    Int(BigInt),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FsmNext {
    pub fsm: FsmId,
    pub state: String,
    pub src_loc: SrcLoc,
}

impl Statement {
    pub fn property(kind: PropertyKind, test: impl Into<Value>, name: Option<String>) -> Statement {
        Statement::Property(Property {
            kind,
            test: test.into(),
            name,
        })
    }

    pub fn assert(test: impl Into<Value>) -> Statement {
        Statement::property(PropertyKind::Assert, test, None)
    }

    pub fn assume(test: impl Into<Value>) -> Statement {
        Statement::property(PropertyKind::Assume, test, None)
    }

    pub fn cover(test: impl Into<Value>) -> Statement {
        Statement::property(PropertyKind::Cover, test, None)
    }

    /// The signals written by this statement, in first-write order.
    /// Unresolved transitions do not count, their target signal does not exist yet.
    pub fn lhs_signals(&self) -> IndexSet<Signal> {
        let mut result = IndexSet::new();
        self.collect_lhs_signals(&mut result);
        result
    }

    fn collect_lhs_signals(&self, result: &mut IndexSet<Signal>) {
        match self {
            Statement::Assign(assign) => result.extend(assign.lhs.lhs_signals()),
            Statement::Switch(switch) => {
                for case in &switch.cases {
                    for stmt in &case.body {
                        stmt.collect_lhs_signals(result);
                    }
                }
            }
            Statement::Property(_) | Statement::FsmNext(_) => {}
        }
    }
}

pub fn statements_lhs_signals(statements: &[Statement]) -> IndexSet<Signal> {
    let mut result = IndexSet::new();
    for stmt in statements {
        stmt.collect_lhs_signals(&mut result);
    }
    result
}

impl Switch {
    /// The body of the first case that always matches, if any.
    pub fn default_body(&self) -> Option<&[Statement]> {
        self.cases
            .iter()
            .find(|case| case.patterns.is_empty())
            .map(|case| case.body.as_slice())
    }
}

/// Anything that can be appended to a domain as a list of statements.
pub trait IntoStatements {
    fn into_statements(self) -> Vec<Statement>;
}

impl IntoStatements for Statement {
    fn into_statements(self) -> Vec<Statement> {
        vec![self]
    }
}

impl IntoStatements for Vec<Statement> {
    fn into_statements(self) -> Vec<Statement> {
        self
    }
}

impl<const N: usize> IntoStatements for [Statement; N] {
    fn into_statements(self) -> Vec<Statement> {
        self.into()
    }
}

impl IntoStatements for Option<Statement> {
    fn into_statements(self) -> Vec<Statement> {
        self.into_iter().collect()
    }
}
