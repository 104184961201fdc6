//! Deterministic textual rendering of values, statements and fragments, used for debugging and tests.

use crate::hdl::fragment::{Fragment, Generated};
use crate::hdl::statement::{Pattern, Statement};
use crate::hdl::value::{Const, Value};
use hdl_util::swrite::swrite_indent;
use hdl_util::{swrite, swriteln};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

impl Display for Const {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let shape = self.shape();
        let sign = if shape.signed { "s" } else { "" };
        write!(f, "(const {}'{}d{})", shape.width, sign, self.value())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Const(c) => write!(f, "{}", c),
            Value::Signal(s) => write!(f, "(sig {})", s.name()),
            Value::Operator(op, operands) => {
                write!(f, "({}", op)?;
                for operand in operands {
                    write!(f, " {}", operand)?;
                }
                write!(f, ")")
            }
            Value::Cat(parts) => {
                write!(f, "(cat")?;
                for part in parts {
                    write!(f, " {}", part)?;
                }
                write!(f, ")")
            }
            Value::Slice { value, start, end } => write!(f, "(slice {} {}:{})", value, start, end),
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Bits(bits) => write!(f, "{}", bits),
            Pattern::Int(value) => write!(f, "{}", value),
        }
    }
}

pub fn render_statements(statements: &[Statement]) -> String {
    let mut result = String::new();
    render_statements_into(&mut result, statements, 0);
    result
}

fn render_statements_into(f: &mut String, statements: &[Statement], depth: usize) {
    for stmt in statements {
        render_statement_into(f, stmt, depth);
    }
}

fn render_statement_into(f: &mut String, stmt: &Statement, depth: usize) {
    swrite_indent(f, depth);
    match stmt {
        Statement::Assign(assign) => swriteln!(f, "(eq {} {})", assign.lhs, assign.rhs),
        Statement::Property(property) => match &property.name {
            None => swriteln!(f, "({} {})", property.kind, property.test),
            Some(name) => swriteln!(f, "({} {} {})", property.kind, name, property.test),
        },
        Statement::FsmNext(next) => swriteln!(f, "(next {})", next.state),
        Statement::Switch(switch) => {
            swriteln!(f, "switch {}", switch.test);
            for case in &switch.cases {
                swrite_indent(f, depth + 1);
                if case.patterns.is_empty() {
                    swriteln!(f, "default");
                } else {
                    swriteln!(f, "case {}", case.patterns.iter().join(" "));
                }
                render_statements_into(f, &case.body, depth + 2);
            }
        }
    }
}

impl Fragment {
    pub fn to_debug_string(&self) -> String {
        let mut result = String::new();
        self.render_into(&mut result, 0);
        result
    }

    fn render_into(&self, f: &mut String, depth: usize) {
        for (domain, statements) in &self.statements {
            swrite_indent(f, depth);
            swriteln!(f, "domain {}", domain);
            render_statements_into(f, statements, depth + 1);
        }
        for (domain, signals) in &self.drivers {
            swrite_indent(f, depth);
            swriteln!(f, "drivers {}: {}", domain, signals.iter().map(|s| s.name()).join(" "));
        }
        for domain in self.domains.values() {
            swrite_indent(f, depth);
            swriteln!(f, "clock domain {} {}", domain.name, domain.clk_edge);
        }
        for (name, generated) in &self.generated {
            swrite_indent(f, depth);
            match generated {
                Generated::Fsm(fsm) => {
                    let encoding = fsm.encoding.iter().map(|(state, enc)| format!("{}={}", state, enc));
                    swriteln!(f, "generated fsm {}: {}", name, encoding.format(" "));
                }
            }
        }
        for sub in &self.subfragments {
            swrite_indent(f, depth);
            match &sub.name {
                None => swrite!(f, "submodule <anonymous>"),
                Some(name) => swrite!(f, "submodule {}", name),
            }
            swriteln!(f);
            sub.fragment.render_into(f, depth + 1);
        }
    }
}
