use crate::hdl::fragment::Fragment;
use crate::hdl::print::render_statements;
use crate::hdl::value::{Shape, Signal};

mod switch;

pub fn sig(name: &str, width: u32) -> Signal {
    Signal::new(name, Shape::unsigned(width))
}

#[track_caller]
pub fn render_domain(fragment: &Fragment, domain: &str) -> String {
    match fragment.statements.get(domain) {
        Some(statements) => render_statements(statements),
        None => panic!("domain {:?} has no statements, domains: {:?}", domain, fragment.statements.keys()),
    }
}
