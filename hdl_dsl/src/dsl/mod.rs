//! The procedural builder: nested control constructs recorded through closures
//! and lowered into plain switch statements.

pub mod conditional;
pub mod driver;
pub mod elaborate;
pub mod frame;
pub mod fsm;
pub mod module;
pub mod resolve;
pub mod switch;

pub use fsm::{FsmId, FsmOptions};
pub use module::Module;
pub use switch::CasePattern;
