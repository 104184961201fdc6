// Diagnostics are reported through `log`, never printed directly.
#![deny(clippy::print_stdout)]

pub mod diagnostic;
pub mod dsl;
pub mod error;
pub mod hdl;
pub mod settings;
pub mod src_loc;
pub mod util;

#[cfg(test)]
mod tests;
