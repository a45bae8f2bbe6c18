//! External process execution

pub mod subprocess;

pub use subprocess::{Invocation, ProcessToolchain, ToolStatus, Toolchain};
