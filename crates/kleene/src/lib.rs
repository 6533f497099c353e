//! Self-reference without named recursion.
//!
//! [`combinator`] builds recursive closures out of self-application alone.
//! [`machine`] does the same for a small stack machine whose programs can
//! read, quote and evaluate their own descriptions.

pub mod combinator;
pub mod machine;

pub use combinator::{SelfApplicable, bind, fixpoint, self_apply};
pub use machine::{Limits, Machine, MachineError, Program, Value};
