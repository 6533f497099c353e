//! A stack machine that can read its own description.
//!
//! Programs have a canonical text form (their *description*). Because a
//! description is an ordinary text value, a program can quote it, glue it
//! together with other descriptions and `eval` the result. That is enough
//! to build a program which obtains its own description, see [`construct`].

pub mod construct;
pub mod diagnostics;
mod error;
pub mod interpreter;
pub mod parser;
pub mod program;
pub mod value;

pub use diagnostics::Diagnostic;
pub use error::MachineError;
pub use interpreter::{Limits, Machine};
pub use parser::parse;
pub use program::{Instruction, Program, Word};
pub use value::Value;
