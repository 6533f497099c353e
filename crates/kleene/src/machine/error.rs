use super::diagnostics::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MachineError {
    #[error("stack underflow in `{word}`: needs {needed} values, found {available}")]
    StackUnderflow {
        word: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("type mismatch in `{word}`: expected {expected}, found {found}")]
    TypeMismatch {
        word: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("integer overflow in `{word}`")]
    Overflow { word: &'static str },

    #[error("out of fuel after {limit} steps")]
    OutOfFuel { limit: u64 },

    #[error("eval nested deeper than {limit} levels")]
    DepthExceeded { limit: usize },

    #[error("invalid description: {}", summary(.errors))]
    InvalidDescription { errors: Vec<Diagnostic> },
}

fn summary(errors: &[Diagnostic]) -> String {
    errors
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
