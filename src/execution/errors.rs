use crate::diagnostics::Diagnostics;
use crate::execution::config::ConfigError;
use crate::parsing::token::TokenKind;
use crate::parsing::values::ValueError;
use thiserror::Error;

/// Errors raised while executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    /// A call would exceed the configured maximum stack depth.
    #[error("stack overflow: maximum depth of {max_depth} reached")]
    StackOverflow { max_depth: usize },
    /// Return executed with an empty call stack.
    #[error("stack underflow: return without matching call")]
    StackUnderflow,
    /// Register name not present in the register bank.
    #[error("register {0} does not exist")]
    UnknownRegister(String),
    /// Label argument that does not resolve to a line.
    #[error("label \"{0}\" could not be found")]
    UnknownLabel(String),
    /// Token kind that the operation cannot consume.
    #[error("instruction {instruction} cannot take a {kind} argument")]
    InvalidArgumentKind {
        instruction: &'static str,
        kind: TokenKind,
    },
    /// Fewer argument tokens than the resolved overload declares.
    #[error("instruction {instruction} is missing argument {index}")]
    MissingArgument {
        instruction: &'static str,
        index: usize,
    },
    /// Value extraction failed on a token that passed validation.
    #[error(transparent)]
    Value(#[from] ValueError),
    /// Line address too large to hold in a 16-bit register.
    #[error("line address {address} does not fit in a register")]
    AddressOutOfRange { address: usize },
    /// Line has no resolved instruction behavior.
    #[error("line {line} has no executable instruction")]
    NoDispatch { line: usize },
    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Pin index outside `[0, pin_count)`.
    #[error("pin {index} is out of range (pin count {count})")]
    PinOutOfRange { index: usize, count: usize },
    /// Bulk pin write whose length differs from the pin count.
    #[error("expected {expected} pin values, got {actual}")]
    PinCountMismatch { expected: usize, actual: usize },
    /// Step requested on an interpreter that already recorded errors.
    #[error("interpreter has outstanding errors")]
    Faulted,
}

impl VMError {
    /// Fatal errors stop execution. Non-fatal ones are recorded and execution continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            VMError::DivisionByZero
                | VMError::PinOutOfRange { .. }
                | VMError::PinCountMismatch { .. }
        )
    }
}

/// Reasons an [`Interpreter`](crate::execution::interpreter::Interpreter) cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpreterError {
    #[error("invalid execution config: {}", join(.0))]
    InvalidConfig(Vec<ConfigError>),
    #[error("program failed validation:\n{0}")]
    InvalidProgram(Diagnostics),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatality() {
        assert!(VMError::StackOverflow { max_depth: 1 }.is_fatal());
        assert!(VMError::StackUnderflow.is_fatal());
        assert!(VMError::UnknownRegister("x".into()).is_fatal());
        assert!(VMError::AddressOutOfRange { address: 70_000 }.is_fatal());
        assert!(!VMError::DivisionByZero.is_fatal());
        assert!(!VMError::PinOutOfRange { index: 9, count: 8 }.is_fatal());
    }

    #[test]
    fn config_errors_are_joined() {
        let err = InterpreterError::InvalidConfig(vec![
            ConfigError::NegativePinCount(-1),
            ConfigError::InvalidStepsPerInstruction(0),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("invalid execution config: "));
        assert!(text.contains("; "));
    }
}
