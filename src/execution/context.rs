//! Boundary between the interpreter and instruction behaviors.

use crate::execution::errors::VMError;
use crate::parsing::token::{Token, TokenKind};
use crate::parsing::values::{self, PinRange};

/// Everything an instruction behavior may observe or change while it runs.
///
/// Line addresses are 1-based line numbers: passing an address to
/// [`jump`](Self::jump) resumes at the first instruction after that line.
pub trait ExecutionContext {
    /// 0-based index of the line being executed.
    fn current_line_index(&self) -> usize;

    /// Saves the stack registers, zeroes them and records a return address.
    fn push_frame(&mut self) -> Result<(), VMError>;

    /// Restores the stack registers of the most recent frame and returns its
    /// return address.
    fn pop_frame(&mut self) -> Result<usize, VMError>;

    /// Continues execution after 1-based line `line_number`.
    fn jump(&mut self, line_number: usize);

    /// Continues execution after the declaration of `label`. An unknown label
    /// terminates the program.
    fn jump_to_label(&mut self, label: &str);

    /// Idles for `steps` extra steps before the next instruction.
    fn sleep(&mut self, steps: usize);

    /// Address of `label`, usable with [`jump`](Self::jump).
    fn label_address(&self, label: &str) -> Option<usize>;

    fn register(&self, name: &str) -> Result<u16, VMError>;

    fn set_register(&mut self, name: &str, value: u16) -> Result<(), VMError>;

    /// Writes `bits` to the output pins of `range`, in index order.
    fn set_pins(&mut self, range: PinRange, bits: &[bool]) -> Result<(), VMError>;

    /// Observed values of the pins of `range`, in index order.
    fn pins(&self, range: PinRange) -> Result<Vec<bool>, VMError>;

    /// Evaluates a register, constant or label argument to a 16-bit value.
    fn value_of(&self, token: &Token) -> Result<u16, VMError> {
        match token.kind() {
            TokenKind::Register => self.register(values::name(token)?),
            TokenKind::Binary | TokenKind::Hex | TokenKind::Integer => {
                Ok(values::constant(token)?)
            }
            TokenKind::LabelArg => {
                let label = values::name(token)?;
                let address = self
                    .label_address(label)
                    .ok_or_else(|| VMError::UnknownLabel(label.to_string()))?;
                u16::try_from(address).map_err(|_| VMError::AddressOutOfRange { address })
            }
            kind => Err(VMError::InvalidArgumentKind {
                instruction: "value",
                kind,
            }),
        }
    }
}
