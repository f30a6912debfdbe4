//! Stepping execution engine.
//!
//! An [`Interpreter`](interpreter::Interpreter) owns all machine state
//! (registers, pins, call stack and flow position) and executes one instruction
//! line per [`step`](interpreter::Interpreter::step). Instruction behaviors only
//! see the machine through [`ExecutionContext`](context::ExecutionContext).

pub mod config;
pub mod context;
pub mod errors;
mod flow;
pub mod interpreter;
pub mod pins;
mod registers;
mod stack;
