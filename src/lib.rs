//! Register-and-pin assembly toolkit.
//!
//! Tokenizes line-oriented assembly source, validates it against an execution
//! configuration and an instruction catalog, and executes it one instruction
//! per [`step`](execution::interpreter::Interpreter::step).
//!
//! # Pipeline
//!
//! 1. [`execution::config::ExecutionConfig`] is built and validated.
//! 2. [`parsing::lexer::Lexer`] turns source text into a [`parsing::program::Program`].
//! 3. [`parsing::program_validator::ProgramValidator`] checks the program against the
//!    configuration and a [`catalog::InstructionCatalog`].
//! 4. [`execution::interpreter::Interpreter`] is constructed from the validated pieces
//!    and stepped by the host.
//!
//! # Example
//!
//! ```
//! use pinasm::catalog::standard::StandardCatalog;
//! use pinasm::diagnostics::Diagnostics;
//! use pinasm::execution::config::ExecutionConfig;
//! use pinasm::execution::interpreter::Interpreter;
//! use pinasm::parsing::lexer::Lexer;
//!
//! let mut errors = Diagnostics::new();
//! let program = Lexer::new().tokenize("add 3\nsub 2", &mut errors);
//! assert!(errors.is_ok());
//!
//! let config = ExecutionConfig::default().with_basic_registers(4);
//! let mut interpreter = Interpreter::new(config, program, &StandardCatalog::new()).unwrap();
//!
//! interpreter.step().unwrap();
//! interpreter.step().unwrap();
//! assert_eq!(interpreter.register("acc"), Some(1));
//! assert!(interpreter.is_terminated());
//! ```

pub mod catalog;
pub mod diagnostics;
pub mod execution;
pub mod parsing;
pub mod utils;
