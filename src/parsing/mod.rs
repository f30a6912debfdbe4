//! Source text to validated token program.
//!
//! The [`lexer`] splits source into lines of typed [`token`]s forming a
//! [`program`]. [`values`] reads typed values out of tokens, [`validators`]
//! check single tokens and [`program_validator`] checks a whole program against
//! an execution configuration and an instruction catalog.

pub mod lexer;
pub mod program;
pub mod program_validator;
pub mod token;
pub mod validators;
pub mod values;
