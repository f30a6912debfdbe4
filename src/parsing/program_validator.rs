//! Whole-program validation.
//!
//! Runs in two passes so that labels may be referenced before they are
//! declared:
//!
//! 1. Every label declaration is recorded, reporting duplicates.
//! 2. Every line is checked: it must be fully lexed and start with an
//!    instruction or a label, instructions must resolve against the catalog,
//!    and each argument token is validated by kind.
//!
//! Nothing short-circuits. One pass reports every problem in the program.

use crate::catalog::{InstructionCatalog, ParameterKinds, ResolveError, format_kinds};
use crate::diagnostics::Diagnostics;
use crate::execution::config::ExecutionConfig;
use crate::parsing::lexer::UNPARSABLE_LINE;
use crate::parsing::program::{Line, Program};
use crate::parsing::validators::{ValidationContext, declare_label, validate_token};
use crate::warn;

/// Validates programs against one configuration and instruction catalog.
pub struct ProgramValidator<'a> {
    config: &'a ExecutionConfig,
    catalog: &'a dyn InstructionCatalog,
}

impl<'a> ProgramValidator<'a> {
    pub fn new(config: &'a ExecutionConfig, catalog: &'a dyn InstructionCatalog) -> Self {
        Self { config, catalog }
    }

    /// Returns every problem found in `program`.
    pub fn validate(&self, program: &Program) -> Diagnostics {
        let mut errors = Diagnostics::new();
        let mut context = ValidationContext::new(self.config.register_names(), self.config.pins());

        for line in program.lines().iter().filter(|l| l.is_label()) {
            declare_label(&line.tokens()[0], &mut context, &mut errors);
        }

        for line in program.lines() {
            self.validate_line(line, &context, &mut errors);
        }

        if !errors.is_ok() {
            warn!("program failed validation with {} diagnostic(s)", errors.len());
        }
        errors
    }

    fn validate_line(&self, line: &Line, context: &ValidationContext, errors: &mut Diagnostics) {
        if let Some(column) = line.unparsed_column() {
            errors.error(UNPARSABLE_LINE, line.index(), column, line.end_column());
            return;
        }
        if line.is_empty() || line.is_comment() {
            return;
        }

        if line.is_label() {
            let trailing = line.arguments();
            if let (Some(first), Some(last)) = (trailing.first(), trailing.last()) {
                errors.warning(
                    "Tokens after a label declaration are ignored",
                    line.index(),
                    first.position().start_column,
                    last.position().end_column,
                );
            }
            for token in &trailing {
                validate_token(token, context, errors);
            }
            return;
        }

        if !line.is_instruction() {
            errors.error(
                "Line must start with an instruction or label",
                line.index(),
                0,
                line.end_column(),
            );
            return;
        }

        self.validate_signature(line, errors);
        for token in line.arguments() {
            validate_token(&token, context, errors);
        }
    }

    fn validate_signature(&self, line: &Line, errors: &mut Diagnostics) {
        let Some(name) = line.instruction_name() else {
            return;
        };
        let kinds: Vec<_> = line.arguments().iter().map(|t| t.kind()).collect();

        let message = match self.catalog.resolve(name, &kinds) {
            Ok(_) => return,
            Err(ResolveError::NoMatchingOverload { name, arguments }) => {
                let valid = self
                    .catalog
                    .overloads_of(&name)
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Could not find valid override for {}. Valid overrides: {valid}",
                    signature(&name, &arguments)
                )
            }
            Err(err) => err.to_string(),
        };
        errors.error(message, line.index(), 0, line.end_column());
    }
}

fn signature(name: &str, arguments: &[ParameterKinds]) -> String {
    if arguments.is_empty() {
        name.to_string()
    } else {
        format!("{name} {}", format_kinds(arguments))
    }
}
