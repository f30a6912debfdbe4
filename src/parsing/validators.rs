//! Per-token validation against a shared [`ValidationContext`].
//!
//! Validators never fail: problems are appended to the caller's [`Diagnostics`].

use crate::diagnostics::Diagnostics;
use crate::parsing::token::{Token, TokenKind};
use crate::parsing::values::{self, ValueError};
use std::collections::HashSet;

/// State shared by all token validators during one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub registers: HashSet<String>,
    pub labels: HashSet<String>,
    pub pin_count: usize,
}

impl ValidationContext {
    pub fn new(registers: impl IntoIterator<Item = String>, pin_count: usize) -> Self {
        Self {
            registers: registers.into_iter().collect(),
            labels: HashSet::new(),
            pin_count,
        }
    }
}

fn report(errors: &mut Diagnostics, token: &Token, message: impl Into<String>) {
    let pos = token.position();
    errors.error(message, pos.line, pos.start_column, pos.end_column);
}

fn report_value_error(errors: &mut Diagnostics, token: &Token, err: ValueError) {
    report(errors, token, err.to_string());
}

/// Records a label declaration, rejecting duplicates.
pub fn declare_label(token: &Token, context: &mut ValidationContext, errors: &mut Diagnostics) {
    let name = match values::name(token) {
        Ok(name) => name,
        Err(err) => return report_value_error(errors, token, err),
    };
    if !context.labels.insert(name.to_string()) {
        report(errors, token, format!("label \"{name}\" already exists"));
    }
}

fn validate_register(token: &Token, context: &ValidationContext, errors: &mut Diagnostics) {
    match values::name(token) {
        Ok(name) if !context.registers.contains(name) => {
            report(errors, token, format!("Unknown register {name}"));
        }
        Ok(_) => {}
        Err(err) => report_value_error(errors, token, err),
    }
}

fn validate_label_argument(token: &Token, context: &ValidationContext, errors: &mut Diagnostics) {
    match values::name(token) {
        Ok(name) if !context.labels.contains(name) => {
            report(errors, token, format!("label \"{name}\" could not be found"));
        }
        Ok(_) => {}
        Err(err) => report_value_error(errors, token, err),
    }
}

fn validate_single_pin(token: &Token, context: &ValidationContext, errors: &mut Diagnostics) {
    match values::pin_index(token) {
        Ok(index) if index >= context.pin_count => report(
            errors,
            token,
            format!("Pin exceeds allowed range (max {})", context.pin_count),
        ),
        Ok(_) => {}
        Err(err) => report_value_error(errors, token, err),
    }
}

fn validate_multi_pin(token: &Token, context: &ValidationContext, errors: &mut Diagnostics) {
    match values::pin_range(token) {
        Ok(range) => {
            if range.end < range.start {
                report(
                    errors,
                    token,
                    "Pin range end index cannot come before start index",
                );
            }
            if range.end >= context.pin_count {
                report(
                    errors,
                    token,
                    format!(
                        "Pin range ends outside of allowed range (max {})",
                        context.pin_count
                    ),
                );
            }
        }
        Err(err) => report_value_error(errors, token, err),
    }
}

fn validate_constant(token: &Token, errors: &mut Diagnostics) {
    match values::constant(token) {
        Ok(_) => {}
        Err(ValueError::Overflow { .. }) => report(
            errors,
            token,
            format!(
                "Value is higher than maximum ({})",
                values::constant_max_text(token.kind())
            ),
        ),
        Err(err) => report_value_error(errors, token, err),
    }
}

/// Validates one token by kind.
///
/// Label declarations, instruction names, whitespace and comments are accepted
/// as-is here. Labels are checked by [`declare_label`] during the pre-scan.
pub fn validate_token(token: &Token, context: &ValidationContext, errors: &mut Diagnostics) {
    match token.kind() {
        TokenKind::Register => validate_register(token, context, errors),
        TokenKind::LabelArg => validate_label_argument(token, context, errors),
        TokenKind::Pin => validate_single_pin(token, context, errors),
        TokenKind::PinRange | TokenKind::PinRangeLength => {
            validate_multi_pin(token, context, errors)
        }
        TokenKind::Binary | TokenKind::Hex | TokenKind::Integer => {
            validate_constant(token, errors)
        }
        TokenKind::Label | TokenKind::Instruction | TokenKind::Whitespace | TokenKind::Comment => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::utils::single_token;

    fn context() -> ValidationContext {
        let mut ctx = ValidationContext::new(
            ["acc", "t", "r0", "named"].into_iter().map(String::from),
            16,
        );
        ctx.labels.insert("known".to_string());
        ctx
    }

    fn messages(text: &str) -> Vec<String> {
        let mut errors = Diagnostics::new();
        validate_token(&single_token(text), &context(), &mut errors);
        errors.iter().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn registers() {
        assert!(messages("$acc").is_empty());
        assert!(messages("$named").is_empty());
        assert_eq!(messages("$r1"), vec!["Unknown register r1"]);
    }

    #[test]
    fn label_arguments() {
        assert!(messages("known").is_empty());
        assert_eq!(messages("unknown"), vec!["label \"unknown\" could not be found"]);
    }

    #[test]
    fn single_pins() {
        assert!(messages(".p15").is_empty());
        assert_eq!(messages(".p16"), vec!["Pin exceeds allowed range (max 16)"]);
        assert_eq!(messages(".p99999999999999999999999").len(), 1);
    }

    #[test]
    fn pin_ranges() {
        assert!(messages(".p0..p15").is_empty());
        assert!(messages(".p8:8").is_empty());
        assert_eq!(
            messages(".p9:8"),
            vec!["Pin range ends outside of allowed range (max 16)"]
        );
        assert_eq!(
            messages(".p5..p2"),
            vec!["Pin range end index cannot come before start index"]
        );
        assert_eq!(messages(".p20..p18").len(), 2);
    }

    #[test]
    fn constants() {
        assert!(messages("65535").is_empty());
        assert_eq!(messages("65536"), vec!["Value is higher than maximum (65535)"]);
        assert_eq!(messages("0x1FFFF"), vec!["Value is higher than maximum (FFFF)"]);
        assert_eq!(
            messages("0b11111111111111111"),
            vec!["Value is higher than maximum (1111111111111111)"]
        );
    }

    #[test]
    fn duplicate_label_declaration() {
        let mut errors = Diagnostics::new();
        let mut ctx = ValidationContext::default();
        let mut program_errors = Diagnostics::new();
        let program = crate::parsing::lexer::Lexer::new().tokenize(":ab\n:ab", &mut program_errors);

        declare_label(&program.lines()[0].tokens()[0], &mut ctx, &mut errors);
        assert!(errors.is_empty());
        declare_label(&program.lines()[1].tokens()[0], &mut ctx, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().message, "label \"ab\" already exists");
        assert_eq!(errors.iter().next().unwrap().line, 1);
    }

    #[test]
    fn error_span_matches_token() {
        let mut errors = Diagnostics::new();
        let token = single_token("$zz");
        validate_token(&token, &context(), &mut errors);
        let d = errors.iter().next().unwrap();
        let pos = token.position();
        assert_eq!((d.start_column, d.end_column), (pos.start_column, pos.end_column));
    }
}
