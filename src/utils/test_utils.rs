//! Test utilities for lexer, validator and interpreter testing.

#[cfg(test)]
pub mod utils {
    use crate::catalog::standard::StandardCatalog;
    use crate::diagnostics::Diagnostics;
    use crate::execution::config::ExecutionConfig;
    use crate::execution::interpreter::Interpreter;
    use crate::parsing::lexer::Lexer;
    use crate::parsing::program::Program;
    use crate::parsing::token::Token;

    /// Four named registers, four basic and four stack registers, a call
    /// depth of five and sixteen pins.
    pub fn generic_config() -> ExecutionConfig {
        ExecutionConfig::default()
            .with_named_registers(["named0", "named1", "named2", "named3"])
            .with_basic_registers(4)
            .with_stack_registers(4)
            .with_max_stack_depth(5)
            .with_pins(16)
    }

    fn lex(lexer: Lexer, source: &str) -> Program {
        let mut errors = Diagnostics::new();
        let program = lexer.tokenize(source, &mut errors);
        assert!(errors.is_ok(), "lexical errors in {source:?}:\n{errors}");
        program
    }

    pub fn tokenize(source: &str) -> Program {
        lex(Lexer::new(), source)
    }

    pub fn tokenize_with_comments(source: &str) -> Program {
        lex(Lexer::new().include_comments(true), source)
    }

    /// Lexes `text` as the sole argument of an instruction line.
    pub fn single_token(text: &str) -> Token {
        let program = tokenize(&format!("nop {text}"));
        program.lines()[0].tokens()[1].clone()
    }

    pub fn interpreter_with(config: ExecutionConfig, source: &str) -> Interpreter {
        match Interpreter::new(config, tokenize(source), &StandardCatalog::new()) {
            Ok(interpreter) => interpreter,
            Err(err) => panic!("cannot build interpreter for {source:?}: {err}"),
        }
    }

    pub fn interpreter_for(source: &str) -> Interpreter {
        interpreter_with(generic_config(), source)
    }

    /// Steps `n` times, failing on the first error.
    pub fn step_n(interpreter: &mut Interpreter, n: usize) {
        for i in 0..n {
            if let Err(err) = interpreter.step() {
                panic!("step {i} failed: {err}");
            }
        }
    }
}
