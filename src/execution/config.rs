//! Execution configuration and its validator.
//!
//! Counts are signed because configurations come from users and negative values
//! must be reported rather than rejected by the type system.

use std::collections::HashSet;
use thiserror::Error;

/// Registers present in every interpreter.
pub const BUILTIN_REGISTERS: [&str; 4] = ["acc", "t", "ra", "rv"];

/// Ways an [`ExecutionConfig`] can be invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("duplicate register names found in config")]
    DuplicateRegisterNames,
    #[error("built-in register name \"{0}\" found in config")]
    BuiltinRegisterName(String),
    #[error("invalid register name \"{0}\"")]
    InvalidRegisterName(String),
    #[error("register \"{0}\" cannot mimic or replace a stack register")]
    MimicsStackRegister(String),
    #[error("register \"{0}\" cannot mimic a pin accessor")]
    MimicsPinAccessor(String),
    #[error("register \"{0}\" cannot mimic or replace a numbered \"r\" register")]
    MimicsBasicRegister(String),
    #[error("pin count found to be negative in config ({0})")]
    NegativePinCount(i32),
    #[error("max stack depth found to be negative in config ({0})")]
    NegativeMaxStackDepth(i32),
    #[error("stack register count found to be negative in config ({0})")]
    NegativeStackRegisterCount(i32),
    #[error("basic register count found to be negative in config ({0})")]
    NegativeBasicRegisterCount(i32),
    #[error("per-instruction step threshold cannot be less than 1 ({0})")]
    InvalidStepsPerInstruction(i32),
}

/// Shape of the machine a program runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// User-named registers, in declaration order.
    pub named_registers: Vec<String>,
    /// Number of `r0..rN-1` registers.
    pub basic_register_count: i32,
    /// Number of `s0..sM-1` registers saved across calls.
    pub stack_register_count: i32,
    pub max_stack_depth: i32,
    pub pin_count: i32,
    /// `step()` calls consumed by each instruction line.
    pub steps_per_instruction: i32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            named_registers: Vec::new(),
            basic_register_count: 0,
            stack_register_count: 0,
            max_stack_depth: 0,
            pin_count: 0,
            steps_per_instruction: 1,
        }
    }
}

/// `^[a-zA-Z]+[0-9]*$`
fn is_valid_register_name(name: &str) -> bool {
    let letters = name.chars().take_while(char::is_ascii_alphabetic).count();
    letters > 0 && name.chars().skip(letters).all(|c| c.is_ascii_digit())
}

fn count(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

impl ExecutionConfig {
    pub fn with_named_registers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.named_registers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_basic_registers(mut self, count: i32) -> Self {
        self.basic_register_count = count;
        self
    }

    pub fn with_stack_registers(mut self, count: i32) -> Self {
        self.stack_register_count = count;
        self
    }

    pub fn with_max_stack_depth(mut self, depth: i32) -> Self {
        self.max_stack_depth = depth;
        self
    }

    pub fn with_pins(mut self, count: i32) -> Self {
        self.pin_count = count;
        self
    }

    pub fn with_steps_per_instruction(mut self, steps: i32) -> Self {
        self.steps_per_instruction = steps;
        self
    }

    /// Checks every rule and returns all violations at once.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        let unique: HashSet<&str> = self.named_registers.iter().map(String::as_str).collect();
        if unique.len() != self.named_registers.len() {
            errors.push(ConfigError::DuplicateRegisterNames);
        }

        for builtin in BUILTIN_REGISTERS {
            if unique.contains(builtin) {
                errors.push(ConfigError::BuiltinRegisterName(builtin.to_string()));
            }
        }

        for name in &self.named_registers {
            if !is_valid_register_name(name) {
                errors.push(ConfigError::InvalidRegisterName(name.clone()));
            }

            let mut chars = name.chars();
            if let (Some(first), Some(second)) = (chars.next(), chars.next())
                && second.is_ascii_digit()
            {
                match first {
                    's' => errors.push(ConfigError::MimicsStackRegister(name.clone())),
                    'p' => errors.push(ConfigError::MimicsPinAccessor(name.clone())),
                    'r' => errors.push(ConfigError::MimicsBasicRegister(name.clone())),
                    _ => {}
                }
            }
        }

        if self.pin_count < 0 {
            errors.push(ConfigError::NegativePinCount(self.pin_count));
        }
        if self.max_stack_depth < 0 {
            errors.push(ConfigError::NegativeMaxStackDepth(self.max_stack_depth));
        }
        if self.stack_register_count < 0 {
            errors.push(ConfigError::NegativeStackRegisterCount(
                self.stack_register_count,
            ));
        }
        if self.basic_register_count < 0 {
            errors.push(ConfigError::NegativeBasicRegisterCount(
                self.basic_register_count,
            ));
        }
        if self.steps_per_instruction < 1 {
            errors.push(ConfigError::InvalidStepsPerInstruction(
                self.steps_per_instruction,
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn basic_registers(&self) -> usize {
        count(self.basic_register_count)
    }

    pub fn stack_registers(&self) -> usize {
        count(self.stack_register_count)
    }

    pub fn stack_depth_limit(&self) -> usize {
        count(self.max_stack_depth)
    }

    pub fn pins(&self) -> usize {
        count(self.pin_count)
    }

    pub fn steps(&self) -> usize {
        count(self.steps_per_instruction).max(1)
    }

    /// Names of the stack registers, `s0..sM-1`.
    pub fn stack_register_names(&self) -> impl Iterator<Item = String> {
        (0..self.stack_registers()).map(|i| format!("s{i}"))
    }

    /// Every register name a program may reference: built-ins, named, `r*` and `s*`.
    pub fn register_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_REGISTERS.iter().map(|s| s.to_string()).collect();
        names.extend(self.named_registers.iter().cloned());
        names.extend((0..self.basic_registers()).map(|i| format!("r{i}")));
        names.extend(self.stack_register_names());
        names
    }
}
