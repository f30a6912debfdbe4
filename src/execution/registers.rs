use crate::execution::config::ExecutionConfig;
use crate::execution::errors::VMError;
use std::collections::HashMap;

/// Named 16-bit register bank.
///
/// The set of names is fixed at construction; every register starts at 0.
#[derive(Debug, Clone)]
pub(crate) struct Registers {
    values: HashMap<String, u16>,
}

impl Registers {
    pub(crate) fn new(config: &ExecutionConfig) -> Self {
        Self {
            values: config
                .register_names()
                .into_iter()
                .map(|name| (name, 0))
                .collect(),
        }
    }

    /// Returns the value of register `name`.
    ///
    /// Returns [`VMError::UnknownRegister`] if no such register exists.
    pub(crate) fn get(&self, name: &str) -> Result<u16, VMError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| VMError::UnknownRegister(name.to_string()))
    }

    pub(crate) fn set(&mut self, name: &str, value: u16) -> Result<(), VMError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VMError::UnknownRegister(name.to_string())),
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// All registers sorted by name.
    pub(crate) fn snapshot(&self) -> Vec<(String, u16)> {
        let mut all: Vec<(String, u16)> =
            self.values.iter().map(|(k, v)| (k.clone(), *v)).collect();
        all.sort();
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Registers {
        Registers::new(
            &ExecutionConfig::default()
                .with_named_registers(["named"])
                .with_basic_registers(2)
                .with_stack_registers(1),
        )
    }

    #[test]
    fn all_registers_start_at_zero() {
        let regs = bank();
        for name in ["acc", "t", "ra", "rv", "named", "r0", "r1", "s0"] {
            assert_eq!(regs.get(name), Ok(0), "{name}");
        }
        assert_eq!(regs.snapshot().len(), 8);
    }

    #[test]
    fn set_then_get() {
        let mut regs = bank();
        regs.set("r1", 0xBEEF).unwrap();
        assert_eq!(regs.get("r1"), Ok(0xBEEF));
    }

    #[test]
    fn unknown_register() {
        let mut regs = bank();
        assert_eq!(regs.get("r2"), Err(VMError::UnknownRegister("r2".into())));
        assert_eq!(
            regs.set("s1", 1),
            Err(VMError::UnknownRegister("s1".into()))
        );
        assert!(!regs.contains("s1"));
    }

    #[test]
    fn snapshot_is_sorted() {
        let regs = bank();
        let names: Vec<String> = regs.snapshot().into_iter().map(|(n, _)| n).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
