//! The built-in instruction set.
//!
//! The `standard_instructions!` table is the single source of overload
//! definitions. Order matters: the first overload of a name that accepts the
//! arguments is the one executed.

use crate::catalog::instructions::*;
use crate::catalog::{DefinitionTable, InstructionCatalog, InstructionDefinition, ParameterKinds};

const R: ParameterKinds = ParameterKinds::REGISTER;
const RC: ParameterKinds = ParameterKinds::REGISTER_CONSTANT;
const RCL: ParameterKinds = ParameterKinds::REGISTER_CONSTANT_LABEL;
const P: ParameterKinds = ParameterKinds::PIN_ALL;

/// Expands the instruction table into a list of [`InstructionDefinition`]s.
macro_rules! standard_instructions {
    ($( $name:literal ( $($param:ident),* ) => $behavior:ident ),* $(,)?) => {
        fn standard_definitions() -> Vec<InstructionDefinition> {
            vec![
                $( InstructionDefinition::new($name, vec![$($param),*], $behavior), )*
            ]
        }
    };
}

standard_instructions! {
    // ==================== Arithmetic ====================
    // acc = acc op a ; acc = a op b
    "add" (RC) => op_add,
    "add" (RC, RC) => op_add,
    "sub" (RC) => op_sub,
    "sub" (RC, RC) => op_sub,
    "mul" (RC) => op_mul,
    "mul" (RC, RC) => op_mul,
    "div" (RC) => op_div,
    "div" (RC, RC) => op_div,
    "mod" (RC) => op_mod,
    "mod" (RC, RC) => op_mod,
    // ==================== Moves ====================
    "mov" (R, RCL) => op_mov,
    "and" (R, RC) => op_and,
    "or" (R, RC) => op_or,
    "xor" (R, RC) => op_xor,
    "not" (R) => op_not,
    "shl" (R, RC, RC) => op_shl,
    "shr" (R, RC, RC) => op_shr,
    // ==================== Tests ====================
    // t = a op b
    "teq" (RC, RC) => op_teq,
    "tne" (RC, RC) => op_tne,
    "tlt" (RC, RC) => op_tlt,
    "tgt" (RC, RC) => op_tgt,
    // ==================== Control flow ====================
    "jmp" (RCL) => op_jmp,
    "beq" (RCL, RC, RC) => op_beq,
    "bne" (RCL, RC, RC) => op_bne,
    "blt" (RCL, RC, RC) => op_blt,
    "bgt" (RCL, RC, RC) => op_bgt,
    "jsr" (RCL) => op_jsr,
    "ret" () => op_ret,
    "ret" (RC) => op_ret,
    "rtt" () => op_rtt,
    "rtt" (RC) => op_rtt,
    "rtf" () => op_rtf,
    "rtf" (RC) => op_rtf,
    "slp" (RC) => op_slp,
    // ==================== Pins ====================
    "stp" (P, RC) => op_stp,
    "ldp" (R, P) => op_ldp,
    "clp" (P) => op_clp,
}

/// Catalog holding the built-in instruction set.
#[derive(Debug, Clone)]
pub struct StandardCatalog {
    table: DefinitionTable,
}

impl StandardCatalog {
    pub fn new() -> Self {
        Self {
            table: standard_definitions().into_iter().collect(),
        }
    }

    pub fn definitions(&self) -> &[InstructionDefinition] {
        self.table.definitions()
    }
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionCatalog for StandardCatalog {
    fn overloads_of(&self, name: &str) -> Vec<&InstructionDefinition> {
        self.table.overloads_of(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResolveError;
    use crate::parsing::token::TokenKind::*;

    #[test]
    fn every_name_has_a_behavior_lookup() {
        let catalog = StandardCatalog::new();
        for def in catalog.definitions() {
            assert!(behavior_named(&def.name).is_some(), "{}", def.name);
        }
    }

    #[test]
    fn arithmetic_arity() {
        let catalog = StandardCatalog::new();
        assert_eq!(catalog.resolve("add", &[Integer]).unwrap().parameters.len(), 1);
        assert_eq!(
            catalog.resolve("add", &[Register, Hex]).unwrap().parameters.len(),
            2
        );
        assert!(matches!(
            catalog.resolve("add", &[Integer, Integer, Integer]),
            Err(ResolveError::NoMatchingOverload { .. })
        ));
    }

    #[test]
    fn optional_return_value() {
        let catalog = StandardCatalog::new();
        assert!(catalog.resolve("ret", &[]).is_ok());
        assert!(catalog.resolve("ret", &[Register]).is_ok());
        assert!(catalog.resolve("rtf", &[Binary]).is_ok());
        assert_eq!(catalog.overloads_of("rtt").len(), 2);
    }

    #[test]
    fn pin_instructions_accept_any_pin_form() {
        let catalog = StandardCatalog::new();
        for pin in [Pin, PinRange, PinRangeLength] {
            assert!(catalog.resolve("stp", &[pin, Integer]).is_ok());
            assert!(catalog.resolve("ldp", &[Register, pin]).is_ok());
            assert!(catalog.resolve("clp", &[pin]).is_ok());
        }
        assert!(catalog.resolve("ldp", &[Integer, Pin]).is_err());
    }

    #[test]
    fn labels_only_where_declared() {
        let catalog = StandardCatalog::new();
        assert!(catalog.resolve("jmp", &[LabelArg]).is_ok());
        assert!(catalog.resolve("mov", &[Register, LabelArg]).is_ok());
        assert!(catalog.resolve("add", &[LabelArg]).is_err());
        assert!(catalog.resolve("mov", &[Integer, Register]).is_err());
    }

    #[test]
    fn unknown_instruction() {
        let catalog = StandardCatalog::new();
        assert!(!catalog.has_name("nop"));
        assert!(catalog.has_name("shl"));
        assert_eq!(
            catalog.resolve("nop", &[]).unwrap_err(),
            ResolveError::UnknownName("nop".into())
        );
    }
}
