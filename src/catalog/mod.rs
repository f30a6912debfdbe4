//! Instruction catalog and signature resolution.
//!
//! An instruction name may have several overloads. Each overload declares one
//! [`ParameterKinds`] mask per argument position. Resolution maps the argument
//! token kinds to parameter kinds and picks the **first** overload, in
//! declaration order, with the same arity whose masks intersect every argument.
//!
//! See [`standard`] for the built-in instruction set.

pub mod instructions;
pub mod standard;

use crate::execution::context::ExecutionContext;
use crate::execution::errors::VMError;
use crate::parsing::token::{Token, TokenKind};
use std::fmt;
use std::ops::BitOr;
use thiserror::Error;

/// Executes one instruction given its argument tokens.
pub type Behavior = fn(&mut dyn ExecutionContext, &[Token]) -> Result<(), VMError>;

/// Set of parameter categories accepted at one argument position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParameterKinds(u8);

impl ParameterKinds {
    pub const NONE: Self = Self(0);
    pub const REGISTER: Self = Self(1 << 0);
    pub const LABEL: Self = Self(1 << 1);
    pub const CONSTANT: Self = Self(1 << 2);
    pub const PIN_SINGLE: Self = Self(1 << 3);
    pub const PIN_MULTIPLE: Self = Self(1 << 4);

    pub const REGISTER_CONSTANT: Self = Self::REGISTER.union(Self::CONSTANT);
    pub const REGISTER_CONSTANT_LABEL: Self = Self::REGISTER_CONSTANT.union(Self::LABEL);
    pub const PIN_ALL: Self = Self::PIN_SINGLE.union(Self::PIN_MULTIPLE);

    const NAMES: [(Self, &'static str); 5] = [
        (Self::REGISTER, "REGISTER"),
        (Self::LABEL, "LABEL"),
        (Self::CONSTANT, "CONSTANT"),
        (Self::PIN_SINGLE, "PIN_SINGLE"),
        (Self::PIN_MULTIPLE, "PIN_MULTIPLE"),
    ];

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Category of an argument token.
    ///
    /// Instruction names, labels, whitespace and comments are never arguments.
    pub fn of_token(kind: TokenKind) -> Result<Self, ResolveError> {
        match kind {
            TokenKind::Register => Ok(Self::REGISTER),
            TokenKind::LabelArg => Ok(Self::LABEL),
            TokenKind::PinRange | TokenKind::PinRangeLength => Ok(Self::PIN_MULTIPLE),
            TokenKind::Pin => Ok(Self::PIN_SINGLE),
            TokenKind::Binary | TokenKind::Hex | TokenKind::Integer => Ok(Self::CONSTANT),
            other => Err(ResolveError::InvalidArgumentKind(other)),
        }
    }
}

impl BitOr for ParameterKinds {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for ParameterKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(kind, _)| self.contains(*kind))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

impl fmt::Debug for ParameterKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParameterKinds({self})")
    }
}

/// Formats kinds as a space-separated list.
pub fn format_kinds(kinds: &[ParameterKinds]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One overload of an instruction.
#[derive(Clone)]
pub struct InstructionDefinition {
    pub name: String,
    pub parameters: Vec<ParameterKinds>,
    pub behavior: Behavior,
}

impl InstructionDefinition {
    pub fn new(name: impl Into<String>, parameters: Vec<ParameterKinds>, behavior: Behavior) -> Self {
        Self {
            name: name.into(),
            parameters,
            behavior,
        }
    }

    /// Same arity and every position intersecting.
    pub fn accepts(&self, arguments: &[ParameterKinds]) -> bool {
        self.parameters.len() == arguments.len()
            && self
                .parameters
                .iter()
                .zip(arguments)
                .all(|(declared, given)| declared.intersects(*given))
    }
}

impl fmt::Debug for InstructionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionDefinition")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for InstructionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parameters.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.name, format_kinds(&self.parameters))
        }
    }
}

/// Why a name and argument list did not resolve to an overload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Cannot find instruction with name \"{0}\"")]
    UnknownName(String),
    #[error("no overload of {name} accepts {}", format_kinds(.arguments))]
    NoMatchingOverload {
        name: String,
        arguments: Vec<ParameterKinds>,
    },
    #[error("a {0} token cannot be an instruction argument")]
    InvalidArgumentKind(TokenKind),
}

/// Source of instruction definitions.
pub trait InstructionCatalog {
    /// Every overload declared for `name`, in declaration order.
    fn overloads_of(&self, name: &str) -> Vec<&InstructionDefinition>;

    fn has_name(&self, name: &str) -> bool {
        !self.overloads_of(name).is_empty()
    }

    /// Picks the first overload of `name` accepting `arguments`.
    fn resolve(
        &self,
        name: &str,
        arguments: &[TokenKind],
    ) -> Result<&InstructionDefinition, ResolveError> {
        let kinds = arguments
            .iter()
            .map(|k| ParameterKinds::of_token(*k))
            .collect::<Result<Vec<_>, _>>()?;

        let overloads = self.overloads_of(name);
        if overloads.is_empty() {
            return Err(ResolveError::UnknownName(name.to_string()));
        }
        overloads
            .into_iter()
            .find(|def| def.accepts(&kinds))
            .ok_or_else(|| ResolveError::NoMatchingOverload {
                name: name.to_string(),
                arguments: kinds,
            })
    }
}

/// Catalog backed by an ordered list of definitions.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    definitions: Vec<InstructionDefinition>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an overload. Earlier overloads take precedence.
    pub fn define(
        mut self,
        name: impl Into<String>,
        parameters: Vec<ParameterKinds>,
        behavior: Behavior,
    ) -> Self {
        self.definitions
            .push(InstructionDefinition::new(name, parameters, behavior));
        self
    }

    pub fn definitions(&self) -> &[InstructionDefinition] {
        &self.definitions
    }
}

impl FromIterator<InstructionDefinition> for DefinitionTable {
    fn from_iter<I: IntoIterator<Item = InstructionDefinition>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().collect(),
        }
    }
}

impl InstructionCatalog for DefinitionTable {
    fn overloads_of(&self, name: &str) -> Vec<&InstructionDefinition> {
        self.definitions.iter().filter(|d| d.name == name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut dyn ExecutionContext, _: &[Token]) -> Result<(), VMError> {
        Ok(())
    }

    fn other(_: &mut dyn ExecutionContext, _: &[Token]) -> Result<(), VMError> {
        Err(VMError::DivisionByZero)
    }

    #[test]
    fn kinds_display() {
        assert_eq!(ParameterKinds::REGISTER.to_string(), "REGISTER");
        assert_eq!(
            ParameterKinds::REGISTER_CONSTANT_LABEL.to_string(),
            "REGISTER|LABEL|CONSTANT"
        );
        assert_eq!(ParameterKinds::NONE.to_string(), "NONE");
        assert_eq!(
            ParameterKinds::PIN_SINGLE | ParameterKinds::PIN_MULTIPLE,
            ParameterKinds::PIN_ALL
        );
    }

    #[test]
    fn token_categories() {
        use TokenKind::*;
        assert_eq!(ParameterKinds::of_token(Register), Ok(ParameterKinds::REGISTER));
        assert_eq!(ParameterKinds::of_token(LabelArg), Ok(ParameterKinds::LABEL));
        assert_eq!(ParameterKinds::of_token(PinRangeLength), Ok(ParameterKinds::PIN_MULTIPLE));
        assert_eq!(ParameterKinds::of_token(Pin), Ok(ParameterKinds::PIN_SINGLE));
        assert_eq!(ParameterKinds::of_token(Hex), Ok(ParameterKinds::CONSTANT));
        assert_eq!(
            ParameterKinds::of_token(Comment),
            Err(ResolveError::InvalidArgumentKind(Comment))
        );
    }

    #[test]
    fn resolution_prefers_exact_arity() {
        let table = DefinitionTable::new()
            .define("add", vec![ParameterKinds::REGISTER], noop)
            .define(
                "add",
                vec![ParameterKinds::REGISTER, ParameterKinds::CONSTANT],
                other,
            );

        for _ in 0..3 {
            let one = table.resolve("add", &[TokenKind::Register]).unwrap();
            assert_eq!(one.parameters.len(), 1);
            let two = table
                .resolve("add", &[TokenKind::Register, TokenKind::Integer])
                .unwrap();
            assert_eq!(two.parameters.len(), 2);
        }
    }

    #[test]
    fn first_matching_overload_wins() {
        let table = DefinitionTable::new()
            .define("mov", vec![ParameterKinds::REGISTER_CONSTANT], noop)
            .define("mov", vec![ParameterKinds::CONSTANT], other);
        let def = table.resolve("mov", &[TokenKind::Integer]).unwrap();
        assert_eq!(def.parameters, vec![ParameterKinds::REGISTER_CONSTANT]);
    }

    #[test]
    fn every_position_must_match() {
        let table = DefinitionTable::new().define(
            "stp",
            vec![ParameterKinds::PIN_ALL, ParameterKinds::REGISTER_CONSTANT],
            noop,
        );
        assert!(table.resolve("stp", &[TokenKind::Pin, TokenKind::Hex]).is_ok());
        assert_eq!(
            table.resolve("stp", &[TokenKind::Pin, TokenKind::Pin]).unwrap_err(),
            ResolveError::NoMatchingOverload {
                name: "stp".into(),
                arguments: vec![ParameterKinds::PIN_SINGLE, ParameterKinds::PIN_SINGLE],
            }
        );
    }

    #[test]
    fn unknown_name() {
        let table = DefinitionTable::new();
        assert!(!table.has_name("nop"));
        assert_eq!(
            table.resolve("nop", &[]).unwrap_err(),
            ResolveError::UnknownName("nop".into())
        );
    }

    #[test]
    fn definition_display() {
        let def = InstructionDefinition::new(
            "beq",
            vec![
                ParameterKinds::REGISTER_CONSTANT_LABEL,
                ParameterKinds::REGISTER_CONSTANT,
            ],
            noop,
        );
        assert_eq!(def.to_string(), "beq REGISTER|LABEL|CONSTANT REGISTER|CONSTANT");
        assert_eq!(InstructionDefinition::new("ret", vec![], noop).to_string(), "ret");
    }
}
