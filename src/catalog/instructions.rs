//! Behaviors of the standard instruction set.
//!
//! Every behavior receives the argument tokens of its line (instruction name and
//! comments excluded) and acts only through the [`ExecutionContext`]. All
//! arithmetic wraps modulo 2^16.

use crate::catalog::Behavior;
use crate::execution::context::ExecutionContext;
use crate::execution::errors::VMError;
use crate::parsing::token::{Token, TokenKind};
use crate::parsing::values::{self, PinRange};

const ACC: &str = "acc";
const T: &str = "t";
const RV: &str = "rv";

// ==================== Argument helpers ====================

fn arg<'a>(instr: &'static str, args: &'a [Token], index: usize) -> Result<&'a Token, VMError> {
    args.get(index).ok_or(VMError::MissingArgument {
        instruction: instr,
        index,
    })
}

fn value(
    ctx: &dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
    index: usize,
) -> Result<u16, VMError> {
    ctx.value_of(arg(instr, args, index)?)
}

/// Name of the register argument at `index`.
fn register<'a>(instr: &'static str, args: &'a [Token], index: usize) -> Result<&'a str, VMError> {
    let token = arg(instr, args, index)?;
    match token.kind() {
        TokenKind::Register => Ok(values::name(token)?),
        kind => Err(VMError::InvalidArgumentKind {
            instruction: instr,
            kind,
        }),
    }
}

fn pin_range(instr: &'static str, args: &[Token], index: usize) -> Result<PinRange, VMError> {
    let token = arg(instr, args, index)?;
    if !token.kind().is_pin() {
        return Err(VMError::InvalidArgumentKind {
            instruction: instr,
            kind: token.kind(),
        });
    }
    Ok(values::pin_range(token)?)
}

/// Jumps to a label argument by name, or to a line number held in a register or constant.
fn jump_to(ctx: &mut dyn ExecutionContext, token: &Token) -> Result<(), VMError> {
    if token.kind() == TokenKind::LabelArg {
        ctx.jump_to_label(values::name(token)?);
    } else {
        let line_number = ctx.value_of(token)?;
        ctx.jump(line_number as usize);
    }
    Ok(())
}

// ==================== Arithmetic ====================

/// One argument: `acc op a`. Two arguments: `a op b`.
fn operands(
    ctx: &dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
) -> Result<(u16, u16), VMError> {
    if args.len() >= 2 {
        Ok((value(ctx, instr, args, 0)?, value(ctx, instr, args, 1)?))
    } else {
        Ok((ctx.register(ACC)?, value(ctx, instr, args, 0)?))
    }
}

fn arithmetic(
    ctx: &mut dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
    op: fn(u16, u16) -> Result<u16, VMError>,
) -> Result<(), VMError> {
    let (a, b) = operands(ctx, instr, args)?;
    ctx.set_register(ACC, op(a, b)?)
}

pub(crate) fn op_add(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    arithmetic(ctx, "add", args, |a, b| Ok(a.wrapping_add(b)))
}

/// `sub a` is `acc - a`; `sub a b` is `b - a`.
pub(crate) fn op_sub(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let (minuend, subtrahend) = if args.len() >= 2 {
        (value(ctx, "sub", args, 1)?, value(ctx, "sub", args, 0)?)
    } else {
        (ctx.register(ACC)?, value(ctx, "sub", args, 0)?)
    };
    ctx.set_register(ACC, minuend.wrapping_sub(subtrahend))
}

pub(crate) fn op_mul(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    arithmetic(ctx, "mul", args, |a, b| Ok(a.wrapping_mul(b)))
}

pub(crate) fn op_div(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    arithmetic(ctx, "div", args, |a, b| {
        a.checked_div(b).ok_or(VMError::DivisionByZero)
    })
}

pub(crate) fn op_mod(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    arithmetic(ctx, "mod", args, |a, b| {
        a.checked_rem(b).ok_or(VMError::DivisionByZero)
    })
}

// ==================== Moves and bitwise ====================

pub(crate) fn op_mov(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let target = register("mov", args, 0)?;
    let v = value(ctx, "mov", args, 1)?;
    ctx.set_register(target, v)
}

fn bitwise(
    ctx: &mut dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
    op: fn(u16, u16) -> u16,
) -> Result<(), VMError> {
    let target = register(instr, args, 0)?;
    let current = ctx.register(target)?;
    let operand = value(ctx, instr, args, 1)?;
    ctx.set_register(target, op(current, operand))
}

pub(crate) fn op_and(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    bitwise(ctx, "and", args, |a, b| a & b)
}

pub(crate) fn op_or(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    bitwise(ctx, "or", args, |a, b| a | b)
}

pub(crate) fn op_xor(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    bitwise(ctx, "xor", args, |a, b| a ^ b)
}

pub(crate) fn op_not(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let target = register("not", args, 0)?;
    let current = ctx.register(target)?;
    ctx.set_register(target, !current)
}

/// Logical shift of `value` by `amount`; 16 or more clears every bit.
fn shift(
    ctx: &mut dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
    op: fn(u16, u32) -> Option<u16>,
) -> Result<(), VMError> {
    let target = register(instr, args, 0)?;
    let v = value(ctx, instr, args, 1)?;
    let amount = value(ctx, instr, args, 2)?;
    ctx.set_register(target, op(v, amount as u32).unwrap_or(0))
}

pub(crate) fn op_shl(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    shift(ctx, "shl", args, u16::checked_shl)
}

pub(crate) fn op_shr(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    shift(ctx, "shr", args, u16::checked_shr)
}

// ==================== Tests ====================

fn test(
    ctx: &mut dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
    op: fn(u16, u16) -> bool,
) -> Result<(), VMError> {
    let a = value(ctx, instr, args, 0)?;
    let b = value(ctx, instr, args, 1)?;
    ctx.set_register(T, op(a, b) as u16)
}

pub(crate) fn op_teq(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    test(ctx, "teq", args, |a, b| a == b)
}

pub(crate) fn op_tne(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    test(ctx, "tne", args, |a, b| a != b)
}

pub(crate) fn op_tlt(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    test(ctx, "tlt", args, |a, b| a < b)
}

pub(crate) fn op_tgt(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    test(ctx, "tgt", args, |a, b| a > b)
}

// ==================== Control flow ====================

pub(crate) fn op_jmp(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    jump_to(ctx, arg("jmp", args, 0)?)
}

fn branch(
    ctx: &mut dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
    op: fn(u16, u16) -> bool,
) -> Result<(), VMError> {
    let target = arg(instr, args, 0)?;
    let a = value(ctx, instr, args, 1)?;
    let b = value(ctx, instr, args, 2)?;
    if op(a, b) {
        jump_to(ctx, target)?;
    }
    Ok(())
}

pub(crate) fn op_beq(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    branch(ctx, "beq", args, |a, b| a == b)
}

pub(crate) fn op_bne(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    branch(ctx, "bne", args, |a, b| a != b)
}

pub(crate) fn op_blt(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    branch(ctx, "blt", args, |a, b| a < b)
}

pub(crate) fn op_bgt(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    branch(ctx, "bgt", args, |a, b| a > b)
}

pub(crate) fn op_jsr(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let target = arg("jsr", args, 0)?;
    ctx.push_frame()?;
    jump_to(ctx, target)
}

/// Sets `rv` from the optional argument, then pops the frame and jumps back.
///
/// `rv` is written before the pop so a stack register argument is read in the
/// callee's frame.
fn return_from(
    ctx: &mut dyn ExecutionContext,
    instr: &'static str,
    args: &[Token],
) -> Result<(), VMError> {
    if !args.is_empty() {
        let v = value(ctx, instr, args, 0)?;
        ctx.set_register(RV, v)?;
    }
    let address = ctx.pop_frame()?;
    ctx.jump(address);
    Ok(())
}

pub(crate) fn op_ret(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    return_from(ctx, "ret", args)
}

pub(crate) fn op_rtt(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    if ctx.register(T)? != 1 {
        return Ok(());
    }
    return_from(ctx, "rtt", args)
}

pub(crate) fn op_rtf(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    if ctx.register(T)? != 0 {
        return Ok(());
    }
    return_from(ctx, "rtf", args)
}

pub(crate) fn op_slp(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let steps = value(ctx, "slp", args, 0)?;
    ctx.sleep(steps as usize);
    Ok(())
}

// ==================== Pins ====================

/// Bits of `value` for `count` pins, most significant first.
///
/// Pin `start + i` receives bit `count - 1 - i`. Bits above 15 read as 0.
pub(crate) fn value_to_bits(value: u16, count: usize) -> Vec<bool> {
    (0..count)
        .map(|i| {
            let bit = count - 1 - i;
            bit < 16 && value & (1 << bit) != 0
        })
        .collect()
}

/// Inverse of [`value_to_bits`], OR-ed into `initial`.
pub(crate) fn bits_to_value(initial: u16, bits: &[bool]) -> u16 {
    let count = bits.len();
    bits.iter().enumerate().fold(initial, |acc, (i, set)| {
        let bit = count - 1 - i;
        if *set && bit < 16 { acc | (1 << bit) } else { acc }
    })
}

pub(crate) fn op_stp(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let range = pin_range("stp", args, 0)?;
    let v = value(ctx, "stp", args, 1)?;
    ctx.set_pins(range, &value_to_bits(v, range.count()))
}

pub(crate) fn op_ldp(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let target = register("ldp", args, 0)?;
    let range = pin_range("ldp", args, 1)?;
    let bits = ctx.pins(range)?;
    let current = ctx.register(target)?;
    ctx.set_register(target, bits_to_value(current, &bits))
}

pub(crate) fn op_clp(ctx: &mut dyn ExecutionContext, args: &[Token]) -> Result<(), VMError> {
    let range = pin_range("clp", args, 0)?;
    ctx.set_pins(range, &vec![false; range.count()])
}

/// Looks up a behavior by instruction name. Used by hosts assembling their own tables.
pub fn behavior_named(name: &str) -> Option<Behavior> {
    let behavior: Behavior = match name {
        "add" => op_add,
        "sub" => op_sub,
        "mul" => op_mul,
        "div" => op_div,
        "mod" => op_mod,
        "mov" => op_mov,
        "and" => op_and,
        "or" => op_or,
        "xor" => op_xor,
        "not" => op_not,
        "shl" => op_shl,
        "shr" => op_shr,
        "teq" => op_teq,
        "tne" => op_tne,
        "tlt" => op_tlt,
        "tgt" => op_tgt,
        "jmp" => op_jmp,
        "beq" => op_beq,
        "bne" => op_bne,
        "blt" => op_blt,
        "bgt" => op_bgt,
        "jsr" => op_jsr,
        "ret" => op_ret,
        "rtt" => op_rtt,
        "rtf" => op_rtf,
        "slp" => op_slp,
        "stp" => op_stp,
        "ldp" => op_ldp,
        "clp" => op_clp,
        _ => return None,
    };
    Some(behavior)
}
