//! Lowering of decoded instructions to [`crate::il`].
//!
//! Approximations:
//!
//! * `min`, `max`, `cmp` and `msb` become intrinsics.
//! * `addhi`/`subhi` consume `$carry`, but nothing ever writes it.
//! * `bl` is a plain call; the `$lr` write is not lowered.
//! * pre-increment (`!`) base write-back is not lowered.

use crate::decoder::{Decoded, Generation, Op};
use crate::il::{BinOp, CarryOp, Cond, Expr, Intrinsic, Stmt};
use crate::regs::{resolve_destination, resolve_source, Reg, LINK_REGISTER};

pub trait Lifter {
    fn lift(&self, d: &Decoded, addr: u32) -> Vec<Stmt>;
}

pub struct AfucLifter {
    gen: Generation,
}

impl AfucLifter {
    pub fn new(gen: Generation) -> Self {
        Self { gen }
    }
}

/// `$00` reads as zero.
fn read(reg: Reg) -> Expr {
    if reg.is_zero() {
        Expr::konst(0)
    } else {
        Expr::reg(reg)
    }
}

fn src(enc: u8) -> Expr {
    read(resolve_source(enc))
}

/// Writes to `$00` are discarded.
fn set_dst(enc: u8, value: Expr) -> Stmt {
    let reg = resolve_destination(enc);
    if reg.is_zero() {
        Stmt::Nop
    } else {
        Stmt::SetReg { reg, value }
    }
}

/// Mask of `hi - lo + 1` ones; a reversed range saturates to all ones.
fn field_mask(lo: u8, hi: u8) -> u32 {
    let width = u32::from(hi).wrapping_sub(u32::from(lo)).wrapping_add(1);
    1u32.checked_shl(width).map_or(u32::MAX, |v| v.wrapping_sub(1))
}

fn alu(op: Op, a: Expr, b: Expr) -> Option<Expr> {
    let bin = match op {
        Op::Add => BinOp::Add,
        Op::Sub => BinOp::Sub,
        Op::And => BinOp::And,
        Op::Or => BinOp::Or,
        Op::Xor => BinOp::Xor,
        Op::Shl => BinOp::Shl,
        Op::Ushr => BinOp::Lsr,
        Op::Ishr => BinOp::Asr,
        Op::Rot => BinOp::Rol,
        Op::AddHi => return Some(Expr::with_carry(CarryOp::AddCarry, a, b, Expr::reg(Reg::Carry))),
        Op::SubHi => return Some(Expr::with_carry(CarryOp::SubBorrow, a, b, Expr::reg(Reg::Carry))),
        Op::Mul8 => {
            return Some(Expr::binary(
                BinOp::Mul,
                Expr::binary(BinOp::And, a, Expr::konst(0xff)),
                Expr::binary(BinOp::And, b, Expr::konst(0xff)),
            ))
        }
        Op::Bic => return Some(Expr::binary(BinOp::And, a, Expr::not(b))),
        Op::Min => return Some(Expr::intrinsic(Intrinsic::Min, vec![a, b])),
        Op::Max => return Some(Expr::intrinsic(Intrinsic::Max, vec![a, b])),
        Op::Cmp => return Some(Expr::intrinsic(Intrinsic::Cmp, vec![a, b])),
        _ => return None,
    };
    Some(Expr::binary(bin, a, b))
}

fn branch(cond: Expr, d: &Decoded, addr: u32) -> Stmt {
    Stmt::If {
        cond,
        taken: d.relative_target(addr),
        // the delay slot always executes
        not_taken: addr.wrapping_add(8),
    }
}

impl Lifter for AfucLifter {
    fn lift(&self, d: &Decoded, addr: u32) -> Vec<Stmt> {
        let stmt = match d.op {
            Op::Nop => Stmt::Nop,

            Op::Add
            | Op::AddHi
            | Op::Sub
            | Op::SubHi
            | Op::And
            | Op::Or
            | Op::Xor
            | Op::Shl
            | Op::Ushr
            | Op::Ishr
            | Op::Rot
            | Op::Mul8
            | Op::Min
            | Op::Max
            | Op::Cmp
            | Op::Bic => {
                let rhs = if d.is_immed() { Expr::konst(d.imm) } else { src(d.src2_enc) };
                alu(d.op, src(d.src1_enc), rhs).map_or(Stmt::Unimplemented, |v| set_dst(d.dst_enc, v))
            }

            Op::Not => {
                let a = if d.is_immed() { Expr::konst(d.imm) } else { src(d.src2_enc) };
                set_dst(d.dst_enc, Expr::not(a))
            }
            Op::Msb => set_dst(d.dst_enc, Expr::intrinsic(Intrinsic::Msb, vec![src(d.src2_enc)])),
            Op::Mov => set_dst(d.dst_enc, src(d.src2_enc)),
            Op::MovImm => {
                let value = d.imm.checked_shl(u32::from(d.shift)).unwrap_or(0);
                set_dst(d.dst_enc, Expr::konst(value))
            }

            Op::SetBit => set_dst(
                d.dst_enc,
                Expr::binary(BinOp::Or, src(d.src1_enc), Expr::konst(1 << (d.bit & 31))),
            ),
            Op::ClrBit => set_dst(
                d.dst_enc,
                Expr::binary(BinOp::And, src(d.src1_enc), Expr::konst(!(1 << (d.bit & 31)))),
            ),
            Op::SetBitReg => {
                let bit = Expr::binary(BinOp::Shl, Expr::konst(1), src(d.src2_enc));
                set_dst(d.dst_enc, Expr::binary(BinOp::Or, src(d.src1_enc), bit))
            }
            Op::Ubfx => {
                let shifted =
                    Expr::binary(BinOp::Lsr, src(d.src1_enc), Expr::konst(u32::from(d.lo)));
                let value = Expr::binary(BinOp::And, shifted, Expr::konst(field_mask(d.lo, d.hi)));
                set_dst(d.dst_enc, value)
            }
            Op::Bfi => {
                let mask = field_mask(d.lo, d.hi).checked_shl(u32::from(d.lo)).unwrap_or(0);
                let inserted = Expr::binary(
                    BinOp::And,
                    Expr::binary(BinOp::Shl, src(d.src1_enc), Expr::konst(u32::from(d.lo))),
                    Expr::konst(mask),
                );
                // current destination value, named through the write-side mapping
                let old = read(resolve_destination(d.dst_enc));
                let cleared = Expr::binary(BinOp::And, old, Expr::konst(!mask));
                set_dst(d.dst_enc, Expr::binary(BinOp::Or, cleared, inserted))
            }

            Op::Load => {
                let ea = Expr::binary(BinOp::Add, src(d.src1_enc), Expr::konst(d.imm));
                set_dst(d.dst_enc, Expr::load(ea))
            }
            Op::Store => Stmt::Store {
                addr: Expr::binary(BinOp::Add, src(d.src2_enc), Expr::konst(d.imm)),
                value: src(d.src1_enc),
            },
            Op::CWrite | Op::SWrite => Stmt::Store {
                addr: Expr::binary(BinOp::Add, src(d.src2_enc), Expr::konst(d.base)),
                value: src(d.src1_enc),
            },
            Op::CRead | Op::SRead => {
                let ea = Expr::binary(BinOp::Add, src(d.src1_enc), Expr::konst(d.base));
                set_dst(d.dst_enc, Expr::load(ea))
            }

            Op::BrneImm | Op::BreqImm => {
                let cond = if d.op == Op::BreqImm { Cond::Eq } else { Cond::Ne };
                branch(Expr::compare(cond, src(d.src1_enc), Expr::konst(d.imm)), d, addr)
            }
            Op::BrneBit | Op::BreqBit => {
                let test =
                    Expr::binary(BinOp::And, src(d.src1_enc), Expr::konst(1 << (d.bit & 31)));
                // breq: taken when the bit is set
                let cond = if d.op == Op::BreqBit { Cond::Ne } else { Cond::Eq };
                branch(Expr::compare(cond, test, Expr::konst(0)), d, addr)
            }
            Op::Jump => Stmt::Jump { target: Expr::ptr(d.relative_target(addr)) },
            Op::Call | Op::Bl => Stmt::Call { target: Expr::ptr(d.absolute_target()) },
            Op::JumpA => Stmt::Jump { target: Expr::ptr(d.absolute_target()) },
            Op::JumpR => Stmt::Jump { target: src(d.src1_enc) },
            Op::Ret | Op::Iret | Op::WaitIn => Stmt::Return { target: Expr::konst(0) },
            Op::SRet => Stmt::Return { target: Expr::reg(LINK_REGISTER) },
            Op::SetSecure => Stmt::Intrinsic {
                intrinsic: Intrinsic::SetSecure,
                args: vec![Expr::reg(Reg::R02)],
            },

            Op::Invalid => {
                tracing::debug!(addr, raw = d.raw, gen = %self.gen, "lifting invalid instruction");
                Stmt::Unimplemented
            }
        };
        tracing::trace!(addr, op = ?d.op, %stmt, "lifted");
        vec![stmt]
    }
}

/// Lifts one decoded instruction at byte address `addr`.
pub fn lift(d: &Decoded, addr: u32, gen: Generation) -> Vec<Stmt> {
    AfucLifter::new(gen).lift(d, addr)
}
