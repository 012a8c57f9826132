//! ALU opcode tables.
//!
//! a5xx and a6xx share one assignment; a7xx moved shifts, min/max/cmp and
//! added `bic`/register `setbit`. Immediate forms expose a smaller subset
//! than the two-source forms, so each family has two tables.

use crate::decoder::{Generation, Op};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluEntry {
    pub op: Op,
    /// Effective source operands: 1 or 2, 0 for unassigned slots.
    pub nsrc: u8,
}

impl AluEntry {
    pub fn is_valid(&self) -> bool {
        self.op != Op::Invalid
    }
}

const fn e(op: Op, nsrc: u8) -> AluEntry {
    AluEntry { op, nsrc }
}

const NONE: AluEntry = e(Op::Invalid, 0);

/// Two-source register sub-opcodes (bits 0..4), a5xx/a6xx.
pub static ALU_2SRC_A6: [AluEntry; 32] = [
    NONE,
    e(Op::Add, 2),
    e(Op::AddHi, 2),
    e(Op::Sub, 2),
    e(Op::SubHi, 2),
    e(Op::And, 2),
    e(Op::Or, 2),
    e(Op::Xor, 2),
    e(Op::Not, 1),
    e(Op::Shl, 2), // 0x09
    e(Op::Ushr, 2),
    e(Op::Ishr, 2),
    e(Op::Rot, 2),
    e(Op::Mul8, 2),
    e(Op::Min, 2),
    e(Op::Max, 2),
    e(Op::Cmp, 2), // 0x10
    NONE,
    NONE,
    NONE,
    e(Op::Msb, 1), // 0x14
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
];

/// Two-source register sub-opcodes, a7xx.
pub static ALU_2SRC_A7: [AluEntry; 32] = [
    NONE,
    e(Op::Add, 2),
    e(Op::AddHi, 2),
    e(Op::Sub, 2),
    e(Op::SubHi, 2),
    e(Op::And, 2),
    e(Op::Or, 2),
    e(Op::Xor, 2),
    e(Op::Not, 1),
    e(Op::Bic, 2), // 0x09
    e(Op::Min, 2),
    e(Op::Max, 2),
    e(Op::Mul8, 2),
    e(Op::Cmp, 2), // 0x0d
    NONE,
    NONE,
    NONE,
    NONE,
    e(Op::Shl, 2), // 0x12
    e(Op::Ushr, 2),
    e(Op::Ishr, 2),
    e(Op::Rot, 2),
    e(Op::SetBitReg, 2), // 0x16
    NONE,
    NONE,
    e(Op::Msb, 1), // 0x19
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
];

/// 16-bit immediate ALU, indexed by the opcode group (bits 27..31), a5xx/a6xx.
pub static ALU_IMM_A6: [AluEntry; 32] = [
    NONE,
    e(Op::Add, 2),
    e(Op::AddHi, 2),
    e(Op::Sub, 2),
    e(Op::SubHi, 2),
    e(Op::And, 2),
    e(Op::Or, 2),
    e(Op::Xor, 2),
    e(Op::Not, 1),
    e(Op::Shl, 2),
    e(Op::Ushr, 2),
    e(Op::Ishr, 2),
    e(Op::Rot, 2),
    e(Op::Mul8, 2),
    e(Op::Min, 2),
    e(Op::Max, 2),
    e(Op::Cmp, 2),
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
];

/// 16-bit immediate ALU, a7xx. Group 0x0e is `mov` imm here, not `min`.
pub static ALU_IMM_A7: [AluEntry; 32] = [
    NONE,
    e(Op::Add, 2),
    e(Op::AddHi, 2),
    e(Op::Sub, 2),
    e(Op::SubHi, 2),
    e(Op::And, 2),
    e(Op::Or, 2),
    e(Op::Xor, 2),
    e(Op::Not, 1),
    e(Op::Bic, 2),
    e(Op::Min, 2),
    e(Op::Max, 2),
    e(Op::Mul8, 2),
    e(Op::Cmp, 2),
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
    NONE,
];

pub fn alu_2src(gen: Generation) -> &'static [AluEntry; 32] {
    if gen >= Generation::Gen7 {
        &ALU_2SRC_A7
    } else {
        &ALU_2SRC_A6
    }
}

pub fn alu_imm(gen: Generation) -> &'static [AluEntry; 32] {
    if gen >= Generation::Gen7 {
        &ALU_IMM_A7
    } else {
        &ALU_IMM_A6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_disagree_on_0x09() {
        assert_eq!(alu_2src(Generation::Gen5)[0x09].op, Op::Shl);
        assert_eq!(alu_2src(Generation::Gen6)[0x09].op, Op::Shl);
        assert_eq!(alu_2src(Generation::Gen7)[0x09].op, Op::Bic);
        assert_eq!(alu_imm(Generation::Gen7)[0x09].op, Op::Bic);
    }

    #[test]
    fn source_counts_match_validity() {
        for gen in Generation::ALL {
            for t in [alu_2src(gen), alu_imm(gen)] {
                for entry in t.iter() {
                    match entry.op {
                        Op::Invalid => assert_eq!(entry.nsrc, 0),
                        Op::Not | Op::Msb => assert_eq!(entry.nsrc, 1),
                        _ => assert_eq!(entry.nsrc, 2),
                    }
                }
            }
        }
    }

    #[test]
    fn immediate_tables_stop_at_group_0x10() {
        for gen in Generation::ALL {
            assert!(alu_imm(gen)[0x11..].iter().all(|e| !e.is_valid()));
            assert!(!alu_imm(gen)[0].is_valid());
        }
    }
}
