use serde::Serialize;

use crate::decoder::{Decoded, Op};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BranchKind {
    True,
    False,
    Unconditional,
    Call,
    Unresolved,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub kind: BranchKind,
    pub target: Option<u32>,
}

impl Branch {
    fn to(kind: BranchKind, target: u32) -> Self {
        Self { kind, target: Some(target) }
    }

    fn bare(kind: BranchKind) -> Self {
        Self { kind, target: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionInfo {
    pub length: u32,
    /// Words after this one that execute before control transfers.
    pub delay_slots: u32,
    pub branches: Vec<Branch>,
}

/// Control-flow summary of one instruction at byte address `addr`.
pub fn instruction_info(d: &Decoded, addr: u32) -> InstructionInfo {
    let (delay_slots, branches) = match d.op {
        Op::BrneImm | Op::BreqImm | Op::BrneBit | Op::BreqBit => (
            1,
            vec![
                Branch::to(BranchKind::True, d.relative_target(addr)),
                Branch::to(BranchKind::False, addr.wrapping_add(8)),
            ],
        ),
        Op::Jump => (1, vec![Branch::to(BranchKind::Unconditional, d.relative_target(addr))]),
        Op::Call | Op::Bl => (0, vec![Branch::to(BranchKind::Call, d.absolute_target())]),
        Op::JumpA => (0, vec![Branch::to(BranchKind::Unconditional, d.absolute_target())]),
        Op::JumpR => (0, vec![Branch::bare(BranchKind::Unresolved)]),
        Op::Ret | Op::Iret | Op::SRet | Op::WaitIn => (0, vec![Branch::bare(BranchKind::Return)]),
        _ => (0, Vec::new()),
    };
    InstructionInfo { length: 4, delay_slots, branches }
}
