use crate::decoder::Op;

/// Operand layout, as rendered by the disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    None,
    /// `dst, [src1,] src2|imm`
    Alu,
    /// `dst, src2|imm`
    Unary,
    Mov,
    MovImm,
    /// `dst, src1, bN`
    BitImm,
    /// `dst, src1, bLO, bHI`
    Bitfield,
    CtrlWrite,
    CtrlRead,
    Store,
    Load,
    BranchImm,
    BranchBit,
    Relative,
    Absolute,
    Indirect,
    SetSecure,
    Raw,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub form: Form,
}

const fn desc(op: Op, mnemonic: &'static str, form: Form) -> InstrDesc {
    InstrDesc { op, mnemonic, form }
}

pub const TABLE: &[InstrDesc] = &[
    desc(Op::Nop, "nop", Form::None),
    desc(Op::Add, "add", Form::Alu),
    desc(Op::AddHi, "addhi", Form::Alu),
    desc(Op::Sub, "sub", Form::Alu),
    desc(Op::SubHi, "subhi", Form::Alu),
    desc(Op::And, "and", Form::Alu),
    desc(Op::Or, "or", Form::Alu),
    desc(Op::Xor, "xor", Form::Alu),
    desc(Op::Not, "not", Form::Unary),
    desc(Op::Shl, "shl", Form::Alu),
    desc(Op::Ushr, "ushr", Form::Alu),
    desc(Op::Ishr, "ishr", Form::Alu),
    desc(Op::Rot, "rot", Form::Alu),
    desc(Op::Mul8, "mul8", Form::Alu),
    desc(Op::Min, "min", Form::Alu),
    desc(Op::Max, "max", Form::Alu),
    desc(Op::Cmp, "cmp", Form::Alu),
    desc(Op::Bic, "bic", Form::Alu),
    desc(Op::Msb, "msb", Form::Unary),
    desc(Op::Mov, "mov", Form::Mov),
    desc(Op::MovImm, "mov", Form::MovImm),
    desc(Op::SetBit, "setbit", Form::BitImm),
    desc(Op::ClrBit, "clrbit", Form::BitImm),
    desc(Op::SetBitReg, "setbit", Form::Alu),
    desc(Op::Ubfx, "ubfx", Form::Bitfield),
    desc(Op::Bfi, "bfi", Form::Bitfield),
    desc(Op::CWrite, "cwrite", Form::CtrlWrite),
    desc(Op::CRead, "cread", Form::CtrlRead),
    desc(Op::SWrite, "swrite", Form::CtrlWrite),
    desc(Op::SRead, "sread", Form::CtrlRead),
    desc(Op::Store, "store", Form::Store),
    desc(Op::Load, "load", Form::Load),
    desc(Op::BrneImm, "brne", Form::BranchImm),
    desc(Op::BreqImm, "breq", Form::BranchImm),
    desc(Op::BrneBit, "brne", Form::BranchBit),
    desc(Op::BreqBit, "breq", Form::BranchBit),
    desc(Op::Jump, "jump", Form::Relative),
    desc(Op::Call, "call", Form::Absolute),
    desc(Op::Ret, "ret", Form::None),
    desc(Op::Iret, "iret", Form::None),
    desc(Op::WaitIn, "waitin", Form::None),
    desc(Op::Bl, "bl", Form::Absolute),
    desc(Op::JumpA, "jumpa", Form::Absolute),
    desc(Op::JumpR, "jump", Form::Indirect),
    desc(Op::SRet, "sret", Form::None),
    desc(Op::SetSecure, "setsecure", Form::SetSecure),
    desc(Op::Invalid, "???", Form::Raw),
];

const UNKNOWN: InstrDesc = desc(Op::Invalid, "???", Form::Raw);

pub fn describe(op: Op) -> &'static InstrDesc {
    TABLE.iter().find(|d| d.op == op).unwrap_or(&UNKNOWN)
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        describe(self).mnemonic
    }
}
