use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::isa::afuc::AfucDecoder;
use crate::regs::Reg;

/// Hardware family whose opcode tables govern decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Generation {
    Gen5 = 5,
    Gen6 = 6,
    Gen7 = 7,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::Gen5, Generation::Gen6, Generation::Gen7];

    pub fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Generation {
    type Error = UnknownGeneration;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            5 => Ok(Generation::Gen5),
            6 => Ok(Generation::Gen6),
            7 => Ok(Generation::Gen7),
            _ => Err(UnknownGeneration(v.to_string())),
        }
    }
}

impl FromStr for Generation {
    type Err = UnknownGeneration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        let digits = t
            .strip_prefix("gen")
            .or_else(|| t.strip_prefix('a').and_then(|r| r.strip_suffix("xx")))
            .unwrap_or(&t);
        digits
            .parse::<u8>()
            .ok()
            .and_then(|n| Generation::try_from(n).ok())
            .ok_or_else(|| UnknownGeneration(s.to_string()))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}xx", self.number())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown GPU generation `{0}` (expected 5, 6 or 7)")]
pub struct UnknownGeneration(pub String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated instruction at {addr:#010x}: need 4 bytes, have {len}")]
    Truncated { addr: u32, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Op {
    Nop,

    // ALU, register-register and immediate forms
    Add,
    AddHi,
    Sub,
    SubHi,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Ushr,
    Ishr,
    Rot,
    Mul8,
    Min,
    Max,
    Cmp,
    Bic,
    Msb,
    /// `or $dst, $00, $src`
    Mov,

    /// Move immediate with shift.
    MovImm,

    SetBit,
    ClrBit,
    SetBitReg,
    Ubfx,
    Bfi,

    CWrite,
    CRead,
    SWrite,
    SRead,

    Store,
    Load,

    BrneImm,
    BreqImm,
    BrneBit,
    BreqBit,
    /// `brne $00, b0, #off`
    Jump,
    Call,
    Ret,
    Iret,
    WaitIn,
    Bl,
    JumpA,
    JumpR,
    SRet,
    SetSecure,

    #[default]
    Invalid,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers: u8 {
const REP = 1 << 0;
const PEEK = 1 << 1;
const PREINCREMENT = 1 << 2;
const IMMED = 1 << 3; // immediate operand form
const ONE_SRC = 1 << 4; // single-source ALU form
}
}

/// One decoded instruction word.
///
/// Fields not used by `op` stay at zero; which ones are meaningful is
/// documented per operation in `isa::afuc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Op,

    pub dst: Reg,
    pub src1: Reg,
    pub src2: Reg,

    // raw register fields, for display
    pub dst_enc: u8,
    pub src1_enc: u8,
    pub src2_enc: u8,

    pub imm: u32,
    pub shift: u8,
    pub bit: u8,
    pub lo: u8,
    pub hi: u8,
    /// 12-bit control/SQE register offset.
    pub base: u32,

    pub flags: Modifiers,
    pub xmov: u8,
    pub sds: u8,

    /// Signed, in instruction words.
    pub branch_offset: i32,
    /// Absolute, in instruction words.
    pub branch_target: u32,

    pub nop_payload: u32,
    pub raw: u32,
}

impl Decoded {
    pub fn invalid(raw: u32) -> Self {
        Self { op: Op::Invalid, raw, ..Self::default() }
    }

    pub fn is_invalid(&self) -> bool {
        self.op == Op::Invalid
    }

    pub fn rep(&self) -> bool {
        self.flags.contains(Modifiers::REP)
    }

    pub fn peek(&self) -> bool {
        self.flags.contains(Modifiers::PEEK)
    }

    pub fn preincrement(&self) -> bool {
        self.flags.contains(Modifiers::PREINCREMENT)
    }

    pub fn is_immed(&self) -> bool {
        self.flags.contains(Modifiers::IMMED)
    }

    pub fn is_one_src(&self) -> bool {
        self.flags.contains(Modifiers::ONE_SRC)
    }

    /// Byte address of a relative branch taken at `addr`: one word past the
    /// branch plus the displacement.
    pub fn relative_target(&self, addr: u32) -> u32 {
        addr.wrapping_add(4)
            .wrapping_add((self.branch_offset as u32).wrapping_mul(4))
    }

    /// Byte address of an absolute call/jump.
    pub fn absolute_target(&self) -> u32 {
        self.branch_target.wrapping_mul(4)
    }
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Decoded;
}

/// Decodes the little-endian word at the start of `bytes`.
///
/// Never fails on content: unrecognised encodings come back as `Op::Invalid`.
pub fn decode(bytes: &[u8], addr: u32, gen: Generation) -> Result<Decoded, DecodeError> {
    let Some(&[b0, b1, b2, b3]) = bytes.get(..4) else {
        return Err(DecodeError::Truncated { addr, len: bytes.len() });
    };
    let raw = u32::from_le_bytes([b0, b1, b2, b3]);
    let d = AfucDecoder::new(gen).decode(raw);
    tracing::trace!(addr, raw, op = ?d.op, %gen, "decoded");
    Ok(d)
}

/// Canonical no-op word, for patching.
pub fn nop_word(gen: Generation) -> u32 {
    if gen >= Generation::Gen6 {
        0x0100_0000
    } else {
        0x0000_0000
    }
}
