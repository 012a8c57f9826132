//! Register file model.
//!
//! The 5-bit register field means different things depending on whether it
//! is read or written: 0x1d is `$memdata` as a source but `$addr` as a
//! destination, 0x1e is `$regdata` / `$usraddr`. Always go through
//! [`resolve_source`] or [`resolve_destination`], never a shared conversion.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width in bytes of every register and every IR value.
pub const REG_SIZE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Reg {
    #[default]
    R00 = 0x00,
    R01,
    R02,
    R03,
    R04,
    R05,
    R06,
    R07,
    R08,
    R09,
    R0A,
    R0B,
    R0C,
    R0D,
    R0E,
    R0F,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    R16,
    R17,
    R18,
    R19,
    Sp = 0x1a,
    Lr = 0x1b,
    Rem = 0x1c,
    // Source-side meaning of 0x1d..0x1f
    MemData = 0x1d,
    RegData = 0x1e,
    Data = 0x1f,
    // Destination-side meaning of 0x1d/0x1e
    Addr = 0x20,
    UsrAddr = 0x21,
    /// Not addressable by instructions; only used by the lifter.
    Carry = 0x22,
}

const GPR_NAMES: [&str; 28] = [
    "$00", "$01", "$02", "$03", "$04", "$05", "$06", "$07", "$08", "$09", "$0a", "$0b", "$0c",
    "$0d", "$0e", "$0f", "$10", "$11", "$12", "$13", "$14", "$15", "$16", "$17", "$18", "$19",
    "$sp", "$lr",
];

impl Reg {
    pub const COUNT: usize = 0x23;

    pub const ALL: [Reg; Reg::COUNT] = [
        Reg::R00,
        Reg::R01,
        Reg::R02,
        Reg::R03,
        Reg::R04,
        Reg::R05,
        Reg::R06,
        Reg::R07,
        Reg::R08,
        Reg::R09,
        Reg::R0A,
        Reg::R0B,
        Reg::R0C,
        Reg::R0D,
        Reg::R0E,
        Reg::R0F,
        Reg::R10,
        Reg::R11,
        Reg::R12,
        Reg::R13,
        Reg::R14,
        Reg::R15,
        Reg::R16,
        Reg::R17,
        Reg::R18,
        Reg::R19,
        Reg::Sp,
        Reg::Lr,
        Reg::Rem,
        Reg::MemData,
        Reg::RegData,
        Reg::Data,
        Reg::Addr,
        Reg::UsrAddr,
        Reg::Carry,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Reg> {
        Reg::ALL.get(idx).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Reg::Rem => "$rem",
            Reg::MemData => "$memdata",
            Reg::RegData => "$regdata",
            Reg::Data => "$data",
            Reg::Addr => "$addr",
            Reg::UsrAddr => "$usraddr",
            Reg::Carry => "$carry",
            r => GPR_NAMES[r.index()],
        }
    }

    /// `$00` reads as zero and discards writes.
    pub fn is_zero(self) -> bool {
        self == Reg::R00
    }

    pub fn is_gpr(self) -> bool {
        self <= Reg::R19
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a 5-bit encoding read as an operand.
pub fn resolve_source(enc: u8) -> Reg {
    // 0x00..=0x1f line up with the enum discriminants.
    Reg::ALL[(enc & 0x1f) as usize]
}

/// Maps a 5-bit encoding written as a result.
pub fn resolve_destination(enc: u8) -> Reg {
    match enc & 0x1f {
        0x1d => Reg::Addr,
        0x1e => Reg::UsrAddr,
        e => Reg::ALL[e as usize],
    }
}

pub fn source_name(enc: u8) -> &'static str {
    resolve_source(enc).name()
}

pub fn destination_name(enc: u8) -> &'static str {
    resolve_destination(enc).name()
}

pub const STACK_POINTER: Reg = Reg::Sp;
pub const LINK_REGISTER: Reg = Reg::Lr;

/// Scratch registers, clobbered across calls.
pub const CALLER_SAVED: [Reg; 11] = [
    Reg::R01,
    Reg::R02,
    Reg::R03,
    Reg::R04,
    Reg::R05,
    Reg::R06,
    Reg::R07,
    Reg::R08,
    Reg::R09,
    Reg::R0A,
    Reg::R0B,
];

/// Globals, preserved across calls by convention.
pub const CALLEE_SAVED: [Reg; 8] = [
    Reg::R12,
    Reg::R13,
    Reg::R14,
    Reg::R15,
    Reg::R16,
    Reg::R17,
    Reg::R18,
    Reg::R19,
];

/// Packet payloads arrive through `$data`, so nothing is passed in registers.
pub const ARGUMENT_REGISTERS: [Reg; 0] = [];

pub const RETURN_VALUE: Reg = Reg::R01;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_indexed_by_discriminant() {
        for (i, r) in Reg::ALL.iter().enumerate() {
            assert_eq!(r.index(), i);
            assert_eq!(Reg::from_index(i), Some(*r));
        }
        assert_eq!(Reg::from_index(Reg::COUNT), None);
    }

    #[test]
    fn special_encodings_differ_by_direction() {
        assert_eq!(resolve_source(0x1d), Reg::MemData);
        assert_eq!(resolve_destination(0x1d), Reg::Addr);
        assert_eq!(resolve_source(0x1e), Reg::RegData);
        assert_eq!(resolve_destination(0x1e), Reg::UsrAddr);
        assert_eq!(resolve_source(0x1f), Reg::Data);
        assert_eq!(resolve_destination(0x1f), Reg::Data);
        assert_eq!(resolve_source(0x1c), resolve_destination(0x1c));
    }

    #[test]
    fn names() {
        assert_eq!(source_name(0x0a), "$0a");
        assert_eq!(source_name(0x1a), "$sp");
        assert_eq!(destination_name(0x1b), "$lr");
        assert_eq!(destination_name(0x1d), "$addr");
        assert_eq!(source_name(0x1e), "$regdata");
        assert_eq!(Reg::Carry.to_string(), "$carry");
    }
}
