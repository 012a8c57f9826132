pub mod ctrlregs;
pub mod decoder;
pub mod disasm;
pub mod firmware;
pub mod flow;
pub mod il;
pub mod instructions;
pub mod lift;
pub mod regs;

pub mod isa {
    pub mod afuc; // a5xx/a6xx/a7xx encodings
    pub mod tables;
}

pub use decoder::{decode, nop_word, DecodeError, Decoded, Decoder, Generation, Modifiers, Op};
pub use disasm::fmt_decoded;
pub use firmware::{Firmware, FirmwareError};
pub use flow::{instruction_info, Branch, BranchKind, InstructionInfo};
pub use isa::afuc::AfucDecoder;
pub use lift::{lift, AfucLifter, Lifter};
pub use regs::Reg;
