//! AFUC instruction decoder (a5xx, a6xx, a7xx).
//!
//! Word layout, little-endian:
//!
//! * bits 30..31 == `11`: control flow, bits 26..31 are the opcode.
//! * otherwise bit 26 is `(rep)` and bits 27..31 select the opcode group.
//!
//! Fields set per operation (everything else stays zero):
//!
//! | op                         | fields                                              |
//! |----------------------------|-----------------------------------------------------|
//! | nop                        | `nop_payload`                                       |
//! | 2-src ALU, mov             | `dst`, `src1`, `src2`, `peek`, `xmov`, `ONE_SRC`    |
//! | imm ALU                    | `dst`, `src1`, `imm`, `IMMED`, `ONE_SRC`            |
//! | mov imm                    | `dst`, `imm`, `shift`, `IMMED`                      |
//! | setbit/clrbit              | `dst`, `src1`, `bit`                                |
//! | ubfx/bfi                   | `dst`, `src1`, `lo`, `hi`                           |
//! | store                      | `src1` (value), `src2` (base), `imm`, `PREINCREMENT`|
//! | load                       | `dst`, `src1` (base), `imm`, `PREINCREMENT`         |
//! | cwrite/swrite              | `src1` (value), `src2` (base), `base`, `sds`, `PREINCREMENT` |
//! | cread/sread                | `dst`, `src1` (base), `base`, `PREINCREMENT`        |
//! | brne/breq imm              | `src1`, `imm`, `branch_offset`, `IMMED`             |
//! | brne/breq bit, jump        | `src1`, `bit`, `branch_offset`                      |
//! | call, bl, jumpa            | `branch_target`                                     |
//! | jump (indirect)            | `src1`                                              |

use bitvec::prelude::*;

use crate::decoder::{Decoded, Decoder, Generation, Modifiers, Op};
use crate::isa::tables::{alu_2src, alu_imm};
use crate::regs::{resolve_destination, resolve_source};

#[inline]
fn field(w: u32, lo: usize, width: usize) -> u32 {
    w.view_bits::<Lsb0>()[lo..lo + width].load_le::<u32>()
}

#[inline]
fn reg_field(w: u32, lo: usize) -> u8 {
    field(w, lo, 5) as u8
}

#[inline]
fn flag(w: u32, bit: usize) -> bool {
    w.view_bits::<Lsb0>()[bit]
}

/// Two's-complement sign extension over exactly `bits` bits.
#[inline]
pub fn sign_extend(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}

pub struct AfucDecoder {
    gen: Generation,
}

impl AfucDecoder {
    pub fn new(gen: Generation) -> Self {
        Self { gen }
    }

    pub fn generation(&self) -> Generation {
        self.gen
    }

    fn flow(&self, w: u32, top6: u32) -> Decoded {
        let mut d = Decoded { raw: w, ..Decoded::default() };
        match top6 {
            0x30 | 0x31 => {
                d.op = if top6 == 0x30 { Op::BrneImm } else { Op::BreqImm };
                set_src1(&mut d, reg_field(w, 21));
                d.imm = field(w, 16, 5);
                d.branch_offset = sign_extend(field(w, 0, 16), 16);
                d.flags |= Modifiers::IMMED;
            }
            0x32 | 0x33 => {
                let src = reg_field(w, 21);
                let bit = field(w, 16, 5) as u8;
                d.op = match top6 {
                    // b0 of $00 is never set, so this always branches
                    0x32 if src == 0 && bit == 0 => Op::Jump,
                    0x32 => Op::BrneBit,
                    _ => Op::BreqBit,
                };
                set_src1(&mut d, src);
                d.bit = bit;
                d.branch_offset = sign_extend(field(w, 0, 16), 16);
            }
            0x34 => d.op = if flag(w, 25) { Op::Iret } else { Op::Ret },
            0x35 => {
                d.op = Op::Call;
                d.branch_target = field(w, 0, 26);
            }
            0x36 => d.op = Op::WaitIn,
            0x37 => match field(w, 20, 6) {
                0x37 => {
                    d.op = Op::JumpR;
                    set_src1(&mut d, reg_field(w, 0));
                }
                0x36 => d.op = Op::SRet,
                _ => return Decoded::invalid(w),
            },
            0x38 => {
                d.op = Op::Bl;
                d.branch_target = field(w, 0, 26);
            }
            0x39 if self.gen >= Generation::Gen7 => {
                d.op = Op::JumpA;
                d.branch_target = field(w, 0, 26);
            }
            0x3b => d.op = Op::SetSecure,
            _ => return Decoded::invalid(w),
        }
        d
    }

    fn two_src(&self, w: u32, mut d: Decoded) -> Decoded {
        let entry = alu_2src(self.gen)[field(w, 0, 5) as usize];
        if !entry.is_valid() {
            return Decoded::invalid(w);
        }
        d.flags.set(Modifiers::PEEK, flag(w, 8));
        d.xmov = field(w, 9, 2) as u8;
        set_dst(&mut d, reg_field(w, 11));
        set_src2(&mut d, reg_field(w, 16));
        set_src1(&mut d, reg_field(w, 21));
        if entry.op == Op::Or && d.src1_enc == 0 {
            d.op = Op::Mov;
            d.flags |= Modifiers::ONE_SRC;
        } else {
            d.op = entry.op;
            d.flags.set(Modifiers::ONE_SRC, entry.nsrc == 1);
        }
        d
    }

    fn bit_ops(&self, w: u32, mut d: Decoded) -> Decoded {
        set_src1(&mut d, reg_field(w, 21));
        set_dst(&mut d, reg_field(w, 16));
        if self.gen >= Generation::Gen7 {
            match field(w, 12, 4) {
                sel @ 0x2..=0x5 => {
                    d.op = match sel {
                        0x2 => Op::Shl,
                        0x3 => Op::Ushr,
                        0x4 => Op::Ishr,
                        _ => Op::Rot,
                    };
                    d.imm = field(w, 0, 12);
                    d.flags |= Modifiers::IMMED;
                    return d;
                }
                sel @ (0x7 | 0x8) => {
                    d.op = if sel == 0x7 { Op::Ubfx } else { Op::Bfi };
                    d.lo = field(w, 0, 5) as u8;
                    d.hi = field(w, 5, 5) as u8;
                    return d;
                }
                // 0x6 and unknown selectors use the a6xx setbit/clrbit layout
                _ => {}
            }
        }
        d.bit = field(w, 1, 5) as u8;
        d.op = if flag(w, 0) { Op::SetBit } else { Op::ClrBit };
        d
    }
}

fn set_dst(d: &mut Decoded, enc: u8) {
    d.dst_enc = enc;
    d.dst = resolve_destination(enc);
}

fn set_src1(d: &mut Decoded, enc: u8) {
    d.src1_enc = enc;
    d.src1 = resolve_source(enc);
}

fn set_src2(d: &mut Decoded, enc: u8) {
    d.src2_enc = enc;
    d.src2 = resolve_source(enc);
}

impl Decoder for AfucDecoder {
    fn decode(&self, raw32: u32) -> Decoded {
        let w = raw32;
        let top6 = field(w, 26, 6);
        if top6 >> 4 == 0b11 {
            return self.flow(w, top6);
        }

        let group = field(w, 27, 5);
        let mut d = Decoded { raw: w, ..Decoded::default() };
        d.flags.set(Modifiers::REP, flag(w, 26));
        let gen = self.gen;

        match group {
            0x00 => {
                d.op = Op::Nop;
                d.nop_payload = field(w, 0, 24);
            }
            0x13 => return self.two_src(w, d),
            0x12 => return self.bit_ops(w, d),
            0x11 if gen <= Generation::Gen6 => movi(w, &mut d),
            0x0e if gen >= Generation::Gen7 => movi(w, &mut d),
            0x14 => {
                d.op = Op::Store;
                d.imm = field(w, 0, 12);
                d.flags.set(Modifiers::PREINCREMENT, flag(w, 14));
                set_src1(&mut d, reg_field(w, 16));
                set_src2(&mut d, reg_field(w, 21));
            }
            0x15 => {
                d.base = field(w, 0, 12);
                d.sds = field(w, 12, 2) as u8;
                d.flags.set(Modifiers::PREINCREMENT, flag(w, 14));
                set_src1(&mut d, reg_field(w, 16));
                set_src2(&mut d, reg_field(w, 21));
                d.op = if gen >= Generation::Gen6 && flag(w, 15) && d.sds == 0 {
                    Op::SWrite
                } else {
                    Op::CWrite
                };
            }
            0x16 if gen >= Generation::Gen6 => {
                if flag(w, 15) {
                    return Decoded::invalid(w);
                }
                d.op = Op::Load;
                d.imm = field(w, 0, 12);
                d.flags.set(Modifiers::PREINCREMENT, flag(w, 14));
                set_dst(&mut d, reg_field(w, 16));
                set_src1(&mut d, reg_field(w, 21));
            }
            // a5xx reads control registers through this group
            0x16 => {
                d.op = Op::CRead;
                d.base = field(w, 0, 12);
                d.flags.set(Modifiers::PREINCREMENT, flag(w, 14));
                set_dst(&mut d, reg_field(w, 16));
                set_src1(&mut d, reg_field(w, 21));
            }
            0x17 if gen >= Generation::Gen6 => {
                d.op = if flag(w, 15) { Op::SRead } else { Op::CRead };
                d.base = field(w, 0, 12);
                d.flags.set(Modifiers::PREINCREMENT, flag(w, 14));
                set_dst(&mut d, reg_field(w, 16));
                set_src1(&mut d, reg_field(w, 21));
            }
            0x01..=0x10 if alu_imm(gen)[group as usize].is_valid() => {
                let entry = alu_imm(gen)[group as usize];
                d.op = entry.op;
                d.imm = field(w, 0, 16);
                set_dst(&mut d, reg_field(w, 16));
                set_src1(&mut d, reg_field(w, 21));
                d.flags |= Modifiers::IMMED;
                d.flags.set(Modifiers::ONE_SRC, entry.nsrc == 1);
            }
            _ => {
                tracing::debug!(raw = w, group, %gen, "unrecognised opcode group");
                return Decoded::invalid(w);
            }
        }
        d
    }
}

fn movi(w: u32, d: &mut Decoded) {
    d.op = Op::MovImm;
    d.imm = field(w, 0, 16);
    set_dst(d, reg_field(w, 16));
    d.shift = field(w, 21, 5) as u8;
    d.flags |= Modifiers::IMMED;
}
