use crate::ctrlregs::{ctrl_reg_name, pipe_reg_name, sqe_reg_name};
use crate::decoder::{Decoded, Generation, Op};
use crate::instructions::{describe, Form};
use crate::regs::{destination_name, source_name};

const MNEMONIC_COLUMN: usize = 10;

/// Renders one instruction; `addr` is its byte address, used for branch
/// targets.
pub fn fmt_decoded(d: &Decoded, addr: u32, gen: Generation) -> String {
    if d.is_invalid() {
        return format!("[{:08x}]", d.raw);
    }

    let desc = describe(d.op);
    let mut head = prefix(d);
    head.push_str(desc.mnemonic);
    let pad = MNEMONIC_COLUMN.saturating_sub(head.len()).max(1);

    let ops = operands(d, desc.form, addr, gen);
    if ops.is_empty() {
        head
    } else {
        format!("{head}{:pad$}{ops}", "")
    }
}

fn prefix(d: &Decoded) -> String {
    let mut s = String::new();
    if d.rep() {
        s.push_str("(rep)");
    }
    if d.sds != 0 {
        s.push_str(&format!("(sds{})", d.sds));
    }
    if d.xmov != 0 {
        s.push_str(&format!("(xmov{})", d.xmov));
    }
    if d.peek() {
        s.push_str("(peek)");
    }
    s
}

fn operands(d: &Decoded, form: Form, addr: u32, gen: Generation) -> String {
    let dst = destination_name(d.dst_enc);
    let src1 = source_name(d.src1_enc);
    let src2 = source_name(d.src2_enc);
    match form {
        Form::None | Form::Raw => String::new(),
        Form::Alu => {
            let rhs = if d.is_immed() { format!("{:#x}", d.imm) } else { src2.to_string() };
            if d.is_one_src() {
                format!("{dst}, {rhs}")
            } else {
                format!("{dst}, {src1}, {rhs}")
            }
        }
        Form::Unary => {
            if d.is_immed() {
                format!("{dst}, {:#x}", d.imm)
            } else {
                format!("{dst}, {src2}")
            }
        }
        Form::Mov => format!("{dst}, {src2}"),
        Form::MovImm => movi(d, gen),
        Form::BitImm => format!("{dst}, {src1}, b{}", d.bit),
        Form::Bitfield => format!("{dst}, {src1}, b{}, b{}", d.lo, d.hi),
        Form::CtrlWrite => format!("{src1}, [{src2} + {}]{}", ctrl_operand(d, gen), bang(d)),
        Form::CtrlRead => format!("{dst}, [{src1} + {}]{}", ctrl_operand(d, gen), bang(d)),
        Form::Store => format!("{src1}, [{src2} + {:#05x}]{}", d.imm, bang(d)),
        Form::Load => format!("{dst}, [{src1} + {:#05x}]{}", d.imm, bang(d)),
        Form::BranchImm => format!("{src1}, {:#x}, #{:#x}", d.imm, d.relative_target(addr)),
        Form::BranchBit => format!("{src1}, b{}, #{:#x}", d.bit, d.relative_target(addr)),
        Form::Relative => format!("#{:#x}", d.relative_target(addr)),
        Form::Absolute => format!("#{:#x}", d.absolute_target()),
        Form::Indirect => src1.to_string(),
        // skips the three instructions that follow
        Form::SetSecure => format!("$02, #{:#x}", addr.wrapping_add(16)),
    }
}

fn movi(d: &Decoded, gen: Generation) -> String {
    let mut s = format!("{}, {:#x}", destination_name(d.dst_enc), d.imm);
    if d.shift != 0 {
        s.push_str(&format!(" << {}", d.shift));
    }
    if d.dst_enc == 0x1d && d.shift >= 16 {
        // b18 disables auto-increment and is not part of the register id
        let val = d.imm.checked_shl(u32::from(d.shift)).unwrap_or(0) & !(1 << 18);
        if val & 0x00ff_ffff == 0 {
            if let Some(name) = pipe_reg_name(gen, val >> 24) {
                s.push_str(&format!("  ; |{name}"));
            }
        }
    }
    s
}

fn ctrl_operand(d: &Decoded, gen: Generation) -> String {
    let local = matches!(d.op, Op::SWrite | Op::SRead);
    let name = if local { sqe_reg_name(d.base) } else { ctrl_reg_name(gen, d.base) };
    match name {
        Some(n) if local => format!("%{n}"),
        Some(n) => format!("@{n}"),
        None => format!("{:#05x}", d.base),
    }
}

fn bang(d: &Decoded) -> &'static str {
    if d.preincrement() {
        "!"
    } else {
        ""
    }
}
