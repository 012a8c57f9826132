use afuc_rs::decoder::{Decoded, Decoder, Generation, Op};
use afuc_rs::il::{BinOp, CarryOp, Cond, Expr, Intrinsic, Stmt};
use afuc_rs::isa::afuc::AfucDecoder;
use afuc_rs::lift::lift;
use afuc_rs::regs::Reg;
use pretty_assertions::assert_eq;

fn enc_alu2(sub: u32, dst: u32, src1: u32, src2: u32) -> u32 {
    (0x13 << 27) | (src1 << 21) | (src2 << 16) | (dst << 11) | sub
}

fn enc_alu_imm(group: u32, dst: u32, src1: u32, imm: u32) -> u32 {
    (group << 27) | (src1 << 21) | (dst << 16) | (imm & 0xffff)
}

fn enc_br(top6: u32, src: u32, field: u32, off: i16) -> u32 {
    (top6 << 26) | (src << 21) | (field << 16) | (off as u16 as u32)
}

fn lift_word(gen: Generation, w: u32, addr: u32) -> Vec<Stmt> {
    let d: Decoded = AfucDecoder::new(gen).decode(w);
    lift(&d, addr, gen)
}

fn set(reg: Reg, value: Expr) -> Vec<Stmt> {
    vec![Stmt::SetReg { reg, value }]
}

#[test]
fn register_add() {
    assert_eq!(
        lift_word(Generation::Gen6, enc_alu2(0x01, 1, 2, 3), 0),
        set(Reg::R01, Expr::binary(BinOp::Add, Expr::reg(Reg::R02), Expr::reg(Reg::R03)))
    );
}

#[test]
fn immediate_sub_reads_zero_register_as_constant() {
    assert_eq!(
        lift_word(Generation::Gen6, enc_alu_imm(0x03, 4, 0, 0x10), 0),
        set(Reg::R04, Expr::binary(BinOp::Sub, Expr::konst(0), Expr::konst(0x10)))
    );
}

#[test]
fn write_to_zero_register_is_nop() {
    assert_eq!(lift_word(Generation::Gen6, enc_alu2(0x01, 0, 2, 3), 0), vec![Stmt::Nop]);
}

#[test]
fn min_max_cmp_are_intrinsics() {
    let g7 = Generation::Gen7;
    for (sub, intrinsic) in [(0x0a, Intrinsic::Min), (0x0b, Intrinsic::Max), (0x0d, Intrinsic::Cmp)] {
        assert_eq!(
            lift_word(g7, enc_alu2(sub, 1, 2, 3), 0),
            set(Reg::R01, Expr::intrinsic(intrinsic, vec![Expr::reg(Reg::R02), Expr::reg(Reg::R03)]))
        );
    }
    assert_eq!(
        lift_word(g7, enc_alu2(0x19, 1, 0, 3), 0),
        set(Reg::R01, Expr::intrinsic(Intrinsic::Msb, vec![Expr::reg(Reg::R03)]))
    );
}

#[test]
fn carry_ops_read_carry_pseudo_register() {
    assert_eq!(
        lift_word(Generation::Gen6, enc_alu2(0x02, 1, 2, 3), 0),
        set(
            Reg::R01,
            Expr::with_carry(CarryOp::AddCarry, Expr::reg(Reg::R02), Expr::reg(Reg::R03), Expr::reg(Reg::Carry))
        )
    );
    let stmts = lift_word(Generation::Gen6, enc_alu2(0x04, 1, 2, 3), 0);
    assert_eq!(stmts.len(), 1);
    assert!(stmts[0].to_string().starts_with("$01 = sbb($02, $03, $carry)"));
}

#[test]
fn bic_and_mul8() {
    assert_eq!(
        lift_word(Generation::Gen7, enc_alu2(0x09, 1, 2, 3), 0),
        set(Reg::R01, Expr::binary(BinOp::And, Expr::reg(Reg::R02), Expr::not(Expr::reg(Reg::R03))))
    );
    let mul8 = lift_word(Generation::Gen6, enc_alu2(0x0d, 1, 2, 3), 0);
    assert_eq!(mul8[0].to_string(), "$01 = (($02 & 0xff) * ($03 & 0xff))");
}

#[test]
fn mov_and_move_immediate() {
    assert_eq!(lift_word(Generation::Gen6, enc_alu2(0x06, 5, 0, 0x1f), 0), set(Reg::R05, Expr::reg(Reg::Data)));
    // mov $addr, 0x4 << 24
    let w = (0x11 << 27) | (24 << 21) | (0x1d << 16) | 0x4;
    assert_eq!(lift_word(Generation::Gen6, w, 0), set(Reg::Addr, Expr::konst(0x0400_0000)));
}

#[test]
fn not_immediate_and_register_forms() {
    assert_eq!(lift_word(Generation::Gen6, enc_alu_imm(0x08, 1, 0, 0xff), 0), set(Reg::R01, Expr::not(Expr::konst(0xff))));
    assert_eq!(lift_word(Generation::Gen6, enc_alu2(0x08, 1, 0, 2), 0), set(Reg::R01, Expr::not(Expr::reg(Reg::R02))));
}

#[test]
fn bit_set_clear_and_fields() {
    let g6 = Generation::Gen6;
    let setbit = (0x12 << 27) | (3 << 21) | (4 << 16) | (7 << 1) | 1;
    assert_eq!(
        lift_word(g6, setbit, 0),
        set(Reg::R04, Expr::binary(BinOp::Or, Expr::reg(Reg::R03), Expr::konst(0x80)))
    );
    assert_eq!(
        lift_word(g6, setbit & !1, 0),
        set(Reg::R04, Expr::binary(BinOp::And, Expr::reg(Reg::R03), Expr::konst(!0x80)))
    );

    let ubfx = (0x12 << 27) | (3 << 21) | (4 << 16) | (7 << 12) | (11 << 5) | 4;
    assert_eq!(
        lift_word(Generation::Gen7, ubfx, 0),
        set(
            Reg::R04,
            Expr::binary(BinOp::And, Expr::binary(BinOp::Lsr, Expr::reg(Reg::R03), Expr::konst(4)), Expr::konst(0xff))
        )
    );

    let setbit_r = enc_alu2(0x16, 1, 2, 3);
    assert_eq!(
        lift_word(Generation::Gen7, setbit_r, 0),
        set(
            Reg::R01,
            Expr::binary(BinOp::Or, Expr::reg(Reg::R02), Expr::binary(BinOp::Shl, Expr::konst(1), Expr::reg(Reg::R03)))
        )
    );
}

#[test]
fn memory_forms() {
    // store $05, [$06 + 0x010]! : write-back of the base is not lowered
    let st = (0x14 << 27) | (6 << 21) | (5 << 16) | (1 << 14) | 0x010;
    assert_eq!(
        lift_word(Generation::Gen6, st, 0),
        vec![Stmt::Store {
            addr: Expr::binary(BinOp::Add, Expr::reg(Reg::R06), Expr::konst(0x10)),
            value: Expr::reg(Reg::R05),
        }]
    );

    let ld = (0x16 << 27) | (6 << 21) | (5 << 16) | 0x008;
    assert_eq!(
        lift_word(Generation::Gen6, ld, 0),
        set(Reg::R05, Expr::load(Expr::binary(BinOp::Add, Expr::reg(Reg::R06), Expr::konst(8))))
    );

    // cwrite $data, [$00 + 0x024]
    let cw = (0x15 << 27) | (0x1f << 16) | 0x024;
    assert_eq!(
        lift_word(Generation::Gen6, cw, 0),
        vec![Stmt::Store {
            addr: Expr::binary(BinOp::Add, Expr::konst(0), Expr::konst(0x24)),
            value: Expr::reg(Reg::Data),
        }]
    );
}

#[test]
fn control_and_local_register_accesses() {
    let load = |base: u32| {
        set(Reg::R05, Expr::load(Expr::binary(BinOp::Add, Expr::reg(Reg::R06), Expr::konst(base))))
    };

    // cread $05, [$06 + 0x024]: group 0x16 on a5xx, 0x17 from a6xx on
    let cread5 = (0x16 << 27) | (6 << 21) | (5 << 16) | 0x024;
    let cread6 = (0x17 << 27) | (6 << 21) | (5 << 16) | 0x024;
    assert_eq!(AfucDecoder::new(Generation::Gen5).decode(cread5).op, Op::CRead);
    assert_eq!(AfucDecoder::new(Generation::Gen6).decode(cread6).op, Op::CRead);
    assert_eq!(lift_word(Generation::Gen5, cread5, 0), load(0x24));
    assert_eq!(lift_word(Generation::Gen6, cread6, 0), load(0x24));

    // sread $05, [$06 + 0x005]
    let sread = (0x17 << 27) | (6 << 21) | (5 << 16) | (1 << 15) | 0x005;
    for gen in [Generation::Gen6, Generation::Gen7] {
        assert_eq!(AfucDecoder::new(gen).decode(sread).op, Op::SRead);
        assert_eq!(lift_word(gen, sread, 0), load(0x05));
    }

    // swrite $05, [$06 + 0x005]
    let swrite = (0x15 << 27) | (6 << 21) | (5 << 16) | (1 << 15) | 0x005;
    assert_eq!(AfucDecoder::new(Generation::Gen6).decode(swrite).op, Op::SWrite);
    assert_eq!(
        lift_word(Generation::Gen6, swrite, 0),
        vec![Stmt::Store {
            addr: Expr::binary(BinOp::Add, Expr::reg(Reg::R06), Expr::konst(0x05)),
            value: Expr::reg(Reg::R05),
        }]
    );
}

#[test]
fn bitfield_insert_merges_into_destination() {
    // bfi $04, $03, b4, b11
    let w = (0x12 << 27) | (3 << 21) | (4 << 16) | (8 << 12) | (11 << 5) | 4;
    assert_eq!(AfucDecoder::new(Generation::Gen7).decode(w).op, Op::Bfi);
    assert_eq!(
        lift_word(Generation::Gen7, w, 0),
        set(
            Reg::R04,
            Expr::binary(
                BinOp::Or,
                Expr::binary(BinOp::And, Expr::reg(Reg::R04), Expr::konst(0xffff_f00f)),
                Expr::binary(
                    BinOp::And,
                    Expr::binary(BinOp::Shl, Expr::reg(Reg::R03), Expr::konst(4)),
                    Expr::konst(0x0000_0ff0),
                ),
            )
        )
    );
}

#[test]
fn conditional_branches_skip_the_delay_slot_when_not_taken() {
    let g6 = Generation::Gen6;
    // breq $02, 0x5, +3 at 0x100
    assert_eq!(
        lift_word(g6, enc_br(0x31, 2, 5, 3), 0x100),
        vec![Stmt::If {
            cond: Expr::compare(Cond::Eq, Expr::reg(Reg::R02), Expr::konst(5)),
            taken: 0x110,
            not_taken: 0x108,
        }]
    );

    // breq bit: taken when set
    let stmts = lift_word(g6, enc_br(0x33, 2, 4, 1), 0);
    let [Stmt::If { cond, .. }] = stmts.as_slice() else {
        panic!("expected a single If");
    };
    assert_eq!(cond.to_string(), "($02 & 0x10) != 0x0");
    // brne bit: taken when clear
    let stmts = lift_word(g6, enc_br(0x32, 2, 4, 1), 0);
    let [Stmt::If { cond, .. }] = stmts.as_slice() else {
        panic!("expected a single If");
    };
    assert_eq!(cond.to_string(), "($02 & 0x10) == 0x0");
}

#[test]
fn jumps_calls_returns() {
    let g7 = Generation::Gen7;
    assert_eq!(lift_word(g7, enc_br(0x32, 0, 0, -2), 0x40), vec![Stmt::Jump { target: Expr::ptr(0x3c) }]);
    assert_eq!(lift_word(g7, (0x35 << 26) | 0x20, 0), vec![Stmt::Call { target: Expr::ptr(0x80) }]);
    // bl: a call, with no $lr write
    assert_eq!(lift_word(g7, (0x38 << 26) | 0x20, 0), vec![Stmt::Call { target: Expr::ptr(0x80) }]);
    assert_eq!(lift_word(g7, (0x39 << 26) | 0x20, 0), vec![Stmt::Jump { target: Expr::ptr(0x80) }]);
    assert_eq!(
        lift_word(g7, (0x37 << 26) | (0x37 << 20) | 0x05, 0),
        vec![Stmt::Jump { target: Expr::reg(Reg::R05) }]
    );
    for w in [0x34 << 26, (0x34 << 26) | (1 << 25), 0x36 << 26] {
        assert_eq!(lift_word(g7, w, 0), vec![Stmt::Return { target: Expr::konst(0) }]);
    }
    assert_eq!(lift_word(g7, (0x37 << 26) | (0x36 << 20), 0), vec![Stmt::Return { target: Expr::reg(Reg::Lr) }]);
    assert_eq!(
        lift_word(g7, 0x3b << 26, 0),
        vec![Stmt::Intrinsic { intrinsic: Intrinsic::SetSecure, args: vec![Expr::reg(Reg::R02)] }]
    );
}

#[test]
fn nop_and_invalid() {
    assert_eq!(lift_word(Generation::Gen6, 0x0100_0000, 0), vec![Stmt::Nop]);
    let stmts = lift_word(Generation::Gen6, 0x3f << 26, 0);
    assert_eq!(stmts, vec![Stmt::Unimplemented]);
    assert!(stmts[0].is_unimplemented());
    // nothing after an undecodable word may be assumed to run
    assert!(stmts[0].is_terminator());
    assert!(!lift_word(Generation::Gen6, 0x0100_0000, 0)[0].is_terminator());
}

#[test]
fn every_lift_is_one_statement() {
    let mut w: u32 = 0xdead_beef;
    for _ in 0..20_000 {
        w ^= w << 13;
        w ^= w >> 17;
        w ^= w << 5;
        for gen in Generation::ALL {
            let stmts = lift_word(gen, w, 0x200);
            assert_eq!(stmts.len(), 1);
            let d = AfucDecoder::new(gen).decode(w);
            assert_eq!(stmts[0].is_unimplemented(), d.is_invalid(), "{w:#010x} on {gen}");
        }
    }
}
