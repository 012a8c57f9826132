//! Architecture-neutral IR produced by the lifter.
//!
//! Every value is [`REG_SIZE`](crate::regs::REG_SIZE) bytes wide, so expressions carry no size.
//! Control-flow targets in [`Stmt::If`] are byte addresses.

use std::fmt;

use serde::Serialize;

use crate::regs::Reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Shl,
    Lsr,
    Asr,
    Rol,
    Mul,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::Shl => "<<",
            BinOp::Lsr => "u>>",
            BinOp::Asr => "s>>",
            BinOp::Rol => "rol",
            BinOp::Mul => "*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryOp {
    AddCarry,
    SubBorrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cond {
    Eq,
    Ne,
}

/// Operations with no direct IR equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intrinsic {
    Min,
    Max,
    Cmp,
    Msb,
    SetSecure,
}

impl Intrinsic {
    pub const ALL: [Intrinsic; 5] = [
        Intrinsic::Min,
        Intrinsic::Max,
        Intrinsic::Cmp,
        Intrinsic::Msb,
        Intrinsic::SetSecure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Min => "min",
            Intrinsic::Max => "max",
            Intrinsic::Cmp => "cmp",
            Intrinsic::Msb => "msb",
            Intrinsic::SetSecure => "setsecure",
        }
    }

    /// Parameter names, all unsigned 32-bit.
    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            Intrinsic::Min | Intrinsic::Max | Intrinsic::Cmp => &["a", "b"],
            Intrinsic::Msb => &["val"],
            Intrinsic::SetSecure => &["mode"],
        }
    }

    /// Number of 32-bit results.
    pub fn outputs(self) -> usize {
        match self {
            Intrinsic::SetSecure => 0,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    Const { value: u32 },
    ConstPtr { value: u32 },
    Reg { reg: Reg },
    Not { a: Box<Expr> },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    WithCarry { op: CarryOp, lhs: Box<Expr>, rhs: Box<Expr>, carry: Box<Expr> },
    Compare { cond: Cond, lhs: Box<Expr>, rhs: Box<Expr> },
    Load { addr: Box<Expr> },
    Intrinsic { intrinsic: Intrinsic, args: Vec<Expr> },
}

impl Expr {
    pub fn konst(value: u32) -> Self {
        Expr::Const { value }
    }

    pub fn ptr(value: u32) -> Self {
        Expr::ConstPtr { value }
    }

    pub fn reg(reg: Reg) -> Self {
        Expr::Reg { reg }
    }

    pub fn not(a: Expr) -> Self {
        Expr::Not { a: Box::new(a) }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn with_carry(op: CarryOp, lhs: Expr, rhs: Expr, carry: Expr) -> Self {
        Expr::WithCarry { op, lhs: Box::new(lhs), rhs: Box::new(rhs), carry: Box::new(carry) }
    }

    pub fn compare(cond: Cond, lhs: Expr, rhs: Expr) -> Self {
        Expr::Compare { cond, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn load(addr: Expr) -> Self {
        Expr::Load { addr: Box::new(addr) }
    }

    pub fn intrinsic(intrinsic: Intrinsic, args: Vec<Expr>) -> Self {
        Expr::Intrinsic { intrinsic, args }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stmt {
    Nop,
    SetReg { reg: Reg, value: Expr },
    Store { addr: Expr, value: Expr },
    If { cond: Expr, taken: u32, not_taken: u32 },
    Jump { target: Expr },
    Call { target: Expr },
    Return { target: Expr },
    Intrinsic { intrinsic: Intrinsic, args: Vec<Expr> },
    Unimplemented,
}

impl Stmt {
    /// Ends a basic block. `Unimplemented` is a hard stop: nothing after it
    /// is known to execute.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Stmt::If { .. } | Stmt::Jump { .. } | Stmt::Return { .. } | Stmt::Unimplemented
        )
    }

    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Stmt::Unimplemented)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, name: &str, args: &[Expr]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{a}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const { value } | Expr::ConstPtr { value } => write!(f, "{value:#x}"),
            Expr::Reg { reg } => write!(f, "{reg}"),
            Expr::Not { a } => write!(f, "~{a}"),
            Expr::Binary { op: BinOp::Rol, lhs, rhs } => write!(f, "rol({lhs}, {rhs})"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Expr::WithCarry { op, lhs, rhs, carry } => {
                let name = match op {
                    CarryOp::AddCarry => "adc",
                    CarryOp::SubBorrow => "sbb",
                };
                write!(f, "{name}({lhs}, {rhs}, {carry})")
            }
            Expr::Compare { cond: Cond::Eq, lhs, rhs } => write!(f, "{lhs} == {rhs}"),
            Expr::Compare { cond: Cond::Ne, lhs, rhs } => write!(f, "{lhs} != {rhs}"),
            Expr::Load { addr } => write!(f, "[{addr}].d"),
            Expr::Intrinsic { intrinsic, args } => write_args(f, intrinsic.name(), args),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Nop => f.write_str("nop"),
            Stmt::SetReg { reg, value } => write!(f, "{reg} = {value}"),
            Stmt::Store { addr, value } => write!(f, "[{addr}].d = {value}"),
            Stmt::If { cond, taken, not_taken } => {
                write!(f, "if ({cond}) then {taken:#x} else {not_taken:#x}")
            }
            Stmt::Jump { target } => write!(f, "jump({target})"),
            Stmt::Call { target } => write!(f, "call({target})"),
            Stmt::Return { target } => write!(f, "return {target}"),
            Stmt::Intrinsic { intrinsic, args } => write_args(f, intrinsic.name(), args),
            Stmt::Unimplemented => f.write_str("unimplemented"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = Expr::binary(BinOp::Add, Expr::reg(Reg::R01), Expr::konst(4));
        assert_eq!(e.to_string(), "($01 + 0x4)");
        let s = Stmt::SetReg { reg: Reg::R02, value: Expr::load(e) };
        assert_eq!(s.to_string(), "$02 = [($01 + 0x4)].d");
        let s = Stmt::If {
            cond: Expr::compare(Cond::Ne, Expr::reg(Reg::R03), Expr::konst(0)),
            taken: 0x10,
            not_taken: 0x8,
        };
        assert_eq!(s.to_string(), "if ($03 != 0x0) then 0x10 else 0x8");
        let s = Stmt::Intrinsic { intrinsic: Intrinsic::SetSecure, args: vec![Expr::reg(Reg::R02)] };
        assert_eq!(s.to_string(), "setsecure($02)");
    }

    #[test]
    fn intrinsic_signatures() {
        for i in Intrinsic::ALL {
            assert!(!i.name().is_empty());
        }
        assert_eq!(Intrinsic::Min.inputs(), ["a", "b"]);
        assert_eq!(Intrinsic::Msb.inputs(), ["val"]);
        assert_eq!(Intrinsic::SetSecure.outputs(), 0);
        assert_eq!(Intrinsic::Cmp.outputs(), 1);
    }

    #[test]
    fn serializes_tagged() {
        let s = Stmt::SetReg { reg: Reg::R01, value: Expr::konst(1) };
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"type":"set_reg","reg":"R01","value":{"type":"const","value":1}}"#);
    }

    #[test]
    fn terminators() {
        assert!(Stmt::Return { target: Expr::konst(0) }.is_terminator());
        assert!(!Stmt::Call { target: Expr::ptr(0) }.is_terminator());
        assert!(!Stmt::Nop.is_terminator());
        assert!(Stmt::Unimplemented.is_unimplemented());
        assert!(Stmt::Unimplemented.is_terminator());
    }
}
