use crate::decoder::Op;

/// Operand pattern a mnemonic is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// `rd, rs1, imm`
    RegRegImm,
    /// `rd, rs1, rs2`
    RegRegReg,
    /// `rd, rs1, rs2|imm`; the numeric form becomes `slli`
    Shift,
    /// `rd, offset(rs1)`
    Mem,
    /// `rd, imm`; expands to `addi rd, x0, imm`
    LoadImm,
    /// `rs1, rs2, label|offset`
    Branch,
    None,
}

impl Form {
    pub fn syntax(self) -> &'static str {
        match self {
            Form::RegRegImm => "rd, rs1, imm",
            Form::RegRegReg => "rd, rs1, rs2",
            Form::Shift => "rd, rs1, rs2|imm",
            Form::Mem => "rd, offset(rs1)",
            Form::LoadImm => "rd, imm",
            Form::Branch => "rs1, rs2, label|offset",
            Form::None => "",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub form: Form,
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc {
        op: Op::Addi,
        mnemonic: "addi",
        form: Form::RegRegImm,
    },
    InstrDesc {
        op: Op::Add,
        mnemonic: "add",
        form: Form::RegRegReg,
    },
    InstrDesc {
        op: Op::Sub,
        mnemonic: "sub",
        form: Form::RegRegReg,
    },
    InstrDesc {
        op: Op::Mul,
        mnemonic: "mul",
        form: Form::RegRegReg,
    },
    InstrDesc {
        op: Op::Sll,
        mnemonic: "sll",
        form: Form::Shift,
    },
    InstrDesc {
        op: Op::Lw,
        mnemonic: "lw",
        form: Form::Mem,
    },
    InstrDesc {
        op: Op::Sw,
        mnemonic: "sw",
        form: Form::Mem,
    },
    InstrDesc {
        op: Op::Addi,
        mnemonic: "li",
        form: Form::LoadImm,
    },
    InstrDesc {
        op: Op::Beq,
        mnemonic: "beq",
        form: Form::Branch,
    },
    InstrDesc {
        op: Op::Bne,
        mnemonic: "bne",
        form: Form::Branch,
    },
    InstrDesc {
        op: Op::Ecall,
        mnemonic: "ecall",
        form: Form::None,
    },
];

pub fn lookup(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic)
}
