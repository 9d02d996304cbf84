use crate::decoder::{Instruction, Op, Reg};

/// Renders a record back to canonical assembly text.
pub fn fmt_instruction(d: &Instruction) -> String {
    let mn = d.op.mnemonic();
    match d.op {
        Op::Addi | Op::Slli => format!("{mn} {}, {}, {}", r(d.rd), r(d.rs1), d.imm),
        Op::Add | Op::Sub | Op::Mul | Op::Sll => {
            format!("{mn} {}, {}, {}", r(d.rd), r(d.rs1), r(d.rs2))
        }
        Op::Lw | Op::Sw => format!("{mn} {}, {}({})", r(d.rd), d.imm, r(d.rs1)),
        Op::Beq | Op::Bne => match &d.target {
            Some(label) => format!("{mn} {}, {}, {label}", r(d.rs1), r(d.rs2)),
            None => format!("{mn} {}, {}, {}", r(d.rs1), r(d.rs2), d.imm),
        },
        Op::Ecall => mn.to_string(),
    }
}

fn r(reg: Option<Reg>) -> Reg {
    reg.unwrap_or(Reg::ZERO)
}
