use rv32_sim::disasm::fmt_instruction;
use rv32_sim::{AsmConfig, Assembler, LinearMemory};

#[test]
fn listing_text_round_trips_through_the_assembler() {
    let src = ".text
        addi x5, x0, 100
        add x1, x2, x3
        sub x1, x2, x3
        mul x1, x2, x3
        sll x1, x2, x3
        sll x1, x2, 4
        lw x5, -8(x6)
        sw x5, 12(x6)
        li x7, -1
        loop: beq x1, x2, loop
        bne x1, x2, -3
        ecall";
    let mut mem = LinearMemory::new(64);
    let prog = Assembler::new(AsmConfig::default()).assemble(src, &mut mem);
    let text: Vec<String> = prog.instructions().iter().map(fmt_instruction).collect();
    assert_eq!(
        text,
        vec![
            "addi x5, x0, 100",
            "add x1, x2, x3",
            "sub x1, x2, x3",
            "mul x1, x2, x3",
            "sll x1, x2, x3",
            "slli x1, x2, 4",
            "lw x5, -8(x6)",
            "sw x5, 12(x6)",
            "addi x7, x0, -1",
            "beq x1, x2, loop",
            "bne x1, x2, -3",
            "ecall",
        ]
    );
}
