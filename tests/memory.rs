use rv32_sim::exec::IntExecutor;
use rv32_sim::{AsmConfig, Assembler, Bus, Cpu, LinearMemory, Reg, SimConfig, Simulator};

fn x(n: u8) -> Reg {
    Reg::new(n).unwrap()
}

fn run(src: &str) -> Simulator {
    let mut sim = Simulator::new(SimConfig::default());
    sim.load_source(src);
    sim.run();
    sim
}

#[test]
fn word_directive_layout() {
    let mut mem = LinearMemory::new(1024);
    let prog = Assembler::new(AsmConfig::default()).assemble(".data\nA:\n.word 10,20,30", &mut mem);

    assert_eq!(prog.data_labels().get("A"), Some(32));
    assert_eq!(&mem.mem[32..44], &[10, 0, 0, 0, 20, 0, 0, 0, 30, 0, 0, 0]);
}

#[test]
fn store_then_load_round_trips() {
    // aligned, unaligned and the last in-bounds word
    for addr in [32u32, 33, 35, 510, 1020] {
        let src = format!(
            ".text
             li x1, {addr}
             li x2, -123456789
             sw x2, 0(x1)
             lw x3, 0(x1)"
        );
        let sim = run(&src);
        assert_eq!(sim.register(x(3)), -123456789, "address {addr}");
        assert_eq!(sim.load_word(addr), -123456789, "address {addr}");
    }
}

#[test]
fn store_writes_little_endian_bytes() {
    let sim = run(
        ".text
         li x1, 0x11223344
         sw x1, 64(x0)",
    );
    assert_eq!(&sim.memory().mem[64..68], &[0x44, 0x33, 0x22, 0x11]);
}

#[test]
fn effective_address_adds_signed_offset() {
    let sim = run(
        ".data
         arr: .word 5, 6, 7
         .text
         li x1, 44
         lw x2, -8(x1)
         lw x3, -4(x1)
         addi x4, x0, 32
         lw x5, (x4)",
    );
    assert_eq!(sim.register(x(2)), 6);
    assert_eq!(sim.register(x(3)), 7);
    assert_eq!(sim.register(x(5)), 5);
}

#[test]
fn out_of_range_accesses_are_not_fatal() {
    let sim = run(
        ".text
         li x1, 99
         li x5, 1021
         sw x1, 0(x5)
         lw x1, 0(x5)
         li x6, -4
         lw x7, 0(x6)
         li x2, 5",
    );
    // store dropped, load yields zero, execution continued
    assert_eq!(sim.register(x(1)), 0);
    assert_eq!(sim.register(x(7)), 0);
    assert_eq!(sim.register(x(2)), 5);
    assert!(sim.memory().mem.iter().all(|&b| b == 0));
}

#[test]
fn step_level_store_uses_rd_as_source() {
    let mut mem = LinearMemory::new(128);
    let prog = Assembler::new(AsmConfig::default()).assemble(".text\nsw x4, 8(x3)", &mut mem);
    let mut cpu = Cpu::new();
    cpu.regs.write(x(3), 100);
    cpu.regs.write(x(4), -2);

    cpu.step(&mut mem, &prog, &IntExecutor);
    assert_eq!(mem.read_u32(108).unwrap(), 0xFFFF_FFFE);
    assert_eq!(cpu.regs.read(x(4)), -2);
}

#[test]
fn memory_window_is_clipped() {
    let sim = run(".data\n.word 1, 2");
    let window = sim.memory_window(32, 8);
    assert_eq!(window, vec![(32, 1), (36, 2)]);
    assert_eq!(sim.memory_window(1016, 96).len(), 2);
    assert!(sim.memory_window(2048, 4).is_empty());
}

#[test]
fn smaller_configured_memory() {
    let mut sim = Simulator::new(SimConfig {
        mem_size: 64,
        data_base: 16,
    });
    sim.load_source(
        ".data
         v: .word 3
         .text
         lw x1, 16(x0)
         sw x1, 60(x0)
         sw x1, 61(x0)",
    );
    sim.run();
    assert_eq!(sim.program().data_labels().get("v"), Some(16));
    assert_eq!(sim.register(x(1)), 3);
    assert_eq!(sim.load_word(60), 3);
    assert_eq!(sim.memory().capacity(), 64);
}
