use rv32_sim::exec::IntExecutor;
use rv32_sim::{AsmConfig, Assembler, Cpu, LinearMemory, Program, Reg, SimConfig, Simulator, Status};

fn x(n: u8) -> Reg {
    Reg::new(n).unwrap()
}

fn assemble(src: &str) -> (Program, LinearMemory) {
    let mut mem = LinearMemory::new(1024);
    let prog = Assembler::new(AsmConfig::default()).assemble(src, &mut mem);
    (prog, mem)
}

fn run(src: &str) -> Simulator {
    let mut sim = Simulator::new(SimConfig::default());
    sim.load_source(src);
    sim.run();
    sim
}

#[test]
fn beq_to_label_jumps_to_bound_index() {
    let (prog, mut mem) = assemble(
        ".text
         beq x0, x0, target
         li x1, 1
         li x1, 2
         target:
         li x2, 3",
    );
    let mut cpu = Cpu::new();
    cpu.step(&mut mem, &prog, &IntExecutor);
    assert_eq!(cpu.pc, 3);
    assert_eq!(prog.labels().get("target"), Some(3));
}

#[test]
fn numeric_offset_is_relative_to_next_instruction() {
    let (prog, mut mem) = assemble(
        ".text
         li x1, 5
         bne x1, x0, 2
         li x2, 1
         li x2, 2
         li x3, 3",
    );
    let mut cpu = Cpu::new();
    cpu.step(&mut mem, &prog, &IntExecutor);
    cpu.step(&mut mem, &prog, &IntExecutor);
    // index 1 + 1 + 2
    assert_eq!(cpu.pc, 4);
}

#[test]
fn not_taken_branch_falls_through() {
    let (prog, mut mem) = assemble(
        ".text
         li x1, 1
         beq x1, x0, away
         bne x1, x1, -2
         away:",
    );
    let mut cpu = Cpu::new();
    for expected in [1, 2, 3] {
        cpu.step(&mut mem, &prog, &IntExecutor);
        assert_eq!(cpu.pc, expected);
    }
}

#[test]
fn forward_reference_counts_loop() {
    let sim = run(
        ".text
             li x1, 0
             li x2, 5
         loop:
             beq x1, x2, done
             addi x1, x1, 1
             add x3, x3, x1
             beq x0, x0, loop
         done:
             ecall",
    );
    assert_eq!(sim.status(), Status::Halted);
    assert_eq!(sim.register(x(1)), 5);
    assert_eq!(sim.register(x(3)), 15);
}

#[test]
fn backward_numeric_offset_loop() {
    let sim = run(
        ".text
         li x1, 3
         addi x1, x1, -1
         addi x2, x2, 10
         bne x1, x0, -3
         ecall",
    );
    assert_eq!(sim.register(x(1)), 0);
    assert_eq!(sim.register(x(2)), 30);
}

#[test]
fn undefined_label_silently_falls_through() {
    let sim = run(
        ".text
         beq x0, x0, missing
         li x1, 42",
    );
    assert_eq!(sim.status(), Status::Exhausted);
    assert_eq!(sim.register(x(1)), 42);
}

#[test]
fn branch_past_end_exhausts() {
    let sim = run(
        ".text
         beq x0, x0, 10
         li x1, 1",
    );
    assert_eq!(sim.status(), Status::Exhausted);
    assert_eq!(sim.pc(), 11);
    assert_eq!(sim.register(x(1)), 0);
}

#[test]
fn branch_before_start_exhausts() {
    let sim = run(
        ".text
         li x1, 1
         beq x0, x0, -5
         li x1, 2",
    );
    assert_eq!(sim.status(), Status::Exhausted);
    assert_eq!(sim.register(x(1)), 1);
}

#[test]
fn label_to_end_of_program_exhausts() {
    let sim = run(
        ".text
         bne x0, x1, end
         li x2, 1
         beq x0, x0, end
         li x2, 2
         end:",
    );
    assert_eq!(sim.status(), Status::Exhausted);
    assert_eq!(sim.register(x(2)), 1);
}

#[test]
fn bounded_run_stops_infinite_loop() {
    let mut sim = Simulator::new(SimConfig::default());
    sim.load_source(".text\nspin: beq x0, x0, spin");
    let summary = sim.run_bounded(1000);
    assert_eq!(summary.steps, 1000);
    assert_eq!(summary.status, Status::Running);
    assert_eq!(sim.pc(), 0);
}
