use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tomasulo_rust::engine::instruction::Instruction;
use tomasulo_rust::engine::simulator::Simulator;
use tomasulo_rust::utils::parser::parse_program;
use tomasulo_rust::TomasuloConfig;

fn create_test_program() -> Vec<Instruction> {
    let source = "ADDI R1, R0, 10\n\
                  ADDI R2, R0, 20\n\
                  ADD R3, R1, R2\n\
                  MUL R4, R3, R2\n\
                  SW R4, 0(R0)\n\
                  LW R5, 0(R0)\n\
                  SUB R6, R5, R1\n";
    let (program, errors) = parse_program(source);
    assert!(errors.is_empty());
    program
}

fn create_dependency_chain(length: usize) -> Vec<Instruction> {
    let mut source = String::from("ADDI R1, R0, 1\n");
    for _ in 0..length {
        source.push_str("ADD R1, R1, R1\n");
    }
    let (program, errors) = parse_program(&source);
    assert!(errors.is_empty());
    program
}

fn parser_benchmark(c: &mut Criterion) {
    let source = "ADDI R1, R0, 10\n\
                  MUL R2, R1, R1\n\
                  SW R2, 4(R0)\n\
                  BEQ R1, R2, 2\n"
        .repeat(64);

    c.bench_function("parse_program", |b| {
        b.iter(|| {
            let (program, _) = parse_program(black_box(&source));
            black_box(program.len());
        });
    });
}

fn engine_benchmark(c: &mut Criterion) {
    let program = create_test_program();

    c.bench_function("engine_mixed_program", |b| {
        b.iter(|| {
            let mut simulator = Simulator::new(program.clone(), TomasuloConfig::new());
            simulator.run().expect("simulation failed");
            black_box(simulator.cycle_count());
        });
    });
}

fn dependency_chain_benchmark(c: &mut Criterion) {
    let program = create_dependency_chain(128);

    c.bench_function("engine_raw_dependency_chain", |b| {
        b.iter(|| {
            let mut simulator = Simulator::new(program.clone(), TomasuloConfig::new());
            simulator.run().expect("simulation failed");
            black_box(simulator.registers().read(1));
        });
    });
}

criterion_group!(
    benches,
    parser_benchmark,
    engine_benchmark,
    dependency_chain_benchmark
);
criterion_main!(benches);
