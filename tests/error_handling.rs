// tests/error_handling.rs
use tomasulo_rust::engine::instruction::Opcode;
use tomasulo_rust::errors::SimulatorError;
use tomasulo_rust::utils::parser::{parse_line, parse_program};

/// Parser error reporting and per-line recovery

#[test]
fn test_parse_r_type() {
    let instr = parse_line("ADD R1, R2, R3").unwrap();
    assert_eq!(instr.opcode, Opcode::Add);
    assert_eq!(instr.rd, Some(1));
    assert_eq!(instr.r1, Some(2));
    assert_eq!(instr.r2, Some(3));
    assert_eq!(instr.imm, None);
}

#[test]
fn test_parse_addi() {
    let instr = parse_line("ADDI R1, R2, 10").unwrap();
    assert_eq!(instr.opcode, Opcode::Addi);
    assert_eq!(instr.rd, Some(1));
    assert_eq!(instr.r1, Some(2));
    assert_eq!(instr.imm, Some(10));
}

#[test]
fn test_parse_negative_immediate() {
    let instr = parse_line("ADDI R1, R1, -1").unwrap();
    assert_eq!(instr.imm, Some(-1));
}

#[test]
fn test_parse_branch() {
    let instr = parse_line("BEQ R1, R2, 8").unwrap();
    assert_eq!(instr.opcode, Opcode::Beq);
    assert_eq!(instr.r1, Some(1));
    assert_eq!(instr.r2, Some(2));
    assert_eq!(instr.imm, Some(8));
}

#[test]
fn test_parse_lw() {
    let instr = parse_line("LW R1, 4(R2)").unwrap();
    assert_eq!(instr.opcode, Opcode::Lw);
    assert_eq!(instr.rd, Some(1));
    assert_eq!(instr.r1, Some(2));
    assert_eq!(instr.imm, Some(4));
}

#[test]
fn test_parse_sw() {
    let instr = parse_line("SW R1, 8(R2)").unwrap();
    assert_eq!(instr.opcode, Opcode::Sw);
    assert_eq!(instr.r1, Some(1));
    assert_eq!(instr.r2, Some(2));
    assert_eq!(instr.imm, Some(8));
}

#[test]
fn test_parse_jumps() {
    let j = parse_line("J 5").unwrap();
    assert_eq!(j.opcode, Opcode::J);
    assert_eq!(j.imm, Some(5));

    let jal = parse_line("JAL 2").unwrap();
    assert_eq!(jal.opcode, Opcode::Jal);
}

#[test]
fn test_parse_nop() {
    let instr = parse_line("NOP").unwrap();
    assert_eq!(instr.opcode, Opcode::Nop);
    assert_eq!(instr.rd, None);
    assert_eq!(instr.imm, None);
}

#[test]
fn test_lowercase_registers_accepted() {
    let instr = parse_line("ADD r1, r2, r3").unwrap();
    assert_eq!(instr.rd, Some(1));
}

#[test]
fn test_unknown_opcode() {
    assert!(parse_line("FOO R1, R2, R3").is_err());
}

#[test]
fn test_wrong_operand_count() {
    assert!(parse_line("ADD R1, R2").is_err());
    assert!(parse_line("ADDI R1, R2").is_err());
    assert!(parse_line("LW R1").is_err());
    assert!(parse_line("SW R1").is_err());
    assert!(parse_line("NOP R1").is_err());
    assert!(parse_line("J").is_err());
}

#[test]
fn test_malformed_memory_operand() {
    assert!(parse_line("LW R1, R2").is_err());
    assert!(parse_line("SW R1, R2").is_err());
    assert!(parse_line("LW R1, 4(R2").is_err());
    assert!(parse_line("LW R1, (R2)").is_err());
}

#[test]
fn test_non_integer_immediate() {
    assert!(parse_line("ADDI R1, R0, abc").is_err());
    assert!(parse_line("BEQ R1, R2, x").is_err());
}

#[test]
fn test_register_out_of_range() {
    assert!(parse_line("ADD R32, R1, R2").is_err());
    assert!(parse_line("ADD R99, R1, R2").is_err());
    assert!(parse_line("ADD X1, R1, R2").is_err());
}

#[test]
fn test_malformed_lines_are_skipped_and_reported() {
    let source = "ADD R1, R2, R3\n\
                  BOGUS R1\n\
                  ADDI R4, R0, 2\n\
                  LW R5, nonsense\n\
                  NOP\n";
    let (program, errors) = parse_program(source);

    // Good lines survive with sequential ids (their indices)
    assert_eq!(program.len(), 3);
    assert_eq!(program[0].opcode, Opcode::Add);
    assert_eq!(program[1].opcode, Opcode::Addi);
    assert_eq!(program[2].opcode, Opcode::Nop);

    // One error per malformed line, carrying its 1-based line number
    assert_eq!(errors.len(), 2);
    match &errors[0] {
        SimulatorError::ParseError { line, .. } => assert_eq!(*line, 2),
        other => panic!("unexpected error kind: {}", other),
    }
    match &errors[1] {
        SimulatorError::ParseError { line, .. } => assert_eq!(*line, 4),
        other => panic!("unexpected error kind: {}", other),
    }
}

#[test]
fn test_error_messages_are_descriptive() {
    let (_, errors) = parse_program("FROB R1, R2\n");
    assert_eq!(errors.len(), 1);
    let rendered = errors[0].to_string();
    assert!(rendered.contains("line 1"), "got: {}", rendered);
    assert!(rendered.contains("FROB"), "got: {}", rendered);
}

#[test]
fn test_whitespace_tolerance() {
    let instr = parse_line("ADD   R1 ,  R2 ,R3").unwrap();
    assert_eq!(instr.rd, Some(1));
    assert_eq!(instr.r1, Some(2));
    assert_eq!(instr.r2, Some(3));
}
