// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// parser.rs
//
// This file contains the assembly text parser. One instruction per line;
// comment and empty lines are ignored; malformed lines are reported and
// skipped, and parsing continues on the next line.
//
// Grammar:
//   R-type:   OP rd, r1, r2            OP in {ADD, SUB, MUL, DIV}
//   ADDI:     ADDI rd, r1, imm
//   Branch:   OP r1, r2, imm           OP in {BEQ, BNE, BLT, BGT}
//   LW:       LW rd, imm(r1)
//   SW:       SW r1, imm(r2)
//   Jump:     J imm  |  JAL imm
//   NOP:      NOP

use log::warn;

use crate::engine::instruction::{Instruction, Opcode};
use crate::engine::registers::NUM_REGISTERS;
use crate::errors::SimulatorError;

/// Parse a whole program. Returns the successfully parsed instructions (ids
/// are their indices, assigned sequentially from 0) and one error per
/// malformed line.
pub fn parse_program(source: &str) -> (Vec<Instruction>, Vec<SimulatorError>) {
    let mut instructions = Vec::new();
    let mut errors = Vec::new();

    for (line_idx, raw_line) in source.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(instr) => instructions.push(instr),
            Err(message) => {
                warn!("skipping line {}: {}", line_idx + 1, message);
                errors.push(SimulatorError::ParseError {
                    line: line_idx + 1,
                    message,
                });
            },
        }
    }

    (instructions, errors)
}

/// Drop a trailing `#` comment; `;`-prefixed lines are comments too
fn strip_comment(line: &str) -> &str {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    if line.trim_start().starts_with(';') {
        ""
    } else {
        line
    }
}

/// Parse a single instruction line
pub fn parse_line(line: &str) -> Result<Instruction, String> {
    let mut tokens = line.splitn(2, char::is_whitespace);
    let mnemonic = tokens.next().unwrap_or("").to_uppercase();
    let operands: Vec<&str> = tokens
        .next()
        .map(|rest| rest.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let opcode = match mnemonic.as_str() {
        "ADD" => Opcode::Add,
        "SUB" => Opcode::Sub,
        "ADDI" => Opcode::Addi,
        "MUL" => Opcode::Mul,
        "DIV" => Opcode::Div,
        "LW" => Opcode::Lw,
        "SW" => Opcode::Sw,
        "BEQ" => Opcode::Beq,
        "BNE" => Opcode::Bne,
        "BLT" => Opcode::Blt,
        "BGT" => Opcode::Bgt,
        "J" => Opcode::J,
        "JAL" => Opcode::Jal,
        "NOP" => Opcode::Nop,
        other => return Err(format!("unknown opcode '{}'", other)),
    };

    match opcode {
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
            expect_operands(&mnemonic, &operands, 3)?;
            let rd = parse_register(operands[0])?;
            let r1 = parse_register(operands[1])?;
            let r2 = parse_register(operands[2])?;
            Ok(Instruction::new(opcode, Some(rd), Some(r1), Some(r2), None, line))
        },
        Opcode::Addi => {
            expect_operands(&mnemonic, &operands, 3)?;
            let rd = parse_register(operands[0])?;
            let r1 = parse_register(operands[1])?;
            let imm = parse_immediate(operands[2])?;
            Ok(Instruction::new(opcode, Some(rd), Some(r1), None, Some(imm), line))
        },
        Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt => {
            expect_operands(&mnemonic, &operands, 3)?;
            let r1 = parse_register(operands[0])?;
            let r2 = parse_register(operands[1])?;
            let imm = parse_immediate(operands[2])?;
            Ok(Instruction::new(opcode, None, Some(r1), Some(r2), Some(imm), line))
        },
        Opcode::Lw => {
            expect_operands(&mnemonic, &operands, 2)?;
            let rd = parse_register(operands[0])?;
            let (imm, base) = parse_mem_operand(operands[1])?;
            Ok(Instruction::new(opcode, Some(rd), Some(base), None, Some(imm), line))
        },
        Opcode::Sw => {
            expect_operands(&mnemonic, &operands, 2)?;
            let r1 = parse_register(operands[0])?;
            let (imm, base) = parse_mem_operand(operands[1])?;
            Ok(Instruction::new(opcode, None, Some(r1), Some(base), Some(imm), line))
        },
        Opcode::J | Opcode::Jal => {
            expect_operands(&mnemonic, &operands, 1)?;
            let imm = parse_immediate(operands[0])?;
            Ok(Instruction::new(opcode, None, None, None, Some(imm), line))
        },
        Opcode::Nop => {
            if !operands.is_empty() {
                return Err("NOP expects no operands".to_string());
            }
            Ok(Instruction::new(opcode, None, None, None, None, line))
        },
    }
}

fn expect_operands(mnemonic: &str, operands: &[&str], expected: usize) -> Result<(), String> {
    if operands.len() != expected {
        Err(format!(
            "{} expects {} operands, found {}",
            mnemonic,
            expected,
            operands.len()
        ))
    } else {
        Ok(())
    }
}

/// Register names match R<n> with n in 0..=31
fn parse_register(token: &str) -> Result<u8, String> {
    let digits = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .ok_or_else(|| format!("invalid register '{}'", token))?;
    let number: u32 = digits
        .parse()
        .map_err(|_| format!("invalid register '{}'", token))?;
    if (number as usize) < NUM_REGISTERS {
        Ok(number as u8)
    } else {
        Err(format!("register number out of range: '{}'", token))
    }
}

/// Immediates are signed decimal integers
fn parse_immediate(token: &str) -> Result<i32, String> {
    token
        .parse()
        .map_err(|_| format!("invalid immediate '{}'", token))
}

/// Memory operands have the form imm(Rn)
fn parse_mem_operand(token: &str) -> Result<(i32, u8), String> {
    let open = token
        .find('(')
        .ok_or_else(|| format!("invalid memory operand '{}' (expected imm(Rn))", token))?;
    if !token.ends_with(')') {
        return Err(format!("invalid memory operand '{}' (expected imm(Rn))", token));
    }
    let imm = parse_immediate(token[..open].trim())?;
    let base = parse_register(token[open + 1..token.len() - 1].trim())?;
    Ok((imm, base))
}
