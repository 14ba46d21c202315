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

// instruction.rs
//
// This file contains the instruction definitions for the Tomasulo simulator.
// It defines the Opcode enum with its central latency and format tables, and
// the static Instruction record produced by the parser.

use serde::Serialize;
use std::fmt;

use super::reservation_station::RsKind;

/// Opcodes of the simulated instruction set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Opcode {
    Add,
    Sub,
    Addi,
    Mul,
    Div,
    Lw,
    Sw,
    Beq,
    Bne,
    Blt,
    Bgt,
    J,
    Jal,
    Nop,
}

/// Instruction format, derived from the opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstructionType {
    R,
    I,
    J,
    Nop,
}

impl Opcode {
    /// Execution latency in cycles (iterative functional-unit model)
    pub fn latency(self) -> usize {
        match self {
            Opcode::Add | Opcode::Sub | Opcode::Addi => 1,
            Opcode::Mul => 3,
            Opcode::Div => 8,
            Opcode::Lw | Opcode::Sw => 2, // 1 for effective address, 1 for memory
            Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt => 1,
            Opcode::J | Opcode::Jal => 1,
            Opcode::Nop => 1,
        }
    }

    pub fn instruction_type(self) -> InstructionType {
        match self {
            Opcode::J | Opcode::Jal => InstructionType::J,
            Opcode::Addi
            | Opcode::Lw
            | Opcode::Sw
            | Opcode::Beq
            | Opcode::Bne
            | Opcode::Blt
            | Opcode::Bgt => InstructionType::I,
            Opcode::Nop => InstructionType::Nop,
            _ => InstructionType::R,
        }
    }

    /// Reservation-station pool this opcode dispatches to
    pub fn station_kind(self) -> RsKind {
        match self {
            Opcode::Add | Opcode::Sub | Opcode::Addi | Opcode::Nop => RsKind::Alu,
            Opcode::Mul | Opcode::Div => RsKind::MulDiv,
            Opcode::Lw => RsKind::Load,
            Opcode::Sw => RsKind::Store,
            Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt | Opcode::J | Opcode::Jal => {
                RsKind::Branch
            },
        }
    }

    /// Conditional branches (resolved in execute, redirect at commit)
    pub fn is_conditional_branch(self) -> bool {
        matches!(self, Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt)
    }

    /// Unconditional jumps (target known at issue)
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::J | Opcode::Jal)
    }

    pub fn is_memory_op(self) -> bool {
        matches!(self, Opcode::Lw | Opcode::Sw)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Addi => "ADDI",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Lw => "LW",
            Opcode::Sw => "SW",
            Opcode::Beq => "BEQ",
            Opcode::Bne => "BNE",
            Opcode::Blt => "BLT",
            Opcode::Bgt => "BGT",
            Opcode::J => "J",
            Opcode::Jal => "JAL",
            Opcode::Nop => "NOP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// A decoded static instruction. Register fields that the format does not use
/// are None. For SW, r1 holds the data register and r2 the base register.
#[derive(Debug, Clone, Serialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub rd: Option<u8>,
    pub r1: Option<u8>,
    pub r2: Option<u8>,
    pub imm: Option<i32>,
    /// Original source text, kept for diagnostics and the stage table
    pub raw: String,
}

impl Instruction {
    pub fn new(
        opcode: Opcode,
        rd: Option<u8>,
        r1: Option<u8>,
        r2: Option<u8>,
        imm: Option<i32>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            opcode,
            rd,
            r1,
            r2,
            imm,
            raw: raw.into(),
        }
    }

    /// Source registers in operand order: element 0 feeds Vj, element 1 feeds
    /// Vk. Stores list the base register first so that A = Vj + imm holds for
    /// both loads and stores.
    pub fn sources(&self) -> Vec<u8> {
        match self.opcode {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                vec![self.r1.unwrap_or(0), self.r2.unwrap_or(0)]
            },
            Opcode::Addi | Opcode::Lw => vec![self.r1.unwrap_or(0)],
            Opcode::Sw => vec![self.r2.unwrap_or(0), self.r1.unwrap_or(0)],
            Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt => {
                vec![self.r1.unwrap_or(0), self.r2.unwrap_or(0)]
            },
            Opcode::J | Opcode::Jal | Opcode::Nop => Vec::new(),
        }
    }

    /// Destination register, if any. JAL links into R31.
    pub fn dest(&self) -> Option<u8> {
        match self.opcode {
            Opcode::Add | Opcode::Sub | Opcode::Addi | Opcode::Mul | Opcode::Div | Opcode::Lw => {
                self.rd
            },
            Opcode::Jal => Some(31),
            _ => None,
        }
    }

    pub fn latency(&self) -> usize {
        self.opcode.latency()
    }

    pub fn instruction_type(&self) -> InstructionType {
        self.opcode.instruction_type()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
