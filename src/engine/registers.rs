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

// registers.rs
//
// This file contains the architectural register file for the Tomasulo
// simulator: 32 general-purpose registers R0..R31, with R0 hardwired to zero.

pub const NUM_REGISTERS: usize = 32;

#[derive(Debug, Clone)]
pub struct RegisterFile {
    data: [i32; NUM_REGISTERS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            data: [0; NUM_REGISTERS],
        }
    }

    pub fn read(&self, reg: u8) -> i32 {
        if reg == 0 || reg as usize >= NUM_REGISTERS {
            0 // R0 is always 0; out-of-bounds reads return 0
        } else {
            self.data[reg as usize]
        }
    }

    pub fn write(&mut self, reg: u8, value: i32) {
        if reg != 0 && (reg as usize) < NUM_REGISTERS {
            self.data[reg as usize] = value;
        }
        // Writes to R0 or out-of-bounds registers are ignored
    }

    /// Registers with a nonzero architectural value, in index order
    pub fn nonzero(&self) -> Vec<(u8, i32)> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(i, &v)| (i as u8, v))
            .collect()
    }

    pub fn dump_registers(&self) -> String {
        let mut result = String::new();
        result.push_str("General Purpose Registers:\n");
        for row in 0..8 {
            for col in 0..4 {
                let reg = row + col * 8;
                result.push_str(&format!("R{:<2} = {:<12} ", reg, self.data[reg]));
            }
            result.push('\n');
        }
        result
    }
}
