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

// rat.rs
//
// This file contains the Register Alias Table (RAT) used for register
// renaming. Each architectural register maps either to "value is
// architectural" (None) or to the ROB slot that will produce it (Some(tag)).

use super::registers::NUM_REGISTERS;

/// Register Alias Table. R0 is never aliased: its value is permanently
/// architectural (zero).
#[derive(Debug, Clone)]
pub struct RegisterAliasTable {
    aliases: [Option<usize>; NUM_REGISTERS],
}

impl Default for RegisterAliasTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterAliasTable {
    pub fn new() -> Self {
        Self {
            aliases: [None; NUM_REGISTERS],
        }
    }

    /// Stamp a new producer tag on a destination register. No-op on R0.
    pub fn rename_dest(&mut self, reg: u8, tag: usize) {
        if reg != 0 && (reg as usize) < NUM_REGISTERS {
            self.aliases[reg as usize] = Some(tag);
        }
    }

    /// Current alias: None means the architectural value is current.
    pub fn lookup(&self, reg: u8) -> Option<usize> {
        if (reg as usize) < NUM_REGISTERS {
            self.aliases[reg as usize]
        } else {
            None
        }
    }

    /// Conditional clear at commit: only drop the alias if it still points at
    /// the committing ROB slot, so a newer in-flight rename of the same
    /// register is left untouched.
    pub fn clear_if_matches(&mut self, reg: u8, tag: usize) {
        if (reg as usize) < NUM_REGISTERS && self.aliases[reg as usize] == Some(tag) {
            self.aliases[reg as usize] = None;
        }
    }

    /// Drop aliases pointing into flushed ROB slots (misprediction squash)
    pub fn clear_flushed(&mut self, flushed: &[usize]) {
        for alias in self.aliases.iter_mut() {
            if let Some(tag) = *alias {
                if flushed.contains(&tag) {
                    *alias = None;
                }
            }
        }
    }

    pub fn flush_all(&mut self) {
        self.aliases = [None; NUM_REGISTERS];
    }

    /// Live (register, tag) pairs, for diagnostics
    pub fn live_aliases(&self) -> Vec<(u8, usize)> {
        self.aliases
            .iter()
            .enumerate()
            .filter_map(|(reg, alias)| alias.map(|tag| (reg as u8, tag)))
            .collect()
    }
}
