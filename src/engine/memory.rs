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

// memory.rs
//
// This file contains the data memory for the Tomasulo simulator: a flat
// word-addressed array. An address is an index into the array; negative or
// out-of-range addresses fail and are surfaced as traps by the engine.

#[derive(Debug, Clone)]
pub struct Memory {
    data: Vec<i32>,
}

impl Memory {
    pub fn new(size_words: usize) -> Self {
        Self {
            data: vec![0; size_words],
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn in_range(&self, address: i32) -> bool {
        address >= 0 && (address as usize) < self.data.len()
    }

    /// Read a word. None for out-of-range addresses.
    pub fn read_word(&self, address: i32) -> Option<i32> {
        if self.in_range(address) {
            Some(self.data[address as usize])
        } else {
            None
        }
    }

    /// Write a word. Returns false for out-of-range addresses.
    pub fn write_word(&mut self, address: i32, value: i32) -> bool {
        if self.in_range(address) {
            self.data[address as usize] = value;
            true
        } else {
            false
        }
    }

    /// Preload a word before simulation starts (driver/test setup)
    pub fn write_word_init(&mut self, address: usize, value: i32) -> bool {
        if address < self.data.len() {
            self.data[address] = value;
            true
        } else {
            false
        }
    }

    /// Words holding a nonzero value, in address order
    pub fn nonzero(&self) -> Vec<(usize, i32)> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(a, &v)| (a, v))
            .collect()
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}
