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

// rob.rs
//
// This file contains the reorder buffer: a circular FIFO of in-flight
// instructions, the source of truth for speculative values and in-order
// retirement. Slot ids come from a monotonically increasing counter, so a
// stale broadcast after a flush matches nothing and is silently dropped.

use serde::Serialize;
use std::fmt;

use super::instruction::Opcode;

/// Simulated trap, attached to an instruction during execute and surfaced at
/// its commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trap {
    DivideByZero,
    MemoryOutOfBounds(i32),
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::DivideByZero => write!(f, "division by zero"),
            Trap::MemoryOutOfBounds(addr) => {
                write!(f, "memory access out of bounds: address {}", addr)
            },
        }
    }
}

/// One reorder-buffer entry
#[derive(Debug, Clone, Serialize)]
pub struct RobEntry {
    /// Monotonic slot id; this is the tag matched on the CDB
    pub id: usize,
    pub opcode: Opcode,
    /// Dynamic instruction record this entry belongs to
    pub instr_id: usize,
    pub dest: Option<u8>,
    /// Effective address of a store, published in its first execution cycle
    /// so younger loads can disambiguate against it
    pub store_addr: Option<i32>,
    pub value: Option<i32>,
    pub ready: bool,
    pub predicted_taken: bool,
    pub actual_taken: Option<bool>,
    pub actual_target: Option<usize>,
    pub trap: Option<Trap>,
}

impl RobEntry {
    fn new(id: usize, opcode: Opcode, instr_id: usize, dest: Option<u8>, predicted_taken: bool) -> Self {
        Self {
            id,
            opcode,
            instr_id,
            dest,
            store_addr: None,
            value: None,
            ready: false,
            predicted_taken,
            actual_taken: None,
            actual_target: None,
            trap: None,
        }
    }

    pub fn is_store(&self) -> bool {
        self.opcode == Opcode::Sw
    }

    pub fn is_conditional_branch(&self) -> bool {
        self.opcode.is_conditional_branch()
    }

    /// A resolved conditional branch whose outcome disagrees with its
    /// prediction
    pub fn mispredicted(&self) -> bool {
        self.is_conditional_branch()
            && self.actual_taken.map_or(false, |t| t != self.predicted_taken)
    }
}

/// Circular reorder buffer with in-order head retirement
#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    size: usize,
    buffer: Vec<Option<RobEntry>>,
    head: usize,
    tail: usize,
    count: usize,
    next_id: usize,
}

impl ReorderBuffer {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "ROB size must be positive");
        Self {
            size,
            buffer: vec![None; size],
            head: 0,
            tail: 0,
            count: 0,
            next_id: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.count == self.size
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Allocate a slot at the tail. None when full (the issue phase stalls).
    pub fn allocate(
        &mut self,
        opcode: Opcode,
        instr_id: usize,
        dest: Option<u8>,
        predicted_taken: bool,
    ) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.buffer[self.tail] = Some(RobEntry::new(id, opcode, instr_id, dest, predicted_taken));
        self.tail = (self.tail + 1) % self.size;
        self.count += 1;
        Some(id)
    }

    pub fn get(&self, tag: usize) -> Option<&RobEntry> {
        self.iter().find(|e| e.id == tag)
    }

    pub fn get_mut(&mut self, tag: usize) -> Option<&mut RobEntry> {
        self.buffer
            .iter_mut()
            .filter_map(|slot| slot.as_mut())
            .find(|e| e.id == tag)
    }

    /// Mark a slot ready with its value (called from writeback). Returns
    /// false if the tag is no longer live (flushed), in which case the
    /// broadcast is dropped.
    pub fn complete(&mut self, tag: usize, value: i32) -> bool {
        match self.get_mut(tag) {
            Some(entry) => {
                entry.value = Some(value);
                entry.ready = true;
                true
            },
            None => false,
        }
    }

    pub fn peek_head(&self) -> Option<&RobEntry> {
        if self.is_empty() {
            None
        } else {
            self.buffer[self.head].as_ref()
        }
    }

    /// Remove and return the head iff it is ready
    pub fn retire_head(&mut self) -> Option<RobEntry> {
        if self.is_empty() {
            return None;
        }
        if !self.buffer[self.head].as_ref().map_or(false, |e| e.ready) {
            return None;
        }
        let entry = self.buffer[self.head].take();
        self.head = (self.head + 1) % self.size;
        self.count -= 1;
        entry
    }

    /// Drop every entry strictly younger than `tag`, returning them for
    /// downstream cleanup (reservation stations, RAT, instruction records)
    pub fn flush_after(&mut self, tag: usize) -> Vec<RobEntry> {
        let mut flushed = Vec::new();
        while self.count > 0 {
            let youngest = (self.tail + self.size - 1) % self.size;
            let is_younger = self.buffer[youngest].as_ref().map_or(false, |e| e.id > tag);
            if !is_younger {
                break;
            }
            if let Some(entry) = self.buffer[youngest].take() {
                flushed.push(entry);
            }
            self.tail = youngest;
            self.count -= 1;
        }
        flushed
    }

    /// Entries in program order, head first
    pub fn iter(&self) -> impl Iterator<Item = &RobEntry> + '_ {
        (0..self.count).filter_map(move |i| self.buffer[(self.head + i) % self.size].as_ref())
    }

    pub fn snapshot(&self) -> Vec<RobEntry> {
        self.iter().cloned().collect()
    }
}
