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

// cdb.rs
//
// This file contains the common data bus: the broadcast channel publishing
// (tag, value) pairs from completed operations to the reservation stations
// and the reorder buffer. At most `width` broadcasts per cycle; losers carry
// over to the next cycle with their completion time unchanged.

use super::reservation_station::RsKind;

/// A completed operation competing for the bus this cycle
#[derive(Debug, Clone, Copy)]
pub struct CdbCandidate {
    pub kind: RsKind,
    /// Index of the entry within its pool
    pub rs_index: usize,
    pub tag: usize,
    pub instr_id: usize,
    pub value: i32,
}

/// One broadcast actually published on the bus
#[derive(Debug, Clone, Copy)]
pub struct CdbBroadcast {
    pub tag: usize,
    pub value: i32,
    pub instr_id: usize,
}

/// Arbitration class order: Load (and Store, which shares the memory class)
/// ahead of ALU, ahead of Mul/Div, ahead of Branch
fn class_priority(kind: RsKind) -> usize {
    match kind {
        RsKind::Load | RsKind::Store => 0,
        RsKind::Alu => 1,
        RsKind::MulDiv => 2,
        RsKind::Branch => 3,
    }
}

#[derive(Debug, Clone)]
pub struct CommonDataBus {
    width: usize,
    /// Broadcasts published in the most recent writeback phase
    pub last_broadcasts: Vec<CdbBroadcast>,
}

impl CommonDataBus {
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "CDB width must be positive");
        Self {
            width,
            last_broadcasts: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Pick this cycle's winners: class priority first, then oldest dynamic
    /// instruction id. Everything past `width` loses and retries next cycle.
    pub fn arbitrate(&self, mut candidates: Vec<CdbCandidate>) -> Vec<CdbCandidate> {
        candidates.sort_by_key(|c| (class_priority(c.kind), c.instr_id));
        candidates.truncate(self.width);
        candidates
    }

    pub fn record(&mut self, broadcasts: Vec<CdbBroadcast>) {
        self.last_broadcasts = broadcasts;
    }

    pub fn clear(&mut self) {
        self.last_broadcasts.clear();
    }
}
