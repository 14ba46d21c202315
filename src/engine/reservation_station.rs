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

// reservation_station.rs
//
// This file contains the typed reservation-station pools. Each entry holds
// operand values (Vj/Vk) or producer tags (Qj/Qk), the effective-address
// scratch field A, and a back-reference to its ROB slot.

use serde::Serialize;

use super::instruction::Opcode;

/// Reservation-station pool kinds, one per functional-unit class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RsKind {
    Alu,
    MulDiv,
    Load,
    Store,
    Branch,
}

impl RsKind {
    pub const ALL: [RsKind; 5] = [
        RsKind::Alu,
        RsKind::MulDiv,
        RsKind::Load,
        RsKind::Store,
        RsKind::Branch,
    ];
}

/// One reservation-station entry
#[derive(Debug, Clone)]
pub struct RsEntry {
    pub busy: bool,
    pub op: Option<Opcode>,
    pub vj: Option<i32>,
    pub vk: Option<i32>,
    pub qj: Option<usize>,
    pub qk: Option<usize>,
    /// Immediate at issue, effective address (or branch target) after compute
    pub a: Option<i32>,
    pub rob_slot: Option<usize>,
    /// Dynamic instruction id: issue order, used for oldest-first dispatch
    pub instr_id: Option<usize>,
    pub executing: bool,
    pub done: bool,
    pub remaining_cycles: usize,
    /// Computed result, held until the broadcast wins the CDB
    pub result: Option<i32>,
    /// Cycle the last operand arrived; dispatch requires it to be in the past
    pub ready_since: Option<usize>,
}

impl RsEntry {
    pub fn new() -> Self {
        Self {
            busy: false,
            op: None,
            vj: None,
            vk: None,
            qj: None,
            qk: None,
            a: None,
            rob_slot: None,
            instr_id: None,
            executing: false,
            done: false,
            remaining_cycles: 0,
            result: None,
            ready_since: None,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Both operands satisfied, not yet dispatched
    pub fn is_ready(&self) -> bool {
        self.busy && !self.executing && !self.done && self.qj.is_none() && self.qk.is_none()
    }

    /// Fill any operand waiting on `tag`. The tag is snapshotted by the
    /// caller per broadcast, so an entry is updated at most once per field.
    pub fn update_from_cdb(&mut self, tag: usize, value: i32, cycle: usize) {
        if !self.busy {
            return;
        }
        let mut changed = false;
        if self.qj == Some(tag) {
            self.vj = Some(value);
            self.qj = None;
            changed = true;
        }
        if self.qk == Some(tag) {
            self.vk = Some(value);
            self.qk = None;
            changed = true;
        }
        if changed && self.qj.is_none() && self.qk.is_none() {
            self.ready_since = Some(cycle);
        }
    }
}

impl Default for RsEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed-size pool of reservation stations of one kind
#[derive(Debug, Clone)]
pub struct RsPool {
    pub kind: RsKind,
    pub entries: Vec<RsEntry>,
}

impl RsPool {
    pub fn new(kind: RsKind, size: usize) -> Self {
        Self {
            kind,
            entries: vec![RsEntry::new(); size],
        }
    }

    pub fn has_free(&self) -> bool {
        self.entries.iter().any(|e| !e.busy)
    }

    /// Index of a free entry, or None (structural stall)
    pub fn allocate(&mut self) -> Option<usize> {
        let idx = self.entries.iter().position(|e| !e.busy)?;
        self.entries[idx].busy = true;
        Some(idx)
    }

    pub fn free(&mut self, idx: usize) {
        self.entries[idx].clear();
    }

    /// Indices of dispatchable entries (operands satisfied strictly before
    /// `cycle`), oldest issue order first
    pub fn ready_indices(&self, cycle: usize) -> Vec<usize> {
        let mut ready: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_ready() && e.ready_since.map_or(false, |c| c < cycle))
            .map(|(i, _)| i)
            .collect();
        ready.sort_by_key(|&i| self.entries[i].instr_id);
        ready
    }

    pub fn all_free(&self) -> bool {
        self.entries.iter().all(|e| !e.busy)
    }
}

/// All reservation-station pools, one per kind
#[derive(Debug, Clone)]
pub struct ReservationStations {
    pub alu: RsPool,
    pub muldiv: RsPool,
    pub load: RsPool,
    pub store: RsPool,
    pub branch: RsPool,
}

impl ReservationStations {
    pub fn new(alu: usize, muldiv: usize, load: usize, store: usize, branch: usize) -> Self {
        Self {
            alu: RsPool::new(RsKind::Alu, alu),
            muldiv: RsPool::new(RsKind::MulDiv, muldiv),
            load: RsPool::new(RsKind::Load, load),
            store: RsPool::new(RsKind::Store, store),
            branch: RsPool::new(RsKind::Branch, branch),
        }
    }

    pub fn pool(&self, kind: RsKind) -> &RsPool {
        match kind {
            RsKind::Alu => &self.alu,
            RsKind::MulDiv => &self.muldiv,
            RsKind::Load => &self.load,
            RsKind::Store => &self.store,
            RsKind::Branch => &self.branch,
        }
    }

    pub fn pool_mut(&mut self, kind: RsKind) -> &mut RsPool {
        match kind {
            RsKind::Alu => &mut self.alu,
            RsKind::MulDiv => &mut self.muldiv,
            RsKind::Load => &mut self.load,
            RsKind::Store => &mut self.store,
            RsKind::Branch => &mut self.branch,
        }
    }

    /// Apply one CDB broadcast to every pool
    pub fn update_from_cdb(&mut self, tag: usize, value: i32, cycle: usize) {
        for kind in RsKind::ALL {
            for entry in self.pool_mut(kind).entries.iter_mut() {
                entry.update_from_cdb(tag, value, cycle);
            }
        }
    }

    /// Clear entries whose ROB slot was flushed by a squash
    pub fn clear_flushed(&mut self, flushed: &[usize]) {
        for kind in RsKind::ALL {
            for entry in self.pool_mut(kind).entries.iter_mut() {
                if let Some(slot) = entry.rob_slot {
                    if flushed.contains(&slot) {
                        entry.clear();
                    }
                }
            }
        }
    }

    pub fn all_free(&self) -> bool {
        RsKind::ALL.iter().all(|&k| self.pool(k).all_free())
    }
}
