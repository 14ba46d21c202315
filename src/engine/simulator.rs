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

// simulator.rs
//
// This file contains the cycle engine. Each cycle advances the four pipeline
// phases in fixed order, Commit -> Writeback -> Execute -> Issue, over the
// shared structures (reservation stations, ROB, RAT, CDB, functional units,
// memory). The ordering gives the classic Tomasulo timing: a value broadcast
// in cycle N is observable to dependent entries no earlier than cycle N+1.

use log::{debug, trace};
use serde::Serialize;
use std::fmt;

use super::branch_predictor::BranchPredictor;
use super::cdb::{CdbBroadcast, CdbCandidate, CommonDataBus};
use super::config::TomasuloConfig;
use super::functional_unit::{build_units, FunctionalUnit};
use super::instruction::{Instruction, Opcode};
use super::memory::Memory;
use super::rat::RegisterAliasTable;
use super::registers::RegisterFile;
use super::reservation_station::{ReservationStations, RsKind};
use super::rob::{ReorderBuffer, RobEntry, Trap};
use crate::errors::SimulatorError;

/// Cycle stamps for one dynamic instruction, unset until the stage is visited
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StageTimes {
    pub issue: Option<usize>,
    pub exec_start: Option<usize>,
    pub exec_end: Option<usize>,
    pub writeback: Option<usize>,
    pub commit: Option<usize>,
}

/// One dynamic instruction: a fetched instance of a static instruction.
/// Loops refetch, so a static instruction can appear many times.
#[derive(Debug, Clone, Serialize)]
pub struct InstrRecord {
    /// Monotonically increasing id in fetch order
    pub id: usize,
    /// Static instruction index this record was fetched from
    pub pc: usize,
    pub instr: Instruction,
    pub stage: StageTimes,
    /// ROB slot (the tag) assigned at issue
    pub rob_slot: Option<usize>,
    /// True iff an older unresolved branch sat in the ROB at issue
    pub speculative: bool,
    pub predicted_taken: Option<bool>,
    pub actual_taken: Option<bool>,
    pub result: Option<i32>,
    /// Effective address of a memory op, or resolved target of a branch
    pub address: Option<i32>,
    pub trap: Option<Trap>,
    /// Flushed on a misprediction squash before reaching commit
    pub squashed: bool,
}

/// A trap surfaced at commit
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrapEvent {
    pub instr_id: usize,
    pub trap: Trap,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    issued: usize,
    committed: usize,
    squashed: usize,
    mispredictions: usize,
    structural_stalls: usize,
}

/// Run statistics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SimStats {
    pub cycles: usize,
    pub instructions_issued: usize,
    pub instructions_committed: usize,
    pub instructions_squashed: usize,
    pub branch_mispredictions: usize,
    pub structural_stalls: usize,
    pub ipc: f32,
    pub predictor_accuracy: f32,
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Statistics:")?;
        writeln!(f, "  Cycles: {}", self.cycles)?;
        writeln!(f, "  Instructions Issued: {}", self.instructions_issued)?;
        writeln!(f, "  Instructions Committed: {}", self.instructions_committed)?;
        writeln!(f, "  Instructions Squashed: {}", self.instructions_squashed)?;
        writeln!(f, "  Branch Mispredictions: {}", self.branch_mispredictions)?;
        writeln!(f, "  Structural Stalls: {}", self.structural_stalls)?;
        writeln!(f, "  Instructions Per Cycle (IPC): {:.2}", self.ipc)?;
        write!(
            f,
            "  Branch Prediction Accuracy: {:.2}%",
            self.predictor_accuracy * 100.0
        )
    }
}

/// The Tomasulo cycle engine. The engine exclusively owns every shared
/// structure; phases mutate them through plain methods, so there is no hidden
/// aliasing and no locking.
pub struct Simulator {
    config: TomasuloConfig,
    program: Vec<Instruction>,
    registers: RegisterFile,
    memory: Memory,
    rat: RegisterAliasTable,
    rs: ReservationStations,
    rob: ReorderBuffer,
    fus: Vec<FunctionalUnit>,
    cdb: CommonDataBus,
    predictor: BranchPredictor,
    records: Vec<InstrRecord>,
    pc: usize,
    cycle: usize,
    finished: bool,
    trap: Option<TrapEvent>,
    counters: Counters,
}

impl Simulator {
    pub fn new(program: Vec<Instruction>, config: TomasuloConfig) -> Self {
        let rs = ReservationStations::new(
            config.num_alu_stations,
            config.num_muldiv_stations,
            config.num_load_stations,
            config.num_store_stations,
            config.num_branch_stations,
        );
        let fus = build_units(
            config.num_alu_units,
            config.num_muldiv_units,
            config.num_load_units,
            config.num_store_units,
            config.num_branch_units,
        );
        Self {
            registers: RegisterFile::new(),
            memory: Memory::new(config.memory_size),
            rat: RegisterAliasTable::new(),
            rs,
            rob: ReorderBuffer::new(config.rob_size),
            fus,
            cdb: CommonDataBus::new(config.cdb_width),
            predictor: BranchPredictor::new(config.predictor),
            records: Vec::new(),
            pc: 0,
            cycle: 0,
            finished: program.is_empty(),
            trap: None,
            counters: Counters::default(),
            program,
            config,
        }
    }

    /// Advance the simulation by one cycle
    pub fn step(&mut self) -> Result<(), SimulatorError> {
        if self.finished {
            return Ok(());
        }
        self.cycle += 1;
        trace!("---- cycle {} ----", self.cycle);

        self.commit_phase()?;
        if !self.finished {
            self.writeback_phase();
            self.execute_phase()?;
            self.issue_phase()?;
            self.finished = self.check_finished();
        }
        Ok(())
    }

    /// Run until the program drains (or the max-cycle guard fires)
    pub fn run(&mut self) -> Result<(), SimulatorError> {
        while !self.finished && self.cycle < self.config.max_cycles {
            self.step()?;
        }
        Ok(())
    }

    // ---- phase 1: commit -------------------------------------------------

    fn commit_phase(&mut self) -> Result<(), SimulatorError> {
        let mut committed = 0;
        while committed < self.config.commit_width {
            let entry = match self.rob.retire_head() {
                Some(entry) => entry,
                None => break, // head missing or not ready
            };
            committed += 1;
            self.counters.committed += 1;
            self.records[entry.instr_id].stage.commit = Some(self.cycle);
            debug!(
                "cycle {}: commit #{} '{}'",
                self.cycle, entry.instr_id, self.records[entry.instr_id].instr.raw
            );

            if let Some(trap) = entry.trap {
                // Architectural state is left exactly as older retirements
                // produced it; the destination write is suppressed.
                self.records[entry.instr_id].trap = Some(trap);
                self.trap = Some(TrapEvent {
                    instr_id: entry.instr_id,
                    trap,
                });
                self.finished = true;
                debug!("cycle {}: trap at commit of #{}: {}", self.cycle, entry.instr_id, trap);
                return Ok(());
            }

            if entry.is_store() {
                let addr = entry.store_addr.ok_or_else(|| {
                    SimulatorError::InvariantViolation(format!(
                        "store in ROB slot {} committed without an effective address",
                        entry.id
                    ))
                })?;
                let value = entry.value.ok_or_else(|| {
                    SimulatorError::InvariantViolation(format!(
                        "store in ROB slot {} committed without a value",
                        entry.id
                    ))
                })?;
                if !self.memory.write_word(addr, value) {
                    return Err(SimulatorError::InvariantViolation(format!(
                        "store committed to untrapped out-of-range address {}",
                        addr
                    )));
                }
            } else if entry.is_conditional_branch() {
                let taken = entry.actual_taken.ok_or_else(|| {
                    SimulatorError::InvariantViolation(format!(
                        "branch in ROB slot {} committed unresolved",
                        entry.id
                    ))
                })?;
                let branch_pc = self.records[entry.instr_id].pc;
                self.predictor.update(branch_pc, taken);
                if entry.mispredicted() {
                    self.counters.mispredictions += 1;
                    self.squash(&entry)?;
                    return Ok(()); // no further commits this cycle
                }
            } else if let Some(dest) = entry.dest {
                let value = entry.value.ok_or_else(|| {
                    SimulatorError::InvariantViolation(format!(
                        "ROB slot {} committed without a value for R{}",
                        entry.id, dest
                    ))
                })?;
                self.registers.write(dest, value);
                self.rat.clear_if_matches(dest, entry.id);
            }
            // J redirected fetch at issue; NOP has no architectural effect
        }
        Ok(())
    }

    /// Misprediction recovery: drop everything younger than the branch,
    /// clear the stations and aliases tied to it, redirect fetch.
    fn squash(&mut self, branch: &RobEntry) -> Result<(), SimulatorError> {
        let target = branch.actual_target.ok_or_else(|| {
            SimulatorError::InvariantViolation(format!(
                "mispredicted branch in ROB slot {} has no resolved target",
                branch.id
            ))
        })?;

        let flushed = self.rob.flush_after(branch.id);
        let flushed_tags: Vec<usize> = flushed.iter().map(|e| e.id).collect();
        for entry in &flushed {
            self.records[entry.instr_id].squashed = true;
            self.counters.squashed += 1;
        }
        self.rs.clear_flushed(&flushed_tags);
        for fu in self.fus.iter_mut() {
            if let Some(idx) = fu.rs_index {
                // the station this unit was serving may just have been cleared
                if fu.busy && !self.rs.pool(fu.kind).entries[idx].busy {
                    fu.reset();
                }
            }
        }
        self.rat.clear_flushed(&flushed_tags);
        self.pc = target;
        debug!(
            "cycle {}: squash after branch #{}, {} flushed, fetch resumes at {}",
            self.cycle,
            branch.instr_id,
            flushed_tags.len(),
            target
        );
        Ok(())
    }

    // ---- phase 2: writeback ----------------------------------------------

    fn writeback_phase(&mut self) {
        let mut candidates = Vec::new();
        for kind in RsKind::ALL {
            for (i, entry) in self.rs.pool(kind).entries.iter().enumerate() {
                if entry.busy && entry.done {
                    if let (Some(tag), Some(instr_id)) = (entry.rob_slot, entry.instr_id) {
                        candidates.push(CdbCandidate {
                            kind,
                            rs_index: i,
                            tag,
                            instr_id,
                            value: entry.result.unwrap_or(0),
                        });
                    }
                }
            }
        }

        let winners = self.cdb.arbitrate(candidates);
        let mut broadcasts = Vec::new();
        for winner in winners {
            // Snapshot the resolved branch info before the entry is freed
            let resolved_target = self.rs.pool(winner.kind).entries[winner.rs_index].a;

            // The tag is a local snapshot: updating operand fields below
            // cannot re-match this broadcast mid-loop.
            self.rs.update_from_cdb(winner.tag, winner.value, self.cycle);

            if self.rob.complete(winner.tag, winner.value) {
                if let Some(rob_entry) = self.rob.get_mut(winner.tag) {
                    if rob_entry.opcode.is_conditional_branch() {
                        rob_entry.actual_taken = Some(winner.value != 0);
                        rob_entry.actual_target = resolved_target.map(|t| t.max(0) as usize);
                    }
                }
                self.records[winner.instr_id].stage.writeback = Some(self.cycle);
                trace!(
                    "cycle {}: CDB broadcast tag {} value {} (#{})",
                    self.cycle,
                    winner.tag,
                    winner.value,
                    winner.instr_id
                );
            }
            // A dead tag means the producer was flushed; the broadcast is
            // dropped on the floor.

            self.rs.pool_mut(winner.kind).free(winner.rs_index);
            broadcasts.push(CdbBroadcast {
                tag: winner.tag,
                value: winner.value,
                instr_id: winner.instr_id,
            });
        }
        self.cdb.record(broadcasts);
    }

    // ---- phase 3: execute ------------------------------------------------

    fn execute_phase(&mut self) -> Result<(), SimulatorError> {
        // Advance in-flight operations first: work dispatched this cycle
        // must not be double-counted.
        for fu_idx in 0..self.fus.len() {
            let (kind, rs_index) = {
                let fu = &self.fus[fu_idx];
                if !fu.busy {
                    continue;
                }
                match fu.rs_index {
                    Some(i) => (fu.kind, i),
                    None => {
                        self.fus[fu_idx].reset();
                        continue;
                    },
                }
            };
            let cycle = self.cycle;
            let entry = &mut self.rs.pool_mut(kind).entries[rs_index];
            if !entry.busy || !entry.executing {
                // op finished last cycle (or was squashed underneath the
                // unit): the unit becomes free this cycle
                self.fus[fu_idx].reset();
                continue;
            }
            if entry.remaining_cycles > 0 {
                entry.remaining_cycles -= 1;
            }
            if entry.remaining_cycles == 0 {
                // Completion cycle: the unit still occupies this cycle and
                // frees up next cycle
                entry.executing = false;
                entry.done = true;
                let instr_id = entry.instr_id;
                if let Some(id) = instr_id {
                    self.records[id].stage.exec_end = Some(cycle);
                }
            }
        }

        // Dispatch the oldest ready entry of each class to its free units
        for fu_idx in 0..self.fus.len() {
            if self.fus[fu_idx].busy {
                continue;
            }
            let kind = self.fus[fu_idx].kind;
            let ready = self.rs.pool(kind).ready_indices(self.cycle);
            let chosen = match kind {
                // The load unit considers only the oldest ready load; if an
                // older store blocks it, no younger load bypasses it.
                RsKind::Load => ready.first().copied().filter(|&i| self.load_may_dispatch(i)),
                _ => ready.first().copied(),
            };
            if let Some(rs_index) = chosen {
                self.dispatch(fu_idx, kind, rs_index)?;
            }
        }
        Ok(())
    }

    /// Memory disambiguation: a load may execute only when every older
    /// in-flight store has a computed address that differs from the load's.
    /// An unknown or matching address stalls the load until the store
    /// resolves or commits (committed stores have left the ROB).
    fn load_may_dispatch(&self, rs_index: usize) -> bool {
        let entry = &self.rs.load.entries[rs_index];
        let tag = match entry.rob_slot {
            Some(t) => t,
            None => return false,
        };
        let addr = entry
            .vj
            .unwrap_or(0)
            .wrapping_add(entry.a.unwrap_or(0));
        for rob_entry in self.rob.iter() {
            if rob_entry.id >= tag {
                break; // only entries older than the load matter
            }
            if rob_entry.is_store() {
                match rob_entry.store_addr {
                    None => return false,
                    Some(a) if a == addr => return false,
                    Some(_) => {},
                }
            }
        }
        true
    }

    fn dispatch(
        &mut self,
        fu_idx: usize,
        kind: RsKind,
        rs_index: usize,
    ) -> Result<(), SimulatorError> {
        let (op, vj, vk, a_imm, tag, instr_id) = {
            let entry = &self.rs.pool(kind).entries[rs_index];
            let op = entry.op.ok_or_else(|| {
                SimulatorError::InvariantViolation("dispatching station without an op".into())
            })?;
            let tag = entry.rob_slot.ok_or_else(|| {
                SimulatorError::InvariantViolation("dispatching station without a ROB slot".into())
            })?;
            let instr_id = entry.instr_id.ok_or_else(|| {
                SimulatorError::InvariantViolation("dispatching station without a record".into())
            })?;
            (op, entry.vj.unwrap_or(0), entry.vk.unwrap_or(0), entry.a, tag, instr_id)
        };
        let record_pc = self.records[instr_id].pc;
        let imm = a_imm.unwrap_or(0);

        let mut trap: Option<Trap> = None;
        let mut eff_address: Option<i32> = None;
        let mut taken: Option<bool> = None;
        let result = match op {
            Opcode::Add | Opcode::Addi => vj.wrapping_add(vk),
            Opcode::Sub => vj.wrapping_sub(vk),
            Opcode::Mul => vj.wrapping_mul(vk),
            Opcode::Div => {
                if vk == 0 {
                    trap = Some(Trap::DivideByZero);
                    0
                } else {
                    vj.wrapping_div(vk)
                }
            },
            Opcode::Lw => {
                let addr = vj.wrapping_add(imm);
                eff_address = Some(addr);
                match self.memory.read_word(addr) {
                    Some(value) => value,
                    None => {
                        trap = Some(Trap::MemoryOutOfBounds(addr));
                        0
                    },
                }
            },
            Opcode::Sw => {
                let addr = vj.wrapping_add(imm);
                eff_address = Some(addr);
                if !self.memory.in_range(addr) {
                    trap = Some(Trap::MemoryOutOfBounds(addr));
                }
                vk // the value the store will write at commit
            },
            Opcode::Beq | Opcode::Bne | Opcode::Blt | Opcode::Bgt => {
                let t = match op {
                    Opcode::Beq => vj == vk,
                    Opcode::Bne => vj != vk,
                    Opcode::Blt => vj < vk,
                    _ => vj > vk,
                };
                taken = Some(t);
                let target = if t {
                    (record_pc as i64 + imm as i64).max(0)
                } else {
                    record_pc as i64 + 1
                };
                eff_address = Some(target as i32);
                t as i32
            },
            Opcode::J => {
                taken = Some(true);
                eff_address = Some(imm.max(0));
                0
            },
            Opcode::Jal => {
                taken = Some(true);
                eff_address = Some(imm.max(0));
                record_pc as i32 + 1 // link value for R31
            },
            Opcode::Nop => 0,
        };

        let latency = op.latency();
        {
            let entry = &mut self.rs.pool_mut(kind).entries[rs_index];
            entry.executing = true;
            entry.result = Some(result);
            if eff_address.is_some() {
                entry.a = eff_address;
            }
            // The dispatch cycle is the first execution cycle
            entry.remaining_cycles = latency - 1;
            if entry.remaining_cycles == 0 {
                entry.executing = false;
                entry.done = true;
            }
        }
        if latency > 1 {
            self.fus[fu_idx].start(rs_index);
        }

        if let Some(t) = trap {
            if let Some(rob_entry) = self.rob.get_mut(tag) {
                rob_entry.trap = Some(t);
            }
            self.records[instr_id].trap = Some(t);
        }
        if op == Opcode::Sw {
            if let Some(rob_entry) = self.rob.get_mut(tag) {
                rob_entry.store_addr = eff_address;
            }
        }

        let record = &mut self.records[instr_id];
        record.stage.exec_start = Some(self.cycle);
        if latency == 1 {
            record.stage.exec_end = Some(self.cycle);
        }
        record.result = Some(result);
        record.address = eff_address;
        record.actual_taken = taken;
        debug!(
            "cycle {}: dispatch #{} '{}' to {:?} (latency {})",
            self.cycle, instr_id, record.instr.raw, kind, latency
        );
        Ok(())
    }

    // ---- phase 4: issue --------------------------------------------------

    fn issue_phase(&mut self) -> Result<(), SimulatorError> {
        let mut issued = 0;
        while issued < self.config.issue_width {
            if self.pc >= self.program.len() {
                break; // fetch exhausted (or ran off a wrong path)
            }
            let static_instr = self.program[self.pc].clone();
            let opcode = static_instr.opcode;
            let kind = opcode.station_kind();

            if !self.rs.pool(kind).has_free() || self.rob.is_full() {
                self.counters.structural_stalls += 1;
                debug!(
                    "cycle {}: structural stall at pc {} ({:?} pool free: {}, ROB free: {})",
                    self.cycle,
                    self.pc,
                    kind,
                    self.rs.pool(kind).has_free(),
                    !self.rob.is_full()
                );
                break; // PC does not advance
            }

            let instr_id = self.records.len();
            let speculative = self
                .rob
                .iter()
                .any(|e| e.is_conditional_branch() && !e.ready);

            let imm = static_instr.imm.unwrap_or(0);
            let (predicted_taken, next_pc) = if opcode.is_conditional_branch() {
                let predicted = self.predictor.predict(self.pc);
                let target = (self.pc as i64 + imm as i64).max(0) as usize;
                (Some(predicted), if predicted { target } else { self.pc + 1 })
            } else if opcode.is_jump() {
                // Absolute target known at issue: redirect now, never mispredict
                (Some(true), imm.max(0) as usize)
            } else {
                (None, self.pc + 1)
            };

            let dest = static_instr.dest();
            let tag = match self.rob.allocate(
                opcode,
                instr_id,
                dest,
                predicted_taken.unwrap_or(false),
            ) {
                Some(tag) => tag,
                None => break,
            };
            let rs_index = match self.rs.pool_mut(kind).allocate() {
                Some(index) => index,
                None => break,
            };

            // Capture operands from the RAT, the register file, or a ready
            // ROB entry (the speculative value of an uncommitted producer)
            let sources = static_instr.sources();
            let (mut vj, mut qj) = (None, None);
            let (mut vk, mut qk) = (None, None);
            if let Some(&reg) = sources.first() {
                let (v, q) = self.resolve_operand(reg)?;
                vj = v;
                qj = q;
            }
            if let Some(&reg) = sources.get(1) {
                let (v, q) = self.resolve_operand(reg)?;
                vk = v;
                qk = q;
            }
            if opcode == Opcode::Addi {
                vk = Some(imm); // the immediate rides in Vk
            }
            let a = match opcode {
                Opcode::Lw
                | Opcode::Sw
                | Opcode::Beq
                | Opcode::Bne
                | Opcode::Blt
                | Opcode::Bgt
                | Opcode::J
                | Opcode::Jal => Some(imm),
                _ => None,
            };

            {
                let cycle = self.cycle;
                let entry = &mut self.rs.pool_mut(kind).entries[rs_index];
                entry.op = Some(opcode);
                entry.vj = vj;
                entry.vk = vk;
                entry.qj = qj;
                entry.qk = qk;
                entry.a = a;
                entry.rob_slot = Some(tag);
                entry.instr_id = Some(instr_id);
                if entry.qj.is_none() && entry.qk.is_none() {
                    entry.ready_since = Some(cycle);
                }
            }

            if let Some(d) = dest {
                self.rat.rename_dest(d, tag);
            }

            let mut record = InstrRecord {
                id: instr_id,
                pc: self.pc,
                instr: static_instr,
                stage: StageTimes::default(),
                rob_slot: Some(tag),
                speculative,
                predicted_taken,
                actual_taken: None,
                result: None,
                address: None,
                trap: None,
                squashed: false,
            };
            record.stage.issue = Some(self.cycle);
            debug!(
                "cycle {}: issue #{} '{}' -> ROB slot {}{}",
                self.cycle,
                instr_id,
                record.instr.raw,
                tag,
                if speculative { " (speculative)" } else { "" }
            );
            self.records.push(record);
            self.counters.issued += 1;

            self.pc = next_pc;
            issued += 1;
        }
        Ok(())
    }

    /// Resolve one source register to a captured value or a producer tag
    fn resolve_operand(&self, reg: u8) -> Result<(Option<i32>, Option<usize>), SimulatorError> {
        match self.rat.lookup(reg) {
            None => Ok((Some(self.registers.read(reg)), None)),
            Some(tag) => match self.rob.get(tag) {
                Some(entry) if entry.ready => Ok((entry.value, None)),
                Some(_) => Ok((None, Some(tag))),
                None => Err(SimulatorError::InvariantViolation(format!(
                    "RAT alias for R{} points at dead ROB slot {}",
                    reg, tag
                ))),
            },
        }
    }

    // ---- termination and accessors ---------------------------------------

    fn check_finished(&self) -> bool {
        self.pc >= self.program.len() && self.rob.is_empty() && self.rs.all_free()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn cycle_count(&self) -> usize {
        self.cycle
    }

    /// Per-instruction stage table, in dynamic (fetch) order
    pub fn records(&self) -> &[InstrRecord] {
        &self.records
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable memory access, for preloading data before the run starts
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn rob_snapshot(&self) -> Vec<RobEntry> {
        self.rob.snapshot()
    }

    pub fn trap(&self) -> Option<TrapEvent> {
        self.trap
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            cycles: self.cycle,
            instructions_issued: self.counters.issued,
            instructions_committed: self.counters.committed,
            instructions_squashed: self.counters.squashed,
            branch_mispredictions: self.counters.mispredictions,
            structural_stalls: self.counters.structural_stalls,
            ipc: if self.cycle > 0 {
                self.counters.committed as f32 / self.cycle as f32
            } else {
                0.0
            },
            predictor_accuracy: self.predictor.get_accuracy(),
        }
    }
}
