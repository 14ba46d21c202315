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

// config.rs
//
// This file contains the configuration for the Tomasulo engine: reservation
// station pool sizes, functional-unit counts, reorder-buffer size, pipeline
// widths, predictor selection, memory size, and the runaway-cycle guard.

use super::branch_predictor::BranchPredictorKind;

/// Configuration for the Tomasulo engine
#[derive(Debug, Clone)]
pub struct TomasuloConfig {
    /// Reservation-station pool sizes
    pub num_alu_stations: usize,
    pub num_muldiv_stations: usize,
    pub num_load_stations: usize,
    pub num_store_stations: usize,
    pub num_branch_stations: usize,
    /// Functional-unit counts per class
    pub num_alu_units: usize,
    pub num_muldiv_units: usize,
    pub num_load_units: usize,
    pub num_store_units: usize,
    pub num_branch_units: usize,
    /// Size of the reorder buffer
    pub rob_size: usize,
    /// Instructions issued per cycle
    pub issue_width: usize,
    /// Instructions committed per cycle
    pub commit_width: usize,
    /// CDB broadcasts per cycle
    pub cdb_width: usize,
    pub predictor: BranchPredictorKind,
    /// Data memory size in words
    pub memory_size: usize,
    /// Safety guard for run(): programs with a live backward branch can loop
    pub max_cycles: usize,
}

impl Default for TomasuloConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TomasuloConfig {
    pub fn new() -> Self {
        Self {
            num_alu_stations: 3,
            num_muldiv_stations: 2,
            num_load_stations: 2,
            num_store_stations: 2,
            num_branch_stations: 2,
            num_alu_units: 2,
            num_muldiv_units: 1,
            num_load_units: 1,
            num_store_units: 1,
            num_branch_units: 1,
            rob_size: 16,
            issue_width: 1,
            commit_width: 1,
            cdb_width: 1,
            predictor: BranchPredictorKind::StaticNotTaken,
            memory_size: 1024,
            max_cycles: 100_000,
        }
    }

    pub fn with_alu_stations(mut self, num: usize) -> Self {
        self.num_alu_stations = num;
        self
    }

    pub fn with_muldiv_stations(mut self, num: usize) -> Self {
        self.num_muldiv_stations = num;
        self
    }

    pub fn with_load_stations(mut self, num: usize) -> Self {
        self.num_load_stations = num;
        self
    }

    pub fn with_store_stations(mut self, num: usize) -> Self {
        self.num_store_stations = num;
        self
    }

    pub fn with_branch_stations(mut self, num: usize) -> Self {
        self.num_branch_stations = num;
        self
    }

    pub fn with_alu_units(mut self, num: usize) -> Self {
        self.num_alu_units = num;
        self
    }

    pub fn with_muldiv_units(mut self, num: usize) -> Self {
        self.num_muldiv_units = num;
        self
    }

    pub fn with_load_units(mut self, num: usize) -> Self {
        self.num_load_units = num;
        self
    }

    pub fn with_store_units(mut self, num: usize) -> Self {
        self.num_store_units = num;
        self
    }

    pub fn with_branch_units(mut self, num: usize) -> Self {
        self.num_branch_units = num;
        self
    }

    pub fn with_rob_size(mut self, size: usize) -> Self {
        assert!(size > 0, "ROB size must be positive");
        self.rob_size = size;
        self
    }

    pub fn with_issue_width(mut self, width: usize) -> Self {
        assert!(width > 0, "Issue width must be positive");
        self.issue_width = width;
        self
    }

    pub fn with_commit_width(mut self, width: usize) -> Self {
        assert!(width > 0, "Commit width must be positive");
        self.commit_width = width;
        self
    }

    pub fn with_cdb_width(mut self, width: usize) -> Self {
        assert!(width > 0, "CDB width must be positive");
        self.cdb_width = width;
        self
    }

    pub fn with_predictor(mut self, kind: BranchPredictorKind) -> Self {
        self.predictor = kind;
        self
    }

    pub fn with_memory_size(mut self, words: usize) -> Self {
        self.memory_size = words;
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }
}
