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

// branch_predictor.rs
//
// This file contains the branch predictor consulted at issue. The baseline
// is static not-taken; 1-bit last-outcome and 2-bit saturating-counter
// predictors are selectable per configuration.

use std::collections::HashMap;

/// Branch prediction states using a 2-bit saturating counter scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionState {
    StronglyNotTaken = 0,
    WeaklyNotTaken = 1,
    WeaklyTaken = 2,
    StronglyTaken = 3,
}

impl PredictionState {
    pub fn is_taken(&self) -> bool {
        matches!(self, PredictionState::WeaklyTaken | PredictionState::StronglyTaken)
    }

    pub fn update(&self, taken: bool) -> Self {
        match (self, taken) {
            (PredictionState::StronglyNotTaken, false) => PredictionState::StronglyNotTaken,
            (PredictionState::StronglyNotTaken, true) => PredictionState::WeaklyNotTaken,
            (PredictionState::WeaklyNotTaken, false) => PredictionState::StronglyNotTaken,
            (PredictionState::WeaklyNotTaken, true) => PredictionState::WeaklyTaken,
            (PredictionState::WeaklyTaken, false) => PredictionState::WeaklyNotTaken,
            (PredictionState::WeaklyTaken, true) => PredictionState::StronglyTaken,
            (PredictionState::StronglyTaken, false) => PredictionState::WeaklyTaken,
            (PredictionState::StronglyTaken, true) => PredictionState::StronglyTaken,
        }
    }
}

/// Predictor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchPredictorKind {
    /// Always predict not taken (the baseline)
    StaticNotTaken,
    /// Remember the last outcome per branch
    OneBit,
    /// 2-bit saturating counter per branch
    TwoBit,
}

pub struct BranchPredictor {
    kind: BranchPredictorKind,

    /// Last outcome per branch index (1-bit scheme)
    last_outcome: HashMap<usize, bool>,

    /// Branch history table - maps branch index to prediction state
    branch_history_table: HashMap<usize, PredictionState>,

    /// Statistics
    predictions: usize,
    correct_predictions: usize,
}

impl BranchPredictor {
    pub fn new(kind: BranchPredictorKind) -> Self {
        Self {
            kind,
            last_outcome: HashMap::new(),
            branch_history_table: HashMap::new(),
            predictions: 0,
            correct_predictions: 0,
        }
    }

    /// Predict the direction of the branch at instruction index `pc`
    pub fn predict(&mut self, pc: usize) -> bool {
        self.direction(pc)
    }

    fn direction(&self, pc: usize) -> bool {
        match self.kind {
            BranchPredictorKind::StaticNotTaken => false,
            BranchPredictorKind::OneBit => self.last_outcome.get(&pc).copied().unwrap_or(false),
            BranchPredictorKind::TwoBit => self
                .branch_history_table
                .get(&pc)
                .copied()
                .unwrap_or(PredictionState::WeaklyNotTaken)
                .is_taken(),
        }
    }

    /// Train on the resolved outcome (called when the branch commits).
    /// Accuracy counts resolved branches only: a squashed wrong-path branch
    /// is predicted but never commits.
    pub fn update(&mut self, pc: usize, taken: bool) {
        self.predictions += 1;
        if self.direction(pc) == taken {
            self.correct_predictions += 1;
        }

        match self.kind {
            BranchPredictorKind::StaticNotTaken => {},
            BranchPredictorKind::OneBit => {
                self.last_outcome.insert(pc, taken);
            },
            BranchPredictorKind::TwoBit => {
                let state = self
                    .branch_history_table
                    .get(&pc)
                    .copied()
                    .unwrap_or(PredictionState::WeaklyNotTaken);
                self.branch_history_table.insert(pc, state.update(taken));
            },
        }
    }

    /// Get prediction accuracy statistics
    pub fn get_accuracy(&self) -> f32 {
        if self.predictions == 0 {
            return 0.0;
        }
        (self.correct_predictions as f32) / (self.predictions as f32)
    }
}
