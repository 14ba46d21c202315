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

// functional_unit.rs
//
// This file contains the functional units. The model is iterative: a unit
// serves one operation for `latency` cycles before becoming free again. The
// remaining-cycle counter lives in the reservation-station entry the unit is
// serving; the unit itself only tracks occupancy.

use super::reservation_station::RsKind;

/// An iterative functional unit of one class
#[derive(Debug, Clone)]
pub struct FunctionalUnit {
    pub kind: RsKind,
    pub busy: bool,
    /// Index of the reservation-station entry being served, within the pool
    /// of the same kind
    pub rs_index: Option<usize>,
}

impl FunctionalUnit {
    pub fn new(kind: RsKind) -> Self {
        Self {
            kind,
            busy: false,
            rs_index: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.busy
    }

    pub fn start(&mut self, rs_index: usize) {
        self.busy = true;
        self.rs_index = Some(rs_index);
    }

    pub fn reset(&mut self) {
        self.busy = false;
        self.rs_index = None;
    }
}

/// Build the unit set from per-class counts
pub fn build_units(alu: usize, muldiv: usize, load: usize, store: usize, branch: usize) -> Vec<FunctionalUnit> {
    let mut units = Vec::with_capacity(alu + muldiv + load + store + branch);
    for (kind, count) in [
        (RsKind::Alu, alu),
        (RsKind::MulDiv, muldiv),
        (RsKind::Load, load),
        (RsKind::Store, store),
        (RsKind::Branch, branch),
    ] {
        for _ in 0..count {
            units.push(FunctionalUnit::new(kind));
        }
    }
    units
}
