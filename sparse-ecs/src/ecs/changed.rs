// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Per-slot change bits
//!
//! One bit per dense slot, set when the slot is written and cleared at the
//! start of every frame. Words are atomic so that workers of a parallel
//! transform can set bits that share a word without losing each other's
//! writes; exclusive paths go through `get_mut` and pay nothing for it.

use std::sync::atomic::{AtomicU64, Ordering};

const WORD_BITS: usize = 64;

/// Growable bitset with lock-free concurrent set
#[derive(Debug, Default)]
pub struct ChangedBits {
    words: Vec<AtomicU64>,
}

#[inline]
fn split(bit: usize) -> (usize, u64) {
    (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
}

impl ChangedBits {
    /// Create an empty bitset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bitset covering at least `bits` slots
    pub fn with_capacity(bits: usize) -> Self {
        let mut changed = Self::new();
        changed.grow(bits);
        changed
    }

    /// Number of bits currently addressable
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Ensure at least `bits` slots are addressable; new bits are clear
    pub fn grow(&mut self, bits: usize) {
        let needed = (bits + WORD_BITS - 1) / WORD_BITS;
        if needed > self.words.len() {
            let target = needed.max(self.words.len() * 2);
            self.words.resize_with(target, || AtomicU64::new(0));
        }
    }

    /// Test a bit; out-of-range bits read as clear
    #[inline]
    pub fn get(&self, bit: usize) -> bool {
        let (word, mask) = split(bit);
        self.words
            .get(word)
            .map_or(false, |w| w.load(Ordering::Relaxed) & mask != 0)
    }

    /// Set or clear a bit through exclusive access
    #[inline]
    pub fn assign(&mut self, bit: usize, value: bool) {
        let (word, mask) = split(bit);
        let w = self.words[word].get_mut();
        if value {
            *w |= mask;
        } else {
            *w &= !mask;
        }
    }

    /// Set a bit through shared access
    ///
    /// Uses an atomic OR so concurrent sets to bits of the same word all land.
    #[inline]
    pub fn set_atomic(&self, bit: usize) {
        let (word, mask) = split(bit);
        self.words[word].fetch_or(mask, Ordering::Relaxed);
    }

    /// Clear every bit
    pub fn clear(&mut self) {
        for word in &mut self.words {
            *word.get_mut() = 0;
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }
}
