//! Mulberry32 pseudo-random generator
//!
//! Every client of a room draws the same board from the same seed, including
//! clients written in other languages, so this must match the reference
//! mulberry32 bit for bit. All arithmetic wraps on 32 bits and every shift is
//! logical.

/// Mulberry32 generator state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Seeds the generator; only the low 32 bits of `seed` are used
    pub fn new(seed: u64) -> Self {
        Self { state: seed as u32 }
    }

    /// Draws the next raw 32-bit value
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Draws a value uniformly in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Draws an index uniformly in `0..len` as `floor(next_f64() * len)`
    ///
    /// `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        (self.next_f64() * len as f64).floor() as usize
    }
}
