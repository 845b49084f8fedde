//! Rolling IV table that supplies the per-section Salsa20 nonce.
//!
//! # Layout
//! A 0x4000-byte working buffer, seeded once from the container's identifier
//! string, plus four lane counters (lane = section index mod 4) that start at
//! 1 and advance once per section processed on that lane.
//!
//! # Schedule
//! - `seed_for(lane)` reads 8 bytes at slot `(lane + 4*(counter-1)) % 800`,
//!   stride 20.
//! - `fold(lane, digest)` XORs the section's SHA-1 digest in at
//!   `4 * ((lane + 4*counter) % 800 * 5)`, in four 5-byte groups, then
//!   advances the counter.
//!
//! The two addressings are intentionally different (`counter - 1` vs
//! `counter`, stride 20 vs stride 5 inside a ×4 address). Both must stay
//! exactly as written or the nonce sequence no longer matches what the
//! containers were encrypted with.

use crate::crypto::{Nonce, SectionDigest, DIGEST_LEN, NONCE_LEN};

pub const TABLE_SIZE: usize = 0x4000;
pub const LANES:      usize = 4;
pub const SLOTS:      usize = 800;
pub const SLOT_SIZE:  usize = 20;

#[derive(Clone)]
pub struct IvTable {
    table:    Box<[u8; TABLE_SIZE]>,
    counters: [u32; LANES],
}

impl IvTable {
    /// Build the table from the identifier blob.
    ///
    /// The identifier is read as a C string: everything up to the first zero
    /// byte (or the whole slice if there is none). An empty identifier leaves
    /// the buffer zeroed.
    pub fn new(identifier: &[u8]) -> Self {
        let mut table = Self {
            table:    Box::new([0u8; TABLE_SIZE]),
            counters: [1; LANES],
        };
        table.fill(c_str(identifier));
        table
    }

    /// Tiles `name` across the buffer in blocks of `4 * name.len()` bytes,
    /// each 4-byte group holding one character.
    ///
    /// The bounds check runs before `add_div` is refreshed, so it sees the
    /// previous group's character index. For some lengths this stops the
    /// fill one group short of the end of the buffer.
    fn fill(&mut self, name: &[u8]) {
        let block = name.len() * 4;
        if block == 0 {
            return;
        }

        let mut add_div = 0usize;
        for i in (0..TABLE_SIZE).step_by(block) {
            for x in (0..block).step_by(4) {
                if i + add_div >= TABLE_SIZE || i + x >= TABLE_SIZE {
                    return;
                }
                add_div = if x > 0 { x / 4 } else { 0 };
                self.table[i + x..i + x + 4].fill(name[add_div]);
            }
        }
    }

    /// Nonce for the next section on `lane`. Does not advance the lane.
    pub fn seed_for(&self, lane: usize) -> Nonce {
        let lane = lane % LANES;
        let slot = (lane + 4 * (self.counters[lane] as usize - 1)) % SLOTS;
        let start = slot * SLOT_SIZE;
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&self.table[start..start + NONCE_LEN]);
        nonce
    }

    /// Mix a ciphertext digest into `lane` and advance its counter.
    pub fn fold(&mut self, lane: usize, digest: &SectionDigest) {
        let lane = lane % LANES;
        for i in (0..DIGEST_LEN).step_by(5) {
            let value = (lane + 4 * self.counters[lane] as usize) % SLOTS * 5;
            for x in 0..5 {
                self.table[4 * value + x + i] ^= digest[i + x];
            }
        }
        self.counters[lane] = self.counters[lane].wrapping_add(1);
    }

    pub fn counter(&self, lane: usize) -> u32 {
        self.counters[lane % LANES]
    }

    pub fn as_bytes(&self) -> &[u8; TABLE_SIZE] {
        &self.table
    }
}

impl std::fmt::Debug for IvTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IvTable")
            .field("counters", &self.counters)
            .field("head", &hex::encode(&self.table[..SLOT_SIZE]))
            .finish()
    }
}

fn c_str(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}
