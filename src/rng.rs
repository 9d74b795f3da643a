use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

/// The deterministic random stream behind the input instruction.
///
/// PCG-XSH-RR 64/32: a published generator with a stable output sequence,
/// so the same seed reproduces the same run on any implementation. The
/// stream is keyed once from the configured seed and never reseeds from
/// ambient entropy.
pub struct RngStream {
    rng: Pcg32,
}

impl RngStream {
    pub fn seed(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// The next cell value: the low byte of the next generator output.
    pub fn next_byte(&mut self) -> u8 {
        (self.rng.next_u32() & 0xff) as u8
    }
}
