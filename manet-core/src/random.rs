use rand_chacha::ChaChaRng;
use rand_core::{Rng as _, SeedableRng as _};
use thiserror::Error;

/// A deterministic source of random numbers.
///
/// Every component that needs randomness owns its own stream, derived from
/// the simulation seed and a stream number (for example the node index).
/// Re-running a simulation with the same seed reproduces exactly the same
/// sequence of draws, regardless of the order in which the components
/// consume them.
///
/// ```
/// # use manet_core::random::RandomStream;
/// let mut a = RandomStream::new(1, 7);
/// let mut b = RandomStream::new(1, 7);
/// assert_eq!(a.next_f64(), b.next_f64());
/// ```
pub struct RandomStream(ChaChaRng);

/// A validated closed interval `[min, max]` to draw uniform values from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid uniform range [{min}, {max}]: bounds must be finite and min <= max")]
pub struct UniformError {
    min: f64,
    max: f64,
}

impl RandomStream {
    pub fn new(seed: u64, stream: u64) -> Self {
        Self(ChaChaRng::seed_from_u64(splitmix64(seed ^ splitmix64(stream))))
    }

    /// draw a value in `[0.0, 1.0)`
    pub fn next_f64(&mut self) -> f64 {
        // keep the 53 most significant bits: the precision of an f64 mantissa
        (self.0.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn sample(&mut self, range: Uniform) -> f64 {
        range.min + (range.max - range.min) * self.next_f64()
    }
}

impl Uniform {
    pub fn new(min: f64, max: f64) -> Result<Self, UniformError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(UniformError { min, max });
        }
        Ok(Self { min, max })
    }

    /// always return the same value
    pub fn constant(value: f64) -> Result<Self, UniformError> {
        Self::new(value, value)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
