//! Uniform chooser backed by a small PRNG.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use crate::chooser::Chooser;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Uniform`] chooser.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum UniformError {
    /// Failed to initialize the random number generator.
    #[error("Failed to initialize the random number generator.")]
    RngInitFailed,
}

/// A chooser drawing from a uniform distribution.
///
/// The generator is a [`SmallRng`]: it is fast and has a small state, but is
/// not cryptographically secure. Balance only relies on the choices being
/// independent of the order in which keys arrive.
#[derive(Debug)]
pub struct Uniform {
    /// The random number generator.
    rng: SmallRng,
}

impl Uniform {
    /// Create a new chooser seeded from the thread-local generator.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Uniform {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// Create a new chooser with a fixed seed.
    ///
    /// Two choosers built from the same seed make the same sequence of
    /// choices, so trees built from the same operations have the same shape.
    #[inline]
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Uniform {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a new chooser seeded directly from the operating system.
    ///
    /// # Errors
    ///
    /// Fails if the operating system's entropy source is unavailable.
    #[inline]
    pub fn from_os_rng() -> Result<Self, UniformError> {
        Ok(Uniform {
            rng: SmallRng::try_from_os_rng().map_err(|_err| UniformError::RngInitFailed)?,
        })
    }
}

impl Default for Uniform {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for Uniform {
    #[inline]
    fn below(&mut self, bound: usize) -> usize {
        self.rng.random_range(0..bound)
    }

    #[inline]
    fn fork(&mut self) -> Self {
        Uniform {
            rng: SmallRng::from_rng(&mut self.rng),
        }
    }
}
