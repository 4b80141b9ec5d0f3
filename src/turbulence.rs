//! Synthetic turbulence as a frozen sum of sinusoids.
//!
//! A [`TurbulenceSignal`] draws its harmonics once at construction and never
//! changes afterwards, so sampling is a pure function of elapsed time:
//!
//! ```
//! use propwash::{TurbulenceParams, TurbulenceSignal};
//!
//! let pitch = TurbulenceSignal::seeded(TurbulenceParams::pitch_default(), 7);
//! let a = pitch.sample(1.25);
//! let b = pitch.sample(1.25);
//! assert_eq!(a.to_bits(), b.to_bits());
//! assert!(a.abs() <= pitch.amplitude_bound());
//! ```
//!
//! The signal is not a physical model; it only has to look irregular.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::config::ConfigError;

/// Ranges the harmonics of a [`TurbulenceSignal`] are drawn from.
///
/// Amplitudes are in degrees, periods in seconds. `phase_bias` (radians) is
/// added to every drawn phase and `frequency_bias` (radians per second) to
/// every drawn angular frequency.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TurbulenceParams {
    pub harmonic_count: usize,
    pub min_amplitude: f64,
    pub max_amplitude: f64,
    pub phase_bias: f64,
    pub frequency_bias: f64,
    pub min_period: f64,
    pub max_period: f64,
}

impl Default for TurbulenceParams {
    fn default() -> Self {
        Self::pitch_default()
    }
}

impl TurbulenceParams {
    /// Gentle, fast pitch chop: 10 harmonics, ±0.2°, periods 0.1–2 s.
    pub fn pitch_default() -> Self {
        Self {
            harmonic_count: 10,
            min_amplitude: -0.2,
            max_amplitude: 0.2,
            phase_bias: 0.0,
            frequency_bias: 0.0,
            min_period: 0.1,
            max_period: 2.0,
        }
    }

    /// Stronger, slower roll wobble: 20 harmonics, ±0.6°, periods 0.1–4 s.
    pub fn roll_default() -> Self {
        Self {
            harmonic_count: 20,
            min_amplitude: -0.6,
            max_amplitude: 0.6,
            phase_bias: 0.0,
            frequency_bias: 0.0,
            min_period: 0.1,
            max_period: 4.0,
        }
    }

    /// Checks the ranges before any harmonic is drawn from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.min_amplitude,
            self.max_amplitude,
            self.phase_bias,
            self.frequency_bias,
            self.min_period,
            self.max_period,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid(
                "turbulence parameters must be finite".to_string(),
            ));
        }
        if self.min_amplitude > self.max_amplitude {
            return Err(ConfigError::Invalid(format!(
                "turbulence amplitude range is empty ({} > {})",
                self.min_amplitude, self.max_amplitude
            )));
        }
        if self.min_period <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "turbulence periods must be positive (min_period = {})",
                self.min_period
            )));
        }
        if self.min_period > self.max_period {
            return Err(ConfigError::Invalid(format!(
                "turbulence period range is empty ({} > {})",
                self.min_period, self.max_period
            )));
        }
        Ok(())
    }
}

/// One sinusoidal term of the signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Harmonic {
    /// Peak offset in degrees. May be negative.
    pub amplitude: f64,
    /// Phase in radians.
    pub phase: f64,
    /// Angular frequency in radians per second.
    pub angular_frequency: f64,
}

impl Harmonic {
    fn draw<R: Rng + ?Sized>(params: &TurbulenceParams, rng: &mut R) -> Self {
        let amplitude = rng.random_range(params.min_amplitude..=params.max_amplitude);
        let phase = params.phase_bias + rng.random_range(0.0..TAU);
        let period = rng.random_range(params.min_period..=params.max_period);

        Self {
            amplitude,
            phase,
            angular_frequency: TAU / period + params.frequency_bias,
        }
    }

    fn eval(&self, t: f64) -> f64 {
        self.amplitude * (self.angular_frequency * t + self.phase).sin()
    }
}

/// Deterministic-but-irregular scalar offset generator.
///
/// Immutable after construction, so it can be shared by reference and sampled
/// from anywhere without synchronization.
#[derive(Clone, Debug)]
pub struct TurbulenceSignal {
    harmonics: Vec<Harmonic>,
}

impl TurbulenceSignal {
    /// Draws `params.harmonic_count` harmonics from `rng`.
    ///
    /// `params` must satisfy [`TurbulenceParams::validate`]; an empty range
    /// panics inside the random source.
    pub fn new<R: Rng + ?Sized>(params: TurbulenceParams, rng: &mut R) -> Self {
        let harmonics = (0..params.harmonic_count)
            .map(|_| Harmonic::draw(&params, rng))
            .collect();
        Self { harmonics }
    }

    /// Reproducible generator: the same seed always yields the same harmonics.
    pub fn seeded(params: TurbulenceParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(params, &mut rng)
    }

    /// Generator seeded from thread entropy; differs from run to run.
    pub fn from_entropy(params: TurbulenceParams) -> Self {
        Self::new(params, &mut rand::rng())
    }

    /// Builds a signal from explicit harmonics.
    pub fn from_harmonics(harmonics: Vec<Harmonic>) -> Self {
        Self { harmonics }
    }

    pub fn harmonics(&self) -> &[Harmonic] {
        &self.harmonics
    }

    /// Sum of the absolute harmonic amplitudes; `|sample(t)|` never exceeds it.
    pub fn amplitude_bound(&self) -> f32 {
        self.harmonics.iter().map(|h| h.amplitude.abs()).sum::<f64>() as f32
    }

    /// Offset in degrees at `elapsed` seconds. Negative times are ordinary phase input.
    pub fn sample(&self, elapsed: f64) -> f32 {
        self.harmonics.iter().map(|h| h.eval(elapsed)).sum::<f64>() as f32
    }
}
