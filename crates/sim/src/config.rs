//! Run configuration loaded from TOML.
//!
//! ```toml
//! base_temperature = 318.5        # K
//! convection_coefficient = 1200.0 # W/(m²·K)
//! steady_state = true
//! transient = true
//!
//! [[phases]]
//! duration = 0.001 # s
//! steps = 2
//! ```
//!
//! Every field is optional and falls back to [`RunConfig::default`].

use std::{fs, path::Path};

use ctm_core::mna::DEFAULT_CONVECTION_COEFFICIENT;
use ctm_solvers::transient::{Phase, PhaseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    f64::{HeatTransfer, ThermodynamicTemperature, Time},
    heat_transfer::watt_per_square_meter_kelvin,
    thermodynamic_temperature::kelvin,
    time::second,
};

/// Default ambient temperature, in kelvin.
pub const DEFAULT_BASE_TEMPERATURE: f64 = 318.5;

/// Errors that can occur while loading or validating a [`RunConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid run configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("base temperature must be finite and positive, got {0} K")]
    BaseTemperature(f64),

    #[error("convection coefficient must be finite and non-negative, got {0} W/(m²·K)")]
    Convection(f64),

    #[error("phase {index}: {source}")]
    Phase {
        index: usize,
        #[source]
        source: PhaseError,
    },

    #[error("a transient run needs at least one phase")]
    NoPhases,
}

/// What to simulate and under which ambient conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Ambient temperature added to every solved rise before reporting.
    pub base_temperature: ThermodynamicTemperature,

    /// Convection coefficient on the top face of the top layer.
    pub convection_coefficient: HeatTransfer,

    /// Whether [`Simulation::run`] solves for steady state.
    ///
    /// [`Simulation::run`]: crate::Simulation::run
    pub steady_state: bool,

    /// Whether [`Simulation::run`] integrates the phase schedule.
    ///
    /// [`Simulation::run`]: crate::Simulation::run
    pub transient: bool,

    /// Transient schedule, in order.
    pub phases: Vec<PhaseConfig>,
}

/// One serialized entry of the transient schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseConfig {
    pub duration: Time,
    pub steps: usize,
}

impl PhaseConfig {
    #[must_use]
    pub fn new(duration: f64, steps: usize) -> Self {
        Self {
            duration: Time::new::<second>(duration),
            steps,
        }
    }
}

impl Default for RunConfig {
    /// Steady state only, at 318.5 K with 1200 W/(m²·K) convection.
    fn default() -> Self {
        Self {
            base_temperature: ThermodynamicTemperature::new::<kelvin>(DEFAULT_BASE_TEMPERATURE),
            convection_coefficient: HeatTransfer::new::<watt_per_square_meter_kelvin>(
                DEFAULT_CONVECTION_COEFFICIENT,
            ),
            steady_state: true,
            transient: false,
            phases: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Parses and validates a TOML run configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the text is not a valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML run configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_temperature_k();
        if !base.is_finite() || base <= 0.0 {
            return Err(ConfigError::BaseTemperature(base));
        }

        let h = self.convection();
        if !h.is_finite() || h < 0.0 {
            return Err(ConfigError::Convection(h));
        }

        if self.transient && self.phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }
        self.schedule().map(|_| ())
    }

    /// Returns the validated transient schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Phase`] for the first invalid phase.
    pub fn schedule(&self) -> Result<Vec<Phase>, ConfigError> {
        self.phases
            .iter()
            .enumerate()
            .map(|(index, phase)| {
                Phase::new(phase.duration.get::<second>(), phase.steps)
                    .map_err(|source| ConfigError::Phase { index, source })
            })
            .collect()
    }

    /// Returns the base temperature in kelvin.
    #[must_use]
    pub fn base_temperature_k(&self) -> f64 {
        self.base_temperature.get::<kelvin>()
    }

    /// Returns the convection coefficient in W/(m²·K).
    #[must_use]
    pub fn convection(&self) -> f64 {
        self.convection_coefficient
            .get::<watt_per_square_meter_kelvin>()
    }
}
