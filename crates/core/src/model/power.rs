/// Power dissipated by a block or unit, in watts.
///
/// A power is either constant for the whole run or given per transient
/// phase. In serialized form a constant is a plain number and a phased power
/// is an array of numbers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(untagged))]
pub enum Power {
    /// The same power in every phase.
    Constant(f64),

    /// One power value per transient phase, in phase order.
    Phased(Vec<f64>),
}

impl Default for Power {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

impl From<f64> for Power {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<Vec<f64>> for Power {
    fn from(values: Vec<f64>) -> Self {
        Self::Phased(values)
    }
}

impl Power {
    /// Returns this power divided evenly into `parts` shares.
    ///
    /// Phased powers are divided element-wise.
    #[must_use]
    pub fn split(&self, parts: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let parts = parts as f64;
        match self {
            Self::Constant(value) => Self::Constant(value / parts),
            Self::Phased(values) => Self::Phased(values.iter().map(|v| v / parts).collect()),
        }
    }

    /// Returns the power used for a steady-state solve.
    ///
    /// A phased power contributes its first phase; an empty phase list
    /// contributes nothing.
    #[must_use]
    pub fn steady(&self) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Phased(values) => values.first().copied().unwrap_or(0.0),
        }
    }

    /// Returns the power during the given phase.
    ///
    /// Returns `None` if a phased power has no entry for `phase`.
    #[must_use]
    pub fn at_phase(&self, phase: usize) -> Option<f64> {
        match self {
            Self::Constant(value) => Some(*value),
            Self::Phased(values) => values.get(phase).copied(),
        }
    }

    /// Returns the number of phases a phased power defines.
    ///
    /// Returns `None` for a constant power, which fits any schedule.
    #[must_use]
    pub fn phase_count(&self) -> Option<usize> {
        match self {
            Self::Constant(_) => None,
            Self::Phased(values) => Some(values.len()),
        }
    }
}
