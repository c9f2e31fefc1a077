//! Aggregate statistics of a simulation run.

use crate::network::RouterId;
use serde::{Deserialize, Serialize};

/// Min/max/mean/sample-standard-deviation over one sequence of counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl SampleSummary {
    /// Two-pass aggregation: mean first, then the sum of squared deviations
    /// over N - 1. The one-pass sum-of-squares shortcut loses precision on
    /// large samples. A single-element sample yields a NaN deviation, which
    /// is observable and accepted. Summarizing an empty sample is a
    /// programmer error.
    pub fn of(values: &[usize]) -> Self {
        assert!(!values.is_empty(), "summary of an empty sample");

        let mut min = values[0];
        let mut max = values[0];
        let mut sum = 0usize;
        for &value in values {
            min = min.min(value);
            max = max.max(value);
            sum += value;
        }

        let mean = sum as f64 / values.len() as f64;
        let squared_deviations: f64 = values
            .iter()
            .map(|&value| {
                let deviation = value as f64 - mean;
                deviation * deviation
            })
            .sum();
        let std_dev = (squared_deviations / (values.len() as f64 - 1.0)).sqrt();

        Self {
            min,
            max,
            mean,
            std_dev,
        }
    }
}

/// Statistical results of one simulation run.
///
/// Queue lengths are sampled per router per cycle; the transmission duration
/// of a packet is the length of its history (cycles from injection to
/// delivery inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatistics {
    pub queue_length: SampleSummary,
    pub transmission_duration: SampleSummary,
    pub cycles: u64,
}

impl SimulationStatistics {
    pub(crate) fn from_samples(
        queue_samples: &[usize],
        histories: &[Vec<RouterId>],
        cycles: u64,
    ) -> Self {
        let durations: Vec<usize> = histories.iter().map(Vec::len).collect();

        Self {
            queue_length: SampleSummary::of(queue_samples),
            transmission_duration: SampleSummary::of(&durations),
            cycles,
        }
    }
}

impl std::fmt::Display for SimulationStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Minimum queue length:          {}", self.queue_length.min)?;
        writeln!(f, "Maximum queue length:          {}", self.queue_length.max)?;
        writeln!(f, "Average queue length:          {}", self.queue_length.mean)?;
        writeln!(f, "Queue length s.d.:             {}", self.queue_length.std_dev)?;
        writeln!(
            f,
            "Minimum transmission duration: {}",
            self.transmission_duration.min
        )?;
        writeln!(
            f,
            "Maximum transmission duration: {}",
            self.transmission_duration.max
        )?;
        writeln!(
            f,
            "Average transmission duration: {}",
            self.transmission_duration.mean
        )?;
        writeln!(
            f,
            "Transmission duration s.d.:    {}",
            self.transmission_duration.std_dev
        )?;
        write!(f, "Total network cycles:          {}", self.cycles)
    }
}
