use std::fmt::{self, Display};

use average::{Estimate, Mean};
use serde::Serialize;

use scheduler::{InvalidInput, Process};

/// Averages over a set of finished processes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub waiting: f64,
    pub turnaround: f64,
    pub response: f64,
}

impl Metrics {
    /// Computes the mean waiting, turnaround and response times.
    ///
    /// Fails on an empty set and on any process that has not finished,
    /// instead of returning `NaN`.
    pub fn from_processes(processes: &[Process]) -> Result<Metrics, InvalidInput> {
        if processes.is_empty() {
            return Err(InvalidInput::NoProcesses);
        }

        let mut waiting = Mean::new();
        let mut turnaround = Mean::new();
        let mut response = Mean::new();
        for process in processes {
            let (Some(w), Some(t), Some(r)) =
                (process.waiting(), process.turnaround(), process.response())
            else {
                return Err(InvalidInput::Unfinished(process.pid()));
            };
            waiting.add(w as f64);
            turnaround.add(t as f64);
            response.add(r as f64);
        }

        Ok(Metrics {
            waiting: waiting.estimate(),
            turnaround: turnaround.estimate(),
            response: response.estimate(),
        })
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average waiting {:.2}", self.waiting)?;
        writeln!(f, "Average turnaround {:.2}", self.turnaround)?;
        writeln!(f, "Average response {:.2}", self.response)
    }
}
