use std::sync::Arc;
use std::time::Instant;

use super::worker::StopSignal;

/// Decides, before each operation, whether a worker may start another one.
///
/// Bounded modes cap each worker at `requests` operations; timed modes refuse new work
/// once `deadline` has passed. Every mode stops once the run's [`StopSignal`] has fired.
/// The check happens at iteration boundaries only, so an operation already in flight
/// always completes.
#[derive(Debug, Clone)]
pub struct IterationGate {
    requests: Option<u64>,
    deadline: Option<Instant>,
    stop: Arc<StopSignal>,
}

impl IterationGate {
    pub fn new(requests: Option<u64>, deadline: Option<Instant>, stop: Arc<StopSignal>) -> Self {
        Self {
            requests,
            deadline,
            stop,
        }
    }

    pub fn next(&self, op_index: u64) -> bool {
        if self.stop.is_fired() {
            return false;
        }

        // Checked here as well as by the run's timer, which may not get scheduled while
        // workers are busy with calls that never suspend.
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return false;
        }

        match self.requests {
            Some(total) => op_index < total,
            None => true,
        }
    }

    pub fn stop(&self) -> &StopSignal {
        &self.stop
    }
}
