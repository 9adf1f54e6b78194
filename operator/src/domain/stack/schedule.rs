use std::time::Duration;

use crate::domain::{error::OperatorError, stack::entities::ReconcileOutcome};

pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Decides when the next pass for a stack runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSchedule {
    pub resync_interval: Duration,
    pub retry_interval: Duration,
}

impl Default for ReconcileSchedule {
    fn default() -> Self {
        Self {
            resync_interval: DEFAULT_RESYNC_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl ReconcileSchedule {
    /// Delay before the next pass, or `None` when the stack is gone and only
    /// a new change notification should trigger work.
    pub fn next_pass(&self, outcome: &ReconcileOutcome) -> Option<Duration> {
        match outcome {
            ReconcileOutcome::Converged => Some(self.resync_interval),
            ReconcileOutcome::Deleted => None,
        }
    }

    /// Retry delay is fixed; it does not grow with consecutive failures.
    pub fn after_error(&self, _error: &OperatorError) -> Duration {
        self.retry_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> ReconcileSchedule {
        ReconcileSchedule {
            resync_interval: Duration::from_secs(120),
            retry_interval: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_converged_pass_resyncs_periodically() {
        // Arrange
        let schedule = schedule();

        // Act
        let next = schedule.next_pass(&ReconcileOutcome::Converged);

        // Assert
        assert_eq!(next, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_deleted_stack_is_not_requeued() {
        // Arrange
        let schedule = schedule();

        // Act
        let next = schedule.next_pass(&ReconcileOutcome::Deleted);

        // Assert
        assert_eq!(next, None);
    }

    #[test]
    fn test_failed_pass_retries_after_fixed_interval() {
        // Arrange
        let schedule = schedule();
        let error = OperatorError::Timeout { seconds: 60 };

        // Act
        let first = schedule.after_error(&error);
        let second = schedule.after_error(&error);

        // Assert
        assert_eq!(first, Duration::from_secs(5));
        assert_eq!(second, Duration::from_secs(5));
    }
}
