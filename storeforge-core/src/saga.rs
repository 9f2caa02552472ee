//! Saga bookkeeping for one provisioning job.
//!
//! The log is ephemeral, in-memory state: it exists for the duration of a
//! single provisioning call and records which steps completed, so a failure
//! can walk the completed entries in reverse and run their compensating
//! actions.

use std::fmt;

/// Lifecycle of one saga step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Done,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Done => "done",
            StepStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Compensating action registered when a side-effecting step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// Force-drop the tenant schema; transitively removes anything later
    /// steps created inside it.
    DropSchema,
    /// Force-delete the tenant bucket.
    DeleteBucket,
}

#[derive(Debug, Clone)]
pub struct SagaStep {
    pub name: &'static str,
    pub status: StepStatus,
    compensation: Option<Compensation>,
}

/// Ordered step log for one provisioning job.
#[derive(Debug)]
pub struct SagaLog {
    subdomain: String,
    steps: Vec<SagaStep>,
}

impl SagaLog {
    pub fn new(subdomain: impl Into<String>, step_names: &[&'static str]) -> Self {
        Self {
            subdomain: subdomain.into(),
            steps: step_names
                .iter()
                .map(|name| SagaStep {
                    name,
                    status: StepStatus::Pending,
                    compensation: None,
                })
                .collect(),
        }
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn steps(&self) -> &[SagaStep] {
        &self.steps
    }

    /// Marks a step done, registering its compensating action if it has one.
    pub fn complete(&mut self, name: &str, compensation: Option<Compensation>) {
        if let Some(step) = self.step_mut(name) {
            step.status = StepStatus::Done;
            step.compensation = compensation;
        }
    }

    pub fn fail(&mut self, name: &str) {
        if let Some(step) = self.step_mut(name) {
            step.status = StepStatus::Failed;
        }
    }

    /// Compensations for completed steps, in reverse completion order.
    pub fn compensations(&self) -> Vec<Compensation> {
        self.steps
            .iter()
            .rev()
            .filter(|s| s.status == StepStatus::Done)
            .filter_map(|s| s.compensation)
            .collect()
    }

    fn step_mut(&mut self, name: &str) -> Option<&mut SagaStep> {
        self.steps.iter_mut().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEPS: &[&str] = &["create-schema", "run-migrations", "create-bucket"];

    #[test]
    fn test_steps_start_pending() {
        let log = SagaLog::new("shop", STEPS);
        assert!(log.steps().iter().all(|s| s.status == StepStatus::Pending));
        assert!(log.compensations().is_empty());
    }

    #[test]
    fn test_compensations_walk_in_reverse() {
        let mut log = SagaLog::new("shop", STEPS);
        log.complete("create-schema", Some(Compensation::DropSchema));
        log.complete("run-migrations", None);
        log.complete("create-bucket", Some(Compensation::DeleteBucket));

        assert_eq!(
            log.compensations(),
            vec![Compensation::DeleteBucket, Compensation::DropSchema]
        );
    }

    #[test]
    fn test_failed_step_registers_no_compensation() {
        let mut log = SagaLog::new("shop", STEPS);
        log.complete("create-schema", Some(Compensation::DropSchema));
        log.fail("run-migrations");

        assert_eq!(log.compensations(), vec![Compensation::DropSchema]);
        assert_eq!(log.steps()[1].status, StepStatus::Failed);
        assert_eq!(log.steps()[2].status, StepStatus::Pending);
    }
}
