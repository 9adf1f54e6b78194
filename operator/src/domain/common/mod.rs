use std::time::Duration;

use crate::domain::stack::schedule::ReconcileSchedule;

pub mod services;

#[derive(Debug, Clone)]
pub struct OperatorConfig {
    pub env: Environment,
    /// Restricts the controller to one namespace; all namespaces when `None`.
    pub namespace: Option<String>,
    pub schedule: ReconcileSchedule,
    pub reconcile_timeout: Duration,
    /// Upper bound on passes running at once across distinct stacks.
    pub concurrency: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Test,
    Development,
    Production,
}
