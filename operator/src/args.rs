use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::domain::{
    common::{Environment, OperatorConfig},
    stack::schedule::ReconcileSchedule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Env {
    Test,
    Development,
    Production,
}

impl From<Env> for Environment {
    fn from(env: Env) -> Self {
        match env {
            Env::Test => Environment::Test,
            Env::Development => Environment::Development,
            Env::Production => Environment::Production,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ragme-operator", version, about = "Reconciles RAGme stacks")]
pub struct Args {
    #[arg(long, env = "ENV", value_enum, default_value = "development")]
    pub env: Env,

    /// Watch a single namespace instead of the whole cluster.
    #[arg(long, env = "RAGME_NAMESPACE")]
    pub namespace: Option<String>,

    #[arg(long, env = "RAGME_RESYNC_INTERVAL_SECS", default_value_t = 300)]
    pub resync_interval_secs: u64,

    #[arg(long, env = "RAGME_RETRY_INTERVAL_SECS", default_value_t = 10)]
    pub retry_interval_secs: u64,

    #[arg(long, env = "RAGME_RECONCILE_TIMEOUT_SECS", default_value_t = 60)]
    pub reconcile_timeout_secs: u64,

    #[arg(long, env = "RAGME_CONCURRENCY", default_value_t = 4)]
    pub concurrency: u16,

    /// Filter used when `RUST_LOG` is unset.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl From<Args> for OperatorConfig {
    fn from(args: Args) -> Self {
        OperatorConfig {
            env: args.env.into(),
            namespace: args.namespace,
            schedule: ReconcileSchedule {
                resync_interval: Duration::from_secs(args.resync_interval_secs),
                retry_interval: Duration::from_secs(args.retry_interval_secs),
            },
            reconcile_timeout: Duration::from_secs(args.reconcile_timeout_secs),
            concurrency: args.concurrency,
        }
    }
}
