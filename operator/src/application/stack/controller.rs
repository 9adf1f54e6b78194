use std::{sync::Arc, time::Duration};

use futures::{Stream, StreamExt};
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{PersistentVolumeClaim, Service},
};
use kube::{
    Api, Client, ResourceExt,
    runtime::{
        Controller, WatchStreamExt,
        controller::{self, Action},
        predicates, reflector, watcher,
    },
};
use tracing::{debug, error, info, warn};

use crate::domain::{
    common::OperatorConfig,
    error::OperatorError,
    stack::{
        entities::{RAGme, ReconcileOutcome},
        ports::StackService,
        synthesis::APP_LABEL_VALUE,
    },
};

pub struct Context<S>
where
    S: StackService,
{
    pub service: Arc<S>,
    pub config: OperatorConfig,
}

fn api_for<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    <K as kube::Resource>::DynamicType: Default,
{
    match namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    }
}

/// Runs a pass bounded by the configured deadline. Dropping the pass future
/// on timeout aborts whichever API call is in flight.
async fn run_pass<S>(
    service: &S,
    namespace: &str,
    name: &str,
    deadline: Duration,
) -> Result<ReconcileOutcome, OperatorError>
where
    S: StackService,
{
    match tokio::time::timeout(deadline, service.reconcile_stack(namespace, name)).await {
        Ok(result) => result,
        Err(_) => Err(OperatorError::Timeout {
            seconds: deadline.as_secs(),
        }),
    }
}

pub async fn reconcile<S>(stack: Arc<RAGme>, ctx: Arc<Context<S>>) -> Result<Action, OperatorError>
where
    S: StackService,
{
    let name = stack.name_any();
    let namespace = stack.namespace().ok_or_else(|| OperatorError::InvalidSpec {
        message: format!("stack {name} is not namespaced"),
    })?;

    let outcome = run_pass(
        ctx.service.as_ref(),
        &namespace,
        &name,
        ctx.config.reconcile_timeout,
    )
    .await?;

    Ok(match ctx.config.schedule.next_pass(&outcome) {
        Some(delay) => Action::requeue(delay),
        None => Action::await_change(),
    })
}

pub fn error_policy<S>(stack: Arc<RAGme>, error: &OperatorError, ctx: Arc<Context<S>>) -> Action
where
    S: StackService,
{
    let delay = ctx.config.schedule.after_error(error);
    let namespace = stack.namespace().unwrap_or_default();
    error!(
        namespace = %namespace,
        name = %stack.name_any(),
        retry_in_secs = delay.as_secs(),
        "reconcile failed: {}",
        error
    );
    Action::requeue(delay)
}

/// Stack objects whose spec changed since they were last seen.
///
/// Status writes never bump `metadata.generation`, so the phase updates made
/// by a pass do not trigger another pass.
pub fn spec_changes<St>(events: St) -> impl Stream<Item = Result<RAGme, watcher::Error>> + Send
where
    St: Stream<Item = Result<watcher::Event<RAGme>, watcher::Error>> + Send,
{
    events
        .applied_objects()
        .predicate_filter(predicates::generation)
}

/// Watches stacks and the objects they own until a shutdown signal arrives.
///
/// The runtime never runs two passes for the same stack at once; changes that
/// arrive mid-pass are folded into the next one.
pub async fn run_stack_controller<S>(client: Client, service: Arc<S>, config: OperatorConfig)
where
    S: StackService + 'static,
{
    let namespace = config.namespace.clone();
    let namespace = namespace.as_deref();

    let (reader, writer) = reflector::store();
    let stacks = spec_changes(
        watcher(api_for::<RAGme>(&client, namespace), watcher::Config::default())
            .default_backoff()
            .reflect(writer),
    );
    let children = watcher::Config::default().labels(&format!("app={APP_LABEL_VALUE}"));
    let controller_config = controller::Config::default().concurrency(config.concurrency);

    let context = Arc::new(Context { service, config });

    Controller::for_stream(stacks, reader)
        .with_config(controller_config)
        .owns(api_for::<Deployment>(&client, namespace), children.clone())
        .owns(api_for::<Service>(&client, namespace), children.clone())
        .owns(api_for::<PersistentVolumeClaim>(&client, namespace), children)
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => {
                    debug!(stack = %object.name, ?action, "reconciled");
                }
                Err(controller::Error::ReconcilerFailed(e, object)) => {
                    warn!(stack = %object.name, "reconcile pass failed: {}", e);
                }
                Err(e) => {
                    warn!("controller error: {}", e);
                }
            }
        })
        .await;

    info!("stack controller stream ended");
}
