//! Common test utilities for building flows and observing their execution.
use async_trait::async_trait;
use rensa::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Action that bumps a counter every time it runs.
#[allow(dead_code)]
pub fn counting_action(name: &str, counter: &Arc<AtomicUsize>) -> Arc<dyn ActionItem> {
    let counter = Arc::clone(counter);
    Arc::new(CallbackAction::new(name, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }))
}

/// Action that appends its tag to a shared order log.
#[allow(dead_code)]
pub fn recording_action(
    tag: &'static str,
    log: &Arc<Mutex<Vec<&'static str>>>,
) -> Arc<dyn ActionItem> {
    let log = Arc::clone(log);
    Arc::new(CallbackAction::new(tag, move || {
        log.lock().unwrap().push(tag);
    }))
}

/// Action whose run reports failure.
#[allow(dead_code)]
pub fn failing_action(name: &str) -> Arc<dyn ActionItem> {
    Arc::new(CallbackAction::new(name, || {}).with_result(false))
}

/// Action that signals entry and then blocks until released, for observing
/// in-progress state and detachment.
#[allow(dead_code)]
pub struct GateAction {
    pub entered: Arc<Semaphore>,
    pub release: Arc<Semaphore>,
}

#[async_trait]
impl ActionItem for GateAction {
    async fn run(&self, _ctx: &FlowContext) -> bool {
        self.entered.add_permits(1);
        if let Ok(permit) = self.release.acquire().await {
            permit.forget();
        }
        true
    }

    fn display_name(&self) -> &str {
        "Gate"
    }
}

/// Returns the gate action plus its entry and release signals.
#[allow(dead_code)]
pub fn gate_action() -> (Arc<GateAction>, Arc<Semaphore>, Arc<Semaphore>) {
    let entered = Arc::new(Semaphore::new(0));
    let release = Arc::new(Semaphore::new(0));
    let action = Arc::new(GateAction {
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    });
    (action, entered, release)
}

/// Builds an initialized flow with an empty local store.
#[allow(dead_code)]
pub fn flow_of(steps: Vec<Step>) -> Arc<Flow> {
    flow_with_locals("test", steps, VariableStore::new())
}

/// Builds an initialized flow with the given local store.
#[allow(dead_code)]
pub fn flow_with_locals(name: &str, steps: Vec<Step>, locals: VariableStore) -> Arc<Flow> {
    let flow = Flow::new(name, steps, locals, None, Arc::new(ObjectRegistry::new()));
    flow.init();
    flow
}

/// A bare context for exercising bindings without a running flow.
#[allow(dead_code)]
pub fn context_with(locals: VariableStore) -> FlowContext {
    FlowContext::new("test", locals, None, Arc::new(ObjectRegistry::new()))
}

#[allow(dead_code)]
pub fn context_with_globals(locals: VariableStore, globals: Arc<GlobalVariables>) -> FlowContext {
    FlowContext::new(
        "test",
        locals,
        Some(globals),
        Arc::new(ObjectRegistry::new()),
    )
}

/// Polls `condition` until it holds, failing the test after two seconds.
#[allow(dead_code)]
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition was not reached in time");
}
