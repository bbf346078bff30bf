//! The flow interpreter: an ordered step list walked by a cooperative,
//! pausable state machine.
//!
//! A [`Flow`] executes its steps strictly in index order, modulo jumps. The
//! only suspension points are a `Wait` step's action, a `Pause` finish
//! blocking until [`Flow::resume`], and an awaited sub-flow. `NotWait` steps
//! and jump targets are spawned as independent continuations whose outcome
//! the spawning run never observes.

use crate::action::FlowSignal;
use crate::registry::ObjectRegistry;
use crate::variable::{GlobalVariables, VariableStore};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tokio::sync::Notify;
use tracing::{debug, warn};

pub mod step;

pub use step::{FinishType, RunType, Step};

/// Boxed future used for flow execution, which recurses through spawned
/// continuations and sub-flow dispatch.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Externally observable execution state of a flow.
///
/// `Running` is re-entered from `Paused` on resume. Detached continuations
/// share the same cell, so the value reflects the most recent transition
/// from any run of this flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlowState {
    Idle = 0,
    Running = 1,
    Paused = 2,
    Stopped = 3,
    Completed = 4,
    Failed = 5,
}

impl FlowState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => FlowState::Running,
            2 => FlowState::Paused,
            3 => FlowState::Stopped,
            4 => FlowState::Completed,
            5 => FlowState::Failed,
            _ => FlowState::Idle,
        }
    }
}

/// What a running action sees of its owning flow: the local store, the
/// optional shared globals, and the object registry. Cheap to clone and
/// shared with detached continuations.
#[derive(Debug, Clone)]
pub struct FlowContext {
    name: Arc<str>,
    locals: Arc<RwLock<VariableStore>>,
    globals: Option<Arc<GlobalVariables>>,
    registry: Arc<ObjectRegistry>,
}

impl FlowContext {
    pub fn new(
        name: &str,
        locals: VariableStore,
        globals: Option<Arc<GlobalVariables>>,
        registry: Arc<ObjectRegistry>,
    ) -> Self {
        Self {
            name: Arc::from(name),
            locals: Arc::new(RwLock::new(locals)),
            globals,
            registry,
        }
    }

    pub fn flow_name(&self) -> &str {
        &self.name
    }

    /// Read access to the flow-owned local store.
    pub fn locals(&self) -> RwLockReadGuard<'_, VariableStore> {
        self.locals.read()
    }

    /// Write access to the flow-owned local store. The lock is per-call;
    /// do not hold the guard across an await point.
    pub fn locals_mut(&self) -> RwLockWriteGuard<'_, VariableStore> {
        self.locals.write()
    }

    pub fn globals(&self) -> Option<&Arc<GlobalVariables>> {
        self.globals.as_ref()
    }

    pub fn registry(&self) -> &Arc<ObjectRegistry> {
        &self.registry
    }
}

/// An ordered sequence of steps plus its local variable store and an
/// optional reference to a shared global store.
///
/// Flows are shared by `Arc`: detached continuations, sub-flow references
/// and external controllers all hold the same instance. Execution state
/// (stop flag, pause flag, per-step in-progress markers) lives behind
/// atomics; the step list itself is immutable once built.
pub struct Flow {
    ctx: FlowContext,
    steps: Vec<Step>,
    stopped: AtomicBool,
    paused: AtomicBool,
    resume_signal: Notify,
    state: AtomicU8,
}

impl Flow {
    pub fn new(
        name: impl Into<String>,
        steps: Vec<Step>,
        locals: VariableStore,
        globals: Option<Arc<GlobalVariables>>,
        registry: Arc<ObjectRegistry>,
    ) -> Arc<Self> {
        let name = name.into();
        Arc::new(Self {
            ctx: FlowContext::new(&name, locals, globals, registry),
            steps,
            stopped: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            resume_signal: Notify::new(),
            state: AtomicU8::new(FlowState::Idle as u8),
        })
    }

    pub fn name(&self) -> &str {
        self.ctx.flow_name()
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn state(&self) -> FlowState {
        FlowState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Runs every action's `initialize` hook. Called once before the first
    /// execution; the builder does this for document-built flows.
    pub fn init(&self) {
        for step in &self.steps {
            step.item().initialize(&self.ctx);
        }
    }

    /// Runs every action's `cleanup` hook. Never invoked automatically,
    /// not even on failure; cleanup timing is the owner's decision.
    pub fn shutdown(&self) {
        for step in &self.steps {
            step.item().cleanup();
        }
    }

    /// Requests a cooperative stop. The flag is checked at the top of each
    /// loop iteration, so an in-flight `Wait` action finishes first.
    /// Detached continuations spawned earlier each consume or miss the flag
    /// independently; a stopped run still reports success.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Clears the pause flag and wakes every run blocked on it.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.resume_signal.notify_waiters();
    }

    /// Executes the flow from step 0. See [`run_from`](Self::run_from).
    pub fn run(self: Arc<Self>) -> BoxFuture<'static, bool> {
        self.run_from(0)
    }

    /// Executes steps from `start` to the end of the sequence, resolving
    /// control flow along the way.
    ///
    /// Returns `false` only when a `Wait` step's action reports failure;
    /// a requested stop, an explicit `Stop` finish and running off the end
    /// all report success. A jump (goto finish or a flow-control signal)
    /// tail-dispatches the continuation and returns `true` immediately: the
    /// continuation's eventual outcome is not propagated to this caller.
    pub fn run_from(self: Arc<Self>, start: usize) -> BoxFuture<'static, bool> {
        Box::pin(async move {
            debug!(flow = self.ctx.flow_name(), start, "flow run");
            self.set_state(FlowState::Running);
            let mut index = start;
            while index < self.steps.len() {
                if self.stopped.swap(false, Ordering::SeqCst) {
                    debug!(flow = self.ctx.flow_name(), index, "stop requested");
                    self.set_state(FlowState::Stopped);
                    return true;
                }

                let step = &self.steps[index];
                match step.run_type() {
                    RunType::Skip => {
                        index += 1;
                    }
                    RunType::NotWait => {
                        step.set_in_progress(true);
                        let item = Arc::clone(step.item());
                        let ctx = self.ctx.clone();
                        tokio::spawn(async move {
                            if !item.run(&ctx).await {
                                warn!(
                                    flow = ctx.flow_name(),
                                    action = item.display_name(),
                                    "detached action failed"
                                );
                            }
                        });
                        step.set_in_progress(false);
                        index += 1;
                    }
                    RunType::Wait => {
                        debug!(flow = self.ctx.flow_name(), step = %step.label(index), "running step");
                        step.set_in_progress(true);
                        let completed = step.item().run(&self.ctx).await;
                        step.set_in_progress(false);

                        if !completed {
                            warn!(
                                flow = self.ctx.flow_name(),
                                index,
                                action = step.item().display_name(),
                                "action failed, aborting run"
                            );
                            self.set_state(FlowState::Failed);
                            return false;
                        }

                        if let Some(control) = step.item().flow_control() {
                            match control.next_signal(&self.ctx) {
                                FlowSignal::Continue => {
                                    index += 1;
                                    continue;
                                }
                                FlowSignal::Stop => {
                                    self.set_state(FlowState::Completed);
                                    return true;
                                }
                                FlowSignal::Jump(target) => {
                                    return Arc::clone(&self).dispatch_jump(target);
                                }
                            }
                        }

                        match step.finish_type() {
                            FinishType::Continue => index += 1,
                            FinishType::Stop => {
                                self.set_state(FlowState::Completed);
                                return true;
                            }
                            FinishType::Pause => {
                                self.wait_resumed().await;
                                index += 1;
                            }
                            FinishType::GoTo => {
                                return Arc::clone(&self).dispatch_jump(step.goto_target());
                            }
                        }
                    }
                }
            }

            self.set_state(FlowState::Completed);
            true
        })
    }

    /// Spawns an independent run from `target` and reports success to the
    /// current caller right away. An out-of-range target fails closed and
    /// is treated as a plain stop.
    fn dispatch_jump(self: Arc<Self>, target: usize) -> bool {
        if target >= self.steps.len() {
            warn!(
                flow = self.ctx.flow_name(),
                target, "jump target out of range, treating as stop"
            );
            self.set_state(FlowState::Completed);
            return true;
        }
        debug!(flow = self.ctx.flow_name(), target, "tail-dispatching jump");
        tokio::spawn(Arc::clone(&self).run_from(target));
        true
    }

    /// Sets the pause flag and blocks until an external resume clears it.
    /// No timeout applies; bounded pauses are the caller's concern.
    async fn wait_resumed(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.set_state(FlowState::Paused);
        debug!(flow = self.ctx.flow_name(), "flow paused");
        loop {
            let resumed = self.resume_signal.notified();
            if !self.paused.load(Ordering::SeqCst) {
                break;
            }
            resumed.await;
        }
        self.set_state(FlowState::Running);
    }

    fn set_state(&self, state: FlowState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.name())
            .field("steps", &self.steps.len())
            .field("state", &self.state())
            .finish()
    }
}
