//! The Mode controller: one scoped activation of a keep-awake mode.
//!
//! A [`Mode`] moves through `constructed -> active -> deactivated` exactly
//! once. Build it from [`ModeParams`], then either call [`Mode::enter`] and
//! [`Mode::exit`] yourself or run a closure inside [`Mode::scope`].

use crate::dbus::{DbusAdapterCache, DbusAdapterFactory};
use crate::engine::{activate_first_successful, probe_all, ActiveMethod, CandidatePlan};
use crate::error::{KeepAwakeError, KeepAwakeResult};
use crate::flags::ActivationFlags;
use crate::method::{MethodContext, MethodDescriptor, MethodInfo};
use crate::platform::Platform;
use crate::priority::PriorityOrder;
use crate::result::{ActivationResult, FailureTextStyle, OutcomeView, ProbeResult};
use crate::selection::{select_methods, Selection};
use crate::tracker::{next_mode_id, pop_current, push_current, ModeSnapshot, ModeTracker};
use std::sync::Arc;
use std::thread::ThreadId;

/// Mode that keeps the system from going to sleep, screen may lock.
pub const KEEP_RUNNING: &str = "keep.running";

/// Mode that keeps the screen on and unlocked.
pub const KEEP_PRESENTING: &str = "keep.presenting";

/// Callback run when activation fails.
pub type FailCallback = Arc<dyn Fn(&ActivationResult) + Send + Sync>;

/// What to do when no method could be activated.
#[derive(Clone, Default)]
pub enum OnFail {
    /// Do nothing.
    Pass,
    /// Log a warning with the failure text.
    #[default]
    Warn,
    /// Return [`KeepAwakeError::ActivationFailed`] from `enter`.
    Error,
    /// Call back with the result.
    Callback(FailCallback),
}

impl OnFail {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&ActivationResult) + Send + Sync + 'static,
    {
        OnFail::Callback(Arc::new(f))
    }
}

impl std::fmt::Debug for OnFail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnFail::Pass => write!(f, "Pass"),
            OnFail::Warn => write!(f, "Warn"),
            OnFail::Error => write!(f, "Error"),
            OnFail::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

/// Signal to leave a [`Mode::scope`] early. Deactivation still runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeExit;

/// Early return from a [`Mode::scope`] closure.
#[derive(Debug)]
pub enum ScopeExit<E> {
    /// Clean exit requested with [`ModeExit`].
    Exit,
    /// The closure failed; the error is returned after deactivation.
    Err(E),
}

impl<E> From<ModeExit> for ScopeExit<E> {
    fn from(_: ModeExit) -> Self {
        ScopeExit::Exit
    }
}

/// Everything needed to build a [`Mode`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ModeParams {
    name: String,
    methods: Vec<MethodDescriptor>,
    selection: Selection,
    priority: Option<PriorityOrder>,
    on_fail: OnFail,
    dbus: DbusAdapterCache,
    flags: Option<ActivationFlags>,
    platform: Platform,
    tracker: ModeTracker,
}

impl ModeParams {
    pub fn new(name: impl Into<String>, methods: Vec<MethodDescriptor>) -> Self {
        Self {
            name: name.into(),
            methods,
            selection: Selection::All,
            priority: None,
            on_fail: OnFail::default(),
            dbus: DbusAdapterCache::default(),
            flags: None,
            platform: Platform::current(),
            tracker: ModeTracker::global().clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn priority(mut self, priority: PriorityOrder) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn on_fail(mut self, on_fail: OnFail) -> Self {
        self.on_fail = on_fail;
        self
    }

    /// Adapter factory for D-Bus based methods. The adapter is created on
    /// first use and shared by every mode built from these params.
    pub fn dbus_adapter_factory(mut self, factory: DbusAdapterFactory) -> Self {
        self.dbus = DbusAdapterCache::new(Some(factory));
        self
    }

    pub fn dbus_cache(&self) -> &DbusAdapterCache {
        &self.dbus
    }

    /// Fix the activation flags instead of reading them from the environment.
    pub fn flags(mut self, flags: ActivationFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn tracker(mut self, tracker: ModeTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn build(&self) -> KeepAwakeResult<Mode> {
        Mode::new(self.clone())
    }

    /// Run `f` inside a fresh Mode built from these params.
    pub fn scoped<T, E, F>(&self, f: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&Mode) -> Result<T, ScopeExit<E>>,
        E: From<KeepAwakeError>,
    {
        let mut mode = self.build()?;
        mode.scope(f)
    }
}

/// A keep-awake mode. Entered at most once.
pub struct Mode {
    id: u64,
    name: String,
    selected: Vec<MethodDescriptor>,
    priority: Option<PriorityOrder>,
    on_fail: OnFail,
    dbus: DbusAdapterCache,
    flags: Option<ActivationFlags>,
    platform: Platform,
    tracker: ModeTracker,
    thread: ThreadId,

    entered: bool,
    tracked: bool,
    active: bool,
    active_method: Option<ActiveMethod>,
    method: Option<MethodInfo>,
    result: ActivationResult,
}

impl Mode {
    /// Validate `params` and apply the method selection.
    pub fn new(params: ModeParams) -> KeepAwakeResult<Self> {
        if let Some(priority) = &params.priority {
            priority.validate()?;
        }
        let selected = select_methods(&params.name, &params.methods, &params.selection)?;

        Ok(Self {
            id: next_mode_id(),
            result: ActivationResult::empty(Some(params.name.clone())),
            name: params.name,
            selected,
            priority: params.priority,
            on_fail: params.on_fail,
            dbus: params.dbus,
            flags: params.flags,
            platform: params.platform,
            tracker: params.tracker,
            thread: std::thread::current().id(),
            entered: false,
            tracked: false,
            active: false,
            active_method: None,
            method: None,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// The method in use while active.
    pub fn active_method(&self) -> Option<&MethodInfo> {
        self.active_method.as_ref().map(ActiveMethod::info)
    }

    /// The last method used; kept after deactivation.
    pub fn method(&self) -> Option<&MethodInfo> {
        self.method.as_ref()
    }

    /// Result of the activation, empty before `enter`.
    pub fn result(&self) -> &ActivationResult {
        &self.result
    }

    /// Methods left after the user selection, in mode order.
    pub fn selected_methods(&self) -> &[MethodDescriptor] {
        &self.selected
    }

    fn plan(&self) -> CandidatePlan {
        let flags = self.flags.unwrap_or_else(ActivationFlags::from_env);
        CandidatePlan::build(
            &self.name,
            self.selected.clone(),
            self.priority.as_ref(),
            flags,
            self.platform,
        )
    }

    fn context(&self) -> MethodContext {
        MethodContext::new(self.name.clone(), self.dbus.clone())
    }

    /// Activate the first method that works.
    ///
    /// Method failures are recorded in [`Mode::result`]; whether an overall
    /// failure is an error depends on the [`OnFail`] policy.
    pub fn enter(&mut self) -> KeepAwakeResult<()> {
        self.check_thread("enter");

        if self.entered {
            return Err(KeepAwakeError::ContextAlreadyEntered);
        }
        self.entered = true;

        let plan = self.plan();
        let activation = activate_first_successful(&plan, &self.context());

        let result = match ActivationResult::new(activation.outcomes, Some(self.name.clone())) {
            Ok(result) => result,
            Err(e) => {
                if let Some(active) = activation.active {
                    abandon(&self.name, active);
                }
                return Err(e);
            }
        };

        if let Some(active) = activation.active {
            self.method = Some(active.info().clone());
            self.active_method = Some(active);
            self.active = true;
        }
        self.result = result;

        tracing::info!(
            mode = %self.name,
            success = self.result.success(),
            method = ?self.method.as_ref().map(|m| m.name.as_str()),
            "mode activation finished"
        );

        if self.result.failure() {
            self.handle_failure()?;
        }

        self.track();
        Ok(())
    }

    fn handle_failure(&self) -> KeepAwakeResult<()> {
        match &self.on_fail {
            OnFail::Pass => Ok(()),
            OnFail::Warn => {
                tracing::warn!(
                    mode = %self.name,
                    "{}",
                    self.result.failure_text(FailureTextStyle::Block)
                );
                Ok(())
            }
            OnFail::Error => Err(KeepAwakeError::ActivationFailed(
                self.result.failure_text(FailureTextStyle::Block),
            )),
            OnFail::Callback(callback) => {
                callback(&self.result);
                Ok(())
            }
        }
    }

    fn snapshot(&self) -> ModeSnapshot {
        ModeSnapshot {
            id: self.id,
            name: self.name.clone(),
            method: self.active_method().map(|m| m.name.clone()),
            thread: self.thread,
        }
    }

    fn track(&mut self) {
        let snapshot = self.snapshot();
        self.tracker.insert(snapshot.clone());
        push_current(snapshot);
        self.tracked = true;
    }

    fn untrack(&mut self) {
        if self.tracked {
            self.tracker.remove(self.id);
            pop_current(self.id);
            self.tracked = false;
        }
    }

    /// Deactivate the mode. The last used method and the result stay
    /// readable afterwards.
    pub fn exit(&mut self) -> KeepAwakeResult<()> {
        self.check_thread("exit");
        self.untrack();

        if !self.active {
            return Ok(());
        }
        self.active = false;

        let Some(active) = self.active_method.take() else {
            return Err(KeepAwakeError::NoActiveMethod {
                mode: self.name.clone(),
            });
        };

        let method = active.info().name.clone();
        active
            .deactivate()
            .map_err(|source| KeepAwakeError::Deactivation {
                method: method.clone(),
                source,
            })?;

        tracing::info!(mode = %self.name, method = %method, "mode deactivated");
        Ok(())
    }

    /// Try every candidate, deactivating each right away. Does not change
    /// the state of this mode and may be called any number of times.
    pub fn probe(&self) -> ProbeResult {
        self.check_thread("probe");
        let outcomes = probe_all(&self.plan(), &self.context());
        ProbeResult::new(outcomes, Some(self.name.clone()))
    }

    /// Enter, run `f`, exit.
    ///
    /// `f` can leave early with `Err(ModeExit)?`; that counts as a clean exit
    /// and yields `Ok(None)`.
    pub fn scope<T, E, F>(&mut self, f: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&Mode) -> Result<T, ScopeExit<E>>,
        E: From<KeepAwakeError>,
    {
        self.enter()?;
        let outcome = f(&*self);
        let exited = self.exit();

        match outcome {
            Ok(value) => {
                exited?;
                Ok(Some(value))
            }
            Err(ScopeExit::Exit) => {
                tracing::debug!(mode = %self.name, "scope exited early");
                exited?;
                Ok(None)
            }
            Err(ScopeExit::Err(e)) => {
                if let Err(exit_err) = exited {
                    tracing::warn!(mode = %self.name, "failed to exit mode: {}", exit_err);
                }
                Err(e)
            }
        }
    }

    fn check_thread(&self, operation: &str) {
        let current = std::thread::current().id();
        if current != self.thread {
            tracing::warn!(
                mode = %self.name,
                operation,
                owner = ?self.thread,
                ?current,
                "mode used from a different thread than it was created in; methods are not thread-safe"
            );
        }
    }
}

/// Deactivate a method whose activation is being discarded. Errors are
/// only logged.
fn abandon(mode_name: &str, active: ActiveMethod) {
    let method = active.info().name.clone();
    if let Err(e) = active.deactivate() {
        tracing::warn!(
            mode = %mode_name,
            method = %method,
            "failed to deactivate discarded method: {}",
            e
        );
    }
}

impl Drop for Mode {
    fn drop(&mut self) {
        if self.active || self.tracked {
            if let Err(e) = self.exit() {
                tracing::warn!(mode = %self.name, "failed to exit mode on drop: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("method", &self.method.as_ref().map(|m| m.name.as_str()))
            .finish()
    }
}
