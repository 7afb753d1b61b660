//! Keep-awake activation engine.
//!
//! A [`Mode`] asks the operating system not to go idle for as long as it is
//! active. It does so through one of several candidate [`Method`]s, tried in
//! priority order until one works. Every attempt is recorded in an
//! [`ActivationResult`] so callers can tell what was tried and why it failed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  platform.rs  - Platform detection and support matching     │
//! │  priority.rs  - Priority orders (pure)                       │
//! │  selection.rs - Whitelist / blacklist of methods             │
//! │  result.rs    - Outcomes, ActivationResult, ProbeResult      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Method Boundary                           │
//! │  method.rs    - Method trait and descriptors                 │
//! │  dbus.rs      - D-Bus adapter trait, lazily created          │
//! │  heartbeat.rs - Background heartbeat thread                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  engine.rs    - First-successful activation and probing      │
//! │  mode.rs      - Mode state machine and scoped use            │
//! │  tracker.rs   - Entered modes, per thread and process-wide   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use keepawake_core::{KeepAwakeError, ModeParams, OnFail};
//!
//! let params = ModeParams::new("keep.running", registry.methods_for_mode("keep.running"))
//!     .on_fail(OnFail::Error);
//!
//! params.scoped::<_, KeepAwakeError, _>(|mode| {
//!     println!("using {:?}", mode.active_method());
//!     run_long_job();
//!     Ok(())
//! })?;
//! ```

mod engine;
mod error;
mod flags;
mod heartbeat;
mod method;
mod mode;
mod platform;
mod priority;
mod registry;
mod result;
mod selection;
mod tracker;
mod wrap;

pub mod dbus;

#[cfg(test)]
mod test_support;

pub use engine::{activate_first_successful, probe_all, Activation, ActiveMethod, CandidatePlan};
pub use error::{KeepAwakeError, KeepAwakeResult, MethodError};
pub use flags::{
    is_env_var_truthy, is_truthy, ActivationFlags, FAKE_SUCCESS_ENV, FALSY_ENV_VALUES,
    FORCE_FAILURE_ENV,
};
pub use heartbeat::{Heartbeat, HeartbeatCallback, DEFAULT_HEARTBEAT_INTERVAL};
pub use method::{
    Method, MethodContext, MethodDescriptor, MethodFactory, MethodInfo, FAKE_SUCCESS_METHOD,
};
pub use mode::{
    FailCallback, Mode, ModeExit, ModeParams, OnFail, ScopeExit, KEEP_PRESENTING, KEEP_RUNNING,
};
pub use platform::{format_tags, platform_support, Platform, PlatformSupport, PlatformTag};
pub use priority::{order_by_priority, PriorityItem, PriorityOrder, WILDCARD};
pub use registry::MethodRegistry;
pub use result::{
    ActivationResult, FailureStage, FailureTextStyle, ListOptions, MethodOutcome,
    MethodsTextWidths, OutcomeView, ProbeResult, StatusLabels, ALL_SUCCESS_VALUES,
};
pub use selection::{select_methods, Selection};
pub use tracker::{current_mode, global_modes, modecount, ModeSnapshot, ModeTracker};
