//! Activation engine: tries candidate methods in priority order.
//!
//! ```text
//! selected methods
//!       │
//!       ▼
//! ┌──────────────┐   fake success: sentinel first
//! │ CandidatePlan│── priority order on the rest
//! └──────┬───────┘   platform split
//!        │
//!   attempt list ──► forced failure? ─► caniuse() ─► enter() ─► heartbeat
//!        │
//!   unsupported ───► PLATFORM_SUPPORT outcomes, appended last
//! ```

use crate::error::MethodError;
use crate::flags::{ActivationFlags, FORCE_FAILURE_ENV};
use crate::heartbeat::Heartbeat;
use crate::method::{Method, MethodContext, MethodDescriptor, MethodInfo};
use crate::platform::{format_tags, platform_support, Platform};
use crate::priority::{order_by_priority, PriorityOrder};
use crate::result::{FailureStage, MethodOutcome};

/// Ordered candidates of one activation or probe pass.
#[derive(Debug, Clone)]
pub struct CandidatePlan {
    platform: Platform,
    flags: ActivationFlags,
    /// Possibly supported methods, in attempt order.
    attempt: Vec<MethodDescriptor>,
    /// Methods that cannot run on `platform`, in their original order.
    unsupported: Vec<MethodDescriptor>,
}

impl CandidatePlan {
    /// Order `selected` for `mode_name`.
    ///
    /// The fake-success sentinel, when enabled, goes first. The priority
    /// order applies to real methods only.
    pub fn build(
        mode_name: &str,
        selected: Vec<MethodDescriptor>,
        priority: Option<&PriorityOrder>,
        flags: ActivationFlags,
        platform: Platform,
    ) -> Self {
        if flags.conflicting() {
            tracing::warn!(
                mode = %mode_name,
                "both fake success and forced failure are set; forced failure takes precedence"
            );
        }

        let ordered = order_by_priority(selected, priority, |m: &MethodDescriptor| m.name());

        let mut candidates = Vec::with_capacity(ordered.len() + 1);
        if flags.fake_success {
            candidates.push(MethodDescriptor::fake_success(mode_name));
        }
        candidates.extend(ordered);

        let (attempt, unsupported): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|m| platform_support(platform, m.supported_platforms()).possibly_supported());

        tracing::debug!(
            mode = %mode_name,
            %platform,
            attempt = ?attempt.iter().map(MethodDescriptor::name).collect::<Vec<_>>(),
            unsupported = ?unsupported.iter().map(MethodDescriptor::name).collect::<Vec<_>>(),
            "planned activation"
        );

        Self {
            platform,
            flags,
            attempt,
            unsupported,
        }
    }

    pub fn attempt(&self) -> &[MethodDescriptor] {
        &self.attempt
    }

    pub fn unsupported(&self) -> &[MethodDescriptor] {
        &self.unsupported
    }

    pub fn flags(&self) -> ActivationFlags {
        self.flags
    }

    pub fn len(&self) -> usize {
        self.attempt.len() + self.unsupported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every candidate fails at the forced-failure stage, in plan order.
    fn forced_failures(&self) -> Vec<MethodOutcome> {
        self.attempt
            .iter()
            .chain(&self.unsupported)
            .map(|m| {
                MethodOutcome::failed(
                    m.info().clone(),
                    FailureStage::ForcedFailure,
                    format!(
                        "Method forced to fail because the {FORCE_FAILURE_ENV} environment \
                         variable is set"
                    ),
                )
            })
            .collect()
    }

    fn unsupported_outcomes(&self) -> impl Iterator<Item = MethodOutcome> + '_ {
        self.unsupported.iter().map(|m| {
            let reason = format!(
                "{} is not supported on {}. The supported platforms are: {}",
                m.name(),
                self.platform,
                format_tags(m.supported_platforms()),
            );
            MethodOutcome::failed(m.info().clone(), FailureStage::PlatformSupport, reason)
        })
    }
}

/// A method that was entered successfully, with its heartbeat if it has one.
pub struct ActiveMethod {
    method: Box<dyn Method>,
    heartbeat: Option<Heartbeat>,
}

impl ActiveMethod {
    pub fn info(&self) -> &MethodInfo {
        self.method.info()
    }

    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat.is_some()
    }

    /// Stop the heartbeat, then exit the method.
    pub fn deactivate(mut self) -> Result<(), MethodError> {
        if let Some(mut heartbeat) = self.heartbeat.take() {
            heartbeat.stop();
        }
        let result = self.method.exit();
        tracing::debug!(method = %self.method.info().name, ok = result.is_ok(), "exited method");
        result
    }
}

impl std::fmt::Debug for ActiveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveMethod")
            .field("method", &self.info().name)
            .field("heartbeat", &self.heartbeat)
            .finish()
    }
}

/// Outcome of [`activate_first_successful`].
#[derive(Debug)]
pub struct Activation {
    /// One outcome per candidate, in attempt order.
    pub outcomes: Vec<MethodOutcome>,
    /// The method left active, if any succeeded.
    pub active: Option<ActiveMethod>,
}

/// Try candidates in order and keep the first one that activates.
///
/// Candidates after the first success are recorded as unused.
pub fn activate_first_successful(plan: &CandidatePlan, context: &MethodContext) -> Activation {
    if plan.flags.force_failure {
        return Activation {
            outcomes: plan.forced_failures(),
            active: None,
        };
    }

    let mut outcomes = Vec::with_capacity(plan.len());
    let mut active = None;

    for descriptor in &plan.attempt {
        if active.is_some() {
            outcomes.push(MethodOutcome::unused(descriptor.info().clone()));
            continue;
        }

        match try_activate(descriptor, context) {
            Ok(method) => {
                outcomes.push(MethodOutcome::succeeded(descriptor.info().clone()));
                active = Some(method);
            }
            Err(outcome) => outcomes.push(outcome),
        }
    }

    outcomes.extend(plan.unsupported_outcomes());

    Activation { outcomes, active }
}

/// Try every candidate, deactivating each success right away.
pub fn probe_all(plan: &CandidatePlan, context: &MethodContext) -> Vec<MethodOutcome> {
    if plan.flags.force_failure {
        return plan.forced_failures();
    }

    let mut outcomes = Vec::with_capacity(plan.len());

    for descriptor in &plan.attempt {
        match try_activate(descriptor, context) {
            Ok(method) => {
                if let Err(e) = method.deactivate() {
                    tracing::warn!(
                        method = %descriptor.name(),
                        "failed to deactivate method after probing: {}",
                        e
                    );
                }
                outcomes.push(MethodOutcome::succeeded(descriptor.info().clone()));
            }
            Err(outcome) => outcomes.push(outcome),
        }
    }

    outcomes.extend(plan.unsupported_outcomes());
    outcomes
}

/// Requirements check, enter, heartbeat start.
fn try_activate(
    descriptor: &MethodDescriptor,
    context: &MethodContext,
) -> Result<ActiveMethod, MethodOutcome> {
    let name = descriptor.name();
    let mut method = descriptor.instantiate(context);

    if let Err(e) = method.caniuse() {
        tracing::debug!(method = %name, "requirements not met: {}", e);
        return Err(MethodOutcome::failed(
            descriptor.info().clone(),
            FailureStage::Requirements,
            e.to_string(),
        ));
    }

    if let Err(e) = method.enter() {
        tracing::debug!(method = %name, "activation failed: {}", e);
        return Err(MethodOutcome::failed(
            descriptor.info().clone(),
            FailureStage::Activation,
            e.to_reason(),
        ));
    }

    let heartbeat = method
        .heartbeat()
        .map(|callback| Heartbeat::start(name, callback, method.heartbeat_interval()));

    tracing::debug!(method = %name, heartbeat = heartbeat.is_some(), "activated method");

    Ok(ActiveMethod { method, heartbeat })
}
