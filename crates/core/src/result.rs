//! Activation results: per-method outcomes and their aggregate views.

use crate::error::{KeepAwakeError, KeepAwakeResult};
use crate::method::MethodInfo;
use crate::wrap::fill;
use serde::Serialize;

/// Pipeline stage at which a method was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureStage {
    /// Rejected by the force-failure flag before anything else ran.
    ForcedFailure,
    /// The method does not support the current platform.
    PlatformSupport,
    /// The method's requirements check failed.
    Requirements,
    /// Entering the method failed.
    Activation,
}

impl FailureStage {
    pub const ALL: [FailureStage; 4] = [
        FailureStage::ForcedFailure,
        FailureStage::PlatformSupport,
        FailureStage::Requirements,
        FailureStage::Activation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FailureStage::ForcedFailure => "FORCED_FAILURE",
            FailureStage::PlatformSupport => "PLATFORM_SUPPORT",
            FailureStage::Requirements => "REQUIREMENTS",
            FailureStage::Activation => "ACTIVATION",
        }
    }
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Labels used when rendering a method's status.
#[derive(Debug, Clone, Copy)]
pub struct StatusLabels<'a> {
    pub success: &'a str,
    pub fail: &'a str,
    pub unused: &'a str,
    /// Used for platform-support failures.
    pub unsupported: &'a str,
}

impl Default for StatusLabels<'_> {
    fn default() -> Self {
        Self {
            success: "SUCCESS",
            fail: "FAIL",
            unused: "UNUSED",
            unsupported: "UNSUPPORTED",
        }
    }
}

/// What happened to one method during an activation or probe pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodOutcome {
    pub method: MethodInfo,
    /// `Some(true)` succeeded, `Some(false)` failed, `None` never reached.
    pub success: Option<bool>,
    pub failure_stage: Option<FailureStage>,
    /// Empty unless the method failed.
    pub failure_reason: String,
}

impl MethodOutcome {
    pub fn succeeded(method: MethodInfo) -> Self {
        Self {
            method,
            success: Some(true),
            failure_stage: None,
            failure_reason: String::new(),
        }
    }

    pub fn failed(method: MethodInfo, stage: FailureStage, reason: impl Into<String>) -> Self {
        Self {
            method,
            success: Some(false),
            failure_stage: Some(stage),
            failure_reason: reason.into(),
        }
    }

    pub fn unused(method: MethodInfo) -> Self {
        Self {
            method,
            success: None,
            failure_stage: None,
            failure_reason: String::new(),
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method.name
    }

    pub fn mode_name(&self) -> &str {
        &self.method.mode_name
    }

    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }

    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    pub fn is_unused(&self) -> bool {
        self.success.is_none()
    }

    /// Short status: one of the `labels`.
    pub fn status_string<'a>(&self, labels: &StatusLabels<'a>) -> &'a str {
        match self.success {
            Some(true) => labels.success,
            Some(false) if self.failure_stage == Some(FailureStage::PlatformSupport) => {
                labels.unsupported
            }
            Some(false) => labels.fail,
            None => labels.unused,
        }
    }

    /// Status followed by `": reason"` for failures.
    pub fn status_line(&self, labels: &StatusLabels<'_>) -> String {
        let status = self.status_string(labels);
        if self.is_failure() {
            format!("{status}: {}", self.reason_or_unknown())
        } else {
            status.to_string()
        }
    }

    /// Failure line including the stage, e.g. `Reason (ACTIVATION): ...`.
    fn failure_line(&self, label: &str) -> String {
        match self.failure_stage {
            Some(stage) if self.is_failure() => {
                format!("{label} ({stage}): {}", self.reason_or_unknown())
            }
            _ => self.status_line(&StatusLabels::default()),
        }
    }

    fn reason_or_unknown(&self) -> &str {
        if self.failure_reason.is_empty() {
            "Unknown reason"
        } else {
            &self.failure_reason
        }
    }
}

impl std::fmt::Display for MethodOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels = StatusLabels {
            unsupported: "FAIL",
            ..StatusLabels::default()
        };
        write!(f, "({}", self.status_string(&labels))?;
        if let Some(stage) = self.failure_stage {
            write!(f, " @{stage}")?;
        }
        write!(f, ", {}", self.method.name)?;
        if self.is_failure() {
            write!(f, ", \"{}\"", self.failure_reason)?;
        }
        write!(f, ")")
    }
}

/// Layout of [`OutcomeView::methods_text`].
#[derive(Debug, Clone, Copy)]
pub struct MethodsTextWidths {
    pub index: usize,
    /// Longer names are truncated with `...`.
    pub name: usize,
    pub status: usize,
}

impl Default for MethodsTextWidths {
    fn default() -> Self {
        Self {
            index: 3,
            name: 35,
            status: 8,
        }
    }
}

/// Filter of [`OutcomeView::list_methods`].
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub ignore_platform_fails: bool,
    pub ignore_unused: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            ignore_platform_fails: true,
            ignore_unused: false,
        }
    }
}

/// Style of [`OutcomeView::failure_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureTextStyle {
    /// Multi-line, for people.
    #[default]
    Block,
    /// Single line, for logs.
    Inline,
}

/// All tri-state success values.
pub const ALL_SUCCESS_VALUES: [Option<bool>; 3] = [Some(true), Some(false), None];

/// Query and rendering surface shared by activation and probe results.
///
/// Outcomes are in attempt order: highest priority first, platform-unsupported
/// methods last.
pub trait OutcomeView {
    fn outcomes(&self) -> &[MethodOutcome];

    fn mode_name(&self) -> Option<&str>;

    /// Any method succeeded, possibly the fake-success sentinel.
    fn success(&self) -> bool {
        any_success(self.outcomes())
    }

    /// A real method succeeded.
    fn real_success(&self) -> bool {
        any_real_success(self.outcomes())
    }

    fn failure(&self) -> bool {
        !self.success()
    }

    /// Outcomes whose success value is in `success`; failures additionally
    /// need their stage in `fail_stages`.
    fn query(&self, success: &[Option<bool>], fail_stages: &[FailureStage]) -> Vec<&MethodOutcome> {
        self.outcomes()
            .iter()
            .filter(|o| success.contains(&o.success))
            .filter(|o| {
                !o.is_failure() || o.failure_stage.is_some_and(|stage| fail_stages.contains(&stage))
            })
            .collect()
    }

    /// Higher-level filter over [`query`](OutcomeView::query).
    fn list_methods(&self, options: ListOptions) -> Vec<&MethodOutcome> {
        let success: &[Option<bool>] = if options.ignore_unused {
            &[Some(true), Some(false)]
        } else {
            &ALL_SUCCESS_VALUES
        };

        let stages: Vec<FailureStage> = FailureStage::ALL
            .into_iter()
            .filter(|s| !(options.ignore_platform_fails && *s == FailureStage::PlatformSupport))
            .collect();

        self.query(success, &stages)
    }

    /// One line per method: index, (truncated) name and status.
    /// Platform-unsupported methods show as `*`.
    fn methods_text(&self, widths: MethodsTextWidths) -> String {
        let labels = StatusLabels {
            unsupported: "*",
            ..StatusLabels::default()
        };

        self.outcomes()
            .iter()
            .enumerate()
            .map(|(i, outcome)| {
                let name = truncate_name(outcome.method_name(), widths.name);
                let status = outcome.status_string(&labels);
                format!(
                    "{:>iw$}. {:<nw$}   {:<sw$}",
                    i + 1,
                    name,
                    status,
                    iw = widths.index,
                    nw = widths.name,
                    sw = widths.status,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Per method: wrapped name line and wrapped status line with the reason.
    fn methods_text_detailed(&self, max_width: usize, labels: &StatusLabels<'_>) -> String {
        let entries = self
            .outcomes()
            .iter()
            .map(|outcome| (outcome.method_name(), outcome.status_line(labels)));
        render_detailed(entries, max_width)
    }

    /// Human-readable description of why activation failed. Empty on success.
    fn failure_text(&self, style: FailureTextStyle) -> String {
        if self.success() {
            return String::new();
        }

        let mode_name = self.mode_name().unwrap_or("[unnamed mode]");
        let msg = format!("Could not activate Mode \"{mode_name}\"!");
        let outcomes = self.outcomes();

        if outcomes.is_empty() {
            let sep = match style {
                FailureTextStyle::Block => "\n\n",
                FailureTextStyle::Inline => " ",
            };
            return format!("{msg}{sep}Did not try any methods!");
        }

        match style {
            FailureTextStyle::Block => {
                let entries = outcomes
                    .iter()
                    .map(|outcome| (outcome.method_name(), outcome.failure_line("Reason")));
                let methods_text = render_detailed(entries, 80);
                format!("{msg}\n\nTried Methods (in the order of attempt):\n\n{methods_text}")
            }
            FailureTextStyle::Inline => {
                let items = outcomes
                    .iter()
                    .enumerate()
                    .map(|(i, outcome)| {
                        let stage = outcome
                            .failure_stage
                            .map(|s| s.label())
                            .unwrap_or("NONE");
                        format!(
                            "(#{}, {}, {}, {})",
                            i + 1,
                            outcome.method_name(),
                            stage,
                            outcome.reason_or_unknown()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "{msg} Tried Methods (in the order of attempt): {items}. The format of each \
                     item in the list is (index, method_name, failure_stage, failure_reason)."
                )
            }
        }
    }
}

fn any_success(outcomes: &[MethodOutcome]) -> bool {
    outcomes.iter().any(MethodOutcome::is_success)
}

fn any_real_success(outcomes: &[MethodOutcome]) -> bool {
    outcomes
        .iter()
        .any(|o| o.is_success() && !o.method.is_fake_success())
}

fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let keep = width.saturating_sub(3);
        let mut truncated: String = name.chars().take(keep).collect();
        truncated.push_str("...");
        truncated
    } else {
        name.to_string()
    }
}

fn render_detailed<'a, I>(entries: I, max_width: usize) -> String
where
    I: Iterator<Item = (&'a str, String)>,
{
    entries
        .enumerate()
        .map(|(i, (name, status_line))| {
            let prefix = format!("{:>3}. ", i + 1);
            let name_wrapped = fill(name, max_width, &prefix, "     ");
            let status_wrapped = fill(&status_line, max_width, "     ", "     ");
            format!("{name_wrapped}\n{status_wrapped}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Aggregate of one activation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationResult {
    mode_name: Option<String>,
    success: bool,
    real_success: bool,
    failure: bool,
    /// The method that was activated, if any.
    method: Option<MethodInfo>,
    outcomes: Vec<MethodOutcome>,
}

impl ActivationResult {
    /// Build from outcomes in attempt order.
    ///
    /// Fails if more than one real method claims success, which the engine's
    /// stop-on-first-success rule never produces.
    pub fn new(outcomes: Vec<MethodOutcome>, mode_name: Option<String>) -> KeepAwakeResult<Self> {
        let method = Self::success_method(&outcomes)?;
        let success = any_success(&outcomes);
        Ok(Self {
            mode_name,
            success,
            real_success: any_real_success(&outcomes),
            failure: !success,
            method,
            outcomes,
        })
    }

    /// A result with no outcomes, used before a mode is activated.
    pub fn empty(mode_name: Option<String>) -> Self {
        Self {
            mode_name,
            success: false,
            real_success: false,
            failure: true,
            method: None,
            outcomes: Vec::new(),
        }
    }

    fn success_method(outcomes: &[MethodOutcome]) -> KeepAwakeResult<Option<MethodInfo>> {
        let successes: Vec<&MethodOutcome> = outcomes.iter().filter(|o| o.is_success()).collect();
        let real: Vec<&MethodOutcome> = successes
            .iter()
            .copied()
            .filter(|o| !o.method.is_fake_success())
            .collect();

        if real.len() > 1 {
            return Err(KeepAwakeError::MultipleActiveMethods {
                methods: real.iter().map(|o| o.method.name.clone()).collect(),
            });
        }

        Ok(real
            .first()
            .or(successes.first())
            .map(|o| o.method.clone()))
    }

    /// The activated method, if activation succeeded.
    pub fn method(&self) -> Option<&MethodInfo> {
        self.method.as_ref()
    }
}

impl OutcomeView for ActivationResult {
    fn outcomes(&self) -> &[MethodOutcome] {
        &self.outcomes
    }

    fn mode_name(&self) -> Option<&str> {
        self.mode_name.as_deref()
    }

    fn success(&self) -> bool {
        self.success
    }

    fn real_success(&self) -> bool {
        self.real_success
    }

    fn failure(&self) -> bool {
        self.failure
    }
}

/// Aggregate of a probe pass. Several methods may succeed; none are unused.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    mode_name: Option<String>,
    outcomes: Vec<MethodOutcome>,
}

impl ProbeResult {
    pub fn new(outcomes: Vec<MethodOutcome>, mode_name: Option<String>) -> Self {
        Self {
            mode_name,
            outcomes,
        }
    }

    /// Every probed method, in the order tried.
    pub fn methods(&self) -> Vec<&MethodInfo> {
        self.outcomes.iter().map(|o| &o.method).collect()
    }

    /// Methods that would work on this system.
    pub fn working_methods(&self) -> Vec<&MethodInfo> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| &o.method)
            .collect()
    }
}

impl OutcomeView for ProbeResult {
    fn outcomes(&self) -> &[MethodOutcome] {
        &self.outcomes
    }

    fn mode_name(&self) -> Option<&str> {
        self.mode_name.as_deref()
    }
}
