//! Built-in methods driven through the core Mode with a recording D-Bus adapter.

use keepawake_core::dbus::{
    DbusAdapter, DbusAdapterFactory, DbusAdapterRef, DbusError, DbusMethodCall, DbusValue,
};
use keepawake_core::{
    ActivationFlags, FailureStage, ModeParams, ModeTracker, OnFail, OutcomeView, Platform,
    Selection, KEEP_PRESENTING, KEEP_RUNNING,
};
use keepawake_methods::{
    default_registry, keep, GNOME_SESSION_MANAGER, INHIBIT_IDLE, INHIBIT_SUSPEND, SCREENSAVER,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingAdapter {
    calls: Mutex<Vec<(String, Vec<DbusValue>)>>,
}

impl DbusAdapter for RecordingAdapter {
    fn process(&self, call: &DbusMethodCall) -> Result<Vec<DbusValue>, DbusError> {
        self.calls
            .lock()
            .unwrap()
            .push((call.qualified_name(), call.args.clone()));
        if call.method.returns_u32 {
            Ok(vec![DbusValue::U32(42)])
        } else {
            Ok(Vec::new())
        }
    }
}

fn factory(adapter: &Arc<RecordingAdapter>) -> DbusAdapterFactory {
    let adapter = Arc::clone(adapter);
    Arc::new(move || Some(Arc::clone(&adapter) as DbusAdapterRef))
}

fn params(mode: &str, methods: &[&str]) -> ModeParams {
    ModeParams::new(mode, default_registry().methods_for_mode(mode))
        .selection(Selection::use_only(methods.iter().copied()))
        .flags(ActivationFlags::default())
        .platform(Platform::Linux)
        .tracker(ModeTracker::new())
        .on_fail(OnFail::Pass)
}

#[test]
fn test_default_registry_modes() {
    let registry = default_registry();
    let names = |mode: &str| -> Vec<String> {
        registry
            .methods_for_mode(mode)
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    };

    assert_eq!(
        names(KEEP_RUNNING),
        vec![
            "caffeinate",
            "org.freedesktop.PowerManagement",
            "org.gnome.SessionManager",
            "systemd-inhibit"
        ]
    );
    assert_eq!(
        names(KEEP_PRESENTING),
        vec![
            "caffeinate",
            "org.freedesktop.ScreenSaver",
            "org.gnome.SessionManager",
            "systemd-inhibit"
        ]
    );
}

#[test]
fn test_keep_params_use_registry() {
    assert_eq!(keep::running().name(), KEEP_RUNNING);
    assert_eq!(keep::presenting().methods().len(), 4);
}

#[test]
fn test_gnome_inhibit_and_uninhibit() {
    let adapter = Arc::new(RecordingAdapter::default());
    let mut mode = params(KEEP_PRESENTING, &[GNOME_SESSION_MANAGER])
        .dbus_adapter_factory(factory(&adapter))
        .build()
        .unwrap();

    mode.enter().unwrap();
    assert_eq!(
        mode.active_method().map(|m| m.name.as_str()),
        Some(GNOME_SESSION_MANAGER)
    );
    mode.exit().unwrap();

    let calls = adapter.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "org.gnome.SessionManager.Inhibit");
    assert_eq!(calls[0].1[3], DbusValue::U32(INHIBIT_IDLE | INHIBIT_SUSPEND));
    assert_eq!(
        calls[1],
        (
            "org.gnome.SessionManager.Uninhibit".to_string(),
            vec![DbusValue::U32(42)]
        )
    );
}

#[test]
fn test_dbus_method_without_adapter_fails_requirements() {
    let mode = params(KEEP_PRESENTING, &[SCREENSAVER]).build().unwrap();
    let probe = mode.probe();

    let outcome = &probe.outcomes()[0];
    assert_eq!(outcome.failure_stage, Some(FailureStage::Requirements));
    assert_eq!(outcome.failure_reason, "no D-Bus adapter available");
}

#[test]
fn test_adapter_created_once_across_scoped_calls() {
    let adapter = Arc::new(RecordingAdapter::default());
    let created = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&created);
    let inner = factory(&adapter);
    let counting: DbusAdapterFactory = Arc::new(move || {
        *counter.lock().unwrap() += 1;
        inner()
    });

    let params = params(KEEP_PRESENTING, &[SCREENSAVER]).dbus_adapter_factory(counting);
    for _ in 0..3 {
        let active: Result<Option<bool>, keepawake_core::KeepAwakeError> =
            params.scoped(|mode| Ok(mode.active()));
        assert_eq!(active.unwrap(), Some(true));
    }

    assert_eq!(*created.lock().unwrap(), 1);
    assert_eq!(adapter.calls.lock().unwrap().len(), 6);
}

#[test]
fn test_unsupported_on_windows() {
    let mode = params(KEEP_RUNNING, &["caffeinate", "systemd-inhibit"])
        .platform(Platform::Windows)
        .build()
        .unwrap();
    let probe = mode.probe();

    assert!(probe
        .outcomes()
        .iter()
        .all(|o| o.failure_stage == Some(FailureStage::PlatformSupport)));
    assert_eq!(
        probe.outcomes()[0].failure_reason,
        "caffeinate is not supported on WINDOWS. The supported platforms are: MACOS"
    );
}
