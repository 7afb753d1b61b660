//! Scripted methods for unit tests.

use crate::error::MethodError;
use crate::heartbeat::HeartbeatCallback;
use crate::method::{Method, MethodDescriptor, MethodInfo};
use crate::platform::PlatformTag;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared record of lifecycle calls, e.g. `"enter:A"`.
pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
pub(crate) struct Script {
    info: MethodInfo,
    caniuse_error: Option<String>,
    enter_error: Option<String>,
    exit_error: Option<String>,
    heartbeat: bool,
    log: EventLog,
}

/// A method of mode `foo` that supports every platform and always succeeds.
pub(crate) fn scripted(name: &str) -> Script {
    Script {
        info: MethodInfo::new(name, "foo", &[PlatformTag::Any]),
        caniuse_error: None,
        enter_error: None,
        exit_error: None,
        heartbeat: false,
        log: Arc::new(Mutex::new(Vec::new())),
    }
}

impl Script {
    pub(crate) fn platforms(mut self, tags: &[PlatformTag]) -> Self {
        self.info.supported_platforms = tags.to_vec();
        self
    }

    pub(crate) fn failing_enter(mut self, message: &str) -> Self {
        self.enter_error = Some(message.to_string());
        self
    }

    pub(crate) fn failing_caniuse(mut self, message: &str) -> Self {
        self.caniuse_error = Some(message.to_string());
        self
    }

    pub(crate) fn failing_exit(mut self, message: &str) -> Self {
        self.exit_error = Some(message.to_string());
        self
    }

    pub(crate) fn with_heartbeat(mut self) -> Self {
        self.heartbeat = true;
        self
    }

    pub(crate) fn sharing_log(mut self, log: &EventLog) -> Self {
        self.log = Arc::clone(log);
        self
    }

    pub(crate) fn log(&self) -> EventLog {
        Arc::clone(&self.log)
    }

    pub(crate) fn descriptor(&self) -> MethodDescriptor {
        let script = self.clone();
        MethodDescriptor::new(self.info.clone(), move |_| {
            Box::new(ScriptedMethod {
                script: script.clone(),
            })
        })
    }
}

pub(crate) fn events(log: &EventLog) -> Vec<String> {
    log.lock().map(|events| events.clone()).unwrap_or_default()
}

struct ScriptedMethod {
    script: Script,
}

impl ScriptedMethod {
    fn record(&self, event: &str) {
        if let Ok(mut log) = self.script.log.lock() {
            log.push(format!("{event}:{}", self.script.info.name));
        }
    }
}

impl Method for ScriptedMethod {
    fn info(&self) -> &MethodInfo {
        &self.script.info
    }

    fn caniuse(&self) -> Result<(), MethodError> {
        match &self.script.caniuse_error {
            Some(message) => Err(MethodError::Requirement(message.clone())),
            None => Ok(()),
        }
    }

    fn enter(&mut self) -> Result<(), MethodError> {
        self.record("enter");
        match &self.script.enter_error {
            Some(message) => Err(MethodError::Failed(message.clone())),
            None => Ok(()),
        }
    }

    fn exit(&mut self) -> Result<(), MethodError> {
        self.record("exit");
        match &self.script.exit_error {
            Some(message) => Err(MethodError::Failed(message.clone())),
            None => Ok(()),
        }
    }

    fn heartbeat(&self) -> Option<HeartbeatCallback> {
        if !self.script.heartbeat {
            return None;
        }
        let log = Arc::clone(&self.script.log);
        let name = self.script.info.name.clone();
        Some(Arc::new(move || {
            if let Ok(mut log) = log.lock() {
                log.push(format!("heartbeat:{name}"));
            }
            Ok(())
        }))
    }

    fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(10)
    }
}
