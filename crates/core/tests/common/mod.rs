//! Scripted methods shared by the integration tests.

#![allow(dead_code)]

use keepawake_core::{
    ActivationFlags, Method, MethodDescriptor, MethodError, MethodInfo, ModeParams, ModeTracker,
    OnFail, Platform, PlatformTag,
};
use std::sync::{Arc, Mutex};

/// What a scripted method does when entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    FailEnter,
    FailRequirements,
}

/// Names of currently entered methods, shared between instances.
#[derive(Debug, Clone, Default)]
pub struct Activity {
    active: Arc<Mutex<Vec<String>>>,
    entered: Arc<Mutex<Vec<String>>>,
}

impl Activity {
    pub fn active(&self) -> Vec<String> {
        self.active.lock().unwrap().clone()
    }

    pub fn entered(&self) -> Vec<String> {
        self.entered.lock().unwrap().clone()
    }
}

struct Scripted {
    info: MethodInfo,
    behavior: Behavior,
    activity: Activity,
}

impl Method for Scripted {
    fn info(&self) -> &MethodInfo {
        &self.info
    }

    fn caniuse(&self) -> Result<(), MethodError> {
        match self.behavior {
            Behavior::FailRequirements => Err(MethodError::Requirement(format!(
                "{} needs something this system lacks",
                self.info.name
            ))),
            _ => Ok(()),
        }
    }

    fn enter(&mut self) -> Result<(), MethodError> {
        self.activity.entered.lock().unwrap().push(self.info.name.clone());
        match self.behavior {
            Behavior::FailEnter => Err(MethodError::Failed(format!("{} refused", self.info.name))),
            _ => {
                self.activity.active.lock().unwrap().push(self.info.name.clone());
                Ok(())
            }
        }
    }

    fn exit(&mut self) -> Result<(), MethodError> {
        self.activity
            .active
            .lock()
            .unwrap()
            .retain(|name| name != &self.info.name);
        Ok(())
    }
}

pub fn method(
    name: &str,
    platforms: &[PlatformTag],
    behavior: Behavior,
    activity: &Activity,
) -> MethodDescriptor {
    let info = MethodInfo::new(name, "test.mode", platforms);
    let activity = activity.clone();
    let template = info.clone();
    MethodDescriptor::new(info, move |_| {
        Box::new(Scripted {
            info: template.clone(),
            behavior,
            activity: activity.clone(),
        })
    })
}

/// Params isolated from the environment and the global tracker.
pub fn params(methods: Vec<MethodDescriptor>) -> ModeParams {
    ModeParams::new("test.mode", methods)
        .flags(ActivationFlags::default())
        .platform(Platform::Linux)
        .tracker(ModeTracker::new())
        .on_fail(OnFail::Pass)
}
