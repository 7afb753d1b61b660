//! The `Method` abstraction: one concrete way to inhibit system idle.
//!
//! A [`MethodDescriptor`] is the static description kept in registries and
//! modes. Each activation attempt builds a fresh [`Method`] instance from it.

use crate::dbus::{DbusAdapterCache, DbusAdapterRef};
use crate::error::MethodError;
use crate::heartbeat::{HeartbeatCallback, DEFAULT_HEARTBEAT_INTERVAL};
use crate::platform::PlatformTag;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Name of the sentinel method used when fake success is enabled.
pub const FAKE_SUCCESS_METHOD: &str = "KEEPAWAKE_FAKE_SUCCESS";

/// Identity of a method, as reported in outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub mode_name: String,
    pub supported_platforms: Vec<PlatformTag>,
}

impl MethodInfo {
    pub fn new(
        name: impl Into<String>,
        mode_name: impl Into<String>,
        supported_platforms: &[PlatformTag],
    ) -> Self {
        Self {
            name: name.into(),
            mode_name: mode_name.into(),
            supported_platforms: supported_platforms.to_vec(),
        }
    }

    /// Whether this is the fake-success sentinel.
    pub fn is_fake_success(&self) -> bool {
        self.name == FAKE_SUCCESS_METHOD
    }
}

impl std::fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Runtime collaborators handed to a method when it is constructed.
#[derive(Debug, Clone, Default)]
pub struct MethodContext {
    /// Name of the mode the method is activated for.
    pub mode_name: String,
    dbus: DbusAdapterCache,
}

impl MethodContext {
    pub fn new(mode_name: impl Into<String>, dbus: DbusAdapterCache) -> Self {
        Self {
            mode_name: mode_name.into(),
            dbus,
        }
    }

    /// The mode's D-Bus adapter, created on first use.
    pub fn dbus_adapter(&self) -> Option<DbusAdapterRef> {
        self.dbus.get()
    }
}

/// A concrete mechanism for inhibiting idle.
///
/// Instances are single-use: created for one activation attempt, entered at
/// most once and exited at most once. They are not expected to be thread-safe.
pub trait Method: Send {
    /// Static identity of the method.
    fn info(&self) -> &MethodInfo;

    /// Check that the method can be used on this system.
    ///
    /// Runs before [`enter`](Method::enter); a failure here is recorded at the
    /// requirements stage.
    fn caniuse(&self) -> Result<(), MethodError> {
        Ok(())
    }

    /// Activate the method.
    fn enter(&mut self) -> Result<(), MethodError>;

    /// Deactivate the method.
    fn exit(&mut self) -> Result<(), MethodError> {
        Ok(())
    }

    /// Periodic callback to run while the method is active, if any.
    fn heartbeat(&self) -> Option<HeartbeatCallback> {
        None
    }

    /// Interval between heartbeat calls.
    fn heartbeat_interval(&self) -> Duration {
        DEFAULT_HEARTBEAT_INTERVAL
    }
}

/// Builds a method instance for one activation attempt.
pub type MethodFactory = Arc<dyn Fn(&MethodContext) -> Box<dyn Method> + Send + Sync>;

/// Static description of a method: identity plus a constructor.
#[derive(Clone)]
pub struct MethodDescriptor {
    info: MethodInfo,
    factory: MethodFactory,
}

impl MethodDescriptor {
    pub fn new<F>(info: MethodInfo, factory: F) -> Self
    where
        F: Fn(&MethodContext) -> Box<dyn Method> + Send + Sync + 'static,
    {
        Self {
            info,
            factory: Arc::new(factory),
        }
    }

    pub fn info(&self) -> &MethodInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn supported_platforms(&self) -> &[PlatformTag] {
        &self.info.supported_platforms
    }

    /// Build a fresh instance.
    pub fn instantiate(&self, context: &MethodContext) -> Box<dyn Method> {
        (self.factory)(context)
    }

    /// The always-succeeding sentinel used by the fake-success flag.
    pub fn fake_success(mode_name: &str) -> Self {
        let info = MethodInfo::new(FAKE_SUCCESS_METHOD, mode_name, &[PlatformTag::Any]);
        let sentinel = info.clone();
        Self::new(info, move |_| {
            Box::new(FakeSuccess {
                info: sentinel.clone(),
            })
        })
    }
}

impl std::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.info.name)
            .field("mode_name", &self.info.mode_name)
            .finish()
    }
}

/// Sentinel method that succeeds without touching the system.
struct FakeSuccess {
    info: MethodInfo,
}

impl Method for FakeSuccess {
    fn info(&self) -> &MethodInfo {
        &self.info
    }

    fn enter(&mut self) -> Result<(), MethodError> {
        tracing::debug!("entered fake success method; nothing is inhibited");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_success_descriptor() {
        let descriptor = MethodDescriptor::fake_success("keep.running");
        assert_eq!(descriptor.name(), FAKE_SUCCESS_METHOD);
        assert!(descriptor.info().is_fake_success());
        assert_eq!(descriptor.supported_platforms(), &[PlatformTag::Any]);

        let mut method = descriptor.instantiate(&MethodContext::default());
        assert!(method.caniuse().is_ok());
        assert!(method.enter().is_ok());
        assert!(method.heartbeat().is_none());
        assert!(method.exit().is_ok());
    }

    #[test]
    fn test_instances_are_fresh() {
        let descriptor = MethodDescriptor::fake_success("keep.running");
        let a = descriptor.instantiate(&MethodContext::default());
        let b = descriptor.instantiate(&MethodContext::default());
        assert_eq!(a.info(), b.info());
    }
}
