//! D-Bus adapter boundary.
//!
//! Methods describe calls with [`DbusMethodCall`]; an injected [`DbusAdapter`]
//! performs them. The core never talks to a bus directly, which keeps the
//! activation logic testable without a session bus.

use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Which message bus a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusType {
    Session,
    System,
}

/// A single argument or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbusValue {
    Str(String),
    U32(u32),
}

impl DbusValue {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            DbusValue::U32(v) => Some(*v),
            DbusValue::Str(_) => None,
        }
    }
}

/// Description of a remote method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbusMethod {
    pub bus: BusType,
    pub service: &'static str,
    pub path: &'static str,
    pub interface: &'static str,
    pub name: &'static str,
    /// Whether the method returns a single `u32`; otherwise it returns nothing.
    pub returns_u32: bool,
}

/// A call to perform: a method plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbusMethodCall {
    pub method: DbusMethod,
    pub args: Vec<DbusValue>,
}

impl DbusMethodCall {
    pub fn new(method: DbusMethod, args: Vec<DbusValue>) -> Self {
        Self { method, args }
    }

    /// `interface.name`, for logs and error messages.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.method.interface, self.method.name)
    }
}

/// Errors raised by a [`DbusAdapter`].
#[derive(Debug, Error)]
pub enum DbusError {
    /// Could not connect to the bus.
    #[error("could not connect to the {bus:?} bus: {message}")]
    Connection { bus: BusType, message: String },

    /// The call itself failed.
    #[error("D-Bus call of '{method}' failed: {message}")]
    Call { method: String, message: String },

    /// The adapter does not know how to encode the arguments.
    #[error("unsupported argument signature for '{method}'")]
    UnsupportedSignature { method: String },

    /// No adapter is available to perform the call.
    #[error("no D-Bus adapter available")]
    NoAdapter,
}

/// Performs D-Bus calls on behalf of methods.
pub trait DbusAdapter: Send + Sync {
    /// Perform the call and return its output values.
    fn process(&self, call: &DbusMethodCall) -> Result<Vec<DbusValue>, DbusError>;
}

/// Shared adapter handle.
pub type DbusAdapterRef = Arc<dyn DbusAdapter>;

/// Creates the adapter on first use. Returning `None` means no bus is available.
pub type DbusAdapterFactory = Arc<dyn Fn() -> Option<DbusAdapterRef> + Send + Sync>;

/// Lazily created adapter, created at most once per cache.
///
/// Clones share the same slot, so modes built from the same parameters reuse
/// one adapter.
#[derive(Clone, Default)]
pub struct DbusAdapterCache {
    factory: Option<DbusAdapterFactory>,
    slot: Arc<OnceLock<Option<DbusAdapterRef>>>,
}

impl DbusAdapterCache {
    pub fn new(factory: Option<DbusAdapterFactory>) -> Self {
        Self {
            factory,
            slot: Arc::new(OnceLock::new()),
        }
    }

    /// Get the adapter, creating it on the first call. A `None` result is
    /// cached too.
    pub fn get(&self) -> Option<DbusAdapterRef> {
        self.slot
            .get_or_init(|| {
                let adapter = self.factory.as_ref().and_then(|factory| factory());
                tracing::debug!(available = adapter.is_some(), "created D-Bus adapter");
                adapter
            })
            .clone()
    }

    pub fn is_created(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl std::fmt::Debug for DbusAdapterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbusAdapterCache")
            .field("has_factory", &self.factory.is_some())
            .field("created", &self.is_created())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoAdapter;

    impl DbusAdapter for EchoAdapter {
        fn process(&self, call: &DbusMethodCall) -> Result<Vec<DbusValue>, DbusError> {
            Ok(call.args.clone())
        }
    }

    #[test]
    fn test_cache_creates_adapter_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let factory: DbusAdapterFactory = Arc::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Some(Arc::new(EchoAdapter) as DbusAdapterRef)
        });

        let cache = DbusAdapterCache::new(Some(factory));
        let shared = cache.clone();
        assert!(!cache.is_created());

        assert!(cache.get().is_some());
        assert!(shared.get().is_some());
        assert!(cache.get().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_without_factory_yields_none() {
        let cache = DbusAdapterCache::new(None);
        assert!(cache.get().is_none());
        assert!(cache.is_created());
    }

    #[test]
    fn test_qualified_name() {
        let call = DbusMethodCall::new(
            DbusMethod {
                bus: BusType::Session,
                service: "org.freedesktop.ScreenSaver",
                path: "/org/freedesktop/ScreenSaver",
                interface: "org.freedesktop.ScreenSaver",
                name: "Inhibit",
                returns_u32: true,
            },
            vec![DbusValue::Str("app".into()), DbusValue::Str("reason".into())],
        );
        assert_eq!(call.qualified_name(), "org.freedesktop.ScreenSaver.Inhibit");
    }
}
