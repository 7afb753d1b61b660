//! D-Bus adapter on top of zbus' blocking API.

use keepawake_core::dbus::{
    BusType, DbusAdapter, DbusAdapterFactory, DbusAdapterRef, DbusError, DbusMethodCall, DbusValue,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use zbus::blocking::{Connection, Proxy};

/// Performs calls over zbus, with one cached connection per bus.
#[derive(Default)]
pub struct ZbusAdapter {
    connections: Mutex<HashMap<BusType, Connection>>,
}

impl ZbusAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory for [`ModeParams::dbus_adapter_factory`](keepawake_core::ModeParams::dbus_adapter_factory).
    pub fn factory() -> DbusAdapterFactory {
        Arc::new(|| Some(Arc::new(ZbusAdapter::new()) as DbusAdapterRef))
    }

    fn connection(&self, bus: BusType) -> Result<Connection, DbusError> {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(connection) = connections.get(&bus) {
            return Ok(connection.clone());
        }

        let connection = match bus {
            BusType::Session => Connection::session(),
            BusType::System => Connection::system(),
        }
        .map_err(|e| DbusError::Connection {
            bus,
            message: e.to_string(),
        })?;

        tracing::debug!(?bus, "connected to D-Bus");
        connections.insert(bus, connection.clone());
        Ok(connection)
    }
}

/// Call `$call` on `$proxy`, encoding the argument shapes the inhibit
/// methods use. The reply type comes from the binding.
macro_rules! call_with_args {
    ($proxy:expr, $call:expr) => {{
        let call: &DbusMethodCall = $call;
        let name = call.method.name;
        let reply = match call.args.as_slice() {
            [DbusValue::Str(a), DbusValue::Str(b)] => {
                $proxy.call(name, &(a.as_str(), b.as_str()))
            }
            [DbusValue::U32(a)] => $proxy.call(name, &(*a,)),
            [DbusValue::Str(a), DbusValue::U32(b), DbusValue::Str(c), DbusValue::U32(d)] => {
                $proxy.call(name, &(a.as_str(), *b, c.as_str(), *d))
            }
            _ => {
                return Err(DbusError::UnsupportedSignature {
                    method: call.qualified_name(),
                })
            }
        };
        reply.map_err(|e| DbusError::Call {
            method: call.qualified_name(),
            message: e.to_string(),
        })
    }};
}

impl DbusAdapter for ZbusAdapter {
    fn process(&self, call: &DbusMethodCall) -> Result<Vec<DbusValue>, DbusError> {
        let method = &call.method;
        let connection = self.connection(method.bus)?;

        let proxy = Proxy::new(&connection, method.service, method.path, method.interface)
            .map_err(|e| DbusError::Call {
                method: call.qualified_name(),
                message: e.to_string(),
            })?;

        tracing::debug!(method = %call.qualified_name(), args = ?call.args, "calling D-Bus method");

        if method.returns_u32 {
            let value: u32 = call_with_args!(proxy, call)?;
            Ok(vec![DbusValue::U32(value)])
        } else {
            let (): () = call_with_args!(proxy, call)?;
            Ok(Vec::new())
        }
    }
}
