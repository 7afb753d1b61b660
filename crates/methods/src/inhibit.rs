//! D-Bus inhibit/uninhibit pairs returning a cookie.

use keepawake_core::dbus::{DbusError, DbusMethod, DbusMethodCall, DbusValue};
use keepawake_core::{Method, MethodContext, MethodDescriptor, MethodError, MethodInfo};

/// Static description of one inhibit service.
#[derive(Debug, Clone)]
pub struct InhibitService {
    /// Takes `args`, returns a `u32` cookie.
    pub inhibit: DbusMethod,
    /// Takes the cookie.
    pub uninhibit: DbusMethod,
    pub args: Vec<DbusValue>,
}

impl InhibitService {
    pub fn descriptor(self, info: MethodInfo) -> MethodDescriptor {
        let template = info.clone();
        MethodDescriptor::new(info, move |context| {
            Box::new(DbusInhibitor {
                info: template.clone(),
                service: self.clone(),
                context: context.clone(),
                cookie: None,
            })
        })
    }
}

/// A method holding an inhibit cookie while active.
pub struct DbusInhibitor {
    info: MethodInfo,
    service: InhibitService,
    context: MethodContext,
    cookie: Option<u32>,
}

impl DbusInhibitor {
    pub fn cookie(&self) -> Option<u32> {
        self.cookie
    }
}

impl Method for DbusInhibitor {
    fn info(&self) -> &MethodInfo {
        &self.info
    }

    fn caniuse(&self) -> Result<(), MethodError> {
        match self.context.dbus_adapter() {
            Some(_) => Ok(()),
            None => Err(MethodError::Requirement(
                "no D-Bus adapter available".to_string(),
            )),
        }
    }

    fn enter(&mut self) -> Result<(), MethodError> {
        let adapter = self.context.dbus_adapter().ok_or(DbusError::NoAdapter)?;
        let call = DbusMethodCall::new(self.service.inhibit.clone(), self.service.args.clone());

        let values = adapter.process(&call)?;
        let cookie = values
            .first()
            .and_then(DbusValue::as_u32)
            .ok_or_else(|| {
                MethodError::Failed(format!(
                    "{} did not return a cookie (got {values:?})",
                    call.qualified_name()
                ))
            })?;

        tracing::debug!(method = %self.info.name, cookie, "inhibited");
        self.cookie = Some(cookie);
        Ok(())
    }

    fn exit(&mut self) -> Result<(), MethodError> {
        let Some(cookie) = self.cookie.take() else {
            return Ok(());
        };
        let adapter = self.context.dbus_adapter().ok_or(DbusError::NoAdapter)?;
        let call = DbusMethodCall::new(self.service.uninhibit.clone(), vec![DbusValue::U32(cookie)]);
        adapter.process(&call)?;
        tracing::debug!(method = %self.info.name, cookie, "uninhibited");
        Ok(())
    }
}
