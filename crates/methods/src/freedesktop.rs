//! freedesktop.org inhibit services.

use crate::inhibit::InhibitService;
use keepawake_core::dbus::{BusType, DbusMethod, DbusValue};
use keepawake_core::{MethodDescriptor, MethodInfo, PlatformTag, KEEP_PRESENTING, KEEP_RUNNING};

pub const SCREENSAVER: &str = "org.freedesktop.ScreenSaver";
pub const POWER_MANAGEMENT: &str = "org.freedesktop.PowerManagement";

const APPLICATION: &str = "keepawake";

fn screensaver_method(name: &'static str, returns_u32: bool) -> DbusMethod {
    DbusMethod {
        bus: BusType::Session,
        service: "org.freedesktop.ScreenSaver",
        path: "/org/freedesktop/ScreenSaver",
        interface: "org.freedesktop.ScreenSaver",
        name,
        returns_u32,
    }
}

fn power_management_method(name: &'static str, returns_u32: bool) -> DbusMethod {
    DbusMethod {
        bus: BusType::Session,
        service: "org.freedesktop.PowerManagement",
        path: "/org/freedesktop/PowerManagement/Inhibit",
        interface: "org.freedesktop.PowerManagement.Inhibit",
        name,
        returns_u32,
    }
}

/// Screensaver inhibit: keeps the screen on and unlocked.
pub fn screensaver() -> MethodDescriptor {
    InhibitService {
        inhibit: screensaver_method("Inhibit", true),
        uninhibit: screensaver_method("UnInhibit", false),
        args: vec![
            DbusValue::Str(APPLICATION.into()),
            DbusValue::Str("keeping the screen on".into()),
        ],
    }
    .descriptor(MethodInfo::new(
        SCREENSAVER,
        KEEP_PRESENTING,
        &[PlatformTag::UnixLikeFoss],
    ))
}

/// Power management inhibit: blocks automatic suspend.
pub fn power_management() -> MethodDescriptor {
    InhibitService {
        inhibit: power_management_method("Inhibit", true),
        uninhibit: power_management_method("UnInhibit", false),
        args: vec![
            DbusValue::Str(APPLICATION.into()),
            DbusValue::Str("keeping the system running".into()),
        ],
    }
    .descriptor(MethodInfo::new(
        POWER_MANAGEMENT,
        KEEP_RUNNING,
        &[PlatformTag::UnixLikeFoss],
    ))
}
