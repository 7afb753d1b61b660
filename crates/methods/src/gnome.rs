//! GNOME session manager inhibitor.

use crate::inhibit::InhibitService;
use keepawake_core::dbus::{BusType, DbusMethod, DbusValue};
use keepawake_core::{MethodDescriptor, MethodInfo, PlatformTag, KEEP_PRESENTING, KEEP_RUNNING};

pub const GNOME_SESSION_MANAGER: &str = "org.gnome.SessionManager";

/// Inhibit flag: suspending the session or computer.
pub const INHIBIT_SUSPEND: u32 = 4;
/// Inhibit flag: the session being marked as idle.
pub const INHIBIT_IDLE: u32 = 8;

fn session_method(name: &'static str, returns_u32: bool) -> DbusMethod {
    DbusMethod {
        bus: BusType::Session,
        service: "org.gnome.SessionManager",
        path: "/org/gnome/SessionManager",
        interface: "org.gnome.SessionManager",
        name,
        returns_u32,
    }
}

fn service(flags: u32, reason: &str) -> InhibitService {
    InhibitService {
        // Inhibit(app_id: s, toplevel_xid: u, reason: s, flags: u) -> cookie: u
        inhibit: session_method("Inhibit", true),
        uninhibit: session_method("Uninhibit", false),
        args: vec![
            DbusValue::Str("keepawake".into()),
            DbusValue::U32(0),
            DbusValue::Str(reason.into()),
            DbusValue::U32(flags),
        ],
    }
}

pub fn keep_running() -> MethodDescriptor {
    service(INHIBIT_SUSPEND, "keeping the system running").descriptor(MethodInfo::new(
        GNOME_SESSION_MANAGER,
        KEEP_RUNNING,
        &[PlatformTag::UnixLikeFoss],
    ))
}

pub fn keep_presenting() -> MethodDescriptor {
    service(INHIBIT_IDLE | INHIBIT_SUSPEND, "keeping the screen on").descriptor(
        MethodInfo::new(
            GNOME_SESSION_MANAGER,
            KEEP_PRESENTING,
            &[PlatformTag::UnixLikeFoss],
        ),
    )
}
