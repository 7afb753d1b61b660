//! Keep-awake methods for the supported platforms.
//!
//! This crate provides:
//! - `caffeinate` on macOS
//! - `systemd-inhibit` on Linux
//! - freedesktop.org and GNOME inhibitors over D-Bus (Linux, `dbus` feature)
//! - [`default_registry`] with all of them, and the [`keep`] entry points
//!
//! # Example
//!
//! ```ignore
//! use keepawake_methods::keep;
//!
//! let mut mode = keep::running().build()?;
//! mode.enter()?;
//! run_long_job();
//! mode.exit()?;
//! ```

mod caffeinate;
mod command;
mod freedesktop;
mod gnome;
mod inhibit;
mod process;
mod systemd;

#[cfg(all(target_os = "linux", feature = "dbus"))]
mod zbus_adapter;

pub use caffeinate::CAFFEINATE;
pub use command::CommandMethod;
pub use freedesktop::{POWER_MANAGEMENT, SCREENSAVER};
pub use gnome::{GNOME_SESSION_MANAGER, INHIBIT_IDLE, INHIBIT_SUSPEND};
pub use inhibit::{DbusInhibitor, InhibitService};
pub use process::{find_program, require_program, InhibitorProcess};
pub use systemd::SYSTEMD_INHIBIT;

#[cfg(all(target_os = "linux", feature = "dbus"))]
pub use zbus_adapter::ZbusAdapter;

use keepawake_core::dbus::DbusAdapterFactory;
use keepawake_core::{MethodDescriptor, MethodRegistry};

/// Every built-in method, in default priority order per mode.
pub fn all_methods() -> Vec<MethodDescriptor> {
    vec![
        // keep.running
        caffeinate::keep_running(),
        freedesktop::power_management(),
        gnome::keep_running(),
        systemd::keep_running(),
        // keep.presenting
        caffeinate::keep_presenting(),
        freedesktop::screensaver(),
        gnome::keep_presenting(),
        systemd::keep_presenting(),
    ]
}

/// Registry with every built-in method.
pub fn default_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    for method in all_methods() {
        if let Err(e) = registry.register(method) {
            tracing::error!("failed to register built-in method: {}", e);
        }
    }
    registry
}

/// The D-Bus adapter used by default, if this build has one.
pub fn default_dbus_factory() -> Option<DbusAdapterFactory> {
    #[cfg(all(target_os = "linux", feature = "dbus"))]
    {
        Some(ZbusAdapter::factory())
    }
    #[cfg(not(all(target_os = "linux", feature = "dbus")))]
    {
        None
    }
}

/// Ready-made mode parameters for the built-in modes.
pub mod keep {
    use super::{default_dbus_factory, default_registry};
    use keepawake_core::{ModeParams, KEEP_PRESENTING, KEEP_RUNNING};

    /// Parameters for the mode named `name`, with the built-in methods and
    /// the default D-Bus adapter.
    pub fn mode(name: &str) -> ModeParams {
        let params = ModeParams::new(name, default_registry().methods_for_mode(name));
        match default_dbus_factory() {
            Some(factory) => params.dbus_adapter_factory(factory),
            None => params,
        }
    }

    /// Keep programs running: no automatic suspend. The screen may lock.
    pub fn running() -> ModeParams {
        mode(KEEP_RUNNING)
    }

    /// Keep the screen on and unlocked.
    pub fn presenting() -> ModeParams {
        mode(KEEP_PRESENTING)
    }
}
