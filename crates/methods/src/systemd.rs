//! `systemd-inhibit` from logind.

use crate::command::CommandMethod;
use keepawake_core::{MethodDescriptor, MethodInfo, PlatformTag, KEEP_PRESENTING, KEEP_RUNNING};

pub const SYSTEMD_INHIBIT: &str = "systemd-inhibit";

const WHO: &str = "keepawake";

fn args(what: &str, why: &str) -> Vec<String> {
    vec![
        format!("--what={what}"),
        format!("--who={WHO}"),
        format!("--why={why}"),
        "--mode=block".into(),
        "cat".into(),
    ]
}

/// Blocks sleep while `cat` runs under `systemd-inhibit`.
pub fn keep_running() -> MethodDescriptor {
    CommandMethod::descriptor(
        MethodInfo::new(SYSTEMD_INHIBIT, KEEP_RUNNING, &[PlatformTag::Linux]),
        "systemd-inhibit",
        args("sleep", "keeping the system running"),
    )
}

/// Blocks sleep and idle.
pub fn keep_presenting() -> MethodDescriptor {
    CommandMethod::descriptor(
        MethodInfo::new(SYSTEMD_INHIBIT, KEEP_PRESENTING, &[PlatformTag::Linux]),
        "systemd-inhibit",
        args("idle:sleep", "keeping the screen on"),
    )
}
