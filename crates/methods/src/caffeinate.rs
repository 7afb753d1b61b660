//! macOS `caffeinate`.

use crate::command::CommandMethod;
use keepawake_core::{MethodDescriptor, MethodInfo, PlatformTag, KEEP_PRESENTING, KEEP_RUNNING};

pub const CAFFEINATE: &str = "caffeinate";

/// `caffeinate cat`: prevents idle sleep while `cat` waits on stdin.
pub fn keep_running() -> MethodDescriptor {
    CommandMethod::descriptor(
        MethodInfo::new(CAFFEINATE, KEEP_RUNNING, &[PlatformTag::MacOs]),
        "caffeinate",
        vec!["cat".into()],
    )
}

/// `caffeinate -d cat`: also keeps the display awake.
pub fn keep_presenting() -> MethodDescriptor {
    CommandMethod::descriptor(
        MethodInfo::new(CAFFEINATE, KEEP_PRESENTING, &[PlatformTag::MacOs]),
        "caffeinate",
        vec!["-d".into(), "cat".into()],
    )
}
