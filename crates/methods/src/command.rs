//! Methods backed by a long-running inhibitor command.

use crate::process::{require_program, InhibitorProcess};
use keepawake_core::{HeartbeatCallback, Method, MethodDescriptor, MethodError, MethodInfo};
use std::time::Duration;

/// How often a running inhibitor is checked for an early exit.
const WATCHDOG_INTERVAL: Duration = Duration::from_secs(30);

/// A method that holds the inhibitor while `program args...` runs.
pub struct CommandMethod {
    info: MethodInfo,
    program: &'static str,
    args: Vec<String>,
    process: Option<InhibitorProcess>,
}

impl CommandMethod {
    pub fn new(info: MethodInfo, program: &'static str, args: Vec<String>) -> Self {
        Self {
            info,
            program,
            args,
            process: None,
        }
    }

    /// Descriptor building a fresh `CommandMethod` per activation.
    pub fn descriptor(info: MethodInfo, program: &'static str, args: Vec<String>) -> MethodDescriptor {
        let template = info.clone();
        MethodDescriptor::new(info, move |_| {
            Box::new(CommandMethod::new(template.clone(), program, args.clone()))
        })
    }
}

impl Method for CommandMethod {
    fn info(&self) -> &MethodInfo {
        &self.info
    }

    fn caniuse(&self) -> Result<(), MethodError> {
        require_program(self.program)
    }

    fn enter(&mut self) -> Result<(), MethodError> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let process = InhibitorProcess::spawn(self.program, &args)?;

        if !process.is_alive() {
            // Quick failures show up here, e.g. a refused inhibit lock.
            process.terminate()?;
            return Err(MethodError::Process(format!(
                "'{}' exited right after starting",
                process.command_line()
            )));
        }

        tracing::debug!(method = %self.info.name, pid = process.pid(), "inhibitor started");
        self.process = Some(process);
        Ok(())
    }

    fn exit(&mut self) -> Result<(), MethodError> {
        match self.process.take() {
            Some(process) => process.terminate(),
            None => {
                tracing::debug!(method = %self.info.name, "no inhibitor process to terminate");
                Ok(())
            }
        }
    }

    fn heartbeat(&self) -> Option<HeartbeatCallback> {
        self.process.as_ref().map(InhibitorProcess::watchdog)
    }

    fn heartbeat_interval(&self) -> Duration {
        WATCHDOG_INTERVAL
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use keepawake_core::{MethodContext, PlatformTag};

    fn info() -> MethodInfo {
        MethodInfo::new("cat-inhibitor", "keep.running", &[PlatformTag::Any])
    }

    #[test]
    fn test_enter_and_exit() {
        let descriptor = CommandMethod::descriptor(info(), "cat", Vec::new());
        let mut method = descriptor.instantiate(&MethodContext::default());

        method.caniuse().unwrap();
        assert!(method.heartbeat().is_none());
        method.enter().unwrap();
        assert!(method.heartbeat().is_some());
        method.exit().unwrap();
        assert!(method.heartbeat().is_none());
    }

    #[test]
    fn test_exit_without_enter_is_ok() {
        let mut method = CommandMethod::new(info(), "cat", Vec::new());
        assert!(method.exit().is_ok());
    }

    #[test]
    fn test_missing_program_fails_requirements() {
        let method = CommandMethod::new(info(), "definitely-not-a-real-program-name", Vec::new());
        assert!(matches!(method.caniuse(), Err(MethodError::Requirement(_))));
    }
}
