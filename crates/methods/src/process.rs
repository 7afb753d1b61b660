//! Helper processes that hold an inhibitor for as long as they run.
//!
//! The inhibiting command wraps `cat` with piped stdin. If this process dies
//! without cleaning up, the pipe closes, `cat` exits, and so does the
//! inhibitor.

use keepawake_core::{HeartbeatCallback, MethodError};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};

/// Find `program` on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Requirement check shared by the subprocess methods.
pub fn require_program(program: &str) -> Result<(), MethodError> {
    match find_program(program) {
        Some(path) => {
            tracing::trace!(program, path = %path.display(), "found program");
            Ok(())
        }
        None => Err(MethodError::Requirement(format!(
            "the '{program}' command was not found on PATH"
        ))),
    }
}

/// A running inhibitor process.
pub struct InhibitorProcess {
    command_line: String,
    child: Arc<Mutex<Child>>,
}

impl InhibitorProcess {
    /// Spawn `program args...` with piped stdin and stdout.
    pub fn spawn(program: &str, args: &[&str]) -> Result<Self, MethodError> {
        let command_line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(command = %command_line, "spawning inhibitor");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| MethodError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(Self {
            command_line,
            child: Arc::new(Mutex::new(child)),
        })
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn pid(&self) -> u32 {
        lock(&self.child).id()
    }

    /// Whether the process is still running.
    pub fn is_alive(&self) -> bool {
        matches!(lock(&self.child).try_wait(), Ok(None))
    }

    /// Heartbeat that reports an inhibitor which exited on its own.
    pub fn watchdog(&self) -> HeartbeatCallback {
        let child = Arc::clone(&self.child);
        let command_line = self.command_line.clone();
        Arc::new(move || match lock(&child).try_wait() {
            Ok(None) => Ok(()),
            Ok(Some(status)) => Err(MethodError::Process(format!(
                "'{command_line}' exited unexpectedly ({status})"
            ))),
            Err(e) => Err(MethodError::Process(format!(
                "could not check '{command_line}': {e}"
            ))),
        })
    }

    /// Close the pipes, ask the process to terminate, and wait for it.
    pub fn terminate(&self) -> Result<(), MethodError> {
        tracing::debug!(command = %self.command_line, "terminating inhibitor");
        let mut child = lock(&self.child);

        // Dropping the handles closes the pipes.
        drop(child.stdin.take());
        drop(child.stdout.take());

        if let Ok(Some(status)) = child.try_wait() {
            tracing::debug!(command = %self.command_line, %status, "inhibitor already exited");
            return Ok(());
        }

        send_terminate(&mut child).map_err(|e| {
            MethodError::Process(format!("could not terminate '{}': {e}", self.command_line))
        })?;

        let status = child.wait().map_err(|e| {
            MethodError::Process(format!("could not wait for '{}': {e}", self.command_line))
        })?;
        tracing::debug!(command = %self.command_line, %status, "inhibitor exited");
        Ok(())
    }
}

fn lock(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) -> std::io::Result<()> {
    let pid = child.id() as libc::pid_t;
    // SAFETY: plain kill(2) on a pid we spawned and have not reaped yet.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_find_program() {
        assert!(find_program("sh").is_some());
        assert!(find_program("definitely-not-a-real-program-name").is_none());
    }

    #[test]
    fn test_require_program_error_is_requirement() {
        let err = require_program("definitely-not-a-real-program-name").unwrap_err();
        assert!(matches!(err, MethodError::Requirement(_)));
    }

    #[test]
    fn test_spawn_and_terminate_cat() {
        let process = InhibitorProcess::spawn("cat", &[]).unwrap();
        assert_eq!(process.command_line(), "cat");
        assert!(process.is_alive());
        assert!((process.watchdog())().is_ok());

        process.terminate().unwrap();
        assert!(!process.is_alive());
    }

    #[test]
    fn test_watchdog_reports_early_exit() {
        let process = InhibitorProcess::spawn("true", &[]).unwrap();
        let watchdog = process.watchdog();

        let mut reported = false;
        for _ in 0..100 {
            if watchdog().is_err() {
                reported = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(reported);
        process.terminate().unwrap();
    }

    #[test]
    fn test_spawn_missing_program() {
        let err = InhibitorProcess::spawn("definitely-not-a-real-program-name", &[]).err();
        assert!(matches!(err, Some(MethodError::Spawn { .. })));
    }
}
