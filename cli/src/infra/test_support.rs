//! Scripted `CommandRunner` shared by the infra adapter tests.

use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::Result;

use crate::application::ports::CommandRunner;

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

/// Records each invocation and answers with a fixed exit code.
pub struct ScriptedRunner {
    code: i32,
    stdout: &'static str,
    stderr: &'static str,
    pub calls: Mutex<Vec<(String, Vec<String>, Vec<(String, String)>)>>,
}

impl ScriptedRunner {
    pub fn ok(stdout: &'static str) -> Self {
        Self {
            code: 0,
            stdout,
            stderr: "",
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(code: i32, stderr: &'static str) -> Self {
        Self {
            code,
            stdout: "",
            stderr,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn last_call(&self) -> (String, Vec<String>, Vec<(String, String)>) {
        self.calls
            .lock()
            .expect("lock")
            .last()
            .cloned()
            .expect("at least one call")
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_env(program, args, &[]).await
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output> {
        self.calls.lock().expect("lock").push((
            program.to_string(),
            args.iter().map(|a| (*a).to_string()).collect(),
            envs.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ));
        Ok(Output {
            status: exit_status(self.code),
            stdout: self.stdout.as_bytes().to_vec(),
            stderr: self.stderr.as_bytes().to_vec(),
        })
    }
}
