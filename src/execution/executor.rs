use crate::config::{ClusterConfig, ProjectLayout};
use crate::execution::{CommandOutput, CommandSpec, Dispatch, ExecutionError, Result};
use crate::types::ExecutionTarget;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Runs commands for one invocation against a fixed execution target.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    fn target(&self) -> &ExecutionTarget;

    /// Run the command and report how it exited, whatever the exit code.
    async fn dispatch(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Run the command, failing with `CommandFailed` on a non-zero exit when
    /// the command must succeed.
    async fn execute(&self, command: &CommandSpec) -> Result<CommandOutput> {
        let output = self.dispatch(command).await?;

        if command.must_succeed && !output.success() {
            debug!(
                "Command exited with {}: {}",
                output.exit_code,
                command.command_line()
            );
            return Err(ExecutionError::CommandFailed {
                exit_code: output.exit_code,
                command: command.command_line(),
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}

/// Spawns real processes. In remote mode the project tree is synchronised to
/// the control host before the first command and every command runs over ssh
/// inside the staged directory.
pub struct ProcessExecutor {
    target: ExecutionTarget,
    project_root: PathBuf,
    remote_dir: String,
    stage_excludes: Vec<String>,
    search_path: Option<OsString>,
    staged: OnceCell<()>,
}

impl ProcessExecutor {
    pub fn new(
        target: ExecutionTarget,
        project_root: impl Into<PathBuf>,
        remote_dir: impl Into<String>,
        stage_excludes: Vec<String>,
    ) -> Self {
        Self {
            target,
            project_root: project_root.into(),
            remote_dir: remote_dir.into(),
            stage_excludes,
            search_path: None,
            staged: OnceCell::new(),
        }
    }

    /// Resolve tools against this `PATH`-style list instead of the process
    /// environment.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn from_config(target: ExecutionTarget, layout: &ProjectLayout, config: &ClusterConfig) -> Self {
        Self::new(
            target,
            layout.root(),
            config.remote_dir.clone(),
            config.stage_excludes.clone(),
        )
    }

    /// Wrap a command so that it runs in the staged directory on `host`.
    /// ssh exits with the remote command's exit code, so nothing is remapped.
    pub fn remote_invocation(&self, host: &str, command: &CommandSpec) -> CommandSpec {
        let remote_line = format!(
            "cd {} && {}",
            shell_words::quote(&self.remote_dir),
            command.command_line()
        );

        CommandSpec {
            program: "ssh".to_string(),
            args: vec![host.to_string(), remote_line],
            capture_output: command.capture_output,
            must_succeed: command.must_succeed,
            dispatch: Dispatch::Operator,
        }
    }

    /// The two commands that stage the project: create the remote directory,
    /// then mirror the local tree into it.
    pub fn staging_commands(&self, host: &str) -> (CommandSpec, CommandSpec) {
        let mkdir = CommandSpec::new("ssh")
            .arg(host)
            .arg(format!("mkdir -p {}", shell_words::quote(&self.remote_dir)))
            .capture()
            .on_operator_host();

        let mut rsync = CommandSpec::new("rsync").args(["-az", "--delete"]);
        for exclude in &self.stage_excludes {
            rsync = rsync.arg(format!("--exclude={exclude}"));
        }
        let rsync = rsync
            .arg(format!("{}/", self.project_root.display()))
            .arg(format!("{host}:{}", self.remote_dir))
            .capture()
            .on_operator_host();

        (mkdir, rsync)
    }

    async fn ensure_staged(&self, host: &str) -> Result<()> {
        self.staged
            .get_or_try_init(|| self.stage(host))
            .await
            .map(|_| ())
    }

    async fn stage(&self, host: &str) -> Result<()> {
        info!("Staging project to {}:{}", host, self.remote_dir);
        let (mkdir, rsync) = self.staging_commands(host);

        for (step, command) in [("mkdir", &mkdir), ("rsync", &rsync)] {
            debug!("Staging step {}: {}", step, command);
            let output = self.spawn(command).await?;
            if !output.success() {
                return Err(ExecutionError::StagingFailed {
                    host: host.to_string(),
                    step: step.to_string(),
                    reason: format!(
                        "exit code {}: {}",
                        output.exit_code,
                        output.stderr.trim()
                    ),
                });
            }
        }

        debug!("Project staged to {}", host);
        Ok(())
    }

    async fn spawn(&self, command: &CommandSpec) -> Result<CommandOutput> {
        let program = match &self.search_path {
            Some(paths) => which::which_in(&command.program, Some(paths), &self.project_root),
            None => which::which(&command.program),
        }
        .map_err(|_| ExecutionError::ToolNotFound {
            tool: command.program.clone(),
        })?;

        spawn(&program, command, &self.project_root).await
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    fn target(&self) -> &ExecutionTarget {
        &self.target
    }

    async fn dispatch(&self, command: &CommandSpec) -> Result<CommandOutput> {
        match (command.dispatch, &self.target) {
            (Dispatch::Target, ExecutionTarget::Remote { control_host }) => {
                self.ensure_staged(control_host).await?;
                let wrapped = self.remote_invocation(control_host, command);
                debug!("Executing remote command on {}: {}", control_host, command);
                self.spawn(&wrapped).await
            }
            _ => {
                debug!("Executing local command: {}", command);
                self.spawn(command).await
            }
        }
    }
}

async fn spawn(program: &Path, command: &CommandSpec, cwd: &Path) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(&command.args).current_dir(cwd);

    let spawn_failed = |source| ExecutionError::Spawn {
        command: command.command_line(),
        source,
    };

    if command.capture_output {
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(spawn_failed)?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    } else {
        let status = cmd.status().await.map_err(spawn_failed)?;

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
