//! Shared fixtures: an executor that records every command instead of
//! spawning it, and small builders for profiles and contexts.

#![allow(dead_code)]

use async_trait::async_trait;
use cluster_lifecycle::config::{ClusterConfig, ProjectLayout, WaitPolicy};
use cluster_lifecycle::execution::{CommandExecutor, CommandOutput, CommandSpec, Result};
use cluster_lifecycle::hardware::{ComputeNode, HardwareProfile};
use cluster_lifecycle::inventory::{InventorySynthesizer, TemplateVariables};
use cluster_lifecycle::lifecycle::ClusterContext;
use cluster_lifecycle::types::ExecutionTarget;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&CommandSpec) -> CommandOutput + Send + Sync>;

pub struct RecordingExecutor {
    target: ExecutionTarget,
    responder: Responder,
    commands: Mutex<Vec<CommandSpec>>,
}

impl RecordingExecutor {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CommandSpec) -> CommandOutput + Send + Sync + 'static,
    {
        Self {
            target: ExecutionTarget::Local,
            responder: Box::new(responder),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Every command exits 0 with no output.
    pub fn succeeding() -> Self {
        Self::new(|_| ok(""))
    }

    pub fn with_target(mut self, target: ExecutionTarget) -> Self {
        self.target = target;
        self
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(CommandSpec::command_line).collect()
    }

    pub fn count(&self, predicate: impl Fn(&CommandSpec) -> bool) -> usize {
        self.commands().iter().filter(|command| predicate(command)).count()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    fn target(&self) -> &ExecutionTarget {
        &self.target
    }

    async fn dispatch(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command.clone());
        Ok((self.responder)(command))
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(exit_code: i32) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: String::new(),
        stderr: "Shared connection to 10.0.0.11 closed.".to_string(),
    }
}

pub fn is_ping(command: &CommandSpec) -> bool {
    command.program == "ansible" && command.has_arg("ping")
}

pub fn is_playbook(command: &CommandSpec, playbook: &str) -> bool {
    command.has_arg(&format!("ansible/{playbook}"))
}

/// Batched ping output with a success line for each of `up` and an
/// unreachable line for each of `down`.
pub fn ping_output(up: &[&str], down: &[&str]) -> String {
    let mut out = String::new();
    for name in up {
        out.push_str(&format!(
            "{name} | SUCCESS => {{\"changed\": false, \"ping\": \"pong\"}}\n"
        ));
    }
    for name in down {
        out.push_str(&format!(
            "{name} | UNREACHABLE! => {{\"changed\": false, \"msg\": \"Failed to connect\", \"unreachable\": true}}\n"
        ));
    }
    out
}

pub fn broadcast_output(address: &str) -> String {
    format!(
        "TASK [Show broadcast] ****\nok: [control] => {{\n    \"msg\": \"{address}\"\n}}\n"
    )
}

pub fn node(name: &str, address: &str, mac: Option<&str>) -> ComputeNode {
    ComputeNode {
        name: name.to_string(),
        address_template: address.to_string(),
        hardware_address: mac.map(str::to_string),
    }
}

pub fn profile(nodes: Vec<ComputeNode>) -> HardwareProfile {
    HardwareProfile {
        version: "0.1".to_string(),
        control_host: "control".to_string(),
        compute_nodes: nodes,
    }
}

/// Two nodes, both with hardware addresses.
pub fn two_node_profile() -> HardwareProfile {
    profile(vec![
        node("node1", "10.0.0.11", Some("aa:bb:cc:dd:ee:01")),
        node("node2", "10.0.0.12", Some("aa:bb:cc:dd:ee:02")),
    ])
}

pub fn wait_policy(max_attempts: u32) -> WaitPolicy {
    WaitPolicy::new(max_attempts, Duration::from_secs(1))
}

pub fn context(profile: HardwareProfile, wait: WaitPolicy) -> ClusterContext {
    let config = ClusterConfig {
        wait,
        ..ClusterConfig::default()
    };
    let inventory = InventorySynthesizer::new(config.login_user.as_str())
        .synthesize(&profile, &TemplateVariables::empty())
        .unwrap();

    ClusterContext::new(config, ProjectLayout::new("/project"), profile, inventory)
}

/// Collects formatted log lines written while its guard is held.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's logs into the capture until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
