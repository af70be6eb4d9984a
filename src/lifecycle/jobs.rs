use crate::config::{ProjectLayout, DYN_INVENTORY_RELATIVE_PATH};
use crate::execution::CommandSpec;
use std::fmt;
use std::net::IpAddr;

/// External configuration jobs (playbooks), invoked by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    GetBroadcast,
    ControlConfigure,
    ControlTest,
    BuildImage,
    CleanImage,
    ComputeConfigure,
    ComputeTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobScope {
    /// Runs against the static control inventory of the hardware version.
    Control,
    /// Runs against the synthesized compute inventory.
    Compute,
}

impl Job {
    pub fn playbook(self) -> &'static str {
        match self {
            Job::GetBroadcast => "get_broadcast.yml",
            Job::ControlConfigure => "control_configure.yml",
            Job::ControlTest => "control_test.yml",
            Job::BuildImage => "build_image.yml",
            Job::CleanImage => "clean_image.yml",
            Job::ComputeConfigure => "compute_configure.yml",
            Job::ComputeTest => "compute_test.yml",
        }
    }

    fn scope(self) -> JobScope {
        match self {
            Job::ComputeConfigure | Job::ComputeTest => JobScope::Compute,
            _ => JobScope::Control,
        }
    }

    fn becomes(self) -> bool {
        !matches!(self, Job::GetBroadcast | Job::CleanImage)
    }

    /// The image build chroots, which needs root on the control host itself.
    fn needs_sudo(self) -> bool {
        matches!(self, Job::BuildImage)
    }

    pub fn command(self, layout: &ProjectLayout, hardware_version: &str) -> CommandSpec {
        let inventory = match self.scope() {
            JobScope::Control => layout.control_inventory_relative(hardware_version),
            JobScope::Compute => layout.dyn_inventory_relative().to_string(),
        };

        let command = if self.needs_sudo() {
            CommandSpec::new("sudo").args(["-E", "ansible-playbook"])
        } else {
            CommandSpec::new("ansible-playbook")
        };

        let command = command
            .args(["-i", inventory.as_str()])
            .arg(layout.playbook_relative(self.playbook()))
            .arg("--extra-vars")
            .arg(format!("hardware_version={hardware_version}"));

        let command = if self.becomes() {
            command.arg("--become")
        } else {
            command
        };

        match self {
            Job::GetBroadcast => command.capture(),
            _ => command,
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.playbook())
    }
}

/// Ad-hoc shell command against a host pattern of the compute inventory.
pub fn adhoc_shell(pattern: &str, shell_command: &str, become_root: bool) -> CommandSpec {
    let command = CommandSpec::new("ansible")
        .arg(pattern)
        .args(["-i", DYN_INVENTORY_RELATIVE_PATH, "-m", "shell", "-a"])
        .arg(shell_command);

    if become_root {
        command.arg("--become")
    } else {
        command
    }
}

pub fn wake_packet(broadcast: IpAddr, hardware_address: &str) -> CommandSpec {
    CommandSpec::new("wakeonlan")
        .arg("-i")
        .arg(broadcast.to_string())
        .arg(hardware_address)
}

/// The privileged image build leaves root-owned files in the job runner's
/// local state directory; hand them back to the login user.
pub fn restore_runner_state_ownership() -> CommandSpec {
    CommandSpec::shell(r#"sudo chown -R "$USER:$USER" "$HOME/.ansible""#)
}
