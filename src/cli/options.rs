use crate::config::{ClusterConfig, ConfigError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Cluster lifecycle management: wake, power-cycle, configure and inspect
/// the control node and its compute nodes.
#[derive(Debug, Parser)]
#[command(name = "cluster")]
#[command(about = "Cluster management tool.\n\nFor help on a specific command, use: cluster <command> --help")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct ClusterCli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Execute commands on the control host over ssh (default)
    #[arg(long, global = true, overrides_with = "no_remote")]
    pub remote: bool,

    /// Execute commands locally; use when already on the control node
    #[arg(long, global = true, overrides_with = "remote")]
    pub no_remote: bool,

    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Project root containing .hardware_version and ansible/ (default: current directory)
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    /// Maximum reachability probes before giving up
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Seconds to sleep between reachability probes
    #[arg(long, global = true)]
    pub retry_delay: Option<f64>,

    /// Per-node probe timeout in seconds
    #[arg(long, global = true)]
    pub probe_timeout: Option<u64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Get a quick status of the cluster
    Status,

    /// Configure the entire cluster from any state
    Configure,

    /// Print a longform list of every command and what it does
    Doc,

    /// Manage compute nodes
    Compute {
        #[command(subcommand)]
        action: ComputeAction,
    },

    /// Manage the control node
    Control {
        #[command(subcommand)]
        action: ControlAction,
    },

    /// Manage hardware configuration
    Hardware {
        #[command(subcommand)]
        action: HardwareAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ComputeAction {
    /// Get a quick status of the cluster
    Status,
    /// Wake up all compute nodes
    Up,
    /// Shut down all compute nodes
    Down,
    /// Restart all compute nodes
    Restart,
    /// Wait for compute nodes to be reachable
    Wait,
    /// Run configuration on compute nodes
    Configure,
    /// Run tests on compute nodes
    Test,
    /// SSH into a compute node
    Ssh {
        /// The 0-based index of the compute node
        node_index: usize,
    },
    /// Execute a command on a compute node
    Cmd {
        /// The 0-based index of the compute node
        node_index: usize,
        /// The command to execute
        command: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ControlAction {
    /// Run configuration on the control node
    Configure,
    /// Run tests on the control node
    Test,
    /// Build the golden image
    #[command(name = "build_image", alias = "build-image")]
    BuildImage,
    /// Execute a command on the control node
    Cmd {
        /// The command to execute
        command: String,
    },
    /// SSH into the control node
    Ssh,
    /// Remove the golden image on the control node
    #[command(name = "clean_image", alias = "clean-image")]
    CleanImage,
}

#[derive(Debug, Clone, Subcommand)]
pub enum HardwareAction {
    /// Set the active hardware version (e.g., 0.1)
    Set { version: String },
    /// Get the active hardware version
    Get,
}

/// Invocation-wide options, separated from the command itself.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub remote: bool,
    pub verbosity: u8,
    pub quiet: bool,
    pub project_root: Option<PathBuf>,
    pub max_attempts: Option<u32>,
    pub retry_delay: Option<f64>,
    pub probe_timeout: Option<u64>,
}

impl From<&ClusterCli> for RunOptions {
    fn from(cli: &ClusterCli) -> Self {
        Self {
            remote: !cli.no_remote,
            verbosity: cli.verbosity,
            quiet: cli.quiet,
            project_root: cli.project_root.clone(),
            max_attempts: cli.max_attempts,
            retry_delay: cli.retry_delay,
            probe_timeout: cli.probe_timeout,
        }
    }
}

impl RunOptions {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::WARN;
        }
        match self.verbosity {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn project_root(&self) -> std::io::Result<PathBuf> {
        match &self.project_root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir(),
        }
    }

    /// Command-line values win over the settings file.
    pub fn apply(&self, config: &mut ClusterConfig) -> Result<(), ConfigError> {
        if let Some(max_attempts) = self.max_attempts {
            config.wait.max_attempts = max_attempts;
        }
        if let Some(delay) = self.retry_delay {
            config.wait.delay =
                Duration::try_from_secs_f64(delay).map_err(|e| ConfigError::InvalidValue {
                    field: "retry-delay".to_string(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(timeout) = self.probe_timeout {
            config.probe_timeout_secs = timeout;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ClusterCli {
        ClusterCli::try_parse_from(std::iter::once("cluster").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn remote_is_the_default() {
        let cli = parse(&["status"]);
        assert!(RunOptions::from(&cli).remote);
    }

    #[test]
    fn last_remote_switch_wins() {
        let cli = parse(&["--remote", "--no-remote", "compute", "up"]);
        assert!(!RunOptions::from(&cli).remote);

        let cli = parse(&["--no-remote", "--remote", "compute", "up"]);
        assert!(RunOptions::from(&cli).remote);
    }

    #[test]
    fn image_commands_accept_both_spellings() {
        for name in ["build_image", "build-image"] {
            let cli = parse(&["control", name]);
            assert!(matches!(
                cli.command,
                Some(Commands::Control {
                    action: ControlAction::BuildImage
                })
            ));
        }
    }

    #[test]
    fn compute_cmd_takes_index_and_command() {
        let cli = parse(&["compute", "cmd", "2", "uptime -p"]);
        match cli.command {
            Some(Commands::Compute {
                action: ComputeAction::Cmd {
                    node_index,
                    command,
                },
            }) => {
                assert_eq!(node_index, 2);
                assert_eq!(command, "uptime -p");
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn overrides_replace_settings() {
        let cli = parse(&["--max-attempts", "5", "--retry-delay", "0.5", "compute", "wait"]);
        let mut config = ClusterConfig::default();
        RunOptions::from(&cli).apply(&mut config).unwrap();

        assert_eq!(config.wait.max_attempts, 5);
        assert_eq!(config.wait.delay, Duration::from_millis(500));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let cli = parse(&["--retry-delay=-1", "compute", "wait"]);
        let mut config = ClusterConfig::default();
        assert!(RunOptions::from(&cli).apply(&mut config).is_err());
    }

    #[test]
    fn verbosity_selects_log_level() {
        assert_eq!(RunOptions::from(&parse(&["doc"])).log_level(), tracing::Level::INFO);
        assert_eq!(RunOptions::from(&parse(&["-vv", "doc"])).log_level(), tracing::Level::TRACE);
        assert_eq!(RunOptions::from(&parse(&["-q", "doc"])).log_level(), tracing::Level::WARN);
    }
}
