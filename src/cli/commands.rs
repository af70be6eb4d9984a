use crate::cli::options::{
    ClusterCli, Commands, ComputeAction, ControlAction, HardwareAction, RunOptions,
};
use crate::cli::output::{print_cluster_status, print_command_doc};
use crate::config::{ClusterConfig, ProjectLayout};
use crate::execution::{CommandExecutor, ProcessExecutor};
use crate::hardware::{read_active_version, write_active_version};
use crate::lifecycle::{ClusterContext, LifecycleError, Orchestrator};
use anyhow::{Context, Result};
use clap::CommandFactory;
use tracing::{debug, info};

/// Run one invocation of the tool.
///
/// `doc` and `hardware` work without an active profile; every other command
/// loads the profile, regenerates the inventory and dispatches through a
/// single executor.
pub async fn run(cli: ClusterCli) -> Result<()> {
    let options = RunOptions::from(&cli);

    let Some(command) = cli.command else {
        ClusterCli::command().print_help()?;
        return Ok(());
    };

    let root = options
        .project_root()
        .context("Failed to determine project root")?;
    let layout = ProjectLayout::new(root);

    match command {
        Commands::Doc => print_command_doc(),
        Commands::Hardware { action } => run_hardware(action, &layout)?,
        command => run_cluster_command(command, &options, layout).await?,
    }

    Ok(())
}

fn run_hardware(action: HardwareAction, layout: &ProjectLayout) -> Result<()> {
    match action {
        HardwareAction::Set { version } => {
            write_active_version(layout, &version)?;
            println!("Hardware version set to '{}'.", version.trim());
        }
        HardwareAction::Get => println!("{}", read_active_version(layout)?),
    }
    Ok(())
}

async fn run_cluster_command(
    command: Commands,
    options: &RunOptions,
    layout: ProjectLayout,
) -> Result<()> {
    let mut config =
        ClusterConfig::load(layout.root()).context("Failed to load cluster settings")?;
    options.apply(&mut config)?;
    config.validate()?;

    let context = ClusterContext::load(layout, config)?;
    let target = context.execution_target(options.remote);
    info!("Execution target: {}", target);

    let executor = ProcessExecutor::from_config(target, &context.layout, &context.config);
    let orchestrator = Orchestrator::new(&context, &executor);

    dispatch(command, &orchestrator).await?;
    Ok(())
}

async fn dispatch<E: CommandExecutor>(
    command: Commands,
    orchestrator: &Orchestrator<'_, E>,
) -> std::result::Result<(), LifecycleError> {
    debug!("Dispatching {:?}", command);

    match command {
        Commands::Status => show_status(orchestrator).await?,
        Commands::Configure => orchestrator.full_bootstrap().await?,
        Commands::Compute { action } => match action {
            ComputeAction::Status => show_status(orchestrator).await?,
            ComputeAction::Up => orchestrator.wake().await?,
            ComputeAction::Down => orchestrator.shutdown().await?,
            ComputeAction::Restart => orchestrator.reboot().await?,
            ComputeAction::Wait => {
                let attempts = orchestrator.wait_until_reachable().await?;
                debug!("Compute nodes reachable after {} probes", attempts);
            }
            ComputeAction::Configure => orchestrator.configure_compute().await?,
            ComputeAction::Test => orchestrator.test_compute().await?,
            ComputeAction::Ssh { node_index } => orchestrator.compute_shell(node_index).await?,
            ComputeAction::Cmd {
                node_index,
                command,
            } => orchestrator.compute_command(node_index, &command).await?,
        },
        Commands::Control { action } => match action {
            ControlAction::Configure => orchestrator.configure_control().await?,
            ControlAction::Test => orchestrator.test_control().await?,
            ControlAction::BuildImage => orchestrator.build_image().await?,
            ControlAction::Cmd { command } => orchestrator.control_command(&command).await?,
            ControlAction::Ssh => orchestrator.control_shell().await?,
            ControlAction::CleanImage => orchestrator.clean_image().await?,
        },
        // Handled in `run` before any profile is loaded.
        Commands::Doc | Commands::Hardware { .. } => {}
    }

    Ok(())
}

async fn show_status<E: CommandExecutor>(
    orchestrator: &Orchestrator<'_, E>,
) -> std::result::Result<(), LifecycleError> {
    let status = orchestrator.status().await?;
    print_cluster_status(&status);
    Ok(())
}
