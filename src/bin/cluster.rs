use clap::Parser;
use cluster_lifecycle::cli::{run, ClusterCli, RunOptions};
use cluster_lifecycle::execution::ExecutionError;
use cluster_lifecycle::lifecycle::LifecycleError;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = ClusterCli::parse();

    let level = RunOptions::from(&cli).log_level();
    tracing_subscriber::fmt().with_max_level(level).init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// A failed external command's exit code becomes the process exit code.
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<LifecycleError>() {
            return e.exit_code();
        }
        if let Some(ExecutionError::CommandFailed { exit_code, .. }) =
            cause.downcast_ref::<ExecutionError>()
        {
            if (1..=255).contains(exit_code) {
                return *exit_code;
            }
        }
    }
    1
}
