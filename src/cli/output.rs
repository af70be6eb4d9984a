use crate::cli::options::ClusterCli;
use crate::types::ClusterStatus;
use clap::CommandFactory;

/// Print cluster status in human-readable format
pub fn print_cluster_status(status: &ClusterStatus) {
    print!("{}", render_cluster_status(status));
}

pub fn render_cluster_status(status: &ClusterStatus) -> String {
    let mut out = String::from("Control Node:\n");
    out.push_str(&format!("  - Host: {}\n", status.control_host));
    out.push_str(&format!("    - Status: {}\n", status.control));

    out.push_str("Compute Nodes:\n");
    if status.nodes.is_empty() {
        out.push_str("  - No compute nodes defined in hardware config.\n");
    } else {
        out.push_str(&format!(
            "  - Expected {} node(s) based on config, {} up.\n",
            status.nodes.len(),
            status.nodes_up()
        ));
        for node in &status.nodes {
            out.push_str(&format!("  - Host: {} ({})\n", node.name, node.address));
            out.push_str(&format!("    - Status: {}\n", node.status));
        }
    }

    out.push_str("----------------------\n");
    out
}

/// Print every command with its description, generated from the parser so it
/// never drifts from what the tool accepts.
pub fn print_command_doc() {
    print!("{}", render_command_doc(&ClusterCli::command()));
}

pub fn render_command_doc(command: &clap::Command) -> String {
    let bin = command.get_name();
    let mut out = String::from("# Cluster Command Documentation\n\n## Top-Level Commands\n");
    for sub in visible_subcommands(command).filter(|sub| !sub.has_subcommands()) {
        out.push_str(&format!("* `{} {}`: {}\n", bin, usage(sub), about(sub)));
    }

    for group in visible_subcommands(command).filter(|sub| sub.has_subcommands()) {
        out.push_str(&format!(
            "\n## {} Commands (`{} {} ...`)\n",
            capitalize(group.get_name()),
            bin,
            group.get_name()
        ));
        for sub in visible_subcommands(group) {
            out.push_str(&format!("* `{}`: {}\n", usage(sub), about(sub)));
        }
    }

    out
}

fn visible_subcommands(command: &clap::Command) -> impl Iterator<Item = &clap::Command> {
    command
        .get_subcommands()
        .filter(|sub| !sub.is_hide_set() && sub.get_name() != "help")
}

fn usage(command: &clap::Command) -> String {
    let mut usage = command.get_name().to_string();
    for arg in command.get_positionals() {
        usage.push_str(&format!(" <{}>", arg.get_id()));
    }
    usage
}

fn about(command: &clap::Command) -> String {
    command
        .get_about()
        .map(|about| about.to_string())
        .unwrap_or_default()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
