use clap::Parser;
use cluster_lifecycle::cli::{run, ClusterCli};
use cluster_lifecycle::config::ProjectLayout;
use cluster_lifecycle::hardware::read_active_version;

fn cli(args: &[&str]) -> ClusterCli {
    ClusterCli::try_parse_from(std::iter::once("cluster").chain(args.iter().copied())).unwrap()
}

#[tokio::test]
async fn test_hardware_commands_work_without_active_profile() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    std::fs::create_dir_all(dir.path().join("ansible/hardware_vars")).unwrap();
    std::fs::write(dir.path().join("ansible/hardware_vars/0.3.yml"), "compute_nodes: []\n").unwrap();

    run(cli(&["--project-root", root, "hardware", "set", "0.3"]))
        .await
        .unwrap();
    run(cli(&["--project-root", root, "hardware", "get"]))
        .await
        .unwrap();

    assert_eq!(read_active_version(&ProjectLayout::new(dir.path())).unwrap(), "0.3");
}

#[tokio::test]
async fn test_doc_needs_no_project() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();

    run(cli(&["--project-root", root, "doc"])).await.unwrap();
}

#[tokio::test]
async fn test_cluster_commands_fail_without_hardware_version() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();

    let err = run(cli(&["--project-root", root, "--no-remote", "status"]))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("cluster hardware set <version>"));
}

#[tokio::test]
async fn test_invalid_settings_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    std::fs::write(dir.path().join("cluster.yml"), "wait:\n  max_attempts: 0\n").unwrap();

    let err = run(cli(&["--project-root", root, "--no-remote", "compute", "wait"]))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("wait.max_attempts"));
}
