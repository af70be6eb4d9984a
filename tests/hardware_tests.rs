use cluster_lifecycle::config::{ClusterConfig, ProjectLayout};
use cluster_lifecycle::hardware::{
    load_active_profile, read_active_version, write_active_version, HardwareError,
};
use cluster_lifecycle::lifecycle::{ClusterContext, LifecycleError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PROFILE: &str = r#"
control_host: ctl-01
compute_nodes:
  - name: node1
    ip: "{{ compute_subnet }}.11"
    mac: "aa:bb:cc:dd:ee:01"
  - name: node2
    ip: "{{ compute_subnet }}.12"
"#;

fn project() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_missing_version_file_gives_guidance() {
    let dir = project();
    let layout = ProjectLayout::new(dir.path());

    let err = read_active_version(&layout).unwrap_err();
    assert!(matches!(err, HardwareError::VersionFileMissing { .. }));
    assert!(err.to_string().contains("cluster hardware set <version>"));
}

#[test]
fn test_missing_profile_is_fatal() {
    let dir = project();
    write(dir.path(), ".hardware_version", "0.9\n");
    let layout = ProjectLayout::new(dir.path());

    let err = load_active_profile(&layout, "control").unwrap_err();
    match err {
        HardwareError::ProfileMissing { version, path } => {
            assert_eq!(version, "0.9");
            assert!(path.ends_with("ansible/hardware_vars/0.9.yml"));
        }
        other => panic!("Expected ProfileMissing, got {other:?}"),
    }
}

#[test]
fn test_active_profile_is_loaded_with_whitespace_trimmed_version() {
    let dir = project();
    write(dir.path(), ".hardware_version", "  0.1\n");
    write(dir.path(), "ansible/hardware_vars/0.1.yml", PROFILE);
    let layout = ProjectLayout::new(dir.path());

    let profile = load_active_profile(&layout, "control").unwrap();
    assert_eq!(profile.version, "0.1");
    assert_eq!(profile.control_host, "ctl-01");
    assert_eq!(profile.compute_nodes.len(), 2);
    assert_eq!(profile.hardware_addresses(), vec!["aa:bb:cc:dd:ee:01"]);
}

#[test]
fn test_set_rejects_unknown_version() {
    let dir = project();
    let layout = ProjectLayout::new(dir.path());

    let err = write_active_version(&layout, "0.7").unwrap_err();
    assert!(matches!(err, HardwareError::ProfileMissing { .. }));
    assert!(!layout.hardware_version_file().exists());
}

#[test]
fn test_set_then_get_round_trips() {
    let dir = project();
    write(dir.path(), "ansible/hardware_vars/0.2.yml", PROFILE);
    let layout = ProjectLayout::new(dir.path());

    write_active_version(&layout, "0.2").unwrap();
    assert_eq!(read_active_version(&layout).unwrap(), "0.2");
}

#[test]
fn test_context_load_writes_resolved_inventory() {
    let dir = project();
    write(dir.path(), ".hardware_version", "0.1");
    write(dir.path(), "ansible/hardware_vars/0.1.yml", PROFILE);
    write(dir.path(), "ansible/vars/main.yml", "compute_subnet: 10.0.0\n");
    let layout = ProjectLayout::new(dir.path());

    let ctx = ClusterContext::load(layout.clone(), ClusterConfig::default()).unwrap();

    assert_eq!(ctx.hardware_version(), "0.1");
    let written = fs::read_to_string(layout.dyn_inventory()).unwrap();
    assert_eq!(
        written,
        "[compute]\n\
         node1 ansible_host=10.0.0.11\n\
         node2 ansible_host=10.0.0.12\n\
         \n\
         [compute:vars]\n\
         ansible_user=compute\n"
    );
    assert_eq!(written, ctx.inventory.render());
}

#[test]
fn test_context_load_fails_on_unresolvable_template() {
    let dir = project();
    write(dir.path(), ".hardware_version", "0.1");
    write(dir.path(), "ansible/hardware_vars/0.1.yml", PROFILE);
    let layout = ProjectLayout::new(dir.path());

    let err = ClusterContext::load(layout.clone(), ClusterConfig::default()).unwrap_err();
    assert!(matches!(err, LifecycleError::Inventory(_)));
    assert!(err.to_string().contains("node1"));
    assert!(!layout.dyn_inventory().exists());
}
