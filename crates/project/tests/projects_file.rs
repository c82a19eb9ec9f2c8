mod common;

use std::fs;
use std::time::Duration;

use common::FakeHost;
use projws_project::{Transition, WorkspaceConfig, WorkspaceController};
use projws_settings::{ProjectsFile, WorkspaceSettings};
use tempfile::tempdir;

#[test]
fn snapshot_survives_a_new_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("projects.json");

    let mut store = ProjectsFile::new(&path);
    WorkspaceConfig::set_enabled(&mut store, "Alpha", true).unwrap();

    let mut host = FakeHost::new("Alpha");
    host.seed_local("a.txt");
    let b = host.seed_local("b.txt");
    host.focus(b);

    let mut session =
        WorkspaceController::new(ProjectsFile::new(&path), WorkspaceSettings::default()).unwrap();
    let exit = session.exit(&mut host).unwrap();
    assert!(matches!(exit.as_slice(), [Transition::Captured(_)]));

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("{b.txt,a.txt}"));

    let mut session =
        WorkspaceController::new(ProjectsFile::new(&path), WorkspaceSettings::default()).unwrap();
    session.ready(&mut host).unwrap();
    let reports = session.advance(&mut host, Duration::from_millis(10)).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(host.opened(), vec!["a.txt", "b.txt"]);
    assert_eq!(host.focused_path().as_deref(), Some("b.txt"));
}
