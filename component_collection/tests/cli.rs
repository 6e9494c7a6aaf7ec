//! Drives the `component-collection` binary through a whole project.
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface fixture mistakes"
)]

use std::process::{Command, Output};

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use test_helpers::fixtures::LOGIN_SCENE_JSON;
use test_helpers::text::mask_timestamps;

struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn project() -> Project {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("tempdir path is UTF-8");
    std::fs::write(root.join("login.json"), LOGIN_SCENE_JSON).expect("write scene");
    Project { _dir: dir, root }
}

fn run(root: &Utf8Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_component-collection"))
        .arg("--project")
        .arg(root.as_str())
        .args(args)
        .env_remove("COMPONENT_COLLECTION_SETTINGS")
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn component-collection")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const TARGET_ARGS: [&str; 4] = ["--scene", "login.json", "--target", "login.toml"];

#[rstest]
fn commands_fail_until_initialised(project: Project) {
    let mut args = vec!["collect"];
    args.extend(TARGET_ARGS);
    let output = run(&project.root, &args);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("run `init`"));
}

#[rstest]
fn full_workflow(project: Project) {
    let init = run(&project.root, &["init"]);
    assert!(init.status.success());
    assert!(project.root.join("component_collection.toml").is_file());

    let list = run(&project.root, &["list"]);
    assert!(stdout(&list).contains("component_collection::collector::DefaultCollector"));
    assert!(stdout(&list).contains("<None>"));

    let mut collect_args = vec!["collect"];
    collect_args.extend(TARGET_ARGS);
    let collect = run(&project.root, &collect_args);
    assert!(collect.status.success());
    assert!(stdout(&collect).contains("m_OkButton -> Image_Button_Ok"));
    assert!(project.root.join("login.toml").is_file());

    let mut generate_args = vec!["generate", "--artifact", "all"];
    generate_args.extend(TARGET_ARGS);
    let generate = run(&project.root, &generate_args);
    assert!(generate.status.success());
    let components = std::fs::read_to_string(project.root.join("Assets/LoginPanel.Components.cs"))
        .expect("components file");
    assert!(mask_timestamps(&components).contains("at <CREATED>."));
    assert!(components.contains("            m_OkButton = collection.GetComponent<Button>(2);"));
    assert!(project.root.join("Assets/LoginPanel.cs").is_file());

    let refused = run(&project.root, &generate_args);
    assert!(!refused.status.success());
    generate_args.push("--force");
    assert!(run(&project.root, &generate_args).status.success());

    let extension = run(&project.root, &["extension"]);
    assert!(extension.status.success());
    assert!(project.root.join("Assets/ComponentCollectionExtension.cs").is_file());
}
