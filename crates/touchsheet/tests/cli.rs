use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(tag: &str) -> Self {
        let n = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("touchsheet_cli_{tag}_{n}"));
        std::fs::create_dir_all(&path).expect("create test dir");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

const C_INPUT: &str = r#"
[[touches]]
name = "Plain Bob Doubles"
composition = "120 Plain Bob Doubles"
ringers = [
  { position = 1, ringer = "Alice" },
  { position = 2, ringer = "Bob" },
  { position = 3, ringer = "Carol" },
  { position = 4, ringer = "Dave" },
  { position = 5, ringer = "Eve" },
]
"#;

#[test]
fn test_help_lists_run() {
    cargo_bin_cmd!("touchsheet")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_run_writes_workbook() {
    let tmp = TestDir::new("ok");
    let path_input = tmp.path().join("touches.toml");
    let path_output = tmp.path().join("touches.xlsx");
    std::fs::write(&path_input, C_INPUT).expect("write input");

    cargo_bin_cmd!("touchsheet")
        .arg("run")
        .arg(&path_input)
        .arg(&path_output)
        .args(["--title", "Practice night", "--fit-columns"])
        .assert()
        .success()
        .stdout(predicate::str::contains("touches=1"))
        .stdout(predicate::str::contains("positions=5"));
    assert!(path_output.exists());
}

#[test]
fn test_run_rejects_empty_input() {
    let tmp = TestDir::new("empty");
    let path_input = tmp.path().join("empty.toml");
    let path_output = tmp.path().join("out.xlsx");
    std::fs::write(&path_input, "").expect("write input");

    cargo_bin_cmd!("touchsheet")
        .arg("run")
        .arg(&path_input)
        .arg(&path_output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no touches"));
    assert!(!path_output.exists());
}

#[test]
fn test_run_rejects_malformed_toml() {
    let tmp = TestDir::new("bad");
    let path_input = tmp.path().join("bad.toml");
    std::fs::write(&path_input, "[[touches]\nname = ").expect("write input");

    cargo_bin_cmd!("touchsheet")
        .arg("run")
        .arg(&path_input)
        .arg(tmp.path().join("out.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot parse"));
}

#[test]
fn test_run_rejects_gap_in_positions() {
    let tmp = TestDir::new("gap");
    let path_input = tmp.path().join("gap.toml");
    std::fs::write(
        &path_input,
        "[[touches]]\nname = \"Gap\"\ncomposition = \"x\"\nringers = [{ position = 1, ringer = \"A\" }, { position = 3, ringer = \"C\" }]\n",
    )
    .expect("write input");

    cargo_bin_cmd!("touchsheet")
        .arg("run")
        .arg(&path_input)
        .arg(tmp.path().join("out.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("without gaps"));
}
