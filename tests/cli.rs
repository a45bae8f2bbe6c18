//! End-to-end runs of the cbuild binary against a stand-in compiler.
//!
//! The compiler is `sh` running a script that logs its arguments, writes the
//! requested output and, for compiles, a dependency listing.

#![cfg(target_os = "linux")]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FAKE_CC: &str = r#"log="$(dirname "$0")/cc.log"
echo "$*" >> "$log"
out=""
src=""
prev=""
for arg in "$@"; do
  case "$prev" in
    -o) out="$arg" ;;
    -c) src="$arg" ;;
  esac
  prev="$arg"
done
case "$src" in
  *broken*) echo "error: broken unit" >&2; exit 1 ;;
esac
echo obj > "$out"
if [ -n "$src" ]; then
  printf '%s: %s\n' "$out" "$src" > "${out%.o}.d"
fi
exit 0
"#;

struct Project {
    dir: TempDir,
    tools: TempDir,
}

impl Project {
    fn new(sources: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let script = tools.path().join("fakecc.sh");
        fs::write(&script, FAKE_CC).unwrap();

        let script = script.display().to_string();
        let manifest = format!(
            r#"
[project]
name = "demo"
cc = "sh"

[profile.debug]
cflags = ["{script}"]
ldflags = ["{script}"]

[profile.release]
cflags = ["{script}", "-O2"]
ldflags = ["{script}", "-s"]
"#
        );
        fs::write(dir.path().join("Build.toml"), manifest).unwrap();

        for source in sources {
            let path = dir.path().join(source);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "int x;\n").unwrap();
        }

        Self { dir, tools }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn cbuild(&self) -> Command {
        let mut cmd = Command::cargo_bin("cbuild").unwrap();
        cmd.arg("-C").arg(self.root()).arg("--no-color");
        cmd
    }

    fn log(&self) -> Vec<String> {
        fs::read_to_string(self.tools.path().join("cc.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn compiles(&self) -> usize {
        self.log().iter().filter(|l| l.contains(" -c ")).count()
    }

    fn links(&self) -> usize {
        self.log().iter().filter(|l| !l.contains(" -c ")).count()
    }
}

#[test]
fn first_build_compiles_and_links() {
    let project = Project::new(&["src/main.c", "src/vm/eval.c"]);

    project
        .cbuild()
        .assert()
        .success()
        .stdout(predicate::str::contains("-MMD -MP -c src/main.c -o build/main.o"))
        .stdout(predicate::str::contains("-MMD -MP -c src/vm/eval.c -o build/vm/eval.o"))
        .stdout(predicate::str::contains(
            "build/main.o build/vm/eval.o -o demo -pthread",
        ));

    assert_eq!(project.compiles(), 2);
    assert_eq!(project.links(), 1);
    assert!(project.path("build/vm/eval.o").exists());
    assert!(project.path("build/vm/eval.d").exists());
    assert!(project.path("demo").exists());
}

#[test]
fn unchanged_tree_rebuilds_nothing() {
    let project = Project::new(&["src/a.c", "src/b.c"]);
    project.cbuild().assert().success();
    assert_eq!(project.log().len(), 3);

    project.cbuild().assert().success().stdout(predicate::str::is_empty());
    assert_eq!(project.log().len(), 3);
}

#[test]
fn clean_then_build_compiles_everything_once() {
    let project = Project::new(&["src/a.c", "src/b.c"]);
    project.cbuild().assert().success();

    project.cbuild().arg("clean").assert().success();
    assert!(project.path("build").is_dir());
    assert_eq!(fs::read_dir(project.path("build")).unwrap().count(), 0);

    project.cbuild().assert().success();
    assert_eq!(project.compiles(), 4);
    assert_eq!(project.links(), 2);
}

#[test]
fn release_uses_release_flags() {
    let project = Project::new(&["src/a.c"]);

    project
        .cbuild()
        .arg("release")
        .assert()
        .success()
        .stdout(predicate::str::contains("-O2 -MMD -MP -c src/a.c"))
        .stdout(predicate::str::contains("-s build/a.o -o demo -pthread"));
}

#[test]
fn compile_failure_exits_with_toolchain_code() {
    let project = Project::new(&["src/a.c", "src/broken.c", "src/z.c"]);

    project
        .cbuild()
        .assert()
        .code(255)
        .stderr(predicate::str::contains("src/broken.c"));

    assert_eq!(project.compiles(), 2);
    assert_eq!(project.links(), 0);
    assert!(project.path("build/a.o").exists());
    assert!(!project.path("build/z.o").exists());
}

#[test]
fn clean_without_build_dir_fails() {
    let project = Project::new(&["src/a.c"]);

    project
        .cbuild()
        .arg("clean")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Output directory does not exist"));
}

#[test]
fn clean_refuses_project_root_as_build_dir() {
    let project = Project::new(&["src/a.c"]);
    let manifest = fs::read_to_string(project.path("Build.toml")).unwrap();
    fs::write(
        project.path("Build.toml"),
        manifest.replace("cc = \"sh\"", "cc = \"sh\"\nbuild_dir = \".\""),
    )
    .unwrap();

    project
        .cbuild()
        .arg("clean")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("build_dir"));

    assert!(project.path("src/a.c").exists());
    assert!(project.path("Build.toml").exists());
}

#[test]
fn dry_run_touches_nothing() {
    let project = Project::new(&["src/a.c"]);

    project
        .cbuild()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("-c src/a.c -o build/a.o"));

    assert!(project.log().is_empty());
    assert!(!project.path("build").exists());
}

#[test]
fn compile_commands_database_is_written() {
    let project = Project::new(&["src/a.c", "src/b.c"]);

    project.cbuild().arg("--compile-commands").assert().success();

    let db = fs::read_to_string(project.path("build/compile_commands.json")).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&db).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 2);
    assert_eq!(entries[0]["file"], "src/a.c");
}

#[test]
fn missing_compiler_is_reported() {
    let project = Project::new(&["src/a.c"]);
    fs::write(
        project.path("Build.toml"),
        "[project]\ncc = \"no-such-compiler-9d2e\"\n",
    )
    .unwrap();

    project
        .cbuild()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing tool: no-such-compiler-9d2e"));
}

#[test]
fn invalid_project_file_is_fatal_before_building() {
    let project = Project::new(&["src/a.c"]);
    fs::write(project.path("Build.toml"), "[project]\nheader_ext = \"h\"\n").unwrap();

    project
        .cbuild()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
    assert!(!project.path("build").exists());
}
