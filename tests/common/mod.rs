//! Shared test utilities for CLI end-to-end tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_catalogs(catalogs::FOO_PROJECTS, catalogs::FOO_VERSIONS);
//! fixture.command().arg("plan").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::catalogs;
    pub use super::TestFixture;
}

/// Catalog snippets for testing.
#[allow(dead_code)]
pub mod catalogs {
    pub const FOO_PROJECTS: &str = "foo,https://example/foo.git\n";
    pub const FOO_VERSIONS: &str = "foo,v1.0,abc123,2022-01-01\n";

    pub const TWO_PROJECTS: &str = "foo,https://example/foo.git\nbar,https://example/bar.git\n";
    pub const TWO_VERSIONS: &str = "bar,2.3.0,def456,2021-06-15\nfoo,v1.0,abc123,2022-01-01\n";

    /// Stands in for git, java and the co-change tool.
    ///
    /// Appends its name and arguments to `$FAKE_TOOL_LOG`, exits 1 when its
    /// first argument equals `$FAKE_TOOL_FAIL`, and otherwise leaves behind
    /// what the real tool would: a cloned directory, a dependency file or a
    /// database.
    pub const FAKE_TOOL: &str = r#"#!/bin/sh
echo "$(basename "$0") $*" >> "$FAKE_TOOL_LOG"
if [ -n "$FAKE_TOOL_FAIL" ] && [ "$1" = "$FAKE_TOOL_FAIL" ]; then
  echo "fake failure" >&2
  exit 1
fi
case "$1" in
  clone) mkdir -p "$3" ;;
  dump) : > "$3" ;;
esac
for arg in "$@"; do
  case "$arg" in
    --dir=*) : > "${arg#--dir=}/$6-structure.json" ;;
  esac
done
exit 0
"#;

    /// Configuration pointing every tool at the fake.
    pub const FAKE_TOOLS_CONFIG: &str = r#"
git:
  binary: tools/git
extractor:
  java: tools/java
  jar: tools/depends.jar
cochange:
  binary: tools/cochange-tool
"#;
}

/// A temporary directory holding catalogs and, optionally, fake tools.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `projects.csv` and `versions.csv`.
    pub fn with_catalogs(self, projects: &str, versions: &str) -> Self {
        self.with_file("projects.csv", projects)
            .with_file("versions.csv", versions)
    }

    /// Write `replicate.yaml`.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("replicate.yaml", content)
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Install the fake tool as `tools/git`, `tools/java` and
    /// `tools/cochange-tool`, and point the config at them.
    #[cfg(unix)]
    pub fn with_fake_tools(self) -> Self {
        use std::os::unix::fs::PermissionsExt;

        for name in ["git", "java", "cochange-tool"] {
            let path = self.temp_dir.child("tools").child(name);
            path.write_str(catalogs::FAKE_TOOL)
                .expect("Failed to write fake tool");
            std::fs::set_permissions(path.path(), std::fs::Permissions::from_mode(0o755))
                .expect("Failed to make fake tool executable");
        }
        self.with_config(catalogs::FAKE_TOOLS_CONFIG)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn tool_log(&self) -> PathBuf {
        self.path().join("tool.log")
    }

    /// Lines the fake tools logged, in call order.
    pub fn tool_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.tool_log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command running in this fixture, rooted at it.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cochange-replicate");
        cmd.current_dir(self.path())
            .env_remove("COCHANGE_REPLICATE_CONFIG")
            .env_remove("RUST_LOG")
            .env("FAKE_TOOL_LOG", self.tool_log())
            .arg("--color")
            .arg("never")
            .arg("--root")
            .arg(self.path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
