//! Extract stage: run the structural dependency extractor.
//!
//! The extractor is a JVM jar run from inside the working tree with `.` as
//! its input root, so recorded paths come out relative to the tree. Its jar
//! and output directory are therefore passed as absolute paths. The output
//! name `<name>-deps` makes it write `<deps_dir>/<name>-deps-structure.json`.
//!
//! The extractor is heavy (it runs with an enlarged heap) and reports
//! completion only through its exit status.

use std::path::{self, Path, PathBuf};

use log::info;

use super::StageContext;
use crate::catalog::Project;
use crate::config::ReplicationConfig;
use crate::error::Result;
use crate::process::{Invocation, Tool};

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path::absolute(path)?)
}

/// The extractor command line for `project`.
pub fn extractor_invocation(config: &ReplicationConfig, project: &Project) -> Result<Invocation> {
    let extractor = &config.extractor;
    let layout = &config.layout;
    let deps_dir = absolute(&layout.deps_dir)?;

    Ok(Invocation::new(&extractor.java)
        .arg(format!("-Xmx{}", extractor.max_heap))
        .arg("-jar")
        .arg(absolute(&extractor.jar)?)
        .arg(&extractor.language)
        .arg(".")
        .arg(layout.dep_output_name(project.name()))
        .arg(format!("--dir={}", deps_dir.display()))
        .args([
            "--detail",
            "--output-self-deps",
            "--granularity=structure",
            "--namepattern=unix",
            "--strip-leading-path",
        ])
        .current_dir(layout.project_dir(project.name())))
}

/// Extract the dependency structure of the checked-out tree.
pub fn extract_dependencies(ctx: &StageContext, project: &Project) -> Result<()> {
    info!("Extracting dependency info from {}", project.name());
    ctx.ensure_dir(&ctx.config.layout.deps_dir)?;
    let invocation = extractor_invocation(ctx.config, project)?;
    ctx.run(Tool::Extractor, &invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::process::testing::RecordingRunner;
    use tempfile::TempDir;

    #[test]
    fn test_extractor_invocation_flags() {
        let config = ReplicationConfig::default().rooted_at(Path::new("/work"));
        let project = Project::new("foo", "https://example/foo.git").unwrap();

        let inv = extractor_invocation(&config, &project).unwrap();

        assert_eq!(inv.program, PathBuf::from("java"));
        assert_eq!(
            inv.arg_strings(),
            vec![
                "-Xmx12G",
                "-jar",
                "/work/external/depends.jar",
                "java",
                ".",
                "foo-deps",
                "--dir=/work/deps",
                "--detail",
                "--output-self-deps",
                "--granularity=structure",
                "--namepattern=unix",
                "--strip-leading-path",
            ]
        );
        assert_eq!(inv.cwd, Some(PathBuf::from("/work/projects/foo")));
    }

    #[test]
    fn test_extractor_invocation_absolutizes_relative_paths() {
        let config = ReplicationConfig::default();
        let project = Project::new("foo", "https://example/foo.git").unwrap();

        let inv = extractor_invocation(&config, &project).unwrap();
        let args = inv.arg_strings();

        assert!(Path::new(&args[2]).is_absolute());
        assert!(args[2].ends_with("external/depends.jar"));
        let dir = args[6].strip_prefix("--dir=").unwrap();
        assert!(Path::new(dir).is_absolute());
        // The tree itself stays relative: it is the working directory.
        assert_eq!(inv.cwd, Some(PathBuf::from("projects/foo")));
    }

    #[test]
    fn test_extractor_honors_configured_heap_and_language() {
        let mut config = ReplicationConfig::default();
        config.extractor.max_heap = "4G".to_string();
        config.extractor.language = "python".to_string();
        let project = Project::new("foo", "https://example/foo.git").unwrap();

        let args = extractor_invocation(&config, &project).unwrap().arg_strings();
        assert_eq!(args[0], "-Xmx4G");
        assert_eq!(args[3], "python");
    }

    #[test]
    fn test_extract_dependencies_creates_deps_dir_and_artifact() {
        let temp = TempDir::new().unwrap();
        let config = ReplicationConfig {
            layout: Layout {
                deps_dir: temp.path().join("out/deps"),
                ..Layout::default()
            },
            ..ReplicationConfig::default()
        };
        let runner = RecordingRunner::new();
        let ctx = StageContext::new(&config, &runner);
        let project = Project::new("bar", "https://example/bar.git").unwrap();

        extract_dependencies(&ctx, &project).unwrap();

        assert_eq!(runner.labels(), vec!["extract"]);
        assert!(config.layout.dep_file("bar").is_file());
    }

    #[test]
    fn test_extract_failure_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config = ReplicationConfig {
            layout: Layout {
                deps_dir: temp.path().join("deps"),
                ..Layout::default()
            },
            ..ReplicationConfig::default()
        };
        let runner = RecordingRunner::new().failing(Tool::Extractor, "bar-deps");
        let ctx = StageContext::new(&config, &runner);
        let project = Project::new("bar", "https://example/bar.git").unwrap();

        let err = extract_dependencies(&ctx, &project).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::ToolFailed {
                tool: Tool::Extractor,
                ..
            }
        ));
    }
}
