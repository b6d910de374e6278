//! End-to-end tests for the `run` command.
//!
//! The pipeline is exercised against shell-script stand-ins for git, the
//! dependency extractor and the co-change tool, which log their arguments.

mod common;
use common::prelude::*;

#[test]
fn test_run_dry_run_creates_nothing() {
    let fixture = TestFixture::new().with_catalogs(catalogs::FOO_PROJECTS, catalogs::FOO_VERSIONS);

    fixture
        .command()
        .arg("run")
        .arg("--dry-run")
        .assert()
        .success()
        .stderr(predicate::str::contains("[dry-run]"))
        .stderr(predicate::str::contains("--since 2019-01-01 v1.0"))
        .stderr(predicate::str::contains("--commit abc123"))
        .stdout(predicate::str::contains("1 of 1 projects replicated"));

    fixture.child("projects").assert(predicate::path::missing());
    fixture.child("deps").assert(predicate::path::missing());
    fixture.child("dbs").assert(predicate::path::missing());
}

#[test]
fn test_run_missing_version_runs_no_stage() {
    let fixture = TestFixture::new().with_catalogs(catalogs::TWO_PROJECTS, catalogs::FOO_VERSIONS);

    fixture
        .command()
        .arg("run")
        .arg("--dry-run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No version entry for project bar"))
        .stderr(predicate::str::contains("[dry-run]").not());
}

#[test]
fn test_run_rejects_unknown_policy() {
    let fixture = TestFixture::new().with_catalogs(catalogs::FOO_PROJECTS, catalogs::FOO_VERSIONS);

    fixture
        .command()
        .arg("run")
        .arg("--on-failure")
        .arg("retry")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown failure policy"));
}

#[cfg(unix)]
#[test]
fn test_run_invokes_tools_in_order() {
    let fixture = TestFixture::new()
        .with_catalogs(catalogs::FOO_PROJECTS, catalogs::FOO_VERSIONS)
        .with_fake_tools();
    let root = fixture.path().display().to_string();

    fixture
        .command()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "foo: checkout ok, extract ok, dump ok, attach ok",
        ));

    let calls = fixture.tool_calls();
    assert_eq!(calls.len(), 5, "unexpected calls: {:#?}", calls);
    assert_eq!(
        calls[0],
        format!("git clone https://example/foo.git {}/projects/foo", root)
    );
    assert_eq!(calls[1], "git -c advice.detachedHead=false checkout v1.0");
    assert!(calls[2].starts_with("java -Xmx12G -jar "));
    assert!(calls[2].contains(" java . foo-deps "));
    assert!(calls[2].contains(&format!("--dir={}/deps", root)));
    assert_eq!(
        calls[3],
        format!(
            "cochange-tool dump --db {root}/dbs/foo.db --repo {root}/projects/foo --since 2019-01-01 v1.0"
        )
    );
    assert_eq!(
        calls[4],
        format!(
            "cochange-tool add-deps --db {root}/dbs/foo.db --commit abc123 --dep-file {root}/deps/foo-deps-structure.json"
        )
    );

    fixture.child("dbs/foo.db").assert(predicate::path::is_file());
    fixture
        .child("deps/foo-deps-structure.json")
        .assert(predicate::path::is_file());
}

#[cfg(unix)]
#[test]
fn test_run_rerun_reuses_working_tree() {
    let fixture = TestFixture::new()
        .with_catalogs(catalogs::FOO_PROJECTS, catalogs::FOO_VERSIONS)
        .with_fake_tools();

    fixture.command().arg("run").assert().success();
    fixture.command().arg("run").assert().success();

    let clones = fixture
        .tool_calls()
        .iter()
        .filter(|c| c.starts_with("git clone"))
        .count();
    assert_eq!(clones, 1);
}

#[cfg(unix)]
#[test]
fn test_run_failed_stage_skips_rest_of_project() {
    let fixture = TestFixture::new()
        .with_catalogs(catalogs::TWO_PROJECTS, catalogs::TWO_VERSIONS)
        .with_fake_tools();

    fixture
        .command()
        .env("FAKE_TOOL_FAIL", "dump")
        .arg("run")
        .arg("--project")
        .arg("foo")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "foo: checkout ok, extract ok, dump FAILED, attach skipped",
        ))
        .stdout(predicate::str::contains("foo failed at dump"))
        .stderr(predicate::str::contains("fake failure"))
        .stderr(predicate::str::contains("1 of 1 projects failed to replicate"));

    assert!(!fixture
        .tool_calls()
        .iter()
        .any(|c| c.starts_with("cochange-tool add-deps")));
}

#[cfg(unix)]
#[test]
fn test_run_abort_policy_stops_before_next_project() {
    let fixture = TestFixture::new()
        .with_catalogs(catalogs::TWO_PROJECTS, catalogs::TWO_VERSIONS)
        .with_fake_tools();

    fixture
        .command()
        .env("FAKE_TOOL_FAIL", "clone")
        .arg("run")
        .arg("--on-failure")
        .arg("abort")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Run aborted: stage checkout failed for project foo"));

    assert_eq!(fixture.tool_calls().len(), 1);
}
