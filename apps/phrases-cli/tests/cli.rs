use predicates::prelude::*;

fn bin() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("phrases-cli").expect("binary");
    cmd.env_remove("PHRASES_API")
        .env_remove("PHRASES_CONFIG")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn help_lists_subcommands() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("seed")
                .and(predicate::str::contains("inspect"))
                .and(predicate::str::contains("archive"))
                .and(predicate::str::contains("--api")),
        );
}

#[test]
fn seed_help_shows_default_delay() {
    bin()
        .args(["seed", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: 300]"));
}

#[test]
fn blank_add_is_rejected_locally() {
    bin()
        .args(["--api", "http://127.0.0.1:1/api/phrases", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("text must not be blank"));
}

#[test]
fn unreachable_facade_fails_list() {
    bin()
        .args(["--api", "http://127.0.0.1:1/api/phrases", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transport error"));
}

#[test]
fn inspect_refuses_facade() {
    bin()
        .args(["--api", "http://127.0.0.1:1/api/phrases", "inspect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("drop --api"));
}

#[test]
fn seed_with_missing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    bin()
        .args(["--api", "http://127.0.0.1:1/api/phrases", "seed", "--file"])
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading phrases from"));
}
