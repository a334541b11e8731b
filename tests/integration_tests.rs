//! Integration tests for the taskboard CLI.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a taskboard Command with a clean GitHub environment
fn taskboard() -> Command {
    let mut cmd = cargo_bin_cmd!("taskboard");
    cmd.env_remove("GITHUB_CLIENT_ID")
        .env_remove("GITHUB_CLIENT_SECRET")
        .env_remove("TASKBOARD_GITHUB_API");
    cmd
}

/// Helper to initialize a board in a temp directory
fn init_board() -> TempDir {
    let dir = TempDir::new().unwrap();
    taskboard()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        taskboard()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"))
            .stdout(predicate::str::contains("project"));
    }

    #[test]
    fn test_version() {
        taskboard().arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        taskboard().arg("frobnicate").assert().failure();
    }
}

mod init {
    use super::*;

    #[test]
    fn test_init_creates_config_and_database() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"))
            .stdout(predicate::str::contains("database initialized"));

        assert!(dir.path().join(".taskboard/taskboard.toml").exists());
        assert!(dir.path().join(".taskboard/taskboard.db").exists());
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_init_with_custom_db_path() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .current_dir(dir.path())
            .args(["init", "--db-path", "data/board.db"])
            .assert()
            .success();
        assert!(dir.path().join("data/board.db").exists());
    }

    #[test]
    fn test_project_dir_flag() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .arg("--project-dir")
            .arg(dir.path())
            .arg("init")
            .assert()
            .success();
        assert!(dir.path().join(".taskboard/taskboard.db").exists());
    }
}

mod projects {
    use super::*;

    #[test]
    fn test_project_commands_require_init() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("taskboard init"));
    }

    #[test]
    fn test_list_empty() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No projects"));
    }

    #[test]
    fn test_add_and_list() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "add", "--key", "jira", "--name", "Issue Tracker"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created project JIRA (id 1)"));

        taskboard()
            .current_dir(dir.path())
            .args(["project", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("JIRA"))
            .stdout(predicate::str::contains("Issue Tracker"));
    }

    #[test]
    fn test_add_with_members_and_repo_then_show() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args([
                "project",
                "add",
                "--key",
                "WEB",
                "--name",
                "Website",
                "--member",
                "u1:Ada Lovelace",
                "--member",
                "u2:Grace Hopper",
                "--github",
                "https://github.com/acme/website.git",
            ])
            .assert()
            .success();

        taskboard()
            .current_dir(dir.path())
            .args(["project", "show", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("repository: acme/website"))
            .stdout(predicate::str::contains("Ada Lovelace (u1)"))
            .stdout(predicate::str::contains("Grace Hopper (u2)"))
            .stdout(predicate::str::contains("next id WEB-001"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "add", "--key", "JIRA", "--name", "One"])
            .assert()
            .success();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "add", "--key", "jira", "--name", "Two"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already in use"));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "add", "--key", "NO-DASHES", "--name", "X"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid project key"));
    }

    #[test]
    fn test_invalid_repo_rejected() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args([
                "project", "add", "--key", "JIRA", "--name", "X", "--github", "https://gitlab.com/a/b",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not a GitHub repository"));
    }

    #[test]
    fn test_show_missing_project() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "show", "42"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Project 42 not found"));
    }

    #[test]
    fn test_add_member_once() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "add", "--key", "JIRA", "--name", "X"])
            .assert()
            .success();
        for _ in 0..2 {
            taskboard()
                .current_dir(dir.path())
                .args(["project", "add-member", "1", "u7:Linus"])
                .assert()
                .success()
                .stdout(predicate::str::contains("JIRA now has 1 member(s)"));
        }
    }

    #[test]
    fn test_set_and_clear_repo() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["project", "add", "--key", "JIRA", "--name", "X"])
            .assert()
            .success();

        taskboard()
            .current_dir(dir.path())
            .args(["project", "set-repo", "1", "acme/tracker"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Linked JIRA to acme/tracker"));

        taskboard()
            .current_dir(dir.path())
            .args(["project", "set-repo", "1", "--clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Unlinked"));

        taskboard()
            .current_dir(dir.path())
            .args(["project", "show", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("repository: (none)"));
    }
}

mod config {
    use super::*;

    #[test]
    fn test_show_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        taskboard()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("using defaults"))
            .stdout(predicate::str::contains("port = 3141"))
            .stdout(predicate::str::contains("timeout_secs = 10"));
    }

    #[test]
    fn test_show_reads_file_and_env() {
        let dir = init_board();
        fs::write(
            dir.path().join(".taskboard/taskboard.toml"),
            "[server]\nport = 8088\n\n[github]\nclient_secret = \"hidden\"\n",
        )
        .unwrap();

        taskboard()
            .current_dir(dir.path())
            .env("GITHUB_CLIENT_ID", "from-env")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 8088"))
            .stdout(predicate::str::contains("client_id = \"from-env\""))
            .stdout(predicate::str::contains("hidden").not());
    }

    #[test]
    fn test_validate_clean_config() {
        let dir = init_board();
        taskboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid"));
    }

    #[test]
    fn test_validate_reports_warnings() {
        let dir = init_board();
        fs::write(
            dir.path().join(".taskboard/taskboard.toml"),
            "[github]\napi_base = \"api.github.com\"\ntimeout_secs = 0\n",
        )
        .unwrap();

        taskboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration warnings"))
            .stdout(predicate::str::contains("api_base"))
            .stdout(predicate::str::contains("timeout_secs"));
    }

    #[test]
    fn test_invalid_toml_fails() {
        let dir = init_board();
        fs::write(dir.path().join(".taskboard/taskboard.toml"), "[server\n").unwrap();
        taskboard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse taskboard.toml"));
    }
}
