//! Integration tests for idea CRUD operations via the CLI.

mod common;

use common::{json_stdout, TestEnv};
use predicates::prelude::*;

#[test]
fn test_fresh_profile_starts_with_seed_idea() {
    let env = TestEnv::new();

    env.sl()
        .args(["idea", "list", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 idea(s):"))
        .stdout(predicate::str::contains("My first scheme"));
}

#[test]
fn test_idea_create_json() {
    let env = TestEnv::init();

    env.sl()
        .args([
            "idea",
            "create",
            "Habit Tracker",
            "--description",
            "A tool that tracks daily habits",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\":\"sli-"))
        .stdout(predicate::str::contains("\"title\":\"Habit Tracker\""))
        .stdout(predicate::str::contains("\"status\":\"pending\""));
}

#[test]
fn test_idea_create_human() {
    let env = TestEnv::init();

    env.sl()
        .args(["idea", "create", "Test idea", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created idea sli-"))
        .stdout(predicate::str::contains("\"Test idea\""));
}

#[test]
fn test_idea_list_filter_by_status() {
    let env = TestEnv::init();

    let output = env
        .sl()
        .args(["idea", "create", "Archive me"])
        .output()
        .unwrap();
    let id = json_stdout(&output)["id"].as_str().unwrap().to_string();

    env.sl()
        .args(["idea", "update", &id, "--status", "archived"])
        .assert()
        .success();

    env.sl()
        .args(["idea", "list", "--status", "archived", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 idea(s):"))
        .stdout(predicate::str::contains("Archive me"));

    env.sl()
        .args(["idea", "list", "--status", "active", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No ideas found."));
}

#[test]
fn test_idea_show_round_trip() {
    let env = TestEnv::init();

    let output = env
        .sl()
        .args([
            "idea",
            "create",
            "Show me",
            "--description",
            "Detailed description here",
            "--emoji",
            "🌱",
        ])
        .output()
        .unwrap();
    let id = json_stdout(&output)["id"].as_str().unwrap().to_string();

    env.sl()
        .args(["idea", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\":\"Show me\""))
        .stdout(predicate::str::contains("\"emoji\":\"🌱\""));

    env.sl()
        .args(["idea", "show", &id, "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[pending]"))
        .stdout(predicate::str::contains("Description: Detailed description here"));
}

#[test]
fn test_idea_show_not_found() {
    let env = TestEnv::init();

    env.sl()
        .args(["idea", "show", "sli-ffffff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_idea_update_title_persists() {
    let env = TestEnv::init();

    let output = env
        .sl()
        .args(["idea", "create", "Original"])
        .output()
        .unwrap();
    let id = json_stdout(&output)["id"].as_str().unwrap().to_string();

    env.sl()
        .args(["idea", "update", &id, "--title", "Renamed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"updated_fields\":[\"title\"]"));

    env.sl()
        .args(["idea", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\":\"Renamed\""));
}

#[test]
fn test_idea_delete() {
    let env = TestEnv::init();

    let output = env
        .sl()
        .args(["idea", "create", "Doomed"])
        .output()
        .unwrap();
    let id = json_stdout(&output)["id"].as_str().unwrap().to_string();

    env.sl()
        .args(["idea", "delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"deleted\":true"));

    env.sl().args(["idea", "show", &id]).assert().failure();
}

#[test]
fn test_last_idea_cannot_be_deleted() {
    let env = TestEnv::init();

    let output = env.sl().args(["idea", "list"]).output().unwrap();
    let ideas = json_stdout(&output);
    let id = ideas["ideas"][0]["id"].as_str().unwrap().to_string();

    env.sl()
        .args(["idea", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("At least one idea must remain"));
}

#[test]
fn test_idea_refine_with_oracle() {
    let env = TestEnv::init();

    let output = env
        .sl()
        .args(["idea", "create", "habit app??", "--description", "something with habits"])
        .output()
        .unwrap();
    let id = json_stdout(&output)["id"].as_str().unwrap().to_string();

    env.sl_with_oracle()
        .args(["idea", "refine", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\":\"Habit Tracker Pro\""));

    // The refined fields persisted.
    env.sl()
        .args(["idea", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Habit Tracker Pro"));
}

#[test]
fn test_idea_refine_without_oracle_fails_cleanly() {
    let env = TestEnv::init();

    let output = env.sl().args(["idea", "list"]).output().unwrap();
    let id = json_stdout(&output)["ideas"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    env.sl()
        .args(["idea", "refine", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no planning oracle configured"));
}

#[test]
fn test_idea_suggest_adds_ideas() {
    let env = TestEnv::init();

    env.sl_with_oracle()
        .args(["idea", "suggest", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 suggested idea(s):"));

    env.sl()
        .args(["idea", "list", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 idea(s):"))
        .stdout(predicate::str::contains("Recipe box"))
        .stdout(predicate::str::contains("Plant journal"));
}

#[test]
fn test_generic_show_idea() {
    let env = TestEnv::init();

    let output = env
        .sl()
        .args(["idea", "create", "Generic show test"])
        .output()
        .unwrap();
    let id = json_stdout(&output)["id"].as_str().unwrap().to_string();

    env.sl()
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"idea\""))
        .stdout(predicate::str::contains("Generic show test"));
}
