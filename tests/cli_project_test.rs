//! Integration tests for the analyze/commit/roadmap flows via the CLI.

mod common;

use common::{json_stdout, TestEnv};
use predicates::prelude::*;

/// Create an analyzable idea and return its id.
fn analyzable_idea(env: &TestEnv) -> String {
    let output = env
        .sl()
        .args([
            "idea",
            "create",
            "Habit Tracker",
            "--description",
            "A tool that tracks daily habits for busy professionals",
        ])
        .output()
        .unwrap();
    json_stdout(&output)["id"].as_str().unwrap().to_string()
}

/// Analyze and commit an idea; returns the new project id.
fn committed_project(env: &TestEnv) -> String {
    let idea_id = analyzable_idea(env);
    env.sl_with_oracle().arg("analyze").assert().success();
    let output = env
        .sl_with_oracle()
        .args(["project", "commit", &idea_id])
        .output()
        .unwrap();
    assert!(output.status.success(), "commit failed: {:?}", output);
    json_stdout(&output)["id"].as_str().unwrap().to_string()
}

#[test]
fn test_analyze_stores_analyses() {
    let env = TestEnv::init();
    analyzable_idea(&env);

    env.sl_with_oracle()
        .args(["analyze", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed"));
}

#[test]
fn test_analyze_rejects_when_no_idea_qualifies() {
    let env = TestEnv::new();
    // Only the seed idea exists and its description qualifies, so replace
    // it with something too short first.
    let output = env.sl().args(["idea", "list"]).output().unwrap();
    let id = json_stdout(&output)["ideas"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    env.sl()
        .args(["idea", "update", &id, "--title", "x", "--description", "tiny"])
        .assert()
        .success();

    // The script has no entries at all: if the oracle were consulted the
    // error would mention the script. A validation error proves it wasn't.
    let script = env.write_oracle("empty.json", "{}");
    env.sl()
        .env("SL_ORACLE", &script)
        .arg("analyze")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"))
        .stderr(predicate::str::contains("title of at least 2"));
}

#[test]
fn test_commit_flow_wires_first_month() {
    let env = TestEnv::init();
    let project_id = committed_project(&env);

    let output = env
        .sl()
        .args(["project", "show", &project_id])
        .output()
        .unwrap();
    let view = json_stdout(&output);

    assert_eq!(view["selectedIdea"]["status"], "active");
    let months = view["monthlyPlan"].as_array().unwrap();
    assert_eq!(months.len(), 2);

    // Month one's detailed plan equals the oracle's weekly plan.
    let weeks = months[0]["detailedPlan"].as_array().unwrap();
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0]["theme"], "Scaffold");
    assert_eq!(weeks[0]["weekNumber"], 1);
    let tasks = weeks[0]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["text"], "Set up the repo");

    // Month two has no weeks until lazily initialized.
    assert_eq!(months[1]["detailedPlan"].as_array().unwrap().len(), 0);
}

#[test]
fn test_commit_makes_project_active() {
    let env = TestEnv::init();
    let project_id = committed_project(&env);

    // `project show` without an id resolves the active project.
    let output = env.sl().args(["project", "show"]).output().unwrap();
    assert_eq!(json_stdout(&output)["id"].as_str().unwrap(), project_id);
}

#[test]
fn test_commit_rejects_past_start_date() {
    let env = TestEnv::init();
    let idea_id = analyzable_idea(&env);
    env.sl_with_oracle().arg("analyze").assert().success();

    env.sl_with_oracle()
        .args(["project", "commit", &idea_id, "--start", "2020-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be in the past"));

    env.sl()
        .args(["project", "list", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
}

#[test]
fn test_commit_requires_analysis() {
    let env = TestEnv::init();
    let idea_id = analyzable_idea(&env);

    env.sl_with_oracle()
        .args(["project", "commit", &idea_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has not been analyzed"));
}

#[test]
fn test_abandon_cascades_and_clears_active_pointer() {
    let env = TestEnv::init();
    let project_id = committed_project(&env);

    // Fill month two so the cascade has more to do.
    let output = env
        .sl()
        .args(["project", "show", &project_id])
        .output()
        .unwrap();
    let view = json_stdout(&output);
    let month2_id = view["monthlyPlan"][1]["id"].as_str().unwrap().to_string();
    env.sl()
        .args(["month", "init-weeks", &month2_id])
        .assert()
        .success();

    env.sl()
        .args(["project", "abandon", &project_id, "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Abandoned project"));

    // Everything the project owned is gone and nothing dangles.
    let output = env.sl().args(["system", "info"]).output().unwrap();
    let info = json_stdout(&output);
    assert_eq!(info["counts"]["projects"], 0);
    assert_eq!(info["counts"]["months"], 0);
    assert_eq!(info["counts"]["weeks"], 0);
    assert_eq!(info["counts"]["tasks"], 0);
    assert!(info["active_project"].is_null());

    // The idea is back to pending, ready to be committed again.
    env.sl()
        .args(["idea", "list", "--status", "pending", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Habit Tracker"));

    env.sl()
        .args(["doctor", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found."));
}

#[test]
fn test_extend_roadmap_appends_months() {
    let env = TestEnv::init();
    let project_id = committed_project(&env);

    env.sl_with_oracle()
        .args(["project", "extend", &project_id, "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extended project"));

    let output = env
        .sl()
        .args(["project", "show", &project_id])
        .output()
        .unwrap();
    let months = json_stdout(&output)["monthlyPlan"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["month"].as_u64().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(months, vec![1, 2, 3, 4]);
}

#[test]
fn test_compress_roadmap_renumbers_from_one() {
    let env = TestEnv::init();
    let project_id = committed_project(&env);

    // Extend first so compression actually shrinks the list.
    env.sl_with_oracle()
        .args(["project", "extend", &project_id])
        .assert()
        .success();

    env.sl_with_oracle()
        .args(["project", "compress", &project_id, "--months", "2"])
        .assert()
        .success();

    let output = env
        .sl()
        .args(["project", "show", &project_id])
        .output()
        .unwrap();
    let view = json_stdout(&output);
    let months = view["monthlyPlan"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["month"], 1);
    assert_eq!(months[1]["month"], 2);
    assert_eq!(months[0]["theme"], "Sprint");

    // The old months' weeks and tasks were cascade-deleted.
    let output = env.sl().args(["system", "info"]).output().unwrap();
    let info = json_stdout(&output);
    assert_eq!(info["counts"]["weeks"], 0);
    assert_eq!(info["counts"]["tasks"], 0);
}

#[test]
fn test_vision_expand_then_refine() {
    let env = TestEnv::init();
    let project_id = committed_project(&env);

    // Refining before expanding fails: no draft yet.
    env.sl_with_oracle()
        .args(["project", "vision", &project_id, "--refine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no vision draft"));

    env.sl_with_oracle()
        .args(["project", "vision", &project_id, "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A calm, profitable product"));

    env.sl_with_oracle()
        .args(["project", "vision", &project_id, "--refine"])
        .assert()
        .success();

    let output = env
        .sl()
        .args(["show", &project_id])
        .output()
        .unwrap();
    assert_eq!(
        json_stdout(&output)["threeYearVision"]["ultimateGoal"],
        "A calm, profitable product"
    );
}

#[test]
fn test_commit_twice_rejected() {
    let env = TestEnv::init();
    let project_id = committed_project(&env);
    let output = env.sl().args(["show", &project_id]).output().unwrap();
    let idea_id = json_stdout(&output)["ideaId"].as_str().unwrap().to_string();

    env.sl_with_oracle()
        .args(["project", "commit", &idea_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already committed"));
}
