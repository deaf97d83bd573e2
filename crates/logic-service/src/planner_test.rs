use super::{clamp_max_steps, detect_keywords, plan_tasks, PlanError};

fn ids(outcome: &super::PlanOutcome) -> Vec<&str> {
    outcome.tasks.iter().map(|task| task.id.as_str()).collect()
}

#[test]
fn base_plan_without_keywords() {
    let outcome = plan_tasks("write a parser", &[], None).expect("plan");
    assert_eq!(ids(&outcome), vec!["T1", "T2", "T3", "T4", "T5", "T6"]);
    assert_eq!(outcome.notes, "Keywords detected: none");
    assert!(outcome.tasks.iter().all(|task| task.depends_on.is_empty()));
}

#[test]
fn keywords_add_linked_steps_sorted_by_priority_then_title() {
    let outcome = plan_tasks("Build gRPC service with Docker", &[], None).expect("plan");
    let titles = outcome
        .tasks
        .iter()
        .map(|task| task.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec![
            "Clarify scope",
            "Design surface",
            "Implement MVP",
            "Update proto",
            "Add tests",
            "Containerize",
            "Server hook",
            "Wire endpoint",
        ]
    );
    assert_eq!(ids(&outcome), vec!["T1", "T2", "T3", "T8", "T4", "T7", "T9", "T5"]);
    let update_proto = &outcome.tasks[3];
    assert_eq!(update_proto.depends_on, vec!["T1".to_string()]);
    assert_eq!(outcome.notes, "Keywords detected: docker, grpc");
}

#[test]
fn truncation_drops_dangling_dependencies() {
    let outcome = plan_tasks("thrift bridge", &[], Some(6)).expect("plan");
    assert_eq!(ids(&outcome), vec!["T1", "T2", "T3", "T4", "T5", "T7"]);
    let note = outcome.tasks.last().expect("cross-rpc note kept");
    assert_eq!(note.title, "Cross-RPC note");
    assert!(note.depends_on.is_empty());

    let outcome = plan_tasks("more tests", &[], Some(4)).expect("plan");
    assert_eq!(ids(&outcome), vec!["T1", "T2", "T3", "T4"]);
    let outcome = plan_tasks("more tests", &[], Some(5)).expect("plan");
    let more_tests = outcome
        .tasks
        .iter()
        .find(|task| task.title == "More tests")
        .expect("more tests kept");
    assert_eq!(more_tests.depends_on, vec!["T4".to_string()]);
}

#[test]
fn k8s_without_docker_has_no_dependency() {
    let outcome = plan_tasks("deploy", &[" K8S ".to_string()], Some(20)).expect("plan");
    let manifest = outcome
        .tasks
        .iter()
        .find(|task| task.title == "K8s manifest")
        .expect("manifest present");
    assert!(manifest.depends_on.is_empty());

    let outcome = plan_tasks("deploy", &["k8s".to_string(), "docker".to_string()], Some(20)).expect("plan");
    let manifest = outcome
        .tasks
        .iter()
        .find(|task| task.title == "K8s manifest")
        .expect("manifest present");
    assert_eq!(manifest.depends_on, vec!["T7".to_string()]);
}

#[test]
fn hints_must_match_whole_keyword() {
    assert_eq!(
        detect_keywords("plain goal", &["log".to_string(), "Thrift".to_string()]),
        vec!["thrift"]
    );
    assert_eq!(detect_keywords("add LOGGING and tests", &[]), vec!["logging", "tests"]);
}

#[test]
fn max_steps_is_clamped() {
    assert_eq!(clamp_max_steps(None), 8);
    assert_eq!(clamp_max_steps(Some(0)), 8);
    assert_eq!(clamp_max_steps(Some(1)), 3);
    assert_eq!(clamp_max_steps(Some(-4)), 3);
    assert_eq!(clamp_max_steps(Some(99)), 20);
    assert_eq!(clamp_max_steps(Some(12)), 12);
}

#[test]
fn empty_goal_is_rejected() {
    assert_eq!(plan_tasks("   ", &[], None), Err(PlanError::EmptyGoal));
}
