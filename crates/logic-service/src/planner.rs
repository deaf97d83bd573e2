//! Keyword-driven task planner.
//!
//! A plan always starts from the same base steps; keywords found in the
//! goal or hints add extra steps wired to an existing step. The list is then
//! ordered by priority and cut down to the requested size.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_MAX_STEPS: i64 = 8;
pub const MIN_MAX_STEPS: i64 = 3;
pub const MAX_MAX_STEPS: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub priority: u8,
    pub estimate_min: u32,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub tasks: Vec<Task>,
    pub notes: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("goal is empty")]
    EmptyGoal,
}

struct StepTemplate {
    title: &'static str,
    detail: &'static str,
    priority: u8,
    estimate_min: u32,
    after: Option<&'static str>,
}

const fn step(title: &'static str, detail: &'static str, priority: u8, estimate_min: u32) -> StepTemplate {
    StepTemplate {
        title,
        detail,
        priority,
        estimate_min,
        after: None,
    }
}

const fn step_after(
    title: &'static str,
    detail: &'static str,
    priority: u8,
    estimate_min: u32,
    after: &'static str,
) -> StepTemplate {
    StepTemplate {
        title,
        detail,
        priority,
        estimate_min,
        after: Some(after),
    }
}

const BASE_STEPS: &[StepTemplate] = &[
    step("Clarify scope", "Write 1–2 sentences of the goal + success criteria.", 1, 10),
    step("Design surface", "Sketch API/proto & inputs/outputs; decide return schema.", 1, 15),
    step("Implement MVP", "Code minimal path; keep pure logic isolated in its module.", 1, 40),
    step("Add tests", "Unit tests for happy-path + 1–2 edge cases.", 2, 25),
    step("Wire endpoint", "Expose via gRPC method; integrate with service layer.", 2, 20),
    step("Docs & examples", "README snippet + simple client sample.", 3, 10),
];

// Sorted by keyword; `k8s` relies on `docker` having been applied first.
const KEYWORD_TEMPLATES: &[(&str, &[StepTemplate])] = &[
    (
        "docker",
        &[step_after("Containerize", "Add Dockerfile + dev compose target.", 2, 20, "Implement MVP")],
    ),
    (
        "grpc",
        &[
            step_after("Update proto", "Add RPC/messages; regenerate stubs.", 1, 10, "Clarify scope"),
            step_after("Server hook", "Register handler in server bootstrap.", 2, 10, "Implement MVP"),
        ],
    ),
    (
        "k8s",
        &[step_after("K8s manifest", "Deployment/Service; set resource requests.", 3, 25, "Containerize")],
    ),
    (
        "logging",
        &[step_after(
            "Observability",
            "Add structured logs around request/response (no PII).",
            2,
            10,
            "Implement MVP",
        )],
    ),
    (
        "tests",
        &[step_after(
            "More tests",
            "Edge cases: empty input, invalid params, timeouts.",
            2,
            20,
            "Add tests",
        )],
    ),
    (
        "thrift",
        &[step_after(
            "Cross-RPC note",
            "Document how this composes with Thrift services.",
            3,
            10,
            "Docs & examples",
        )],
    ),
];

/// Keywords present in `goal` (substring, case-insensitive) or named
/// exactly by a hint, in sorted order.
pub fn detect_keywords(goal: &str, hints: &[String]) -> Vec<&'static str> {
    let goal = goal.to_lowercase();
    let hints = hints
        .iter()
        .map(|hint| hint.trim().to_lowercase())
        .collect::<BTreeSet<_>>();
    KEYWORD_TEMPLATES
        .iter()
        .map(|(keyword, _)| *keyword)
        .filter(|keyword| goal.contains(keyword) || hints.contains(*keyword))
        .collect()
}

pub fn clamp_max_steps(max_steps: Option<i64>) -> usize {
    let requested = match max_steps {
        Some(0) | None => DEFAULT_MAX_STEPS,
        Some(value) => value,
    };
    requested.clamp(MIN_MAX_STEPS, MAX_MAX_STEPS) as usize
}

pub fn plan_tasks(goal: &str, hints: &[String], max_steps: Option<i64>) -> Result<PlanOutcome, PlanError> {
    if goal.trim().is_empty() {
        return Err(PlanError::EmptyGoal);
    }
    let limit = clamp_max_steps(max_steps);
    let keywords = detect_keywords(goal, hints);

    let mut builder = PlanBuilder::default();
    for template in BASE_STEPS {
        builder.push(template);
    }
    for (keyword, templates) in KEYWORD_TEMPLATES {
        if keywords.contains(keyword) {
            for template in templates.iter() {
                builder.push(template);
            }
        }
    }

    let mut tasks = builder.tasks;
    tasks.sort_by(|left, right| (left.priority, &left.title).cmp(&(right.priority, &right.title)));
    tasks.truncate(limit);

    let kept = tasks.iter().map(|task| task.id.clone()).collect::<BTreeSet<_>>();
    for task in &mut tasks {
        task.depends_on.retain(|id| kept.contains(id));
    }

    let notes = if keywords.is_empty() {
        "Keywords detected: none".to_string()
    } else {
        format!("Keywords detected: {}", keywords.join(", "))
    };
    Ok(PlanOutcome { tasks, notes })
}

#[derive(Default)]
struct PlanBuilder {
    tasks: Vec<Task>,
    ids_by_title: BTreeMap<&'static str, String>,
}

impl PlanBuilder {
    fn push(&mut self, template: &StepTemplate) {
        let id = format!("T{}", self.tasks.len() + 1);
        let depends_on = template
            .after
            .and_then(|title| self.ids_by_title.get(title))
            .cloned()
            .into_iter()
            .collect();
        self.tasks.push(Task {
            id: id.clone(),
            title: template.title.to_string(),
            detail: template.detail.to_string(),
            priority: template.priority,
            estimate_min: template.estimate_min,
            depends_on,
        });
        self.ids_by_title.insert(template.title, id);
    }
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;
