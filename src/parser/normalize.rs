//! Two-phase output normalizer
//!
//! `normalize` turns a capability's raw text into the record the next
//! stage expects: a strict JSON decode first, then the line-oriented
//! heuristic parser. Both phases finish with the same repair pass
//! (task ids, dependency dedup, role back-fill).

use super::heuristic::parse_heuristic;
use super::strict::parse_strict;
use crate::models::{RecordKind, RoleAssignment, RolePlan, StructuredRecord, TaskPlan, NO_TASK};
use std::collections::HashSet;
use std::fmt;

/// Normalizer failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Malformed {kind} output: {reason}")]
    MalformedOutput { kind: RecordKind, reason: String },
}

/// Which phase produced the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Strict,
    Heuristic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Strict => f.write_str("strict"),
            Phase::Heuristic => f.write_str("heuristic"),
        }
    }
}

/// Non-fatal findings, repaired or tolerated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A role plan assigned work to a role outside its roster; the role was added
    RoleConsistencyViolation { role: String },
    /// A task depends on an id no task in the plan carries
    DanglingDependency { task: String, dependency: String },
    /// Neither phase extracted any field
    NoUsableFields,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RoleConsistencyViolation { role } => {
                write!(f, "role '{}' is not in the available roles; added", role)
            }
            Diagnostic::DanglingDependency { task, dependency } => {
                write!(f, "task '{}' depends on unknown task '{}'", task, dependency)
            }
            Diagnostic::NoUsableFields => f.write_str("no usable fields extracted"),
        }
    }
}

/// A normalized record and how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub record: StructuredRecord,
    pub phase: Phase,
    pub diagnostics: Vec<Diagnostic>,
}

/// Normalize raw capability output into a record of `kind`
///
/// `roster` is the role list the producing stage was briefed with; it is
/// only consulted for role plans.
pub fn normalize(
    raw: &str,
    kind: RecordKind,
    roster: &[String],
) -> Result<Normalized, NormalizeError> {
    if raw.trim().is_empty() {
        return Err(NormalizeError::MalformedOutput {
            kind,
            reason: "output is empty".to_string(),
        });
    }

    let (record, phase) = match parse_strict(raw, kind) {
        Some(record) => (record, Phase::Strict),
        None => {
            tracing::debug!(kind = %kind, "Strict decode failed, using heuristic parser");
            (parse_heuristic(raw, kind, roster), Phase::Heuristic)
        }
    };

    let mut diagnostics = Vec::new();
    let record = match record {
        StructuredRecord::TaskPlan(plan) => {
            StructuredRecord::TaskPlan(repair_task_plan(plan, &mut diagnostics))
        }
        StructuredRecord::RolePlan(plan) => {
            StructuredRecord::RolePlan(reconcile_roles(plan, roster, &mut diagnostics))
        }
        other => other,
    };

    if record.is_blank() {
        diagnostics.push(Diagnostic::NoUsableFields);
    }

    for diagnostic in &diagnostics {
        tracing::warn!(kind = %kind, phase = %phase, "{}", diagnostic);
    }

    Ok(Normalized {
        record,
        phase,
        diagnostics,
    })
}

/// Fill missing task ids and deduplicate dependencies
///
/// Dangling dependencies are kept and reported.
fn repair_task_plan(mut plan: TaskPlan, diagnostics: &mut Vec<Diagnostic>) -> TaskPlan {
    for (idx, task) in plan.tasks.iter_mut().enumerate() {
        if task.id.is_empty() {
            task.id = format!("task-{}", idx + 1);
        }
        let mut seen = Vec::with_capacity(task.depends_on.len());
        task.depends_on.retain(|dep| {
            if seen.contains(dep) {
                false
            } else {
                seen.push(dep.clone());
                true
            }
        });
    }

    diagnostics.extend(
        plan.dangling_dependencies()
            .into_iter()
            .map(|(task, dependency)| Diagnostic::DanglingDependency { task, dependency }),
    );
    plan
}

/// Make the role mapping consistent with the roster
///
/// - an empty roster falls back to the briefed `roster`
/// - duplicate roles merge, empty roles are dropped
/// - roles outside the roster are added to it
/// - roster roles without tasks get [`NO_TASK`]
fn reconcile_roles(
    plan: RolePlan,
    roster: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> RolePlan {
    let mut available_roles = if plan.available_roles.is_empty() {
        roster.to_vec()
    } else {
        plan.available_roles
    };
    let mut seen = HashSet::new();
    available_roles.retain(|role| seen.insert(role.clone()));

    let mut assignments: Vec<RoleAssignment> = Vec::new();
    for assignment in plan.tasks {
        let role = assignment.role.trim();
        if role.is_empty() {
            continue;
        }
        match assignments.iter_mut().find(|a| a.role == role) {
            Some(existing) => existing.tasks.extend(assignment.tasks),
            None => assignments.push(RoleAssignment {
                role: role.to_string(),
                tasks: assignment.tasks,
            }),
        }
    }

    for assignment in &assignments {
        if !available_roles.contains(&assignment.role) {
            diagnostics.push(Diagnostic::RoleConsistencyViolation {
                role: assignment.role.clone(),
            });
            available_roles.push(assignment.role.clone());
        }
    }

    for assignment in assignments.iter_mut() {
        if assignment.tasks.is_empty() {
            assignment.tasks.push(NO_TASK.to_string());
        }
    }

    for role in &available_roles {
        if !assignments.iter().any(|a| &a.role == role) {
            assignments.push(RoleAssignment {
                role: role.clone(),
                tasks: vec![NO_TASK.to_string()],
            });
        }
    }

    RolePlan {
        available_roles,
        tasks: assignments,
    }
}
