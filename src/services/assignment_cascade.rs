//! Writes (entity, company) assignment pairs and keeps parent levels active.
//!
//! Every pair runs in its own transaction: the pair row, any parent
//! activations, and the review-flag refresh commit together or not at all.
//! A failing pair is recorded in `errors` and the remaining pairs continue.

use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::types::{AssignmentLevel, AssignmentStatus};
use crate::repositories;
use crate::repositories::assignments::{ParentActivation, UpsertAction, UpsertAssignment};
use crate::schemas::assignment::{AssignmentResult, AutoAssignmentResult, ItemError};

/// How the pair row itself is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairWrite {
    /// Insert when missing, update in place otherwise.
    Upsert,
    /// Only touch rows that already exist.
    ExistingOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlannedPair<'a> {
    pub(crate) entity_id: &'a str,
    pub(crate) company_id: &'a str,
    pub(crate) status: AssignmentStatus,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CascadeOptions<'a> {
    pub(crate) level: AssignmentLevel,
    pub(crate) write: PairWrite,
    pub(crate) auto_assign_parent: bool,
    pub(crate) assigned_by: &'a str,
}

#[derive(Debug, Default)]
pub(crate) struct CascadeOutcome {
    pub(crate) results: Vec<AssignmentResult>,
    pub(crate) auto_assignments: Vec<AutoAssignmentResult>,
    pub(crate) errors: Vec<ItemError>,
}

#[derive(Debug, Error)]
enum PairError {
    #[error("Assignment not found")]
    AssignmentMissing,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Same status for every pair of `entity_ids x company_ids`.
pub(crate) fn uniform_pairs<'a>(
    entity_ids: &'a [String],
    company_ids: &'a [String],
    status: AssignmentStatus,
) -> Vec<PlannedPair<'a>> {
    crate::services::selection::cross_product(entity_ids, company_ids)
        .into_iter()
        .map(|(entity_id, company_id)| PlannedPair { entity_id, company_id, status })
        .collect()
}

pub(crate) async fn apply(
    pool: &PgPool,
    pairs: &[PlannedPair<'_>],
    options: CascadeOptions<'_>,
) -> CascadeOutcome {
    let mut outcome = CascadeOutcome::default();
    let level = options.level;

    for pair in pairs {
        match apply_pair(pool, pair, options).await {
            Ok((result, parents)) => {
                metrics::record_assignment_pair(level.as_str(), result.action);
                for parent in &parents {
                    metrics::record_parent_cascade(parent.action);
                }
                outcome.results.push(result);
                outcome.auto_assignments.extend(parents);
            }
            Err(error) => {
                metrics::record_assignment_pair(level.as_str(), "failed");
                let message = pair_error_message(level, &error);
                tracing::warn!(
                    level = level.as_str(),
                    entity_id = pair.entity_id,
                    company_id = pair.company_id,
                    error = %error,
                    "Assignment pair failed"
                );
                outcome.errors.push(ItemError {
                    entity_id: pair.entity_id.to_string(),
                    company_id: Some(pair.company_id.to_string()),
                    message,
                });
            }
        }
    }

    outcome
}

async fn apply_pair(
    pool: &PgPool,
    pair: &PlannedPair<'_>,
    options: CascadeOptions<'_>,
) -> Result<(AssignmentResult, Vec<AutoAssignmentResult>), PairError> {
    let now = primitive_now_utc();
    let params = UpsertAssignment {
        entity_id: pair.entity_id,
        company_id: pair.company_id,
        status: pair.status,
        assigned_by: options.assigned_by,
        assigned_at: now,
    };

    let mut tx = pool.begin().await?;

    let (assignment, action) = match options.write {
        PairWrite::Upsert => {
            repositories::assignments::upsert(&mut *tx, options.level, params).await?
        }
        PairWrite::ExistingOnly => {
            let updated =
                repositories::assignments::update_status(&mut *tx, options.level, params).await?;
            (updated.ok_or(PairError::AssignmentMissing)?, UpsertAction::Updated)
        }
    };

    let parents = parent_chain(&mut *tx, options.level, pair.entity_id).await?;

    let mut auto_assignments = Vec::new();
    if options.auto_assign_parent && pair.status == AssignmentStatus::Active {
        for (parent_level, parent_id) in &parents {
            let activation = repositories::assignments::activate_parent(
                &mut *tx,
                *parent_level,
                parent_id,
                pair.company_id,
                options.assigned_by,
                now,
            )
            .await?;

            if let Some(action) = activation_tag(*parent_level, activation) {
                auto_assignments.push(AutoAssignmentResult {
                    level: *parent_level,
                    entity_id: parent_id.clone(),
                    company_id: pair.company_id.to_string(),
                    triggered_by: pair.entity_id.to_string(),
                    action,
                });
            }
        }
    }

    if options.level == AssignmentLevel::Task {
        if let Some((_, sub_project_id)) =
            parents.iter().find(|(level, _)| *level == AssignmentLevel::SubProject)
        {
            repositories::assignments::recompute_review_flags(&mut *tx, sub_project_id).await?;
        }
    }

    tx.commit().await?;

    let result = AssignmentResult {
        assignment_id: assignment.id,
        level: options.level,
        entity_id: assignment.entity_id,
        company_id: assignment.company_id,
        status: assignment.status,
        action: match action {
            UpsertAction::Created => "created",
            UpsertAction::Updated => "updated",
        },
    };

    Ok((result, auto_assignments))
}

/// Ancestors of an entity, nearest first.
async fn parent_chain(
    conn: &mut PgConnection,
    level: AssignmentLevel,
    entity_id: &str,
) -> Result<Vec<(AssignmentLevel, String)>, sqlx::Error> {
    let mut chain = Vec::new();
    match level {
        AssignmentLevel::Project => {}
        AssignmentLevel::SubProject => {
            if let Some(project_id) =
                repositories::projects::parent_of_sub_project(conn, entity_id).await?
            {
                chain.push((AssignmentLevel::Project, project_id));
            }
        }
        AssignmentLevel::Task => {
            if let Some(parents) = repositories::tasks::parents(conn, entity_id).await? {
                if let Some(sub_project_id) = parents.sub_project_id {
                    chain.push((AssignmentLevel::SubProject, sub_project_id));
                }
                chain.push((AssignmentLevel::Project, parents.project_id));
            }
        }
    }
    Ok(chain)
}

fn activation_tag(level: AssignmentLevel, activation: ParentActivation) -> Option<&'static str> {
    match (activation, level) {
        (ParentActivation::Created, _) => Some("parent_auto_assigned"),
        (ParentActivation::Reactivated, AssignmentLevel::SubProject) => {
            Some("parent_sub_project_updated")
        }
        (ParentActivation::Reactivated, _) => Some("parent_project_updated"),
        (ParentActivation::AlreadyActive, _) => None,
    }
}

fn pair_error_message(level: AssignmentLevel, error: &PairError) -> String {
    match error {
        PairError::AssignmentMissing => error.to_string(),
        PairError::Database(err) if crate::db::is_foreign_key_violation(err) => {
            format!("Referenced {} or company does not exist", level.as_str())
        }
        PairError::Database(_) => "Failed to write assignment".to_string(),
    }
}
