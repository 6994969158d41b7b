//! Dataset naming, recall/write resolution, and privacy classification.
//!
//! All functions here are pure. Dataset names are derived deterministically
//! from tier and identity:
//!
//! | Tier     | Dataset               | Private |
//! |----------|-----------------------|---------|
//! | personal | `{user}-private`      | yes     |
//! | personal | `{user}-profile`      | no      |
//! | project  | `project-{projectId}` | no      |
//! | team     | `team-shared`         | no      |
//! | team     | `team-proposed`       | no (write staging) |
//!
//! Any other name classifies as personal + private.

use serde::{Deserialize, Serialize};

use super::context::{ScopeContext, ScopeTier};

/// Published team knowledge, readable by every team member.
pub const TEAM_SHARED_DATASET: &str = "team-shared";

/// Staging area for team writes awaiting governance review.
pub const TEAM_PROPOSED_DATASET: &str = "team-proposed";

const PROJECT_PREFIX: &str = "project-";

pub fn private_dataset(user_id: &str) -> String {
    format!("{user_id}-private")
}

pub fn profile_dataset(user_id: &str) -> String {
    format!("{user_id}-profile")
}

pub fn project_dataset(project_id: &str) -> String {
    format!("{PROJECT_PREFIX}{project_id}")
}

/// Tier and privacy of a dataset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetClass {
    pub tier: ScopeTier,
    pub is_private: bool,
}

/// Datasets a read under `scope` may search, in query order.
///
/// The private dataset is included only outside group sessions. A project
/// scope without a project falls back to the personal set.
pub fn resolve_recall_datasets(scope: &ScopeContext) -> Vec<String> {
    let user = scope.user_id.as_str();
    let mut datasets = Vec::with_capacity(4);

    if !scope.is_group_session {
        datasets.push(private_dataset(user));
    }
    datasets.push(profile_dataset(user));

    match (scope.tier, scope.project.as_ref()) {
        (ScopeTier::Personal, _) | (ScopeTier::Project, None) => {}
        (ScopeTier::Project, Some(project)) => {
            datasets.push(project_dataset(&project.id));
            datasets.push(TEAM_SHARED_DATASET.to_string());
        }
        (ScopeTier::Team, _) => {
            datasets.push(TEAM_SHARED_DATASET.to_string());
        }
    }

    datasets
}

/// Dataset a new memory created under `scope` is written to.
///
/// Team writes go to [`TEAM_PROPOSED_DATASET`], never straight to
/// [`TEAM_SHARED_DATASET`].
pub fn resolve_write_dataset(scope: &ScopeContext) -> String {
    match (scope.tier, scope.project.as_ref()) {
        (ScopeTier::Personal, _) | (ScopeTier::Project, None) => private_dataset(&scope.user_id),
        (ScopeTier::Project, Some(project)) => project_dataset(&project.id),
        (ScopeTier::Team, _) => TEAM_PROPOSED_DATASET.to_string(),
    }
}

/// Classify a dataset name relative to `user_id`.
///
/// The caller's own datasets are matched before the shared and project
/// rules, so a user id such as `project` cannot turn `project-private`
/// into a public project dataset. Unrecognized names (including other
/// users' datasets) fall back to the most restrictive class, personal +
/// private.
pub fn classify_dataset(name: &str, user_id: &str) -> DatasetClass {
    const RESTRICTED: DatasetClass = DatasetClass {
        tier: ScopeTier::Personal,
        is_private: true,
    };

    if name == private_dataset(user_id) {
        return RESTRICTED;
    }
    if name == profile_dataset(user_id) {
        return DatasetClass {
            tier: ScopeTier::Personal,
            is_private: false,
        };
    }
    if name == TEAM_SHARED_DATASET || name == TEAM_PROPOSED_DATASET {
        return DatasetClass {
            tier: ScopeTier::Team,
            is_private: false,
        };
    }
    if name.len() > PROJECT_PREFIX.len() && name.starts_with(PROJECT_PREFIX) {
        return DatasetClass {
            tier: ScopeTier::Project,
            is_private: false,
        };
    }
    RESTRICTED
}
