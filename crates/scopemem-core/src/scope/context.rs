//! Per-request scope context.

use serde::{Deserialize, Serialize};

/// Visibility tier of a request or a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeTier {
    Personal,
    Project,
    Team,
}

impl std::fmt::Display for ScopeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Personal => write!(f, "personal"),
            Self::Project => write!(f, "project"),
            Self::Team => write!(f, "team"),
        }
    }
}

impl std::str::FromStr for ScopeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "project" => Ok(Self::Project),
            "team" => Ok(Self::Team),
            other => Err(format!("unknown scope tier: {other}")),
        }
    }
}

/// Reference to the project a request is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
}

impl ProjectRef {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            members: None,
        }
    }

    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = Some(members);
        self
    }
}

/// Resolved scope of a single request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeContext {
    pub tier: ScopeTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
    pub user_id: String,
    pub is_group_session: bool,
}

impl ScopeContext {
    /// Personal scope for a one-to-one session.
    pub fn personal(user_id: &str) -> Self {
        Self {
            tier: ScopeTier::Personal,
            project: None,
            user_id: user_id.to_string(),
            is_group_session: false,
        }
    }

    /// Project scope for a one-to-one session.
    pub fn project(user_id: &str, project: ProjectRef) -> Self {
        Self {
            tier: ScopeTier::Project,
            project: Some(project),
            user_id: user_id.to_string(),
            is_group_session: false,
        }
    }

    /// Team scope for a one-to-one session.
    pub fn team(user_id: &str) -> Self {
        Self {
            tier: ScopeTier::Team,
            project: None,
            user_id: user_id.to_string(),
            is_group_session: false,
        }
    }

    /// Same scope, marked as a group session.
    pub fn in_group(mut self) -> Self {
        self.is_group_session = true;
        self
    }
}
