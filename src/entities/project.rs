// 📋 Project Entity - Funding request with role-level approval map
//
// A project is submitted by a startup and then approved independently by the
// government, the auditor, and the bank. Its status is never stored as an
// opinion of its own: it is always recomputed from the approval map, so the
// two can never disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::Role;

// ============================================================================
// DECISION
// ============================================================================

/// One role's recorded decision on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Pending => "pending",
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Decision> {
        match s {
            "pending" => Some(Decision::Pending),
            "approved" => Some(Decision::Approved),
            "rejected" => Some(Decision::Rejected),
            _ => None,
        }
    }
}

// ============================================================================
// APPROVER ROLE
// ============================================================================

/// The subset of roles that may record decisions. A startup is the subject of
/// the approval process, never a participant, so the type system keeps it out
/// of the approval map entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproverRole {
    Government,
    Auditor,
    Bank,
}

impl ApproverRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApproverRole::Government => "government",
            ApproverRole::Auditor => "auditor",
            ApproverRole::Bank => "bank",
        }
    }

    /// Narrow a platform role down to an approver role. `None` for startup.
    pub fn from_role(role: Role) -> Option<ApproverRole> {
        match role {
            Role::Government => Some(ApproverRole::Government),
            Role::Auditor => Some(ApproverRole::Auditor),
            Role::Bank => Some(ApproverRole::Bank),
            Role::Startup => None,
        }
    }
}

// ============================================================================
// APPROVAL MAP
// ============================================================================

/// The per-role decision map embedded in every project. Decisions belong to
/// roles, not to the individual account that recorded them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSet {
    pub government: Decision,
    pub auditor: Decision,
    pub bank: Decision,
}

impl Default for ApprovalSet {
    fn default() -> Self {
        Self {
            government: Decision::Pending,
            auditor: Decision::Pending,
            bank: Decision::Pending,
        }
    }
}

impl ApprovalSet {
    pub fn get(&self, role: ApproverRole) -> Decision {
        match role {
            ApproverRole::Government => self.government,
            ApproverRole::Auditor => self.auditor,
            ApproverRole::Bank => self.bank,
        }
    }

    pub fn with(&self, role: ApproverRole, decision: Decision) -> ApprovalSet {
        let mut next = *self;
        match role {
            ApproverRole::Government => next.government = decision,
            ApproverRole::Auditor => next.auditor = decision,
            ApproverRole::Bank => next.bank = decision,
        }
        next
    }
}

// ============================================================================
// PROJECT STATUS
// ============================================================================

/// The single consolidated status domain.
///
/// Approval derivation only ever produces `Pending`, `Approved`, or `Funded`.
/// The remaining variants belong to the post-funding workflow (disbursement
/// and audit tracking) and appear in role-scoped dashboard filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Pending,
    Approved,
    Funded,
    Rejected,
    Funding,
    Auditing,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::Approved => "Approved",
            ProjectStatus::Funded => "Funded",
            ProjectStatus::Rejected => "Rejected",
            ProjectStatus::Funding => "Funding",
            ProjectStatus::Auditing => "Auditing",
            ProjectStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<ProjectStatus> {
        match s {
            "Pending" => Some(ProjectStatus::Pending),
            "Approved" => Some(ProjectStatus::Approved),
            "Funded" => Some(ProjectStatus::Funded),
            "Rejected" => Some(ProjectStatus::Rejected),
            "Funding" => Some(ProjectStatus::Funding),
            "Auditing" => Some(ProjectStatus::Auditing),
            "Completed" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }
}

// ============================================================================
// PROJECT RECORD
// ============================================================================

/// A stored funding-request project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Stable identity (UUID) - never changes
    pub id: String,

    pub name: String,

    pub description: String,

    /// Requested subsidy amount, non-negative
    pub subsidy: f64,

    /// Account id of the startup that submitted this project
    pub created_by: String,

    pub approvals: ApprovalSet,

    /// Derived from `approvals`, never set directly
    pub status: ProjectStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_set_defaults_to_pending() {
        let approvals = ApprovalSet::default();
        assert_eq!(approvals.government, Decision::Pending);
        assert_eq!(approvals.auditor, Decision::Pending);
        assert_eq!(approvals.bank, Decision::Pending);
    }

    #[test]
    fn test_with_updates_only_one_role() {
        let approvals = ApprovalSet::default().with(ApproverRole::Auditor, Decision::Approved);
        assert_eq!(approvals.auditor, Decision::Approved);
        assert_eq!(approvals.government, Decision::Pending);
        assert_eq!(approvals.bank, Decision::Pending);
    }

    #[test]
    fn test_startup_is_not_an_approver() {
        assert_eq!(ApproverRole::from_role(Role::Startup), None);
        assert_eq!(
            ApproverRole::from_role(Role::Government),
            Some(ApproverRole::Government)
        );
        assert_eq!(
            ApproverRole::from_role(Role::Auditor),
            Some(ApproverRole::Auditor)
        );
        assert_eq!(ApproverRole::from_role(Role::Bank), Some(ApproverRole::Bank));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProjectStatus::Pending,
            ProjectStatus::Approved,
            ProjectStatus::Funded,
            ProjectStatus::Rejected,
            ProjectStatus::Funding,
            ProjectStatus::Auditing,
            ProjectStatus::Completed,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse("pending"), None);
    }
}
