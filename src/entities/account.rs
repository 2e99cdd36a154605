// 👤 Account Entity - Identity, role, and credential record
//
// One account per registered user. The role is a closed enumeration so every
// authorization decision is an exhaustive match, never a string comparison.
// The password only ever exists here as a salted one-way hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ROLE
// ============================================================================

/// The four fixed platform roles.
///
/// `Startup` submits projects; the other three record approval decisions on
/// them. Adding a role is a compile-time change: every match over `Role` in
/// the workflow and dashboard modules is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Government,
    Startup,
    Bank,
    Auditor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Government => "government",
            Role::Startup => "startup",
            Role::Bank => "bank",
            Role::Auditor => "auditor",
        }
    }

    /// Parse a role from its wire form. Returns None for anything outside the
    /// fixed set (the caller maps that to a validation error).
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "government" => Some(Role::Government),
            "startup" => Some(Role::Startup),
            "bank" => Some(Role::Bank),
            "auditor" => Some(Role::Auditor),
            _ => None,
        }
    }

    /// Startups and banks register on behalf of an organization, so signup
    /// requires an organization name for them.
    pub fn requires_organization(&self) -> bool {
        matches!(self, Role::Startup | Role::Bank)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LIFECYCLE STATUS
// ============================================================================

/// Review status of a startup account. Only startup accounts carry one; it
/// defaults to `Pending` and is mutated by government review outside this
/// crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Approved => "approved",
            AccountStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<AccountStatus> {
        match s {
            "pending" => Some(AccountStatus::Pending),
            "approved" => Some(AccountStatus::Approved),
            "rejected" => Some(AccountStatus::Rejected),
            _ => None,
        }
    }
}

// ============================================================================
// ACCOUNT RECORD
// ============================================================================

/// A stored account.
///
/// `email` is kept lowercased so the unique index is effectively
/// case-insensitive. `password_hash` is `"salt$hex(sha256(salt + password))"`
/// and is deliberately excluded from serialization: nothing that leaves the
/// store ever carries it.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Stable identity (UUID) - never changes
    pub id: String,

    pub full_name: String,

    /// Lowercased, unique across all accounts
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,

    /// Required when role is startup or bank
    pub organization_name: Option<String>,

    /// Populated only for startup accounts (government review state)
    pub status: Option<AccountStatus>,

    pub created_at: DateTime<Utc>,
}

/// Public projection returned from signup: everything a client may see,
/// nothing it may not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountPublic {
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for AccountPublic {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Government, Role::Startup, Role::Bank, Role::Auditor] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("Government"), None);
    }

    #[test]
    fn test_organization_requirement() {
        assert!(Role::Startup.requires_organization());
        assert!(Role::Bank.requires_organization());
        assert!(!Role::Government.requires_organization());
        assert!(!Role::Auditor.requires_organization());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let account = Account {
            id: "a-1".to_string(),
            full_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "salt$deadbeef".to_string(),
            role: Role::Startup,
            organization_name: Some("Test Org".to_string()),
            status: Some(AccountStatus::Pending),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("password"));
    }
}
