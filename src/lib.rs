// Hydrogen Gateway - Core Library
// Subsidy-approval platform: startups submit funding requests, government /
// auditor / bank record role-level decisions, and project status derives from
// the approval map. Exposes all modules for the API server and tests.

pub mod auth;
pub mod dashboard;
pub mod db;
pub mod entities;
pub mod error;
pub mod gateway;
pub mod workflow;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use auth::{login, signup, verify_token, AuthContext, SignupRequest, TokenKeys};
pub use dashboard::{dashboard_for, DashboardData, ProjectSummary, DEFAULT_PAGE_SIZE};
pub use db::setup_database;
pub use entities::{
    Account, AccountPublic, AccountStatus, ApprovalSet, ApproverRole, Decision, Project,
    ProjectStatus, Role,
};
pub use error::{GatewayError, Result};
pub use gateway::{approve_project, create_project, CreateProjectRequest};
pub use workflow::{apply_decision, derive_status};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
