// Entity Models - accounts and funding-request projects
//
// Each entity has:
// - Stable identity (UUID) that never changes
// - Closed enumerations for role, decision, and status (no stringly typing)
// - A serde shape matching the HTTP boundary

pub mod account;
pub mod project;

pub use account::{Account, AccountPublic, AccountStatus, Role};
pub use project::{ApprovalSet, ApproverRole, Decision, Project, ProjectStatus};
