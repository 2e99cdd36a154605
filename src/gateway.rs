// 🚪 Mutation Gateway - the single write path for projects
//
// Every project mutation enters here with a verified AuthContext. The gateway
// checks the caller's role, runs the pure workflow step, and persists the
// outcome inside one SQLite transaction so concurrent decisions on the same
// project cannot overwrite each other.

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db;
use crate::entities::{ApprovalSet, ApproverRole, Decision, Project, ProjectStatus, Role};
use crate::error::{GatewayError, Result};
use crate::workflow;

// ============================================================================
// PROJECT CREATION
// ============================================================================

/// Project submission body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subsidy: f64,
}

/// Submit a new funding-request project. Only startups may create; the
/// creator is the verified caller, never a body field.
pub fn create_project(
    conn: &Connection,
    auth: &AuthContext,
    request: &CreateProjectRequest,
) -> Result<Project> {
    if auth.role != Role::Startup {
        return Err(GatewayError::Forbidden(
            "Only startup accounts can submit projects.".to_string(),
        ));
    }

    let name = request.name.trim();
    let description = request.description.trim();
    if name.is_empty() || description.is_empty() {
        return Err(GatewayError::Validation(
            "Project name and description are required.".to_string(),
        ));
    }

    if !request.subsidy.is_finite() || request.subsidy < 0.0 {
        return Err(GatewayError::Validation(
            "Subsidy must be a non-negative number.".to_string(),
        ));
    }

    let now = Utc::now();
    let project = Project {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        subsidy: request.subsidy,
        created_by: auth.account_id.clone(),
        approvals: ApprovalSet::default(),
        status: ProjectStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    db::insert_project(conn, &project)?;
    Ok(project)
}

// ============================================================================
// APPROVAL
// ============================================================================

/// Record the caller's role-level decision on a project and return the
/// updated record.
///
/// The read-modify-write runs inside an immediate transaction: the approval
/// map read here is the one the update is applied to, so two roles deciding
/// at the same instant both land.
pub fn approve_project(
    conn: &mut Connection,
    auth: &AuthContext,
    project_id: &str,
    decision: Decision,
) -> Result<Project> {
    let approver = ApproverRole::from_role(auth.role).ok_or_else(|| {
        GatewayError::Forbidden("Startup accounts cannot record approval decisions.".to_string())
    })?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut project = db::get_project(&tx, project_id)?;
    let (approvals, status) = workflow::apply_decision(project.approvals, approver, decision)?;

    let now = Utc::now();
    db::update_project_approvals(&tx, project_id, &approvals, status, now)?;
    tx.commit()?;

    project.approvals = approvals;
    project.status = status;
    project.updated_at = now;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        conn
    }

    fn startup_ctx(conn: &Connection) -> AuthContext {
        let account = crate::entities::Account {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: "Founder".to_string(),
            email: format!("{}@startup.io", uuid::Uuid::new_v4().simple()),
            password_hash: "salt$hash".to_string(),
            role: Role::Startup,
            organization_name: Some("Electrolyzer Labs".to_string()),
            status: Some(crate::entities::AccountStatus::Pending),
            created_at: Utc::now(),
        };
        db::insert_account(conn, &account).unwrap();
        AuthContext {
            account_id: account.id,
            role: Role::Startup,
        }
    }

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            account_id: uuid::Uuid::new_v4().to_string(),
            role,
        }
    }

    fn plant_request() -> CreateProjectRequest {
        CreateProjectRequest {
            name: "Green Hydrogen Plant".to_string(),
            description: "Setup of 10MW hydrogen plant".to_string(),
            subsidy: 50000.0,
        }
    }

    #[test]
    fn test_only_startups_create_projects() {
        let conn = open_db();
        for role in [Role::Government, Role::Bank, Role::Auditor] {
            let err = create_project(&conn, &ctx(role), &plant_request()).unwrap_err();
            assert!(matches!(err, GatewayError::Forbidden(_)));
        }
    }

    #[test]
    fn test_create_validates_input() {
        let conn = open_db();
        let startup = startup_ctx(&conn);

        let mut no_name = plant_request();
        no_name.name = "   ".to_string();
        assert!(matches!(
            create_project(&conn, &startup, &no_name).unwrap_err(),
            GatewayError::Validation(_)
        ));

        let mut negative = plant_request();
        negative.subsidy = -1.0;
        assert!(matches!(
            create_project(&conn, &startup, &negative).unwrap_err(),
            GatewayError::Validation(_)
        ));

        let mut nan = plant_request();
        nan.subsidy = f64::NAN;
        assert!(matches!(
            create_project(&conn, &startup, &nan).unwrap_err(),
            GatewayError::Validation(_)
        ));
    }

    #[test]
    fn test_create_starts_fully_pending() {
        let conn = open_db();
        let startup = startup_ctx(&conn);

        let project = create_project(&conn, &startup, &plant_request()).unwrap();
        assert_eq!(project.status, ProjectStatus::Pending);
        assert_eq!(project.approvals, ApprovalSet::default());
        assert_eq!(project.created_by, startup.account_id);

        let stored = db::get_project(&conn, &project.id).unwrap();
        assert_eq!(stored.status, ProjectStatus::Pending);
    }

    #[test]
    fn test_startup_can_never_approve() {
        let mut conn = open_db();
        let startup = startup_ctx(&conn);
        let project = create_project(&conn, &startup, &plant_request()).unwrap();

        for decision in [Decision::Approved, Decision::Rejected] {
            let err = approve_project(&mut conn, &startup, &project.id, decision).unwrap_err();
            assert!(matches!(err, GatewayError::Forbidden(_)));
        }

        // Nothing was recorded
        let stored = db::get_project(&conn, &project.id).unwrap();
        assert_eq!(stored.approvals, ApprovalSet::default());
    }

    #[test]
    fn test_approve_unknown_project_is_not_found() {
        let mut conn = open_db();
        let err = approve_project(
            &mut conn,
            &ctx(Role::Government),
            "no-such-id",
            Decision::Approved,
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[test]
    fn test_full_funding_scenario() {
        let mut conn = open_db();
        let startup = startup_ctx(&conn);
        let project = create_project(&conn, &startup, &plant_request()).unwrap();

        // Government approves: auditor still pending, so status stays Pending
        let p = approve_project(&mut conn, &ctx(Role::Government), &project.id, Decision::Approved)
            .unwrap();
        assert_eq!(p.status, ProjectStatus::Pending);

        // Auditor approves: Approved
        let p = approve_project(&mut conn, &ctx(Role::Auditor), &project.id, Decision::Approved)
            .unwrap();
        assert_eq!(p.status, ProjectStatus::Approved);

        // Bank approves: Funded
        let p = approve_project(&mut conn, &ctx(Role::Bank), &project.id, Decision::Approved)
            .unwrap();
        assert_eq!(p.status, ProjectStatus::Funded);

        // Funded is terminal for the approval workflow
        let err = approve_project(&mut conn, &ctx(Role::Government), &project.id, Decision::Approved)
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidTransition(_)));

        // The stored record agrees with the returned one
        let stored = db::get_project(&conn, &project.id).unwrap();
        assert_eq!(stored.status, ProjectStatus::Funded);
        assert_eq!(stored.approvals.government, Decision::Approved);
        assert_eq!(stored.approvals.auditor, Decision::Approved);
        assert_eq!(stored.approvals.bank, Decision::Approved);
    }

    #[test]
    fn test_interleaved_approvals_lose_nothing() {
        let mut conn = open_db();
        let startup = startup_ctx(&conn);
        let project = create_project(&conn, &startup, &plant_request()).unwrap();

        // Two roles decide back-to-back; each step re-reads the map inside
        // its own transaction, so the first decision survives the second.
        approve_project(&mut conn, &ctx(Role::Government), &project.id, Decision::Approved)
            .unwrap();
        let p = approve_project(&mut conn, &ctx(Role::Auditor), &project.id, Decision::Approved)
            .unwrap();

        assert_eq!(p.approvals.government, Decision::Approved);
        assert_eq!(p.approvals.auditor, Decision::Approved);
        assert_eq!(p.status, ProjectStatus::Approved);
    }

    #[test]
    fn test_rejection_is_recorded_without_terminating() {
        let mut conn = open_db();
        let startup = startup_ctx(&conn);
        let project = create_project(&conn, &startup, &plant_request()).unwrap();

        let p = approve_project(&mut conn, &ctx(Role::Bank), &project.id, Decision::Rejected)
            .unwrap();
        assert_eq!(p.approvals.bank, Decision::Rejected);
        assert_eq!(p.status, ProjectStatus::Pending);

        // The bank can change its mind later
        let p = approve_project(&mut conn, &ctx(Role::Bank), &project.id, Decision::Approved)
            .unwrap();
        assert_eq!(p.approvals.bank, Decision::Approved);
    }
}
