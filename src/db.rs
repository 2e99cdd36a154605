// 🗄️  Project Store - SQLite persistence for accounts and projects
//
// The store handle is an explicitly opened Connection passed into every
// function; there is no ambient global. Uniqueness of emails is enforced by
// the database itself (UNIQUE + NOCASE), not by a check-then-insert race.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::entities::{
    Account, AccountStatus, ApprovalSet, Decision, Project, ProjectStatus, Role,
};
use crate::error::{GatewayError, Result};

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL COLLATE NOCASE UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            organization_name TEXT,
            status TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            subsidy REAL NOT NULL,
            created_by TEXT NOT NULL REFERENCES accounts(id),
            approval_government TEXT NOT NULL DEFAULT 'pending',
            approval_auditor TEXT NOT NULL DEFAULT 'pending',
            approval_bank TEXT NOT NULL DEFAULT 'pending',
            status TEXT NOT NULL DEFAULT 'Pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_projects_created_by ON projects(created_by)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_projects_created_at ON projects(created_at)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn parse_timestamp(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidQuery)
}

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let role_str: String = row.get(4)?;
    let status_str: Option<String> = row.get(6)?;
    let created_at_str: String = row.get(7)?;

    Ok(Account {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::parse(&role_str).ok_or(rusqlite::Error::InvalidQuery)?,
        organization_name: row.get(5)?,
        status: match status_str {
            Some(s) => Some(AccountStatus::parse(&s).ok_or(rusqlite::Error::InvalidQuery)?),
            None => None,
        },
        created_at: parse_timestamp(&created_at_str)?,
    })
}

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    let government: String = row.get(5)?;
    let auditor: String = row.get(6)?;
    let bank: String = row.get(7)?;
    let status: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        subsidy: row.get(3)?,
        created_by: row.get(4)?,
        approvals: ApprovalSet {
            government: Decision::parse(&government).ok_or(rusqlite::Error::InvalidQuery)?,
            auditor: Decision::parse(&auditor).ok_or(rusqlite::Error::InvalidQuery)?,
            bank: Decision::parse(&bank).ok_or(rusqlite::Error::InvalidQuery)?,
        },
        status: ProjectStatus::parse(&status).ok_or(rusqlite::Error::InvalidQuery)?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

const PROJECT_COLUMNS: &str = "id, name, description, subsidy, created_by,
        approval_government, approval_auditor, approval_bank, status,
        created_at, updated_at";

// ============================================================================
// ACCOUNTS
// ============================================================================

/// Insert a new account. A duplicate email (any casing) surfaces as
/// `Conflict` from the UNIQUE constraint - this is the only uniqueness check,
/// so two concurrent signups cannot both win.
pub fn insert_account(conn: &Connection, account: &Account) -> Result<()> {
    let result = conn.execute(
        "INSERT INTO accounts (
            id, full_name, email, password_hash, role, organization_name, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            account.id,
            account.full_name,
            account.email,
            account.password_hash,
            account.role.as_str(),
            account.organization_name,
            account.status.map(|s| s.as_str()),
            account.created_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(GatewayError::Conflict(
                "User with this email already exists.".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Look an account up by email (case-insensitive via the NOCASE collation).
pub fn find_account_by_email(conn: &Connection, email: &str) -> Result<Option<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, email, password_hash, role, organization_name, status, created_at
         FROM accounts WHERE email = ?1",
    )?;

    let mut rows = stmt.query_map(params![email], account_from_row)?;
    match rows.next() {
        Some(account) => Ok(Some(account?)),
        None => Ok(None),
    }
}

pub fn get_account(conn: &Connection, id: &str) -> Result<Account> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, email, password_hash, role, organization_name, status, created_at
         FROM accounts WHERE id = ?1",
    )?;

    stmt.query_row(params![id], account_from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => GatewayError::NotFound("Account".to_string()),
            other => other.into(),
        })
}

// ============================================================================
// PROJECTS
// ============================================================================

pub fn insert_project(conn: &Connection, project: &Project) -> Result<()> {
    conn.execute(
        "INSERT INTO projects (
            id, name, description, subsidy, created_by,
            approval_government, approval_auditor, approval_bank, status,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            project.id,
            project.name,
            project.description,
            project.subsidy,
            project.created_by,
            project.approvals.government.as_str(),
            project.approvals.auditor.as_str(),
            project.approvals.bank.as_str(),
            project.status.as_str(),
            project.created_at.to_rfc3339(),
            project.updated_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

pub fn get_project(conn: &Connection, id: &str) -> Result<Project> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"
    ))?;

    stmt.query_row(params![id], project_from_row)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => GatewayError::NotFound("Project".to_string()),
            other => other.into(),
        })
}

/// Persist the outcome of one state-machine step. Callers run this inside the
/// same transaction that read the approval map, so the read-modify-write is
/// atomic per project.
pub fn update_project_approvals(
    conn: &Connection,
    id: &str,
    approvals: &ApprovalSet,
    status: ProjectStatus,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE projects
         SET approval_government = ?1,
             approval_auditor = ?2,
             approval_bank = ?3,
             status = ?4,
             updated_at = ?5
         WHERE id = ?6",
        params![
            approvals.government.as_str(),
            approvals.auditor.as_str(),
            approvals.bank.as_str(),
            status.as_str(),
            updated_at.to_rfc3339(),
            id,
        ],
    )?;

    if changed == 0 {
        return Err(GatewayError::NotFound("Project".to_string()));
    }

    Ok(())
}

/// All projects, newest first.
pub fn list_projects(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
    ))?;

    let projects = stmt
        .query_map([], project_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(projects)
}

pub fn list_projects_by_creator(
    conn: &Connection,
    creator_id: &str,
    limit: u32,
) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects
         WHERE created_by = ?1
         ORDER BY created_at DESC
         LIMIT ?2"
    ))?;

    let projects = stmt
        .query_map(params![creator_id, limit], project_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(projects)
}

/// Projects whose status is one of `statuses`, newest first.
pub fn list_projects_by_status(
    conn: &Connection,
    statuses: &[ProjectStatus],
    limit: u32,
) -> Result<Vec<Project>> {
    let placeholders = statuses
        .iter()
        .enumerate()
        .map(|(i, _)| format!("?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects
         WHERE status IN ({placeholders})
         ORDER BY created_at DESC
         LIMIT ?{}",
        statuses.len() + 1
    ))?;

    let mut values: Vec<Box<dyn rusqlite::ToSql>> = statuses
        .iter()
        .map(|s| Box::new(s.as_str()) as Box<dyn rusqlite::ToSql>)
        .collect();
    values.push(Box::new(limit));

    let projects = stmt
        .query_map(rusqlite::params_from_iter(values.iter()), project_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(projects)
}

/// Newest projects with the submitting startup's organization name (or full
/// name when no organization was registered) joined in for display.
pub fn list_projects_with_organization(
    conn: &Connection,
    limit: u32,
) -> Result<Vec<(Project, Option<String>)>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.description, p.subsidy, p.created_by,
                p.approval_government, p.approval_auditor, p.approval_bank, p.status,
                p.created_at, p.updated_at,
                COALESCE(a.organization_name, a.full_name)
         FROM projects p
         LEFT JOIN accounts a ON a.id = p.created_by
         ORDER BY p.created_at DESC
         LIMIT ?1",
    )?;

    let rows = stmt
        .query_map(params![limit], |row| {
            let project = project_from_row(row)?;
            let organization: Option<String> = row.get(11)?;
            Ok((project, organization))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

// ============================================================================
// COUNTS
// ============================================================================

pub fn count_projects_by_status(conn: &Connection, status: ProjectStatus) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM projects WHERE status = ?1",
        params![status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_projects_by_creator(conn: &Connection, creator_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM projects WHERE created_by = ?1",
        params![creator_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_projects_by_creator_and_status(
    conn: &Connection,
    creator_id: &str,
    status: ProjectStatus,
) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM projects WHERE created_by = ?1 AND status = ?2",
        params![creator_id, status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}
