// ⚙️  Approval Workflow - the pure state machine
//
// Everything here is a total function over the approval map: no store handle,
// no clock, no I/O. The gateway feeds it the current map and persists whatever
// comes back, so replaying the same decisions always lands on the same status.

use crate::entities::{ApprovalSet, ApproverRole, Decision, ProjectStatus};
use crate::error::{GatewayError, Result};

// ============================================================================
// STATUS DERIVATION
// ============================================================================

/// Compute a project's status from its approval map.
///
/// Precedence: all three approver roles approved wins (Funded), then
/// government + auditor (Approved), then everything else (Pending).
///
/// A single rejection is recorded in the map but does not short-circuit to a
/// terminal Rejected status; the workflow simply stays where the remaining
/// approvals put it.
pub fn derive_status(approvals: &ApprovalSet) -> ProjectStatus {
    let government = approvals.government == Decision::Approved;
    let auditor = approvals.auditor == Decision::Approved;
    let bank = approvals.bank == Decision::Approved;

    if government && auditor && bank {
        ProjectStatus::Funded
    } else if government && auditor {
        ProjectStatus::Approved
    } else {
        ProjectStatus::Pending
    }
}

// ============================================================================
// TRANSITION
// ============================================================================

/// Record one role's decision and return the new map plus the status it
/// derives to.
///
/// Fails with `InvalidTransition` once the aggregate has reached Funded:
/// a fully funded project accepts no further decisions. Re-recording the same
/// decision before that point is an idempotent no-op.
pub fn apply_decision(
    approvals: ApprovalSet,
    role: ApproverRole,
    decision: Decision,
) -> Result<(ApprovalSet, ProjectStatus)> {
    if decision == Decision::Pending {
        return Err(GatewayError::Validation(
            "Decision must be 'approved' or 'rejected'.".to_string(),
        ));
    }

    if derive_status(&approvals) == ProjectStatus::Funded {
        return Err(GatewayError::InvalidTransition(
            "Project is already funded; no further decisions can be recorded.".to_string(),
        ));
    }

    let next = approvals.with(role, decision);
    let status = derive_status(&next);
    Ok((next, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_pending() -> ApprovalSet {
        ApprovalSet::default()
    }

    #[test]
    fn test_derivation_precedence() {
        // Nothing approved
        assert_eq!(derive_status(&all_pending()), ProjectStatus::Pending);

        // Government alone is not enough
        let gov = all_pending().with(ApproverRole::Government, Decision::Approved);
        assert_eq!(derive_status(&gov), ProjectStatus::Pending);

        // Government + auditor
        let gov_aud = gov.with(ApproverRole::Auditor, Decision::Approved);
        assert_eq!(derive_status(&gov_aud), ProjectStatus::Approved);

        // All three
        let funded = gov_aud.with(ApproverRole::Bank, Decision::Approved);
        assert_eq!(derive_status(&funded), ProjectStatus::Funded);

        // Auditor + bank without government stays Pending
        let no_gov = all_pending()
            .with(ApproverRole::Auditor, Decision::Approved)
            .with(ApproverRole::Bank, Decision::Approved);
        assert_eq!(derive_status(&no_gov), ProjectStatus::Pending);
    }

    #[test]
    fn test_full_approval_scenario() {
        // Government approves: still Pending (auditor outstanding)
        let (a, status) =
            apply_decision(all_pending(), ApproverRole::Government, Decision::Approved).unwrap();
        assert_eq!(status, ProjectStatus::Pending);

        // Auditor approves: Approved
        let (a, status) = apply_decision(a, ApproverRole::Auditor, Decision::Approved).unwrap();
        assert_eq!(status, ProjectStatus::Approved);

        // Bank approves: Funded
        let (a, status) = apply_decision(a, ApproverRole::Bank, Decision::Approved).unwrap();
        assert_eq!(status, ProjectStatus::Funded);

        // Funded is terminal
        let err = apply_decision(a, ApproverRole::Government, Decision::Approved).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidTransition(_)));
    }

    #[test]
    fn test_reapproval_is_idempotent() {
        let (first, status1) =
            apply_decision(all_pending(), ApproverRole::Government, Decision::Approved).unwrap();
        let (second, status2) =
            apply_decision(first, ApproverRole::Government, Decision::Approved).unwrap();

        assert_eq!(first, second);
        assert_eq!(status1, status2);
    }

    #[test]
    fn test_rejection_is_recorded_but_not_terminal() {
        let (a, status) =
            apply_decision(all_pending(), ApproverRole::Bank, Decision::Rejected).unwrap();
        assert_eq!(a.bank, Decision::Rejected);
        assert_eq!(status, ProjectStatus::Pending);

        // The other two can still move the project to Approved
        let (a, _) = apply_decision(a, ApproverRole::Government, Decision::Approved).unwrap();
        let (a, status) = apply_decision(a, ApproverRole::Auditor, Decision::Approved).unwrap();
        assert_eq!(status, ProjectStatus::Approved);
        assert_eq!(a.bank, Decision::Rejected);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let script = [
            (ApproverRole::Auditor, Decision::Approved),
            (ApproverRole::Government, Decision::Approved),
            (ApproverRole::Bank, Decision::Rejected),
            (ApproverRole::Bank, Decision::Approved),
        ];

        let run = || {
            let mut approvals = all_pending();
            let mut status = ProjectStatus::Pending;
            for (role, decision) in script {
                let (a, s) = apply_decision(approvals, role, decision).unwrap();
                approvals = a;
                status = s;
            }
            (approvals, status)
        };

        assert_eq!(run(), run());
        assert_eq!(run().1, ProjectStatus::Funded);
    }

    #[test]
    fn test_pending_is_not_a_recordable_decision() {
        let err =
            apply_decision(all_pending(), ApproverRole::Government, Decision::Pending).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }
}
