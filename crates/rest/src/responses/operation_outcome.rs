//! OperationOutcome response building.

use carebridge_fhir::{
    CodeableConcept, Coding, IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue,
};

/// Code system of the server's outcome message codes.
pub const OUTCOME_MESSAGE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/operation-outcome";

/// Message code reported after a delete.
pub const MSG_DELETED: &str = "MSG_DELETED";

/// Builds a single-issue outcome with a plain-text detail.
pub fn create_operation_outcome(
    severity: IssueSeverity,
    code: IssueType,
    details: &str,
) -> OperationOutcome {
    OperationOutcome::new(vec![OperationOutcomeIssue {
        severity,
        code,
        details: Some(CodeableConcept {
            coding: Vec::new(),
            text: Some(details.to_string()),
        }),
        diagnostics: None,
    }])
}

/// The outcome returned by every delete, whether or not anything was voided.
pub fn deleted_outcome() -> OperationOutcome {
    let mut outcome = create_operation_outcome(
        IssueSeverity::Information,
        IssueType::Informational,
        "This resource has been deleted",
    );
    if let Some(details) = outcome.issue[0].details.as_mut() {
        details.coding = vec![Coding::new(Some(OUTCOME_MESSAGE_SYSTEM), MSG_DELETED)];
    }
    outcome
}
