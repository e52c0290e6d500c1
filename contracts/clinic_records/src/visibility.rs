//! Record visibility transitions.
//!
//! Every move between tiers is an audited, reason-required operation; the
//! checks run in authorization, then validation order, and nothing is
//! written or logged when either fails. A same-tier move is not rejected;
//! it produces a normal trail entry, which is how a deliberate re-attest of
//! the current tier is recorded.

use soroban_sdk::{Env, String};

use clinic_common as common;

use crate::audit::{self, AuditAction, AuditContext, AuditDetails, VisibilityChangeDetails};
use crate::errors::ContractError;
use crate::permissions::{self, Actor};
use crate::{events, vault, ClinicalRecord, Visibility};

pub fn move_visibility(
    env: &Env,
    actor: &Actor,
    record_id: u64,
    to: Visibility,
    reason: String,
) -> Result<ClinicalRecord, ContractError> {
    let mut record = crate::load_record(env, record_id)?;
    let patient = crate::load_patient(env, record.patient_id)?;

    if !permissions::can_change_visibility(&patient, actor) {
        return Err(ContractError::Forbidden);
    }
    if !common::non_empty(&reason) {
        return Err(ContractError::ReasonRequired);
    }

    let previous = record.visibility.clone();
    record.visibility = to.clone();
    crate::put_record(env, &record);

    match to {
        Visibility::VisB => vault::track_vis_b_record(env, record_id),
        Visibility::VisA => vault::untrack_vis_b_record(env, record_id),
    }

    audit::log_audit(
        env,
        AuditAction::MoveVisibility,
        &actor.id,
        AuditContext {
            patient_id: Some(record.patient_id),
            record_id: Some(record_id),
            import_session: None,
            details: AuditDetails::Visibility(VisibilityChangeDetails {
                previous: previous.clone(),
                new: to.clone(),
                reason,
            }),
        },
    );
    events::publish_visibility_moved(env, record_id, record.patient_id, previous, to);

    Ok(record)
}

/// Reports carry the same two tiers. The permission rule is identical; the
/// separate entry point exists because reports live in their own store.
pub fn move_report_visibility(
    env: &Env,
    actor: &Actor,
    report_id: u64,
    to: Visibility,
    reason: String,
) -> Result<(), ContractError> {
    let mut report = crate::load_report(env, report_id)?;
    let patient = crate::load_patient(env, report.patient_id)?;

    if !permissions::can_change_visibility(&patient, actor) {
        return Err(ContractError::Forbidden);
    }
    if !common::non_empty(&reason) {
        return Err(ContractError::ReasonRequired);
    }

    let previous = report.visibility.clone();
    report.visibility = to.clone();
    crate::put_report(env, &report);

    match to {
        Visibility::VisB => vault::track_vis_b_report(env, report_id),
        Visibility::VisA => vault::untrack_vis_b_report(env, report_id),
    }

    audit::log_audit(
        env,
        AuditAction::MoveVisibility,
        &actor.id,
        AuditContext {
            patient_id: Some(report.patient_id),
            record_id: None,
            import_session: None,
            details: AuditDetails::Visibility(VisibilityChangeDetails {
                previous,
                new: to,
                reason,
            }),
        },
    );

    Ok(())
}
