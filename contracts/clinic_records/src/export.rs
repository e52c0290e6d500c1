//! Bulk export and import.
//!
//! Export never widens access: the VIS_B portion is included only when the
//! actor holds the export grant for the patient AND inspection mode is off,
//! so during an inspection every export silently degrades to VIS_A content.
//! Import is per-row tolerant: a malformed row is counted and skipped, and
//! the surviving rows still land, grouped under one import session.

use soroban_sdk::{contracttype, Address, Env, String, Vec};

use clinic_common as common;

use crate::audit::{self, AuditAction, AuditContext, AuditDetails, ExportDetails, ImportDetails};
use crate::errors::ContractError;
use crate::permissions::{self, Actor};
use crate::{events, settings, RecordKind, StaffRole, Visibility};

/// Narrowing parameters for one export run. Empty `kinds` means every kind;
/// `from`/`to` bound the record creation timestamp, inclusive.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExportRequest {
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub kinds: Vec<RecordKind>,
    pub include_reports: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExportSummary {
    pub record_count: u32,
    pub report_count: u32,
    pub include_vis_b: bool,
    pub inspection_mode: bool,
}

/// One row of an import batch. Clinical payload fields mirror the record
/// shape; at least one must be non-empty for the row to be accepted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportItem {
    pub visibility: Visibility,
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    pub disease: String,
    pub notes: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportSummary {
    pub session: u64,
    pub total: u32,
    pub success: u32,
    pub failure: u32,
}

/// The persisted grouping of one import run.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportSession {
    pub id: u64,
    pub patient_id: u64,
    pub imported_by: Address,
    pub total: u32,
    pub success: u32,
    pub failure: u32,
    pub imported_at: u64,
}

fn in_range(timestamp: u64, from: &Option<u64>, to: &Option<u64>) -> bool {
    if let Some(from) = from {
        if timestamp < *from {
            return false;
        }
    }
    if let Some(to) = to {
        if timestamp > *to {
            return false;
        }
    }
    true
}

fn kind_selected(kinds: &Vec<RecordKind>, kind: &RecordKind) -> bool {
    kinds.is_empty() || kinds.contains(kind)
}

pub fn export_records(
    env: &Env,
    actor: &Actor,
    patient_id: u64,
    request: &ExportRequest,
) -> Result<ExportSummary, ContractError> {
    let patient = crate::load_patient(env, patient_id)?;
    if !permissions::can_view_patient(&patient, actor) {
        return Err(ContractError::Forbidden);
    }
    if !common::range_valid(request.from, request.to) {
        return Err(ContractError::InvalidInput);
    }

    let inspection = settings::inspection_mode(env);
    let include_vis_b = !inspection && permissions::can_export_vis_b(&patient, actor);

    let mut record_count: u32 = 0;
    for id in crate::patient_record_ids(env, patient_id).iter() {
        let record = match crate::load_record(env, id) {
            Ok(record) => record,
            Err(_) => continue,
        };
        if record.visibility == Visibility::VisB && !include_vis_b {
            continue;
        }
        if !kind_selected(&request.kinds, &record.kind) {
            continue;
        }
        if !in_range(record.created_at, &request.from, &request.to) {
            continue;
        }
        record_count += 1;
    }

    let mut report_count: u32 = 0;
    if request.include_reports {
        for id in crate::patient_report_ids(env, patient_id).iter() {
            let report = match crate::load_report_opt(env, id) {
                Some(report) => report,
                None => continue,
            };
            if report.vaulted {
                continue;
            }
            if report.visibility == Visibility::VisB && !include_vis_b {
                continue;
            }
            if !in_range(report.created_at, &request.from, &request.to) {
                continue;
            }
            report_count += 1;
        }
    }

    audit::log_audit(
        env,
        AuditAction::ExportRecords,
        &actor.id,
        AuditContext {
            patient_id: Some(patient_id),
            record_id: None,
            import_session: None,
            details: AuditDetails::Export(ExportDetails {
                record_count,
                report_count,
                include_vis_b,
                inspection_mode: inspection,
            }),
        },
    );
    events::publish_records_exported(env, patient_id, actor.id.clone(), record_count, include_vis_b);

    Ok(ExportSummary {
        record_count,
        report_count,
        include_vis_b,
        inspection_mode: inspection,
    })
}

pub fn import_records(
    env: &Env,
    actor: &Actor,
    patient_id: u64,
    items: &Vec<ImportItem>,
) -> Result<ImportSummary, ContractError> {
    if actor.role == StaffRole::Receptionist {
        return Err(ContractError::Forbidden);
    }
    let patient = crate::load_patient(env, patient_id)?;
    if !permissions::can_view_patient(&patient, actor) {
        return Err(ContractError::Forbidden);
    }
    if items.is_empty() {
        return Err(ContractError::InvalidInput);
    }

    let session = crate::next_import_session_id(env);
    let mut success: u32 = 0;
    let mut failure: u32 = 0;
    for item in items.iter() {
        if !common::payload_present(&[&item.title, &item.description, &item.disease, &item.notes]) {
            failure += 1;
            continue;
        }
        let assigned = match actor.role {
            StaffRole::Doctor => Some(actor.id.clone()),
            _ => patient.primary_doctor.clone(),
        };
        crate::insert_record(
            env,
            patient_id,
            actor.id.clone(),
            assigned,
            item.visibility.clone(),
            item.kind.clone(),
            item.title.clone(),
            item.description.clone(),
            item.disease.clone(),
            item.notes.clone(),
            Some(session),
        );
        success += 1;
    }

    let total = items.len();
    let record = ImportSession {
        id: session,
        patient_id,
        imported_by: actor.id.clone(),
        total,
        success,
        failure,
        imported_at: env.ledger().timestamp(),
    };
    crate::put_import_session(env, &record);

    audit::log_audit(
        env,
        AuditAction::ImportRecords,
        &actor.id,
        AuditContext {
            patient_id: Some(patient_id),
            record_id: None,
            import_session: Some(session),
            details: AuditDetails::Import(ImportDetails {
                total,
                success,
                failure,
            }),
        },
    );
    events::publish_records_imported(env, patient_id, session, success, failure);

    Ok(ImportSummary {
        session,
        total,
        success,
        failure,
    })
}
