//! Emergency hide/restore: the system-wide inspection workflow.
//!
//! Hide physically relocates every VIS_B record into a secondary vault
//! store, one copy-then-delete per record, so vaulted data is absent from
//! the collection the normal query paths read even if a filter elsewhere is
//! wrong. Reports reference external file blobs and are marked in place
//! instead of moved. Restore reverses both and empties the vault.
//!
//! The per-record moves are independent writes, not one transaction: a
//! failure partway leaves some records vaulted and the rest live, and a
//! retried hide safely skips what was already moved because those records no
//! longer exist in the live store.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use clinic_common as common;

use crate::audit::{self, AuditAction, AuditContext, AuditDetails, HideDetails, RestoreDetails};
use crate::errors::ContractError;
use crate::permissions::Actor;
use crate::{events, settings, ClinicalRecord, StaffRole, Visibility};

const VAULT: Symbol = symbol_short!("VAULT");
const VAULT_INDEX: Symbol = symbol_short!("VAULT_IDX");
const VIS_B_RECORDS: Symbol = symbol_short!("VISB_REC");
const VIS_B_REPORTS: Symbol = symbol_short!("VISB_RPT");
const MARKED_REPORTS: Symbol = symbol_short!("MARK_RPT");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Moved record ids retained in the summarizing audit entry.
const MAX_SUMMARY_IDS: u32 = 100;

/// A displaced record: every clinical field of the original plus the
/// provenance of the move.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultEntry {
    pub original_id: u64,
    pub patient_id: u64,
    pub visibility: Visibility,
    pub kind: crate::RecordKind,
    pub created_by: Address,
    pub assigned_doctor: Option<Address>,
    pub title: String,
    pub description: String,
    pub disease: String,
    pub notes: String,
    pub moved_at: u64,
    pub moved_by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HideSummary {
    pub inspection_mode: bool,
    pub record_count: u32,
    pub report_count: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RestoreSummary {
    pub inspection_mode: bool,
    pub record_count: u32,
}

fn vault_key(original_id: u64) -> (Symbol, u64) {
    (VAULT, original_id)
}

fn extend_ttl_u64_key(env: &Env, key: &(Symbol, u64)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn read_index(env: &Env, key: &Symbol) -> Vec<u64> {
    env.storage().persistent().get(key).unwrap_or(Vec::new(env))
}

fn write_index(env: &Env, key: &Symbol, ids: &Vec<u64>) {
    env.storage().persistent().set(key, ids);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn remove_id(env: &Env, key: &Symbol, id: u64) {
    let ids = read_index(env, key);
    let mut kept = Vec::new(env);
    for existing in ids.iter() {
        if existing != id {
            kept.push_back(existing);
        }
    }
    write_index(env, key, &kept);
}

// ── Live VIS_B indexes ───────────────────────────────────────────────────────

/// Record/report creation and reclassification keep these indexes current so
/// the hide scan never walks the whole store.

pub fn track_vis_b_record(env: &Env, record_id: u64) {
    let mut ids = read_index(env, &VIS_B_RECORDS);
    if !ids.contains(&record_id) {
        ids.push_back(record_id);
        write_index(env, &VIS_B_RECORDS, &ids);
    }
}

pub fn untrack_vis_b_record(env: &Env, record_id: u64) {
    remove_id(env, &VIS_B_RECORDS, record_id);
}

pub fn track_vis_b_report(env: &Env, report_id: u64) {
    let mut ids = read_index(env, &VIS_B_REPORTS);
    if !ids.contains(&report_id) {
        ids.push_back(report_id);
        write_index(env, &VIS_B_REPORTS, &ids);
    }
}

pub fn untrack_vis_b_report(env: &Env, report_id: u64) {
    remove_id(env, &VIS_B_REPORTS, report_id);
}

pub fn vis_b_record_ids(env: &Env) -> Vec<u64> {
    read_index(env, &VIS_B_RECORDS)
}

pub fn vault_entry(env: &Env, original_id: u64) -> Option<VaultEntry> {
    env.storage().persistent().get(&vault_key(original_id))
}

/// Ids sorted ascending. Record ids are issued by a monotonic counter, so
/// this is creation order and the move sequence is reproducible.
fn sorted_ascending(env: &Env, ids: &Vec<u64>) -> Vec<u64> {
    let mut sorted: Vec<u64> = Vec::new(env);
    for id in ids.iter() {
        match sorted.binary_search(&id) {
            Ok(_) => {}
            Err(pos) => sorted.insert(pos, id),
        }
    }
    sorted
}

/// Vaults every live VIS_B record in ascending creation order and tags every
/// VIS_B report. Idempotent: a second call while the mode is already on
/// returns the current state without touching storage.
pub fn emergency_hide(
    env: &Env,
    actor: &Actor,
    reason: String,
) -> Result<HideSummary, ContractError> {
    if actor.role != StaffRole::SuperAdmin {
        return Err(ContractError::Forbidden);
    }
    if !common::non_empty(&reason) {
        return Err(ContractError::ReasonRequired);
    }
    if settings::read_setting(env) {
        return Ok(HideSummary {
            inspection_mode: true,
            record_count: 0,
            report_count: 0,
        });
    }

    let ids = sorted_ascending(env, &vis_b_record_ids(env));
    let mut moved_ids: Vec<u64> = Vec::new(env);
    for id in ids.iter() {
        let record = match crate::load_record(env, id) {
            Ok(record) => record,
            // Already gone from the live store (a prior partial run); the
            // retry skips it.
            Err(_) => continue,
        };
        vault_record_and_unindex(env, &record, &actor.id);
        moved_ids.push_back(id);
    }
    write_index(env, &VIS_B_RECORDS, &Vec::new(env));

    // Marked ids are recorded in their own index so the restore can clear
    // every mark even if a report is reclassified out of the VIS_B index in
    // the meantime.
    let report_ids = read_index(env, &VIS_B_REPORTS);
    let mut marked: Vec<u64> = Vec::new(env);
    for report_id in report_ids.iter() {
        if let Some(mut report) = crate::load_report_opt(env, report_id) {
            report.vaulted = true;
            report.vaulted_at = env.ledger().timestamp();
            report.vaulted_by = Some(actor.id.clone());
            crate::put_report(env, &report);
            marked.push_back(report_id);
        }
    }
    write_index(env, &MARKED_REPORTS, &marked);
    let report_count = marked.len();

    settings::set_inspection_mode(env, true, &actor.id);

    let record_count = moved_ids.len();
    let mut summary_ids: Vec<u64> = Vec::new(env);
    for id in moved_ids.iter() {
        if summary_ids.len() >= MAX_SUMMARY_IDS {
            break;
        }
        summary_ids.push_back(id);
    }
    audit::log_audit(
        env,
        AuditAction::EmergencyHide,
        &actor.id,
        AuditContext {
            patient_id: None,
            record_id: None,
            import_session: None,
            details: AuditDetails::Hide(HideDetails {
                reason,
                record_count,
                report_count,
                moved_record_ids: summary_ids,
            }),
        },
    );
    events::publish_emergency_hide(env, actor.id.clone(), record_count, report_count);

    Ok(HideSummary {
        inspection_mode: true,
        record_count,
        report_count,
    })
}

/// Recreates a live record from every vault entry (new ids, same clinical
/// content), clears report marks, and switches the mode off. No-op when the
/// mode is already off.
pub fn emergency_restore(env: &Env, actor: &Actor) -> Result<RestoreSummary, ContractError> {
    if actor.role != StaffRole::SuperAdmin {
        return Err(ContractError::Forbidden);
    }
    if !settings::read_setting(env) {
        return Ok(RestoreSummary {
            inspection_mode: false,
            record_count: 0,
        });
    }

    let index = read_index(env, &VAULT_INDEX);
    let mut restored: u32 = 0;
    for original_id in index.iter() {
        let entry: VaultEntry = match env.storage().persistent().get(&vault_key(original_id)) {
            Some(entry) => entry,
            None => continue,
        };
        crate::insert_record(
            env,
            entry.patient_id,
            entry.created_by,
            entry.assigned_doctor,
            entry.visibility,
            entry.kind,
            entry.title,
            entry.description,
            entry.disease,
            entry.notes,
            None,
        );
        env.storage().persistent().remove(&vault_key(original_id));
        restored += 1;
    }
    write_index(env, &VAULT_INDEX, &Vec::new(env));

    // Walk the hide-time mark index, not the live VIS_B index: a marked
    // report may have been reclassified to VIS_A while the mode was on, and
    // its mark still has to come off.
    let report_ids = read_index(env, &MARKED_REPORTS);
    for report_id in report_ids.iter() {
        if let Some(mut report) = crate::load_report_opt(env, report_id) {
            if report.vaulted {
                report.vaulted = false;
                report.vaulted_at = 0;
                report.vaulted_by = None;
                crate::put_report(env, &report);
            }
        }
    }
    write_index(env, &MARKED_REPORTS, &Vec::new(env));

    settings::set_inspection_mode(env, false, &actor.id);

    audit::log_audit(
        env,
        AuditAction::EmergencyRestore,
        &actor.id,
        AuditContext {
            patient_id: None,
            record_id: None,
            import_session: None,
            details: AuditDetails::Restore(RestoreDetails {
                record_count: restored,
            }),
        },
    );
    events::publish_emergency_restore(env, actor.id.clone(), restored);

    Ok(RestoreSummary {
        inspection_mode: false,
        record_count: restored,
    })
}

/// Invariant scan: while the mode is on, no VIS_B record may exist in the
/// live store. Any found (created or reclassified after the hide) is vaulted
/// the same way the hide vaults them. Idempotent; returns the corrected
/// count.
pub fn repair_vault(env: &Env, actor: &Actor) -> Result<u32, ContractError> {
    if actor.role != StaffRole::SuperAdmin {
        return Err(ContractError::Forbidden);
    }
    if !settings::read_setting(env) {
        return Ok(0);
    }

    let ids = sorted_ascending(env, &vis_b_record_ids(env));
    let mut repaired: u32 = 0;
    for id in ids.iter() {
        if let Ok(record) = crate::load_record(env, id) {
            vault_record_and_unindex(env, &record, &actor.id);
            repaired += 1;
        }
    }
    write_index(env, &VIS_B_RECORDS, &Vec::new(env));

    if repaired > 0 {
        events::publish_vault_repaired(env, actor.id.clone(), repaired);
    }
    Ok(repaired)
}

fn vault_record_and_unindex(env: &Env, record: &ClinicalRecord, moved_by: &Address) {
    let entry = VaultEntry {
        original_id: record.id,
        patient_id: record.patient_id,
        visibility: record.visibility.clone(),
        kind: record.kind.clone(),
        created_by: record.created_by.clone(),
        assigned_doctor: record.assigned_doctor.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        disease: record.disease.clone(),
        notes: record.notes.clone(),
        moved_at: env.ledger().timestamp(),
        moved_by: moved_by.clone(),
    };

    let key = vault_key(record.id);
    env.storage().persistent().set(&key, &entry);
    extend_ttl_u64_key(env, &key);

    let mut index = read_index(env, &VAULT_INDEX);
    index.push_back(record.id);
    write_index(env, &VAULT_INDEX, &index);

    env.storage()
        .persistent()
        .remove(&crate::record_key(record.id));
    crate::remove_patient_record_id(env, record.patient_id, record.id);
}
