//! Role-scoped listings.
//!
//! Each listing applies its scoping twice: once at the query level (which
//! ids are even walked) and once per item through the permission predicates,
//! so a stale index can widen a page but never widen what a role sees.

use soroban_sdk::{Env, Vec};

use clinic_common::Page;

use crate::audit::{self, AuditAction, AuditEntry};
use crate::errors::ContractError;
use crate::permissions::{self, Actor};
use crate::{settings, ClinicalRecord, Patient, RecordKind, Report, StaffRole, Visibility};

/// Optional record-list narrowing. `None` fields match everything.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordFilter {
    pub visibility: Option<Visibility>,
    pub kind: Option<RecordKind>,
}

impl RecordFilter {
    fn matches(&self, record: &ClinicalRecord) -> bool {
        if let Some(visibility) = &self.visibility {
            if record.visibility != *visibility {
                return false;
            }
        }
        if let Some(kind) = &self.kind {
            if record.kind != *kind {
                return false;
            }
        }
        true
    }
}

/// Patients the actor may see, in registration order. A doctor's page walks
/// their own patient index rather than the global one, so an unassigned
/// patient (viewable on direct lookup) does not appear in their listing.
pub fn list_patients(env: &Env, actor: &Actor, page: Page) -> Vec<Patient> {
    let ids = match actor.role {
        StaffRole::Doctor => crate::doctor_patient_ids(env, &actor.id),
        _ => crate::patient_ids(env),
    };
    let mut out: Vec<Patient> = Vec::new(env);
    let mut skipped: u32 = 0;
    for id in ids.iter() {
        let patient = match crate::load_patient(env, id) {
            Ok(patient) => patient,
            Err(_) => continue,
        };
        if !permissions::can_view_patient(&patient, actor) {
            continue;
        }
        if skipped < page.skip() {
            skipped += 1;
            continue;
        }
        out.push_back(patient);
        if out.len() >= page.limit {
            break;
        }
    }
    out
}

/// One patient's records, newest first. The per-record predicate runs after
/// the filter, so a receptionist requesting a VIS_B page gets an empty page,
/// not an error.
pub fn list_records(
    env: &Env,
    actor: &Actor,
    patient_id: u64,
    filter: &RecordFilter,
    page: Page,
) -> Result<Vec<ClinicalRecord>, ContractError> {
    let patient = crate::load_patient(env, patient_id)?;
    if !permissions::can_view_patient(&patient, actor) {
        return Err(ContractError::Forbidden);
    }

    let ids = crate::patient_record_ids(env, patient_id);
    let mut out: Vec<ClinicalRecord> = Vec::new(env);
    let mut skipped: u32 = 0;
    let mut pos = ids.len();
    while pos > 0 {
        pos -= 1;
        let id = ids.get_unchecked(pos);
        let record = match crate::load_record(env, id) {
            Ok(record) => record,
            Err(_) => continue,
        };
        if !filter.matches(&record) {
            continue;
        }
        if !permissions::can_view_record(&record, &patient, actor) {
            continue;
        }
        if skipped < page.skip() {
            skipped += 1;
            continue;
        }
        out.push_back(record);
        if out.len() >= page.limit {
            break;
        }
    }
    Ok(out)
}

/// One patient's reports, newest first. Vaulted reports (and any VIS_B
/// report while inspection mode is on) are excluded for every role.
pub fn list_reports(
    env: &Env,
    actor: &Actor,
    patient_id: u64,
    page: Page,
) -> Result<Vec<Report>, ContractError> {
    let patient = crate::load_patient(env, patient_id)?;
    if !permissions::can_view_patient(&patient, actor) {
        return Err(ContractError::Forbidden);
    }

    let inspection = settings::inspection_mode(env);
    let ids = crate::patient_report_ids(env, patient_id);
    let mut out: Vec<Report> = Vec::new(env);
    let mut skipped: u32 = 0;
    let mut pos = ids.len();
    while pos > 0 {
        pos -= 1;
        let id = ids.get_unchecked(pos);
        let report = match crate::load_report_opt(env, id) {
            Some(report) => report,
            None => continue,
        };
        if report.vaulted {
            continue;
        }
        if inspection && report.visibility == Visibility::VisB {
            continue;
        }
        if !permissions::can_view_report(&report, &patient, actor) {
            continue;
        }
        if skipped < page.skip() {
            skipped += 1;
            continue;
        }
        out.push_back(report);
        if out.len() >= page.limit {
            break;
        }
    }
    Ok(out)
}

/// Optional audit-trail narrowing on top of the role scoping.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub patient_id: Option<u64>,
}

impl AuditFilter {
    fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(action) = &self.action {
            if entry.action != *action {
                return false;
            }
        }
        if let Some(patient_id) = self.patient_id {
            if entry.patient_id != Some(patient_id) {
                return false;
            }
        }
        true
    }
}

/// The audit trail slice an actor may read, newest first.
///
/// Super-admin: everything. Doctor: their own entries plus those of the
/// receptionists in their clinic. Receptionist: their own entries only.
/// The filter narrows within the scoped slice, before pagination.
pub fn list_audit(env: &Env, actor: &Actor, filter: &AuditFilter, page: Page) -> Vec<AuditEntry> {
    match actor.role {
        StaffRole::SuperAdmin => {
            let mut out: Vec<AuditEntry> = Vec::new(env);
            let mut seq = audit::count(env);
            let mut skipped: u32 = 0;
            while seq > 0 {
                let entry = match audit::entry(env, seq) {
                    Some(entry) => entry,
                    None => {
                        seq -= 1;
                        continue;
                    }
                };
                seq -= 1;
                if !filter.matches(&entry) {
                    continue;
                }
                if skipped < page.skip() {
                    skipped += 1;
                    continue;
                }
                out.push_back(entry);
                if out.len() >= page.limit {
                    break;
                }
            }
            out
        }
        StaffRole::Doctor => {
            let mut indexes: Vec<Vec<u64>> = Vec::new(env);
            indexes.push_back(audit::actor_index(env, &actor.id));
            if let Some(clinic_id) = actor.clinic_id {
                for receptionist in crate::clinic_receptionists(env, clinic_id).iter() {
                    if receptionist != actor.id {
                        indexes.push_back(audit::actor_index(env, &receptionist));
                    }
                }
            }
            merge_descending(env, &indexes, filter, page)
        }
        StaffRole::Receptionist => {
            let mut indexes: Vec<Vec<u64>> = Vec::new(env);
            indexes.push_back(audit::actor_index(env, &actor.id));
            merge_descending(env, &indexes, filter, page)
        }
    }
}

/// K-way merge over ascending per-actor sequence indexes, yielding entries
/// in globally descending sequence order. Indexes are disjoint (one per
/// actor), so no deduplication is needed.
fn merge_descending(
    env: &Env,
    indexes: &Vec<Vec<u64>>,
    filter: &AuditFilter,
    page: Page,
) -> Vec<AuditEntry> {
    let mut remaining: Vec<u32> = Vec::new(env);
    for index in indexes.iter() {
        remaining.push_back(index.len());
    }

    let mut out: Vec<AuditEntry> = Vec::new(env);
    let mut skipped: u32 = 0;
    loop {
        let mut best: Option<(u32, u64)> = None;
        for i in 0..indexes.len() {
            let left = remaining.get_unchecked(i);
            if left == 0 {
                continue;
            }
            let seq = indexes.get_unchecked(i).get_unchecked(left - 1);
            let better = match best {
                Some((_, best_seq)) => seq > best_seq,
                None => true,
            };
            if better {
                best = Some((i, seq));
            }
        }
        let (i, seq) = match best {
            Some(found) => found,
            None => break,
        };
        remaining.set(i, remaining.get_unchecked(i) - 1);

        let entry = match audit::entry(env, seq) {
            Some(entry) => entry,
            None => continue,
        };
        if !filter.matches(&entry) {
            continue;
        }
        if skipped < page.skip() {
            skipped += 1;
            continue;
        }
        out.push_back(entry);
        if out.len() >= page.limit {
            break;
        }
    }
    out
}
