//! Clinic record management with tiered visibility and an emergency vault.
//!
//! Clinical records carry one of two visibility tiers. VIS_A is the ordinary
//! tier every staff member can read; VIS_B is restricted to the treating
//! doctors and the super-admin, and is the tier the emergency hide workflow
//! physically relocates out of the live store. Every sensitive operation
//! leaves an append-only audit entry.
//!
//! Access control is role-based with three roles (receptionist, doctor,
//! super-admin) resolved from an on-chain staff registry, so the permission
//! predicates in [`permissions`] are the single source of truth for who may
//! see or change what.

#![no_std]

mod audit;
mod errors;
mod events;
mod export;
mod permissions;
mod query;
mod settings;
mod vault;
mod visibility;

#[cfg(test)]
mod test_audit;
#[cfg(test)]
mod test_export;
#[cfg(test)]
mod test_visibility;

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, Env, String, Symbol, Vec,
};

use clinic_common::{self as common, Page, MAX_AUDIT_PAGE_SIZE, MAX_PAGE_SIZE};

pub use audit::{AuditAction, AuditDetails, AuditEntry};
pub use errors::{ContractError, ErrorLogEntry};
pub use export::{ExportRequest, ExportSummary, ImportItem, ImportSession, ImportSummary};
pub use permissions::{
    can_change_visibility, can_export_vis_b, can_view_patient, can_view_record, can_view_report,
    Actor,
};
pub use settings::InspectionSetting;
pub use vault::{HideSummary, RestoreSummary, VaultEntry};

use audit::AuditContext;

const ADMIN: Symbol = symbol_short!("ADMIN");
const STAFF: Symbol = symbol_short!("STAFF");
const CLINIC_RECEPTIONISTS: Symbol = symbol_short!("CLN_RCP");
const PATIENT: Symbol = symbol_short!("PATIENT");
const PATIENT_INDEX: Symbol = symbol_short!("PAT_IDX");
const PATIENT_COUNTER: Symbol = symbol_short!("PAT_CTR");
const DOCTOR_PATIENTS: Symbol = symbol_short!("DOC_PAT");
const RECORD: Symbol = symbol_short!("RECORD");
const RECORD_COUNTER: Symbol = symbol_short!("REC_CTR");
const PATIENT_RECORDS: Symbol = symbol_short!("PAT_REC");
const REPORT: Symbol = symbol_short!("REPORT");
const REPORT_COUNTER: Symbol = symbol_short!("RPT_CTR");
const PATIENT_REPORTS: Symbol = symbol_short!("PAT_RPT");
const IMPORT_SESSION: Symbol = symbol_short!("IMP_SES");
const IMPORT_COUNTER: Symbol = symbol_short!("IMP_CTR");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Types ────────────────────────────────────────────────────────────────────

/// The two visibility tiers a record or report can carry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Visibility {
    VisA,
    VisB,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StaffRole {
    Receptionist,
    Doctor,
    SuperAdmin,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Gender {
    Female,
    Male,
    Other,
    Undisclosed,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordKind {
    Diagnosis,
    Medication,
    Report,
    Note,
    Lab,
    Attachment,
}

/// A registered staff member. The address doubles as the login identity;
/// deactivated members keep their entry but fail actor resolution.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Staff {
    pub address: Address,
    pub name: String,
    pub role: StaffRole,
    pub clinic_id: Option<u64>,
    pub is_active: bool,
    pub registered_at: u64,
}

/// A registered patient. `visibility` is the patient-level tier; record
/// visibility is independent of it, so a VIS_A patient can carry VIS_B
/// records.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Patient {
    pub id: u64,
    pub name: String,
    pub gender: Gender,
    pub birth_year: Option<u32>,
    pub contact: String,
    pub visibility: Visibility,
    pub primary_doctor: Option<Address>,
    pub created_by: Address,
    pub created_at: u64,
}

/// A clinical record. `assigned_doctor` is fixed at creation time and is one
/// of the identities the VIS_B view rule accepts.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClinicalRecord {
    pub id: u64,
    pub patient_id: u64,
    pub visibility: Visibility,
    pub kind: RecordKind,
    pub created_by: Address,
    pub assigned_doctor: Option<Address>,
    pub title: String,
    pub description: String,
    pub disease: String,
    pub notes: String,
    pub import_session: Option<u64>,
    pub created_at: u64,
}

/// Reports reference off-chain file blobs, so the emergency hide marks them
/// in place (`vaulted`/`vaulted_at`/`vaulted_by`) rather than relocating
/// them the way records are. `vaulted_at` is zero while the mark is clear.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    pub id: u64,
    pub patient_id: u64,
    pub visibility: Visibility,
    pub title: String,
    pub file_hash: String,
    pub created_by: Address,
    pub vaulted: bool,
    pub vaulted_at: u64,
    pub vaulted_by: Option<Address>,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatientInput {
    pub name: String,
    pub gender: Gender,
    pub birth_year: Option<u32>,
    pub contact: String,
    pub visibility: Visibility,
    pub primary_doctor: Option<Address>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordInput {
    pub visibility: Visibility,
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    pub disease: String,
    pub notes: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportInput {
    pub visibility: Visibility,
    pub title: String,
    pub file_hash: String,
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn extend_ttl_address_key(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn extend_ttl_u64_key(env: &Env, key: &(Symbol, u64)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn staff_key(member: &Address) -> (Symbol, Address) {
    (STAFF, member.clone())
}

fn patient_key(patient_id: u64) -> (Symbol, u64) {
    (PATIENT, patient_id)
}

pub(crate) fn record_key(record_id: u64) -> (Symbol, u64) {
    (RECORD, record_id)
}

fn report_key(report_id: u64) -> (Symbol, u64) {
    (REPORT, report_id)
}

fn next_id(env: &Env, counter: &Symbol) -> u64 {
    let id: u64 = env.storage().instance().get(counter).unwrap_or(0u64) + 1;
    env.storage().instance().set(counter, &id);
    id
}

pub(crate) fn is_registered_staff(env: &Env, member: &Address) -> bool {
    env.storage().persistent().has(&staff_key(member))
}

fn load_staff(env: &Env, member: &Address) -> Result<Staff, ContractError> {
    env.storage()
        .persistent()
        .get(&staff_key(member))
        .ok_or(ContractError::StaffNotFound)
}

pub(crate) fn load_patient(env: &Env, patient_id: u64) -> Result<Patient, ContractError> {
    env.storage()
        .persistent()
        .get(&patient_key(patient_id))
        .ok_or(ContractError::PatientNotFound)
}

pub(crate) fn load_record(env: &Env, record_id: u64) -> Result<ClinicalRecord, ContractError> {
    env.storage()
        .persistent()
        .get(&record_key(record_id))
        .ok_or(ContractError::RecordNotFound)
}

pub(crate) fn load_report(env: &Env, report_id: u64) -> Result<Report, ContractError> {
    load_report_opt(env, report_id).ok_or(ContractError::ReportNotFound)
}

pub(crate) fn load_report_opt(env: &Env, report_id: u64) -> Option<Report> {
    env.storage().persistent().get(&report_key(report_id))
}

pub(crate) fn put_record(env: &Env, record: &ClinicalRecord) {
    let key = record_key(record.id);
    env.storage().persistent().set(&key, record);
    extend_ttl_u64_key(env, &key);
}

pub(crate) fn put_report(env: &Env, report: &Report) {
    let key = report_key(report.id);
    env.storage().persistent().set(&key, report);
    extend_ttl_u64_key(env, &key);
}

fn put_patient(env: &Env, patient: &Patient) {
    let key = patient_key(patient.id);
    env.storage().persistent().set(&key, patient);
    extend_ttl_u64_key(env, &key);
}

pub(crate) fn patient_ids(env: &Env) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&PATIENT_INDEX)
        .unwrap_or(Vec::new(env))
}

fn append_patient_id(env: &Env, patient_id: u64) {
    let mut ids = patient_ids(env);
    ids.push_back(patient_id);
    env.storage().persistent().set(&PATIENT_INDEX, &ids);
    env.storage()
        .persistent()
        .extend_ttl(&PATIENT_INDEX, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Per-doctor patient index, the query-level filter behind a doctor's
/// patient listing. Maintained on registration and reassignment.
pub(crate) fn doctor_patient_ids(env: &Env, doctor: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&(DOCTOR_PATIENTS, doctor.clone()))
        .unwrap_or(Vec::new(env))
}

fn append_doctor_patient_id(env: &Env, doctor: &Address, patient_id: u64) {
    let key = (DOCTOR_PATIENTS, doctor.clone());
    let mut ids = doctor_patient_ids(env, doctor);
    if !ids.contains(&patient_id) {
        ids.push_back(patient_id);
        env.storage().persistent().set(&key, &ids);
        extend_ttl_address_key(env, &key);
    }
}

fn remove_doctor_patient_id(env: &Env, doctor: &Address, patient_id: u64) {
    let key = (DOCTOR_PATIENTS, doctor.clone());
    let ids = doctor_patient_ids(env, doctor);
    let mut kept = Vec::new(env);
    for id in ids.iter() {
        if id != patient_id {
            kept.push_back(id);
        }
    }
    env.storage().persistent().set(&key, &kept);
    extend_ttl_address_key(env, &key);
}

pub(crate) fn patient_record_ids(env: &Env, patient_id: u64) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&(PATIENT_RECORDS, patient_id))
        .unwrap_or(Vec::new(env))
}

fn write_patient_record_ids(env: &Env, patient_id: u64, ids: &Vec<u64>) {
    let key = (PATIENT_RECORDS, patient_id);
    env.storage().persistent().set(&key, ids);
    extend_ttl_u64_key(env, &key);
}

pub(crate) fn remove_patient_record_id(env: &Env, patient_id: u64, record_id: u64) {
    let ids = patient_record_ids(env, patient_id);
    let mut kept = Vec::new(env);
    for id in ids.iter() {
        if id != record_id {
            kept.push_back(id);
        }
    }
    write_patient_record_ids(env, patient_id, &kept);
}

pub(crate) fn patient_report_ids(env: &Env, patient_id: u64) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&(PATIENT_REPORTS, patient_id))
        .unwrap_or(Vec::new(env))
}

pub(crate) fn clinic_receptionists(env: &Env, clinic_id: u64) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&(CLINIC_RECEPTIONISTS, clinic_id))
        .unwrap_or(Vec::new(env))
}

pub(crate) fn next_import_session_id(env: &Env) -> u64 {
    next_id(env, &IMPORT_COUNTER)
}

pub(crate) fn put_import_session(env: &Env, session: &ImportSession) {
    let key = (IMPORT_SESSION, session.id);
    env.storage().persistent().set(&key, session);
    extend_ttl_u64_key(env, &key);
}

/// Creates and stores a record with a fresh id, maintains the per-patient
/// and VIS_B indexes, and publishes the creation event. Shared by direct
/// creation, import, and the restore path.
#[allow(clippy::too_many_arguments)]
pub(crate) fn insert_record(
    env: &Env,
    patient_id: u64,
    created_by: Address,
    assigned_doctor: Option<Address>,
    visibility: Visibility,
    kind: RecordKind,
    title: String,
    description: String,
    disease: String,
    notes: String,
    import_session: Option<u64>,
) -> ClinicalRecord {
    let id = next_id(env, &RECORD_COUNTER);
    let record = ClinicalRecord {
        id,
        patient_id,
        visibility: visibility.clone(),
        kind: kind.clone(),
        created_by,
        assigned_doctor,
        title,
        description,
        disease,
        notes,
        import_session,
        created_at: env.ledger().timestamp(),
    };
    put_record(env, &record);

    let mut ids = patient_record_ids(env, patient_id);
    ids.push_back(id);
    write_patient_record_ids(env, patient_id, &ids);

    if record.visibility == Visibility::VisB {
        vault::track_vis_b_record(env, id);
    }

    events::publish_record_added(env, id, patient_id, visibility, kind);
    record
}

fn require_admin_role(actor: &Actor) -> Result<(), ContractError> {
    if actor.role != StaffRole::SuperAdmin {
        return Err(ContractError::Forbidden);
    }
    Ok(())
}

fn authenticate(env: &Env, caller: &Address, endpoint: Symbol) -> Result<Actor, ContractError> {
    caller.require_auth();
    if !env.storage().instance().has(&ADMIN) {
        return Err(ContractError::NotInitialized);
    }
    let actor = permissions::resolve_actor(env, caller)?;
    audit::log_api_access(env, &actor.id, actor.role.clone(), endpoint);
    Ok(actor)
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct ClinicRecordsContract;

#[contractimpl]
impl ClinicRecordsContract {
    /// Initializes the contract and registers the admin as the super-admin
    /// staff member. Callable once.
    pub fn initialize(env: Env, admin: Address, name: String) -> Result<(), ContractError> {
        admin.require_auth();
        if env.storage().instance().has(&ADMIN) {
            return Err(ContractError::AlreadyInitialized);
        }
        env.storage().instance().set(&ADMIN, &admin);

        let staff = Staff {
            address: admin.clone(),
            name,
            role: StaffRole::SuperAdmin,
            clinic_id: None,
            is_active: true,
            registered_at: env.ledger().timestamp(),
        };
        let key = staff_key(&admin);
        env.storage().persistent().set(&key, &staff);
        extend_ttl_address_key(&env, &key);
        extend_ttl_instance(&env);

        events::publish_initialized(&env, admin);
        Ok(())
    }

    pub fn version() -> u32 {
        3
    }

    // ── Staff ────────────────────────────────────────────────────────────────

    /// Registers a staff member. Super-admin only. Receptionists with a
    /// clinic are added to that clinic's roster, which the doctor-scoped
    /// audit listing reads.
    pub fn register_staff(
        env: Env,
        caller: Address,
        member: Address,
        name: String,
        role: StaffRole,
        clinic_id: Option<u64>,
    ) -> Result<Staff, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("STF_REG"))?;
        require_admin_role(&actor)?;
        if !common::non_empty(&name) {
            return Err(ContractError::InvalidInput);
        }
        if is_registered_staff(&env, &member) {
            return Err(ContractError::StaffAlreadyRegistered);
        }

        let staff = Staff {
            address: member.clone(),
            name: name.clone(),
            role: role.clone(),
            clinic_id,
            is_active: true,
            registered_at: env.ledger().timestamp(),
        };
        let key = staff_key(&member);
        env.storage().persistent().set(&key, &staff);
        extend_ttl_address_key(&env, &key);

        if staff.role == StaffRole::Receptionist {
            if let Some(clinic_id) = staff.clinic_id {
                let roster_key = (CLINIC_RECEPTIONISTS, clinic_id);
                let mut roster = clinic_receptionists(&env, clinic_id);
                if !roster.contains(&member) {
                    roster.push_back(member.clone());
                    env.storage().persistent().set(&roster_key, &roster);
                    extend_ttl_u64_key(&env, &roster_key);
                }
            }
        }
        extend_ttl_instance(&env);

        events::publish_staff_registered(&env, member, role, name);
        Ok(staff)
    }

    /// Activates or deactivates a staff member. Super-admin only.
    pub fn set_staff_active(
        env: Env,
        caller: Address,
        member: Address,
        active: bool,
    ) -> Result<(), ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("STF_ACT"))?;
        require_admin_role(&actor)?;

        let mut staff = load_staff(&env, &member)?;
        staff.is_active = active;
        let key = staff_key(&member);
        env.storage().persistent().set(&key, &staff);
        extend_ttl_address_key(&env, &key);
        Ok(())
    }

    pub fn get_staff(env: Env, caller: Address, member: Address) -> Result<Staff, ContractError> {
        authenticate(&env, &caller, symbol_short!("STF_GET"))?;
        load_staff(&env, &member)
    }

    /// Records a login in the audit trail. Best-effort on purpose: an
    /// address that is not registered staff produces an error-log entry
    /// instead of a trail entry, and the call still succeeds.
    pub fn log_login(env: Env, caller: Address) {
        caller.require_auth();
        audit::log_audit(&env, AuditAction::Login, &caller, AuditContext::empty());
    }

    // ── Patients ─────────────────────────────────────────────────────────────

    /// Registers a patient. Receptionists and the super-admin only; a
    /// primary doctor given at registration must be an active doctor.
    pub fn register_patient(
        env: Env,
        caller: Address,
        input: PatientInput,
    ) -> Result<Patient, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("PAT_REG"))?;
        if actor.role == StaffRole::Doctor {
            return Err(ContractError::Forbidden);
        }
        if !common::non_empty(&input.name) {
            return Err(ContractError::InvalidInput);
        }
        if let Some(doctor) = &input.primary_doctor {
            let staff = load_staff(&env, doctor)?;
            if staff.role != StaffRole::Doctor || !staff.is_active {
                return Err(ContractError::NotADoctor);
            }
        }

        let id = next_id(&env, &PATIENT_COUNTER);
        let patient = Patient {
            id,
            name: input.name,
            gender: input.gender,
            birth_year: input.birth_year,
            contact: input.contact,
            visibility: input.visibility,
            primary_doctor: input.primary_doctor,
            created_by: actor.id.clone(),
            created_at: env.ledger().timestamp(),
        };
        put_patient(&env, &patient);
        append_patient_id(&env, id);
        if let Some(doctor) = &patient.primary_doctor {
            append_doctor_patient_id(&env, doctor, id);
        }
        extend_ttl_instance(&env);

        events::publish_patient_registered(&env, id, actor.id);
        Ok(patient)
    }

    pub fn get_patient(
        env: Env,
        caller: Address,
        patient_id: u64,
    ) -> Result<Patient, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("PAT_GET"))?;
        let patient = load_patient(&env, patient_id)?;
        if !permissions::can_view_patient(&patient, &actor) {
            return Err(ContractError::Forbidden);
        }
        Ok(patient)
    }

    /// Sets or replaces a patient's primary doctor. Receptionists and the
    /// super-admin only.
    pub fn assign_doctor(
        env: Env,
        caller: Address,
        patient_id: u64,
        doctor: Address,
    ) -> Result<Patient, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("DOC_ASN"))?;
        if actor.role == StaffRole::Doctor {
            return Err(ContractError::Forbidden);
        }

        let staff = load_staff(&env, &doctor)?;
        if staff.role != StaffRole::Doctor || !staff.is_active {
            return Err(ContractError::NotADoctor);
        }

        let mut patient = load_patient(&env, patient_id)?;
        if let Some(previous) = &patient.primary_doctor {
            remove_doctor_patient_id(&env, previous, patient_id);
        }
        patient.primary_doctor = Some(doctor.clone());
        put_patient(&env, &patient);
        append_doctor_patient_id(&env, &doctor, patient_id);

        events::publish_doctor_assigned(&env, patient_id, doctor);
        Ok(patient)
    }

    pub fn list_patients(
        env: Env,
        caller: Address,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Patient>, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("PAT_LST"))?;
        let page = Page::clamped(page, limit, MAX_PAGE_SIZE);
        Ok(query::list_patients(&env, &actor, page))
    }

    // ── Records ──────────────────────────────────────────────────────────────

    /// Adds a clinical record. The actor must be able to view the patient;
    /// receptionists may only create VIS_A records. A doctor becomes the
    /// record's assigned doctor, otherwise the patient's primary doctor is.
    pub fn add_record(
        env: Env,
        caller: Address,
        patient_id: u64,
        input: RecordInput,
    ) -> Result<ClinicalRecord, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("REC_ADD"))?;
        let patient = load_patient(&env, patient_id)?;
        if !permissions::can_view_patient(&patient, &actor) {
            return Err(ContractError::Forbidden);
        }
        if actor.role == StaffRole::Receptionist && input.visibility == Visibility::VisB {
            return Err(ContractError::Forbidden);
        }
        if !common::payload_present(&[
            &input.title,
            &input.description,
            &input.disease,
            &input.notes,
        ]) {
            return Err(ContractError::InvalidInput);
        }

        let assigned = match actor.role {
            StaffRole::Doctor => Some(actor.id.clone()),
            _ => patient.primary_doctor.clone(),
        };
        extend_ttl_instance(&env);
        Ok(insert_record(
            &env,
            patient_id,
            actor.id,
            assigned,
            input.visibility,
            input.kind,
            input.title,
            input.description,
            input.disease,
            input.notes,
            None,
        ))
    }

    /// Fetches one record under the per-record visibility rule. Reading a
    /// VIS_B record leaves an audit entry.
    pub fn get_record(
        env: Env,
        caller: Address,
        record_id: u64,
    ) -> Result<ClinicalRecord, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("REC_GET"))?;
        let record = load_record(&env, record_id)?;
        let patient = load_patient(&env, record.patient_id)?;
        if !permissions::can_view_record(&record, &patient, &actor) {
            return Err(ContractError::Forbidden);
        }
        if record.visibility == Visibility::VisB {
            audit::log_audit(
                &env,
                AuditAction::ViewVisBRecord,
                &actor.id,
                AuditContext {
                    patient_id: Some(record.patient_id),
                    record_id: Some(record_id),
                    import_session: None,
                    details: AuditDetails::None,
                },
            );
        }
        Ok(record)
    }

    pub fn list_records(
        env: Env,
        caller: Address,
        patient_id: u64,
        visibility: Option<Visibility>,
        kind: Option<RecordKind>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ClinicalRecord>, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("REC_LST"))?;
        let filter = query::RecordFilter { visibility, kind };
        let page = Page::clamped(page, limit, MAX_PAGE_SIZE);
        query::list_records(&env, &actor, patient_id, &filter, page)
    }

    /// Moves a record between the visibility tiers. Requires the change
    /// grant for the patient and a non-empty reason; the transition is
    /// audited with the previous tier, the new tier, and the reason.
    pub fn move_visibility(
        env: Env,
        caller: Address,
        record_id: u64,
        to: Visibility,
        reason: String,
    ) -> Result<ClinicalRecord, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("VIS_MOV"))?;
        visibility::move_visibility(&env, &actor, record_id, to, reason)
    }

    // ── Reports ──────────────────────────────────────────────────────────────

    pub fn add_report(
        env: Env,
        caller: Address,
        patient_id: u64,
        input: ReportInput,
    ) -> Result<Report, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("RPT_ADD"))?;
        let patient = load_patient(&env, patient_id)?;
        if !permissions::can_view_patient(&patient, &actor) {
            return Err(ContractError::Forbidden);
        }
        if actor.role == StaffRole::Receptionist && input.visibility == Visibility::VisB {
            return Err(ContractError::Forbidden);
        }
        if !common::non_empty(&input.title) || !common::non_empty(&input.file_hash) {
            return Err(ContractError::InvalidInput);
        }

        let id = next_id(&env, &REPORT_COUNTER);
        let report = Report {
            id,
            patient_id,
            visibility: input.visibility.clone(),
            title: input.title,
            file_hash: input.file_hash,
            created_by: actor.id,
            vaulted: false,
            vaulted_at: 0,
            vaulted_by: None,
            created_at: env.ledger().timestamp(),
        };
        put_report(&env, &report);

        let reports_key = (PATIENT_REPORTS, patient_id);
        let mut ids = patient_report_ids(&env, patient_id);
        ids.push_back(id);
        env.storage().persistent().set(&reports_key, &ids);
        extend_ttl_u64_key(&env, &reports_key);

        if report.visibility == Visibility::VisB {
            vault::track_vis_b_report(&env, id);
        }
        extend_ttl_instance(&env);

        events::publish_report_added(&env, id, patient_id, input.visibility);
        Ok(report)
    }

    /// Fetches one report. A vaulted report is visible to the super-admin
    /// only; everyone else gets not-found, as if the hide had removed it.
    pub fn get_report(env: Env, caller: Address, report_id: u64) -> Result<Report, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("RPT_GET"))?;
        let report = load_report(&env, report_id)?;
        if report.vaulted && actor.role != StaffRole::SuperAdmin {
            return Err(ContractError::ReportNotFound);
        }
        let patient = load_patient(&env, report.patient_id)?;
        if !permissions::can_view_report(&report, &patient, &actor) {
            return Err(ContractError::Forbidden);
        }
        Ok(report)
    }

    pub fn list_reports(
        env: Env,
        caller: Address,
        patient_id: u64,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Report>, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("RPT_LST"))?;
        let page = Page::clamped(page, limit, MAX_PAGE_SIZE);
        query::list_reports(&env, &actor, patient_id, page)
    }

    /// Moves a report between the visibility tiers, under the same grant
    /// and reason rule as record moves.
    pub fn move_report_visibility(
        env: Env,
        caller: Address,
        report_id: u64,
        to: Visibility,
        reason: String,
    ) -> Result<(), ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("RVIS_MOV"))?;
        visibility::move_report_visibility(&env, &actor, report_id, to, reason)
    }

    // ── Export / import ──────────────────────────────────────────────────────

    /// Counts what an export of the patient's chart would contain for this
    /// actor, and audits the export. VIS_B content is included only when
    /// inspection mode is off and the actor holds the export grant.
    pub fn export_records(
        env: Env,
        caller: Address,
        patient_id: u64,
        request: ExportRequest,
    ) -> Result<ExportSummary, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("REC_EXP"))?;
        export::export_records(&env, &actor, patient_id, &request)
    }

    /// Imports a batch of records for one patient. Rows with an empty
    /// clinical payload are counted as failures and skipped; the rest are
    /// created under a fresh import session.
    pub fn import_records(
        env: Env,
        caller: Address,
        patient_id: u64,
        items: Vec<ImportItem>,
    ) -> Result<ImportSummary, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("REC_IMP"))?;
        extend_ttl_instance(&env);
        export::import_records(&env, &actor, patient_id, &items)
    }

    pub fn get_import_session(
        env: Env,
        caller: Address,
        session_id: u64,
    ) -> Result<ImportSession, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("IMP_GET"))?;
        let session: ImportSession = env
            .storage()
            .persistent()
            .get(&(IMPORT_SESSION, session_id))
            .ok_or(ContractError::RecordNotFound)?;
        if actor.role != StaffRole::SuperAdmin && session.imported_by != actor.id {
            return Err(ContractError::Forbidden);
        }
        Ok(session)
    }

    // ── Emergency vault ──────────────────────────────────────────────────────

    /// Vaults every VIS_B record, marks every VIS_B report, and turns
    /// inspection mode on. Super-admin only, reason required, idempotent.
    pub fn trigger_emergency_hide(
        env: Env,
        caller: Address,
        reason: String,
    ) -> Result<HideSummary, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("EMG_HIDE"))?;
        extend_ttl_instance(&env);
        vault::emergency_hide(&env, &actor, reason)
    }

    /// Restores every vaulted record, clears report marks, and turns
    /// inspection mode off. Super-admin only, idempotent.
    pub fn trigger_emergency_restore(
        env: Env,
        caller: Address,
    ) -> Result<RestoreSummary, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("EMG_RSTR"))?;
        extend_ttl_instance(&env);
        vault::emergency_restore(&env, &actor)
    }

    /// Re-vaults any VIS_B record that slipped into the live store while
    /// inspection mode is on. Returns the number corrected.
    pub fn repair_vault(env: Env, caller: Address) -> Result<u32, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("VLT_RPR"))?;
        vault::repair_vault(&env, &actor)
    }

    pub fn get_vault_entry(
        env: Env,
        caller: Address,
        original_id: u64,
    ) -> Result<VaultEntry, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("VLT_GET"))?;
        require_admin_role(&actor)?;
        vault::vault_entry(&env, original_id).ok_or(ContractError::RecordNotFound)
    }

    /// Current inspection-mode flag, via the short-lived cache the hot
    /// paths read. Super-admin only.
    pub fn get_inspection_mode(env: Env, caller: Address) -> Result<bool, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("INSP_GET"))?;
        require_admin_role(&actor)?;
        Ok(settings::inspection_mode(&env))
    }

    pub fn get_inspection_setting(
        env: Env,
        caller: Address,
    ) -> Result<Option<InspectionSetting>, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("INSP_CFG"))?;
        require_admin_role(&actor)?;
        Ok(settings::get_setting(&env))
    }

    // ── Audit & diagnostics ──────────────────────────────────────────────────

    /// The audit slice the caller's role permits, newest first, optionally
    /// narrowed by action or patient.
    pub fn list_audit(
        env: Env,
        caller: Address,
        action: Option<AuditAction>,
        patient_id: Option<u64>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("AUD_LST"))?;
        let filter = query::AuditFilter { action, patient_id };
        let page = Page::clamped(page, limit, MAX_AUDIT_PAGE_SIZE);
        Ok(query::list_audit(&env, &actor, &filter, page))
    }

    pub fn get_audit_count(env: Env, caller: Address) -> Result<u64, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("AUD_CNT"))?;
        require_admin_role(&actor)?;
        Ok(audit::count(&env))
    }

    /// Toggles the per-request audit hook. Super-admin only.
    pub fn set_api_audit(env: Env, caller: Address, enabled: bool) -> Result<(), ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("API_SET"))?;
        require_admin_role(&actor)?;
        audit::set_api_audit(&env, enabled);
        Ok(())
    }

    pub fn get_error_log(env: Env, caller: Address) -> Result<Vec<ErrorLogEntry>, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("ERR_LOG"))?;
        require_admin_role(&actor)?;
        Ok(errors::get_error_log(&env))
    }

    pub fn get_error_count(env: Env, caller: Address) -> Result<u64, ContractError> {
        let actor = authenticate(&env, &caller, symbol_short!("ERR_CNT"))?;
        require_admin_role(&actor)?;
        Ok(errors::get_error_count(&env))
    }
}
