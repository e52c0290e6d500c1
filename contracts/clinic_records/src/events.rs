use soroban_sdk::{symbol_short, Address, Env, String};

use crate::{RecordKind, StaffRole, Visibility};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

/// Event published when a staff member is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StaffRegisteredEvent {
    pub member: Address,
    pub role: StaffRole,
    pub name: String,
    pub timestamp: u64,
}

/// Event published when a patient is registered. Consumed off-chain by the
/// notification pipeline; delivery failures cannot affect the transaction.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatientRegisteredEvent {
    pub patient_id: u64,
    pub created_by: Address,
    pub timestamp: u64,
}

/// Event published when a patient is assigned a primary doctor.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DoctorAssignedEvent {
    pub patient_id: u64,
    pub doctor: Address,
    pub timestamp: u64,
}

/// Event published when a clinical record is added.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordAddedEvent {
    pub record_id: u64,
    pub patient_id: u64,
    pub visibility: Visibility,
    pub kind: RecordKind,
    pub timestamp: u64,
}

/// Event published when a report's metadata is added.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportAddedEvent {
    pub report_id: u64,
    pub patient_id: u64,
    pub visibility: Visibility,
    pub timestamp: u64,
}

/// Event published when a record moves between visibility tiers.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VisibilityMovedEvent {
    pub record_id: u64,
    pub patient_id: u64,
    pub previous: Visibility,
    pub new: Visibility,
    pub timestamp: u64,
}

/// Event published when emergency hide vaults the sensitive tier.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyHideEvent {
    pub triggered_by: Address,
    pub record_count: u32,
    pub report_count: u32,
    pub timestamp: u64,
}

/// Event published when emergency restore empties the vault.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyRestoreEvent {
    pub triggered_by: Address,
    pub record_count: u32,
    pub timestamp: u64,
}

/// Event published when the repair scan vaults stray sensitive records.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultRepairedEvent {
    pub triggered_by: Address,
    pub record_count: u32,
    pub timestamp: u64,
}

/// Event published after an export is prepared. Stands in for the export
/// audit mail of the surrounding system.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordsExportedEvent {
    pub patient_id: u64,
    pub exported_by: Address,
    pub record_count: u32,
    pub include_vis_b: bool,
    pub timestamp: u64,
}

/// Event published after an import session completes.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordsImportedEvent {
    pub patient_id: u64,
    pub session_id: u64,
    pub success: u32,
    pub failure: u32,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_staff_registered(env: &Env, member: Address, role: StaffRole, name: String) {
    let topics = (symbol_short!("STF_REG"), member.clone());
    let data = StaffRegisteredEvent {
        member,
        role,
        name,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_patient_registered(env: &Env, patient_id: u64, created_by: Address) {
    let topics = (symbol_short!("PAT_REG"), patient_id);
    let data = PatientRegisteredEvent {
        patient_id,
        created_by,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_doctor_assigned(env: &Env, patient_id: u64, doctor: Address) {
    let topics = (symbol_short!("DOC_ASN"), patient_id);
    let data = DoctorAssignedEvent {
        patient_id,
        doctor,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_added(
    env: &Env,
    record_id: u64,
    patient_id: u64,
    visibility: Visibility,
    kind: RecordKind,
) {
    let topics = (symbol_short!("REC_ADD"), patient_id);
    let data = RecordAddedEvent {
        record_id,
        patient_id,
        visibility,
        kind,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_report_added(env: &Env, report_id: u64, patient_id: u64, visibility: Visibility) {
    let topics = (symbol_short!("RPT_ADD"), patient_id);
    let data = ReportAddedEvent {
        report_id,
        patient_id,
        visibility,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_visibility_moved(
    env: &Env,
    record_id: u64,
    patient_id: u64,
    previous: Visibility,
    new: Visibility,
) {
    let topics = (symbol_short!("VIS_MOV"), record_id);
    let data = VisibilityMovedEvent {
        record_id,
        patient_id,
        previous,
        new,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_emergency_hide(
    env: &Env,
    triggered_by: Address,
    record_count: u32,
    report_count: u32,
) {
    let topics = (symbol_short!("EMG_HIDE"),);
    let data = EmergencyHideEvent {
        triggered_by,
        record_count,
        report_count,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_emergency_restore(env: &Env, triggered_by: Address, record_count: u32) {
    let topics = (symbol_short!("EMG_RSTR"),);
    let data = EmergencyRestoreEvent {
        triggered_by,
        record_count,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_vault_repaired(env: &Env, triggered_by: Address, record_count: u32) {
    let topics = (symbol_short!("VLT_RPR"),);
    let data = VaultRepairedEvent {
        triggered_by,
        record_count,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_records_exported(
    env: &Env,
    patient_id: u64,
    exported_by: Address,
    record_count: u32,
    include_vis_b: bool,
) {
    let topics = (symbol_short!("REC_EXP"), patient_id);
    let data = RecordsExportedEvent {
        patient_id,
        exported_by,
        record_count,
        include_vis_b,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_records_imported(
    env: &Env,
    patient_id: u64,
    session_id: u64,
    success: u32,
    failure: u32,
) {
    let topics = (symbol_short!("REC_IMP"), patient_id);
    let data = RecordsImportedEvent {
        patient_id,
        session_id,
        success,
        failure,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
