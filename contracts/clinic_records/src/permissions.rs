//! Actor resolution and the permission predicates.
//!
//! The four `can_*` predicates are pure: they take already-loaded values,
//! perform no storage access, and answer yes/no. Every list endpoint also
//! applies them per item as a defense-in-depth filter on top of its
//! query-level scoping.

use soroban_sdk::{contracttype, Address, Env};

use crate::errors::ContractError;
use crate::{ClinicalRecord, Patient, Report, Staff, StaffRole, Visibility};

/// The identity acting on a request: a registered staff address, its role,
/// and its clinic affiliation. Resolved per call, never persisted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub id: Address,
    pub role: StaffRole,
    pub clinic_id: Option<u64>,
}

/// Resolves an authenticated address to an [`Actor`]. Unknown or deactivated
/// addresses are rejected before any core logic runs.
pub fn resolve_actor(env: &Env, caller: &Address) -> Result<Actor, ContractError> {
    let staff: Staff = env
        .storage()
        .persistent()
        .get(&crate::staff_key(caller))
        .ok_or(ContractError::Unauthorized)?;
    if !staff.is_active {
        return Err(ContractError::Unauthorized);
    }
    Ok(Actor {
        id: staff.address,
        role: staff.role,
        clinic_id: staff.clinic_id,
    })
}

/// Receptionists and the super-admin see every patient; a doctor sees their
/// own patients. A patient with no primary doctor yet is viewable by any
/// doctor, covering the window between registration and assignment.
pub fn can_view_patient(patient: &Patient, actor: &Actor) -> bool {
    match actor.role {
        StaffRole::SuperAdmin => true,
        StaffRole::Receptionist => true,
        StaffRole::Doctor => match &patient.primary_doctor {
            Some(doctor) => *doctor == actor.id,
            None => true,
        },
    }
}

/// VIS_A records are visible to all staff. VIS_B records are restricted to
/// the record's assigned doctor, the patient's primary doctor, and the
/// super-admin; receptionists never see them.
pub fn can_view_record(record: &ClinicalRecord, patient: &Patient, actor: &Actor) -> bool {
    match record.visibility {
        Visibility::VisA => true,
        Visibility::VisB => match actor.role {
            StaffRole::Receptionist => false,
            StaffRole::SuperAdmin => true,
            StaffRole::Doctor => {
                record.assigned_doctor.as_ref() == Some(&actor.id)
                    || patient.primary_doctor.as_ref() == Some(&actor.id)
            }
        },
    }
}

/// Reports follow the record rule, except a report has no assigned doctor:
/// a VIS_B report is visible to the patient's primary doctor and the
/// super-admin only.
pub fn can_view_report(report: &Report, patient: &Patient, actor: &Actor) -> bool {
    match report.visibility {
        Visibility::VisA => true,
        Visibility::VisB => match actor.role {
            StaffRole::Receptionist => false,
            StaffRole::SuperAdmin => true,
            StaffRole::Doctor => patient.primary_doctor.as_ref() == Some(&actor.id),
        },
    }
}

/// VIS_B content may be exported only by the patient's primary doctor or the
/// super-admin.
pub fn can_export_vis_b(patient: &Patient, actor: &Actor) -> bool {
    match actor.role {
        StaffRole::SuperAdmin => true,
        StaffRole::Doctor => patient.primary_doctor.as_ref() == Some(&actor.id),
        StaffRole::Receptionist => false,
    }
}

/// Who may reclassify a record between the two tiers. Doctors qualify for
/// their own patients (or unassigned ones); receptionists qualify whenever
/// they can view the patient, which under the current rules is always.
pub fn can_change_visibility(patient: &Patient, actor: &Actor) -> bool {
    match actor.role {
        StaffRole::SuperAdmin => true,
        StaffRole::Doctor => match &patient.primary_doctor {
            Some(doctor) => *doctor == actor.id,
            None => true,
        },
        StaffRole::Receptionist => can_view_patient(patient, actor),
    }
}
