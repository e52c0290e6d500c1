#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use super::*;
use crate::test::{record_input, register_doctor, register_patient, register_receptionist, setup};

#[test]
fn move_requires_reason() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);
    let record = client.add_record(&admin, &patient_id, &record_input(&env, Visibility::VisA));

    let audit_before = client.get_audit_count(&admin);
    let res = client.try_move_visibility(
        &admin,
        &record.id,
        &Visibility::VisB,
        &String::from_str(&env, ""),
    );
    assert_eq!(res.unwrap_err().unwrap(), ContractError::ReasonRequired);

    // Nothing changed and nothing was logged
    assert_eq!(client.get_record(&admin, &record.id).visibility, Visibility::VisA);
    assert_eq!(client.get_audit_count(&admin), audit_before);
}

#[test]
fn move_is_audited_with_previous_and_new_tier() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);
    let record = client.add_record(&admin, &patient_id, &record_input(&env, Visibility::VisA));

    let moved = client.move_visibility(
        &admin,
        &record.id,
        &Visibility::VisB,
        &String::from_str(&env, "contains sensitive diagnosis"),
    );
    assert_eq!(moved.visibility, Visibility::VisB);

    let trail = client.list_audit(&admin, &None, &None, &1, &10);
    let entry = trail.get(0).unwrap();
    assert_eq!(entry.action, AuditAction::MoveVisibility);
    assert_eq!(entry.record_id, Some(record.id));
    match entry.details {
        AuditDetails::Visibility(details) => {
            assert_eq!(details.previous, Visibility::VisA);
            assert_eq!(details.new, Visibility::VisB);
            assert_eq!(
                details.reason,
                String::from_str(&env, "contains sensitive diagnosis")
            );
        }
        _ => panic!("expected visibility details"),
    }
}

#[test]
fn unauthorized_move_changes_nothing() {
    let (env, client, admin) = setup();
    let dr_a = register_doctor(&env, &client, &admin);
    let dr_b = register_doctor(&env, &client, &admin);
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, Some(dr_a.clone()));
    let record = client.add_record(&dr_a, &patient_id, &record_input(&env, Visibility::VisA));

    let audit_before = client.get_audit_count(&admin);
    let res = client.try_move_visibility(
        &dr_b,
        &record.id,
        &Visibility::VisB,
        &String::from_str(&env, "attempted takeover"),
    );
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Forbidden);
    assert_eq!(client.get_record(&dr_a, &record.id).visibility, Visibility::VisA);
    assert_eq!(client.get_audit_count(&admin), audit_before);
}

#[test]
fn same_tier_move_is_allowed_and_audited() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);
    let record = client.add_record(&admin, &patient_id, &record_input(&env, Visibility::VisA));

    let before = client.get_audit_count(&admin);
    let moved = client.move_visibility(
        &admin,
        &record.id,
        &Visibility::VisA,
        &String::from_str(&env, "re-attest current tier"),
    );
    assert_eq!(moved.visibility, Visibility::VisA);
    assert_eq!(client.get_audit_count(&admin), before + 1);
}

#[test]
fn receptionist_can_reclassify() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);
    let record = client.add_record(&admin, &patient_id, &record_input(&env, Visibility::VisA));

    let moved = client.move_visibility(
        &receptionist,
        &record.id,
        &Visibility::VisB,
        &String::from_str(&env, "flagged at front desk"),
    );
    assert_eq!(moved.visibility, Visibility::VisB);

    // After moving it, the receptionist can no longer read it
    let res = client.try_get_record(&receptionist, &record.id);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Forbidden);
}

#[test]
fn report_move_follows_same_rules() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);
    let report = client.add_report(
        &admin,
        &patient_id,
        &ReportInput {
            visibility: Visibility::VisA,
            title: String::from_str(&env, "OCT scan"),
            file_hash: String::from_str(&env, "Qmhash"),
        },
    );

    let res = client.try_move_report_visibility(
        &admin,
        &report.id,
        &Visibility::VisB,
        &String::from_str(&env, ""),
    );
    assert_eq!(res.unwrap_err().unwrap(), ContractError::ReasonRequired);

    client.move_report_visibility(
        &admin,
        &report.id,
        &Visibility::VisB,
        &String::from_str(&env, "sensitive imaging"),
    );
    assert_eq!(
        client.get_report(&admin, &report.id).visibility,
        Visibility::VisB
    );
}
