#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use super::*;
use crate::test::{record_input, register_doctor, register_patient, register_receptionist, setup};
use soroban_sdk::testutils::Address as _;

#[test]
fn login_is_logged_for_registered_staff() {
    let (env, client, admin) = setup();
    let doctor = register_doctor(&env, &client, &admin);

    client.log_login(&doctor);

    let trail = client.list_audit(&admin, &None, &None, &1, &10);
    let entry = trail.get(0).unwrap();
    assert_eq!(entry.action, AuditAction::Login);
    assert_eq!(entry.actor, doctor);
    assert_eq!(entry.details, AuditDetails::None);
}

#[test]
fn unknown_login_is_skipped_not_failed() {
    let (env, client, admin) = setup();
    let stranger = Address::generate(&env);

    let errors_before = client.get_error_count(&admin);
    let audits_before = client.get_audit_count(&admin);

    // Best-effort: the call succeeds, the trail is untouched, and the skip
    // lands in the error log instead.
    client.log_login(&stranger);

    assert_eq!(client.get_audit_count(&admin), audits_before);
    assert_eq!(client.get_error_count(&admin), errors_before + 1);

    let log = client.get_error_log(&admin);
    let last = log.get(log.len() - 1).unwrap();
    assert_eq!(last.error_code, ContractError::StaffNotFound as u32);
}

#[test]
fn trail_is_append_only_and_newest_first() {
    let (env, client, admin) = setup();
    let doctor = register_doctor(&env, &client, &admin);
    client.log_login(&doctor);
    client.log_login(&admin);
    client.log_login(&doctor);

    let trail = client.list_audit(&admin, &None, &None, &1, &10);
    assert_eq!(trail.len(), 3);
    assert!(trail.get(0).unwrap().seq > trail.get(1).unwrap().seq);
    assert!(trail.get(1).unwrap().seq > trail.get(2).unwrap().seq);
}

#[test]
fn receptionist_sees_only_own_entries() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let doctor = register_doctor(&env, &client, &admin);

    client.log_login(&receptionist);
    client.log_login(&doctor);
    client.log_login(&admin);

    let trail = client.list_audit(&receptionist, &None, &None, &1, &10);
    assert_eq!(trail.len(), 1);
    assert_eq!(trail.get(0).unwrap().actor, receptionist);
}

#[test]
fn doctor_sees_own_and_clinic_receptionist_entries() {
    let (env, client, admin) = setup();
    let clinic = Some(7u64);
    let doctor = {
        let member = Address::generate(&env);
        client.register_staff(
            &admin,
            &member,
            &String::from_str(&env, "Dr. Clinic Seven"),
            &StaffRole::Doctor,
            &clinic,
        );
        member
    };
    let clinic_receptionist = register_receptionist(&env, &client, &admin, clinic);
    let other_receptionist = register_receptionist(&env, &client, &admin, Some(8));

    client.log_login(&doctor);
    client.log_login(&clinic_receptionist);
    client.log_login(&other_receptionist);
    client.log_login(&admin);

    let trail = client.list_audit(&doctor, &None, &None, &1, &10);
    assert_eq!(trail.len(), 2);
    // Newest first across the merged per-actor slices
    assert_eq!(trail.get(0).unwrap().actor, clinic_receptionist);
    assert_eq!(trail.get(1).unwrap().actor, doctor);
}

#[test]
fn super_admin_sees_everything() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let doctor = register_doctor(&env, &client, &admin);

    client.log_login(&receptionist);
    client.log_login(&doctor);

    let trail = client.list_audit(&admin, &None, &None, &1, &10);
    assert_eq!(trail.len(), 2);
}

#[test]
fn vis_b_reads_leave_a_trail() {
    let (env, client, admin) = setup();
    let doctor = register_doctor(&env, &client, &admin);
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, Some(doctor.clone()));

    let open = client.add_record(&doctor, &patient_id, &record_input(&env, Visibility::VisA));
    let restricted = client.add_record(&doctor, &patient_id, &record_input(&env, Visibility::VisB));

    let before = client.get_audit_count(&admin);
    client.get_record(&doctor, &open.id);
    assert_eq!(client.get_audit_count(&admin), before);

    client.get_record(&doctor, &restricted.id);
    let trail = client.list_audit(&admin, &None, &None, &1, &1);
    let entry = trail.get(0).unwrap();
    assert_eq!(entry.action, AuditAction::ViewVisBRecord);
    assert_eq!(entry.record_id, Some(restricted.id));
    assert_eq!(entry.actor, doctor);
}

#[test]
fn api_audit_flag_records_endpoint_hits() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);

    // Off by default
    let before = client.get_audit_count(&admin);
    client.list_patients(&receptionist, &1, &20);
    assert_eq!(client.get_audit_count(&admin), before);

    client.set_api_audit(&admin, &true);
    client.list_patients(&receptionist, &1, &20);

    // The trail read is request-audited like any other call, so the newest
    // entry is this listing itself and the receptionist's hit sits behind it.
    let trail = client.list_audit(&admin, &None, &None, &1, &2);
    let own = trail.get(0).unwrap();
    assert_eq!(own.action, AuditAction::ApiAccess);
    match own.details {
        AuditDetails::Api(details) => {
            assert_eq!(details.role, StaffRole::SuperAdmin);
            assert_eq!(details.endpoint, symbol_short!("AUD_LST"));
        }
        _ => panic!("expected api details"),
    }
    let entry = trail.get(1).unwrap();
    assert_eq!(entry.action, AuditAction::ApiAccess);
    match entry.details {
        AuditDetails::Api(details) => {
            assert_eq!(details.role, StaffRole::Receptionist);
            assert_eq!(details.endpoint, symbol_short!("PAT_LST"));
        }
        _ => panic!("expected api details"),
    }

    client.set_api_audit(&admin, &false);
    let count = client.get_audit_count(&admin);
    client.list_patients(&receptionist, &1, &20);
    assert_eq!(client.get_audit_count(&admin), count);
}

#[test]
fn audit_listing_is_forbidden_for_strangers() {
    let (env, client, _admin) = setup();
    let stranger = Address::generate(&env);
    let res = client.try_list_audit(&stranger, &None, &None, &1, &10);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Unauthorized);
}

#[test]
fn audit_pagination_walks_the_trail() {
    let (env, client, admin) = setup();
    let doctor = register_doctor(&env, &client, &admin);
    for _ in 0..5 {
        client.log_login(&doctor);
    }

    let first = client.list_audit(&admin, &None, &None, &1, &2);
    let second = client.list_audit(&admin, &None, &None, &2, &2);
    let third = client.list_audit(&admin, &None, &None, &3, &2);
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(third.len(), 1);
    assert!(first.get(1).unwrap().seq > second.get(0).unwrap().seq);
}

#[test]
fn audit_filters_narrow_by_action_and_patient() {
    let (env, client, admin) = setup();
    let doctor = register_doctor(&env, &client, &admin);
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let first = register_patient(&env, &client, &receptionist, Some(doctor.clone()));
    let second = register_patient(&env, &client, &receptionist, Some(doctor.clone()));

    client.log_login(&doctor);
    let restricted = client.add_record(&doctor, &first, &record_input(&env, Visibility::VisB));
    client.get_record(&doctor, &restricted.id);
    client.move_visibility(
        &doctor,
        &restricted.id,
        &Visibility::VisA,
        &String::from_str(&env, "treatment concluded"),
    );
    let other = client.add_record(&doctor, &second, &record_input(&env, Visibility::VisB));
    client.get_record(&doctor, &other.id);

    let logins = client.list_audit(&admin, &Some(AuditAction::Login), &None, &1, &10);
    assert_eq!(logins.len(), 1);
    assert_eq!(logins.get(0).unwrap().actor, doctor);

    let first_only = client.list_audit(&admin, &None, &Some(first), &1, &10);
    assert_eq!(first_only.len(), 2);
    for entry in first_only.iter() {
        assert_eq!(entry.patient_id, Some(first));
    }

    let narrowed = client.list_audit(
        &admin,
        &Some(AuditAction::ViewVisBRecord),
        &Some(first),
        &1,
        &10,
    );
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed.get(0).unwrap().record_id, Some(restricted.id));
}
