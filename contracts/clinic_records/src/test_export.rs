#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use super::*;
use crate::test::{record_input, register_doctor, register_patient, register_receptionist, setup};
use soroban_sdk::Vec;

fn full_export(env: &soroban_sdk::Env) -> ExportRequest {
    ExportRequest {
        from: None,
        to: None,
        kinds: Vec::new(env),
        include_reports: true,
    }
}

fn import_item(env: &soroban_sdk::Env, title: &str) -> ImportItem {
    ImportItem {
        visibility: Visibility::VisA,
        kind: RecordKind::Diagnosis,
        title: String::from_str(env, title),
        description: String::from_str(env, ""),
        disease: String::from_str(env, ""),
        notes: String::from_str(env, ""),
    }
}

#[test]
fn export_includes_vis_b_for_primary_doctor_only() {
    let (env, client, admin) = setup();
    let dr_primary = register_doctor(&env, &client, &admin);
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, Some(dr_primary.clone()));

    client.add_record(&dr_primary, &patient_id, &record_input(&env, Visibility::VisA));
    client.add_record(&dr_primary, &patient_id, &record_input(&env, Visibility::VisB));

    let summary = client.export_records(&dr_primary, &patient_id, &full_export(&env));
    assert!(summary.include_vis_b);
    assert_eq!(summary.record_count, 2);

    let summary = client.export_records(&receptionist, &patient_id, &full_export(&env));
    assert!(!summary.include_vis_b);
    assert_eq!(summary.record_count, 1);
}

#[test]
fn export_degrades_during_inspection() {
    let (env, client, admin) = setup();
    let doctor = register_doctor(&env, &client, &admin);
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, Some(doctor.clone()));

    client.add_record(&doctor, &patient_id, &record_input(&env, Visibility::VisA));
    client.add_record(&doctor, &patient_id, &record_input(&env, Visibility::VisB));

    client.trigger_emergency_hide(&admin, &String::from_str(&env, "inspection"));

    // Even the super-admin loses the VIS_B portion while the mode is on
    let summary = client.export_records(&admin, &patient_id, &full_export(&env));
    assert!(!summary.include_vis_b);
    assert!(summary.inspection_mode);
    assert_eq!(summary.record_count, 1);

    client.trigger_emergency_restore(&admin);
    let summary = client.export_records(&admin, &patient_id, &full_export(&env));
    assert!(summary.include_vis_b);
    assert_eq!(summary.record_count, 2);
}

#[test]
fn export_rejects_inverted_range() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);

    let request = ExportRequest {
        from: Some(100),
        to: Some(50),
        kinds: Vec::new(&env),
        include_reports: false,
    };
    let res = client.try_export_records(&admin, &patient_id, &request);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::InvalidInput);
}

#[test]
fn export_is_audited() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);
    client.add_record(&admin, &patient_id, &record_input(&env, Visibility::VisA));

    client.export_records(&admin, &patient_id, &full_export(&env));

    let trail = client.list_audit(&admin, &None, &None, &1, &10);
    let entry = trail.get(0).unwrap();
    assert_eq!(entry.action, AuditAction::ExportRecords);
    assert_eq!(entry.patient_id, Some(patient_id));
    match entry.details {
        AuditDetails::Export(details) => {
            assert_eq!(details.record_count, 1);
            assert!(details.include_vis_b);
            assert!(!details.inspection_mode);
        }
        _ => panic!("expected export details"),
    }
}

#[test]
fn import_tolerates_bad_rows() {
    let (env, client, admin) = setup();
    let doctor = register_doctor(&env, &client, &admin);
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, Some(doctor.clone()));

    let mut items: Vec<ImportItem> = Vec::new(&env);
    items.push_back(import_item(&env, "row one"));
    items.push_back(import_item(&env, "")); // empty payload, must be skipped
    items.push_back(import_item(&env, "row three"));

    let summary = client.import_records(&doctor, &patient_id, &items);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.success, 2);
    assert_eq!(summary.failure, 1);

    let page = client.list_records(&doctor, &patient_id, &None, &None, &1, &20);
    assert_eq!(page.len(), 2);
    assert_eq!(page.get(0).unwrap().import_session, Some(summary.session));

    let session = client.get_import_session(&doctor, &summary.session);
    assert_eq!(session.success, 2);
    assert_eq!(session.imported_by, doctor);
}

#[test]
fn import_rejects_empty_batch() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);

    let items: Vec<ImportItem> = Vec::new(&env);
    let res = client.try_import_records(&admin, &patient_id, &items);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::InvalidInput);
}

#[test]
fn receptionist_cannot_import() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);

    let mut items: Vec<ImportItem> = Vec::new(&env);
    items.push_back(import_item(&env, "row one"));
    let res = client.try_import_records(&receptionist, &patient_id, &items);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Forbidden);
}

#[test]
fn import_is_audited_with_session() {
    let (env, client, admin) = setup();
    let receptionist = register_receptionist(&env, &client, &admin, None);
    let patient_id = register_patient(&env, &client, &receptionist, None);

    let mut items: Vec<ImportItem> = Vec::new(&env);
    items.push_back(import_item(&env, "row one"));
    let summary = client.import_records(&admin, &patient_id, &items);

    let trail = client.list_audit(&admin, &None, &None, &1, &10);
    let entry = trail.get(0).unwrap();
    assert_eq!(entry.action, AuditAction::ImportRecords);
    assert_eq!(entry.import_session, Some(summary.session));
    match entry.details {
        AuditDetails::Import(details) => {
            assert_eq!(details.total, 1);
            assert_eq!(details.success, 1);
            assert_eq!(details.failure, 0);
        }
        _ => panic!("expected import details"),
    }
}
