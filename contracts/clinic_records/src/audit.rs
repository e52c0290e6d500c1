//! Append-only audit trail.
//!
//! Every security-relevant operation writes one entry. Writes are
//! best-effort by policy: an actor that does not resolve to registered staff
//! is recorded in the local error log and the entry is skipped, so the
//! primary operation never fails because of its audit side effect.
//!
//! The optional API_ACCESS layer logs every authenticated entry point when
//! enabled. Status reads without a mutation or a patient in scope
//! (`version`, `get_inspection_mode`, the error-log getters) and the login
//! hook itself are deliberately outside it.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::errors::{self, ContractError};
use crate::{StaffRole, Visibility};

const AUDIT: Symbol = symbol_short!("AUDIT");
const AUDIT_COUNTER: Symbol = symbol_short!("AUD_CTR");
const ACTOR_INDEX: Symbol = symbol_short!("AUD_ACT");
const API_AUDIT_FLAG: Symbol = symbol_short!("API_AUD");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Security-relevant actions recorded in the trail.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AuditAction {
    Login = 1,
    ViewVisBRecord = 2,
    MoveVisibility = 3,
    ExportRecords = 4,
    ImportRecords = 5,
    BreakGlassAccess = 6,
    EmergencyHide = 7,
    EmergencyRestore = 8,
    ApiAccess = 9,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VisibilityChangeDetails {
    pub previous: Visibility,
    pub new: Visibility,
    pub reason: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExportDetails {
    pub record_count: u32,
    pub report_count: u32,
    pub include_vis_b: bool,
    pub inspection_mode: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportDetails {
    pub total: u32,
    pub success: u32,
    pub failure: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HideDetails {
    pub reason: String,
    pub record_count: u32,
    pub report_count: u32,
    /// Moved record ids, capped so one entry stays bounded.
    pub moved_record_ids: Vec<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RestoreDetails {
    pub record_count: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiAccessDetails {
    pub endpoint: Symbol,
    pub role: StaffRole,
}

/// Per-action structured payload. A tagged union rather than a free-form
/// map, so consumers never type-sniff.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuditDetails {
    None,
    Visibility(VisibilityChangeDetails),
    Export(ExportDetails),
    Import(ImportDetails),
    Hide(HideDetails),
    Restore(RestoreDetails),
    Api(ApiAccessDetails),
}

/// One immutable trail entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditEntry {
    pub seq: u64,
    pub action: AuditAction,
    pub actor: Address,
    pub patient_id: Option<u64>,
    pub record_id: Option<u64>,
    pub import_session: Option<u64>,
    pub details: AuditDetails,
    pub timestamp: u64,
}

/// Optional references attached to an entry.
pub struct AuditContext {
    pub patient_id: Option<u64>,
    pub record_id: Option<u64>,
    pub import_session: Option<u64>,
    pub details: AuditDetails,
}

impl AuditContext {
    pub fn empty() -> Self {
        Self {
            patient_id: None,
            record_id: None,
            import_session: None,
            details: AuditDetails::None,
        }
    }
}

fn entry_key(seq: u64) -> (Symbol, u64) {
    (AUDIT, seq)
}

fn actor_index_key(actor: &Address) -> (Symbol, Address) {
    (ACTOR_INDEX, actor.clone())
}

/// Appends one entry. Unknown actors are recorded in the local error log and
/// skipped; the caller's operation continues either way.
pub fn log_audit(env: &Env, action: AuditAction, actor: &Address, ctx: AuditContext) {
    if !crate::is_registered_staff(env, actor) {
        errors::log_error(
            env,
            ContractError::StaffNotFound,
            Some(actor.clone()),
            Some(String::from_str(env, "log_audit")),
        );
        return;
    }

    let seq: u64 = env
        .storage()
        .instance()
        .get(&AUDIT_COUNTER)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&AUDIT_COUNTER, &seq);

    let entry = AuditEntry {
        seq,
        action,
        actor: actor.clone(),
        patient_id: ctx.patient_id,
        record_id: ctx.record_id,
        import_session: ctx.import_session,
        details: ctx.details,
        timestamp: env.ledger().timestamp(),
    };

    let key = entry_key(seq);
    env.storage().persistent().set(&key, &entry);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    // Per-actor sequence index, the query-level filter behind the scoped
    // audit listings.
    let idx_key = actor_index_key(actor);
    let mut seqs: Vec<u64> = env
        .storage()
        .persistent()
        .get(&idx_key)
        .unwrap_or(Vec::new(env));
    seqs.push_back(seq);
    env.storage().persistent().set(&idx_key, &seqs);
    env.storage()
        .persistent()
        .extend_ttl(&idx_key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn entry(env: &Env, seq: u64) -> Option<AuditEntry> {
    env.storage().persistent().get(&entry_key(seq))
}

/// Highest sequence number issued so far.
pub fn count(env: &Env) -> u64 {
    env.storage().instance().get(&AUDIT_COUNTER).unwrap_or(0)
}

/// Ascending entry sequence numbers for one actor.
pub fn actor_index(env: &Env, actor: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&actor_index_key(actor))
        .unwrap_or(Vec::new(env))
}

pub fn set_api_audit(env: &Env, enabled: bool) {
    env.storage().instance().set(&API_AUDIT_FLAG, &enabled);
}

pub fn api_audit_enabled(env: &Env) -> bool {
    env.storage().instance().get(&API_AUDIT_FLAG).unwrap_or(false)
}

/// Request-trail hook called by authenticated entry points. A no-op unless
/// the hardening flag is on.
pub fn log_api_access(env: &Env, actor: &Address, role: StaffRole, endpoint: Symbol) {
    if !api_audit_enabled(env) {
        return;
    }
    log_audit(
        env,
        AuditAction::ApiAccess,
        actor,
        AuditContext {
            patient_id: None,
            record_id: None,
            import_session: None,
            details: AuditDetails::Api(ApiAccessDetails { endpoint, role }),
        },
    );
}
