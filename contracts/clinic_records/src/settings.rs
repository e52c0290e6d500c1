use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

const INSPECT: Symbol = symbol_short!("INSPECT");
const INSPECT_CACHE: Symbol = symbol_short!("INSP_C");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Cache lifetime for the inspection flag, in ledgers. Roughly one minute at
/// ~5s per ledger; a read within this window may lag a toggle from another
/// instance by at most the window.
const CACHE_TTL_LEDGERS: u32 = 12;

/// The single global inspection-mode setting, with the last actor to change
/// it. Toggled only by the emergency hide/restore workflow.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InspectionSetting {
    pub value: bool,
    pub updated_by: Option<Address>,
    pub updated_at: u64,
}

/// Read-through cached inspection flag. Hot paths (every list and export)
/// call this; the cache entry expires on its own and is removed synchronously
/// by every toggle.
pub fn inspection_mode(env: &Env) -> bool {
    if let Some(cached) = env.storage().temporary().get(&INSPECT_CACHE) {
        return cached;
    }
    let value = read_setting(env);
    env.storage().temporary().set(&INSPECT_CACHE, &value);
    env.storage()
        .temporary()
        .extend_ttl(&INSPECT_CACHE, CACHE_TTL_LEDGERS, CACHE_TTL_LEDGERS);
    value
}

/// Uncached read of the setting entry. The hide/restore idempotency check
/// uses this so the toggle decision never depends on a stale cache.
pub fn read_setting(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get::<_, InspectionSetting>(&INSPECT)
        .map(|setting| setting.value)
        .unwrap_or(false)
}

pub fn get_setting(env: &Env) -> Option<InspectionSetting> {
    env.storage().persistent().get(&INSPECT)
}

pub fn set_inspection_mode(env: &Env, value: bool, updated_by: &Address) {
    let setting = InspectionSetting {
        value,
        updated_by: Some(updated_by.clone()),
        updated_at: env.ledger().timestamp(),
    };
    env.storage().persistent().set(&INSPECT, &setting);
    env.storage()
        .persistent()
        .extend_ttl(&INSPECT, TTL_THRESHOLD, TTL_EXTEND_TO);
    invalidate_cache(env);
}

pub fn invalidate_cache(env: &Env) {
    env.storage().temporary().remove(&INSPECT_CACHE);
}
