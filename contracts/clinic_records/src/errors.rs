use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

pub const ERROR_LOG_KEY: Symbol = symbol_short!("ERR_LOG");
pub const ERROR_COUNT_KEY: Symbol = symbol_short!("ERR_CNT");
pub const MAX_ERROR_LOG_SIZE: u32 = 100;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Error categories for classifying failures.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Invalid input parameters, missing mandatory fields
    Validation = 1,
    /// Caller could not be resolved to a registered staff member
    Authentication = 2,
    /// Caller resolved but the permission rules deny the operation
    Authorization = 3,
    /// Patient / record / report lookup failures
    NotFound = 4,
    /// Duplicate registrations, lifecycle conflicts
    StateConflict = 5,
}

/// Severity levels indicating the impact of an error.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorSeverity {
    Low = 1,
    Medium = 2,
    High = 3,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorContext {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub user: Option<Address>,
    pub resource: Option<String>,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorLogEntry {
    pub error_code: u32,
    pub context: ErrorContext,
}

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Caller is not an active, registered staff member
    Unauthorized = 3,
    /// Caller is registered but the permission rules deny this operation
    Forbidden = 4,
    StaffNotFound = 5,
    PatientNotFound = 6,
    RecordNotFound = 7,
    ReportNotFound = 8,
    InvalidInput = 9,
    /// A visibility change or emergency hide was requested without a reason
    ReasonRequired = 10,
    StaffAlreadyRegistered = 11,
    /// The assignment target is not an active doctor
    NotADoctor = 12,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::NotInitialized
            | ContractError::InvalidInput
            | ContractError::ReasonRequired
            | ContractError::NotADoctor => ErrorCategory::Validation,
            ContractError::Unauthorized => ErrorCategory::Authentication,
            ContractError::Forbidden => ErrorCategory::Authorization,
            ContractError::StaffNotFound
            | ContractError::PatientNotFound
            | ContractError::RecordNotFound
            | ContractError::ReportNotFound => ErrorCategory::NotFound,
            ContractError::AlreadyInitialized | ContractError::StaffAlreadyRegistered => {
                ErrorCategory::StateConflict
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ContractError::NotInitialized
            | ContractError::InvalidInput
            | ContractError::ReasonRequired
            | ContractError::NotADoctor
            | ContractError::StaffNotFound
            | ContractError::PatientNotFound
            | ContractError::RecordNotFound
            | ContractError::ReportNotFound => ErrorSeverity::Low,
            ContractError::AlreadyInitialized | ContractError::StaffAlreadyRegistered => {
                ErrorSeverity::Medium
            }
            ContractError::Unauthorized | ContractError::Forbidden => ErrorSeverity::High,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "Contract has not been initialized",
            ContractError::AlreadyInitialized => "Contract is already initialized",
            ContractError::Unauthorized => "Caller is not registered clinic staff",
            ContractError::Forbidden => "Caller may not perform this operation",
            ContractError::StaffNotFound => "Staff member not found",
            ContractError::PatientNotFound => "Patient not found",
            ContractError::RecordNotFound => "Record not found",
            ContractError::ReportNotFound => "Report not found",
            ContractError::InvalidInput => "Invalid input parameters provided",
            ContractError::ReasonRequired => "A non-empty reason is required",
            ContractError::StaffAlreadyRegistered => "Staff member is already registered",
            ContractError::NotADoctor => "Target is not an active doctor",
        }
    }
}

/// Records an error in the contract's local error log. The log is the
/// landing place for failures that must not propagate (audit writes are
/// best-effort) and is capped at the most recent 100 entries.
pub fn log_error(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource: Option<String>,
) {
    let log_entry = ErrorLogEntry {
        error_code: error as u32,
        context: create_error_context(env, error, user, resource),
    };

    let mut error_log: Vec<ErrorLogEntry> = env
        .storage()
        .instance()
        .get(&ERROR_LOG_KEY)
        .unwrap_or(Vec::new(env));

    error_log.push_back(log_entry);

    if error_log.len() > MAX_ERROR_LOG_SIZE {
        let mut trimmed = Vec::new(env);
        for i in 1..error_log.len() {
            if let Some(entry) = error_log.get(i) {
                trimmed.push_back(entry);
            }
        }
        error_log = trimmed;
    }

    env.storage().instance().set(&ERROR_LOG_KEY, &error_log);

    let error_count: u64 = env.storage().instance().get(&ERROR_COUNT_KEY).unwrap_or(0);
    env.storage()
        .instance()
        .set(&ERROR_COUNT_KEY, &error_count.saturating_add(1));

    extend_ttl_instance(env);
}

/// Returns the retained error log (most recent 100 entries).
pub fn get_error_log(env: &Env) -> Vec<ErrorLogEntry> {
    env.storage()
        .instance()
        .get(&ERROR_LOG_KEY)
        .unwrap_or(Vec::new(env))
}

/// Total count of errors logged since initialization; survives log trimming.
pub fn get_error_count(env: &Env) -> u64 {
    env.storage().instance().get(&ERROR_COUNT_KEY).unwrap_or(0)
}

/// Builds an [`ErrorContext`] with the category/severity/message derived
/// from the error itself.
pub fn create_error_context(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource: Option<String>,
) -> ErrorContext {
    ErrorContext {
        category: error.category(),
        severity: error.severity(),
        message: String::from_str(env, error.message()),
        user,
        resource,
        timestamp: env.ledger().timestamp(),
    }
}
