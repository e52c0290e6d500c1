use soroban_sdk::contracttype;

/// Hard ceiling for patient/record/report pages.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Hard ceiling for audit pages, which are read by reviewers in bulk.
pub const MAX_AUDIT_PAGE_SIZE: u32 = 100;

/// A clamped pagination window. Pages are 1-based.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
pub struct Page {
    pub number: u32,
    pub limit: u32,
}

impl Page {
    /// Clamps the requested page/limit into a safe window: page >= 1,
    /// 1 <= limit <= `max`.
    pub fn clamped(number: u32, limit: u32, max: u32) -> Self {
        Self {
            number: number.max(1),
            limit: limit.clamp(1, max),
        }
    }

    /// Number of items to skip before this page starts.
    pub fn skip(&self) -> u32 {
        (self.number - 1).saturating_mul(self.limit)
    }
}
