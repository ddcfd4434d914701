//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Backup errors
/// - 4xxx: Inventory errors
/// - 5xxx: Customer errors
/// - 6xxx: Payroll errors
/// - 7xxx: Branch errors
/// - 8xxx: Staff errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Backup errors (3xxx)
    Backup,
    /// Inventory errors (4xxx)
    Inventory,
    /// Customer errors (5xxx)
    Customer,
    /// Payroll errors (6xxx)
    Payroll,
    /// Branch errors (7xxx)
    Branch,
    /// Staff errors (8xxx)
    Staff,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Backup,
            4000..5000 => Self::Inventory,
            5000..6000 => Self::Customer,
            6000..7000 => Self::Payroll,
            7000..8000 => Self::Branch,
            8000..9000 => Self::Staff,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Backup => "backup",
            Self::Inventory => "inventory",
            Self::Customer => "customer",
            Self::Payroll => "payroll",
            Self::Branch => "branch",
            Self::Staff => "staff",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
