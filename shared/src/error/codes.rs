//! Unified error codes for the POS admin console
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Backup errors
//! - 4xxx: Inventory errors
//! - 5xxx: Customer / invoice errors
//! - 6xxx: Payroll errors
//! - 7xxx: Branch errors
//! - 8xxx: Staff errors (employees, console users)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the console frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Too many sign-in attempts
    TooManyAttempts = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot disable or delete the signed-in account
    CannotModifySelf = 2006,

    // ==================== 3xxx: Backup ====================
    /// Backup record not found
    BackupNotFound = 3001,
    /// No data category selected
    BackupEmptySelection = 3002,
    /// Backup file could not be parsed
    BackupFileInvalid = 3003,
    /// Upload of the backup file failed
    BackupUploadFailed = 3004,
    /// Download of the backup file failed
    BackupDownloadFailed = 3005,

    // ==================== 4xxx: Inventory ====================
    /// Product not found
    ProductNotFound = 4001,
    /// Product has invalid price
    ProductInvalidPrice = 4002,
    /// Stock would become negative
    InsufficientStock = 4003,
    /// Product SKU already used
    ProductSkuExists = 4004,

    // ==================== 5xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 5001,
    /// Invoice not found
    InvoiceNotFound = 5101,

    // ==================== 6xxx: Payroll ====================
    /// Salary record not found
    SalaryNotFound = 6001,
    /// Salary already recorded for the period
    SalaryAlreadyRecorded = 6002,
    /// Month/year out of range
    InvalidPayPeriod = 6003,
    /// Commission rate outside 0..=100
    InvalidCommissionRate = 6004,

    // ==================== 7xxx: Branch ====================
    /// Branch not found
    BranchNotFound = 7001,
    /// Branch still has employees
    BranchHasEmployees = 7002,

    // ==================== 8xxx: Staff ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Console user not found
    UserNotFound = 8101,
    /// Username already taken
    UsernameExists = 8102,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Hosted database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Hosted file storage error
    StorageError = 9006,
}

impl ErrorCode {
    /// Numeric wire value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::TooManyAttempts => "Too many attempts, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifySelf => "Cannot disable or delete your own account",

            // Backup
            ErrorCode::BackupNotFound => "Backup not found",
            ErrorCode::BackupEmptySelection => "Select at least one data category",
            ErrorCode::BackupFileInvalid => "Backup file is invalid",
            ErrorCode::BackupUploadFailed => "Failed to upload backup file",
            ErrorCode::BackupDownloadFailed => "Failed to download backup file",

            // Inventory
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ProductSkuExists => "Product SKU already exists",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::InvoiceNotFound => "Invoice not found",

            // Payroll
            ErrorCode::SalaryNotFound => "Salary record not found",
            ErrorCode::SalaryAlreadyRecorded => "Salary already recorded for this period",
            ErrorCode::InvalidPayPeriod => "Invalid pay period",
            ErrorCode::InvalidCommissionRate => "Commission rate must be between 0 and 100",

            // Branch
            ErrorCode::BranchNotFound => "Branch not found",
            ErrorCode::BranchHasEmployees => "Branch still has assigned employees",

            // Staff
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageError => "File storage error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not map to any [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::CannotModifySelf),

            // Backup
            3001 => Ok(ErrorCode::BackupNotFound),
            3002 => Ok(ErrorCode::BackupEmptySelection),
            3003 => Ok(ErrorCode::BackupFileInvalid),
            3004 => Ok(ErrorCode::BackupUploadFailed),
            3005 => Ok(ErrorCode::BackupDownloadFailed),

            // Inventory
            4001 => Ok(ErrorCode::ProductNotFound),
            4002 => Ok(ErrorCode::ProductInvalidPrice),
            4003 => Ok(ErrorCode::InsufficientStock),
            4004 => Ok(ErrorCode::ProductSkuExists),

            // Customer
            5001 => Ok(ErrorCode::CustomerNotFound),
            5101 => Ok(ErrorCode::InvoiceNotFound),

            // Payroll
            6001 => Ok(ErrorCode::SalaryNotFound),
            6002 => Ok(ErrorCode::SalaryAlreadyRecorded),
            6003 => Ok(ErrorCode::InvalidPayPeriod),
            6004 => Ok(ErrorCode::InvalidCommissionRate),

            // Branch
            7001 => Ok(ErrorCode::BranchNotFound),
            7002 => Ok(ErrorCode::BranchHasEmployees),

            // Staff
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8101 => Ok(ErrorCode::UserNotFound),
            8102 => Ok(ErrorCode::UsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::BackupNotFound.code(), 3001);
        assert_eq!(ErrorCode::SalaryAlreadyRecorded.code(), 6002);
        assert_eq!(ErrorCode::StorageError.code(), 9006);
    }

    #[test]
    fn test_try_from_round_trip() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::AccountDisabled,
            ErrorCode::CannotModifySelf,
            ErrorCode::BackupFileInvalid,
            ErrorCode::InsufficientStock,
            ErrorCode::InvoiceNotFound,
            ErrorCode::InvalidCommissionRate,
            ErrorCode::BranchHasEmployees,
            ErrorCode::UsernameExists,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::ProductNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("7002").unwrap();
        assert_eq!(code, ErrorCode::BranchHasEmployees);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::InternalError.to_string(), "E9001");
    }
}
