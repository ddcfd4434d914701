//! Activity log model
//!
//! Every console write leaves one entry at `activityLogs/{id}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Activity type, used for filtering the log view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Auth,
    User,
    Branch,
    Employee,
    Payroll,
    Inventory,
    Customer,
    Settings,
    Backup,
    System,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::User => "user",
            Self::Branch => "branch",
            Self::Employee => "employee",
            Self::Payroll => "payroll",
            Self::Inventory => "inventory",
            Self::Customer => "customer",
            Self::Settings => "settings",
            Self::Backup => "backup",
            Self::System => "system",
        }
    }
}

/// Action recorded in the activity log (closed set, not free text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    // ═══ Auth ═══
    Login,

    // ═══ Console users ═══
    UserCreated,
    UserUpdated,
    UserStatusChanged,
    UserDeleted,

    // ═══ Branches ═══
    BranchCreated,
    BranchUpdated,
    BranchDeleted,

    // ═══ Employees / payroll ═══
    EmployeeCreated,
    EmployeeUpdated,
    EmployeeDeleted,
    SalaryRecorded,
    SalaryDeleted,

    // ═══ Inventory ═══
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    StockAdjusted,

    // ═══ Customers ═══
    CustomerCreated,
    CustomerUpdated,
    CustomerDeleted,

    // ═══ Settings / backups / maintenance ═══
    SettingsUpdated,
    BackupCreated,
    BackupRestored,
    BackupDeleted,
    ActivityCleared,
}

impl ActivityAction {
    pub fn activity_type(&self) -> ActivityType {
        use ActivityAction::*;
        match self {
            Login => ActivityType::Auth,
            UserCreated | UserUpdated | UserStatusChanged | UserDeleted => ActivityType::User,
            BranchCreated | BranchUpdated | BranchDeleted => ActivityType::Branch,
            EmployeeCreated | EmployeeUpdated | EmployeeDeleted => ActivityType::Employee,
            SalaryRecorded | SalaryDeleted => ActivityType::Payroll,
            ProductCreated | ProductUpdated | ProductDeleted | StockAdjusted => {
                ActivityType::Inventory
            }
            CustomerCreated | CustomerUpdated | CustomerDeleted => ActivityType::Customer,
            SettingsUpdated => ActivityType::Settings,
            BackupCreated | BackupRestored | BackupDeleted => ActivityType::Backup,
            ActivityCleared => ActivityType::System,
        }
    }

    /// Human label for the log table
    pub fn label(&self) -> &'static str {
        use ActivityAction::*;
        match self {
            Login => "Signed in",
            UserCreated => "Created user",
            UserUpdated => "Updated user",
            UserStatusChanged => "Changed user status",
            UserDeleted => "Deleted user",
            BranchCreated => "Created branch",
            BranchUpdated => "Updated branch",
            BranchDeleted => "Deleted branch",
            EmployeeCreated => "Created employee",
            EmployeeUpdated => "Updated employee",
            EmployeeDeleted => "Deleted employee",
            SalaryRecorded => "Recorded salary",
            SalaryDeleted => "Deleted salary record",
            ProductCreated => "Created product",
            ProductUpdated => "Updated product",
            ProductDeleted => "Deleted product",
            StockAdjusted => "Adjusted stock",
            CustomerCreated => "Created customer",
            CustomerUpdated => "Updated customer",
            CustomerDeleted => "Deleted customer",
            SettingsUpdated => "Updated settings",
            BackupCreated => "Created backup",
            BackupRestored => "Restored backup",
            BackupDeleted => "Deleted backup",
            ActivityCleared => "Cleared activity log",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    pub action: ActivityAction,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    /// Id of the record acted on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&ActivityAction::StockAdjusted).unwrap();
        assert_eq!(json, "\"stock_adjusted\"");
    }

    #[test]
    fn test_action_type_mapping() {
        assert_eq!(ActivityAction::Login.activity_type(), ActivityType::Auth);
        assert_eq!(
            ActivityAction::SalaryRecorded.activity_type(),
            ActivityType::Payroll
        );
        assert_eq!(
            ActivityAction::BackupRestored.activity_type(),
            ActivityType::Backup
        );
        assert_eq!(
            ActivityAction::StockAdjusted.activity_type(),
            ActivityType::Inventory
        );
    }
}
