//! Backup history records and category selection

use serde::{Deserialize, Serialize};

/// Data category that can be exported into a backup file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupCategory {
    Products,
    Customers,
    Invoices,
    Settings,
    Users,
}

impl BackupCategory {
    pub const ALL: [BackupCategory; 5] = [
        Self::Products,
        Self::Customers,
        Self::Invoices,
        Self::Settings,
        Self::Users,
    ];

    /// Hosted-database path of the subtree; also the key inside the backup file
    pub fn path(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Customers => "customers",
            Self::Invoices => "invoices",
            Self::Settings => "settings",
            Self::Users => "users",
        }
    }

    /// Collections hold keyed records; `settings` is a single object
    pub fn is_collection(&self) -> bool {
        !matches!(self, Self::Settings)
    }
}

/// Boolean flags picking the categories of a backup or restore
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSelection {
    pub products: bool,
    pub customers: bool,
    pub invoices: bool,
    pub settings: bool,
    pub users: bool,
}

impl BackupSelection {
    pub fn all() -> Self {
        Self {
            products: true,
            customers: true,
            invoices: true,
            settings: true,
            users: true,
        }
    }

    pub fn only(category: BackupCategory) -> Self {
        let mut selection = Self::default();
        match category {
            BackupCategory::Products => selection.products = true,
            BackupCategory::Customers => selection.customers = true,
            BackupCategory::Invoices => selection.invoices = true,
            BackupCategory::Settings => selection.settings = true,
            BackupCategory::Users => selection.users = true,
        }
        selection
    }

    pub fn includes(&self, category: BackupCategory) -> bool {
        match category {
            BackupCategory::Products => self.products,
            BackupCategory::Customers => self.customers,
            BackupCategory::Invoices => self.invoices,
            BackupCategory::Settings => self.settings,
            BackupCategory::Users => self.users,
        }
    }

    /// Selected categories in canonical order
    pub fn categories(&self) -> Vec<BackupCategory> {
        BackupCategory::ALL
            .into_iter()
            .filter(|c| self.includes(*c))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    #[default]
    Manual,
    Auto,
}

/// History entry at `backups/{id}` describing one uploaded backup file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub id: String,
    pub name: String,
    /// Object path inside the hosted file storage
    pub path: String,
    /// Download URL
    pub url: String,
    pub timestamp: i64,
    /// Byte length of the serialized payload
    pub size: u64,
    /// Username that created the backup (`system` for auto backups)
    pub user: String,
    #[serde(rename = "type", default)]
    pub kind: BackupKind,
    #[serde(default)]
    pub categories: Vec<BackupCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupCreate {
    pub name: String,
    #[serde(default)]
    pub selection: BackupSelection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreRequest {
    #[serde(default)]
    pub selection: BackupSelection,
}

/// Outcome of a restore: categories written back and selected ones missing from the file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestoreReport {
    pub restored: Vec<BackupCategory>,
    pub skipped: Vec<BackupCategory>,
}
