//! Store-wide settings (single object at `settings`)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub store_name: String,
    pub currency: String,
    pub currency_symbol: String,
    /// Percentage
    pub tax_rate: f64,
    pub receipt_footer: String,
    /// Default `minStock` for new products
    pub low_stock_threshold: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_name: "My Store".to_string(),
            currency: "USD".to_string(),
            currency_symbol: "$".to_string(),
            tax_rate: 0.0,
            receipt_footer: String::new(),
            low_stock_threshold: 5,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
}
