//! Salary (payroll) records

use serde::{Deserialize, Serialize};

/// One paid month for one employee, stored at `salaries/{id}`
///
/// `net_salary == base_salary + commission + allowance - deduction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    pub id: String,
    pub employee_id: String,
    #[serde(default)]
    pub employee_name: String,
    pub month: u32,
    pub year: i32,
    pub base_salary: f64,
    #[serde(default)]
    pub sales_amount: f64,
    #[serde(default)]
    pub commission_rate: f64,
    pub commission: f64,
    pub allowance: f64,
    pub deduction: f64,
    pub net_salary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub created_by: String,
}

/// Payroll request for one employee and month.
///
/// Missing `sales_amount` is derived from the employee's invoices in that month,
/// missing `allowance` falls back to the employee's standing allowance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRequest {
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub sales_amount: Option<f64>,
    #[serde(default)]
    pub allowance: Option<f64>,
    #[serde(default)]
    pub deduction: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
}
