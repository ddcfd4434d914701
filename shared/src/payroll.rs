//! Payroll arithmetic
//!
//! All amounts are computed in `Decimal` and converted back to `f64` rounded to 2 decimal
//! places (half away from zero) for storage.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::validation::validate_non_negative;

const DECIMAL_PLACES: u32 = 2;

#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

fn decimal_commission(sales_amount: Decimal, commission_rate: Decimal) -> Decimal {
    sales_amount * commission_rate / Decimal::ONE_HUNDRED
}

/// `sales_amount × commission_rate / 100`, rounded to cents
pub fn commission(sales_amount: f64, commission_rate: f64) -> f64 {
    to_f64(decimal_commission(
        to_decimal(sales_amount),
        to_decimal(commission_rate),
    ))
}

/// `base + commission + allowance − deduction`, rounded to cents
pub fn net_salary(base: f64, commission: f64, allowance: f64, deduction: f64) -> f64 {
    to_f64(
        to_decimal(base) + to_decimal(commission) + to_decimal(allowance) - to_decimal(deduction),
    )
}

/// Inputs for one month of pay
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PayrollInput {
    pub base_salary: f64,
    pub sales_amount: f64,
    pub commission_rate: f64,
    pub allowance: f64,
    pub deduction: f64,
}

/// Computed pay, as previewed and as stored on the salary record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    pub base_salary: f64,
    pub sales_amount: f64,
    pub commission_rate: f64,
    pub commission: f64,
    pub allowance: f64,
    pub deduction: f64,
    pub net_salary: f64,
}

pub fn validate_input(input: &PayrollInput) -> AppResult<()> {
    validate_non_negative(input.base_salary, "baseSalary")?;
    validate_non_negative(input.sales_amount, "salesAmount")?;
    validate_non_negative(input.allowance, "allowance")?;
    validate_non_negative(input.deduction, "deduction")?;
    if !input.commission_rate.is_finite() || !(0.0..=100.0).contains(&input.commission_rate) {
        return Err(AppError::new(ErrorCode::InvalidCommissionRate)
            .with_detail("field", "commissionRate")
            .with_detail("value", input.commission_rate.to_string()));
    }
    Ok(())
}

/// Validate and compute one month of pay.
///
/// The net is derived from the rounded commission so the stored parts always add up.
pub fn compute(input: &PayrollInput) -> AppResult<SalaryBreakdown> {
    validate_input(input)?;

    let base = to_decimal(input.base_salary);
    let allowance = to_decimal(input.allowance);
    let deduction = to_decimal(input.deduction);
    let commission = decimal_commission(
        to_decimal(input.sales_amount),
        to_decimal(input.commission_rate),
    )
    .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let net = base + commission + allowance - deduction;

    Ok(SalaryBreakdown {
        base_salary: to_f64(base),
        sales_amount: to_f64(to_decimal(input.sales_amount)),
        commission_rate: input.commission_rate,
        commission: to_f64(commission),
        allowance: to_f64(allowance),
        deduction: to_f64(deduction),
        net_salary: to_f64(net),
    })
}

/// Pay periods are calendar months
pub fn validate_period(month: u32, year: i32) -> AppResult<()> {
    if !(1..=12).contains(&month) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPayPeriod,
            format!("Month must be between 1 and 12, got {month}"),
        )
        .with_detail("field", "month"));
    }
    if !(2000..=9999).contains(&year) {
        return Err(AppError::with_message(
            ErrorCode::InvalidPayPeriod,
            format!("Year {year} is out of range"),
        )
        .with_detail("field", "year"));
    }
    Ok(())
}

/// `[start, end)` of a pay period in epoch millis (UTC)
pub fn period_bounds(month: u32, year: i32) -> AppResult<(i64, i64)> {
    validate_period(month, year)?;
    let start = chrono::NaiveDate::from_ymd_opt(year, month, 1);
    let end = if month == 12 {
        chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        chrono::NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let millis = |date: Option<chrono::NaiveDate>| {
        date.and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
            .ok_or_else(|| AppError::new(ErrorCode::InvalidPayPeriod))
    };
    Ok((millis(start)?, millis(end)?))
}
