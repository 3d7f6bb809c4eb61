//! Delivery & Financial Statistics
//!
//! Read-only aggregation over calendar-month creation windows.

use crate::db::repository::{shipment, RepoError, RepoResult};
use chrono::Datelike;
use shared::models::{DeliveryStats, MonthlyFinancials};
use sqlx::SqlitePool;

/// `[start, end)` of a calendar month as millisecond UTC timestamps
fn month_window(year: i32, month: u32) -> RepoResult<(i64, i64)> {
    let start = chrono::NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| RepoError::Validation(format!("Invalid month: {month:02}.{year}")))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = chrono::NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| RepoError::Validation(format!("Invalid month: {month:02}.{year}")))?;
    Ok((
        start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis(),
        end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis(),
    ))
}

/// Delivery statistics for shipments created in one calendar month
pub async fn delivery_statistics(
    pool: &SqlitePool,
    month: u32,
    year: i32,
) -> RepoResult<DeliveryStats> {
    let (start, end) = month_window(year, month)?;
    shipment::delivery_statistics(pool, start, end).await
}

/// Financial summary for the trailing `months` calendar months, newest
/// first (the current month is index 0)
pub async fn financial_summary(
    pool: &SqlitePool,
    months: u32,
) -> RepoResult<Vec<MonthlyFinancials>> {
    let today = chrono::Utc::now().date_naive();
    let mut year = today.year();
    let mut month = today.month();

    let mut summary = Vec::with_capacity(months as usize);
    for _ in 0..months {
        let (start, end) = month_window(year, month)?;
        let totals = shipment::financial_totals(pool, start, end).await?;

        // Empty window yields average 0, not an error
        let average_value = if totals.shipment_count > 0 {
            totals.total_value / totals.shipment_count as f64
        } else {
            0.0
        };
        summary.push(MonthlyFinancials {
            period: format!("{month:02}.{year}"),
            total_value: totals.total_value,
            total_quantity: totals.total_quantity,
            shipment_count: totals.shipment_count,
            average_value,
        });

        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    Ok(summary)
}
