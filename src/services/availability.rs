//! Availability calculator
//!
//! Read-only capacity check: an item can satisfy a request iff it is not
//! administratively withdrawn and its total quantity minus everything
//! already committed to Approved, date-overlapping requests covers the
//! asked quantity.
//!
//! The check takes the caller's connection so it can run inside the same
//! transaction as the mutation that follows it; on its own it takes no
//! locks and has no side effects.

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::{
    error::AppResult,
    models::{enums::ItemStatus, item::ItemRow},
    repository::requests::RequestsRepository,
};

/// Half-open interval overlap: `[a_from, a_to)` and `[b_from, b_to)`
/// overlap iff `a_from < b_to && b_from < a_to`. Touching boundaries
/// (one window ending exactly where another starts) do not overlap.
pub fn ranges_overlap(
    a_from: NaiveDate,
    a_to: NaiveDate,
    b_from: NaiveDate,
    b_to: NaiveDate,
) -> bool {
    a_from < b_to && b_from < a_to
}

/// Whether `quantity` units of `item` are free over `[date_from, date_to)`.
///
/// An administratively withdrawn item (Retired, LostStolen, UnderRepair)
/// is never available, even with zero overlapping reservations. Derived
/// statuses (CheckedOut, Reserved) do not veto on their own: they mirror
/// approved reservations, and the overlap sum already accounts for those —
/// a blanket veto would make a fully-checked-out item impossible to
/// extend even when the added window is free. `exclude_request_id`
/// removes one request from the reserved sum, used when re-validating
/// that same request.
pub async fn is_available(
    conn: &mut PgConnection,
    item: &ItemRow,
    quantity: i32,
    date_from: NaiveDate,
    date_to: NaiveDate,
    exclude_request_id: Option<i32>,
) -> AppResult<bool> {
    if ItemStatus::from(item.status).is_administrative() {
        return Ok(false);
    }

    let reserved = RequestsRepository::reserved_quantity(
        conn,
        item.id,
        date_from,
        date_to,
        exclude_request_id,
    )
    .await?;

    Ok(item.total_quantity as i64 - reserved >= quantity as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn overlapping_ranges() {
        assert!(ranges_overlap(
            d("2024-06-01"),
            d("2024-06-05"),
            d("2024-06-02"),
            d("2024-06-03")
        ));
        assert!(ranges_overlap(
            d("2024-06-01"),
            d("2024-06-05"),
            d("2024-06-04"),
            d("2024-06-10")
        ));
        // identical ranges
        assert!(ranges_overlap(
            d("2024-06-01"),
            d("2024-06-05"),
            d("2024-06-01"),
            d("2024-06-05")
        ));
    }

    #[test]
    fn touching_boundaries_do_not_overlap() {
        assert!(!ranges_overlap(
            d("2024-06-01"),
            d("2024-06-05"),
            d("2024-06-05"),
            d("2024-06-10")
        ));
        assert!(!ranges_overlap(
            d("2024-06-05"),
            d("2024-06-10"),
            d("2024-06-01"),
            d("2024-06-05")
        ));
    }

    #[test]
    fn disjoint_ranges() {
        assert!(!ranges_overlap(
            d("2024-06-01"),
            d("2024-06-03"),
            d("2024-06-07"),
            d("2024-06-09")
        ));
    }
}
