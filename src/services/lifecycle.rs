//! Borrow request lifecycle engine
//!
//! Owns the request state machine (`Pending -> Approved/Declined/Cancelled`,
//! `Approved -> Returned/Cancelled/Approved(extended)`) and keeps item stock
//! consistent with approved reservations.
//!
//! Every inventory-touching transition runs inside one transaction that
//! first locks the item row (`SELECT ... FOR UPDATE`), then re-validates
//! availability, then mutates and appends history. Two concurrent approvals
//! against the same capacity therefore serialize: the second re-check sees
//! the first commit and fails with `Unavailable`.

use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{HistoryAction, ItemStatus, RequestStatus, Role, Sensitivity},
        item::ItemRow,
        request::{BorrowRequestRow, SubmitRequest},
    },
    repository::{
        history::HistoryRepository, items::ItemsRepository, requests::RequestsRepository,
        Repository,
    },
    services::availability,
};

#[derive(Clone)]
pub struct LifecycleService {
    repository: Repository,
    max_conflict_retries: u32,
}

/// Status an item falls back to from a quantity change. Administrative
/// statuses (Retired, LostStolen, UnderRepair) are never overridden here.
fn derive_status(current: ItemStatus, free_quantity: i32) -> ItemStatus {
    if current.is_administrative() {
        return current;
    }
    if free_quantity == 0 {
        ItemStatus::CheckedOut
    } else {
        ItemStatus::Available
    }
}

/// Reject malformed submissions before touching any transaction
fn validate_submit(submit: &SubmitRequest, today: NaiveDate) -> AppResult<()> {
    if submit.quantity <= 0 {
        return Err(AppError::Validation("Quantity must be positive".to_string()));
    }
    if submit.date_to <= submit.date_from {
        return Err(AppError::Validation(
            "date_to must be after date_from".to_string(),
        ));
    }
    if submit.date_from < today {
        return Err(AppError::Validation(
            "date_from must not be in the past".to_string(),
        ));
    }
    if submit.purpose.trim().is_empty() {
        return Err(AppError::Validation("Purpose must not be empty".to_string()));
    }
    Ok(())
}

impl LifecycleService {
    pub fn new(repository: Repository, max_conflict_retries: u32) -> Self {
        Self {
            repository,
            max_conflict_retries,
        }
    }

    /// Submit a new borrow request.
    ///
    /// Checks availability against currently-Approved reservations but
    /// takes no hold: two Pending requests may both pass here, and the
    /// loser surfaces at approval time. No inventory mutation.
    pub async fn submit(
        &self,
        requester_id: i32,
        submit: SubmitRequest,
    ) -> AppResult<BorrowRequestRow> {
        validate_submit(&submit, Utc::now().date_naive())?;

        let item = self.repository.items.get_by_id(submit.item_id).await?;

        let mut conn = self.repository.pool.acquire().await?;
        let available = availability::is_available(
            &mut conn,
            &item,
            submit.quantity,
            submit.date_from,
            submit.date_to,
            None,
        )
        .await?;
        if !available {
            return Err(AppError::Unavailable(format!(
                "Item {} cannot cover {} unit(s) over the requested window",
                item.id, submit.quantity
            )));
        }

        let request = self.repository.requests.create(requester_id, &submit).await?;
        tracing::info!(
            request_id = request.id,
            item_id = item.id,
            quantity = submit.quantity,
            "Borrow request submitted"
        );
        Ok(request)
    }

    /// Approve a pending request.
    ///
    /// Availability is re-checked under the item row lock; if the window
    /// has already started the item's free stock is reduced immediately,
    /// otherwise only the reservation restricts future availability.
    pub async fn approve(&self, request_id: i32, approver_id: i32, role: Role) -> AppResult<()> {
        if !role.is_admin() {
            return Err(AppError::InsufficientPrivilege(
                "Approving requests requires admin authority".to_string(),
            ));
        }
        self.with_conflict_retry(|| self.approve_once(request_id, approver_id, role))
            .await
    }

    async fn approve_once(&self, request_id: i32, approver_id: i32, role: Role) -> AppResult<()> {
        // Pool-side fetch only resolves the item id; state is re-read
        // under the lock.
        let request = self.repository.requests.get_by_id(request_id).await?;

        let mut tx = self.repository.pool.begin().await?;
        let item = ItemsRepository::get_for_update(&mut tx, request.item_id).await?;
        let request = RequestsRepository::get_in_tx(&mut tx, request_id).await?;

        if request.status() != RequestStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {}, only Pending requests can be approved",
                request_id,
                request.status()
            )));
        }

        if Sensitivity::from(item.sensitivity).requires_elevation() && role != Role::SuperAdmin {
            return Err(AppError::InsufficientPrivilege(format!(
                "Item {} is sensitive, approval requires super-admin authority",
                item.id
            )));
        }

        let available = availability::is_available(
            &mut tx,
            &item,
            request.quantity,
            request.date_from,
            request.date_to,
            Some(request_id),
        )
        .await?;
        if !available {
            return Err(AppError::Unavailable(format!(
                "Item {} no longer has {} unit(s) free over the requested window",
                item.id, request.quantity
            )));
        }

        let now = Utc::now();
        let today = now.date_naive();
        let checks_out_now = request.date_from <= today;

        if checks_out_now {
            // The overlap sum only covers reservations whose windows
            // intersect this one; units still held by an overdue request
            // are invisible to it but absent from physical stock.
            if item.free_quantity < request.quantity {
                return Err(AppError::Unavailable(format!(
                    "Item {} has only {} unit(s) physically in stock",
                    item.id, item.free_quantity
                )));
            }
            let new_free = item.free_quantity - request.quantity;
            let new_status = derive_status(ItemStatus::from(item.status), new_free);
            let updated = ItemsRepository::update_free_quantity(
                &mut tx,
                item.id,
                new_free,
                i16::from(new_status),
            )
            .await?;

            HistoryRepository::append(
                &mut tx,
                item.id,
                Some(approver_id),
                HistoryAction::RequestApproved,
                Some(&item.free_quantity.to_string()),
                Some(&new_free.to_string()),
                Some(&format!(
                    "Request {} approved, {} unit(s) checked out",
                    request_id, request.quantity
                )),
            )
            .await?;

            if updated.free_quantity <= updated.low_stock_threshold {
                tracing::warn!(
                    item_id = item.id,
                    free_quantity = updated.free_quantity,
                    threshold = updated.low_stock_threshold,
                    "Item stock at or below low-stock threshold"
                );
            }
        } else {
            HistoryRepository::append(
                &mut tx,
                item.id,
                Some(approver_id),
                HistoryAction::RequestApproved,
                None,
                None,
                Some(&format!(
                    "Request {} approved, {} unit(s) reserved from {}",
                    request_id, request.quantity, request.date_from
                )),
            )
            .await?;
        }

        RequestsRepository::mark_approved(&mut tx, request_id, approver_id, now, checks_out_now)
            .await?;
        tx.commit().await?;

        tracing::info!(
            request_id,
            approver_id,
            checked_out = checks_out_now,
            "Borrow request approved"
        );
        Ok(())
    }

    /// Decline a pending request. No inventory mutation; the status write
    /// is guarded so a concurrent approval cannot be overwritten.
    pub async fn decline(
        &self,
        request_id: i32,
        approver_id: i32,
        role: Role,
        reason: &str,
    ) -> AppResult<()> {
        if !role.is_admin() {
            return Err(AppError::InsufficientPrivilege(
                "Declining requests requires admin authority".to_string(),
            ));
        }
        if reason.trim().is_empty() {
            return Err(AppError::Validation(
                "Decline reason must not be empty".to_string(),
            ));
        }

        let request = self.repository.requests.get_by_id(request_id).await?;
        if !request.status().can_transition_to(RequestStatus::Declined) {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {}, only Pending requests can be declined",
                request_id,
                request.status()
            )));
        }

        let declined = self
            .repository
            .requests
            .mark_declined(request_id, approver_id, reason)
            .await?;
        if !declined {
            return Err(AppError::InvalidTransition(format!(
                "Request {} changed state concurrently",
                request_id
            )));
        }

        tracing::info!(request_id, approver_id, "Borrow request declined");
        Ok(())
    }

    /// Return an approved request's units to stock
    pub async fn return_request(
        &self,
        request_id: i32,
        actor_id: i32,
        role: Role,
        condition: Option<&str>,
        notes: Option<&str>,
    ) -> AppResult<()> {
        self.with_conflict_retry(|| {
            self.return_once(request_id, actor_id, role, condition, notes)
        })
        .await
    }

    async fn return_once(
        &self,
        request_id: i32,
        actor_id: i32,
        role: Role,
        condition: Option<&str>,
        notes: Option<&str>,
    ) -> AppResult<()> {
        let request = self.repository.requests.get_by_id(request_id).await?;

        if !role.is_admin() && request.requester_id != actor_id {
            return Err(AppError::InsufficientPrivilege(
                "Only the requester or an admin may return this request".to_string(),
            ));
        }

        let mut tx = self.repository.pool.begin().await?;
        let item = ItemsRepository::get_for_update(&mut tx, request.item_id).await?;
        let request = RequestsRepository::get_in_tx(&mut tx, request_id).await?;

        if !request.status().can_transition_to(RequestStatus::Returned) {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {}, only Approved requests can be returned",
                request_id,
                request.status()
            )));
        }

        self.restore_stock(
            &mut tx,
            &item,
            &request,
            actor_id,
            HistoryAction::RequestReturned,
            notes,
        )
        .await?;

        if let Some(condition) = condition {
            ItemsRepository::update_condition_notes(&mut tx, item.id, condition).await?;
            HistoryRepository::append(
                &mut tx,
                item.id,
                Some(actor_id),
                HistoryAction::ConditionUpdated,
                item.condition_notes.as_deref(),
                Some(condition),
                None,
            )
            .await?;
        }

        RequestsRepository::mark_returned(&mut tx, request_id, Utc::now(), condition).await?;
        tx.commit().await?;

        tracing::info!(request_id, actor_id, "Borrow request returned");
        Ok(())
    }

    /// Cancel a request. Requesters may cancel their own Pending requests;
    /// admins may also cancel Approved ones, which restores stock exactly
    /// like a return.
    pub async fn cancel(&self, request_id: i32, actor_id: i32, role: Role) -> AppResult<()> {
        self.with_conflict_retry(|| self.cancel_once(request_id, actor_id, role))
            .await
    }

    async fn cancel_once(&self, request_id: i32, actor_id: i32, role: Role) -> AppResult<()> {
        let request = self.repository.requests.get_by_id(request_id).await?;

        let mut tx = self.repository.pool.begin().await?;
        let item = ItemsRepository::get_for_update(&mut tx, request.item_id).await?;
        let request = RequestsRepository::get_in_tx(&mut tx, request_id).await?;

        match request.status() {
            RequestStatus::Pending => {
                if request.requester_id != actor_id && !role.is_admin() {
                    return Err(AppError::InsufficientPrivilege(
                        "Only the requester or an admin may cancel this request".to_string(),
                    ));
                }
            }
            RequestStatus::Approved => {
                if !role.is_admin() {
                    return Err(AppError::InsufficientPrivilege(
                        "Cancelling an approved request requires admin authority".to_string(),
                    ));
                }
            }
            other => {
                return Err(AppError::InvalidTransition(format!(
                    "Request {} is {}, it can no longer be cancelled",
                    request_id, other
                )));
            }
        }

        // An approved request that already reduced stock must give it
        // back, exactly as a return would
        if request.status() == RequestStatus::Approved {
            self.restore_stock(
                &mut tx,
                &item,
                &request,
                actor_id,
                HistoryAction::RequestCancelled,
                None,
            )
            .await?;
        }

        RequestsRepository::mark_cancelled(&mut tx, request_id).await?;
        tx.commit().await?;

        tracing::info!(request_id, actor_id, "Borrow request cancelled");
        Ok(())
    }

    /// Extend an approved request's window. Only the delta
    /// `[old date_to, new date_to)` is checked for conflicts.
    pub async fn extend(
        &self,
        request_id: i32,
        approver_id: i32,
        role: Role,
        new_date_to: NaiveDate,
    ) -> AppResult<()> {
        if !role.is_admin() {
            return Err(AppError::InsufficientPrivilege(
                "Extending requests requires admin authority".to_string(),
            ));
        }
        self.with_conflict_retry(|| self.extend_once(request_id, approver_id, new_date_to))
            .await
    }

    async fn extend_once(
        &self,
        request_id: i32,
        approver_id: i32,
        new_date_to: NaiveDate,
    ) -> AppResult<()> {
        let request = self.repository.requests.get_by_id(request_id).await?;

        let mut tx = self.repository.pool.begin().await?;
        let item = ItemsRepository::get_for_update(&mut tx, request.item_id).await?;
        let request = RequestsRepository::get_in_tx(&mut tx, request_id).await?;

        if request.status() != RequestStatus::Approved {
            return Err(AppError::InvalidTransition(format!(
                "Request {} is {}, only Approved requests can be extended",
                request_id,
                request.status()
            )));
        }
        if new_date_to <= request.date_to {
            return Err(AppError::Validation(
                "new_date_to must be after the current date_to".to_string(),
            ));
        }

        // The original window is already held by this request; only the
        // added tail can conflict with other reservations.
        let available = availability::is_available(
            &mut tx,
            &item,
            request.quantity,
            request.date_to,
            new_date_to,
            Some(request_id),
        )
        .await?;
        if !available {
            return Err(AppError::Unavailable(format!(
                "Item {} has no capacity between {} and {}",
                item.id, request.date_to, new_date_to
            )));
        }

        RequestsRepository::update_date_to(&mut tx, request_id, new_date_to).await?;
        HistoryRepository::append(
            &mut tx,
            item.id,
            Some(approver_id),
            HistoryAction::RequestExtended,
            Some(&request.date_to.to_string()),
            Some(&new_date_to.to_string()),
            Some(&format!("Request {} extended", request_id)),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(request_id, approver_id, %new_date_to, "Borrow request extended");
        Ok(())
    }

    /// Public availability probe, same computation the engine re-runs
    /// before committing an approval
    pub async fn check_availability(
        &self,
        item_id: i32,
        quantity: i32,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> AppResult<bool> {
        if quantity <= 0 {
            return Err(AppError::Validation("Quantity must be positive".to_string()));
        }
        if date_to <= date_from {
            return Err(AppError::Validation(
                "date_to must be after date_from".to_string(),
            ));
        }

        let item = self.repository.items.get_by_id(item_id).await?;
        let mut conn = self.repository.pool.acquire().await?;
        availability::is_available(&mut conn, &item, quantity, date_from, date_to, None).await
    }

    /// List a requester's own requests, newest first
    pub async fn list_for_requester(&self, requester_id: i32) -> AppResult<Vec<BorrowRequestRow>> {
        self.repository.requests.list_for_requester(requester_id).await
    }

    /// Get one request by id
    pub async fn get_request(&self, request_id: i32) -> AppResult<BorrowRequestRow> {
        self.repository.requests.get_by_id(request_id).await
    }

    /// Give a checked-out request's units back to the item's free stock
    /// and log the transition. Caller holds the item row lock.
    async fn restore_stock(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        item: &ItemRow,
        request: &BorrowRequestRow,
        actor_id: i32,
        action: HistoryAction,
        notes: Option<&str>,
    ) -> AppResult<()> {
        if !request.checked_out {
            HistoryRepository::append(
                &mut *tx,
                item.id,
                Some(actor_id),
                action,
                None,
                None,
                notes.or(Some("Reservation released, no stock movement")),
            )
            .await?;
            return Ok(());
        }

        let new_free = item.free_quantity + request.quantity;
        let new_status = derive_status(ItemStatus::from(item.status), new_free);
        ItemsRepository::update_free_quantity(&mut *tx, item.id, new_free, i16::from(new_status))
            .await?;

        HistoryRepository::append(
            &mut *tx,
            item.id,
            Some(actor_id),
            action,
            Some(&item.free_quantity.to_string()),
            Some(&new_free.to_string()),
            notes,
        )
        .await?;
        Ok(())
    }

    /// Run an operation, retrying bounded times on transaction
    /// serialization conflicts before surfacing them as Unavailable
    async fn with_conflict_retry<F, Fut>(&self, op: F) -> AppResult<()>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AppResult<()>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(e) if e.is_serialization_conflict() => {
                    if attempt >= self.max_conflict_retries {
                        return Err(AppError::Unavailable(
                            "Operation kept conflicting with concurrent transactions".to_string(),
                        ));
                    }
                    attempt += 1;
                    tracing::warn!(attempt, "Serialization conflict, retrying");
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(quantity: i32, from: &str, to: &str, purpose: &str) -> SubmitRequest {
        SubmitRequest {
            item_id: 1,
            quantity,
            date_from: from.parse().unwrap(),
            date_to: to.parse().unwrap(),
            purpose: purpose.to_string(),
        }
    }

    fn today() -> NaiveDate {
        "2024-06-01".parse().unwrap()
    }

    #[test]
    fn submit_validation_accepts_well_formed() {
        assert!(validate_submit(&submit(2, "2024-06-01", "2024-06-05", "field work"), today()).is_ok());
    }

    #[test]
    fn submit_validation_rejects_bad_quantity() {
        assert!(matches!(
            validate_submit(&submit(0, "2024-06-01", "2024-06-05", "x"), today()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_submit(&submit(-3, "2024-06-01", "2024-06-05", "x"), today()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn submit_validation_rejects_bad_dates() {
        // inverted
        assert!(matches!(
            validate_submit(&submit(1, "2024-06-05", "2024-06-01", "x"), today()),
            Err(AppError::Validation(_))
        ));
        // zero-length window
        assert!(matches!(
            validate_submit(&submit(1, "2024-06-05", "2024-06-05", "x"), today()),
            Err(AppError::Validation(_))
        ));
        // starts in the past
        assert!(matches!(
            validate_submit(&submit(1, "2024-05-20", "2024-06-05", "x"), today()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn submit_validation_rejects_empty_purpose() {
        assert!(matches!(
            validate_submit(&submit(1, "2024-06-01", "2024-06-05", "   "), today()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn status_derivation_from_quantity() {
        assert_eq!(derive_status(ItemStatus::Available, 0), ItemStatus::CheckedOut);
        assert_eq!(derive_status(ItemStatus::CheckedOut, 2), ItemStatus::Available);
        assert_eq!(derive_status(ItemStatus::Available, 5), ItemStatus::Available);
    }

    #[test]
    fn status_derivation_never_overrides_administrative() {
        assert_eq!(derive_status(ItemStatus::Retired, 5), ItemStatus::Retired);
        assert_eq!(derive_status(ItemStatus::UnderRepair, 0), ItemStatus::UnderRepair);
        assert_eq!(derive_status(ItemStatus::LostStolen, 3), ItemStatus::LostStolen);
    }
}
