//! Shared domain enums
//!
//! Statuses are stored as smallint codes in Postgres; the `From<i16>`
//! conversions are the single place those codes are interpreted.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// ItemStatus
// ---------------------------------------------------------------------------

/// Operational status of an inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum ItemStatus {
    Available = 0,
    CheckedOut = 1,
    Reserved = 2,
    UnderRepair = 3,
    LostStolen = 4,
    Retired = 5,
}

impl ItemStatus {
    /// Administrative statuses are set by explicit catalog operations and
    /// must never be overridden by quantity-derived transitions.
    pub fn is_administrative(&self) -> bool {
        matches!(
            self,
            ItemStatus::UnderRepair | ItemStatus::LostStolen | ItemStatus::Retired
        )
    }
}

impl From<i16> for ItemStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => ItemStatus::CheckedOut,
            2 => ItemStatus::Reserved,
            3 => ItemStatus::UnderRepair,
            4 => ItemStatus::LostStolen,
            5 => ItemStatus::Retired,
            _ => ItemStatus::Available,
        }
    }
}

impl From<ItemStatus> for i16 {
    fn from(s: ItemStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ItemStatus::Available => "Available",
            ItemStatus::CheckedOut => "Checked out",
            ItemStatus::Reserved => "Reserved",
            ItemStatus::UnderRepair => "Under repair",
            ItemStatus::LostStolen => "Lost or stolen",
            ItemStatus::Retired => "Retired",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

/// Item sensitivity classification, gating who may approve a borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum Sensitivity {
    None = 0,
    Sensitive = 1,
    HighValue = 2,
}

impl Sensitivity {
    /// Approving a request for this item requires super-admin authority
    pub fn requires_elevation(&self) -> bool {
        !matches!(self, Sensitivity::None)
    }
}

impl From<i16> for Sensitivity {
    fn from(v: i16) -> Self {
        match v {
            1 => Sensitivity::Sensitive,
            2 => Sensitivity::HighValue,
            _ => Sensitivity::None,
        }
    }
}

impl From<Sensitivity> for i16 {
    fn from(s: Sensitivity) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Borrow request state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum RequestStatus {
    Pending = 0,
    Approved = 1,
    Declined = 2,
    Returned = 3,
    Cancelled = 4,
}

impl RequestStatus {
    /// No further transition is legal from a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Returned | RequestStatus::Declined | RequestStatus::Cancelled
        )
    }

    /// Legal transitions. `Approved -> Approved` covers extension,
    /// where only `date_to` grows.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Declined)
                | (Pending, Cancelled)
                | (Approved, Returned)
                | (Approved, Cancelled)
                | (Approved, Approved)
        )
    }
}

impl From<i16> for RequestStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => RequestStatus::Approved,
            2 => RequestStatus::Declined,
            3 => RequestStatus::Returned,
            4 => RequestStatus::Cancelled,
            _ => RequestStatus::Pending,
        }
    }
}

impl From<RequestStatus> for i16 {
    fn from(s: RequestStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Declined => "Declined",
            RequestStatus::Returned => "Returned",
            RequestStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Caller role, resolved by the external identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryAction
// ---------------------------------------------------------------------------

/// Action tags for the append-only history log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum HistoryAction {
    QuantityAdjusted = 0,
    StatusChanged = 1,
    RequestApproved = 2,
    RequestReturned = 3,
    RequestCancelled = 4,
    RequestExtended = 5,
    ConditionUpdated = 6,
}

impl From<i16> for HistoryAction {
    fn from(v: i16) -> Self {
        match v {
            1 => HistoryAction::StatusChanged,
            2 => HistoryAction::RequestApproved,
            3 => HistoryAction::RequestReturned,
            4 => HistoryAction::RequestCancelled,
            5 => HistoryAction::RequestExtended,
            6 => HistoryAction::ConditionUpdated,
            _ => HistoryAction::QuantityAdjusted,
        }
    }
}

impl From<HistoryAction> for i16 {
    fn from(a: HistoryAction) -> Self {
        a as i16
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HistoryAction::QuantityAdjusted => "Quantity adjusted",
            HistoryAction::StatusChanged => "Status changed",
            HistoryAction::RequestApproved => "Request approved",
            HistoryAction::RequestReturned => "Request returned",
            HistoryAction::RequestCancelled => "Request cancelled",
            HistoryAction::RequestExtended => "Request extended",
            HistoryAction::ConditionUpdated => "Condition updated",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Declined));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Returned));
    }

    #[test]
    fn approved_transitions() {
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Returned));
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Cancelled));
        // extension re-enters Approved
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Approved));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Declined));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for terminal in [
            RequestStatus::Returned,
            RequestStatus::Declined,
            RequestStatus::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                RequestStatus::Pending,
                RequestStatus::Approved,
                RequestStatus::Declined,
                RequestStatus::Returned,
                RequestStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Declined,
            RequestStatus::Returned,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::from(i16::from(status)), status);
        }
        assert_eq!(ItemStatus::from(99), ItemStatus::Available);
        assert_eq!(Sensitivity::from(2), Sensitivity::HighValue);
    }

    #[test]
    fn administrative_statuses() {
        assert!(ItemStatus::Retired.is_administrative());
        assert!(ItemStatus::UnderRepair.is_administrative());
        assert!(ItemStatus::LostStolen.is_administrative());
        assert!(!ItemStatus::Available.is_administrative());
        assert!(!ItemStatus::CheckedOut.is_administrative());
        assert!(!ItemStatus::Reserved.is_administrative());
    }

    #[test]
    fn elevation_gating() {
        assert!(!Sensitivity::None.requires_elevation());
        assert!(Sensitivity::Sensitive.requires_elevation());
        assert!(Sensitivity::HighValue.requires_elevation());
    }
}
