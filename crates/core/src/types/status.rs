//! Order status and the rules for moving between statuses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the five order statuses.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct InvalidOrderStatus(pub String);

/// Delivery status of an order.
///
/// Stored as lowercase snake case text (`out_for_delivery`), which is also
/// the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order received, not yet handled.
    #[default]
    Pending,
    /// Being packed.
    Packing,
    /// Handed to a rider.
    OutForDelivery,
    /// Received by the customer.
    Delivered,
    /// Cancelled by an operator.
    Cancelled,
}

/// How strictly status updates are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may be set from any other status.
    #[default]
    Unrestricted,
    /// `pending -> packing -> out_for_delivery -> delivered`, plus
    /// `any -> cancelled`. Re-setting the current status is always allowed.
    Lifecycle,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Packing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The stored/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Packing => "packing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses an order may currently hold for a move to `self` to be legal.
    #[must_use]
    pub const fn allowed_predecessors(self, policy: TransitionPolicy) -> &'static [Self] {
        match policy {
            TransitionPolicy::Unrestricted => &Self::ALL,
            TransitionPolicy::Lifecycle => match self {
                Self::Pending => &[Self::Pending],
                Self::Packing => &[Self::Pending, Self::Packing],
                Self::OutForDelivery => &[Self::Packing, Self::OutForDelivery],
                Self::Delivered => &[Self::OutForDelivery, Self::Delivered],
                Self::Cancelled => &Self::ALL,
            },
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidOrderStatus(s.to_owned()))
    }
}

impl std::str::FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unrestricted" => Ok(Self::Unrestricted),
            "lifecycle" => Ok(Self::Lifecycle),
            _ => Err(format!(
                "invalid transition policy: {s} (expected unrestricted or lifecycle)"
            )),
        }
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn can_move(from: OrderStatus, to: OrderStatus, policy: TransitionPolicy) -> bool {
        to.allowed_predecessors(policy).contains(&from)
    }

    #[test]
    fn test_parse_accepts_the_five_statuses() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_parse_rejects_anything_else() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("Pending".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
        assert_eq!(
            "out-for-delivery".parse::<OrderStatus>(),
            Err(InvalidOrderStatus("out-for-delivery".to_owned()))
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
    }

    #[test]
    fn test_unrestricted_allows_every_move() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(can_move(from, to, TransitionPolicy::Unrestricted));
            }
        }
    }

    #[test]
    fn test_unrestricted_allows_delivered_back_to_pending() {
        assert!(can_move(
            OrderStatus::Delivered,
            OrderStatus::Pending,
            TransitionPolicy::Unrestricted
        ));
    }

    #[test]
    fn test_lifecycle_forward_path() {
        let policy = TransitionPolicy::Lifecycle;
        assert!(can_move(OrderStatus::Pending, OrderStatus::Packing, policy));
        assert!(can_move(OrderStatus::Packing, OrderStatus::OutForDelivery, policy));
        assert!(can_move(OrderStatus::OutForDelivery, OrderStatus::Delivered, policy));
    }

    #[test]
    fn test_lifecycle_rejects_skips_and_reversals() {
        let policy = TransitionPolicy::Lifecycle;
        assert!(!can_move(OrderStatus::Pending, OrderStatus::Delivered, policy));
        assert!(!can_move(OrderStatus::Delivered, OrderStatus::Pending, policy));
        assert!(!can_move(OrderStatus::OutForDelivery, OrderStatus::Packing, policy));
        assert!(!can_move(OrderStatus::Cancelled, OrderStatus::Pending, policy));
    }

    #[test]
    fn test_lifecycle_any_status_can_be_cancelled() {
        for from in OrderStatus::ALL {
            assert!(can_move(from, OrderStatus::Cancelled, TransitionPolicy::Lifecycle));
        }
    }

    #[test]
    fn test_lifecycle_same_status_is_allowed() {
        for status in OrderStatus::ALL {
            assert!(can_move(status, status, TransitionPolicy::Lifecycle));
        }
    }

    #[test]
    fn test_transition_policy_from_str() {
        assert_eq!(
            "lifecycle".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Lifecycle
        );
        assert_eq!(
            "unrestricted".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Unrestricted
        );
        assert!("strict".parse::<TransitionPolicy>().is_err());
    }
}
