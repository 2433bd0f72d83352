//! Payment methods accepted at checkout.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a supported payment method.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid payment method: {0}")]
pub struct InvalidPaymentMethod(pub String);

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash handed to the rider.
    #[default]
    CashOnDelivery,
    /// JazzCash mobile wallet.
    Jazzcash,
    /// EasyPaisa mobile wallet.
    Easypaisa,
}

impl PaymentMethod {
    /// The stored/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::Jazzcash => "jazzcash",
            Self::Easypaisa => "easypaisa",
        }
    }

    /// Mobile wallet payments need the wallet's phone number.
    #[must_use]
    pub const fn is_mobile_wallet(self) -> bool {
        matches!(self, Self::Jazzcash | Self::Easypaisa)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = InvalidPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            "jazzcash" => Ok(Self::Jazzcash),
            "easypaisa" => Ok(Self::Easypaisa),
            _ => Err(InvalidPaymentMethod(s.to_owned())),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PaymentMethod {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PaymentMethod {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PaymentMethod {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}
