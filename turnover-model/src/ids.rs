use std::str::FromStr;

use uuid::Uuid;

use crate::error::ModelError;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Generate a fresh, time-ordered identifier.
            pub fn new() -> Self {
                $name(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                $name(id)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map($name).map_err(|err| {
                    ModelError::InvalidValue(format!(
                        "{} `{s}`: {err}",
                        stringify!($name)
                    ))
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(
    /// Rental property identifier.
    PropertyId
);
typed_id!(
    /// Booking identifier (one per `(source, external uid)` pair).
    BookingId
);
typed_id!(
    /// Cleaning job identifier.
    CleaningId
);
typed_id!(
    /// Linen order identifier.
    LinenOrderId
);
typed_id!(
    /// Sync exclusion (tombstone) identifier.
    ExclusionId
);
typed_id!(
    /// Cleaning operator identifier.
    OperatorId
);
typed_id!(
    /// Account identifier for admins and property owners.
    UserId
);
