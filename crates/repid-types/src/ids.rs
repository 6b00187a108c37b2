//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Action records and session reports carry UUID v7 identifiers so that
//! exported reports can be correlated and sorted by creation time without
//! consulting the ledger. Agents are identified by their roster name, not
//! by a UUID.
//!
//! Identifiers serialize as bare UUID strings. `Display` adds a short kind
//! prefix (`act_`, `rpt_`) for log lines; `FromStr` accepts either form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a UUID v7 newtype with a display prefix.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident => $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(Uuid);

        impl $name {
            /// Prefix used by `Display` and accepted by `FromStr`.
            pub const PREFIX: &'static str = $prefix;

            /// Mint a fresh time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID, e.g. one read back from a report.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Creation time embedded in the UUID.
            ///
            /// `None` for UUID versions that carry no timestamp.
            pub fn created_at(&self) -> Option<DateTime<Utc>> {
                self.0.get_timestamp().and_then(|ts| {
                    let (secs, nanos) = ts.to_unix();
                    DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
                })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}{}", Self::PREFIX, self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.trim();
                let raw = raw.strip_prefix(Self::PREFIX).unwrap_or(raw);
                Uuid::parse_str(raw).map(Self)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a recorded scoring action.
    ActionId => "act_"
}

define_id! {
    /// Unique identifier for a generated session report.
    ReportId => "rpt_"
}
