//! Macro for implementing Display and FromStr for persisted enums
//!
//! Status, tier and priority enums are stored as lowercase TEXT columns. This
//! macro keeps the string mapping for both directions in one place.
//!
//! # Example
//!
//! ```rust
//! use tidyhome_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum TransferState {
//!     Queued,
//!     Sent,
//!     Reversed,
//! }
//!
//! impl_domain_status_conversions!(TransferState {
//!     Queued => "queued",
//!     Sent => "sent",
//!     Reversed => "reversed",
//! });
//!
//! assert_eq!(TransferState::Sent.to_string(), "sent");
//! assert_eq!("REVERSED".parse::<TransferState>(), Ok(TransferState::Reversed));
//! ```

/// Implements Display and FromStr traits for persisted enums
///
/// - Display writes the mapped string
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
