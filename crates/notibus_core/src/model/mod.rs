//! Notification domain model.
//!
//! # Responsibility
//! - Define the notification record and its typed sub-dictionaries.
//! - Define the change-operation entries delivered to subscribers.
//!
//! # Invariants
//! - Every enum carried over the wire or into the store has a stable raw
//!   code; unknown codes are rejected, never coerced.
//! - Absent sub-dictionaries mean "no value", never "empty value".

/// Declares a fieldless enum with stable `i32` wire/store codes.
macro_rules! raw_code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All variants in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable code used on the wire and in the store.
            pub fn as_raw(self) -> i32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Parses a stable code; `None` when out of range.
            pub fn from_raw(value: i32) -> Option<Self> {
                match value {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

pub mod bundle;
pub mod noti;
pub mod op;
pub mod text;
