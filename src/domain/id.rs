//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// On-ledger market address. Unique per deployed market.
    ///
    /// The inner String is private to ensure all construction goes through
    /// the defined constructors.
    MarketAddress
);

string_id!(
    /// Wallet address of a staker, creator or operator.
    WalletAddress
);

string_id!(
    /// Tournament identifier linking match-markets to a schedule.
    TournamentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_address_new_and_as_str() {
        let id = MarketAddress::new("test-market");
        assert_eq!(id.as_str(), "test-market");
    }

    #[test]
    fn market_address_from_string() {
        let id = MarketAddress::from("hello".to_string());
        assert_eq!(id.as_str(), "hello");
    }

    #[test]
    fn wallet_address_display() {
        let id = WalletAddress::new("display-test");
        assert_eq!(format!("{}", id), "display-test");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = TournamentId::from("club-world-cup-2025");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"club-world-cup-2025\"");

        let back: TournamentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
