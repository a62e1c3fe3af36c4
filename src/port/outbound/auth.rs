//! Operator authorization port.

use crate::domain::id::WalletAddress;

/// Decides whether a caller may use write paths such as deployment.
pub trait Authorizer: Send + Sync {
    fn is_operator(&self, caller: &WalletAddress) -> bool;
}
