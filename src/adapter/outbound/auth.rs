//! Allowlist-based operator authorization.

use std::collections::HashSet;

use crate::domain::id::WalletAddress;
use crate::port::outbound::auth::Authorizer;

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    operators: HashSet<WalletAddress>,
}

impl Allowlist {
    pub fn new(operators: impl IntoIterator<Item = WalletAddress>) -> Self {
        Self {
            operators: operators.into_iter().collect(),
        }
    }
}

impl Authorizer for Allowlist {
    fn is_operator(&self, caller: &WalletAddress) -> bool {
        self.operators.contains(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_wallets_are_operators() {
        let allowlist = Allowlist::new([WalletAddress::from("ops")]);
        assert!(allowlist.is_operator(&WalletAddress::from("ops")));
        assert!(!allowlist.is_operator(&WalletAddress::from("someone")));
        assert!(!Allowlist::default().is_operator(&WalletAddress::from("ops")));
    }
}
