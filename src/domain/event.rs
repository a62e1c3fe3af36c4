//! Domain events broadcast to in-process subscribers.

use serde::{Deserialize, Serialize};

use super::id::{MarketAddress, TournamentId};

/// A market's outcome was recorded for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketResolved {
    pub address: MarketAddress,
    pub option: u8,
    pub tournament_id: Option<TournamentId>,
}

/// Events published on the [`crate::application::events::EventBus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    MarketResolved(MarketResolved),
}

impl From<MarketResolved> for DomainEvent {
    fn from(event: MarketResolved) -> Self {
        DomainEvent::MarketResolved(event)
    }
}
