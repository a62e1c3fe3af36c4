//! Database model types for Diesel ORM.
//!
//! Decimals are stored as text to keep exact values; option lists and pools
//! as JSON arrays; timestamps as RFC 3339.

use diesel::prelude::*;

use super::schema::{markets, positions};

/// Database row for a market.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    pub address: String,
    pub question: String,
    pub category: String,
    pub options: String,
    pub option_pools: String,
    pub total_volume: String,
    pub status: String,
    pub resolved_option: Option<i32>,
    pub resolution_date: Option<String>,
    pub min_bet_amount: String,
    pub creator_fee_bps: i32,
    pub volume_source: String,
    pub tournament_id: Option<String>,
    pub creator: Option<String>,
    pub created_at: Option<String>,
}

/// Database row for a position.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionRow {
    pub market: String,
    pub owner: String,
    pub option_index: i32,
    pub amount: String,
    pub claimed: i32,
    pub payout: Option<String>,
    pub claimed_at: Option<String>,
}
