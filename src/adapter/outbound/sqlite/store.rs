//! SQLite market and position stores.
//!
//! Conditional writes are single `UPDATE ... WHERE` statements so that the
//! write-once guarantees hold across processes sharing the database file.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rust_decimal::Decimal;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{MarketRow, PositionRow};
use crate::adapter::outbound::sqlite::database::schema::{markets, positions};
use crate::domain::id::{MarketAddress, TournamentId, WalletAddress};
use crate::domain::market::{Market, MarketFilter, MarketStatus};
use crate::domain::money::Amount;
use crate::domain::position::{Position, PositionKey};
use crate::error::{Error, Result};
use crate::port::outbound::store::{MarketStore, PositionStore, ResolutionRecord, ResolutionWrite};

type Conn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>;

fn connect(pool: &DbPool) -> Result<Conn> {
    pool.get().map_err(|e| Error::Connection(e.to_string()))
}

fn db_err(e: DieselError) -> Error {
    Error::Database(e.to_string())
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| Error::Parse(format!("decimal '{raw}': {e}")))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp '{raw}': {e}")))
}

fn option_to_db(option: u8) -> i32 {
    i32::from(option)
}

fn option_from_db(raw: i32) -> Result<u8> {
    u8::try_from(raw).map_err(|_| Error::Parse(format!("option index out of range: {raw}")))
}

/// SQLite-backed market cache.
pub struct SqliteMarketStore {
    pool: DbPool,
}

impl SqliteMarketStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(market: &Market) -> Result<MarketRow> {
        let pools: Vec<String> = market.option_pools.iter().map(Decimal::to_string).collect();
        Ok(MarketRow {
            address: market.address.to_string(),
            question: market.question.clone(),
            category: market.category.clone(),
            options: serde_json::to_string(&market.options)?,
            option_pools: serde_json::to_string(&pools)?,
            total_volume: market.total_volume.to_string(),
            status: market.status.as_str().to_string(),
            resolved_option: market.resolved_option.map(option_to_db),
            resolution_date: market.resolution_date.map(|d| d.to_rfc3339()),
            min_bet_amount: market.min_bet_amount.to_string(),
            creator_fee_bps: i32::try_from(market.creator_fee_bps)
                .map_err(|_| Error::Parse(format!("fee out of range: {}", market.creator_fee_bps)))?,
            volume_source: market.volume_source.as_str().to_string(),
            tournament_id: market.tournament_id.as_ref().map(ToString::to_string),
            creator: market.creator.as_ref().map(ToString::to_string),
            created_at: market.created_at.map(|d| d.to_rfc3339()),
        })
    }

    fn from_row(row: MarketRow) -> Result<Market> {
        let pools: Vec<String> = serde_json::from_str(&row.option_pools)?;
        Ok(Market {
            address: MarketAddress::from(row.address),
            question: row.question,
            category: row.category,
            options: serde_json::from_str(&row.options)?,
            option_pools: pools.iter().map(|p| parse_decimal(p)).collect::<Result<_>>()?,
            total_volume: parse_decimal(&row.total_volume)?,
            status: MarketStatus::from_str(&row.status).map_err(Error::Parse)?,
            resolved_option: row.resolved_option.map(option_from_db).transpose()?,
            resolution_date: row.resolution_date.as_deref().map(parse_time).transpose()?,
            min_bet_amount: parse_decimal(&row.min_bet_amount)?,
            creator_fee_bps: u32::try_from(row.creator_fee_bps)
                .map_err(|_| Error::Parse(format!("negative fee: {}", row.creator_fee_bps)))?,
            volume_source: row.volume_source.parse().map_err(Error::Parse)?,
            tournament_id: row.tournament_id.map(TournamentId::from),
            creator: row.creator.map(WalletAddress::from),
            created_at: row.created_at.as_deref().map(parse_time).transpose()?,
        })
    }
}

impl MarketStore for SqliteMarketStore {
    async fn get(&self, address: &MarketAddress) -> Result<Option<Market>> {
        let mut conn = connect(&self.pool)?;
        let row: Option<MarketRow> = markets::table
            .find(address.as_str())
            .select(MarketRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;
        row.map(Self::from_row).transpose()
    }

    async fn list(&self, filter: &MarketFilter) -> Result<Vec<Market>> {
        let mut conn = connect(&self.pool)?;
        let mut query = markets::table
            .select(MarketRow::as_select())
            .order((markets::created_at.desc(), markets::address.asc()))
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(markets::status.eq(status.as_str()));
        }
        if let Some(ref tournament) = filter.tournament_id {
            query = query.filter(markets::tournament_id.eq(tournament.as_str()));
        }
        let rows: Vec<MarketRow> = query.load(&mut conn).map_err(db_err)?;

        let mut markets = Vec::with_capacity(rows.len());
        for row in rows {
            let market = Self::from_row(row)?;
            if filter.matches(&market) {
                markets.push(market);
            }
        }
        Ok(markets)
    }

    async fn upsert(&self, market: &Market) -> Result<()> {
        let mut row = Self::to_row(market)?;
        let mut conn = connect(&self.pool)?;
        conn.immediate_transaction::<_, DieselError, _>(|conn| {
            let existing: Option<Option<i32>> = markets::table
                .find(&row.address)
                .select(markets::resolved_option)
                .first(conn)
                .optional()?;
            if let Some(Some(option)) = existing {
                row.resolved_option = Some(option);
                row.status = MarketStatus::Resolved.as_str().to_string();
            }
            diesel::replace_into(markets::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .map_err(db_err)
    }

    async fn insert_new(&self, market: &Market) -> Result<()> {
        let row = Self::to_row(market)?;
        let mut conn = connect(&self.pool)?;
        match diesel::insert_into(markets::table).values(&row).execute(&mut conn) {
            Ok(_) => Ok(()),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(Error::DuplicateMarket(market.address.clone()))
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn record_resolution(
        &self,
        address: &MarketAddress,
        record: &ResolutionRecord,
    ) -> Result<ResolutionWrite> {
        let pools: Vec<String> = record.option_pools.iter().map(Decimal::to_string).collect();
        let pools = serde_json::to_string(&pools)?;
        let mut conn = connect(&self.pool)?;
        let updated = diesel::update(
            markets::table
                .find(address.as_str())
                .filter(markets::resolved_option.is_null())
                .filter(markets::status.ne(MarketStatus::Cancelled.as_str())),
        )
        .set((
            markets::resolved_option.eq(Some(option_to_db(record.option))),
            markets::status.eq(MarketStatus::Resolved.as_str()),
            markets::option_pools.eq(pools),
            markets::total_volume.eq(record.total_volume.to_string()),
            markets::volume_source.eq(record.volume_source.as_str()),
        ))
        .execute(&mut conn)
        .map_err(db_err)?;

        if updated == 1 {
            return Ok(ResolutionWrite::Applied);
        }

        let existing: Option<(Option<i32>, String)> = markets::table
            .find(address.as_str())
            .select((markets::resolved_option, markets::status))
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;
        match existing {
            None => Err(Error::NotFound(address.clone())),
            Some((Some(stored), _)) => Ok(ResolutionWrite::AlreadySet(option_from_db(stored)?)),
            Some((None, status)) => {
                let status = MarketStatus::from_str(&status).map_err(Error::Parse)?;
                if status == MarketStatus::Cancelled {
                    Ok(ResolutionWrite::Closed(status))
                } else {
                    Err(Error::Database(format!(
                        "resolution write for {address} matched no row"
                    )))
                }
            }
        }
    }
}

/// SQLite-backed position store.
pub struct SqlitePositionStore {
    pool: DbPool,
}

impl SqlitePositionStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(position: &Position) -> PositionRow {
        PositionRow {
            market: position.key.market.to_string(),
            owner: position.key.owner.to_string(),
            option_index: option_to_db(position.key.option_index),
            amount: position.amount.to_string(),
            claimed: i32::from(position.claimed),
            payout: position.payout.map(|p| p.to_string()),
            claimed_at: position.claimed_at.map(|t| t.to_rfc3339()),
        }
    }

    fn from_row(row: PositionRow) -> Result<Position> {
        Ok(Position {
            key: PositionKey::new(
                MarketAddress::from(row.market),
                WalletAddress::from(row.owner),
                option_from_db(row.option_index)?,
            ),
            amount: parse_decimal(&row.amount)?,
            claimed: row.claimed != 0,
            payout: row.payout.as_deref().map(parse_decimal).transpose()?,
            claimed_at: row.claimed_at.as_deref().map(parse_time).transpose()?,
        })
    }

    fn from_rows(rows: Vec<PositionRow>) -> Result<Vec<Position>> {
        rows.into_iter().map(Self::from_row).collect()
    }
}

impl PositionStore for SqlitePositionStore {
    async fn get(&self, key: &PositionKey) -> Result<Option<Position>> {
        let mut conn = connect(&self.pool)?;
        let row: Option<PositionRow> = positions::table
            .find((
                key.market.as_str(),
                key.owner.as_str(),
                option_to_db(key.option_index),
            ))
            .select(PositionRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;
        row.map(Self::from_row).transpose()
    }

    async fn list_for_market(&self, market: &MarketAddress) -> Result<Vec<Position>> {
        let mut conn = connect(&self.pool)?;
        let rows: Vec<PositionRow> = positions::table
            .filter(positions::market.eq(market.as_str()))
            .select(PositionRow::as_select())
            .order((positions::owner, positions::option_index))
            .load(&mut conn)
            .map_err(db_err)?;
        Self::from_rows(rows)
    }

    async fn list_for_owner(&self, owner: &WalletAddress) -> Result<Vec<Position>> {
        let mut conn = connect(&self.pool)?;
        let rows: Vec<PositionRow> = positions::table
            .filter(positions::owner.eq(owner.as_str()))
            .select(PositionRow::as_select())
            .order((positions::market, positions::option_index))
            .load(&mut conn)
            .map_err(db_err)?;
        Self::from_rows(rows)
    }

    async fn upsert(&self, position: &Position) -> Result<()> {
        let row = Self::to_row(position);
        let mut conn = connect(&self.pool)?;
        conn.immediate_transaction::<_, DieselError, _>(|conn| {
            let claimed: Option<i32> = positions::table
                .find((&row.market, &row.owner, row.option_index))
                .select(positions::claimed)
                .first(conn)
                .optional()?;
            if claimed.is_some_and(|c| c != 0) {
                return Ok(());
            }
            diesel::replace_into(positions::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .map_err(db_err)
    }

    async fn mark_claimed(
        &self,
        key: &PositionKey,
        payout: Amount,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = connect(&self.pool)?;
        let target = (
            key.market.as_str(),
            key.owner.as_str(),
            option_to_db(key.option_index),
        );
        let updated = diesel::update(positions::table.find(target).filter(positions::claimed.eq(0)))
            .set((
                positions::claimed.eq(1),
                positions::payout.eq(Some(payout.to_string())),
                positions::claimed_at.eq(Some(claimed_at.to_rfc3339())),
            ))
            .execute(&mut conn)
            .map_err(db_err)?;
        if updated == 1 {
            return Ok(true);
        }

        let exists: Option<i32> = positions::table
            .find(target)
            .select(positions::claimed)
            .first(&mut conn)
            .optional()
            .map_err(db_err)?;
        match exists {
            Some(_) => Ok(false),
            None => Err(Error::PositionNotFound(key.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;
    use crate::domain::market::VolumeSource;
    use rust_decimal_macros::dec;

    fn stores() -> (SqliteMarketStore, SqlitePositionStore) {
        let pool = open(":memory:").unwrap();
        (SqliteMarketStore::new(pool.clone()), SqlitePositionStore::new(pool))
    }

    fn market(addr: &str) -> Market {
        let mut market = Market::new(
            MarketAddress::from(addr),
            "Inter Miami - Porto",
            vec!["Inter Miami".into(), "Porto".into(), "Draw".into()],
        );
        market.option_pools = vec![dec!(600.5), dec!(400), Decimal::ZERO];
        market.total_volume = dec!(1000.5);
        market.volume_source = VolumeSource::Escrow;
        market.creator_fee_bps = 200;
        market.tournament_id = Some(TournamentId::from("cwc"));
        market.created_at = Some(Utc::now());
        market
    }

    #[tokio::test]
    async fn market_survives_storage_exactly() {
        let (store, _) = stores();
        let original = market("m1");
        store.upsert(&original).await.unwrap();

        let loaded = store.get(&original.address).await.unwrap().unwrap();
        assert_eq!(loaded.option_pools, original.option_pools);
        assert_eq!(loaded.total_volume, dec!(1000.5));
        assert_eq!(loaded.volume_source, VolumeSource::Escrow);
        assert_eq!(loaded.tournament_id, original.tournament_id);
    }

    fn resolution(option: u8) -> ResolutionRecord {
        ResolutionRecord {
            option,
            option_pools: vec![dec!(700), dec!(300), Decimal::ZERO],
            total_volume: dec!(1001),
            volume_source: VolumeSource::Escrow,
        }
    }

    #[tokio::test]
    async fn resolution_is_write_once() {
        let (store, _) = stores();
        store.upsert(&market("m1")).await.unwrap();
        let addr = MarketAddress::from("m1");

        assert_eq!(
            store.record_resolution(&addr, &resolution(2)).await.unwrap(),
            ResolutionWrite::Applied
        );
        let loaded = store.get(&addr).await.unwrap().unwrap();
        assert_eq!(loaded.option_pools, vec![dec!(700), dec!(300), Decimal::ZERO]);
        assert_eq!(loaded.total_volume, dec!(1001));

        assert_eq!(
            store.record_resolution(&addr, &resolution(0)).await.unwrap(),
            ResolutionWrite::AlreadySet(2)
        );

        store.upsert(&market("m1")).await.unwrap();
        let loaded = store.get(&addr).await.unwrap().unwrap();
        assert_eq!(loaded.resolved_option, Some(2));
        assert_eq!(loaded.status, MarketStatus::Resolved);
    }

    #[tokio::test]
    async fn cancelled_row_is_not_resolved() {
        let (store, _) = stores();
        let mut cancelled = market("m1");
        cancelled.status = MarketStatus::Cancelled;
        store.upsert(&cancelled).await.unwrap();
        let addr = MarketAddress::from("m1");

        assert_eq!(
            store.record_resolution(&addr, &resolution(1)).await.unwrap(),
            ResolutionWrite::Closed(MarketStatus::Cancelled)
        );
        let loaded = store.get(&addr).await.unwrap().unwrap();
        assert_eq!(loaded.status, MarketStatus::Cancelled);
        assert_eq!(loaded.resolved_option, None);
        assert_eq!(loaded.total_volume, dec!(1000.5));
    }

    #[tokio::test]
    async fn resolution_of_unknown_market_is_not_found() {
        let (store, _) = stores();
        assert!(matches!(
            store.record_resolution(&MarketAddress::from("nope"), &resolution(0)).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let (store, _) = stores();
        store.insert_new(&market("m1")).await.unwrap();
        assert!(matches!(
            store.insert_new(&market("m1")).await,
            Err(Error::DuplicateMarket(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_status_and_hides_test_markets() {
        let (store, _) = stores();
        store.upsert(&market("m1")).await.unwrap();
        store.upsert(&market("test-market-1")).await.unwrap();
        store.upsert(&market("m2")).await.unwrap();
        store
            .record_resolution(&MarketAddress::from("m2"), &resolution(0))
            .await
            .unwrap();

        let active = store
            .list(&MarketFilter::with_status(MarketStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].address, MarketAddress::from("m1"));

        let everything = store
            .list(&MarketFilter {
                include_test: true,
                ..MarketFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn claim_flag_flips_once() {
        let (_, positions) = stores();
        let key = PositionKey::new(MarketAddress::from("m1"), WalletAddress::from("w1"), 0);
        positions.upsert(&Position::new(key.clone(), dec!(60))).await.unwrap();

        let now = Utc::now();
        assert!(positions.mark_claimed(&key, dec!(95.5), now).await.unwrap());
        assert!(!positions.mark_claimed(&key, dec!(95.5), now).await.unwrap());

        // Re-importing the stake must not reset the claim.
        positions.upsert(&Position::new(key.clone(), dec!(60))).await.unwrap();
        let loaded = positions.get(&key).await.unwrap().unwrap();
        assert!(loaded.claimed);
        assert_eq!(loaded.payout, Some(dec!(95.5)));
    }

    #[tokio::test]
    async fn claim_of_unknown_position_is_not_found() {
        let (_, positions) = stores();
        let key = PositionKey::new(MarketAddress::from("m1"), WalletAddress::from("w1"), 0);
        assert!(matches!(
            positions.mark_claimed(&key, dec!(1), Utc::now()).await,
            Err(Error::PositionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn positions_list_by_market_and_owner() {
        let (_, positions) = stores();
        for (m, w, o) in [("m1", "w1", 0), ("m1", "w2", 1), ("m2", "w1", 1)] {
            let key = PositionKey::new(MarketAddress::from(m), WalletAddress::from(w), o);
            positions.upsert(&Position::new(key, dec!(10))).await.unwrap();
        }
        assert_eq!(
            positions
                .list_for_market(&MarketAddress::from("m1"))
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            positions
                .list_for_owner(&WalletAddress::from("w1"))
                .await
                .unwrap()
                .len(),
            2
        );
    }
}
