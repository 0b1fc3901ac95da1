//! SQLite-backed implementation of the storage contract

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::shared::errors::StorageError;
use crate::shared::types::{
    AmazingDealRecord, GameIdentity, HistoricalLow, PriceObservation, WatchlistEntry,
};

use super::traits::DealStore;

/// Single-connection SQLite store. Callers serialize through the inner
/// mutex; per-key write ordering is the historical-low tracker's concern.
pub struct SqliteDealStore {
    conn: Mutex<Connection>,
}

impl SqliteDealStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id TEXT NOT NULL,
                game_title TEXT NOT NULL,
                store TEXT NOT NULL,
                price REAL NOT NULL,
                original_price REAL NOT NULL,
                discount_percent REAL NOT NULL,
                source_id TEXT,
                url TEXT,
                timestamp TEXT NOT NULL,
                UNIQUE(game_id, store, timestamp)
            );

            CREATE TABLE IF NOT EXISTS watchlist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_title TEXT NOT NULL,
                game_id TEXT,
                target_price REAL,
                store TEXT,
                created_at TEXT NOT NULL,
                last_checked TEXT,
                is_active INTEGER DEFAULT 1,
                UNIQUE(game_title, store)
            );

            CREATE TABLE IF NOT EXISTS amazing_deals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_title TEXT NOT NULL,
                store TEXT NOT NULL,
                price REAL NOT NULL,
                original_price REAL NOT NULL,
                discount_percent REAL NOT NULL,
                url TEXT NOT NULL,
                source_id TEXT,
                reason TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                notified INTEGER DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS historical_lows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id TEXT NOT NULL,
                store TEXT NOT NULL,
                lowest_price REAL NOT NULL,
                timestamp TEXT NOT NULL,
                UNIQUE(game_id, store)
            );

            CREATE INDEX IF NOT EXISTS idx_price_history_game_store
                ON price_history(game_id, store);
            CREATE INDEX IF NOT EXISTS idx_price_history_timestamp
                ON price_history(timestamp);
            CREATE INDEX IF NOT EXISTS idx_watchlist_active
                ON watchlist(is_active);
            ",
        )?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow(format!("bad timestamp '{}': {}", raw, e)))
}

fn observation_from_row(row: &Row<'_>) -> rusqlite::Result<(PriceObservation, String)> {
    let raw_ts: String = row.get("timestamp")?;
    let observation = PriceObservation {
        title: row.get("game_title")?,
        store: row.get("store")?,
        price: row.get("price")?,
        original_price: row.get("original_price")?,
        discount_percent: row.get("discount_percent")?,
        source_id: row.get::<_, Option<String>>("source_id")?.unwrap_or_default(),
        url: row.get::<_, Option<String>>("url")?.unwrap_or_default(),
        observed_at: Utc::now(), // replaced by the parsed column below
    };
    Ok((observation, raw_ts))
}

impl DealStore for SqliteDealStore {
    fn append_price_history(
        &self,
        observation: &PriceObservation,
        identity: &GameIdentity,
    ) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO price_history
             (game_id, game_title, store, price, original_price, discount_percent,
              source_id, url, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                identity.as_str(),
                observation.title,
                observation.store,
                observation.price,
                observation.original_price,
                observation.discount_percent,
                observation.source_id,
                observation.url,
                observation.observed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_price_history(
        &self,
        identity: &GameIdentity,
        store: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PriceObservation>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM price_history
             WHERE game_id = ?1 AND (?2 IS NULL OR store = ?2)
             ORDER BY timestamp DESC
             LIMIT ?3",
        )?;

        let mapped = stmt.query_map(
            params![identity.as_str(), store, limit as i64],
            observation_from_row,
        )?;

        let mut rows = Vec::new();
        for item in mapped {
            let (mut observation, raw_ts) = item?;
            observation.observed_at = parse_timestamp(&raw_ts)?;
            rows.push(observation);
        }
        Ok(rows)
    }

    fn get_history_low(
        &self,
        identity: &GameIdentity,
        store: Option<&str>,
    ) -> Result<Option<HistoricalLow>, StorageError> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(f64, String)> = match store {
            Some(store) => conn
                .query_row(
                    "SELECT lowest_price, timestamp FROM historical_lows
                     WHERE game_id = ?1 AND store = ?2",
                    params![identity.as_str(), store],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?,
            // Global minimum across stores; on equal prices the most
            // recently recorded row wins
            None => conn
                .query_row(
                    "SELECT lowest_price, timestamp FROM historical_lows
                     WHERE game_id = ?1
                     ORDER BY lowest_price ASC, timestamp DESC
                     LIMIT 1",
                    params![identity.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?,
        };

        match row {
            Some((lowest_price, raw_ts)) => Ok(Some(HistoricalLow {
                lowest_price,
                recorded_at: parse_timestamp(&raw_ts)?,
            })),
            None => Ok(None),
        }
    }

    fn upsert_history_low(
        &self,
        identity: &GameIdentity,
        store: &str,
        price: f64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO historical_lows (game_id, store, lowest_price, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![identity.as_str(), store, price, at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn save_amazing_deal(&self, record: &AmazingDealRecord) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        let observation = &record.observation;
        conn.execute(
            "INSERT INTO amazing_deals
             (game_title, store, price, original_price, discount_percent,
              url, source_id, reason, timestamp, notified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                observation.title,
                observation.store,
                observation.price,
                observation.original_price,
                observation.discount_percent,
                observation.url,
                observation.source_id,
                record.reason,
                observation.observed_at.to_rfc3339(),
                record.notified as i64,
            ],
        )?;
        Ok(())
    }

    fn list_amazing_deals(&self, limit: usize) -> Result<Vec<AmazingDealRecord>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, game_title, store, price, original_price, discount_percent,
                    url, source_id, reason, timestamp, notified
             FROM amazing_deals
             ORDER BY timestamp DESC
             LIMIT ?1",
        )?;

        let mapped = stmt.query_map(params![limit as i64], |row| {
            let raw_ts: String = row.get("timestamp")?;
            let record = AmazingDealRecord {
                id: Some(row.get("id")?),
                observation: PriceObservation {
                    title: row.get("game_title")?,
                    store: row.get("store")?,
                    price: row.get("price")?,
                    original_price: row.get("original_price")?,
                    discount_percent: row.get("discount_percent")?,
                    source_id: row.get::<_, Option<String>>("source_id")?.unwrap_or_default(),
                    url: row.get("url")?,
                    observed_at: Utc::now(),
                },
                reason: row.get("reason")?,
                notified: row.get::<_, i64>("notified")? != 0,
            };
            Ok((record, raw_ts))
        })?;

        let mut records = Vec::new();
        for item in mapped {
            let (mut record, raw_ts) = item?;
            record.observation.observed_at = parse_timestamp(&raw_ts)?;
            records.push(record);
        }
        Ok(records)
    }

    fn mark_deal_notified(&self, id: i64) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE amazing_deals SET notified = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    fn list_watchlist(&self, active_only: bool) -> Result<Vec<WatchlistEntry>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let sql = if active_only {
            "SELECT game_title, game_id, target_price, store, created_at, last_checked, is_active
             FROM watchlist WHERE is_active = 1 ORDER BY created_at DESC"
        } else {
            "SELECT game_title, game_id, target_price, store, created_at, last_checked, is_active
             FROM watchlist ORDER BY created_at DESC"
        };
        let mut stmt = conn.prepare(sql)?;

        let mapped = stmt.query_map([], |row| {
            let created_raw: String = row.get("created_at")?;
            let checked_raw: Option<String> = row.get("last_checked")?;
            let entry = WatchlistEntry {
                game_title: row.get("game_title")?,
                game_id: row.get("game_id")?,
                target_price: row.get("target_price")?,
                store: row.get("store")?,
                active: row.get::<_, i64>("is_active")? != 0,
                created_at: Utc::now(),
                last_checked: None,
            };
            Ok((entry, created_raw, checked_raw))
        })?;

        let mut entries = Vec::new();
        for item in mapped {
            let (mut entry, created_raw, checked_raw) = item?;
            entry.created_at = parse_timestamp(&created_raw)?;
            entry.last_checked = match checked_raw {
                Some(raw) => Some(parse_timestamp(&raw)?),
                None => None,
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    fn upsert_watchlist_entry(&self, entry: &WatchlistEntry) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO watchlist
             (game_title, game_id, target_price, store, created_at, last_checked, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.game_title,
                entry.game_id,
                entry.target_price,
                entry.store,
                entry.created_at.to_rfc3339(),
                entry.last_checked.map(|at| at.to_rfc3339()),
                entry.active as i64,
            ],
        )?;
        Ok(())
    }

    fn deactivate_watchlist_entry(
        &self,
        title: &str,
        store: Option<&str>,
    ) -> Result<bool, StorageError> {
        let conn = self.conn.lock().unwrap();
        let changed = match store {
            Some(store) => conn.execute(
                "UPDATE watchlist SET is_active = 0 WHERE game_title = ?1 AND store = ?2",
                params![title, store],
            )?,
            None => conn.execute(
                "UPDATE watchlist SET is_active = 0 WHERE game_title = ?1",
                params![title],
            )?,
        };
        Ok(changed > 0)
    }

    fn touch_last_checked(
        &self,
        title: &str,
        store: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        match store {
            Some(store) => conn.execute(
                "UPDATE watchlist SET last_checked = ?1
                 WHERE game_title = ?2 AND store = ?3 AND is_active = 1",
                params![at.to_rfc3339(), title, store],
            )?,
            None => conn.execute(
                "UPDATE watchlist SET last_checked = ?1
                 WHERE game_title = ?2 AND is_active = 1",
                params![at.to_rfc3339(), title],
            )?,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn observation(title: &str, store: &str, price: f64, at: DateTime<Utc>) -> PriceObservation {
        PriceObservation::new(title, store, price, price * 2.0, 0.0, "d1", "http://x", at)
    }

    #[test]
    fn test_history_append_is_idempotent() {
        let store = SqliteDealStore::open_in_memory().unwrap();
        let identity = GameIdentity::from_parts(None, "Game X");
        let at = Utc::now();
        let obs = observation("Game X", "Steam", 12.0, at);

        store.append_price_history(&obs, &identity).unwrap();
        store.append_price_history(&obs, &identity).unwrap();

        let history = store.get_price_history(&identity, Some("Steam"), 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price, 12.0);

        // A later sighting is a distinct row
        let later = observation("Game X", "Steam", 10.0, at + Duration::hours(1));
        store.append_price_history(&later, &identity).unwrap();
        let history = store.get_price_history(&identity, Some("Steam"), 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].price, 10.0); // newest first
    }

    #[test]
    fn test_global_low_prefers_most_recent_on_tie() {
        let store = SqliteDealStore::open_in_memory().unwrap();
        let identity = GameIdentity::from_parts(None, "Game X");
        let earlier = Utc::now();
        let later = earlier + Duration::hours(2);

        store.upsert_history_low(&identity, "steam", 5.0, earlier).unwrap();
        store.upsert_history_low(&identity, "gog", 5.0, later).unwrap();

        let low = store.get_history_low(&identity, None).unwrap().unwrap();
        assert_eq!(low.lowest_price, 5.0);
        assert_eq!(low.recorded_at, later);

        // A strictly lower price beats recency
        store.upsert_history_low(&identity, "epic", 4.0, earlier).unwrap();
        let low = store.get_history_low(&identity, None).unwrap().unwrap();
        assert_eq!(low.lowest_price, 4.0);
    }

    #[test]
    fn test_watchlist_soft_delete_and_reactivation() {
        let store = SqliteDealStore::open_in_memory().unwrap();
        let entry = WatchlistEntry::new("Game X", None, Some(15.0), Some("Steam".to_string()));

        store.upsert_watchlist_entry(&entry).unwrap();
        assert_eq!(store.list_watchlist(true).unwrap().len(), 1);

        assert!(store.deactivate_watchlist_entry("Game X", None).unwrap());
        assert!(store.list_watchlist(true).unwrap().is_empty());

        // Row survives as inactive
        let all = store.list_watchlist(false).unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].active);

        // Re-adding reactivates
        store.upsert_watchlist_entry(&entry).unwrap();
        assert_eq!(store.list_watchlist(true).unwrap().len(), 1);

        // Unknown title deactivates nothing
        assert!(!store.deactivate_watchlist_entry("Nope", None).unwrap());
    }

    #[test]
    fn test_touch_last_checked_only_active_entries() {
        let store = SqliteDealStore::open_in_memory().unwrap();
        let entry = WatchlistEntry::new("Game X", None, None, None);
        store.upsert_watchlist_entry(&entry).unwrap();

        let at = Utc::now();
        store.touch_last_checked("Game X", None, at).unwrap();
        let listed = &store.list_watchlist(true).unwrap()[0];
        assert_eq!(listed.last_checked, Some(parse_timestamp(&at.to_rfc3339()).unwrap()));

        store.deactivate_watchlist_entry("Game X", None).unwrap();
        store
            .touch_last_checked("Game X", None, at + Duration::hours(1))
            .unwrap();
        let listed = &store.list_watchlist(false).unwrap()[0];
        assert_eq!(listed.last_checked, Some(parse_timestamp(&at.to_rfc3339()).unwrap()));
    }

    #[test]
    fn test_amazing_deals_round_trip() {
        let store = SqliteDealStore::open_in_memory().unwrap();
        let record = AmazingDealRecord {
            id: None,
            observation: observation("Game X", "Steam", 12.0, Utc::now()),
            reason: "Discount of 80.0%".to_string(),
            notified: false,
        };

        store.save_amazing_deal(&record).unwrap();
        let deals = store.list_amazing_deals(10).unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].reason, "Discount of 80.0%");
        assert!(!deals[0].notified);

        store.mark_deal_notified(deals[0].id.unwrap()).unwrap();
        assert!(store.list_amazing_deals(10).unwrap()[0].notified);
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deals.db");
        let path = path.to_str().unwrap();
        let identity = GameIdentity::from_parts(None, "Game X");

        {
            let store = SqliteDealStore::open(path).unwrap();
            store.upsert_history_low(&identity, "steam", 7.5, Utc::now()).unwrap();
        }

        let store = SqliteDealStore::open(path).unwrap();
        let low = store.get_history_low(&identity, Some("steam")).unwrap().unwrap();
        assert_eq!(low.lowest_price, 7.5);
    }
}
