//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the cache and prober seams so reachability can be
//! tested without a key-value server or live peers.
//!
//! # Example
//!
//! ```rust,ignore
//! use seedwatch_core::testing::{MockCache, MockProber};
//!
//! let cache = Arc::new(MockCache::new());
//! let prober = Arc::new(MockProber::connectable());
//!
//! let checker = ConnectableChecker::new(&config.announce, "test", cache.clone(), prober.clone());
//! assert!(checker.is_connectable(&endpoint).await);
//! assert_eq!(prober.probe_count().await, 1);
//! ```

mod mock_cache;
mod mock_prober;

pub use mock_cache::MockCache;
pub use mock_prober::{MockProber, RecordedProbe};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::history::{SessionRecord, TorrentSummary};

    /// Uploader id used by [`torrent`]; distinct from the users in most tests.
    pub const UPLOADER_ID: u64 = 1000;

    /// Fixed reference instant, second precision.
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Create a test torrent with reasonable defaults.
    pub fn torrent(id: u64, name: &str) -> TorrentSummary {
        TorrentSummary {
            id,
            name: name.to_string(),
            seeders: 10,
            leechers: 2,
            times_completed: 25,
            size: 1024 * 1024 * 1024, // 1 GiB
            status: 1,
            user_id: UPLOADER_ID,
        }
    }

    /// Create an active, not yet completed session record.
    ///
    /// `created_at` is staggered by torrent id so default ordering is stable.
    pub fn session(user_id: u64, torrent_id: u64) -> SessionRecord {
        let created_at = epoch() + chrono::Duration::minutes(torrent_id as i64);
        SessionRecord {
            user_id,
            torrent_id,
            agent: "qBittorrent/4.6.0".to_string(),
            uploaded: 0,
            downloaded: 0,
            actual_uploaded: 0,
            actual_downloaded: 0,
            seedtime: 0,
            active: true,
            seeder: false,
            immune: false,
            hitrun: false,
            prewarn: false,
            created_at,
            updated_at: created_at,
            completed_at: None,
        }
    }

    /// A completed session that has been seeding for `seedtime` seconds.
    pub fn seeded_session(user_id: u64, torrent_id: u64, seedtime: u64) -> SessionRecord {
        let mut record = session(user_id, torrent_id);
        record.seeder = true;
        record.seedtime = seedtime;
        record.completed_at = Some(record.created_at + chrono::Duration::hours(1));
        record.updated_at = record.created_at + chrono::Duration::seconds(3600 + seedtime as i64);
        record
    }
}
