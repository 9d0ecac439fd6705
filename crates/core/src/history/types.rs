//! Session history rows and their derived columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compliance::{ComplianceEvaluator, HitRunPolicy};

/// Torrent metadata joined onto a session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentSummary {
    pub id: u64,
    pub name: String,
    pub seeders: u32,
    pub leechers: u32,
    pub times_completed: u32,
    /// Total size in bytes.
    pub size: u64,
    /// Moderation status code.
    pub status: i32,
    /// Uploader of the torrent.
    pub user_id: u64,
}

/// One user's cumulative activity against one torrent.
///
/// "Actual" counters exclude credited or bonus bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: u64,
    pub torrent_id: u64,
    /// Client agent of the most recent announce.
    pub agent: String,
    pub uploaded: u64,
    pub downloaded: u64,
    pub actual_uploaded: u64,
    pub actual_downloaded: u64,
    /// Cumulative seconds spent seeding.
    pub seedtime: u64,
    pub active: bool,
    /// Has completed the torrent at least once.
    pub seeder: bool,
    pub immune: bool,
    pub hitrun: bool,
    pub prewarn: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Currently announcing as a seeder.
    pub fn seeding(&self) -> bool {
        self.active && self.seeder
    }

    /// Currently announcing without having completed.
    pub fn leeching(&self) -> bool {
        self.active && !self.seeder
    }

    /// Seconds from first announce to first completion.
    pub fn leech_seconds(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.created_at).num_seconds())
    }

    /// `uploaded / (downloaded + 1)`; the offset keeps the ratio finite.
    pub fn ratio(&self) -> f64 {
        self.uploaded as f64 / (self.downloaded as f64 + 1.0)
    }

    pub fn actual_ratio(&self) -> f64 {
        self.actual_uploaded as f64 / (self.actual_downloaded as f64 + 1.0)
    }
}

/// A session record joined with its torrent, plus query-time derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(flatten)]
    pub record: SessionRecord,
    pub torrent: TorrentSummary,
    /// The viewing user uploaded this torrent.
    pub self_uploaded: bool,
    pub seeding: bool,
    pub leeching: bool,
    /// Seconds spent leeching before completion.
    pub leechtime: Option<i64>,
    pub ratio: f64,
    pub actual_ratio: f64,
    /// Violates the seeding requirement right now. `None` when hit-and-run
    /// evaluation is disabled.
    pub unsatisfied: Option<bool>,
}

impl HistoryRow {
    pub fn new(
        record: SessionRecord,
        torrent: TorrentSummary,
        viewer_id: u64,
        policy: &HitRunPolicy,
    ) -> Self {
        let unsatisfied = ComplianceEvaluator::new(policy.clone()).is_unsatisfied(&record, &torrent);
        Self {
            self_uploaded: torrent.user_id == viewer_id,
            seeding: record.seeding(),
            leeching: record.leeching(),
            leechtime: record.leech_seconds(),
            ratio: record.ratio(),
            actual_ratio: record.actual_ratio(),
            unsatisfied,
            record,
            torrent,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// Rows matching the query across all pages.
    pub total: u64,
    /// 1-indexed page number.
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Number of the last page (at least 1).
    pub fn last_page(&self) -> u32 {
        if self.total == 0 || self.per_page == 0 {
            return 1;
        }
        let per_page = u64::from(self.per_page);
        self.total.div_ceil(per_page).min(u64::from(u32::MAX)) as u32
    }

    pub fn has_more(&self) -> bool {
        self.page < self.last_page()
    }
}
