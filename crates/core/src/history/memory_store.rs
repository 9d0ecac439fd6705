//! In-memory history store.
//!
//! Evaluates composed queries with the same predicate and ordering rules as
//! the SQLite backend. Used by tests and small deployments.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{HistoryError, HistoryRow, HistoryStore, Page, SessionRecord, TorrentSummary};
use crate::query::{ComposedQuery, SortDirection, SortField};

#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    torrents: RwLock<HashMap<u64, TorrentSummary>>,
    sessions: RwLock<HashMap<(u64, u64), SessionRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn upsert_torrent(&self, torrent: &TorrentSummary) -> Result<(), HistoryError> {
        self.torrents
            .write()
            .map_err(|_| poisoned())?
            .insert(torrent.id, torrent.clone());
        Ok(())
    }

    fn upsert_session(&self, record: &SessionRecord) -> Result<(), HistoryError> {
        self.sessions
            .write()
            .map_err(|_| poisoned())?
            .insert((record.user_id, record.torrent_id), record.clone());
        Ok(())
    }

    fn query(&self, query: &ComposedQuery) -> Result<Page<HistoryRow>, HistoryError> {
        let torrents = self.torrents.read().map_err(|_| poisoned())?;
        let sessions = self.sessions.read().map_err(|_| poisoned())?;

        let mut rows: Vec<HistoryRow> = sessions
            .values()
            .filter(|record| record.user_id == query.user_id)
            .filter_map(|record| torrents.get(&record.torrent_id).map(|t| (record, t)))
            .filter(|(record, torrent)| query.matches(record, torrent))
            .map(|(record, torrent)| {
                HistoryRow::new(record.clone(), torrent.clone(), query.user_id, &query.policy)
            })
            .collect();

        rows.sort_by(|a, b| {
            let ordering = compare_by(query.sort.field, a, b);
            let ordering = match query.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.record.torrent_id.cmp(&b.record.torrent_id))
        });

        let total = rows.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(query.per_page as usize)
            .collect();

        Ok(Page {
            rows,
            total,
            page: query.page,
            per_page: query.per_page,
        })
    }
}

/// Ascending comparison on one sort field. Missing values sort first.
fn compare_by(field: SortField, a: &HistoryRow, b: &HistoryRow) -> Ordering {
    let (ra, rb) = (&a.record, &b.record);
    let (ta, tb) = (&a.torrent, &b.torrent);
    match field {
        SortField::Agent => ra.agent.cmp(&rb.agent),
        SortField::Uploaded => ra.uploaded.cmp(&rb.uploaded),
        SortField::Downloaded => ra.downloaded.cmp(&rb.downloaded),
        SortField::ActualUploaded => ra.actual_uploaded.cmp(&rb.actual_uploaded),
        SortField::ActualDownloaded => ra.actual_downloaded.cmp(&rb.actual_downloaded),
        SortField::Seedtime => ra.seedtime.cmp(&rb.seedtime),
        SortField::Active => ra.active.cmp(&rb.active),
        SortField::Seeder => ra.seeder.cmp(&rb.seeder),
        SortField::Immune => ra.immune.cmp(&rb.immune),
        SortField::Hitrun => ra.hitrun.cmp(&rb.hitrun),
        SortField::Prewarn => ra.prewarn.cmp(&rb.prewarn),
        SortField::CreatedAt => ra.created_at.cmp(&rb.created_at),
        SortField::UpdatedAt => ra.updated_at.cmp(&rb.updated_at),
        SortField::CompletedAt => ra.completed_at.cmp(&rb.completed_at),
        SortField::Name => ta.name.cmp(&tb.name),
        SortField::Seeders => ta.seeders.cmp(&tb.seeders),
        SortField::Leechers => ta.leechers.cmp(&tb.leechers),
        SortField::TimesCompleted => ta.times_completed.cmp(&tb.times_completed),
        SortField::Size => ta.size.cmp(&tb.size),
        SortField::Status => ta.status.cmp(&tb.status),
        SortField::Seeding => a.seeding.cmp(&b.seeding),
        SortField::Leeching => a.leeching.cmp(&b.leeching),
        SortField::Leechtime => a.leechtime.cmp(&b.leechtime),
        SortField::Ratio => a.ratio.total_cmp(&b.ratio),
        SortField::ActualRatio => a.actual_ratio.total_cmp(&b.actual_ratio),
        SortField::SelfUploaded => a.self_uploaded.cmp(&b.self_uploaded),
    }
}

fn poisoned() -> HistoryError {
    HistoryError::Database("memory store lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::{HitRunPolicy, TriState};
    use crate::config::HistoryConfig;
    use crate::query::{HistoryFilter, QueryComposer, SortState};
    use crate::testing::fixtures;

    fn seeded_store() -> MemoryHistoryStore {
        let store = MemoryHistoryStore::new();
        for id in 1..=5 {
            let mut torrent = fixtures::torrent(id, &format!("Torrent {}", id));
            torrent.size = 1000;
            if id == 3 {
                torrent.user_id = 1;
            }
            store.upsert_torrent(&torrent).unwrap();

            let mut record = fixtures::session(1, id);
            record.seedtime = id * 60;
            record.actual_downloaded = 900;
            record.immune = id == 5;
            store.upsert_session(&record).unwrap();
        }
        store.upsert_session(&fixtures::session(2, 1)).unwrap();
        store
    }

    fn query(filter: HistoryFilter, sort: SortState) -> ComposedQuery {
        QueryComposer::new(HitRunPolicy::new(true, 200, 0.5), &HistoryConfig::default())
            .compose(1, &filter, sort, 1, 25)
            .unwrap()
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let store = seeded_store();
        let page = store
            .query(&query(HistoryFilter::new(), SortState::default()))
            .unwrap();

        let ids: Vec<u64> = page.rows.iter().map(|r| r.torrent.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_unsatisfied_include() {
        let store = seeded_store();
        let page = store
            .query(&query(
                HistoryFilter::new().with_unsatisfied(TriState::Include),
                SortState::new(SortField::Seedtime, SortDirection::Asc),
            ))
            .unwrap();

        // seedtime 60, 120 and 180 are under the 200s threshold; 5 is immune.
        let ids: Vec<u64> = page.rows.iter().map(|r| r.torrent.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(page.rows.iter().all(|r| r.unsatisfied == Some(true)));
    }

    #[test]
    fn test_uploaded_filter() {
        let store = seeded_store();
        let page = store
            .query(&query(
                HistoryFilter::new().with_uploaded(TriState::Include),
                SortState::default(),
            ))
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.rows[0].self_uploaded);

        let page = store
            .query(&query(
                HistoryFilter::new().with_uploaded(TriState::Exclude),
                SortState::default(),
            ))
            .unwrap();
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_ties_break_on_torrent_id() {
        let store = seeded_store();
        let page = store
            .query(&query(
                HistoryFilter::new(),
                SortState::new(SortField::Size, SortDirection::Desc),
            ))
            .unwrap();

        let ids: Vec<u64> = page.rows.iter().map(|r| r.torrent.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let store = seeded_store();
        let composed = QueryComposer::new(HitRunPolicy::disabled(), &HistoryConfig::default())
            .compose(1, &HistoryFilter::new(), SortState::default(), 3, 2)
            .unwrap();
        let page = store.query(&composed).unwrap();
        assert_eq!(page.rows.len(), 1);

        let composed = QueryComposer::new(HitRunPolicy::disabled(), &HistoryConfig::default())
            .compose(1, &HistoryFilter::new(), SortState::default(), 9, 2)
            .unwrap();
        let page = store.query(&composed).unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 5);
    }
}
