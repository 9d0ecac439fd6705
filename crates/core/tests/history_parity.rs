//! SQLite and in-memory history stores must agree on every query.

use seedwatch_core::{
    compliance::TriState,
    config::HistoryConfig,
    history::{HistoryRow, HistoryStore, MemoryHistoryStore, Page, SqliteHistoryStore},
    query::{HistoryFilter, QueryComposer, SortDirection, SortField, SortState},
    testing::fixtures,
    HitRunPolicy,
};

const USER: u64 = 1;
const OTHER_USER: u64 = 2;

/// Populate a store with a mix of seeding, leeching, immune, completed and
/// self-uploaded records for `USER`, plus noise for another user.
fn populate(store: &dyn HistoryStore) {
    let names = [
        "Big.Buck.Bunny.1080p",
        "Sintel 2160p HDR",
        "Tears of Steel",
        "big buck bunny 720p",
        "Elephants Dream",
        "Cosmos Laundromat 1080p",
        "Spring",
        "Agent 327",
        "Caminandes",
        "Glass Half",
        "Hero 100%",
        "Coffee_Run",
    ];

    for (i, name) in names.iter().enumerate() {
        let id = i as u64 + 1;
        let mut torrent = fixtures::torrent(id, name);
        torrent.size = 1_000 * (id % 4 + 1);
        torrent.seeders = (id * 7 % 5) as u32;
        torrent.leechers = (id % 3) as u32;
        torrent.status = (id % 3) as i32;
        if id % 4 == 0 {
            torrent.user_id = USER;
        }
        store.upsert_torrent(&torrent).unwrap();

        let mut record = if id % 3 == 0 {
            fixtures::seeded_session(USER, id, id * 50)
        } else {
            fixtures::session(USER, id)
        };
        record.agent = if id % 2 == 0 {
            "Transmission/4.0".to_string()
        } else {
            "qBittorrent/4.6.0".to_string()
        };
        record.uploaded = id * 1_000;
        record.downloaded = (13 - id) * 500;
        record.actual_uploaded = id * 900;
        record.actual_downloaded = torrent.size * (id % 5) / 4;
        record.seedtime = id * 25;
        record.active = id % 5 != 0;
        record.immune = id == 7;
        record.hitrun = id == 2;
        record.prewarn = id == 2 || id == 11;
        store.upsert_session(&record).unwrap();

        store.upsert_session(&fixtures::session(OTHER_USER, id)).unwrap();
    }
}

fn stores() -> (SqliteHistoryStore, MemoryHistoryStore) {
    let sqlite = SqliteHistoryStore::in_memory().unwrap();
    let memory = MemoryHistoryStore::new();
    populate(&sqlite);
    populate(&memory);
    (sqlite, memory)
}

fn composer() -> QueryComposer {
    QueryComposer::new(HitRunPolicy::new(true, 200, 0.5), &HistoryConfig::default())
}

fn run_both(
    sqlite: &SqliteHistoryStore,
    memory: &MemoryHistoryStore,
    filter: &HistoryFilter,
    sort: SortState,
    page: i64,
    per_page: i64,
) -> (Page<HistoryRow>, Page<HistoryRow>) {
    let query = composer().compose(USER, filter, sort, page, per_page).unwrap();
    (sqlite.query(&query).unwrap(), memory.query(&query).unwrap())
}

fn ids(page: &Page<HistoryRow>) -> Vec<u64> {
    page.rows.iter().map(|r| r.record.torrent_id).collect()
}

#[test]
fn every_sort_field_orders_identically() {
    let (sqlite, memory) = stores();

    for field in SortField::ALL {
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sort = SortState::new(field, direction);
            let (a, b) = run_both(&sqlite, &memory, &HistoryFilter::new(), sort, 1, 100);
            assert_eq!(ids(&a), ids(&b), "sort {} {}", field, direction.as_str());
            assert_eq!(a, b, "rows differ for sort {} {}", field, direction.as_str());
        }
    }
}

#[test]
fn flag_filters_agree() {
    let (sqlite, memory) = stores();
    let states = [TriState::Include, TriState::Exclude, TriState::Neutral];

    for state in states {
        let filters = [
            HistoryFilter::new().with_active(state),
            HistoryFilter::new().with_completed(state),
            HistoryFilter::new().with_prewarn(state),
            HistoryFilter::new().with_hitrun(state),
            HistoryFilter::new().with_immune(state),
            HistoryFilter::new().with_uploaded(state),
            HistoryFilter::new().with_unsatisfied(state),
        ];
        for filter in filters {
            let (a, b) = run_both(&sqlite, &memory, &filter, SortState::default(), 1, 100);
            assert_eq!(a.total, b.total, "{:?}", filter);
            assert_eq!(ids(&a), ids(&b), "{:?}", filter);
        }
    }
}

#[test]
fn name_search_agrees() {
    let (sqlite, memory) = stores();

    for needle in ["bunny", "BIG 1080", "p", "100%", "_", "coffee_run", "dream steel", ""] {
        let filter = HistoryFilter::new().with_name(needle);
        let (a, b) = run_both(&sqlite, &memory, &filter, SortState::default(), 1, 100);
        assert_eq!(ids(&a), ids(&b), "needle {:?}", needle);
    }

    let filter = HistoryFilter::new().with_name("bunny");
    let (a, _) = run_both(&sqlite, &memory, &filter, SortState::default(), 1, 100);
    assert_eq!(a.total, 2);

    // Underscore is literal, not a single-character wildcard.
    let filter = HistoryFilter::new().with_name("_");
    let (a, _) = run_both(&sqlite, &memory, &filter, SortState::default(), 1, 100);
    assert_eq!(ids(&a), vec![12]);
}

#[test]
fn combined_filters_and_pages_agree() {
    let (sqlite, memory) = stores();
    let filter = HistoryFilter::new()
        .with_active(TriState::Include)
        .with_immune(TriState::Exclude)
        .with_status([0, 1]);
    let sort = SortState::new(SortField::Ratio, SortDirection::Desc);

    let (all, _) = run_both(&sqlite, &memory, &filter, sort, 1, 100);
    assert!(all.total > 3);

    let mut collected = Vec::new();
    for page in 1..=all.last_page() as i64 + 1 {
        let (a, b) = run_both(&sqlite, &memory, &filter, sort, page, 3);
        assert_eq!(a, b, "page {}", page);
        assert_eq!(a.total, all.total);
        collected.extend(ids(&a));
    }
    assert_eq!(collected, ids(&all));
}

#[test]
fn empty_status_set_equals_no_status_filter() {
    let (sqlite, memory) = stores();
    let (a, _) = run_both(
        &sqlite,
        &memory,
        &HistoryFilter::new().with_status(Vec::<i32>::new()),
        SortState::default(),
        1,
        100,
    );
    let (b, _) = run_both(&sqlite, &memory, &HistoryFilter::new(), SortState::default(), 1, 100);
    assert_eq!(a, b);
    assert_eq!(a.total, 12);
}

#[test]
fn other_users_records_never_leak() {
    let (sqlite, memory) = stores();
    let (a, b) = run_both(&sqlite, &memory, &HistoryFilter::new(), SortState::default(), 1, 100);
    assert!(a.rows.iter().all(|r| r.record.user_id == USER));
    assert!(b.rows.iter().all(|r| r.record.user_id == USER));
}

#[test]
fn sessions_without_torrent_are_accepted_and_hidden() {
    let (sqlite, memory) = stores();
    for store in [&sqlite as &dyn HistoryStore, &memory as &dyn HistoryStore] {
        store.upsert_session(&fixtures::session(USER, 99)).unwrap();
    }

    let (a, b) = run_both(&sqlite, &memory, &HistoryFilter::new(), SortState::default(), 1, 100);
    assert_eq!(a, b);
    assert_eq!(a.total, 12);
    assert!(!ids(&a).contains(&99));

    // Once the torrent arrives the session joins in on both backends.
    for store in [&sqlite as &dyn HistoryStore, &memory as &dyn HistoryStore] {
        store.upsert_torrent(&fixtures::torrent(99, "Late Arrival")).unwrap();
    }
    let (a, b) = run_both(&sqlite, &memory, &HistoryFilter::new(), SortState::default(), 1, 100);
    assert_eq!(a, b);
    assert_eq!(a.total, 13);
    assert!(ids(&a).contains(&99));
}

#[test]
fn non_ascii_name_search_folds_case_on_both_backends() {
    let (sqlite, memory) = stores();
    for store in [&sqlite as &dyn HistoryStore, &memory as &dyn HistoryStore] {
        store
            .upsert_torrent(&fixtures::torrent(50, "Le Fabuleux Destin d'Amélie Poulain"))
            .unwrap();
        store.upsert_torrent(&fixtures::torrent(51, "ÜBERWACHUNG 1080p")).unwrap();
        store.upsert_session(&fixtures::session(USER, 50)).unwrap();
        store.upsert_session(&fixtures::session(USER, 51)).unwrap();
    }

    for (query, expected) in [
        ("AMÉLIE poulain", vec![50]),
        ("amélie", vec![50]),
        ("überwachung", vec![51]),
        ("Überwachung 1080P", vec![51]),
    ] {
        let filter = HistoryFilter::new().with_name(query);
        let (a, b) = run_both(&sqlite, &memory, &filter, SortState::default(), 1, 100);
        assert_eq!(a, b, "query {:?}", query);
        assert_eq!(ids(&a), expected, "query {:?}", query);
    }
}
