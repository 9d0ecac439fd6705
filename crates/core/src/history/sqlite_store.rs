//! SQLite-backed history store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ToSql};

use super::{HistoryError, HistoryRow, HistoryStore, Page, SessionRecord, TorrentSummary};
use crate::compliance::UnsatisfiedMode;
use crate::query::{ComposedQuery, Predicate, SortDirection, SortField};

const SELECT_COLUMNS: &str = "h.user_id, h.torrent_id, h.agent, h.uploaded, h.downloaded, \
     h.actual_uploaded, h.actual_downloaded, h.seedtime, h.active, h.seeder, h.immune, \
     h.hitrun, h.prewarn, h.created_at, h.updated_at, h.completed_at, \
     t.id, t.name, t.seeders, t.leechers, t.times_completed, t.size, t.status, t.user_id";

const FROM_JOIN: &str = "FROM history h INNER JOIN torrents t ON t.id = h.torrent_id";

/// SQLite-backed history store.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Create a new SQLite history store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, HistoryError> {
        let conn = Connection::open(path).map_err(db_error)?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite history store (useful for testing).
    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// `unicode_lower(text)`. SQLite's `LIKE` and `lower()` only fold ASCII.
    fn register_functions(conn: &Connection) -> Result<(), HistoryError> {
        conn.create_scalar_function(
            "unicode_lower",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )
        .map_err(db_error)
    }

    fn initialize_schema(conn: &Connection) -> Result<(), HistoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS torrents (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                seeders INTEGER NOT NULL DEFAULT 0,
                leechers INTEGER NOT NULL DEFAULT 0,
                times_completed INTEGER NOT NULL DEFAULT 0,
                size INTEGER NOT NULL,
                status INTEGER NOT NULL DEFAULT 0,
                user_id INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_torrents_user_id ON torrents(user_id);
            CREATE INDEX IF NOT EXISTS idx_torrents_status ON torrents(status);

            CREATE TABLE IF NOT EXISTS history (
                user_id INTEGER NOT NULL,
                torrent_id INTEGER NOT NULL,
                agent TEXT NOT NULL DEFAULT '',
                uploaded INTEGER NOT NULL DEFAULT 0,
                downloaded INTEGER NOT NULL DEFAULT 0,
                actual_uploaded INTEGER NOT NULL DEFAULT 0,
                actual_downloaded INTEGER NOT NULL DEFAULT 0,
                seedtime INTEGER NOT NULL DEFAULT 0,
                active INTEGER NOT NULL DEFAULT 0,
                seeder INTEGER NOT NULL DEFAULT 0,
                immune INTEGER NOT NULL DEFAULT 0,
                hitrun INTEGER NOT NULL DEFAULT 0,
                prewarn INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                completed_at TEXT,
                PRIMARY KEY (user_id, torrent_id)
            );

            CREATE INDEX IF NOT EXISTS idx_history_user_created ON history(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_history_torrent ON history(torrent_id);
            "#,
        )
        .map_err(db_error)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn
            .lock()
            .map_err(|_| HistoryError::Database("connection lock poisoned".to_string()))
    }

    fn build_where_clause(query: &ComposedQuery) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = vec!["h.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(query.user_id)];

        for predicate in &query.predicates {
            match predicate {
                Predicate::Unsatisfied { mode, policy } => {
                    let condition = match mode {
                        UnsatisfiedMode::Exclude => {
                            "(h.seedtime > ? OR h.immune = 1 OR h.actual_downloaded < t.size * ?)"
                        }
                        UnsatisfiedMode::Include => {
                            "(h.seedtime < ? AND h.immune = 0 AND h.actual_downloaded > t.size * ?)"
                        }
                    };
                    conditions.push(condition.to_string());
                    params.push(Box::new(policy.seedtime.as_secs()));
                    params.push(Box::new(policy.buffer));
                }
                Predicate::Active(value) => push_flag(&mut conditions, &mut params, "h.active", *value),
                Predicate::Completed(value) => {
                    push_flag(&mut conditions, &mut params, "h.seeder", *value)
                }
                Predicate::Prewarn(value) => {
                    push_flag(&mut conditions, &mut params, "h.prewarn", *value)
                }
                Predicate::HitRun(value) => push_flag(&mut conditions, &mut params, "h.hitrun", *value),
                Predicate::Immune(value) => push_flag(&mut conditions, &mut params, "h.immune", *value),
                Predicate::UploadedBy { user_id, uploaded } => {
                    let op = if *uploaded { "=" } else { "<>" };
                    conditions.push(format!("t.user_id {} ?", op));
                    params.push(Box::new(*user_id));
                }
                Predicate::Name(pattern) => {
                    conditions.push("unicode_lower(t.name) LIKE ? ESCAPE '\\'".to_string());
                    params.push(Box::new(pattern.to_like_pattern()));
                }
                Predicate::Status(codes) => {
                    let placeholders = vec!["?"; codes.len()].join(", ");
                    conditions.push(format!("t.status IN ({})", placeholders));
                    for code in codes {
                        params.push(Box::new(*code));
                    }
                }
            }
        }

        (format!("WHERE {}", conditions.join(" AND ")), params)
    }

    /// SQL expression for an allow-listed sort field.
    fn sort_expr(field: SortField, viewer_id: u64) -> String {
        let expr = match field {
            SortField::Agent => "h.agent",
            SortField::Uploaded => "h.uploaded",
            SortField::Downloaded => "h.downloaded",
            SortField::ActualUploaded => "h.actual_uploaded",
            SortField::ActualDownloaded => "h.actual_downloaded",
            SortField::Seedtime => "h.seedtime",
            SortField::Active => "h.active",
            SortField::Seeder => "h.seeder",
            SortField::Immune => "h.immune",
            SortField::Hitrun => "h.hitrun",
            SortField::Prewarn => "h.prewarn",
            SortField::CreatedAt => "h.created_at",
            SortField::UpdatedAt => "h.updated_at",
            SortField::CompletedAt => "h.completed_at",
            SortField::Name => "t.name",
            SortField::Seeders => "t.seeders",
            SortField::Leechers => "t.leechers",
            SortField::TimesCompleted => "t.times_completed",
            SortField::Size => "t.size",
            SortField::Status => "t.status",
            SortField::Seeding => "(h.active AND h.seeder)",
            SortField::Leeching => "(h.active AND NOT h.seeder)",
            SortField::Leechtime => {
                "(CAST(strftime('%s', h.completed_at) AS INTEGER) - CAST(strftime('%s', h.created_at) AS INTEGER))"
            }
            SortField::Ratio => "(CAST(h.uploaded AS REAL) / (h.downloaded + 1))",
            SortField::ActualRatio => "(CAST(h.actual_uploaded AS REAL) / (h.actual_downloaded + 1))",
            // The viewer id is an integer, so it is safe to inline.
            SortField::SelfUploaded => return format!("(t.user_id = {})", viewer_id),
        };
        expr.to_string()
    }

    fn row_to_parts(row: &rusqlite::Row) -> rusqlite::Result<(SessionRecord, TorrentSummary)> {
        let record = SessionRecord {
            user_id: row.get(0)?,
            torrent_id: row.get(1)?,
            agent: row.get(2)?,
            uploaded: row.get(3)?,
            downloaded: row.get(4)?,
            actual_uploaded: row.get(5)?,
            actual_downloaded: row.get(6)?,
            seedtime: row.get(7)?,
            active: row.get(8)?,
            seeder: row.get(9)?,
            immune: row.get(10)?,
            hitrun: row.get(11)?,
            prewarn: row.get(12)?,
            created_at: parse_timestamp(13, &row.get::<_, String>(13)?)?,
            updated_at: parse_timestamp(14, &row.get::<_, String>(14)?)?,
            completed_at: row
                .get::<_, Option<String>>(15)?
                .map(|s| parse_timestamp(15, &s))
                .transpose()?,
        };

        let torrent = TorrentSummary {
            id: row.get(16)?,
            name: row.get(17)?,
            seeders: row.get(18)?,
            leechers: row.get(19)?,
            times_completed: row.get(20)?,
            size: row.get(21)?,
            status: row.get(22)?,
            user_id: row.get(23)?,
        };

        Ok((record, torrent))
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn upsert_torrent(&self, torrent: &TorrentSummary) -> Result<(), HistoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO torrents (id, name, seeders, leechers, times_completed, size, status, user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                seeders = excluded.seeders,
                leechers = excluded.leechers,
                times_completed = excluded.times_completed,
                size = excluded.size,
                status = excluded.status,
                user_id = excluded.user_id",
            params![
                torrent.id,
                torrent.name,
                torrent.seeders,
                torrent.leechers,
                torrent.times_completed,
                torrent.size,
                torrent.status,
                torrent.user_id,
            ],
        )
        .map_err(db_error)?;
        Ok(())
    }

    fn upsert_session(&self, record: &SessionRecord) -> Result<(), HistoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO history (user_id, torrent_id, agent, uploaded, downloaded, actual_uploaded,
                actual_downloaded, seedtime, active, seeder, immune, hitrun, prewarn,
                created_at, updated_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, torrent_id) DO UPDATE SET
                agent = excluded.agent,
                uploaded = excluded.uploaded,
                downloaded = excluded.downloaded,
                actual_uploaded = excluded.actual_uploaded,
                actual_downloaded = excluded.actual_downloaded,
                seedtime = excluded.seedtime,
                active = excluded.active,
                seeder = excluded.seeder,
                immune = excluded.immune,
                hitrun = excluded.hitrun,
                prewarn = excluded.prewarn,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                completed_at = excluded.completed_at",
            params![
                record.user_id,
                record.torrent_id,
                record.agent,
                record.uploaded,
                record.downloaded,
                record.actual_uploaded,
                record.actual_downloaded,
                record.seedtime,
                record.active,
                record.seeder,
                record.immune,
                record.hitrun,
                record.prewarn,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
                record.completed_at.as_ref().map(format_timestamp),
            ],
        )
        .map_err(db_error)?;
        Ok(())
    }

    fn query(&self, query: &ComposedQuery) -> Result<Page<HistoryRow>, HistoryError> {
        let conn = self.conn()?;

        let (where_clause, params) = Self::build_where_clause(query);

        let count_sql = format!("SELECT COUNT(*) {} {}", FROM_JOIN, where_clause);
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let total: i64 = conn
            .query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(db_error)?;

        let direction = match query.sort.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        let sql = format!(
            "SELECT {} {} {} ORDER BY {} {}, h.torrent_id ASC LIMIT ? OFFSET ?",
            SELECT_COLUMNS,
            FROM_JOIN,
            where_clause,
            Self::sort_expr(query.sort.field, query.user_id),
            direction
        );

        let mut stmt = conn.prepare(&sql).map_err(db_error)?;

        // Build parameter slice with limit and offset
        let mut all_params = params;
        all_params.push(Box::new(query.per_page));
        all_params.push(Box::new(query.offset()));
        let param_refs: Vec<&dyn ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_parts)
            .map_err(db_error)?;

        let mut page_rows = Vec::new();
        for row_result in rows {
            let (record, torrent) = row_result.map_err(db_error)?;
            page_rows.push(HistoryRow::new(record, torrent, query.user_id, &query.policy));
        }

        Ok(Page {
            rows: page_rows,
            total: total.max(0) as u64,
            page: query.page,
            per_page: query.per_page,
        })
    }
}

fn push_flag(
    conditions: &mut Vec<String>,
    params: &mut Vec<Box<dyn ToSql>>,
    column: &str,
    value: bool,
) {
    conditions.push(format!("{} = ?", column));
    params.push(Box::new(value));
}

fn db_error(e: rusqlite::Error) -> HistoryError {
    HistoryError::Database(e.to_string())
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
