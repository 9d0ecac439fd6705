use crate::compliance::{ComplianceEvaluator, HitRunPolicy, UnsatisfiedMode};
use crate::history::{SessionRecord, TorrentSummary};

use super::NamePattern;

/// One independent filter condition over a joined session row.
///
/// Predicates are combined with AND and are order-independent.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Hit-and-run axis, carrying the thresholds it was built with.
    Unsatisfied {
        mode: UnsatisfiedMode,
        policy: HitRunPolicy,
    },
    Active(bool),
    /// The `seeder` flag.
    Completed(bool),
    Prewarn(bool),
    HitRun(bool),
    Immune(bool),
    /// Whether the torrent's uploader is `user_id`.
    UploadedBy { user_id: u64, uploaded: bool },
    Name(NamePattern),
    /// Torrent status is one of these codes. Never empty.
    Status(Vec<i32>),
}

impl Predicate {
    pub fn matches(&self, record: &SessionRecord, torrent: &TorrentSummary) -> bool {
        match self {
            Predicate::Unsatisfied { mode, policy } => {
                ComplianceEvaluator::new(policy.clone()).matches(*mode, record, torrent)
            }
            Predicate::Active(value) => record.active == *value,
            Predicate::Completed(value) => record.seeder == *value,
            Predicate::Prewarn(value) => record.prewarn == *value,
            Predicate::HitRun(value) => record.hitrun == *value,
            Predicate::Immune(value) => record.immune == *value,
            Predicate::UploadedBy { user_id, uploaded } => {
                (torrent.user_id == *user_id) == *uploaded
            }
            Predicate::Name(pattern) => pattern.matches(&torrent.name),
            Predicate::Status(codes) => codes.contains(&torrent.status),
        }
    }
}
