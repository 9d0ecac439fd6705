use tracing::debug;

use super::{HistoryFilter, NamePattern, Predicate, QueryError, SortState};
use crate::compliance::{ComplianceEvaluator, HitRunPolicy, TriState};
use crate::config::HistoryConfig;
use crate::history::{SessionRecord, TorrentSummary};

/// A fully resolved, validated history query for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    /// Owner of the session records; every query is scoped to one user.
    pub user_id: u64,
    /// Conditions combined with AND.
    pub predicates: Vec<Predicate>,
    pub sort: SortState,
    /// 1-indexed.
    pub page: u32,
    pub per_page: u32,
    /// Policy used for derived compliance columns.
    pub policy: HitRunPolicy,
}

impl ComposedQuery {
    /// Whether a joined row passes every predicate. Does not check `user_id`.
    pub fn matches(&self, record: &SessionRecord, torrent: &TorrentSummary) -> bool {
        self.predicates.iter().all(|p| p.matches(record, torrent))
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

/// Builds [`ComposedQuery`]s from user filter selections.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    evaluator: ComplianceEvaluator,
    default_per_page: u32,
    max_per_page: u32,
}

impl QueryComposer {
    pub fn new(policy: HitRunPolicy, config: &HistoryConfig) -> Self {
        Self {
            evaluator: ComplianceEvaluator::new(policy),
            default_per_page: config.default_per_page,
            max_per_page: config.max_per_page,
        }
    }

    pub fn policy(&self) -> &HitRunPolicy {
        self.evaluator.policy()
    }

    pub fn default_per_page(&self) -> u32 {
        self.default_per_page
    }

    /// Validate paging and assemble the predicate list.
    ///
    /// Page sizes above the configured maximum are clamped; pages and page
    /// sizes below 1 are rejected.
    pub fn compose(
        &self,
        user_id: u64,
        filter: &HistoryFilter,
        sort: SortState,
        page: i64,
        per_page: i64,
    ) -> Result<ComposedQuery, QueryError> {
        if page < 1 || page > i64::from(u32::MAX) {
            return Err(QueryError::InvalidPage(page));
        }
        if per_page < 1 {
            return Err(QueryError::InvalidPageSize(per_page));
        }
        let per_page = per_page.min(i64::from(self.max_per_page)) as u32;

        let predicates = self.predicates(user_id, filter);
        debug!(
            user_id,
            predicates = predicates.len(),
            sort = %sort.field,
            page,
            per_page,
            "Composed history query"
        );

        Ok(ComposedQuery {
            user_id,
            predicates,
            sort,
            page: page as u32,
            per_page,
            policy: self.evaluator.policy().clone(),
        })
    }

    /// In order: unsatisfied, the flag axes, ownership, name, status.
    pub fn predicates(&self, user_id: u64, filter: &HistoryFilter) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(mode) = self.evaluator.unsatisfied_mode(filter.unsatisfied) {
            predicates.push(Predicate::Unsatisfied {
                mode,
                policy: self.evaluator.policy().clone(),
            });
        }

        let flag_axes: [(TriState, fn(bool) -> Predicate); 5] = [
            (filter.active, Predicate::Active),
            (filter.completed, Predicate::Completed),
            (filter.prewarn, Predicate::Prewarn),
            (filter.hitrun, Predicate::HitRun),
            (filter.immune, Predicate::Immune),
        ];
        for (state, predicate) in flag_axes {
            if let Some(value) = state.required() {
                predicates.push(predicate(value));
            }
        }

        if let Some(uploaded) = filter.uploaded.required() {
            predicates.push(Predicate::UploadedBy { user_id, uploaded });
        }

        if let Some(pattern) = NamePattern::parse(&filter.name) {
            predicates.push(Predicate::Name(pattern));
        }

        if !filter.status.is_empty() {
            predicates.push(Predicate::Status(filter.status.iter().copied().collect()));
        }

        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::UnsatisfiedMode;
    use crate::query::{SortDirection, SortField};

    fn composer(enabled: bool) -> QueryComposer {
        QueryComposer::new(
            HitRunPolicy::new(enabled, 200, 0.5),
            &HistoryConfig::default(),
        )
    }

    #[test]
    fn test_neutral_filter_has_no_predicates() {
        let query = composer(true)
            .compose(1, &HistoryFilter::new(), SortState::default(), 1, 25)
            .unwrap();
        assert!(query.predicates.is_empty());
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_every_axis_becomes_one_predicate() {
        let filter = HistoryFilter::new()
            .with_unsatisfied(TriState::Include)
            .with_active(TriState::Include)
            .with_completed(TriState::Exclude)
            .with_prewarn(TriState::Exclude)
            .with_hitrun(TriState::Include)
            .with_immune(TriState::Exclude)
            .with_uploaded(TriState::Include)
            .with_name("linux iso")
            .with_status([0, 1]);

        let predicates = composer(true).predicates(42, &filter);
        assert_eq!(predicates.len(), 9);
        assert!(matches!(
            predicates[0],
            Predicate::Unsatisfied {
                mode: UnsatisfiedMode::Include,
                ..
            }
        ));
        assert!(predicates.contains(&Predicate::Active(true)));
        assert!(predicates.contains(&Predicate::Completed(false)));
        assert!(predicates.contains(&Predicate::UploadedBy {
            user_id: 42,
            uploaded: true
        }));
        assert!(matches!(predicates[7], Predicate::Name(_)));
        assert_eq!(predicates[8], Predicate::Status(vec![0, 1]));
    }

    #[test]
    fn test_disabled_hitrun_drops_unsatisfied_axis() {
        for state in [TriState::Include, TriState::Exclude] {
            let filter = HistoryFilter::new().with_unsatisfied(state);
            assert!(composer(false).predicates(1, &filter).is_empty());
        }
    }

    #[test]
    fn test_empty_status_set_is_no_filter() {
        let filter = HistoryFilter::new().with_status([]);
        assert!(composer(true).predicates(1, &filter).is_empty());
    }

    #[test]
    fn test_paging_validation() {
        let c = composer(true);
        let filter = HistoryFilter::new();
        let sort = SortState::new(SortField::Name, SortDirection::Asc);

        assert_eq!(
            c.compose(1, &filter, sort, 0, 25),
            Err(QueryError::InvalidPage(0))
        );
        assert_eq!(
            c.compose(1, &filter, sort, -3, 25),
            Err(QueryError::InvalidPage(-3))
        );
        assert_eq!(
            c.compose(1, &filter, sort, 1, 0),
            Err(QueryError::InvalidPageSize(0))
        );

        let query = c.compose(1, &filter, sort, 3, 10_000).unwrap();
        assert_eq!(query.per_page, 100);
        assert_eq!(query.offset(), 200);
        assert_eq!(query.sort, sort);
    }
}
