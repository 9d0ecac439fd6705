use std::collections::BTreeSet;

use serde::Serialize;

use super::{
    ComposedQuery, HistoryFilter, QueryComposer, QueryError, SortDirection, SortField, SortState,
};
use crate::compliance::TriState;

/// Interactive state of one user's history table: filters, sort and page.
///
/// Changing any filter or the page size jumps back to page 1 so the user
/// never lands on a page past the end of a narrower result set. Sorting
/// keeps the current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub user_id: u64,
    filter: HistoryFilter,
    sort: SortState,
    page: u32,
    per_page: u32,
}

impl HistoryView {
    pub fn new(user_id: u64, per_page: u32) -> Self {
        Self {
            user_id,
            filter: HistoryFilter::default(),
            sort: SortState::default(),
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Replace all filters at once.
    pub fn set_filter(&mut self, filter: HistoryFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let filter = HistoryFilter {
            name: name.into(),
            ..self.filter.clone()
        };
        self.set_filter(filter);
    }

    pub fn set_unsatisfied(&mut self, state: TriState) {
        let filter = self.filter.clone().with_unsatisfied(state);
        self.set_filter(filter);
    }

    pub fn set_active(&mut self, state: TriState) {
        let filter = self.filter.clone().with_active(state);
        self.set_filter(filter);
    }

    pub fn set_completed(&mut self, state: TriState) {
        let filter = self.filter.clone().with_completed(state);
        self.set_filter(filter);
    }

    pub fn set_prewarn(&mut self, state: TriState) {
        let filter = self.filter.clone().with_prewarn(state);
        self.set_filter(filter);
    }

    pub fn set_hitrun(&mut self, state: TriState) {
        let filter = self.filter.clone().with_hitrun(state);
        self.set_filter(filter);
    }

    pub fn set_immune(&mut self, state: TriState) {
        let filter = self.filter.clone().with_immune(state);
        self.set_filter(filter);
    }

    pub fn set_uploaded(&mut self, state: TriState) {
        let filter = self.filter.clone().with_uploaded(state);
        self.set_filter(filter);
    }

    pub fn set_status(&mut self, status: BTreeSet<i32>) {
        let filter = HistoryFilter {
            status,
            ..self.filter.clone()
        };
        self.set_filter(filter);
    }

    pub fn set_per_page(&mut self, per_page: u32) -> Result<(), QueryError> {
        if per_page == 0 {
            return Err(QueryError::InvalidPageSize(0));
        }
        if self.per_page != per_page {
            self.per_page = per_page;
            self.page = 1;
        }
        Ok(())
    }

    pub fn set_page(&mut self, page: i64) -> Result<(), QueryError> {
        if page < 1 || page > i64::from(u32::MAX) {
            return Err(QueryError::InvalidPage(page));
        }
        self.page = page as u32;
        Ok(())
    }

    /// Column header click.
    pub fn sort_by(&mut self, field: SortField) {
        self.sort.sort_by(field);
    }

    /// Set sort field and direction directly, e.g. from a query string.
    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.sort = SortState::new(field, direction);
    }

    pub fn compose(&self, composer: &QueryComposer) -> Result<ComposedQuery, QueryError> {
        composer.compose(
            self.user_id,
            &self.filter,
            self.sort,
            i64::from(self.page),
            i64::from(self.per_page),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_on_page(page: i64) -> HistoryView {
        let mut view = HistoryView::new(1, 25);
        view.set_page(page).unwrap();
        view
    }

    #[test]
    fn test_defaults() {
        let view = HistoryView::new(7, 25);
        assert_eq!(view.page(), 1);
        assert_eq!(view.per_page(), 25);
        assert_eq!(view.sort(), SortState::default());
        assert_eq!(view.filter(), &HistoryFilter::default());
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut view = view_on_page(4);
        view.set_name("debian");
        assert_eq!(view.page(), 1);

        view.set_page(3).unwrap();
        view.set_hitrun(TriState::Include);
        assert_eq!(view.page(), 1);

        view.set_page(3).unwrap();
        view.set_status(BTreeSet::from([1, 2]));
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_unchanged_filter_keeps_page() {
        let mut view = view_on_page(4);
        view.set_active(TriState::Neutral);
        assert_eq!(view.page(), 4);
    }

    #[test]
    fn test_per_page_change_resets_page() {
        let mut view = view_on_page(4);
        view.set_per_page(50).unwrap();
        assert_eq!(view.page(), 1);
        assert_eq!(
            view.set_per_page(0),
            Err(QueryError::InvalidPageSize(0))
        );
    }

    #[test]
    fn test_sort_keeps_page() {
        let mut view = view_on_page(2);
        view.sort_by(SortField::CreatedAt);
        assert_eq!(
            view.sort(),
            SortState::new(SortField::CreatedAt, SortDirection::Asc)
        );
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn test_invalid_page() {
        let mut view = HistoryView::new(1, 25);
        assert_eq!(view.set_page(0), Err(QueryError::InvalidPage(0)));
        assert_eq!(view.set_page(-1), Err(QueryError::InvalidPage(-1)));
        assert_eq!(view.page(), 1);
    }
}
