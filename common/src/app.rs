use crate::columns::{columns, find_column, Column};
use crate::filter::{apply_filters, Filter};
use crate::job::Job;
use crate::render::{render_table, RenderedTable};
use crate::sort::{sort_sessions, SortState};

/// Everything the result view mutates: the fetched job, the sort state and
/// the active filters. Built once per run and passed around explicitly.
#[derive(Debug, Default)]
pub struct AppState {
    pub job: Option<Job>,
    pub sort: SortState,
    pub filters: Vec<Filter>,
}

impl AppState {
    pub fn new(sort: SortState, filters: Vec<Filter>) -> Self {
        Self {
            job: None,
            sort,
            filters,
        }
    }

    /// Replaces the job wholesale.
    pub fn load_job(&mut self, job: Job) {
        log::info!("loaded job {} with {} sessions", job.id, job.sessions.len());
        self.job = Some(job);
    }

    /// Applies a header click and redraws. Returns `None` while no job is
    /// loaded; the sort state still changes.
    pub fn on_column_activated(&mut self, column: &Column) -> Option<RenderedTable> {
        self.sort.activate(column);
        let job = self.job.as_mut()?;
        sort_sessions(&mut job.sessions, column, self.sort.ascending);
        log::debug!(
            "sorted {} sessions by {} ({})",
            job.sessions.len(),
            column.name,
            if self.sort.ascending { "asc" } else { "desc" }
        );
        self.render()
    }

    /// Sorts by the current state without toggling, for a freshly loaded job.
    pub fn apply_sort(&mut self) {
        let Some(column) = find_column(&self.sort.column) else {
            log::warn!("no column {} to sort by", self.sort.column);
            return;
        };
        if let Some(job) = self.job.as_mut() {
            sort_sessions(&mut job.sessions, column, self.sort.ascending);
        }
    }

    pub fn render(&self) -> Option<RenderedTable> {
        let job = self.job.as_ref()?;
        let visible = apply_filters(&job.sessions, &self.filters);
        Some(render_table(visible, columns()))
    }
}
