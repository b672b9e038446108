//! Pure list-view filters over jobs.
//!
//! Every filter keeps the input order. Combined filters are a conjunction,
//! so the order they run in does not matter.

use std::str::FromStr;

use super::{Job, JobStatus, PrimaryStatus, UnknownStatusName};

const ALL: &str = "all";

/// Status criterion for list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// No restriction.
    #[default]
    All,
    /// Coarse status; `completed` covers both approval states.
    Primary(PrimaryStatus),
    /// One exact status.
    Exact(JobStatus),
}

impl StatusFilter {
    /// Whether `status` passes.
    pub fn accepts(self, status: JobStatus) -> bool {
        match self {
            Self::All => true,
            Self::Primary(primary) => status.primary() == primary,
            Self::Exact(exact) => status == exact,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatusName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            return Ok(Self::All);
        }
        if let Ok(exact) = trimmed.parse::<JobStatus>() {
            return Ok(Self::Exact(exact));
        }
        trimmed.parse::<PrimaryStatus>().map(Self::Primary)
    }
}

/// Combined list criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Case-insensitive substring over id, client and technician name.
    pub search: Option<String>,
    /// Status criterion.
    pub status: StatusFilter,
    /// Exact technician name; `all` disables the criterion.
    pub technician: Option<String>,
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn search_matches(job: &Job, needle: &str) -> bool {
    contains_folded(job.id().as_str(), needle)
        || contains_folded(job.client_name(), needle)
        || job
            .assigned_technician()
            .is_some_and(|tech| contains_folded(&tech.name, needle))
}

fn technician_matches(job: &Job, name: &str) -> bool {
    job.assigned_technician()
        .is_some_and(|tech| tech.name == name)
}

fn normalised_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn technician_criterion(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(ALL)).then_some(trimmed)
}

impl JobFilter {
    /// Whether `job` satisfies every active criterion.
    pub fn matches(&self, job: &Job) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .and_then(normalised_term)
            .is_none_or(|needle| search_matches(job, &needle));
        let technician_ok = self
            .technician
            .as_deref()
            .and_then(technician_criterion)
            .is_none_or(|name| technician_matches(job, name));
        search_ok && technician_ok && self.status.accepts(job.status())
    }

    /// Keep the jobs that match, in input order.
    pub fn apply<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.matches(job)).collect()
    }
}

/// Jobs whose id, client name or technician name contains `term`.
pub fn filter_by_search_term<'a>(jobs: &'a [Job], term: &str) -> Vec<&'a Job> {
    match normalised_term(term) {
        Some(needle) => jobs
            .iter()
            .filter(|job| search_matches(job, &needle))
            .collect(),
        None => jobs.iter().collect(),
    }
}

/// Jobs accepted by `status`.
pub fn filter_by_status(jobs: &[Job], status: StatusFilter) -> Vec<&Job> {
    jobs.iter()
        .filter(|job| status.accepts(job.status()))
        .collect()
}

/// Jobs assigned to the technician called exactly `name`.
pub fn filter_by_technician<'a>(jobs: &'a [Job], name: &str) -> Vec<&'a Job> {
    match technician_criterion(name) {
        Some(name) => jobs
            .iter()
            .filter(|job| technician_matches(job, name))
            .collect(),
        None => jobs.iter().collect(),
    }
}
