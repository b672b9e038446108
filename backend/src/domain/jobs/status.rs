//! Job status model and its transition table.
//!
//! ```text
//! pending ──start──▶ ongoing ──submit──▶ pending_approval ──approve──▶ approved
//!    │                  ▲                        │
//!    │                  └────────reject──────────┤
//!    └──────cancel (from any non-terminal)───────┴──▶ cancelled
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, not yet started.
    Pending,
    /// Work in progress; the job card is editable.
    Ongoing,
    /// Submitted by the technician, awaiting admin review.
    PendingApproval,
    /// Approved by an admin. Terminal.
    Approved,
    /// Cancelled by an admin. Terminal.
    Cancelled,
}

/// Coarse status shown in list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryStatus {
    /// Not started.
    Pending,
    /// In progress.
    Ongoing,
    /// Work finished, whether or not it has been approved.
    Completed,
    /// Cancelled.
    Cancelled,
}

/// Status names recorded in timeline events, including the review outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    /// See [`JobStatus::Pending`].
    Pending,
    /// See [`JobStatus::Ongoing`].
    Ongoing,
    /// See [`JobStatus::PendingApproval`].
    PendingApproval,
    /// See [`JobStatus::Approved`].
    Approved,
    /// Review outcome sending the job back to the technician.
    Rejected,
    /// See [`JobStatus::Cancelled`].
    Cancelled,
}

/// Operation requested on a job's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    /// Begin work.
    Start,
    /// Technician marks the work complete.
    SubmitForApproval,
    /// Admin accepts the submitted work.
    Approve,
    /// Admin returns the submitted work to the technician.
    Reject,
    /// Admin abandons the job.
    Cancel,
}

/// Admin decision on a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Accept the work.
    Approve,
    /// Send the work back.
    Reject,
}

impl ReviewDecision {
    /// The status action this decision performs.
    pub fn action(self) -> JobAction {
        match self {
            Self::Approve => JobAction::Approve,
            Self::Reject => JobAction::Reject,
        }
    }
}

/// Raised when a status, action or decision name is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownStatusName {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl JobStatus {
    /// Next status for `action`, or `None` when the table has no entry.
    ///
    /// # Examples
    /// ```
    /// use fieldcrew::domain::{JobAction, JobStatus};
    ///
    /// assert_eq!(JobStatus::Pending.apply(JobAction::Start), Some(JobStatus::Ongoing));
    /// assert_eq!(JobStatus::Approved.apply(JobAction::Cancel), None);
    /// ```
    pub fn apply(self, action: JobAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, JobAction::Start) => Some(Self::Ongoing),
            (Self::Ongoing, JobAction::SubmitForApproval) => Some(Self::PendingApproval),
            (Self::PendingApproval, JobAction::Approve) => Some(Self::Approved),
            (Self::PendingApproval, JobAction::Reject) => Some(Self::Ongoing),
            (Self::Pending | Self::Ongoing | Self::PendingApproval, JobAction::Cancel) => {
                Some(Self::Cancelled)
            }
            _ => None,
        }
    }

    /// Coarse status used by list views and workload counters.
    pub fn primary(self) -> PrimaryStatus {
        match self {
            Self::Pending => PrimaryStatus::Pending,
            Self::Ongoing => PrimaryStatus::Ongoing,
            Self::PendingApproval | Self::Approved => PrimaryStatus::Completed,
            Self::Cancelled => PrimaryStatus::Cancelled,
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Cancelled)
    }

    /// Whether the job counts towards a technician's active workload.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Ongoing)
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ongoing => "ongoing",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Cancelled => "cancelled",
        }
    }
}

impl PrimaryStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl JobAction {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SubmitForApproval => "submit_for_approval",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }
}

impl From<JobStatus> for StatusLabel {
    fn from(value: JobStatus) -> Self {
        match value {
            JobStatus::Pending => Self::Pending,
            JobStatus::Ongoing => Self::Ongoing,
            JobStatus::PendingApproval => Self::PendingApproval,
            JobStatus::Approved => Self::Approved,
            JobStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalise(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl FromStr for JobStatus {
    type Err = UnknownStatusName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "pending" => Ok(Self::Pending),
            "ongoing" => Ok(Self::Ongoing),
            "pending_approval" | "pendingapproval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatusName {
                kind: "status",
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for PrimaryStatus {
    type Err = UnknownStatusName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "pending" => Ok(Self::Pending),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatusName {
                kind: "status",
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for JobAction {
    type Err = UnknownStatusName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "start" => Ok(Self::Start),
            "submit_for_approval" | "submitforapproval" | "submit" | "complete" => {
                Ok(Self::SubmitForApproval)
            }
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "cancel" => Ok(Self::Cancel),
            _ => Err(UnknownStatusName {
                kind: "action",
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = UnknownStatusName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "approve" | "approved" => Ok(Self::Approve),
            "reject" | "rejected" => Ok(Self::Reject),
            _ => Err(UnknownStatusName {
                kind: "decision",
                value: s.to_owned(),
            }),
        }
    }
}
