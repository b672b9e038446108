//! Subscription plans and the companies that subscribe to them.
//!
//! Plan limits are advisory. A company over its limits still operates; the
//! usage report carries warnings instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::failure::{DomainFailure, FailureKind};
use super::identifier::string_identifier;

string_identifier!(
    /// Subscription plan identifier.
    PlanId, prefix = "PLAN"
);

string_identifier!(
    /// Subscribing company identifier.
    CompanyId, prefix = "COMP"
);

/// Monthly job allowance. Serialised as a number, `-1` meaning unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum JobAllowance {
    /// No cap.
    Unlimited,
    /// At most this many jobs per month.
    Limited(u32),
}

impl TryFrom<i64> for JobAllowance {
    type Error = SubscriptionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Unlimited),
            n => u32::try_from(n)
                .map(Self::Limited)
                .map_err(|_| {
                    SubscriptionError::invalid("maxJobs", "must be -1 or a non-negative count")
                }),
        }
    }
}

impl From<JobAllowance> for i64 {
    fn from(value: JobAllowance) -> Self {
        match value {
            JobAllowance::Unlimited => -1,
            JobAllowance::Limited(n) => Self::from(n),
        }
    }
}

impl JobAllowance {
    /// Whether `used` is over the allowance.
    pub fn is_exceeded_by(self, used: u32) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Limited(max) => used > max,
        }
    }
}

/// Whether a plan can take new subscribers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Offered to companies.
    #[default]
    Active,
    /// Withdrawn; existing subscribers keep it.
    Inactive,
}

impl std::str::FromStr for PlanStatus {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(SubscriptionError::invalid("status", "must be active or inactive")),
        }
    }
}

/// Account state of a company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    /// Paid up.
    #[default]
    Active,
    /// Subscription lapsed.
    Expired,
    /// Blocked by the operator.
    Suspended,
}

/// A priced bundle of limits and features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    /// Plan identifier.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Monthly price in whole currency units.
    pub price: u32,
    /// Technician seats.
    pub max_technicians: u32,
    /// Monthly job allowance.
    pub max_jobs: JobAllowance,
    /// Included features.
    pub features: Vec<String>,
    /// Listed restrictions.
    pub restrictions: Vec<String>,
    /// Availability.
    pub status: PlanStatus,
}

/// Input for a new plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    /// Display name.
    pub name: String,
    /// Monthly price.
    pub price: u32,
    /// Technician seats, at least 1.
    pub max_technicians: u32,
    /// Monthly job allowance.
    pub max_jobs: JobAllowance,
    /// Included features.
    pub features: Vec<String>,
    /// Listed restrictions.
    pub restrictions: Vec<String>,
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .collect()
}

fn required(field: &'static str, value: &str) -> Result<String, SubscriptionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SubscriptionError::invalid(field, "must not be blank"));
    }
    Ok(trimmed.to_owned())
}

impl SubscriptionPlan {
    /// Validate a draft into an active plan.
    pub fn new(id: PlanId, draft: PlanDraft) -> Result<Self, SubscriptionError> {
        if draft.max_technicians == 0 {
            return Err(SubscriptionError::invalid(
                "maxTechnicians",
                "a plan needs at least one technician seat",
            ));
        }
        Ok(Self {
            id,
            name: required("name", &draft.name)?,
            price: draft.price,
            max_technicians: draft.max_technicians,
            max_jobs: draft.max_jobs,
            features: clean_list(draft.features),
            restrictions: clean_list(draft.restrictions),
            status: PlanStatus::Active,
        })
    }
}

/// Plan with subscriber figures derived from the company list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    /// The plan.
    #[serde(flatten)]
    pub plan: SubscriptionPlan,
    /// Companies currently on the plan.
    pub subscribers: u32,
    /// `price * subscribers`.
    pub monthly_revenue: u64,
}

impl PlanSummary {
    /// Count subscribers of `plan` among `companies`.
    pub fn derive(plan: SubscriptionPlan, companies: &[Company]) -> Self {
        let count = companies
            .iter()
            .filter(|company| company.plan_id == plan.id)
            .count();
        let subscribers = u32::try_from(count).unwrap_or(u32::MAX);
        let monthly_revenue = u64::from(plan.price) * u64::from(subscribers);
        Self {
            plan,
            subscribers,
            monthly_revenue,
        }
    }
}

/// A business subscribing to a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Company identifier.
    pub id: CompanyId,
    /// Company name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Current plan.
    pub plan_id: PlanId,
    /// Account state.
    pub status: CompanyStatus,
    /// Technicians on staff.
    pub technicians: u32,
    /// Jobs created this month.
    pub jobs_this_month: u32,
    /// Sign-up date.
    pub join_date: NaiveDate,
}

/// Input for a new company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDraft {
    /// Company name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Plan to subscribe to; must be active.
    pub plan_id: PlanId,
    /// Technicians on staff.
    pub technicians: u32,
    /// Jobs created this month.
    pub jobs_this_month: u32,
}

impl Company {
    /// Validate a draft against the chosen plan.
    pub fn new(
        id: CompanyId,
        draft: CompanyDraft,
        plan: &SubscriptionPlan,
        join_date: NaiveDate,
    ) -> Result<Self, SubscriptionError> {
        let email = required("email", &draft.email)?;
        if !email.contains('@') {
            return Err(SubscriptionError::invalid("email", "must be an email address"));
        }
        let mut company = Self {
            id,
            name: required("name", &draft.name)?,
            email,
            phone: draft.phone.trim().to_owned(),
            plan_id: plan.id.clone(),
            status: CompanyStatus::Active,
            technicians: draft.technicians,
            jobs_this_month: draft.jobs_this_month,
            join_date,
        };
        company.change_plan(plan)?;
        Ok(company)
    }

    /// Move to `plan`, which must be active.
    pub fn change_plan(&mut self, plan: &SubscriptionPlan) -> Result<(), SubscriptionError> {
        if plan.status != PlanStatus::Active {
            return Err(SubscriptionError::PlanInactive(plan.id.clone()));
        }
        self.plan_id = plan.id.clone();
        Ok(())
    }

    /// Compare usage with the limits of `plan`.
    pub fn usage(&self, plan: &SubscriptionPlan) -> UsageReport {
        let mut warnings = Vec::new();
        if self.technicians > plan.max_technicians {
            warnings.push(UsageWarning {
                limit: UsageLimit::Technicians,
                used: self.technicians,
                allowed: i64::from(plan.max_technicians),
            });
        }
        if plan.max_jobs.is_exceeded_by(self.jobs_this_month) {
            warnings.push(UsageWarning {
                limit: UsageLimit::JobsPerMonth,
                used: self.jobs_this_month,
                allowed: i64::from(plan.max_jobs),
            });
        }
        UsageReport {
            company_id: self.id.clone(),
            plan_id: plan.id.clone(),
            technicians: self.technicians,
            max_technicians: plan.max_technicians,
            jobs_this_month: self.jobs_this_month,
            max_jobs: plan.max_jobs,
            warnings,
        }
    }
}

/// Which plan limit a warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageLimit {
    /// Technician seats.
    Technicians,
    /// Monthly jobs.
    JobsPerMonth,
}

/// A limit the company is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageWarning {
    /// The limit.
    pub limit: UsageLimit,
    /// Current usage.
    pub used: u32,
    /// Plan allowance.
    pub allowed: i64,
}

/// Usage compared with plan limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// Company reported on.
    pub company_id: CompanyId,
    /// Its plan.
    pub plan_id: PlanId,
    /// Technicians on staff.
    pub technicians: u32,
    /// Seat limit.
    pub max_technicians: u32,
    /// Jobs this month.
    pub jobs_this_month: u32,
    /// Job allowance.
    pub max_jobs: JobAllowance,
    /// Limits currently exceeded.
    pub warnings: Vec<UsageWarning>,
}

/// Failures raised by subscription rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    /// No plan has the identifier.
    #[error("plan {0} not found")]
    PlanNotFound(PlanId),
    /// No company has the identifier.
    #[error("company {0} not found")]
    CompanyNotFound(CompanyId),
    /// The plan is not open to subscriptions.
    #[error("plan {0} is inactive")]
    PlanInactive(PlanId),
    /// A supplied value failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// Only super-admins manage subscriptions.
    #[error("{0} may not manage subscriptions")]
    PermissionDenied(String),
}

impl SubscriptionError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl DomainFailure for SubscriptionError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::PlanNotFound(_) | Self::CompanyNotFound(_) => FailureKind::NotFound,
            Self::PlanInactive(_) => FailureKind::InvalidTransition,
            Self::InvalidInput { .. } => FailureKind::InvalidInput,
            Self::PermissionDenied(_) => FailureKind::PermissionDenied,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::PlanNotFound(_) => "plan_not_found",
            Self::CompanyNotFound(_) => "company_not_found",
            Self::PlanInactive(_) => "plan_inactive",
            Self::InvalidInput { .. } => "invalid_input",
            Self::PermissionDenied(_) => "permission_denied",
        }
    }

    fn detail_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        if let Self::InvalidInput { field, .. } = self {
            fields.insert("field".to_owned(), json!(field));
        }
        fields
    }
}

impl From<SubscriptionError> for super::Error {
    fn from(value: SubscriptionError) -> Self {
        super::failure::to_api_error(&value)
    }
}

#[cfg(test)]
mod tests;
