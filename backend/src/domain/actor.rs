//! Identity of the caller performing a use-case.
//!
//! Authentication happens upstream; the domain only sees who is acting and in
//! which role. Permission rules live next to the aggregates they guard.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::directory::TechnicianId;

/// Role asserted for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Company administrator managing jobs, clients and technicians.
    Admin,
    /// Field technician working assigned jobs.
    Technician,
    /// Platform operator managing plans and companies.
    SuperAdmin,
}

impl Role {
    /// Wire representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Technician => "technician",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "technician" => Ok(Self::Technician),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// Raised when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// The caller of a use-case.
///
/// # Examples
/// ```
/// use fieldcrew::domain::{Actor, TechnicianId};
///
/// let tech = Actor::technician(TechnicianId::new("TECH-001"), "Mike Johnson");
/// assert!(!tech.is_admin());
/// assert_eq!(tech.display_name(), "Mike Johnson");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// An administrator, identified by display name.
    Admin {
        /// Display name recorded in timelines.
        name: String,
    },
    /// A technician acting on their own behalf.
    Technician {
        /// Technician identifier.
        id: TechnicianId,
        /// Display name recorded in timelines.
        name: String,
    },
    /// A platform super-admin.
    SuperAdmin {
        /// Display name recorded in audit logs.
        name: String,
    },
}

impl Actor {
    /// Build an admin actor.
    pub fn admin(name: impl Into<String>) -> Self {
        Self::Admin { name: name.into() }
    }

    /// Build a technician actor.
    pub fn technician(id: TechnicianId, name: impl Into<String>) -> Self {
        Self::Technician {
            id,
            name: name.into(),
        }
    }

    /// Build a super-admin actor.
    pub fn super_admin(name: impl Into<String>) -> Self {
        Self::SuperAdmin { name: name.into() }
    }

    /// Role of the actor.
    pub fn role(&self) -> Role {
        match self {
            Self::Admin { .. } => Role::Admin,
            Self::Technician { .. } => Role::Technician,
            Self::SuperAdmin { .. } => Role::SuperAdmin,
        }
    }

    /// Name written into timeline events.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Admin { name } | Self::Technician { name, .. } | Self::SuperAdmin { name } => {
                name.as_str()
            }
        }
    }

    /// Whether the actor administers jobs.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Whether the actor is a super-admin.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin { .. })
    }

    /// Technician identifier, when the actor is a technician.
    pub fn technician_id(&self) -> Option<&TechnicianId> {
        match self {
            Self::Technician { id, .. } => Some(id),
            Self::Admin { .. } | Self::SuperAdmin { .. } => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.role().as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case("Technician", Role::Technician)]
    #[case("super_admin", Role::SuperAdmin)]
    #[case(" superadmin ", Role::SuperAdmin)]
    fn parses_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_roles() {
        assert_eq!(
            "owner".parse::<Role>(),
            Err(UnknownRole("owner".to_owned()))
        );
    }

    #[rstest]
    fn technician_exposes_identifier() {
        let actor = Actor::technician(TechnicianId::new("TECH-002"), "Sarah Davis");
        assert_eq!(actor.technician_id(), Some(&TechnicianId::new("TECH-002")));
        assert_eq!(actor.role(), Role::Technician);
        assert_eq!(actor.to_string(), "Sarah Davis (technician)");
    }
}
