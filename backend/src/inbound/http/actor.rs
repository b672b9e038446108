//! Caller identity asserted by the fronting gateway.
//!
//! Requests carry `X-Actor-Role`, `X-Actor-Id` and an optional
//! `X-Actor-Name`. Handlers take an [`ActorContext`] and hand the resulting
//! [`Actor`] to the driving ports; a missing or malformed header is a `401`.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Actor, Error, Role, TechnicianId};

/// Role header.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Identifier header; a `TECH-NNN` id for technicians.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Optional display name header, defaulting to the identifier.
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// Extractor resolving the acting user from request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext(Actor);

impl ActorContext {
    /// The resolved actor.
    pub fn actor(&self) -> &Actor {
        &self.0
    }

    /// Consume the context.
    pub fn into_actor(self) -> Actor {
        self.0
    }

    fn header<'r>(req: &'r HttpRequest, name: &str) -> Result<Option<&'r str>, Error> {
        let Some(value) = req.headers().get(name) else {
            return Ok(None);
        };
        let text = value
            .to_str()
            .map_err(|_| Error::unauthorized(format!("{name} must be visible ASCII")))?
            .trim();
        Ok((!text.is_empty()).then_some(text))
    }

    fn resolve(req: &HttpRequest) -> Result<Self, Error> {
        let role = Self::header(req, ACTOR_ROLE_HEADER)?
            .ok_or_else(|| Error::unauthorized(format!("missing {ACTOR_ROLE_HEADER} header")))?;
        let role: Role = role
            .parse()
            .map_err(|err: crate::domain::UnknownRole| Error::unauthorized(err.to_string()))?;
        let id = Self::header(req, ACTOR_ID_HEADER)?
            .ok_or_else(|| Error::unauthorized(format!("missing {ACTOR_ID_HEADER} header")))?;
        let name = Self::header(req, ACTOR_NAME_HEADER)?.unwrap_or(id).to_owned();

        let actor = match role {
            Role::Admin => Actor::admin(name),
            Role::SuperAdmin => Actor::super_admin(name),
            Role::Technician => {
                let technician = TechnicianId::parse(id).map_err(|err| {
                    Error::unauthorized(format!("{ACTOR_ID_HEADER} is not a technician id: {err}"))
                })?;
                Actor::technician(technician, name)
            }
        };
        Ok(Self(actor))
    }
}

impl FromRequest for ActorContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = Self::resolve(req);
        if let Err(error) = &resolved {
            warn!(path = req.path(), reason = error.message(), "actor headers rejected");
        }
        ready(resolved)
    }
}
