//! Applies user lifecycle events from the identity provider to the store.
//!
//! Authentication itself happens elsewhere; the only thing the store needs
//! is a `users` row (plus seeded categories) for every account the provider
//! knows about.

use serde::Deserialize;

use crate::db::Database;
use crate::error::Result;
use crate::models::NewUser;

/// An identity provider event, e.g.
/// `{"type": "user.created", "data": {"id": "user_1", ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IdentityEvent {
    #[serde(rename = "type")]
    pub(crate) event_type: String,
    #[serde(default)]
    pub(crate) data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EventData {
    pub(crate) id: Option<String>,
    pub(crate) email_addresses: Vec<EmailAddress>,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EmailAddress {
    pub(crate) email_address: String,
}

impl EventData {
    /// The first listed address, if it is not blank.
    pub(crate) fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.trim())
            .filter(|e| !e.is_empty())
    }

    /// First and last name joined by a space, skipping blank parts.
    pub(crate) fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    fn user_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SyncOutcome {
    Created(String),
    Updated(String),
    Deleted(String),
    Ignored(String),
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created(id) => write!(f, "user {id} created"),
            Self::Updated(id) => write!(f, "user {id} updated"),
            Self::Deleted(id) => write!(f, "user {id} deleted"),
            Self::Ignored(reason) => write!(f, "ignored: {reason}"),
        }
    }
}

pub(crate) fn parse_event(json: &str) -> serde_json::Result<IdentityEvent> {
    serde_json::from_str(json)
}

/// Apply one event. Events that cannot be acted on are reported as
/// [`SyncOutcome::Ignored`] rather than as errors, so redelivery is harmless.
pub(crate) fn apply_event(db: &mut Database, event: &IdentityEvent) -> Result<SyncOutcome> {
    let data = &event.data;
    tracing::info!(
        "identity event {} for user {}",
        event.event_type,
        data.user_id().unwrap_or("<none>")
    );

    let Some(id) = data.user_id() else {
        return Ok(ignored(format!("{} event without a user id", event.event_type)));
    };

    match event.event_type.as_str() {
        "user.created" => create(db, id, data),
        "user.updated" => update(db, id, data),
        "user.deleted" => {
            if db.delete_user(id)? {
                Ok(SyncOutcome::Deleted(id.to_string()))
            } else {
                Ok(ignored(format!("user {id} is not in the database")))
            }
        }
        other => Ok(ignored(format!("unhandled event type {other}"))),
    }
}

fn create(db: &mut Database, id: &str, data: &EventData) -> Result<SyncOutcome> {
    let Some(email) = data.primary_email() else {
        return Ok(ignored(format!("user {id} has no email address")));
    };
    if db.get_user(id)?.is_some() {
        return Ok(ignored(format!("user {id} already exists")));
    }
    db.create_user(&NewUser::new(id.to_string(), email.to_string(), data.full_name()))?;
    Ok(SyncOutcome::Created(id.to_string()))
}

fn update(db: &mut Database, id: &str, data: &EventData) -> Result<SyncOutcome> {
    if db.get_user(id)?.is_none() {
        tracing::warn!("user {id} updated upstream but missing locally, creating it");
        return create(db, id, data);
    }
    let name = data.full_name();
    db.update_user(id, data.primary_email(), name.as_deref())?;
    // Accounts that predate seeding get their predefined categories here.
    db.seed_predefined_categories(id)?;
    Ok(SyncOutcome::Updated(id.to_string()))
}

fn ignored(reason: String) -> SyncOutcome {
    tracing::warn!("{reason}");
    SyncOutcome::Ignored(reason)
}
