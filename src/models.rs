use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a scheduled session. `Scheduled` is the only state with
/// outgoing transitions; the other three are terminal for this view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    NoShow,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Scheduled)
    }

    /// Statuses this view offers as one-click transitions. Empty once a
    /// terminal status is reached; the directory may still allow edits
    /// through other surfaces.
    pub fn transition_actions(self) -> &'static [SessionStatus] {
        match self {
            SessionStatus::Scheduled => &[
                SessionStatus::Completed,
                SessionStatus::NoShow,
                SessionStatus::Cancelled,
            ],
            _ => &[],
        }
    }
}

/// Minimal resolved reference to a member or trainer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PersonRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PackageRef {
    pub id: String,
    pub name: String,
}

pub(crate) fn default_duration() -> u32 {
    60
}

/// A session record as served by the session directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ScheduledSession {
    pub id: String,
    pub member_package_id: String,
    pub trainer_id: String,
    #[schema(value_type = String, format = "date-time", example = "2024-06-10T09:00:00")]
    pub scheduled_at: NaiveDateTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    pub status: SessionStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub member: Option<PersonRef>,
    #[serde(default)]
    pub trainer: Option<PersonRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionCreate {
    pub member_id: String,
    pub member_package_id: String,
    pub trainer_id: String,
    #[schema(value_type = String, format = "date-time", example = "2024-06-10T09:00:00")]
    pub scheduled_at: NaiveDateTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update; status-only changes go through here as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SessionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub scheduled_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SessionUpdate {
    pub fn status_only(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// A purchased package with remaining credit, used to populate the booking
/// form. Credit bookkeeping itself is the directory's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct MemberPackage {
    pub id: String,
    pub member_id: String,
    #[serde(default)]
    pub package: Option<PackageRef>,
    #[serde(default)]
    pub member: Option<PersonRef>,
    pub sessions_remaining: u32,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "date")]
    pub expiry_date: Option<NaiveDate>,
}
