use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::geometry::TimelineGeometry;
use crate::models::{MemberPackage, ScheduledSession, SessionStatus};

/// Display tokens per status, mirrored by the front-end's card styling.
#[derive(Debug, Clone, Copy)]
pub struct StatusStyle {
    pub label: &'static str,
    pub tone: &'static str,
}

static STATUS_STYLES: Lazy<HashMap<SessionStatus, StatusStyle>> = Lazy::new(|| {
    HashMap::from([
        (
            SessionStatus::Scheduled,
            StatusStyle { label: "Scheduled", tone: "blue" },
        ),
        (
            SessionStatus::Completed,
            StatusStyle { label: "Completed", tone: "emerald" },
        ),
        (
            SessionStatus::NoShow,
            StatusStyle { label: "No-show", tone: "red" },
        ),
        (
            SessionStatus::Cancelled,
            StatusStyle { label: "Cancelled", tone: "slate" },
        ),
    ])
});

pub fn status_style(status: SessionStatus) -> StatusStyle {
    STATUS_STYLES[&status]
}

/// One positioned session card. Position and height are computed at layout
/// time from the record and the geometry, never stored with the record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimelineCard {
    pub id: String,
    pub top_px: f64,
    pub height_px: f64,
    /// Start time of the session, e.g. "09:00".
    pub time_label: String,
    pub duration_minutes: u32,
    pub status: SessionStatus,
    pub status_label: String,
    pub tone: String,
    pub member_name: Option<String>,
    pub trainer_name: Option<String>,
    pub package_name: Option<String>,
    pub notes: Option<String>,
    /// Transitions offered for this card; empty for terminal statuses.
    pub actions: Vec<SessionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HourMark {
    pub offset_px: f64,
    /// e.g. "06:00"
    pub label: String,
}

/// The fully laid-out day view served to the front-end.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DayTimeline {
    #[schema(value_type = String, format = "date", example = "2024-06-10")]
    pub date: NaiveDate,
    pub total_height_px: f64,
    pub hour_marks: Vec<HourMark>,
    pub cards: Vec<TimelineCard>,
    /// Offset of the "now" line; present only when `date` is today and the
    /// current time falls inside the visible window.
    pub now_px: Option<f64>,
    /// One-shot auto-scroll target, present under the same condition.
    pub scroll_px: Option<f64>,
}

/// Positions a day's sessions on the vertical axis.
///
/// Cards are sorted by start time then id so the order is stable across
/// refetches. Overlapping sessions are not laid out side by side; they stack
/// in list order, and preventing double-booking is the directory's concern.
/// Sessions outside the visible window keep their computed offsets.
pub fn layout_day(
    geometry: &TimelineGeometry,
    date: NaiveDate,
    sessions: &[ScheduledSession],
    packages: &[MemberPackage],
    now: NaiveDateTime,
) -> DayTimeline {
    let mut ordered: Vec<&ScheduledSession> = sessions.iter().collect();
    ordered.sort_by(|a, b| {
        a.scheduled_at
            .cmp(&b.scheduled_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let package_names: HashMap<&str, &str> = packages
        .iter()
        .filter_map(|mp| {
            mp.package
                .as_ref()
                .map(|p| (mp.id.as_str(), p.name.as_str()))
        })
        .collect();

    let cards = ordered
        .into_iter()
        .map(|session| {
            let style = status_style(session.status);
            TimelineCard {
                id: session.id.clone(),
                top_px: geometry.time_to_offset(session.scheduled_at.time()),
                height_px: geometry.card_height(session.duration_minutes),
                time_label: session.scheduled_at.format("%H:%M").to_string(),
                duration_minutes: session.duration_minutes,
                status: session.status,
                status_label: style.label.to_string(),
                tone: style.tone.to_string(),
                member_name: session.member.as_ref().map(|m| m.name.clone()),
                trainer_name: session.trainer.as_ref().map(|t| t.name.clone()),
                package_name: package_names
                    .get(session.member_package_id.as_str())
                    .map(|name| name.to_string()),
                notes: session.notes.clone(),
                actions: session.status.transition_actions().to_vec(),
            }
        })
        .collect();

    let hour_marks = (geometry.window_start_hour..=geometry.window_end_hour)
        .map(|hour| HourMark {
            offset_px: (hour - geometry.window_start_hour) as f64 * geometry.px_per_hour,
            label: format!("{hour:02}:00"),
        })
        .collect();

    let is_today = date == now.date();
    let now_px = is_today.then(|| geometry.now_offset(now.time())).flatten();
    let scroll_px = is_today
        .then(|| geometry.scroll_anchor(now.time()))
        .flatten();

    DayTimeline {
        date,
        total_height_px: geometry.total_height_px(),
        hour_marks,
        cards,
        now_px,
        scroll_px,
    }
}
