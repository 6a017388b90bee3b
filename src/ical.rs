use chrono::Duration;
use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::ScheduledSession;

/// Exports a day's sessions as an iCal feed so a trainer can pull the plan
/// into a regular calendar client.
#[derive(Clone, Default)]
pub struct PlanExporter;

impl PlanExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, sessions: &[ScheduledSession]) -> Vec<u8> {
        if sessions.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name("Studio Day Plan");

        for session in sessions {
            let start = session.scheduled_at;
            let end = start + Duration::minutes(session.duration_minutes as i64);

            let member = session
                .member
                .as_ref()
                .map(|m| m.name.as_str())
                .unwrap_or("Member");
            let trainer = session
                .trainer
                .as_ref()
                .map(|t| t.name.as_str())
                .unwrap_or("Trainer");

            let mut event = Event::new();
            event.summary(&format!("PT: {member} with {trainer}"));
            event.starts(start);
            event.ends(end);
            let mut description = format!("Trainer: {trainer}\nStatus: {:?}", session.status);
            if let Some(notes) = &session.notes {
                description.push_str(&format!("\nNotes: {notes}"));
            }
            event.description(&description);
            event.uid(&format!("{}-studio-timeline", session.id));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}
