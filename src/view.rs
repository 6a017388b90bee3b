use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::directory::DirectoryError;
use crate::geometry::TimelineGeometry;
use crate::models::{MemberPackage, ScheduledSession, SessionCreate, SessionStatus};
use crate::timeline::{DayTimeline, layout_day};

/// Where user-facing toasts go. The embedding UI supplies the
/// implementation; tests capture messages in memory.
pub trait NotificationSink {
    fn success(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// A read the embedder must issue against the session directory. Responses
/// are fed back through [`DayTimelineView::apply_fetch`] keyed by this date,
/// which is how stale responses get recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub date: NaiveDate,
}

/// Pending fields of the booking dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    pub member_id: String,
    pub member_package_id: String,
    pub trainer_id: String,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: u32,
    pub notes: String,
}

impl BookingForm {
    fn at(scheduled_at: NaiveDateTime) -> Self {
        Self {
            member_id: String::new(),
            member_package_id: String::new(),
            trainer_id: String::new(),
            scheduled_at,
            duration_minutes: 60,
            notes: String::new(),
        }
    }

    pub fn to_create(&self) -> SessionCreate {
        SessionCreate {
            member_id: self.member_id.clone(),
            member_package_id: self.member_package_id.clone(),
            trainer_id: self.trainer_id.clone(),
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            notes: (!self.notes.is_empty()).then(|| self.notes.clone()),
        }
    }
}

/// At most one dialog is open at a time; the enum makes that structural.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dialog {
    #[default]
    None,
    Booking(BookingForm),
    Detail(String),
}

/// What a pointer click landed on. Card hits are identified by a marker on
/// the card region, not by coordinate testing, so card interactions are
/// never shadowed by slot creation.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickTarget {
    Card(String),
    Canvas { offset_px: f64 },
}

/// State of the day-timeline component. Single-threaded: everything here is
/// mutated from the UI loop, either on user input or when the embedder feeds
/// back a resolved network response. Nothing is predicted ahead of a server
/// acknowledgement.
#[derive(Debug)]
pub struct DayTimelineView {
    geometry: TimelineGeometry,
    selected_date: NaiveDate,
    sessions: Vec<ScheduledSession>,
    loading: bool,
    dialog: Dialog,
    now: NaiveDateTime,
    auto_scrolled: bool,
}

impl DayTimelineView {
    /// Mounts the view on today's date and asks for the initial fetch.
    pub fn mount(geometry: TimelineGeometry, now: NaiveDateTime) -> (Self, FetchRequest) {
        let view = Self {
            geometry,
            selected_date: now.date(),
            sessions: Vec::new(),
            loading: true,
            dialog: Dialog::None,
            now,
            auto_scrolled: false,
        };
        let fetch = FetchRequest { date: view.selected_date };
        (view, fetch)
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn sessions(&self) -> &[ScheduledSession] {
        &self.sessions
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn select_date(&mut self, date: NaiveDate) -> FetchRequest {
        self.selected_date = date;
        self.sessions.clear();
        self.loading = true;
        FetchRequest { date }
    }

    pub fn step_day(&mut self, delta_days: i64) -> FetchRequest {
        self.select_date(self.selected_date + Duration::days(delta_days))
    }

    pub fn go_today(&mut self) -> FetchRequest {
        self.select_date(self.now.date())
    }

    /// Applies a resolved session-list fetch. The response is keyed by the
    /// date it was requested for; if the user has navigated away since, the
    /// stale result is dropped and `false` is returned. Failed reads leave
    /// the view empty rather than crashing; the user retries by navigating.
    pub fn apply_fetch(
        &mut self,
        date: NaiveDate,
        result: Result<Vec<ScheduledSession>, DirectoryError>,
    ) -> bool {
        if date != self.selected_date {
            return false;
        }
        self.loading = false;
        match result {
            Ok(mut sessions) => {
                sessions.sort_by(|a, b| {
                    a.scheduled_at
                        .cmp(&b.scheduled_at)
                        .then_with(|| a.id.cmp(&b.id))
                });
                self.sessions = sessions;
            }
            Err(err) => {
                tracing::warn!(error = %err, %date, "session fetch failed");
                self.sessions.clear();
            }
        }
        true
    }

    /// Routes a pointer click. Hits on a session card open its detail
    /// dialog; hits on empty canvas resolve to a snapped slot and open the
    /// booking form pre-filled with that start time on the selected date.
    pub fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Card(id) => {
                if self.sessions.iter().any(|s| s.id == id) {
                    self.dialog = Dialog::Detail(id);
                }
            }
            ClickTarget::Canvas { offset_px } => {
                let slot = self.geometry.offset_to_time(offset_px);
                self.dialog = Dialog::Booking(BookingForm::at(self.selected_date.and_time(slot)));
            }
        }
    }

    /// Toolbar "book session" action; defaults to 09:00 on the selected day.
    pub fn open_booking(&mut self) {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        self.dialog = Dialog::Booking(BookingForm::at(self.selected_date.and_time(nine)));
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::None;
    }

    pub fn booking_form_mut(&mut self) -> Option<&mut BookingForm> {
        match &mut self.dialog {
            Dialog::Booking(form) => Some(form),
            _ => None,
        }
    }

    /// The session shown in the open detail dialog, if any.
    pub fn detail_session(&self) -> Option<&ScheduledSession> {
        match &self.dialog {
            Dialog::Detail(id) => self.sessions.iter().find(|s| s.id == *id),
            _ => None,
        }
    }

    /// Transition buttons for the open detail dialog, gated by status.
    pub fn detail_actions(&self) -> &'static [SessionStatus] {
        self.detail_session()
            .map(|s| s.status.transition_actions())
            .unwrap_or(&[])
    }

    /// Create acknowledgement. On success the booking dialog closes and the
    /// list is refetched; on failure the form stays open and untouched.
    pub fn apply_create_ack(
        &mut self,
        result: Result<ScheduledSession, DirectoryError>,
        sink: &mut dyn NotificationSink,
    ) -> Option<FetchRequest> {
        match result {
            Ok(_) => {
                sink.success("Session booked");
                if matches!(self.dialog, Dialog::Booking(_)) {
                    self.dialog = Dialog::None;
                }
                Some(FetchRequest { date: self.selected_date })
            }
            Err(err) => {
                tracing::warn!(error = %err, "session create failed");
                sink.error("Request failed");
                None
            }
        }
    }

    /// Status-change acknowledgement. The in-memory record is replaced with
    /// the server's version, and an open detail dialog reflects it; nothing
    /// changes on failure.
    pub fn apply_status_ack(
        &mut self,
        result: Result<ScheduledSession, DirectoryError>,
        sink: &mut dyn NotificationSink,
    ) {
        match result {
            Ok(updated) => {
                if let Some(existing) = self.sessions.iter_mut().find(|s| s.id == updated.id) {
                    *existing = updated;
                }
                sink.success("Status updated");
            }
            Err(err) => {
                tracing::warn!(error = %err, "status change failed");
                sink.error("Request failed");
            }
        }
    }

    /// Delete acknowledgement. The record leaves the list only after the
    /// directory confirms; a matching open detail dialog closes with it.
    pub fn apply_delete_ack(
        &mut self,
        id: &str,
        result: Result<(), DirectoryError>,
        sink: &mut dyn NotificationSink,
    ) {
        match result {
            Ok(()) => {
                self.sessions.retain(|s| s.id != id);
                if matches!(&self.dialog, Dialog::Detail(open) if open == id) {
                    self.dialog = Dialog::None;
                }
                sink.success("Session deleted");
            }
            Err(err) => {
                tracing::warn!(error = %err, "session delete failed");
                sink.error("Request failed");
            }
        }
    }

    /// Clock tick. The embedder drives this from a fixed-interval timer (one
    /// minute in the reference UI) and must drop that timer when the view is
    /// torn down.
    pub fn tick(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    /// Offset of the "now" line; present only when viewing today and the
    /// current time is inside the visible window.
    pub fn now_px(&self) -> Option<f64> {
        (self.selected_date == self.now.date())
            .then(|| self.geometry.now_offset(self.now.time()))
            .flatten()
    }

    /// One-shot auto-scroll target. Yields a value at most once per mount,
    /// for today only, so later ticks never fight user-initiated scrolling.
    pub fn take_scroll_anchor(&mut self) -> Option<f64> {
        if self.auto_scrolled || self.selected_date != self.now.date() {
            return None;
        }
        let anchor = self.geometry.scroll_anchor(self.now.time());
        if anchor.is_some() {
            self.auto_scrolled = true;
        }
        anchor
    }

    /// Lays out the current list for rendering.
    pub fn render(&self, packages: &[MemberPackage]) -> DayTimeline {
        layout_day(
            &self.geometry,
            self.selected_date,
            &self.sessions,
            packages,
            self.now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonRef;

    #[derive(Default)]
    struct RecordingSink {
        successes: Vec<String>,
        errors: Vec<String>,
    }

    impl NotificationSink for RecordingSink {
        fn success(&mut self, message: &str) {
            self.successes.push(message.to_string());
        }

        fn error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn session(id: &str, at: &str, status: SessionStatus) -> ScheduledSession {
        ScheduledSession {
            id: id.to_string(),
            member_package_id: "mp-1".to_string(),
            trainer_id: "t-1".to_string(),
            scheduled_at: NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S").unwrap(),
            duration_minutes: 60,
            status,
            notes: None,
            member: Some(PersonRef { id: "m-1".to_string(), name: "Jane Doe".to_string() }),
            trainer: None,
        }
    }

    fn mounted(now: &str) -> DayTimelineView {
        let now = NaiveDateTime::parse_from_str(now, "%Y-%m-%dT%H:%M:%S").unwrap();
        DayTimelineView::mount(TimelineGeometry::default(), now).0
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_stale_fetch_response_is_discarded() {
        let mut view = mounted("2024-06-10T12:00:00");
        let d1 = view.select_date(date("2024-06-11"));
        let d2 = view.select_date(date("2024-06-12"));

        // D2's response arrives first and is applied.
        let applied = view.apply_fetch(
            d2.date,
            Ok(vec![session("b", "2024-06-12T10:00:00", SessionStatus::Scheduled)]),
        );
        assert!(applied);

        // D1's late response must not clobber D2's list.
        let applied = view.apply_fetch(
            d1.date,
            Ok(vec![session("a", "2024-06-11T09:00:00", SessionStatus::Scheduled)]),
        );
        assert!(!applied);
        assert_eq!(view.sessions().len(), 1);
        assert_eq!(view.sessions()[0].id, "b");
    }

    #[test]
    fn test_fetch_error_leaves_view_empty() {
        let mut view = mounted("2024-06-10T12:00:00");
        let fetch = view.select_date(date("2024-06-11"));
        let applied = view.apply_fetch(fetch.date, Err(DirectoryError::MissingRecord));
        assert!(applied);
        assert!(view.sessions().is_empty());
        assert!(!view.is_loading());
    }

    #[test]
    fn test_card_click_opens_detail_not_booking() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.apply_fetch(
            date("2024-06-10"),
            Ok(vec![session("a", "2024-06-10T09:00:00", SessionStatus::Scheduled)]),
        );

        view.click(ClickTarget::Card("a".to_string()));
        assert_eq!(view.dialog(), &Dialog::Detail("a".to_string()));
        assert_eq!(view.detail_session().unwrap().id, "a");
    }

    #[test]
    fn test_canvas_click_opens_booking_at_snapped_slot() {
        let mut view = mounted("2024-06-10T12:00:00");
        // 190px below 06:00 at 60px/h = 09:10, snapping to 09:00.
        view.click(ClickTarget::Canvas { offset_px: 190.0 });
        let Dialog::Booking(form) = view.dialog() else {
            panic!("expected booking dialog");
        };
        assert_eq!(
            form.scheduled_at,
            NaiveDateTime::parse_from_str("2024-06-10T09:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
        );
        assert_eq!(form.duration_minutes, 60);
    }

    #[test]
    fn test_canvas_click_past_bottom_clamps_to_last_slot() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.click(ClickTarget::Canvas { offset_px: 5000.0 });
        let Dialog::Booking(form) = view.dialog() else {
            panic!("expected booking dialog");
        };
        assert_eq!(form.scheduled_at.time(), NaiveTime::from_hms_opt(21, 30, 0).unwrap());
    }

    #[test]
    fn test_only_one_dialog_open_at_a_time() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.apply_fetch(
            date("2024-06-10"),
            Ok(vec![session("a", "2024-06-10T09:00:00", SessionStatus::Scheduled)]),
        );
        view.click(ClickTarget::Card("a".to_string()));
        view.open_booking();
        assert!(matches!(view.dialog(), Dialog::Booking(_)));
        assert!(view.detail_session().is_none());
    }

    #[test]
    fn test_status_ack_updates_record_and_detail() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.apply_fetch(
            date("2024-06-10"),
            Ok(vec![session("a", "2024-06-10T09:00:00", SessionStatus::Scheduled)]),
        );
        view.click(ClickTarget::Card("a".to_string()));
        assert_eq!(view.detail_actions().len(), 3);

        let mut sink = RecordingSink::default();
        view.apply_status_ack(
            Ok(session("a", "2024-06-10T09:00:00", SessionStatus::Completed)),
            &mut sink,
        );

        // Status flips, actions disappear, position stays put.
        let detail = view.detail_session().unwrap();
        assert_eq!(detail.status, SessionStatus::Completed);
        assert!(view.detail_actions().is_empty());
        assert_eq!(
            detail.scheduled_at.time(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(sink.successes, ["Status updated"]);
    }

    #[test]
    fn test_status_ack_failure_leaves_state_unchanged() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.apply_fetch(
            date("2024-06-10"),
            Ok(vec![session("a", "2024-06-10T09:00:00", SessionStatus::Scheduled)]),
        );

        let mut sink = RecordingSink::default();
        view.apply_status_ack(Err(DirectoryError::MissingRecord), &mut sink);
        assert_eq!(view.sessions()[0].status, SessionStatus::Scheduled);
        assert_eq!(sink.errors, ["Request failed"]);
    }

    #[test]
    fn test_delete_ack_removes_record_and_closes_detail() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.apply_fetch(
            date("2024-06-10"),
            Ok(vec![session("a", "2024-06-10T09:00:00", SessionStatus::Scheduled)]),
        );
        view.click(ClickTarget::Card("a".to_string()));

        let mut sink = RecordingSink::default();
        view.apply_delete_ack("a", Ok(()), &mut sink);
        assert!(view.sessions().is_empty());
        assert_eq!(view.dialog(), &Dialog::None);

        // A failed delete leaves everything in place.
        let mut view = mounted("2024-06-10T12:00:00");
        view.apply_fetch(
            date("2024-06-10"),
            Ok(vec![session("a", "2024-06-10T09:00:00", SessionStatus::Scheduled)]),
        );
        view.apply_delete_ack("a", Err(DirectoryError::MissingRecord), &mut sink);
        assert_eq!(view.sessions().len(), 1);
    }

    #[test]
    fn test_create_ack_closes_booking_and_refetches() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.open_booking();

        let mut sink = RecordingSink::default();
        let refetch = view.apply_create_ack(
            Ok(session("new", "2024-06-10T09:00:00", SessionStatus::Scheduled)),
            &mut sink,
        );
        assert_eq!(refetch, Some(FetchRequest { date: date("2024-06-10") }));
        assert_eq!(view.dialog(), &Dialog::None);

        // On failure the form stays open for another attempt.
        view.open_booking();
        let refetch = view.apply_create_ack(Err(DirectoryError::MissingRecord), &mut sink);
        assert_eq!(refetch, None);
        assert!(matches!(view.dialog(), Dialog::Booking(_)));
    }

    #[test]
    fn test_auto_scroll_fires_once_and_only_today() {
        let mut view = mounted("2024-06-10T12:00:00");
        assert_eq!(view.take_scroll_anchor(), Some(270.0));
        assert_eq!(view.take_scroll_anchor(), None);

        let mut view = mounted("2024-06-10T12:00:00");
        view.select_date(date("2024-06-11"));
        assert_eq!(view.take_scroll_anchor(), None);
    }

    #[test]
    fn test_now_line_follows_tick() {
        let mut view = mounted("2024-06-10T12:00:00");
        assert_eq!(view.now_px(), Some(360.0));
        view.tick(NaiveDateTime::parse_from_str("2024-06-10T23:00:00", "%Y-%m-%dT%H:%M:%S").unwrap());
        assert_eq!(view.now_px(), None);
    }

    #[test]
    fn test_render_lays_out_current_list() {
        let mut view = mounted("2024-06-10T12:00:00");
        view.apply_fetch(
            date("2024-06-10"),
            Ok(vec![session("a", "2024-06-10T09:00:00", SessionStatus::Scheduled)]),
        );
        let day = view.render(&[]);
        assert_eq!(day.cards.len(), 1);
        assert_eq!(day.cards[0].top_px, 180.0);
        assert_eq!(day.now_px, Some(360.0));
    }
}
