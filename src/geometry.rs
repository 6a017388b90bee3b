use chrono::{NaiveTime, Timelike};

/// Pure time/pixel math for the day timeline. No network or markup concerns
/// live here; hit-testing and rendering glue sit on top of these functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineGeometry {
    /// First rendered hour of the visible window (inclusive).
    pub window_start_hour: u32,
    /// Last rendered hour of the visible window (exclusive).
    pub window_end_hour: u32,
    pub px_per_hour: f64,
    /// Minute granularity a raw click position is rounded to.
    pub snap_minutes: u32,
    /// Floor so very short sessions stay clickable and legible.
    pub min_card_height_px: f64,
}

impl Default for TimelineGeometry {
    fn default() -> Self {
        Self {
            window_start_hour: 6,
            window_end_hour: 22,
            px_per_hour: 60.0,
            snap_minutes: 30,
            min_card_height_px: 28.0,
        }
    }
}

impl TimelineGeometry {
    pub fn total_height_px(&self) -> f64 {
        (self.window_end_hour - self.window_start_hour) as f64 * self.px_per_hour
    }

    fn minute_of_day(time: NaiveTime) -> f64 {
        time.hour() as f64 * 60.0 + time.minute() as f64
    }

    /// Vertical offset of a wall-clock time. Defined for times inside the
    /// visible window; callers decide what to do with out-of-window results.
    pub fn time_to_offset(&self, time: NaiveTime) -> f64 {
        (Self::minute_of_day(time) / 60.0 - self.window_start_hour as f64) * self.px_per_hour
    }

    /// Inverse of [`time_to_offset`](Self::time_to_offset): snap to the
    /// nearest `snap_minutes`, then clamp into the bookable range so a click
    /// near the bottom edge still yields a valid slot. Non-finite offsets
    /// resolve to the window start; the result never leaves the bookable
    /// range for any input.
    pub fn offset_to_time(&self, offset_px: f64) -> NaiveTime {
        let floor = NaiveTime::from_hms_opt(self.window_start_hour, 0, 0)
            .unwrap_or(NaiveTime::MIN);
        if !offset_px.is_finite() {
            return floor;
        }

        let raw_minutes =
            offset_px / self.px_per_hour * 60.0 + self.window_start_hour as f64 * 60.0;
        let snap = self.snap_minutes as f64;
        let snapped = (raw_minutes / snap).round() * snap;

        let min = (self.window_start_hour * 60) as f64;
        let max = ((self.window_end_hour - 1) * 60 + (60 - self.snap_minutes)) as f64;
        let clamped = snapped.clamp(min, max) as u32;

        NaiveTime::from_hms_opt(clamped / 60, clamped % 60, 0).unwrap_or(floor)
    }

    /// Card height is proportional to duration down to a fixed floor, so
    /// sub-threshold durations render taller than their true extent.
    pub fn card_height(&self, duration_minutes: u32) -> f64 {
        let proportional = duration_minutes as f64 / 60.0 * self.px_per_hour;
        proportional.max(self.min_card_height_px)
    }

    /// Offset of the "now" line, present only while now is inside the
    /// visible window.
    pub fn now_offset(&self, now: NaiveTime) -> Option<f64> {
        if now.hour() < self.window_start_hour || now.hour() >= self.window_end_hour {
            return None;
        }
        Some(self.time_to_offset(now))
    }

    /// Initial scroll position placing "now" roughly a quarter of the window
    /// below the top edge. Used once per mount, for today only.
    pub fn scroll_anchor(&self, now: NaiveTime) -> Option<f64> {
        self.now_offset(now)
            .map(|offset| (offset - 1.5 * self.px_per_hour).max(0.0))
    }
}
