use crate::state::messages::UiEvent;
use chrono::{DateTime, Datelike, Days, NaiveTime, TimeDelta, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use log::debug;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Weekly pick deadline: a weekday and hour in a reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub weekday: Weekday,
    pub hour: u32,
    pub tz: Tz,
}

impl Default for Deadline {
    fn default() -> Self {
        Self {
            weekday: Weekday::Sun,
            hour: 19,
            tz: chrono_tz::Europe::Vienna,
        }
    }
}

impl Deadline {
    /// Parse `"<weekday> <hour>"`, e.g. `"sun 19"` or `"Sunday 19"`.
    pub fn parse(raw: &str, tz: Tz) -> Option<Self> {
        let mut parts = raw.split_whitespace();
        let weekday = Weekday::from_str(parts.next()?).ok()?;
        let hour = parts.next()?.parse::<u32>().ok().filter(|h| *h < 24)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { weekday, hour, tz })
    }

    /// The next deadline as seen from `now`.
    ///
    /// On the deadline weekday itself the deadline is today until the deadline
    /// hour begins, then it moves a full week ahead.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.tz);
        let today = local.date_naive();

        let days_ahead = if local.weekday() != self.weekday {
            let from = local.weekday().num_days_from_monday();
            let to = self.weekday.num_days_from_monday();
            u64::from((to + 7 - from) % 7)
        } else if local.hour() < self.hour {
            0
        } else {
            7
        };

        let date = today + Days::new(days_ahead);
        let time = NaiveTime::from_hms_opt(self.hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let naive = date.and_time(time);

        // A deadline skipped by a DST jump lands on the first hour after the gap.
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| self.tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
            .map_or(now, |t| t.with_timezone(&Utc))
    }

    pub fn label(&self) -> String {
        format!("{} {:02}:00 {}", self.weekday, self.hour, self.tz.name())
    }
}

/// Whole days, hours, minutes and seconds left, truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    fn from_delta(delta: TimeDelta) -> Self {
        let total = delta.num_seconds();
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    /// Days, hours, minutes, seconds as two-digit strings.
    pub fn fields(&self) -> [String; 4] {
        [self.days, self.hours, self.minutes, self.seconds].map(|v| format!("{v:02}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Counting(Remaining),
    /// The deadline has passed. Terminal.
    Elapsed,
}

impl CountdownState {
    pub fn is_elapsed(&self) -> bool {
        matches!(self, CountdownState::Elapsed)
    }
}

/// Countdown towards a target fixed at construction time.
#[derive(Debug, Clone)]
pub struct CountdownClock {
    target: DateTime<Utc>,
    state: CountdownState,
}

impl CountdownClock {
    pub fn new(deadline: &Deadline, now: DateTime<Utc>) -> Self {
        let target = deadline.next_after(now);
        let mut clock = Self {
            target,
            state: CountdownState::Counting(Remaining::default()),
        };
        clock.tick(now);
        clock
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Advance to `now`. Once elapsed the clock stays elapsed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> CountdownState {
        if self.state.is_elapsed() {
            return self.state;
        }
        let remaining = self.target - now;
        self.state = if remaining > TimeDelta::zero() {
            CountdownState::Counting(Remaining::from_delta(remaining))
        } else {
            CountdownState::Elapsed
        };
        self.state
    }
}

/// Owner of a running countdown ticker. Cancelled on drop.
#[derive(Debug)]
pub struct CountdownHandle {
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    /// Stop the ticker. Safe to call repeatedly, in any state.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Tick once per second, sending each state to the UI loop. The first state
/// is sent immediately; the task ends after sending `Elapsed`.
pub fn spawn_countdown<F>(deadline: Deadline, now: F, ui_events: mpsc::Sender<UiEvent>) -> CountdownHandle
where
    F: Fn() -> DateTime<Utc> + Send + 'static,
{
    let mut clock = CountdownClock::new(&deadline, now());
    debug!("countdown armed for {}", clock.target());

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            let state = clock.tick(now());
            if ui_events.send(UiEvent::CountdownTick(state)).await.is_err() {
                break;
            }
            if state.is_elapsed() {
                debug!("countdown elapsed");
                break;
            }
        }
    });

    CountdownHandle { task: Some(task) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Vienna;

    fn vienna(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Vienna
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn remaining(days: i64, hours: i64, minutes: i64, seconds: i64) -> CountdownState {
        CountdownState::Counting(Remaining { days, hours, minutes, seconds })
    }

    #[test]
    fn thursday_morning_counts_to_sunday_evening() {
        // 2025-09-11 is a Thursday.
        let clock = CountdownClock::new(&Deadline::default(), vienna(2025, 9, 11, 10, 0));
        assert_eq!(clock.target(), vienna(2025, 9, 14, 19, 0));
        assert_eq!(clock.state(), remaining(3, 9, 0, 0));
        let CountdownState::Counting(left) = clock.state() else {
            panic!("expected counting");
        };
        assert_eq!(left.fields(), ["03", "09", "00", "00"].map(String::from));
    }

    #[test]
    fn deadline_day_before_the_hour_targets_today() {
        let deadline = Deadline::default();
        assert_eq!(
            deadline.next_after(vienna(2025, 9, 14, 18, 59)),
            vienna(2025, 9, 14, 19, 0)
        );
    }

    #[test]
    fn deadline_day_from_the_hour_on_targets_next_week() {
        let deadline = Deadline::default();
        assert_eq!(
            deadline.next_after(vienna(2025, 9, 14, 19, 0)),
            vienna(2025, 9, 21, 19, 0)
        );
        assert_eq!(
            deadline.next_after(vienna(2025, 9, 14, 23, 30)),
            vienna(2025, 9, 21, 19, 0)
        );
    }

    #[test]
    fn monday_targets_the_coming_sunday() {
        let deadline = Deadline::default();
        assert_eq!(
            deadline.next_after(vienna(2025, 9, 15, 8, 0)),
            vienna(2025, 9, 21, 19, 0)
        );
    }

    #[test]
    fn remaining_truncates_partial_seconds() {
        let mut clock = CountdownClock::new(&Deadline::default(), vienna(2025, 9, 14, 18, 0));
        let now = vienna(2025, 9, 14, 18, 58) + TimeDelta::milliseconds(59_500);
        assert_eq!(clock.tick(now), remaining(0, 0, 1, 0));
    }

    #[test]
    fn reaching_the_target_elapses_for_good() {
        let start = vienna(2025, 9, 14, 18, 0);
        let mut clock = CountdownClock::new(&Deadline::default(), start);
        let target = clock.target();

        assert_eq!(clock.tick(target), CountdownState::Elapsed);
        assert_eq!(clock.tick(target + TimeDelta::seconds(5)), CountdownState::Elapsed);
        // A clock going backwards does not re-arm it.
        assert_eq!(clock.tick(start), CountdownState::Elapsed);
    }

    #[test]
    fn countdown_across_dst_end_uses_real_elapsed_time() {
        // Clocks go back one hour on 2025-10-26 in Vienna.
        let clock = CountdownClock::new(&Deadline::default(), vienna(2025, 10, 23, 10, 0));
        assert_eq!(clock.state(), remaining(3, 10, 0, 0));
    }

    #[test]
    fn deadline_inside_the_spring_gap_moves_past_it() {
        // 02:00 does not exist on 2025-03-09 in New York; 03:00 EDT follows 01:59 EST.
        let tz: Tz = "America/New_York".parse().unwrap();
        let deadline = Deadline { weekday: Weekday::Sun, hour: 2, tz };
        let now = tz.with_ymd_and_hms(2025, 3, 9, 1, 30, 0).unwrap().with_timezone(&Utc);

        let clock = CountdownClock::new(&deadline, now);
        assert_eq!(
            clock.target(),
            tz.with_ymd_and_hms(2025, 3, 9, 3, 0, 0).unwrap().with_timezone(&Utc)
        );
        assert!(clock.target() > now);
        assert_eq!(clock.state(), remaining(0, 0, 30, 0));
    }

    #[test]
    fn parses_deadline_settings() {
        let tz: Tz = "America/New_York".parse().unwrap();
        assert_eq!(
            Deadline::parse("thu 20", tz),
            Some(Deadline { weekday: Weekday::Thu, hour: 20, tz })
        );
        assert_eq!(Deadline::parse("Sunday 7", tz).map(|d| d.weekday), Some(Weekday::Sun));
        assert_eq!(Deadline::parse("sun 24", tz), None);
        assert_eq!(Deadline::parse("someday 10", tz), None);
        assert_eq!(Deadline::parse("sun", tz), None);
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_ticker() {
        let deadline = Deadline::default();
        let target = deadline.next_after(vienna(2025, 9, 14, 12, 0));
        let (tx, mut rx) = mpsc::channel(4);

        let handle = spawn_countdown(deadline, move || target, tx);
        // Constructed at the target itself: the next deadline is a week out.
        assert!(matches!(
            rx.recv().await,
            Some(UiEvent::CountdownTick(CountdownState::Counting(_)))
        ));
        drop(handle);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn ticker_sends_elapsed_then_finishes() {
        let deadline = Deadline::default();
        let start = vienna(2025, 9, 14, 18, 0);
        let target = deadline.next_after(start);
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let now = move || {
            // First call arms the clock, every later call is past the target.
            if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                start
            } else {
                target
            }
        };
        let (tx, mut rx) = mpsc::channel(4);

        let _handle = spawn_countdown(deadline, now, tx);
        assert!(matches!(
            rx.recv().await,
            Some(UiEvent::CountdownTick(CountdownState::Elapsed))
        ));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let (tx, _rx) = mpsc::channel(4);
        let mut handle = spawn_countdown(Deadline::default(), Utc::now, tx);
        handle.cancel();
        handle.cancel();
        assert!(!handle.is_active());
    }
}
