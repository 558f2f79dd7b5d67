use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

pub const TICK: Duration = Duration::from_secs(1);

const DAY_MS: i64 = 86_400_000;
const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;
const SECOND_MS: i64 = 1_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    /// `None` once the distance has gone negative.
    pub fn from_millis(distance: i64) -> Option<Self> {
        if distance < 0 {
            return None;
        }
        let days = distance / DAY_MS;
        let rest = distance % DAY_MS;
        Some(Self {
            days: days as u64,
            hours: (rest / HOUR_MS) as u64,
            minutes: (rest % HOUR_MS / MINUTE_MS) as u64,
            seconds: (rest % MINUTE_MS / SECOND_MS) as u64,
        })
    }

    pub fn padded(&self) -> [String; 4] {
        [self.days, self.hours, self.minutes, self.seconds].map(|n| format!("{:02}", n))
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [d, h, m, s] = self.padded();
        write!(f, "{}:{}:{}:{}", d, h, m, s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Stopped,
}

/// Time remaining until a kickoff, advanced one tick at a time.
#[derive(Debug, Clone)]
pub struct Countdown {
    target: DateTime<Utc>,
    phase: Phase,
    shown: TimeLeft,
}

impl Countdown {
    /// Nothing to count down to unless the target is still ahead.
    pub fn start(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let shown = TimeLeft::from_millis(distance_ms(target, now))?;
        Some(Self { target, phase: Phase::Running, shown })
    }

    /// Once stopped, further ticks change nothing and the last value stays.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Phase {
        if self.phase == Phase::Stopped {
            return Phase::Stopped;
        }
        match TimeLeft::from_millis(distance_ms(self.target, now)) {
            Some(left) => self.shown = left,
            None => self.phase = Phase::Stopped,
        }
        self.phase
    }

    pub fn shown(&self) -> TimeLeft {
        self.shown
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }
}

fn distance_ms(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    target.timestamp_millis() - now.timestamp_millis()
}

/// A running countdown task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct CountdownTimer {
    target: DateTime<Utc>,
    rx: watch::Receiver<TimeLeft>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Must be called from within a tokio runtime.
    pub fn start<C>(target: DateTime<Utc>, clock: C) -> Option<Self>
    where
        C: Fn() -> DateTime<Utc> + Send + 'static,
    {
        let countdown = Countdown::start(target, clock())?;
        let (tx, rx) = watch::channel(countdown.shown());
        let task = tokio::spawn(run(countdown, clock, tx));
        Some(Self { target, rx, task })
    }

    pub fn time_left(&self) -> TimeLeft {
        *self.rx.borrow()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    #[cfg(test)]
    fn subscribe(&self) -> watch::Receiver<TimeLeft> {
        self.rx.clone()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<C>(mut countdown: Countdown, clock: C, tx: watch::Sender<TimeLeft>)
where
    C: Fn() -> DateTime<Utc>,
{
    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick is immediate and its value was published on start.
    interval.tick().await;

    loop {
        interval.tick().await;
        match countdown.tick(clock()) {
            Phase::Running => {
                tx.send_replace(countdown.shown());
            }
            Phase::Stopped => {
                debug!(kickoff = %countdown.target(), "kickoff reached, countdown stopped");
                break;
            }
        }
    }
}
