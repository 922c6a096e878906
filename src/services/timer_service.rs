use crate::models::quiz::DEFAULT_TIME_LIMIT_SECS;
use crate::models::timer_state::{TimerState, TimerStatus};
use crate::services::storage_service::StorageService;
use crate::utils::time::{Clock, SystemClock};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub const TIMER_KEY_PREFIX: &str = "quiz_timer_";
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

pub fn timer_key(quiz_id: &str) -> String {
    format!("{}{}", TIMER_KEY_PREFIX, quiz_id)
}

struct TimerInner {
    start_time: i64,
    elapsed_time: i64,
    status: TimerStatus,
    time_limit: u32,
}

impl TimerInner {
    fn snapshot(&self) -> TimerState {
        TimerState {
            start_time: self.start_time,
            elapsed_time: self.elapsed_time,
            is_running: self.status == TimerStatus::Running,
            time_limit: self.time_limit,
        }
    }
}

struct TimerCore {
    quiz_id: String,
    storage: StorageService,
    clock: Arc<dyn Clock>,
    inner: Mutex<TimerInner>,
}

impl TimerCore {
    fn lock(&self) -> MutexGuard<'_, TimerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, inner: &TimerInner) {
        if let Err(e) = self
            .storage
            .save_json(&timer_key(&self.quiz_id), &inner.snapshot())
        {
            warn!(quiz_id = %self.quiz_id, kind = e.kind(), error = %e, "Could not persist timer state");
        }
    }

    /// Re-derives elapsed time from the wall clock. Returns whether the timer
    /// is still running. Replaying a tick is harmless.
    fn tick(&self) -> bool {
        let mut inner = self.lock();
        if inner.status != TimerStatus::Running {
            return false;
        }
        inner.elapsed_time = (self.clock.now_ms() - inner.start_time).max(0);
        self.persist(&inner);
        true
    }
}

/// Countdown clock for one quiz attempt, persisted on every change.
///
/// `create` touches nothing; call [`SessionTimer::resume_if_persisted`] to pick
/// up state left by an earlier session. The tick loop runs only while the
/// timer is running and is aborted on pause, stop, cleanup and drop.
pub struct SessionTimer {
    core: Arc<TimerCore>,
    tick_interval: Duration,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionTimer {
    pub fn create(quiz_id: impl Into<String>, time_limit_secs: u32, storage: StorageService) -> Self {
        Self::create_with(
            quiz_id,
            time_limit_secs,
            storage,
            Arc::new(SystemClock),
            DEFAULT_TICK,
        )
    }

    pub fn create_with(
        quiz_id: impl Into<String>,
        time_limit_secs: u32,
        storage: StorageService,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        let quiz_id: String = quiz_id.into();
        let time_limit = if time_limit_secs == 0 {
            DEFAULT_TIME_LIMIT_SECS
        } else {
            time_limit_secs
        };
        let tick_interval = if tick_interval.is_zero() {
            warn!(%quiz_id, "Zero tick interval requested; using the default");
            DEFAULT_TICK
        } else {
            tick_interval
        };
        Self {
            core: Arc::new(TimerCore {
                quiz_id,
                storage,
                clock,
                inner: Mutex::new(TimerInner {
                    start_time: 0,
                    elapsed_time: 0,
                    status: TimerStatus::Idle,
                    time_limit,
                }),
            }),
            tick_interval,
            ticker: Mutex::new(None),
        }
    }

    pub fn quiz_id(&self) -> &str {
        &self.core.quiz_id
    }

    /// Restores persisted state. A timer that was running keeps its elapsed
    /// time, gets a fresh start instant and resumes ticking on its own.
    pub fn resume_if_persisted(&self) -> bool {
        let key = timer_key(&self.core.quiz_id);
        let Some(saved) = self.core.storage.load_json::<TimerState>(&key) else {
            return false;
        };

        {
            let mut inner = self.core.lock();
            inner.elapsed_time = saved.elapsed_time.max(0);
            inner.start_time = saved.start_time;
            inner.time_limit = if saved.time_limit == 0 {
                DEFAULT_TIME_LIMIT_SECS
            } else {
                saved.time_limit
            };

            if saved.is_running {
                inner.start_time = self.core.clock.now_ms() - inner.elapsed_time;
                inner.status = TimerStatus::Running;
                self.core.persist(&inner);
            } else if inner.elapsed_time > 0 {
                inner.status = TimerStatus::Paused;
            } else {
                inner.status = TimerStatus::Idle;
            }
        }

        if saved.is_running {
            debug!(quiz_id = %self.core.quiz_id, elapsed_ms = saved.elapsed_time, "Resuming running timer");
            self.spawn_ticker();
        }
        true
    }

    /// Idle or Paused -> Running, keeping previously accumulated time.
    pub fn start(&self) {
        {
            let mut inner = self.core.lock();
            if inner.status == TimerStatus::Running {
                return;
            }
            inner.start_time = self.core.clock.now_ms() - inner.elapsed_time;
            inner.status = TimerStatus::Running;
            self.core.persist(&inner);
        }
        debug!(quiz_id = %self.core.quiz_id, "Timer started");
        self.spawn_ticker();
    }

    /// Running -> Paused, freezing elapsed time at this instant.
    pub fn pause(&self) {
        {
            let mut inner = self.core.lock();
            if inner.status != TimerStatus::Running {
                return;
            }
            inner.elapsed_time = (self.core.clock.now_ms() - inner.start_time).max(0);
            inner.status = TimerStatus::Paused;
            self.core.persist(&inner);
        }
        debug!(quiz_id = %self.core.quiz_id, "Timer paused");
        self.abort_ticker();
    }

    /// Any state -> Idle, with elapsed time reset.
    pub fn stop(&self) {
        {
            let mut inner = self.core.lock();
            inner.status = TimerStatus::Idle;
            inner.elapsed_time = 0;
            inner.start_time = 0;
            self.core.persist(&inner);
        }
        debug!(quiz_id = %self.core.quiz_id, "Timer stopped");
        self.abort_ticker();
    }

    /// Stops ticking and forgets the persisted state.
    pub fn cleanup(&self) {
        self.abort_ticker();
        {
            let mut inner = self.core.lock();
            if inner.status == TimerStatus::Running {
                inner.elapsed_time = (self.core.clock.now_ms() - inner.start_time).max(0);
                inner.status = TimerStatus::Paused;
            }
        }
        if let Err(e) = self.core.storage.remove(&timer_key(&self.core.quiz_id)) {
            warn!(quiz_id = %self.core.quiz_id, kind = e.kind(), error = %e, "Could not remove timer state");
        }
    }

    /// Forces one tick now and returns the elapsed milliseconds.
    pub fn tick(&self) -> i64 {
        self.core.tick();
        self.elapsed_ms()
    }

    pub fn elapsed_ms(&self) -> i64 {
        let inner = self.core.lock();
        if inner.status == TimerStatus::Running {
            (self.core.clock.now_ms() - inner.start_time).max(0)
        } else {
            inner.elapsed_time
        }
    }

    pub fn time_limit(&self) -> u32 {
        self.core.lock().time_limit
    }

    pub fn remaining_time(&self) -> u32 {
        let elapsed_secs = self.elapsed_ms().div_euclid(1000);
        (i64::from(self.time_limit()) - elapsed_secs).max(0) as u32
    }

    pub fn formatted_time(&self) -> String {
        let remaining = self.remaining_time();
        format!("{:02}:{:02}", remaining / 60, remaining % 60)
    }

    pub fn is_time_up(&self) -> bool {
        self.remaining_time() == 0
    }

    pub fn is_running(&self) -> bool {
        self.status() == TimerStatus::Running
    }

    pub fn status(&self) -> TimerStatus {
        self.core.lock().status
    }

    pub fn has_existing_data(&self) -> bool {
        self.core.storage.contains(&timer_key(&self.core.quiz_id))
    }

    fn spawn_ticker(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = ticker.take() {
            previous.abort();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(quiz_id = %self.core.quiz_id, "No async runtime; tick loop not started");
            return;
        };

        let core = Arc::clone(&self.core);
        let period = self.tick_interval;
        *ticker = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;
            loop {
                interval.tick().await;
                if !core.tick() {
                    break;
                }
            }
        }));
    }

    fn abort_ticker(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        let ticker = self.ticker.get_mut().unwrap_or_else(|p| p.into_inner());
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
    }
}
