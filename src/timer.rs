use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle, time};
use tracing::{debug, info};

pub const WORK_FINISHED: &str = "Pomodoro completed! Time for a break!";
pub const BREAK_FINISHED: &str = "Break time is over! Start working!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerSettings {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}

impl TimerSettings {
    fn seconds_for(&self, is_break: bool) -> u32 {
        let minutes = if is_break {
            self.break_minutes
        } else {
            self.work_minutes
        };
        minutes.max(1).saturating_mul(60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Ticked,
    /// The phase ran out; `is_break` now describes the phase that just began.
    PhaseFinished { notice: &'static str, is_break: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusTimer {
    pub time_left: u32,
    pub total_time: u32,
    pub is_running: bool,
    pub is_break: bool,
    pub settings: TimerSettings,
    pub last_notice: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub timer: FocusTimer,
    pub display: String,
    pub progress_percent: f64,
}

impl FocusTimer {
    pub fn new(settings: TimerSettings) -> Self {
        let total_time = settings.seconds_for(false);
        Self {
            time_left: total_time,
            total_time,
            is_running: false,
            is_break: false,
            settings,
            last_notice: None,
        }
    }

    pub fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        true
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    pub fn reset(&mut self) {
        self.is_running = false;
        self.is_break = false;
        self.begin_phase();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Idle;
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return TickOutcome::Ticked;
        }

        let notice = if self.is_break {
            BREAK_FINISHED
        } else {
            WORK_FINISHED
        };
        self.last_notice = Some(notice);
        self.is_break = !self.is_break;
        self.begin_phase();
        TickOutcome::PhaseFinished {
            notice,
            is_break: self.is_break,
        }
    }

    /// Durations are read when a phase begins. A paused timer sitting at the
    /// edited phase picks the new duration up immediately.
    pub fn set_work_minutes(&mut self, minutes: u32) {
        self.settings.work_minutes = minutes.max(1);
        if !self.is_running && !self.is_break {
            self.begin_phase();
        }
    }

    pub fn set_break_minutes(&mut self, minutes: u32) {
        self.settings.break_minutes = minutes.max(1);
        if !self.is_running && self.is_break {
            self.begin_phase();
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_time == 0 {
            return 0.0;
        }
        f64::from(self.total_time - self.time_left.min(self.total_time)) / f64::from(self.total_time)
            * 100.0
    }

    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }

    pub fn view(&self) -> TimerView {
        TimerView {
            timer: self.clone(),
            display: self.display(),
            progress_percent: self.progress_percent(),
        }
    }

    fn begin_phase(&mut self) {
        self.total_time = self.settings.seconds_for(self.is_break);
        self.time_left = self.total_time;
    }
}

#[derive(Debug)]
pub struct TimerRunner {
    owner: String,
    period: Duration,
    timer: Arc<Mutex<FocusTimer>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl TimerRunner {
    pub fn new(owner: impl Into<String>, settings: TimerSettings, period: Duration) -> Self {
        Self {
            owner: owner.into(),
            period,
            timer: Arc::new(Mutex::new(FocusTimer::new(settings))),
            ticker: Mutex::new(None),
        }
    }

    pub async fn start(&self) -> TimerView {
        let mut ticker = self.ticker.lock().await;
        let mut timer = self.timer.lock().await;
        let active = ticker.as_ref().is_some_and(|handle| !handle.is_finished());
        if active || !timer.start() {
            debug!(owner = %self.owner, "timer already running");
            return timer.view();
        }

        *ticker = Some(tokio::spawn(run_ticker(
            self.owner.clone(),
            self.period,
            Arc::clone(&self.timer),
        )));
        info!(owner = %self.owner, "timer started");
        timer.view()
    }

    pub async fn pause(&self) -> TimerView {
        let mut ticker = self.ticker.lock().await;
        stop(&mut ticker);
        let mut timer = self.timer.lock().await;
        timer.pause();
        timer.view()
    }

    pub async fn reset(&self) -> TimerView {
        let mut ticker = self.ticker.lock().await;
        stop(&mut ticker);
        let mut timer = self.timer.lock().await;
        timer.reset();
        timer.view()
    }

    pub async fn update_settings(
        &self,
        work_minutes: Option<u32>,
        break_minutes: Option<u32>,
    ) -> TimerView {
        let mut timer = self.timer.lock().await;
        if let Some(minutes) = work_minutes {
            timer.set_work_minutes(minutes);
        }
        if let Some(minutes) = break_minutes {
            timer.set_break_minutes(minutes);
        }
        timer.view()
    }

    pub async fn view(&self) -> TimerView {
        self.timer.lock().await.view()
    }
}

impl Drop for TimerRunner {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}

fn stop(ticker: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = ticker.take() {
        handle.abort();
    }
}

async fn run_ticker(owner: String, period: Duration, timer: Arc<Mutex<FocusTimer>>) {
    let mut interval = time::interval(period);
    // the first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        let mut timer = timer.lock().await;
        match timer.tick() {
            TickOutcome::Idle => break,
            TickOutcome::Ticked => {}
            TickOutcome::PhaseFinished { notice, is_break } => {
                info!(owner = %owner, is_break, "{notice}");
            }
        }
    }
}
