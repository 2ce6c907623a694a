use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval_at};
use tracing::{debug, info, warn};

use crate::domain::pomodoro::{PomodoroTimer, TickOutcome, TimerError, TimerState};

const TICK: Duration = Duration::from_secs(1);

/// Puts the timer view in and out of fullscreen. Both calls are best-effort.
#[cfg_attr(test, mockall::automock)]
pub trait FullscreenPresenter: Send + Sync {
    fn request_fullscreen(&self) -> Result<()>;
    fn exit_fullscreen(&self) -> Result<()>;
}

/// Presenter for headless use.
pub struct NoFullscreen;

impl FullscreenPresenter for NoFullscreen {
    fn request_fullscreen(&self) -> Result<()> {
        Ok(())
    }

    fn exit_fullscreen(&self) -> Result<()> {
        Ok(())
    }
}

/// Drives a [`PomodoroTimer`] with one-second ticks on the tokio runtime.
pub struct PomodoroRunner {
    timer: Arc<Mutex<PomodoroTimer>>,
    presenter: Arc<dyn FullscreenPresenter>,
    fullscreen: AtomicBool,
    ticker: Option<JoinHandle<()>>,
}

impl PomodoroRunner {
    pub fn new(minutes: u32, presenter: Arc<dyn FullscreenPresenter>) -> Self {
        Self {
            timer: Arc::new(Mutex::new(PomodoroTimer::new(minutes))),
            presenter,
            fullscreen: AtomicBool::new(false),
            ticker: None,
        }
    }

    pub fn snapshot(&self) -> PomodoroTimer {
        self.timer.lock().clone()
    }

    pub fn state(&self) -> TimerState {
        self.timer.lock().state()
    }

    pub fn display(&self) -> String {
        self.timer.lock().display()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }

    /// No-op while running. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }
        if !self.timer.lock().start() {
            return false;
        }

        self.enter_fullscreen();
        self.ticker = Some(spawn_ticker(self.timer.clone()));
        info!(remaining = %self.display(), "Pomodoro started");
        true
    }

    pub fn pause(&mut self) -> bool {
        self.stop_ticker();
        let paused = self.timer.lock().pause();
        if paused {
            info!(remaining = %self.display(), "Pomodoro paused");
        }
        self.leave_fullscreen();
        paused
    }

    pub fn reset(&mut self) {
        self.stop_ticker();
        self.timer.lock().reset();
        self.leave_fullscreen();
        info!("Pomodoro reset");
    }

    pub fn set_minutes(&mut self, minutes: u32) -> Result<(), TimerError> {
        self.timer.lock().set_minutes(minutes)
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn enter_fullscreen(&self) {
        match self.presenter.request_fullscreen() {
            Ok(()) => self.fullscreen.store(true, Ordering::SeqCst),
            Err(e) => warn!(error = %e, "Fullscreen request failed"),
        }
    }

    fn leave_fullscreen(&self) {
        if !self.fullscreen.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.presenter.exit_fullscreen() {
            warn!(error = %e, "Exiting fullscreen failed");
        }
    }
}

impl Drop for PomodoroRunner {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

fn spawn_ticker(timer: Arc<Mutex<PomodoroTimer>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + TICK, TICK);
        loop {
            interval.tick().await;
            let outcome = timer.lock().tick();
            match outcome {
                TickOutcome::Ticked => {}
                TickOutcome::Completed => {
                    info!("Pomodoro session complete");
                    break;
                }
                TickOutcome::Ignored => {
                    debug!("Timer no longer running, ticker stopped");
                    break;
                }
            }
        }
    })
}
