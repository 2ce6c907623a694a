use thiserror::Error;

pub const DEFAULT_MINUTES: u32 = 25;
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero on its own.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Ticked,
    Completed,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimerError {
    #[error("Duration can only be changed while idle (timer is {state:?})")]
    DurationLocked { state: TimerState },
}

/// Countdown state machine. Time only moves through `tick`.
#[derive(Debug, Clone, PartialEq)]
pub struct PomodoroTimer {
    minutes: u32,
    remaining_secs: u32,
    state: TimerState,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

impl PomodoroTimer {
    pub fn new(minutes: u32) -> Self {
        let minutes = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
        Self {
            minutes,
            remaining_secs: minutes * 60,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Returns false when already running.
    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Running => false,
            TimerState::Complete => {
                self.remaining_secs = self.minutes * 60;
                self.state = TimerState::Running;
                true
            }
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                true
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.state = TimerState::Paused;
        true
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_secs = self.minutes * 60;
    }

    pub fn set_minutes(&mut self, minutes: u32) -> Result<(), TimerError> {
        match self.state {
            TimerState::Idle | TimerState::Complete => {
                self.minutes = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
                self.remaining_secs = self.minutes * 60;
                self.state = TimerState::Idle;
                Ok(())
            }
            state => Err(TimerError::DurationLocked { state }),
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.state = TimerState::Complete;
            return TickOutcome::Completed;
        }
        self.remaining_secs -= 1;
        TickOutcome::Ticked
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn status_message(&self) -> String {
        if self.remaining_secs == 0 {
            return "Session Complete!".to_string();
        }
        let plural = if self.minutes > 1 { "s" } else { "" };
        format!("Stay focused for {} minute{}.", self.minutes, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_idle_at_full_duration() {
        let timer = PomodoroTimer::default();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.display(), "25:00");
        assert_eq!(timer.status_message(), "Stay focused for 25 minutes.");
    }

    #[test]
    fn test_sixty_one_ticks() {
        let mut timer = PomodoroTimer::default();
        assert!(timer.start());
        for _ in 0..61 {
            assert_eq!(timer.tick(), TickOutcome::Ticked);
        }
        assert_eq!(timer.display(), "23:59");
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut timer = PomodoroTimer::default();
        assert!(timer.start());
        assert!(!timer.start());
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn test_ticks_ignored_unless_running() {
        let mut timer = PomodoroTimer::default();
        assert_eq!(timer.tick(), TickOutcome::Ignored);

        timer.start();
        timer.tick();
        assert!(timer.pause());
        assert_eq!(timer.tick(), TickOutcome::Ignored);
        assert_eq!(timer.display(), "24:59");
    }

    #[test]
    fn test_reaching_zero_completes() {
        let mut timer = PomodoroTimer::new(1);
        timer.start();
        for _ in 0..59 {
            assert_eq!(timer.tick(), TickOutcome::Ticked);
        }
        assert_eq!(timer.tick(), TickOutcome::Completed);
        assert_eq!(timer.state(), TimerState::Complete);
        assert_eq!(timer.display(), "00:00");
        assert_eq!(timer.status_message(), "Session Complete!");
        assert_eq!(timer.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_restart_after_complete_reloads_duration() {
        let mut timer = PomodoroTimer::new(1);
        timer.start();
        for _ in 0..60 {
            timer.tick();
        }
        assert!(timer.start());
        assert_eq!(timer.display(), "01:00");
    }

    #[test]
    fn test_duration_locked_unless_idle() {
        let mut timer = PomodoroTimer::default();
        timer.start();
        assert_eq!(
            timer.set_minutes(10),
            Err(TimerError::DurationLocked { state: TimerState::Running })
        );
        timer.pause();
        let err = timer.set_minutes(10).unwrap_err();
        assert_eq!(err.to_string(), "Duration can only be changed while idle (timer is Paused)");

        timer.reset();
        assert!(timer.set_minutes(10).is_ok());
        assert_eq!(timer.display(), "10:00");
    }

    #[test]
    fn test_minutes_clamped() {
        let mut timer = PomodoroTimer::new(0);
        assert_eq!(timer.minutes(), 1);
        timer.set_minutes(500).unwrap();
        assert_eq!(timer.minutes(), 120);
        assert_eq!(timer.status_message(), "Stay focused for 120 minutes.");
        timer.set_minutes(1).unwrap();
        assert_eq!(timer.status_message(), "Stay focused for 1 minute.");
    }

    #[test]
    fn test_reset_restores_full_duration() {
        let mut timer = PomodoroTimer::default();
        timer.start();
        timer.tick();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.display(), "25:00");
    }
}
