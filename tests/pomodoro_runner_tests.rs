use mindmaze::domain::pomodoro::TimerState;
use mindmaze::services::{NoFullscreen, PomodoroRunner};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_pause_resume_keeps_remaining_time() {
    let mut runner = PomodoroRunner::new(25, Arc::new(NoFullscreen));
    runner.start();
    tokio::time::sleep(Duration::from_millis(30_500)).await;
    runner.pause();
    assert_eq!(runner.display(), "24:30");

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(runner.display(), "24:30");

    assert!(runner.start());
    tokio::time::sleep(Duration::from_millis(30_500)).await;
    assert_eq!(runner.display(), "24:00");
    assert_eq!(runner.state(), TimerState::Running);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_completion_reloads_duration() {
    let mut runner = PomodoroRunner::new(1, Arc::new(NoFullscreen));
    runner.start();
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(runner.state(), TimerState::Complete);
    assert_eq!(runner.snapshot().status_message(), "Session Complete!");

    assert!(runner.start());
    assert_eq!(runner.display(), "01:00");
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(runner.display(), "00:59");
}

#[test]
fn test_minutes_are_clamped() {
    assert_eq!(PomodoroRunner::new(0, Arc::new(NoFullscreen)).display(), "01:00");
    assert_eq!(PomodoroRunner::new(500, Arc::new(NoFullscreen)).display(), "120:00");
}
