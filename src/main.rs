use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mindmaze::config::AppConfig;
use mindmaze::domain::Tally;
use mindmaze::repository::Repository;
use mindmaze::services::error_handling::UserErrorFormatter;
use mindmaze::services::{AppState, Identity, IdentityGate, NoFullscreen, PomodoroRunner, StaticTokenSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    info!(backend = %config.backend_url, "Starting mindmaze");

    let repository = Repository::from_config(&config)?;
    let gate = Arc::new(IdentityGate::new());
    let state = AppState::new(repository, gate.clone());

    let Some(token) = config.id_token.clone() else {
        warn!("No identity token set; nothing to sync");
        println!("Set MINDMAZE_ID_TOKEN to sign in.");
        return Ok(());
    };

    let session = match state.repository.account.login_or_signup(&token).await {
        Ok(session) => {
            info!(session_token_len = session.len(), "Backend session established");
            Some(session)
        }
        Err(e) => {
            warn!(error = %e, "Backend login failed, continuing with identity token");
            None
        }
    };
    gate.sign_in(Identity::new("cli", Arc::new(StaticTokenSource::new(token))));

    if let Err(e) = state.reload_all().await {
        println!("{}", UserErrorFormatter::format_for_ui(&e));
    }

    println!("session:    {}", if session.is_some() { "established" } else { "none" });
    println!("todos:      {}", state.todos.len());
    if let Some(line) = state.todos.tally().summary_line() {
        println!("            {}", line);
    }
    println!("goals:      {}", state.goals.len());
    println!("notes:      {}", state.notes.len());
    println!("planner:    {}", state.planner.len());
    println!("projects:   {}", state.projects.len());
    let schedule: Tally = state.schedule.tally();
    println!("scheduled:  {} ({} done)", schedule.total, schedule.completed);

    let pomodoro = PomodoroRunner::new(config.pomodoro_minutes, Arc::new(NoFullscreen));
    println!("pomodoro:   {} ({})", pomodoro.display(), pomodoro.snapshot().status_message());

    Ok(())
}
