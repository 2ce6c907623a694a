pub mod app_state;
pub mod collection_sync;
pub mod dashboard_service;
pub mod error_handling;
pub mod forms;
pub mod identity;
pub mod pomodoro_service;

pub use app_state::AppState;
pub use collection_sync::{CollectionSync, SyncPhase};
pub use dashboard_service::DashboardView;
pub use error_handling::SyncError;
pub use forms::{Editor, FormState};
pub use identity::{Identity, IdentityGate, ListenerHandle, StaticTokenSource, SyncBinding, TokenSource};
pub use pomodoro_service::{FullscreenPresenter, NoFullscreen, PomodoroRunner};
