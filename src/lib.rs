pub mod api;
pub mod app;
pub mod errors;
pub mod grades;
pub mod handlers;
pub mod models;
pub mod sections;
pub mod session;
pub mod state;
pub mod ui;

pub use api::{resolve_api_base, ApiClient};
pub use app::router;
pub use session::{resolve_session_path, SessionStore};
pub use state::AppState;
