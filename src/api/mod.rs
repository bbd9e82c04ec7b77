mod handlers;
mod routes;
mod session;
mod state;

pub use routes::create_router;
pub use session::{ClientId, CurrentSession};
pub use state::AppState;
