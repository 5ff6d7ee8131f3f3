pub mod protocol;
pub mod rest;
pub mod state;
pub mod turn;
pub mod ws_handler;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{action_handler, create_session_handler, score_handler};
pub use ws_handler::ws_handler;
