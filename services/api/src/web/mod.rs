pub mod protocol;
pub mod rest;
pub mod state;
pub mod workflow;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use rest::{
    delete_script_handler, get_draft_handler, get_script_handler, list_scripts_handler,
};
pub use ws_handler::ws_handler;
