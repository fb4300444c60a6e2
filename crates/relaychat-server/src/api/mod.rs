pub mod chat;
pub mod relay;
pub mod response;
pub mod state;

pub use response::ApiError;
pub use state::AppState;
