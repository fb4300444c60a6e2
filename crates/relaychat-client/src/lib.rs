//! RelayChat client - reassembles relay event streams into chat messages

pub mod chat;
pub mod decoder;
pub mod error;
pub mod renderer;
pub mod session;
pub mod transport;

pub use chat::{TurnOutcome, consume_relay_stream, send_message};
pub use decoder::{RelayDecoder, RelayEvent};
pub use error::{ClientError, Result};
pub use renderer::{MessageRenderer, NullRenderer};
pub use session::{APOLOGY_TEXT, ApologyPlacement, ChatSession, PendingTurn, RenderedMessage};
pub use transport::RelayClient;
