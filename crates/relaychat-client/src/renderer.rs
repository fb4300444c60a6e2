use crate::session::RenderedMessage;

/// Receives UI updates while a turn streams in.
pub trait MessageRenderer: Send {
    fn message_appended(&mut self, message: &RenderedMessage);
    fn message_updated(&mut self, message: &RenderedMessage);
    fn loading_changed(&mut self, _loading: bool) {}
}

pub struct NullRenderer;

impl MessageRenderer for NullRenderer {
    fn message_appended(&mut self, _message: &RenderedMessage) {}
    fn message_updated(&mut self, _message: &RenderedMessage) {}
}
