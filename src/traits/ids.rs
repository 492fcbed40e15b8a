//! Id generation capability for locally created messages.

/// Produces a fresh, unique message id on every call.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> String;
}
