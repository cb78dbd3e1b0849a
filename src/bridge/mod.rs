mod blocking;
mod outcome;
pub mod streaming;

pub use blocking::BlockingBridge;
pub use outcome::{DONE_MARKER, ERROR_MARKER, Outcome, StreamToken};
pub use streaming::{TokenReceiver, TokenSink};
