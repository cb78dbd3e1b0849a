mod pending;
mod slot;

pub use pending::PendingInputs;
pub use slot::{LatestInput, LatestInputSlot};
