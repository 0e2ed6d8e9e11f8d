pub mod clock;
pub mod device;
pub mod machine;
pub mod manager;
pub mod types;

pub use device::{AudioDevice, NullDevice};
pub use machine::{PlaybackMachine, TickOutcome};
pub use manager::AudioManager;
pub use types::*;
