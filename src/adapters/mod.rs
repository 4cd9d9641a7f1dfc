// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod ids;
pub mod storage;

pub use clock::{FixedClock, SystemClock};
pub use ids::{SequentialIdGenerator, UuidGenerator};
pub use storage::LocalStorage;
