pub mod enums;
pub mod modification;
pub mod routine;
pub mod stats;
pub mod task;

pub use enums::{InstanceId, ItemType, OverrideStatus, RepeatFrequency};
pub use modification::{DailyModification, Modification};
pub use routine::Routine;
pub use stats::{UserStats, POINTS_PER_COMPLETION};
pub use task::{Task, DEFAULT_DURATION_MINUTES};
