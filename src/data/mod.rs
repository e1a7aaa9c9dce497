pub mod dataset;
pub mod error;
pub mod inspect;
pub mod manifest;
pub mod operations;
pub mod organizer;
pub mod split;
pub mod summary;

pub use dataset::Dataset;
pub use inspect::{inspect, InspectOptions, InspectReport};
pub use organizer::{organize, EntryWarning, OrganizeOptions, TransferMode};
pub use split::SplitPlan;
