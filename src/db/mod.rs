pub mod measurement;
pub mod schedule;

pub use measurement::*;
pub use schedule::*;
