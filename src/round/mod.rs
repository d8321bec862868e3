//! Migration rounds
//!
//! The round protocol state machine, the driver that runs rounds over an
//! archipelago, and the reports it produces.

pub mod driver;
pub mod protocol;
pub mod report;

pub mod prelude {
    pub use super::driver::{FailurePolicy, RoundDriver, RoundDriverBuilder, TimeoutPolicy};
    pub use super::protocol::*;
    pub use super::report::*;
}
