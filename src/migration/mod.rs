//! Migration
//!
//! Selection and replacement policies, migrant pools and the coordinator that
//! brokers migrant exchange between islands.

pub mod coordinator;
pub mod migrant;
pub mod pool;
pub mod replacement;
pub mod selection;

pub mod prelude {
    pub use super::coordinator::*;
    pub use super::migrant::*;
    pub use super::pool::*;
    pub use super::replacement::*;
    pub use super::selection::*;
}
