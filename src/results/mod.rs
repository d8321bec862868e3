//! Run results
//!
//! Champion aggregation and append-only persistence of run records.

pub mod record;
pub mod store;

pub mod prelude {
    pub use super::record::*;
    pub use super::store::*;
}
