//! Error type shared by every fallible table operation.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A fallible allocation failed. The operation was abandoned and the table
    /// is still in its last consistent state.
    #[error("allocation failed while {what}")]
    Alloc {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },
    /// An insert stored its pair, but the growth it triggered failed. The
    /// map keeps the pair and stays at `capacity` slots.
    #[error("pair stored, but the table could not grow from {capacity} slots")]
    Grow {
        capacity: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("cannot grow past {capacity} slots")]
    CapacityOverflow { capacity: usize },
    #[error("max load must be a non-negative number, got {0}")]
    InvalidMaxLoad(f64),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn alloc(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Error::Alloc { what, source }
    }
}
