//! # stria-comm
//!
//! Collective communication for elimination workers.
//!
//! Every worker holds one [`Group`] handle and calls the same collectives in
//! the same order. Two realizations satisfy the interface:
//!
//! - [`SharedGroup`]: threads sharing memory. Broadcasts go through a shared
//!   slot guarded by a reusable [`Barrier`].
//! - [`ChannelGroup`]: workers with no shared mutable state, connected by a
//!   full mesh of point-to-point channels. Every collective blocks until its
//!   messages arrive.
//!
//! A failing worker calls [`Group::abort`] so that peers blocked in a
//! collective are released with an error instead of waiting forever.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod barrier;
pub mod channel;
pub mod error;
pub mod group;
pub mod shared;

pub use barrier::{Barrier, BarrierWaitResult};
pub use channel::{channel_groups, ChannelGroup};
pub use error::CommError;
pub use group::Group;
pub use shared::{shared_groups, SharedGroup};
