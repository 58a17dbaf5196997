#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod args;
mod error;
mod handle;
mod invoke;
mod scheduler;
#[cfg(feature = "logging")]
mod utils;
mod value;

pub use crate::args::{Arg, Argument, Arguments};
pub use crate::error::{ComputeError, MatsuError};
pub use crate::handle::FutureHandle;
pub use crate::invoke::{BoundFn, Receiver, TaskFn};
pub use crate::scheduler::{Scheduler, TaskId};
#[cfg(feature = "logging")]
pub use crate::utils::init_logging;
pub use crate::value::OpaqueValue;
