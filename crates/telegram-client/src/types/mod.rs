//! Bot API wire types.

mod send;
mod update;

pub use send::*;
pub use update::*;
