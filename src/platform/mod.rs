//! Community platform module
//!
//! This module provides the abstraction over the chat platform the role
//! lifecycle drives, and the Discord REST implementation of it.

mod discord;
#[cfg(test)]
mod mock;
mod traits;
mod types;

pub use discord::DiscordClient;
#[cfg(test)]
pub use mock::{MockOp, MockPlatform};
pub use traits::*;
pub use types::*;
