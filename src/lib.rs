//! Find discussions and archived copies of saved articles, then triage them.
//!
//! - [`command`] parses REPL input
//! - [`discussion`] resolves Hacker News threads for a URL
//! - [`wayback`] looks up archived snapshots
//! - [`storage`] talks to the memory_jogger reading list
//! - [`session`] ties them together into the interactive loop

pub mod command;
pub mod config;
pub mod discussion;
pub mod net;
pub mod session;
pub mod storage;
pub mod wayback;
