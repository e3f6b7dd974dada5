//! Sentinel DNS Guard infrastructure layer: adapters implementing the
//! `application` crate's ports against real sockets, subprocesses, and
//! the filesystem.

pub mod blocklist;
pub mod dns;
pub mod repositories;
pub mod system;
