//! Executor integration tests
//!
//! Exercises the full invocation path (function name, arguments, transient
//! map) against an in-memory store.

mod common;

mod command_dispatch;
mod invariants;
mod queries;
