// src/exec/mod.rs

//! Process execution core.
//!
//! - [`line_source`] splits a pipe into lines.
//! - [`forwarder`] runs one task per stream, forwarding lines into the shared
//!   queue until end-of-file or cancellation.
//! - [`tracker`] joins the forwarders so the exit status is only read after
//!   both streams are drained.
//! - [`dispatcher`] drains the queue into the caller's sink.
//! - [`cancel`] turns cancellation into a termination signal.
//! - [`exit`] maps the wait result to an exit status.
//! - [`runner`] wires everything together behind `CmdRunner` / `RunHandle`.

pub mod cancel;
pub mod dispatcher;
pub mod exit;
pub mod forwarder;
pub mod line_source;
pub mod runner;
pub mod tracker;

pub use cancel::CancelCoordinator;
pub use exit::ExitOutcome;
pub use forwarder::ForwardEnd;
pub use line_source::LineSource;
pub use runner::{CmdRunner, RunHandle};
