//! do-restarting: restart daemons that still run replaced libraries or
//! binaries after a package update.
//!
//! A run asks the inspector (`needs-restarting`) which processes are stale,
//! maps each command line to a service unit, drops units on the denylist and
//! units outside their configured restart window, then restarts the rest one
//! by one, wrapping each restart in optional pre/post hook commands.

pub mod coordinator;
pub mod core;
pub mod logger;
pub mod orchestrator;
pub mod platform;
pub mod policy;
pub mod resolver;
pub mod schedule;
