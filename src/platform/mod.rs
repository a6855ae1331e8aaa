//! Platform layer: bounded subprocess execution and the external programs
//! (inspector, service manager, shell hooks) behind traits.

pub mod exec;
pub mod linux;
pub mod pal;
