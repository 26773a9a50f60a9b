//! Test suites for the mesh daemon.

mod process_behaviour;
pub(crate) mod support;
