//! Engine flow tests against in-memory collaborators.

mod mock;
mod synth_flow;
