//! Application-level configuration.
//!
//! - [`AgentParams`] — answer loop control (iteration budget, history window,
//!   prompt bounds, deadline)

pub mod agent_params;

pub use agent_params::AgentParams;
