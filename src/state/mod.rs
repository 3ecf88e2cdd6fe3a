/// State management module
///
/// This module handles all client-side state, including:
/// - The wire data model shared with the backend (data.rs)
/// - Roles and screen permissions (access.rs)
/// - The persisted sign-in session (session.rs)
/// - Request tickets for stale-response rejection (sequence.rs)

pub mod access;
pub mod data;
pub mod sequence;
pub mod session;
