//! Admin console routes. All of them sit behind bearer authentication.

pub(crate) mod blogs;
pub(crate) mod comments;
pub(crate) mod enquiries;
pub(crate) mod export;
pub(crate) mod projects;
pub(crate) mod stats;
pub(crate) mod users;
