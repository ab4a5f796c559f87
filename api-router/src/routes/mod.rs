pub mod liveness;
pub mod logs;
pub mod readiness;
pub mod workspaces;
