pub mod compression;
pub mod request_logging;
pub mod response_middleware;
