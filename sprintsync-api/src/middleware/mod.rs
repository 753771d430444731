/// Custom middleware for the API server
///
/// - `request_log`: structured JSON request logging plus in-memory
///   Prometheus-style counters

pub mod request_log;
