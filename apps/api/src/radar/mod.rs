// Radar API: scores a validated profile into the fixed eight-axis radar
// through the pipeline module, and serves the static chart configuration
// the frontend renders with.

pub mod handlers;
