// Profile API: CV upload with text extraction, LLM-backed profile
// extraction, and manual data submission. All oracle calls go through the
// pipeline module; nothing here talks to the LLM gateway directly.

pub mod handlers;
pub mod validation;
