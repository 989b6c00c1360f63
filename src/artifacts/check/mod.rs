//! Reporting unexpected changes
//!
//! - `alert`: the payload handed to a sink and the sink capability itself
//! - `allow_list`: glob patterns naming permitted changes
//! - `render`: turning a classified change into alert payloads
//! - `reporter`: the per-path filtering and emission loop
//! - `sinks`: GitHub Actions workflow commands and a console sink

pub mod alert;
pub mod allow_list;
pub mod render;
pub mod reporter;
pub mod sinks;
