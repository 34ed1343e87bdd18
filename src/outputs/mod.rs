//! Output generation for JSON and Markdown.
//!
//! # Submodules
//!
//! - [`json`]: Writes trending pages and the canonical record store as JSON
//! - [`markdown`]: Renders a trending page as Markdown for reading
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── records.json
//! ├── trending.json
//! └── 2025-05-06/
//!     └── afternoon.json
//!
//! markdown_output_dir/
//! └── 2025-05-06_afternoon.md
//! ```

pub mod json;
pub mod markdown;
