//! Output generation for batch results.
//!
//! One submodule for now:
//!
//! - [`json`]: Writes the batch result to a dated JSON file for the
//!   downstream summarization stage
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── articles_2025-06-19.json
//! ```

pub mod json;
