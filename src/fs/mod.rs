//! Filesystem module.
//!
//! Provides:
//! - Destination path templating
//! - Filename sanitization

pub mod naming;
pub mod template;

pub use naming::{sanitize_filename, sanitize_foldername, split_extension, NamingOptions};
pub use template::{build_file_path, render_segment, FormatVariables};
