//! Output module for exporting downloaded books
//!
//! This module handles:
//! - Writing whole books and single chapters as TXT files
//! - File name sanitization

mod txt;

pub use txt::{
    render_chapter_txt, render_txt, sanitize_filename, write_chapter_txt, write_txt,
};
