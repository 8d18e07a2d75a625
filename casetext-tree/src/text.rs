//! The line-oriented text form of a test plan tree
//!
//! Each node takes exactly one line. Nesting is not spelled out in the text; it is rebuilt
//! from the [`Level`][crate::Level] each line declares through its prefix. See the crate
//! documentation for the grammar.

mod parse;
mod print;

pub use parse::{load_project, load_templates, parse_lines, parse_text, Parser};
pub use print::{
    print_editor, print_file, print_project, print_templates, EditorText, PrintOptions,
    ReadOnlyRange,
};

/// Marks a disabled node
pub const COMMENT_MARKER: &str = "//";

/// Older form of [`COMMENT_MARKER`], still accepted when reading
pub const LEGACY_COMMENT_MARKER: &str = "!--";

/// Introduces a template declaration, or the label of a reference
pub const TEMPLATE_MARKER: &str = "Template_";

/// Separates a node's name from its enabled flags
pub const FLAGS_SEPARATOR: &str = "; flags=";

/// Separates project and template names in a reference label
pub const REFERENCE_SEPARATOR: char = '\\';
