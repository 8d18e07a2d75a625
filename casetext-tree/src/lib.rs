//! This crate provides the tree of a test plan (projects, suites, cases, steps and actions)
//! and its line-oriented text form (see [`text`]).
//!
//! Each node of the tree takes exactly one line of text. Nesting is not written out (any
//! indentation is only for the reader); it is rebuilt from the [`Level`] each line declares
//! through its prefix:
//!
//! | Prefix          | Level
//! |-----------------|---------------------------
//! | `Project: `     | [Level::Project], the root of a tree
//! | `TestSuite: `   | [Level::Suite]
//! | `TestCase: `    | [Level::Case]
//! | `TestStep: `    | [Level::Step]
//! | _none_          | [Level::Action], the only leaf level
//!
//! A line may further be marked with:
//!
//! | Syntax                          | Description
//! |---------------------------------|---------------------------
//! | `//` _line_                     | The node is disabled (`!--` is also read)
//! | _line_ `; flags=` _a_`,`_b_     | The named flags are enabled
//! | `Template_` _prefix_ _name_     | Declares a template (only within a template root)
//! | _prefix_ `Template_` _p_`\`_t_  | A reference to template _t_ of project _p_
//! | ... `\`_t_ `"`_custom_`"`       | A reference shown under a custom name
//!
//! # Example
//!
//! ```
//! use casetext_tree::{text, Level, Workspace};
//!
//! let mut workspace = Workspace::new();
//! let project = text::load_project(
//!     &mut workspace,
//!     "
//! Project: Shop
//!     TestSuite: Checkout
//!         TestCase: Pay by card
//!             TestStep: Enter details
//!                 Type number; flags=Slow
//!                 // Type expiry
//! ",
//!     "Unnamed",
//!     None,
//! )?;
//!
//! let suite = workspace.children(project)[0];
//! assert_eq!(workspace.node(suite)?.level(), Level::Suite);
//! assert_eq!(workspace.node(suite)?.name, "Checkout");
//!
//! let printed = text::print_project(&workspace, project, &Default::default());
//! assert!(printed.ends_with("\n                //Type expiry"));
//! # Ok::<(), casetext_tree::TreeError>(())
//! ```
//!
//! Templates are kept per project in a separate template root, and references borrow the
//! children of their template whenever they are looked at (see [`Workspace::children`]).
//! Rebuilding part of a tree from text replaces its nodes wholesale; identities held
//! elsewhere can be carried over with an [`IdentityMap`].

mod error;
pub mod factory;
mod flags;
mod level;
pub mod migration;
mod node;
mod reference;
pub mod text;
mod workspace;

pub use error::TreeError;
pub use factory::{DefaultFactory, FactoryRegistry, NodeFactory};
pub use flags::{Flag, FlagOptions, Flags};
pub use level::Level;
pub use migration::{migrate, IdentityMap};
pub use node::{Node, NodeId, NodeKind, ReferenceKey};
pub use reference::Resolution;
pub use workspace::{reset_current, with_current, Ancestors, Dataset, DatasetId, Workspace};

#[cfg(test)]
mod tests;
