//! A line-oriented text form for hierarchical test plans.
//!
//! # Test plans
//!
//! A test plan is a tree of projects, suites, cases, steps and actions. Each node is written
//! on a line of its own, with its level given by a prefix:
//! ```
//! use casetext::tree::{text, Workspace};
//!
//! let mut workspace = Workspace::new();
//! let project = text::load_project(
//!     &mut workspace,
//! "
//! Project: Shop
//!     TestSuite: Checkout
//!         TestCase: Pay by card
//!             TestStep: Enter details
//!                 Type card number
//!                 // Type expiry date
//!         TestCase: Template_Shared\\Login \"Sign in first\"
//! ",
//!     "Shop",
//!     None,
//! )?;
//! assert_eq!(workspace.descendants(project).len(), 6);
//! # Ok::<(), casetext::tree::TreeError>(())
//! ```
//! Disabled nodes are commented out with `//`, and flags are listed at the end of a line after
//! `; flags=`. For the full grammar, see the [`tree`] crate.
//!
//! # Templates and references
//!
//! Subtrees used in several places are declared once as templates of a project, and used
//! through references naming the project and template. A reference borrows the children of its
//! template: they are printed for an editor (as read-only text), but never saved with the
//! reference.
//!
//! ```
//! use casetext::tree::{text, Workspace};
//!
//! let mut workspace = Workspace::new();
//! let shared = workspace.create_project(Some("Shared"));
//! text::load_templates(&mut workspace, shared, "
//! Template_TestCase: Login
//!     TestStep: Open login page
//! ", None)?;
//!
//! let shop = text::load_project(&mut workspace, "
//! Project: Shop
//!     TestSuite: Checkout
//!         TestCase: Template_Shared\\Login
//! ", "Shop", None)?;
//!
//! let editor = text::print_editor(&workspace, &[shop], &Default::default());
//! assert!(editor.text.ends_with("            TestStep: Open login page"));
//! assert_eq!(editor.read_only.len(), 3);
//! # Ok::<(), casetext::tree::TreeError>(())
//! ```
//!
//! # Execution plans
//!
//! The [`scope`] crate keeps an ordered plan of nodes to run, carried over to the new nodes
//! whenever the tree is rebuilt from text.
//!
//! # Configuration
//!
//! Which files hold which projects is configured in `casetext.toml`, see the [`config`] crate.

pub use casetext_config as config;
pub use casetext_scope as scope;
pub use casetext_tree as tree;

pub mod dependencies;
pub mod report;
