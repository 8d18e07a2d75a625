//! Execution plans ([`Scope`]s) over a test plan tree
//!
//! A scope lists the nodes to run, each with an optional data set, a [`Stage`] and at most
//! one item it depends on. Items refer to nodes by identity, so after a part of the tree is
//! rebuilt from text they are carried over to the new nodes through an
//! [`IdentityMap`][casetext_tree::IdentityMap]:
//!
//! ```
//! use casetext_scope::Scope;
//! use casetext_tree::{text, IdentityMap, Workspace};
//!
//! let mut workspace = Workspace::new();
//! let project = text::load_project(&mut workspace, "TestSuite: Login", "Shop", None)?;
//! let suite = workspace.children(project)[0];
//!
//! let mut scope = Scope::new();
//! let item = scope.add(&workspace, suite)?;
//! let mut map = IdentityMap::new();
//! scope.track(&mut map);
//!
//! text::load_project(&mut workspace, "TestSuite: Login\nTestSuite: Logout", "Shop", Some(&mut map))?;
//! assert!(!workspace.contains(suite));
//! assert_eq!(scope.apply_migration(&map), 1);
//! assert_eq!(scope.get(item).unwrap().node(), workspace.children(project)[0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Dependencies may also be given as a graph with several dependencies per item, which is
//! reduced to single links by [`flatten`].

mod flatten;
mod scope;

pub use flatten::flatten;
pub use scope::{Scope, ScopeError, ScopeItem, ScopeItemId, Stage};
