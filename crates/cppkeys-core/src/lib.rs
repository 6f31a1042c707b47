//! Toggle dependency resolver for cppkeys
//!
//! This crate turns a partial operator selection of compile-time flags into a
//! complete, consistent configuration:
//!
//! - **Flag registry**: declared flags, defaults, tags and exclusivity groups
//! - **Rule table**: `when => then` implications with hard or soft strength
//! - **Evaluation plan**: dependency ordering and static cycle detection
//! - **Resolver**: fixed-point propagation, then exclusivity validation
//! - **Configuration**: every flag's final value and provenance
//!
//! # Layering
//!
//! ```text
//!            cppkeys-cli
//!                 |
//!          cppkeys-catalog
//!                 |
//!            cppkeys-core
//!   registry  rules  plan  resolver  render
//! ```
//!
//! # Example
//!
//! ```
//! use cppkeys_core::{
//!     Assignment, Catalog, Diagnostic, Expr, Flag, FlagId, FlagRegistry, ResolveError, Rule,
//!     RuleTable, Selection,
//! };
//!
//! let id = |s: &str| FlagId::new(s).unwrap();
//! let mut registry = FlagRegistry::new();
//! for name in ["BIOLOGY", "BIO_MODEL_A", "BIO_MODEL_B"] {
//!     registry.declare(Flag::new(id(name), false)).unwrap();
//! }
//! registry
//!     .group("bio-model", "biology", vec![id("BIO_MODEL_A"), id("BIO_MODEL_B")])
//!     .unwrap();
//!
//! let mut rules = RuleTable::new();
//! rules
//!     .add_rule(Rule::default_rule(
//!         "bio-default",
//!         Expr::flag(id("BIOLOGY")),
//!         vec![Assignment::on(id("BIO_MODEL_A"))],
//!     ))
//!     .unwrap();
//! let catalog = Catalog::new(registry, rules).unwrap();
//!
//! let config = catalog.resolve(&Selection::new().with(id("BIOLOGY"), true)).unwrap();
//! assert!(config.is_on("BIO_MODEL_A"));
//! assert!(!config.is_on("BIO_MODEL_B"));
//!
//! let clash = Selection::new()
//!     .with(id("BIOLOGY"), true)
//!     .with(id("BIO_MODEL_B"), true);
//! let Err(ResolveError::Failed(report)) = catalog.resolve(&clash) else {
//!     panic!("expected an exclusivity violation");
//! };
//! assert!(matches!(
//!     report.diagnostics[0],
//!     Diagnostic::MutualExclusivityViolation { .. }
//! ));
//! ```

pub mod catalog;
pub mod configuration;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod expr;
pub mod flag;
pub mod plan;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod rule;
pub mod selection;

pub use catalog::Catalog;
pub use configuration::{Configuration, FlagChange, Provenance, ResolvedFlag};
pub use diagnostic::{Claim, Diagnostic, Report, Source};
pub use document::{
    DocumentFormat, GroupDocument, RegistryDocument, RuleDocument, RuleTableDocument,
    SelectionDocument,
};
pub use error::{Error, Result};
pub use expr::Expr;
pub use flag::{Flag, FlagId};
pub use plan::{Cycle, EvaluationPlan};
pub use registry::{DEFAULT_CATEGORY, ExclusivityGroup, FlagRegistry};
pub use render::{HeaderOptions, render_header};
pub use resolver::{DEFAULT_PASS_FACTOR, ResolveError, ResolveOptions, Resolver, ResolverState};
pub use rule::{Assignment, Rule, RuleId, RuleTable, Strength};
pub use selection::Selection;
