//! Document access-control rules for docwarden.
//!
//! The decision engine is a pure function over a caller identity, an
//! operation, a document path and the stored/proposed document contents. It
//! returns [`Decision::Allow`] naming the granting rule, or
//! [`Decision::Deny`] with a [`DenyReason`]. The default rule set encodes the
//! todo/profile application policy:
//!
//! - `todos`: only the owner (`uid`) may read, update or delete; creation
//!   requires writing one's own `uid`.
//! - `users`: any authenticated caller may read; callers may register their
//!   own non-admin profile and update it; admins may update other profiles;
//!   nobody may change `isAdmin`.
//! - anything else is denied.
//!
//! ```
//! use docwarden_rules::{decide, DocumentPath, Identity, Operation};
//!
//! let caller = Identity::new("user_abc").unwrap();
//! let path = DocumentPath::parse("users/user_xyz").unwrap();
//! assert!(decide(Some(&caller), Operation::Read, &path, None, None).is_allow());
//! ```

pub mod audit;
pub mod decision;
pub mod document;
pub mod engine;
pub mod error;
pub mod policy;
pub mod types;

pub use audit::{log_authz, AuthzAuditEvent};
pub use decision::{AccessRequest, Decision, DenyReason};
pub use document::{effective_admin, AdminFlag, Document, TodoItem, UserProfile};
pub use engine::{decide, evaluate, PolicyEngine};
pub use error::{DocumentError, IdentityError, PathError};
pub use policy::{default_rules, Predicate, Rule, RuleSet, RuleSetBuilder, Verdict};
pub use types::{Collection, DocumentPath, Identity, Operation, RoleFlags};
