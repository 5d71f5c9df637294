//! Policy-guarded in-process document store.
//!
//! An [`Emulator`] holds one [`DocumentBackend`] and the active
//! [`RuleSet`](docwarden_rules::RuleSet). Callers get a [`Database`] handle
//! scoped to an identity, to no identity, or to the admin bypass, and every
//! `get`/`set`/`update`/`delete` made through a non-bypass handle is decided
//! by the rules before it touches the data.
//!
//! ```
//! use docwarden_rules::Identity;
//! use docwarden_store::Emulator;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let emulator = Emulator::default();
//! let me = emulator.test_app(Identity::new("user_abc").unwrap());
//!
//! me.collection("todos")
//!     .doc("form123")
//!     .set(&json!({"name": "Buy milk", "uid": "user_abc"}))
//!     .await
//!     .unwrap();
//!
//! let err = me.doc("todos/form456")
//!     .set(&json!({"name": "Not mine", "uid": "user_xyz"}))
//!     .await
//!     .unwrap_err();
//! assert!(err.is_permission_denied());
//! # });
//! ```

pub mod backend;
pub mod client;
pub mod emulator;
pub mod error;
pub mod schema;

pub use backend::{BackendStats, DocumentBackend, Guard, MemoryBackend, WriteOp};
pub use client::{Caller, CollectionRef, Database, DocumentRef, DocumentSnapshot};
pub use emulator::Emulator;
pub use error::{FieldErrors, StoreError, StoreResult};
