//! Caller-scoped database handles.

use crate::backend::{DocumentBackend, Guard, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::schema;
use docwarden_common_config::PolicyConfig;
use docwarden_common_log::spans::{document_span, instrument_future, record_error};
use docwarden_rules::{
    effective_admin, AccessRequest, Document, DocumentError, DocumentPath, Identity, Operation,
    PolicyEngine, RoleFlags,
};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// State shared by every handle of one emulator.
pub(crate) struct StoreContext {
    pub(crate) backend: Arc<dyn DocumentBackend>,
    pub(crate) policy: RwLock<Arc<PolicyEngine>>,
    pub(crate) settings: PolicyConfig,
}

impl StoreContext {
    fn engine(&self) -> Arc<PolicyEngine> {
        self.policy.read().clone()
    }
}

/// Who is performing operations through a [`Database`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No identity; every guarded operation is denied.
    Anonymous,
    /// An authenticated identity.
    User(Identity),
    /// Administrative bypass; no policy evaluation or validation.
    Admin,
}

impl Caller {
    /// Identity id, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::User(identity) => Some(identity.id()),
            Self::Anonymous | Self::Admin => None,
        }
    }

    pub fn is_bypass(&self) -> bool {
        matches!(self, Self::Admin)
    }

    fn label(&self) -> Option<&str> {
        match self {
            Self::User(identity) => Some(identity.id()),
            Self::Admin => Some("admin"),
            Self::Anonymous => None,
        }
    }
}

/// Database handle scoped to one caller.
#[derive(Clone)]
pub struct Database {
    ctx: Arc<StoreContext>,
    caller: Caller,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("caller", &self.caller).finish()
    }
}

impl Database {
    pub(crate) fn new(ctx: Arc<StoreContext>, caller: Caller) -> Self {
        Self { ctx, caller }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Handle to a collection.
    pub fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef {
            db: self.clone(),
            name: name.to_string(),
        }
    }

    /// Handle to a document by `collection/id` path.
    pub fn doc(&self, path: &str) -> DocumentRef {
        DocumentRef {
            db: self.clone(),
            path: path.to_string(),
        }
    }

    /// Identity to evaluate with, admin status filled in from the caller's
    /// own profile when the token does not grant it.
    async fn resolve_identity(&self) -> StoreResult<Option<Identity>> {
        let Caller::User(identity) = &self.caller else {
            return Ok(None);
        };
        if identity.is_admin() || !self.ctx.settings.resolve_admin_from_profile {
            return Ok(Some(identity.clone()));
        }

        let Ok(profile_path) = DocumentPath::new("users", identity.id()) else {
            return Ok(Some(identity.clone()));
        };
        let profile = self.ctx.backend.get(&profile_path).await?;
        if effective_admin(profile.as_ref()) == Some(true) {
            debug!(caller = identity.id(), "Admin status resolved from profile");
            Ok(Some(identity.clone().with_role_flags(RoleFlags::admin())))
        } else {
            Ok(Some(identity.clone()))
        }
    }
}

/// Handle to a collection.
#[derive(Debug, Clone)]
pub struct CollectionRef {
    db: Database,
    name: String,
}

impl CollectionRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to a document in this collection.
    pub fn doc(&self, id: &str) -> DocumentRef {
        DocumentRef {
            db: self.db.clone(),
            path: format!("{}/{}", self.name, id),
        }
    }
}

/// Document returned by a successful read.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    path: DocumentPath,
    data: Document,
}

impl DocumentSnapshot {
    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn data(&self) -> &Document {
        &self.data
    }

    pub fn into_data(self) -> Document {
        self.data
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }

    /// Decode the document into a typed model.
    pub fn deserialize<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(self.data.deserialize()?)
    }
}

/// Handle to a single document.
///
/// The path is checked when an operation runs, so building a handle never
/// fails.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    db: Database,
    path: String,
}

impl DocumentRef {
    /// Raw path this handle points at.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn parsed_path(&self) -> StoreResult<DocumentPath> {
        Ok(DocumentPath::parse(&self.path)?)
    }

    /// Read the document. Missing documents read as `None` when the policy
    /// allows the read.
    pub async fn get(&self) -> StoreResult<Option<DocumentSnapshot>> {
        self.traced("get", self.read()).await
    }

    /// Write the whole document: a create when it does not exist, otherwise
    /// an update with full replacement.
    pub async fn set<T: Serialize>(&self, data: &T) -> StoreResult<()> {
        let proposed = Document::from_serializable(data);
        self.traced("set", self.replace(proposed)).await
    }

    /// Merge fields into an existing document. Fails with
    /// [`StoreError::NotFound`] if the write is allowed but the document does
    /// not exist.
    pub async fn update<T: Serialize>(&self, patch: &T) -> StoreResult<()> {
        let patch = Document::from_serializable(patch);
        self.traced("update", self.merge(patch)).await
    }

    /// Remove the document. Deleting a missing document is a no-op once
    /// allowed.
    pub async fn delete(&self) -> StoreResult<()> {
        self.traced("delete", self.remove()).await
    }

    async fn traced<T, F>(&self, operation: &str, future: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let span = document_span(operation, &self.path, self.db.caller.label());
        instrument_future(
            async move {
                let result = future.await;
                if let Err(e) = &result {
                    record_error(e);
                }
                result
            },
            span,
        )
        .await
    }

    async fn read(&self) -> StoreResult<Option<DocumentSnapshot>> {
        let path = self.parsed_path()?;
        let existing = self.db.ctx.backend.get(&path).await?;
        if !self.db.caller.is_bypass() {
            let identity = self.db.resolve_identity().await?;
            let engine = self.db.ctx.engine();
            authorize(
                &engine,
                AccessRequest::new(identity.as_ref(), Operation::Read, &path)
                    .with_existing(existing.as_ref()),
            )?;
        }
        Ok(existing.map(|data| DocumentSnapshot { path, data }))
    }

    async fn replace(&self, proposed: Result<Document, DocumentError>) -> StoreResult<()> {
        let path = self.parsed_path()?;
        let proposed = proposed?;
        self.guarded_write(&path, move |guard: &GuardContext<'_>, existing| {
            let operation = if existing.is_some() {
                Operation::Update
            } else {
                Operation::Create
            };
            guard.check(operation, existing, Some(&proposed))?;
            Ok(WriteOp::Put(proposed))
        })
        .await
    }

    async fn merge(&self, patch: Result<Document, DocumentError>) -> StoreResult<()> {
        let path = self.parsed_path()?;
        let patch = patch?;
        let missing = path.to_string();
        self.guarded_write(&path, move |guard: &GuardContext<'_>, existing| {
            let proposed = match existing {
                Some(existing) => existing.merged(&patch),
                None => patch,
            };
            guard.check(Operation::Update, existing, Some(&proposed))?;
            if existing.is_none() {
                return Err(StoreError::NotFound(missing));
            }
            Ok(WriteOp::Put(proposed))
        })
        .await
    }

    async fn remove(&self) -> StoreResult<()> {
        let path = self.parsed_path()?;
        self.guarded_write(&path, |guard: &GuardContext<'_>, existing| {
            guard.check(Operation::Delete, existing, None)?;
            Ok(WriteOp::Delete)
        })
        .await
    }

    /// Resolve the caller, then run `decide` under the backend's slot lock.
    async fn guarded_write<F>(&self, path: &DocumentPath, decide: F) -> StoreResult<()>
    where
        F: FnOnce(&GuardContext<'_>, Option<&Document>) -> StoreResult<WriteOp> + Send,
    {
        let identity = self.db.resolve_identity().await?;
        let engine = self.db.ctx.engine();
        let context = GuardContext {
            identity: identity.as_ref(),
            bypass: self.db.caller.is_bypass(),
            engine: &engine,
            path,
            validate_schema: self.db.ctx.settings.validate_schema,
        };

        let guard: Guard<'_> = Box::new(move |existing: Option<&Document>| {
            let op = decide(&context, existing)?;
            if let WriteOp::Put(document) = &op {
                context.validate(document)?;
            }
            Ok(op)
        });
        self.db.ctx.backend.commit(path, guard).await
    }
}

/// Everything a guard needs to decide one write.
struct GuardContext<'a> {
    identity: Option<&'a Identity>,
    bypass: bool,
    engine: &'a PolicyEngine,
    path: &'a DocumentPath,
    validate_schema: bool,
}

impl GuardContext<'_> {
    fn check(
        &self,
        operation: Operation,
        existing: Option<&Document>,
        proposed: Option<&Document>,
    ) -> StoreResult<()> {
        if self.bypass {
            return Ok(());
        }
        authorize(
            self.engine,
            AccessRequest::new(self.identity, operation, self.path)
                .with_existing(existing)
                .with_proposed(proposed),
        )
    }

    fn validate(&self, document: &Document) -> StoreResult<()> {
        if self.bypass || !self.validate_schema {
            return Ok(());
        }
        schema::validate(self.path.collection(), document)
    }
}

fn authorize(engine: &PolicyEngine, request: AccessRequest<'_>) -> StoreResult<()> {
    match engine.evaluate(&request).reason() {
        None => Ok(()),
        Some(reason) => Err(StoreError::PermissionDenied {
            operation: request.operation,
            path: request.path.to_string(),
            reason,
        }),
    }
}
