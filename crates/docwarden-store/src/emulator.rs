//! In-process emulator: one backend, one active rule set, many callers.

use crate::backend::{BackendStats, DocumentBackend, MemoryBackend};
use crate::client::{Caller, Database, StoreContext};
use crate::error::{StoreError, StoreResult};
use docwarden_common_config::WardenConfig;
use docwarden_common_log::spans::{emulator_span, instrument_future, Timer};
use docwarden_rules::{Identity, PolicyEngine, RuleSet};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Document store emulator.
///
/// Every [`Database`] handed out shares the emulator's data and sees rule
/// reloads immediately.
pub struct Emulator {
    project_id: String,
    audit: bool,
    ctx: Arc<StoreContext>,
}

impl Emulator {
    /// Create an emulator with an in-memory backend and the default rules.
    pub fn new(config: &WardenConfig) -> Self {
        Self::with_backend(config, Arc::new(MemoryBackend::new()))
    }

    /// Create an emulator over an existing backend.
    pub fn with_backend(config: &WardenConfig, backend: Arc<dyn DocumentBackend>) -> Self {
        let audit = config.audit.log_decisions;
        let engine = PolicyEngine::new(RuleSet::todo_app()).with_audit(audit);
        Self {
            project_id: config.emulator.project_id.clone(),
            audit,
            ctx: Arc::new(StoreContext {
                backend,
                policy: RwLock::new(Arc::new(engine)),
                settings: config.policy.clone(),
            }),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Replace the active rule set. Operations already deciding keep the rule
    /// set they started with.
    pub fn load_rules(&self, rules: RuleSet) {
        let _span = emulator_span(&self.project_id, "load_rules").entered();
        let count = rules.len();
        let engine = Arc::new(PolicyEngine::new(rules).with_audit(self.audit));
        *self.ctx.policy.write() = engine;
        info!(rules = count, "Rules loaded");
    }

    /// Active rule set.
    pub fn rules(&self) -> RuleSet {
        self.ctx.policy.read().rules().clone()
    }

    /// Remove every document, returning how many were removed.
    pub async fn clear_data(&self) -> StoreResult<usize> {
        let span = emulator_span(&self.project_id, "clear_data");
        instrument_future(
            async {
                let timer = Timer::start("clear_data");
                let removed = self.ctx.backend.clear().await?;
                timer.finish();
                info!(removed, "Data cleared");
                Ok::<_, StoreError>(removed)
            },
            span,
        )
        .await
    }

    /// Handle acting as `identity`.
    pub fn test_app(&self, identity: Identity) -> Database {
        Database::new(self.ctx.clone(), Caller::User(identity))
    }

    /// Handle with no identity.
    pub fn unauthenticated_app(&self) -> Database {
        Database::new(self.ctx.clone(), Caller::Anonymous)
    }

    /// Handle that bypasses the rules, for seeding fixtures.
    pub fn admin_app(&self) -> Database {
        Database::new(self.ctx.clone(), Caller::Admin)
    }

    pub async fn document_count(&self) -> usize {
        self.ctx.backend.len().await
    }

    pub async fn stats(&self) -> BackendStats {
        self.ctx.backend.stats().await
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(&WardenConfig::default())
    }
}

impl std::fmt::Debug for Emulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emulator")
            .field("project_id", &self.project_id)
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}
