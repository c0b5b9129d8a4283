//! Logging session: the registries every logger of one session shares
//!
//! The process-wide default session is reached through [`Session::global`];
//! tests and embedders that need isolation build their own with
//! [`Session::new`] and create loggers from it.

use super::{
    adapter::{Adapter, AdapterRegistry, FilterFn},
    blacklist::Blacklist,
    config::GlobalConfig,
    context::Context,
    error::Result,
    logger::{Binding, EventLogger, ExternalLogger, LoggerInner, ParentRef, ParentSpec},
    metrics::LoggerMetrics,
    value::{FieldValue, Fields},
};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Reserved name of the implicit ancestor of every logger
pub const GLOBAL_LOGGER_NAME: &str = "global";

static DEFAULT_SESSION: OnceLock<Session> = OnceLock::new();

struct Registry {
    /// First logger registered under each name
    loggers: HashMap<String, Arc<LoggerInner>>,
    /// First non-global logger constructed
    root: Option<Arc<LoggerInner>>,
    global: Arc<LoggerInner>,
}

impl Registry {
    fn new() -> Self {
        let global = Arc::new(LoggerInner::ready(
            GLOBAL_LOGGER_NAME,
            Binding::detached(Arc::new(Context::new(GLOBAL_LOGGER_NAME))),
        ));
        let mut loggers = HashMap::new();
        loggers.insert(GLOBAL_LOGGER_NAME.to_string(), Arc::clone(&global));
        Self {
            loggers,
            root: None,
            global,
        }
    }
}

struct SessionInner {
    registry: RwLock<Registry>,
    adapters: RwLock<AdapterRegistry>,
    blacklist: RwLock<Blacklist>,
    config: RwLock<GlobalConfig>,
    external: RwLock<Option<Arc<dyn ExternalLogger>>>,
    metrics: LoggerMetrics,
    /// Held while a lazy logger resolves its parent chain
    init: ReentrantMutex<()>,
}

/// Shared handle to one set of logger registries
///
/// # Example
///
/// ```
/// use context_event_logger::appenders::MemoryAdapter;
/// use context_event_logger::core::Session;
/// use std::sync::Arc;
///
/// let session = Session::new();
/// let memory = Arc::new(MemoryAdapter::new());
/// session.register_adapter(memory.clone(), None);
///
/// let app = session.create_logger("app");
/// app.log("started", &[]);
/// assert_eq!(memory.len(), 1);
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GlobalConfig::default())
    }

    #[must_use]
    pub fn with_config(config: GlobalConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                registry: RwLock::new(Registry::new()),
                adapters: RwLock::new(AdapterRegistry::new()),
                blacklist: RwLock::new(Blacklist::new()),
                config: RwLock::new(config),
                external: RwLock::new(None),
                metrics: LoggerMetrics::new(),
                init: ReentrantMutex::new(()),
            }),
        }
    }

    /// Process-wide default session
    pub fn global() -> Session {
        DEFAULT_SESSION.get_or_init(Session::new).clone()
    }

    /// Create a logger bound to this session, parented by root or global
    pub fn create_logger(&self, name: impl Into<String>) -> EventLogger {
        self.create_child(name, ParentRef::Unresolved)
    }

    /// Create a logger under an explicit or named parent
    ///
    /// A logger whose name is already registered reuses that logger's
    /// context and parent once initialized; `parent` is then ignored.
    pub fn create_child(&self, name: impl Into<String>, parent: impl Into<ParentRef>) -> EventLogger {
        let name = name.into();
        let parent: ParentRef = parent.into();
        let spec = ParentSpec::from(parent);
        let inner = Arc::new(LoggerInner::new(name.clone(), spec));

        {
            let mut registry = self.inner.registry.write();
            registry
                .loggers
                .entry(name.clone())
                .or_insert_with(|| Arc::clone(&inner));
            if registry.root.is_none() && name != GLOBAL_LOGGER_NAME {
                registry.root = Some(Arc::clone(&inner));
            }
        }

        let logger = EventLogger::from_parts(inner, self.clone());
        if !self.config().lazy_loading {
            logger.init();
        }
        logger
    }

    /// Registered logger by name
    pub fn logger(&self, name: &str) -> Option<EventLogger> {
        let inner = self.inner.registry.read().loggers.get(name).cloned()?;
        Some(EventLogger::from_parts(inner, self.clone()))
    }

    /// The reserved global logger
    pub fn global_logger(&self) -> EventLogger {
        let inner = Arc::clone(&self.inner.registry.read().global);
        EventLogger::from_parts(inner, self.clone())
    }

    /// Name of the default parent, if any non-global logger exists
    pub fn root_name(&self) -> Option<String> {
        self.inner
            .registry
            .read()
            .root
            .as_ref()
            .map(|root| root.name().to_string())
    }

    pub fn register_adapter(&self, adapter: Arc<dyn Adapter>, filter: Option<FilterFn>) {
        self.inner.adapters.write().register(adapter, filter);
    }

    /// Register an adapter selected by a closure
    pub fn register_filtered<F>(&self, adapter: Arc<dyn Adapter>, filter: F)
    where
        F: Fn(&str, &Fields) -> bool + Send + Sync + 'static,
    {
        self.register_adapter(adapter, Some(Arc::new(filter)));
    }

    /// Copy of the registry; filters and adapters run without its lock held
    pub fn adapters(&self) -> AdapterRegistry {
        self.inner.adapters.read().clone()
    }

    pub fn set_blacklist<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.inner.blacklist.write() = Blacklist::from_keys(keys);
    }

    pub fn add_blacklist_key(&self, key: impl Into<String>) -> bool {
        self.inner.blacklist.write().insert(key)
    }

    pub fn blacklist(&self) -> Blacklist {
        self.inner.blacklist.read().clone()
    }

    pub(crate) fn redact(&self, fields: &Fields) -> Fields {
        self.inner.blacklist.read().filter_fields(fields)
    }

    /// Write into the global logger's context, the lowest-precedence ancestor
    pub fn set_global(&self, payload: &Fields) -> Fields {
        let global = Arc::clone(&self.inner.registry.read().global);
        match global.binding() {
            Some(binding) => binding.context.update(payload),
            None => Fields::new(),
        }
    }

    /// Set one configuration flag by key, e.g. `autoTimeStamp`
    pub fn set_global_config(&self, key: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.inner.config.write().set(key, value.into())
    }

    pub fn config(&self) -> GlobalConfig {
        self.inner.config.read().clone()
    }

    pub fn update_config<F>(&self, f: F)
    where
        F: FnOnce(&mut GlobalConfig),
    {
        f(&mut self.inner.config.write());
    }

    /// Route every `log`/`log_event` straight to `logger` until [`Session::reset`]
    pub fn set_external_logger(&self, logger: Arc<dyn ExternalLogger>) {
        *self.inner.external.write() = Some(logger);
    }

    pub fn has_external_logger(&self) -> bool {
        self.inner.external.read().is_some()
    }

    pub(crate) fn external_logger(&self) -> Option<Arc<dyn ExternalLogger>> {
        self.inner.external.read().clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    /// Tear down every registry and recreate the global logger
    ///
    /// Loggers created before the reset keep their old context and parent.
    pub fn reset(&self) {
        *self.inner.registry.write() = Registry::new();
        self.inner.adapters.write().clear();
        self.inner.blacklist.write().clear();
        *self.inner.config.write() = GlobalConfig::default();
        *self.inner.external.write() = None;
        self.inner.metrics.reset();
    }

    pub(crate) fn init_guard(&self) -> ReentrantMutexGuard<'_, ()> {
        self.inner.init.lock()
    }

    pub(crate) fn report(&self, line: fmt::Arguments<'_>) {
        if self.inner.config.read().report_failures {
            eprintln!("{}", line);
        }
    }

    /// Bind a logger that is being initialized: reuse a same-name logger,
    /// otherwise link a fresh context under the resolved parent.
    pub(crate) fn bind(&self, inner: &Arc<LoggerInner>, spec: ParentSpec) -> Binding {
        let existing = self.inner.registry.read().loggers.get(inner.name()).cloned();
        if let Some(existing) = existing.filter(|e| !Arc::ptr_eq(e, inner)) {
            if let Some(binding) = existing.ensure_ready(self) {
                return binding;
            }
        }

        match self.resolve_parent(inner, spec) {
            Some(parent) => Binding::child_of(inner.name(), parent),
            None => Binding::detached(Arc::new(Context::new(inner.name()))),
        }
    }

    /// Explicit reference, then name lookup, then root, then global
    fn resolve_parent(&self, inner: &Arc<LoggerInner>, spec: ParentSpec) -> Option<Binding> {
        let (named, root, global) = {
            let registry = self.inner.registry.read();
            let named = match &spec {
                ParentSpec::Name(name) => registry.loggers.get(name).cloned(),
                _ => None,
            };
            (named, registry.root.clone(), Arc::clone(&registry.global))
        };
        let explicit = match spec {
            ParentSpec::Explicit(parent) => Some(parent),
            _ => None,
        };

        [explicit, named, root, Some(global)]
            .into_iter()
            .flatten()
            .filter(|candidate| !Arc::ptr_eq(candidate, inner))
            .find_map(|candidate| candidate.ensure_ready(self))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.registry.read();
        f.debug_struct("Session")
            .field("loggers", &registry.loggers.len())
            .field("root", &registry.root.as_ref().map(|r| r.name().to_string()))
            .field("adapters", &self.inner.adapters.read().len())
            .field("blacklist", &self.inner.blacklist.read().keys())
            .field("config", &*self.inner.config.read())
            .finish()
    }
}
