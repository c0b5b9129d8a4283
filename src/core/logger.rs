//! Event logger: named facade over a shared context
//!
//! A logger resolves its parent once, on first use (or at construction when
//! lazy loading is off), merges each event over its effective context, and
//! dispatches the result to every matching adapter.
//!
//! Dispatch is guarded by a two-state flag plus a pending buffer. An event
//! logged while the same logger is already dispatching (typically from inside
//! an adapter) is appended to the buffer and delivered by the running flush,
//! so nested calls never start a second dispatch loop. No lock is held while
//! an adapter runs.

use super::{
    adapter::{Adapter, FilterFn, RawEvent},
    context::{Context, ResolvedContext},
    error::Result,
    log_level::{LogLevel, LEVEL_KEY},
    record::MESSAGE_KEY,
    session::Session,
    timestamp::TIMESTAMP_KEY,
    value::{FieldValue, Fields},
};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Sink that replaces the whole dispatch pipeline when installed
///
/// Receives calls exactly as the caller made them: no context merge,
/// no adapters, no redaction.
pub trait ExternalLogger: Send + Sync {
    fn log(&self, message: &str, args: &[FieldValue]);

    fn log_event(&self, event: &Fields, level: Option<LogLevel>);
}

/// Parent given at construction
#[derive(Clone, Debug, Default)]
pub enum ParentRef {
    Explicit(EventLogger),
    Name(String),
    #[default]
    Unresolved,
}

impl From<EventLogger> for ParentRef {
    fn from(logger: EventLogger) -> Self {
        ParentRef::Explicit(logger)
    }
}

impl From<&EventLogger> for ParentRef {
    fn from(logger: &EventLogger) -> Self {
        ParentRef::Explicit(logger.clone())
    }
}

impl From<&str> for ParentRef {
    fn from(name: &str) -> Self {
        ParentRef::Name(name.to_string())
    }
}

impl From<String> for ParentRef {
    fn from(name: String) -> Self {
        ParentRef::Name(name)
    }
}

/// Parent as stored on the node until initialization consumes it
pub(crate) enum ParentSpec {
    Explicit(Arc<LoggerInner>),
    Name(String),
    Unresolved,
}

impl From<ParentRef> for ParentSpec {
    fn from(parent: ParentRef) -> Self {
        match parent {
            ParentRef::Explicit(logger) => ParentSpec::Explicit(logger.inner),
            ParentRef::Name(name) => ParentSpec::Name(name),
            ParentRef::Unresolved => ParentSpec::Unresolved,
        }
    }
}

/// Context plus strong handles on every ancestor it was linked under
///
/// `Context` only links to its parent weakly, so the binding is what keeps
/// the chain alive once the loggers that created it are gone.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) context: Arc<Context>,
    /// Nearest first, global context last
    pub(crate) ancestors: Vec<Arc<Context>>,
}

impl Binding {
    pub(crate) fn detached(context: Arc<Context>) -> Self {
        Self {
            context,
            ancestors: Vec::new(),
        }
    }

    /// Link a fresh context named `name` under `parent`
    pub(crate) fn child_of(name: &str, parent: Binding) -> Self {
        let context = Arc::new(Context::new(name).with_parent(&parent.context));
        let mut ancestors = Vec::with_capacity(parent.ancestors.len() + 1);
        ancestors.push(parent.context);
        ancestors.extend(parent.ancestors);
        Self { context, ancestors }
    }

    /// Bind an existing context, pinning whatever chain it still reaches
    pub(crate) fn adopt(context: Arc<Context>) -> Self {
        let ancestors = std::iter::successors(context.parent(), |ctx| ctx.parent()).collect();
        Self { context, ancestors }
    }

    pub(crate) fn parent(&self) -> Option<&Arc<Context>> {
        self.ancestors.first()
    }
}

enum InitState {
    Uninitialized(ParentSpec),
    Initializing(ThreadId),
    Ready(Binding),
}

/// Whether a flush is running on a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Dispatching,
}

#[derive(Debug, Clone)]
struct PendingEvent {
    context: String,
    data: Fields,
    event: Fields,
}

struct Dispatch {
    state: DispatchState,
    pending: Vec<PendingEvent>,
}

pub(crate) struct LoggerInner {
    name: String,
    state: RwLock<InitState>,
    dispatch: Mutex<Dispatch>,
}

impl LoggerInner {
    pub(crate) fn new(name: String, parent: ParentSpec) -> Self {
        Self::with_state(name, InitState::Uninitialized(parent))
    }

    pub(crate) fn ready(name: &str, binding: Binding) -> Self {
        Self::with_state(name.to_string(), InitState::Ready(binding))
    }

    fn with_state(name: String, state: InitState) -> Self {
        Self {
            name,
            state: RwLock::new(state),
            dispatch: Mutex::new(Dispatch {
                state: DispatchState::Idle,
                pending: Vec::new(),
            }),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn binding(&self) -> Option<Binding> {
        match &*self.state.read() {
            InitState::Ready(binding) => Some(binding.clone()),
            _ => None,
        }
    }

    /// Initialize on first call; `None` if this thread is already
    /// initializing the node (a parent chain that loops back on itself)
    ///
    /// Binding runs under the session's reentrant init lock, so only one
    /// thread walks parent chains at a time and a node marked
    /// `Initializing` always belongs to the current thread.
    pub(crate) fn ensure_ready(self: &Arc<Self>, session: &Session) -> Option<Binding> {
        if let Some(binding) = self.binding() {
            return Some(binding);
        }

        let _init = session.init_guard();
        let current = thread::current().id();
        let spec = {
            let mut state = self.state.write();
            match std::mem::replace(&mut *state, InitState::Initializing(current)) {
                InitState::Ready(binding) => {
                    *state = InitState::Ready(binding.clone());
                    return Some(binding);
                }
                InitState::Initializing(owner) => {
                    *state = InitState::Initializing(owner);
                    return None;
                }
                InitState::Uninitialized(spec) => spec,
            }
        };

        let binding = session.bind(self, spec);
        *self.state.write() = InitState::Ready(binding.clone());
        Some(binding)
    }
}

/// Named logger bound to a [`Session`]
///
/// Cloning yields another handle to the same logger. Constructing a second
/// logger with an existing name yields a distinct logger that shares the
/// first one's context and parent.
///
/// # Example
///
/// ```
/// use context_event_logger::appenders::MemoryAdapter;
/// use context_event_logger::core::Session;
/// use context_event_logger::fields;
/// use std::sync::Arc;
///
/// let session = Session::new();
/// session.set_global_config("autoTimeStamp", false).unwrap();
/// let memory = Arc::new(MemoryAdapter::new());
/// session.register_adapter(memory.clone(), None);
///
/// let app = session.create_logger("app");
/// app.set(&fields! { "version" => "1.2" });
/// let dialog = session.create_child("dialog", &app);
/// dialog.error("failed", &[]);
///
/// let (context, data) = memory.last().unwrap();
/// assert_eq!(context, "dialog");
/// assert_eq!(data, fields! { "level" => "error", "message" => "failed", "version" => "1.2" });
/// ```
#[derive(Clone)]
pub struct EventLogger {
    inner: Arc<LoggerInner>,
    session: Session,
}

impl EventLogger {
    /// Create a logger in the process-wide session
    pub fn new(name: impl Into<String>) -> Self {
        Session::global().create_logger(name)
    }

    /// Create a logger under `parent` in the process-wide session
    pub fn with_parent(name: impl Into<String>, parent: impl Into<ParentRef>) -> Self {
        Session::global().create_child(name, parent)
    }

    pub(crate) fn from_parts(inner: Arc<LoggerInner>, session: Session) -> Self {
        Self { inner, session }
    }

    pub(crate) fn init(&self) {
        self.binding();
    }

    fn binding(&self) -> Binding {
        match self.inner.ensure_ready(&self.session) {
            Some(binding) => binding,
            None => {
                self.session.report(format_args!(
                    "[LOGGER ERROR] Logger '{}' is its own ancestor; using a detached context",
                    self.inner.name
                ));
                Binding::detached(Arc::new(Context::new(self.inner.name.clone())))
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_ready(&self) -> bool {
        self.inner.binding().is_some()
    }

    /// Context name of the resolved parent
    ///
    /// `None` for the global logger, and for a lazy logger that has not been
    /// used yet. Never triggers initialization.
    pub fn parent_name(&self) -> Option<String> {
        self.inner
            .binding()
            .and_then(|binding| binding.parent().map(|parent| parent.name().to_string()))
    }

    /// Shared context of this logger
    ///
    /// Initializes a lazy logger, since the context does not exist before
    /// its parent is resolved.
    pub fn context(&self) -> Arc<Context> {
        self.binding().context
    }

    /// Replace this logger's context; its own parent chain applies from now on
    pub fn set_context(&self, context: Arc<Context>) {
        *self.inner.state.write() = InitState::Ready(Binding::adopt(context));
    }

    /// Effective view of the context; initializes a lazy logger like [`context`](Self::context)
    pub fn resolved(&self) -> ResolvedContext {
        self.context().get(None, None)
    }

    /// Patch the local context data; returns the resulting local mapping
    pub fn set(&self, payload: &Fields) -> Fields {
        self.context().update(payload)
    }

    pub fn dispatch_state(&self) -> DispatchState {
        self.inner.dispatch.lock().state
    }

    /// Log `message` with `args` appended, each separated by a space
    ///
    /// String arguments are appended as-is; anything else is rendered by the
    /// serializer.
    pub fn log(&self, message: &str, args: &[FieldValue]) {
        if let Some(external) = self.session.external_logger() {
            self.session.metrics().record_bypassed();
            self.guard_external(|| external.log(message, args));
            return;
        }
        self.log_event(message_event(message, args), None);
    }

    pub fn debug(&self, message: &str, args: &[FieldValue]) {
        self.log_event(message_event(message, args), Some(LogLevel::Debug));
    }

    pub fn info(&self, message: &str, args: &[FieldValue]) {
        self.log_event(message_event(message, args), Some(LogLevel::Info));
    }

    pub fn warn(&self, message: &str, args: &[FieldValue]) {
        self.log_event(message_event(message, args), Some(LogLevel::Warn));
    }

    pub fn error(&self, message: &str, args: &[FieldValue]) {
        self.log_event(message_event(message, args), Some(LogLevel::Error));
    }

    /// Merge `event` over the effective context and dispatch it
    ///
    /// An explicit `level` replaces any level carried by the event or
    /// inherited from the context. Never fails and never panics outward:
    /// adapter and filter failures are absorbed and counted.
    pub fn log_event(&self, event: Fields, level: Option<LogLevel>) {
        if let Some(external) = self.session.external_logger() {
            self.session.metrics().record_bypassed();
            self.guard_external(|| external.log_event(&event, level));
            return;
        }

        let mut event = event;
        if let Some(level) = level {
            event.insert(LEVEL_KEY.to_string(), FieldValue::from(level.tag()));
        }

        let ResolvedContext { name, mut data } = self.context().get(Some(&event), None);

        let config = self.session.config();
        if config.auto_timestamp {
            let ts = FieldValue::from(config.timestamp_format.now());
            data.insert(TIMESTAMP_KEY.to_string(), ts.clone());
            event.insert(TIMESTAMP_KEY.to_string(), ts);
        }

        let metrics = self.session.metrics();
        metrics.record_logged();

        let matched = self.session.adapters().matching(&name, &data);
        if matched.filter_failures > 0 {
            metrics.record_filter_failures(matched.filter_failures as u64);
            self.session.report(format_args!(
                "[LOGGER ERROR] {} adapter filter(s) panicked for '{}'; treated as non-match",
                matched.filter_failures, name
            ));
        }

        {
            let mut dispatch = self.inner.dispatch.lock();
            dispatch.pending.push(PendingEvent {
                context: name,
                data,
                event,
            });
            if dispatch.state == DispatchState::Dispatching {
                metrics.record_reentrant();
                return;
            }
            dispatch.state = DispatchState::Dispatching;
        }

        self.flush(&matched.adapters);
    }

    /// Deliver the whole pending buffer to each adapter in turn
    ///
    /// Every adapter keeps its own cursor into the buffer. Passes repeat
    /// until, under the dispatch lock, each cursor has reached the end; only
    /// then is the buffer cleared, so an entry appended by another thread
    /// mid-pass still reaches adapters that had already finished.
    fn flush(&self, adapters: &[Arc<dyn Adapter>]) {
        let mut cursors = vec![0usize; adapters.len()];
        loop {
            for (adapter, cursor) in adapters.iter().zip(cursors.iter_mut()) {
                while let Some(entry) = self.pending_at(*cursor) {
                    self.deliver(adapter.as_ref(), &entry);
                    *cursor += 1;
                }
            }

            let mut dispatch = self.inner.dispatch.lock();
            let len = dispatch.pending.len();
            if cursors.iter().all(|&cursor| cursor >= len) {
                dispatch.pending.clear();
                dispatch.state = DispatchState::Idle;
                return;
            }
        }
    }

    fn pending_at(&self, index: usize) -> Option<PendingEvent> {
        self.inner.dispatch.lock().pending.get(index).cloned()
    }

    fn deliver(&self, adapter: &dyn Adapter, entry: &PendingEvent) {
        let data = self.session.redact(&entry.data);
        let raw = RawEvent {
            context: entry.context.clone(),
            event: self.session.redact(&entry.event),
        };

        let metrics = self.session.metrics();
        match catch_unwind(AssertUnwindSafe(|| adapter.log(&entry.context, &data, &raw))) {
            Ok(Ok(())) => {
                metrics.record_delivered();
            }
            Ok(Err(e)) => {
                metrics.record_adapter_failure();
                self.session.report(format_args!(
                    "[LOGGER ERROR] Adapter '{}' failed: {}",
                    adapter.name(),
                    e
                ));
            }
            Err(panic_info) => {
                metrics.record_adapter_failure();
                self.session.report(format_args!(
                    "[LOGGER CRITICAL] Adapter '{}' panicked: {}. \
                     Other adapters continue to function.",
                    adapter.name(),
                    panic_message(panic_info.as_ref())
                ));
            }
        }
    }

    fn guard_external<F: FnOnce()>(&self, call: F) {
        if let Err(panic_info) = catch_unwind(AssertUnwindSafe(call)) {
            self.session.report(format_args!(
                "[LOGGER CRITICAL] External logger panicked: {}",
                panic_message(panic_info.as_ref())
            ));
        }
    }

    // Process-wide shortcuts on the default session

    pub fn register_adapter(adapter: Arc<dyn Adapter>, filter: Option<FilterFn>) {
        Session::global().register_adapter(adapter, filter);
    }

    pub fn reset() {
        Session::global().reset();
    }

    pub fn set_global(payload: &Fields) -> Fields {
        Session::global().set_global(payload)
    }

    pub fn set_global_config(key: &str, value: impl Into<FieldValue>) -> Result<()> {
        Session::global().set_global_config(key, value)
    }

    pub fn set_blacklist<I, S>(keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Session::global().set_blacklist(keys);
    }

    pub fn set_external_logger(logger: Arc<dyn ExternalLogger>) {
        Session::global().set_external_logger(logger);
    }
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("name", &self.inner.name)
            .field("ready", &self.is_ready())
            .field("dispatch", &self.dispatch_state())
            .finish()
    }
}

fn message_event(message: &str, args: &[FieldValue]) -> Fields {
    let mut text = message.to_string();
    for arg in args {
        text.push(' ');
        text.push_str(&arg.to_string());
    }
    let mut event = Fields::new();
    event.insert(MESSAGE_KEY.to_string(), FieldValue::from(text));
    event
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
