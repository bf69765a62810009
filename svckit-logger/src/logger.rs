//! The logger facade.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use svckit_common::{Caller, Hook, HookRegistry, Level, LogRecord, LoggerConfig};

use crate::context::execution_context_tag;
use crate::format::{
    AlignedTextFormatter, DEFAULT_TIMESTAMP_FORMAT, Formatter, FormatterConfig, JsonFormatter,
};

type Output = Box<dyn Write + Send>;

thread_local! {
    static IN_HOOKS: Cell<bool> = const { Cell::new(false) };
}

/// Whether this thread is currently running a logger's hook chain.
///
/// Anything a hook logs while this is set must not be fed back into a
/// logger, or every record would spawn another one.
pub(crate) fn in_hook_chain() -> bool {
    IN_HOOKS.with(Cell::get)
}

struct HookChainGuard {
    previous: bool,
}

impl HookChainGuard {
    fn enter() -> Self {
        Self {
            previous: IN_HOOKS.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for HookChainGuard {
    fn drop(&mut self) {
        IN_HOOKS.with(|flag| flag.set(self.previous));
    }
}

/// Leveled logger with a pluggable formatter and a hook chain.
///
/// The minimum level and formatter are fixed at construction. Hooks may be
/// attached afterwards through [`HookRegistry`].
pub struct Logger {
    level: Level,
    formatter: Box<dyn Formatter>,
    capture_context: bool,
    hooks: RwLock<Vec<Arc<dyn Hook>>>,
    out: Mutex<Output>,
}

impl Logger {
    /// Build a logger for `config` writing to stderr.
    pub fn new(config: &LoggerConfig) -> Self {
        Self::with_writer(config, io::stderr())
    }

    /// Build a logger for `config` writing to `writer`.
    ///
    /// A level string that does not parse falls back to `info`.
    pub fn with_writer<W>(config: &LoggerConfig, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let formatter: Box<dyn Formatter> = if config.json_format {
            Box::new(JsonFormatter::new(DEFAULT_TIMESTAMP_FORMAT))
        } else {
            Box::new(AlignedTextFormatter::new(FormatterConfig {
                timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
                max_msg_length: config.max_msg_length,
                add_context_id: config.add_context_id,
            }))
        };

        let mut logger = Self::from_parts(config.min_level(), formatter, writer);
        logger.capture_context = config.add_context_id && !config.json_format;
        logger
    }

    /// Assemble a logger from an explicit level, formatter and writer.
    pub fn from_parts<W>(level: Level, formatter: Box<dyn Formatter>, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            level,
            formatter,
            capture_context: false,
            hooks: RwLock::new(Vec::new()),
            out: Mutex::new(Box::new(writer)),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level.is_enabled_for(self.level)
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.read().len()
    }

    /// Execution-context tag for a record built on this thread, if enabled.
    pub(crate) fn context_tag(&self) -> Option<String> {
        self.capture_context.then(execution_context_tag)
    }

    /// Format `record`, fire matching hooks and write it out.
    ///
    /// Records below the minimum level are dropped.
    pub fn log_record(&self, record: LogRecord) {
        if !self.is_enabled(record.level()) {
            return;
        }
        self.fire_hooks(&record);
        self.write(&record);
    }

    /// Like [`log_record`](Self::log_record) but skips the hook chain.
    pub fn write_record(&self, record: LogRecord) {
        if !self.is_enabled(record.level()) {
            return;
        }
        self.write(&record);
    }

    fn fire_hooks(&self, record: &LogRecord) {
        let hooks = self.hooks.read().clone();
        let _guard = HookChainGuard::enter();
        for hook in hooks {
            if !hook.levels().contains(&record.level()) {
                continue;
            }
            if let Err(e) = hook.fire(record) {
                let _ = writeln!(io::stderr(), "Failed to fire hook: {e}");
            }
        }
    }

    fn write(&self, record: &LogRecord) {
        let bytes = self.formatter.format(record);
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(&bytes).and_then(|_| out.flush()) {
            let _ = writeln!(io::stderr(), "Failed to write to log: {e}");
        }
    }

    /// Start an entry carrying one attribute.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Entry<'_> {
        Entry::new(self).with_field(key, value)
    }

    /// Start an entry carrying several attributes.
    pub fn with_fields<I, K>(&self, fields: I) -> Entry<'_>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Entry::new(self).with_fields(fields)
    }

    #[track_caller]
    pub fn log(&self, level: Level, msg: impl Into<String>) {
        Entry::new(self).log(level, msg)
    }

    #[track_caller]
    pub fn trace(&self, msg: impl Into<String>) {
        self.log(Level::Trace, msg)
    }

    #[track_caller]
    pub fn debug(&self, msg: impl Into<String>) {
        self.log(Level::Debug, msg)
    }

    #[track_caller]
    pub fn info(&self, msg: impl Into<String>) {
        self.log(Level::Info, msg)
    }

    #[track_caller]
    pub fn warn(&self, msg: impl Into<String>) {
        self.log(Level::Warn, msg)
    }

    #[track_caller]
    pub fn error(&self, msg: impl Into<String>) {
        self.log(Level::Error, msg)
    }

    /// Log at fatal level. Does not exit the process.
    #[track_caller]
    pub fn fatal(&self, msg: impl Into<String>) {
        self.log(Level::Fatal, msg)
    }

    /// Log at panic level. Does not unwind.
    #[track_caller]
    pub fn panic(&self, msg: impl Into<String>) {
        self.log(Level::Panic, msg)
    }
}

impl HookRegistry for Logger {
    fn add_hook(&self, hook: Arc<dyn Hook>) {
        self.hooks.write().push(hook);
    }

    fn remove_hook(&self, hook: &Arc<dyn Hook>) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|h| !Arc::ptr_eq(h, hook));
        hooks.len() != before
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("capture_context", &self.capture_context)
            .field("hooks", &self.hook_count())
            .finish_non_exhaustive()
    }
}

/// A pending log call with attached attributes.
#[must_use = "an entry does nothing until a level method is called"]
pub struct Entry<'a> {
    logger: &'a Logger,
    fields: BTreeMap<String, Value>,
}

impl<'a> Entry<'a> {
    fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    #[track_caller]
    pub fn log(self, level: Level, msg: impl Into<String>) {
        if !self.logger.is_enabled(level) {
            return;
        }

        let mut builder = LogRecord::builder(level, msg)
            .caller(Caller::from_location(Location::caller()))
            .fields(self.fields);
        if let Some(tag) = self.logger.context_tag() {
            builder = builder.context(tag);
        }
        self.logger.log_record(builder.build());
    }

    #[track_caller]
    pub fn trace(self, msg: impl Into<String>) {
        self.log(Level::Trace, msg)
    }

    #[track_caller]
    pub fn debug(self, msg: impl Into<String>) {
        self.log(Level::Debug, msg)
    }

    #[track_caller]
    pub fn info(self, msg: impl Into<String>) {
        self.log(Level::Info, msg)
    }

    #[track_caller]
    pub fn warn(self, msg: impl Into<String>) {
        self.log(Level::Warn, msg)
    }

    #[track_caller]
    pub fn error(self, msg: impl Into<String>) {
        self.log(Level::Error, msg)
    }

    #[track_caller]
    pub fn fatal(self, msg: impl Into<String>) {
        self.log(Level::Fatal, msg)
    }

    #[track_caller]
    pub fn panic(self, msg: impl Into<String>) {
        self.log(Level::Panic, msg)
    }
}

static GLOBAL_LOGGER: LazyLock<RwLock<Arc<Logger>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Logger::new(&LoggerConfig::default()))));

/// The process-wide logger.
///
/// Before [`init`](crate::init) this is an info-level text logger on stderr.
pub fn logger() -> Arc<Logger> {
    GLOBAL_LOGGER.read().clone()
}

pub(crate) fn set_global(logger: Arc<Logger>) {
    *GLOBAL_LOGGER.write() = logger;
}

/// Cloneable in-memory sink, handy for capturing output in tests.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit_common::HookError;

    fn text_logger(level: &str) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let config = LoggerConfig {
            level: level.to_string(),
            ..Default::default()
        };
        (Logger::with_writer(&config, buffer.clone()), buffer)
    }

    struct RecordingHook {
        levels: Vec<Level>,
        seen: Mutex<Vec<LogRecord>>,
        fail: bool,
    }

    impl RecordingHook {
        fn new(levels: Vec<Level>) -> Self {
            Self {
                levels,
                seen: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    impl Hook for RecordingHook {
        fn levels(&self) -> &[Level] {
            &self.levels
        }

        fn fire(&self, record: &LogRecord) -> Result<(), HookError> {
            self.seen.lock().push(record.clone());
            if self.fail {
                Err(HookError("exporter offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_level_filtering() {
        let (logger, buffer) = text_logger("info");

        logger.debug("hidden");
        assert!(buffer.contents().is_empty());

        logger.info("hello");
        assert!(buffer.contents().ends_with(":: hello\n"));
    }

    #[test]
    fn test_malformed_level_falls_back_to_info() {
        let (logger, buffer) = text_logger("very-loud");
        assert_eq!(logger.level(), Level::Info);

        logger.debug("nope");
        logger.info("yes");
        assert_eq!(buffer.contents().lines().count(), 1);
    }

    #[test]
    fn test_caller_is_this_file() {
        let (logger, buffer) = text_logger("info");
        logger.info("where am I");
        assert!(buffer.contents().contains("logger.rs:"));
    }

    #[test]
    fn test_entry_fields_reach_hooks() {
        let (logger, _buffer) = text_logger("debug");
        let hook = Arc::new(RecordingHook::new(Level::ALL.to_vec()));
        logger.add_hook(hook.clone());

        logger
            .with_field("user", "ada")
            .with_field("attempt", 2)
            .warn("login failed");

        let seen = hook.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level(), Level::Warn);
        assert_eq!(seen[0].message(), "login failed");
        assert_eq!(seen[0].fields()["user"], "ada");
        assert_eq!(seen[0].fields()["attempt"], 2);
        assert!(seen[0].caller().is_some());
    }

    #[test]
    fn test_hook_level_set_respected() {
        let (logger, _buffer) = text_logger("trace");
        let hook = Arc::new(RecordingHook::new(vec![Level::Error, Level::Fatal]));
        logger.add_hook(hook.clone());

        logger.info("skip");
        logger.error("keep");
        logger.fatal("keep too");

        let seen = hook.seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|r| r.level() >= Level::Error));
    }

    #[test]
    fn test_hooks_do_not_see_filtered_records() {
        let (logger, _buffer) = text_logger("warn");
        let hook = Arc::new(RecordingHook::new(Level::ALL.to_vec()));
        logger.add_hook(hook.clone());

        logger.info("below threshold");

        assert!(hook.seen.lock().is_empty());
    }

    #[test]
    fn test_failing_hook_does_not_block_output() {
        let (logger, buffer) = text_logger("info");
        let mut hook = RecordingHook::new(Level::ALL.to_vec());
        hook.fail = true;
        logger.add_hook(Arc::new(hook));

        logger.error("still written");

        assert!(buffer.contents().contains(":: still written"));
    }

    struct ChainFlagHook {
        inside: Mutex<Vec<bool>>,
    }

    impl Hook for ChainFlagHook {
        fn fire(&self, _record: &LogRecord) -> Result<(), HookError> {
            self.inside.lock().push(in_hook_chain());
            Ok(())
        }
    }

    #[test]
    fn test_hook_chain_flag_scoped_to_hooks() {
        let (logger, _buffer) = text_logger("info");
        let hook = Arc::new(ChainFlagHook {
            inside: Mutex::new(Vec::new()),
        });
        logger.add_hook(hook.clone());

        assert!(!in_hook_chain());
        logger.info("one");
        logger.info("two");
        assert!(!in_hook_chain());

        assert_eq!(*hook.inside.lock(), vec![true, true]);
    }

    #[test]
    fn test_remove_hook() {
        let (logger, _buffer) = text_logger("info");
        let hook: Arc<dyn Hook> = Arc::new(RecordingHook::new(Level::ALL.to_vec()));
        logger.add_hook(hook.clone());
        assert_eq!(logger.hook_count(), 1);

        assert!(logger.remove_hook(&hook));
        assert!(!logger.remove_hook(&hook));
        assert_eq!(logger.hook_count(), 0);
    }

    #[test]
    fn test_write_record_skips_hooks() {
        let (logger, buffer) = text_logger("info");
        let hook = Arc::new(RecordingHook::new(Level::ALL.to_vec()));
        logger.add_hook(hook.clone());

        logger.write_record(LogRecord::builder(Level::Info, "local only").build());

        assert!(hook.seen.lock().is_empty());
        assert!(buffer.contents().contains("local only"));
    }

    #[test]
    fn test_context_tag_captured_when_enabled() {
        let buffer = SharedBuffer::new();
        let config = LoggerConfig {
            add_context_id: true,
            ..Default::default()
        };
        let logger = Logger::with_writer(&config, buffer.clone());

        logger.info("tagged");

        assert!(buffer.contents().contains(&execution_context_tag()));
    }

    #[test]
    fn test_fatal_and_panic_do_not_terminate() {
        let (logger, buffer) = text_logger("info");
        logger.fatal("f");
        logger.panic("p");
        let out = buffer.contents();
        assert!(out.contains("FATAL"));
        assert!(out.contains("PANIC"));
    }

    #[test]
    fn test_global_logger_available_before_init() {
        let logger = logger();
        assert!(logger.is_enabled(Level::Info));
    }
}
