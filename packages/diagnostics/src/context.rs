//! The shared diagnostics context and the loggers it hands out.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::sink::{LogFacadeSink, LogSink};
use crate::Level;

struct State {
    error: bool,
    info: bool,
    debug: bool,
    silenced: HashSet<String>,
    known: BTreeSet<String>,
    sink: Arc<dyn LogSink>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            error: true,
            info: true,
            debug: false,
            silenced: HashSet::new(),
            known: BTreeSet::new(),
            sink: Arc::new(LogFacadeSink),
        }
    }
}

impl State {
    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Error => self.error,
            Level::Info => self.info,
            Level::Debug => self.debug,
        }
    }
}

/// Process-wide logging configuration.
///
/// Starts with `error` and `info` enabled, `debug` disabled, nothing
/// silenced, and records forwarded to the `log` facade.
pub struct Diagnostics {
    state: RwLock<State>,
}

impl Diagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(State::default()),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get a logger with the given name. The name becomes a known logger.
    pub fn logger(self: &Arc<Self>, name: &str) -> Logger {
        self.write().known.insert(name.to_string());
        Logger {
            name: Arc::from(name),
            diagnostics: Arc::clone(self),
        }
    }

    /// Set the most verbose level that is still emitted.
    ///
    /// `Debug` enables everything, `Info` drops debug records, `Error` keeps
    /// only errors.
    pub fn set_log_level(&self, level: Level) {
        let mut state = self.write();
        state.error = true;
        state.info = level >= Level::Info;
        state.debug = level >= Level::Debug;
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        self.read().enabled(level)
    }

    /// Route records to `sink` instead of the `log` facade.
    pub fn set_sink(&self, sink: impl LogSink + 'static) {
        self.write().sink = Arc::new(sink);
    }

    pub fn clear_sink(&self) {
        self.write().sink = Arc::new(LogFacadeSink);
    }

    pub fn silence<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        let mut state = self.write();
        for name in names {
            state.silenced.insert(name.to_string());
        }
    }

    pub fn unsilence<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        let mut state = self.write();
        for name in names {
            state.silenced.remove(name);
        }
    }

    /// Silence every logger handed out so far.
    pub fn silence_all(&self) {
        let mut state = self.write();
        let known: Vec<String> = state.known.iter().cloned().collect();
        state.silenced.extend(known);
    }

    pub fn unsilence_all(&self) {
        self.write().silenced.clear();
    }

    pub fn is_silenced(&self, name: &str) -> bool {
        self.read().silenced.contains(name)
    }

    /// Names of all loggers handed out so far, sorted.
    pub fn known_loggers(&self) -> Vec<String> {
        self.read().known.iter().cloned().collect()
    }

    /// Restore levels, silencing, and sink to their defaults.
    ///
    /// Known logger names are kept so `silence_all` still reaches loggers
    /// created before the reset.
    pub fn reset(&self) {
        let mut state = self.write();
        let known = std::mem::take(&mut state.known);
        *state = State {
            known,
            ..State::default()
        };
    }

    fn log(&self, name: &str, level: Level, message: fmt::Arguments<'_>) {
        let sink = {
            let state = self.read();
            if state.silenced.contains(name) || !state.enabled(level) {
                return;
            }
            Arc::clone(&state.sink)
        };
        sink.record(name, level, &message.to_string());
    }
}

/// A named handle onto a [`Diagnostics`] context.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    diagnostics: Arc<Diagnostics>,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, format_args!("{}", message));
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, format_args!("{}", message));
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, format_args!("{}", message));
    }

    pub fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        self.diagnostics.log(&self.name, level, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}
