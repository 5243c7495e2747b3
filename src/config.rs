//! Config module: options that shape how a pattern is compiled into a walk list.

use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::version::{DefaultVersionCleaner, VersionCleaner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Widest `[1-n]` word range the static index stores by default.
pub const DEFAULT_INDEXED_WORD_LIMIT: usize = 3;

/// The plain-data part of the compile options, loadable alongside rule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileSettings {
    pub verbose: bool,
    /// Whether an external static index already verified the literal prefix of each pattern.
    /// When false, every step is compiled.
    pub static_index: bool,
    pub indexed_word_limit: usize,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            static_index: true,
            indexed_word_limit: DEFAULT_INDEXED_WORD_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    settings: CompileSettings,
    sink: Option<Arc<dyn DiagnosticSink>>,
    version_cleaner: Arc<dyn VersionCleaner>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from_settings(CompileSettings::default())
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: CompileSettings) -> Self {
        Self {
            settings,
            sink: None,
            version_cleaner: Arc::new(DefaultVersionCleaner),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.settings.verbose = verbose;
        self
    }

    pub fn static_index(mut self, static_index: bool) -> Self {
        self.settings.static_index = static_index;
        self
    }

    pub fn indexed_word_limit(mut self, limit: usize) -> Self {
        self.settings.indexed_word_limit = limit;
        self
    }

    /// Sends verbose output to `sink` instead of the `log` facade. Implies verbose.
    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.settings.verbose = true;
        self.sink = Some(sink);
        self
    }

    pub fn version_cleaner(mut self, cleaner: Arc<dyn VersionCleaner>) -> Self {
        self.version_cleaner = cleaner;
        self
    }

    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    /// The sink a verbose walk list reports to, `None` when not verbose.
    pub fn diagnostic_sink(&self) -> Option<Arc<dyn DiagnosticSink>> {
        if !self.settings.verbose {
            return None;
        }
        Some(match &self.sink {
            Some(sink) => Arc::clone(sink),
            None => Arc::new(LogSink),
        })
    }

    pub fn cleaner(&self) -> &Arc<dyn VersionCleaner> {
        &self.version_cleaner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use serde_json;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::new();
        assert_eq!(options.settings(), &CompileSettings::default());
        assert!(options.settings().static_index);
        assert!(options.diagnostic_sink().is_none());
    }

    #[test]
    fn test_verbose_uses_log_sink() {
        let options = CompileOptions::new().verbose(true);
        assert!(options.diagnostic_sink().is_some());
    }

    #[test]
    fn test_custom_sink_implies_verbose() {
        let options = CompileOptions::new().sink(Arc::new(MemorySink::new()));
        assert!(options.settings().verbose);
        assert!(options.diagnostic_sink().is_some());
    }

    #[test]
    fn test_settings_from_partial_json() {
        let settings: CompileSettings = serde_json::from_str(r#"{"static_index": false}"#).unwrap();
        assert!(!settings.static_index);
        assert!(!settings.verbose);
        assert_eq!(settings.indexed_word_limit, DEFAULT_INDEXED_WORD_LIMIT);
        let options = CompileOptions::from_settings(settings).indexed_word_limit(5);
        assert_eq!(options.settings().indexed_word_limit, 5);
    }
}
