//! The translator: lookup-or-enqueue, debounced batching and language switching.
//!
//! One `Translator` is built at application start and cloned into every place
//! that renders text. Lookups never wait on the network: a string that is not
//! cached yet comes back untranslated and is queued, and a background task
//! sends the queue as one batch once lookups have been quiet for the debounce
//! window. Consumers re-render when the cache version published on
//! `subscribe()` changes.

use crate::error::TranslateError;
use crate::i18n::{interpolate, Language, Params, TranslationMetrics, TranslationValidator};
use crate::translation::backend::{check_alignment, BatchTranslator};
use crate::translation::cache::TranslationCache;
use crate::translation::queue::PendingQueue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

/// Quiet period after the last enqueue before a batch is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Settings for a `Translator`.
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Trailing-edge debounce window
    pub debounce: Duration,
    /// Upper bound on a single batch call; `None` waits indefinitely
    pub batch_timeout: Option<Duration>,
    /// Language active when the translator starts
    pub initial_language: Language,
}

impl TranslatorOptions {
    pub fn new() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            batch_timeout: None,
            initial_language: Language::canonical(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = Some(timeout);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.initial_language = language;
        self
    }
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Value published to consumers whenever rendered text may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheVersion {
    pub language: Language,
    pub version: u64,
}

/// Result of one `Translator::flush` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending
    Idle,
    /// A batch for the current language is already in flight
    Busy,
    /// The batch succeeded; `count` entries were added to the cache
    Translated { count: usize, follow_up: bool },
    /// The batch failed and was dropped
    Failed { follow_up: bool },
}

impl FlushOutcome {
    /// Whether more strings queued up while the batch was in flight.
    pub fn follow_up(&self) -> bool {
        match self {
            FlushOutcome::Translated { follow_up, .. } | FlushOutcome::Failed { follow_up } => {
                *follow_up
            }
            FlushOutcome::Idle | FlushOutcome::Busy => false,
        }
    }
}

struct State {
    language: Language,
    /// Incremented on every language switch
    epoch: u64,
    cache: TranslationCache,
    pending: PendingQueue,
    in_flight: bool,
}

struct Inner {
    state: Mutex<State>,
    backend: Arc<dyn BatchTranslator>,
    batch_timeout: Option<Duration>,
    wake: Arc<Notify>,
    /// Signalled whenever a batch resolves, fails or is abandoned
    settled: Notify,
    version: watch::Sender<CacheVersion>,
    metrics: TranslationMetrics,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Lets the debouncer observe that every handle is gone.
        self.wake.notify_one();
    }
}

/// Cloneable handle onto the translation service.
#[derive(Clone)]
pub struct Translator {
    inner: Arc<Inner>,
}

impl Translator {
    /// Create the service and start its debounce task.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn new(backend: Arc<dyn BatchTranslator>, options: TranslatorOptions) -> Self {
        let wake = Arc::new(Notify::new());
        let (version, _) = watch::channel(CacheVersion {
            language: options.initial_language,
            version: 0,
        });

        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                language: options.initial_language,
                epoch: 0,
                cache: TranslationCache::new(),
                pending: PendingQueue::new(),
                in_flight: false,
            }),
            backend,
            batch_timeout: options.batch_timeout,
            wake: Arc::clone(&wake),
            settled: Notify::new(),
            version,
            metrics: TranslationMetrics::new(),
        });

        tokio::spawn(run_debouncer(
            Arc::downgrade(&inner),
            wake,
            options.debounce,
        ));

        Self { inner }
    }

    /// Translate `text` into the active language without waiting.
    pub fn t(&self, text: &str) -> String {
        self.t_with(text, &[])
    }

    /// Translate a `{{placeholder}}` template and substitute `params`.
    ///
    /// The template itself is the cache key, so the same translation serves
    /// every set of values. Returns the original text when no translation is
    /// cached yet, after queueing it for the next batch.
    pub fn t_with(&self, text: &str, params: &Params<'_>) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut state = self.inner.lock_state();
        let language = state.language;

        if language.is_canonical() {
            return interpolate(text, params).into_owned();
        }

        if let Some(translated) = state.cache.get(language, text) {
            self.inner.metrics.record_cache_hit();
            return interpolate(translated, params).into_owned();
        }

        self.inner.metrics.record_cache_miss();
        let queued = state.pending.push(text);
        drop(state);

        if queued {
            self.inner.wake.notify_one();
        }
        interpolate(text, params).into_owned()
    }

    /// Send everything pending as one batch for the active language.
    ///
    /// The debounce task calls this; it is public so callers can force a
    /// flush (for example before taking a snapshot).
    pub async fn flush(&self) -> FlushOutcome {
        let (texts, language, epoch) = {
            let mut state = self.inner.lock_state();
            if state.pending.is_empty() {
                return FlushOutcome::Idle;
            }
            if state.in_flight {
                return FlushOutcome::Busy;
            }

            let language = state.language;
            let drained = state.pending.drain();
            let texts: Vec<String> = drained
                .into_iter()
                .filter(|text| !state.cache.contains(language, text))
                .collect();
            if texts.is_empty() {
                return FlushOutcome::Idle;
            }

            state.in_flight = true;
            (texts, language, state.epoch)
        };
        let mut batch = InFlightBatch {
            inner: &self.inner,
            epoch,
            resolved: false,
        };

        self.inner.metrics.record_batch();
        debug!(
            "Sending translation batch of {} strings into {}",
            texts.len(),
            language.code()
        );

        let result = self.call_backend(&texts, language).await;

        let mut state = self.inner.lock_state();
        let added = match result {
            Ok(translations) => {
                log_validation(&texts, &translations, language);
                let added = state
                    .cache
                    .fill(language, texts.into_iter().zip(translations));
                self.inner.metrics.record_translated(added);
                self.inner.version.send_modify(|v| v.version += 1);
                Some(added)
            }
            Err(e) => {
                self.inner.metrics.record_batch_failure();
                warn!(
                    "Translation batch of {} strings into {} failed, keeping original text: {}",
                    texts.len(),
                    language.code(),
                    e
                );
                None
            }
        };

        // A switch while this batch was out already reset the flag for the
        // new language; leave that one alone.
        if state.epoch == epoch {
            state.in_flight = false;
        }
        let follow_up = !state.pending.is_empty() && !state.in_flight;
        drop(state);
        batch.resolved = true;
        self.inner.settled.notify_waiters();

        match added {
            Some(count) => FlushOutcome::Translated { count, follow_up },
            None => FlushOutcome::Failed { follow_up },
        }
    }

    async fn call_backend(
        &self,
        texts: &[String],
        language: Language,
    ) -> Result<Vec<String>, TranslateError> {
        let call = self.inner.backend.translate_batch(texts, language);
        let translations = match self.inner.batch_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| TranslateError::Timeout(limit))??,
            None => call.await?,
        };
        check_alignment(texts.len(), &translations)?;
        Ok(translations)
    }

    /// Make `language` the active language.
    ///
    /// Pending strings of the previous language are discarded and the
    /// in-flight flag is reset; a batch already sent for the previous language
    /// still lands in that language's bucket. Returns the new language's
    /// cached translations so callers can render them immediately.
    pub fn set_language(&self, language: Language) -> HashMap<String, String> {
        let mut state = self.inner.lock_state();
        if state.language == language {
            return state.cache.bucket(language);
        }

        let previous = state.language;
        state.language = language;
        state.epoch += 1;
        state.pending.clear();
        state.in_flight = false;
        let snapshot = state.cache.bucket(language);

        self.inner.version.send_modify(|v| {
            v.language = language;
            v.version += 1;
        });
        drop(state);

        info!(
            "Switched UI language from {} to {} ({} cached strings)",
            previous.code(),
            language.code(),
            snapshot.len()
        );
        snapshot
    }

    pub fn language(&self) -> Language {
        self.inner.lock_state().language
    }

    /// Cached translations for the active language.
    pub fn snapshot(&self) -> HashMap<String, String> {
        let state = self.inner.lock_state();
        state.cache.bucket(state.language)
    }

    /// Cached translation of `text` in `language`, if any.
    pub fn cached(&self, language: Language, text: &str) -> Option<String> {
        self.inner
            .lock_state()
            .cache
            .get(language, text)
            .map(str::to_string)
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.lock_state().in_flight
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    /// Receiver that changes whenever rendered text may differ.
    pub fn subscribe(&self) -> watch::Receiver<CacheVersion> {
        self.inner.version.subscribe()
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.inner.metrics
    }
}

fn log_validation(texts: &[String], translations: &[String], language: Language) {
    for (original, translated) in texts.iter().zip(translations) {
        let report = TranslationValidator::validate(original, translated);
        if report.has_errors() {
            warn!(
                "Translation into {} of {:?} has errors: {:?}",
                language.code(),
                original,
                report.errors
            );
        }
        if report.has_warnings() {
            debug!(
                "Translation into {} of {:?} has warnings: {:?}",
                language.code(),
                original,
                report.warnings
            );
        }
    }
}

/// Releases the in-flight flag of a flush that is dropped before its batch
/// resolves, so a cancelled caller cannot block every later batch.
struct InFlightBatch<'a> {
    inner: &'a Inner,
    epoch: u64,
    resolved: bool,
}

impl Drop for InFlightBatch<'_> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        let mut state = self.inner.lock_state();
        if state.epoch == self.epoch {
            state.in_flight = false;
        }
        drop(state);
        debug!("Translation batch abandoned before it resolved");
        self.inner.settled.notify_waiters();
    }
}

/// Trailing-edge debouncer.
///
/// Waits for a first enqueue, re-arms on every further one, and flushes once
/// `debounce` passes without any. Follow-up batches for strings queued while
/// a batch was in flight go out immediately, including when that batch was
/// sent by a forced `flush()`. Exits once every `Translator` handle has been
/// dropped.
async fn run_debouncer(inner: Weak<Inner>, wake: Arc<Notify>, debounce: Duration) {
    loop {
        wake.notified().await;

        loop {
            tokio::select! {
                _ = wake.notified() => continue,
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let Some(inner) = inner.upgrade() else {
            break;
        };
        let translator = Translator { inner };
        loop {
            // Registered before flushing so a batch resolving in between is not missed
            let settled = translator.inner.settled.notified();
            match translator.flush().await {
                FlushOutcome::Busy => settled.await,
                outcome if outcome.follow_up() => {}
                _ => break,
            }
        }
    }
    debug!("Translation debouncer stopped");
}
