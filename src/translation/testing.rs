//! In-process `BatchTranslator` for unit tests.

use crate::error::TranslateError;
use crate::i18n::Language;
use crate::translation::BatchTranslator;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Deterministic translation the fake backend produces.
pub(crate) fn fake_translation(text: &str, language: Language) -> String {
    format!("[{}] {}", language.code(), text)
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    calls: Mutex<Vec<(Vec<String>, Language)>>,
    fail: AtomicBool,
    truncate: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every following call fail with a 500.
    pub(crate) fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make every following call return one translation too few.
    pub(crate) fn set_truncating(&self, truncate: bool) {
        self.truncate.store(truncate, Ordering::SeqCst);
    }

    /// Hold the next call until the returned `Notify` is signalled.
    pub(crate) fn hold_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn calls(&self) -> Vec<(Vec<String>, Language)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BatchTranslator for FakeBackend {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: Language,
    ) -> Result<Vec<String>, TranslateError> {
        self.calls.lock().unwrap().push((texts.to_vec(), target));

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(TranslateError::Api {
                status: 500,
                body: "backend unavailable".to_string(),
            });
        }

        let mut translations: Vec<String> = texts
            .iter()
            .map(|text| fake_translation(text, target))
            .collect();
        if self.truncate.load(Ordering::SeqCst) {
            translations.pop();
        }
        Ok(translations)
    }
}

/// Yield until `backend` has seen `count` calls, without advancing time.
pub(crate) async fn wait_for_calls(backend: &FakeBackend, count: usize) {
    for _ in 0..1000 {
        if backend.call_count() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!(
        "backend saw {} calls, expected {}",
        backend.call_count(),
        count
    );
}
