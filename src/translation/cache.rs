use crate::i18n::Language;
use std::collections::HashMap;

/// Per-language map from original text to translated text.
///
/// Entries are only ever added: a bucket lives as long as the cache and a
/// filled key keeps its first value, so overlapping batches for the same
/// language can only add redundant work, never change what is shown.
#[derive(Debug, Default, Clone)]
pub struct TranslationCache {
    buckets: HashMap<&'static str, HashMap<String, String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the translation of `original` in `language`'s bucket.
    pub fn get(&self, language: Language, original: &str) -> Option<&str> {
        self.buckets
            .get(language.code())
            .and_then(|bucket| bucket.get(original))
            .map(String::as_str)
    }

    pub fn contains(&self, language: Language, original: &str) -> bool {
        self.get(language, original).is_some()
    }

    /// Write translated pairs into `language`'s bucket.
    ///
    /// Keys that are already present are left untouched. Returns the number
    /// of entries that were newly added.
    pub fn fill<I>(&mut self, language: Language, pairs: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let bucket = self.buckets.entry(language.code()).or_default();
        let mut added = 0;
        for (original, translated) in pairs {
            if let std::collections::hash_map::Entry::Vacant(slot) = bucket.entry(original) {
                slot.insert(translated);
                added += 1;
            }
        }
        added
    }

    /// Snapshot of one language's bucket (empty if nothing was cached yet).
    pub fn bucket(&self, language: Language) -> HashMap<String, String> {
        self.buckets
            .get(language.code())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of cached entries for `language`.
    pub fn len(&self, language: Language) -> usize {
        self.buckets
            .get(language.code())
            .map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(o, t)| (o.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_cache() {
        let cache = TranslationCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get(Language::HINDI, "Save"), None);
        assert!(cache.bucket(Language::HINDI).is_empty());
        assert_eq!(cache.len(Language::HINDI), 0);
    }

    #[test]
    fn test_fill_and_get() {
        let mut cache = TranslationCache::new();
        let added = cache.fill(
            Language::HINDI,
            pairs(&[("Save", "सहेजें"), ("Cancel", "रद्द करें")]),
        );

        assert_eq!(added, 2);
        assert_eq!(cache.get(Language::HINDI, "Save"), Some("सहेजें"));
        assert!(cache.contains(Language::HINDI, "Cancel"));
        assert_eq!(cache.len(Language::HINDI), 2);
    }

    #[test]
    fn test_fill_never_overwrites() {
        let mut cache = TranslationCache::new();
        cache.fill(Language::HINDI, pairs(&[("Save", "सहेजें")]));
        let added = cache.fill(Language::HINDI, pairs(&[("Save", "बचाएं"), ("Quiz", "प्रश्नोत्तरी")]));

        assert_eq!(added, 1);
        assert_eq!(cache.get(Language::HINDI, "Save"), Some("सहेजें"));
    }

    #[test]
    fn test_buckets_are_per_language() {
        let mut cache = TranslationCache::new();
        cache.fill(Language::HINDI, pairs(&[("Save", "सहेजें")]));
        cache.fill(Language::MARATHI, pairs(&[("Save", "जतन करा")]));

        assert_eq!(cache.get(Language::HINDI, "Save"), Some("सहेजें"));
        assert_eq!(cache.get(Language::MARATHI, "Save"), Some("जतन करा"));
        assert_eq!(cache.bucket(Language::MARATHI).len(), 1);
    }

    #[test]
    fn test_bucket_is_a_snapshot() {
        let mut cache = TranslationCache::new();
        cache.fill(Language::HINDI, pairs(&[("Save", "सहेजें")]));
        let snapshot = cache.bucket(Language::HINDI);
        cache.fill(Language::HINDI, pairs(&[("Quiz", "प्रश्नोत्तरी")]));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(cache.len(Language::HINDI), 2);
    }
}
