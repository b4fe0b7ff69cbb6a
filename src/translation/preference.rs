use crate::i18n::Language;
use crate::profile::{ProfileStore, ProfileUpdate, UserProfile};
use crate::translation::Translator;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Apply the language saved in `user_id`'s profile, if there is a usable one.
///
/// Missing profiles, unknown codes and store failures leave the current
/// language in place. Returns the language active afterwards.
pub async fn restore_language(
    translator: &Translator,
    store: &dyn ProfileStore,
    user_id: &str,
) -> Language {
    match store.load_profile(user_id).await {
        Ok(Some(UserProfile {
            language: Some(code),
        })) => match Language::from_code(&code) {
            Ok(language) => {
                translator.set_language(language);
                info!("Restored language {} for user {}", language.code(), user_id);
            }
            Err(e) => warn!("Ignoring saved language for user {}: {}", user_id, e),
        },
        Ok(_) => debug!("No saved language for user {}", user_id),
        Err(e) => warn!("Failed to load language preference for user {}: {}", user_id, e),
    }

    translator.language()
}

/// Switch to `language` and persist it to `user_id`'s profile.
///
/// The switch takes effect before the write; a failed write is logged and
/// the new language stays active. Returns the cached translations for
/// `language`.
pub async fn choose_language(
    translator: &Translator,
    store: &dyn ProfileStore,
    user_id: &str,
    language: Language,
) -> HashMap<String, String> {
    let snapshot = translator.set_language(language);

    let update = ProfileUpdate {
        language: Some(language.code().to_string()),
    };
    if let Err(e) = store.merge_profile(user_id, update).await {
        warn!(
            "Failed to save language {} for user {}: {}",
            language.code(),
            user_id,
            e
        );
    }

    snapshot
}
