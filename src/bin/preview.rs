//! Preview binary - renders the Sahayak UI strings in one language
//!
//! Usage:
//!   cargo run --bin preview -- hi            # Translate through a running service
//!   cargo run --bin preview -- mr --direct   # Call OpenAI directly
//!
//! Required environment variables:
//! - OPENAI_API_KEY (only with --direct, which reads the full server configuration)
//!
//! Optional:
//! - TRANSLATE_SERVICE_URL (defaults to http://localhost:8080)
//! - API_KEY (sent as x-api-key to the service)
//! - TRANSLATE_DEBOUNCE_MS (defaults to 100)
//! - TRANSLATE_TIMEOUT_SECS (defaults to 30)

use anyhow::{bail, Context, Result};
use sahayak::config::{ClientConfig, Config};
use sahayak::i18n::Language;
use sahayak::openai::{OpenAiBatchTranslator, OpenAiClient};
use sahayak::translation::{BatchTranslator, FlushOutcome, HttpBatchTranslator, Translator};
use std::sync::Arc;
use tracing::info;

const UI_STRINGS: &[&str] = &[
    "Dashboard",
    "Stories",
    "Worksheets",
    "Visual Aids",
    "Quizzes",
    "Reading Assessment",
    "Settings",
    "Sign out",
];

const WELCOME: &str = "Welcome back, {{name}}";

fn build_backend(client_config: &ClientConfig, direct: bool) -> Result<Arc<dyn BatchTranslator>> {
    if direct {
        let config = Config::from_env().context("--direct needs the server configuration")?;
        let openai = OpenAiClient::from_config(&config)?;
        info!("Translating directly with {}", config.openai_model);
        Ok(Arc::new(OpenAiBatchTranslator::new(
            openai,
            config.translate_max_batch,
        )))
    } else {
        let http = HttpBatchTranslator::new(
            &client_config.service_url,
            client_config.api_key.clone(),
            client_config.timeout(),
        )?;
        info!("Translating through {}", http.endpoint());
        Ok(Arc::new(http))
    }
}

fn render(translator: &Translator) {
    for text in UI_STRINGS {
        println!("  {:<20} {}", text, translator.t(text));
    }
    println!(
        "  {:<20} {}",
        WELCOME,
        translator.t_with(WELCOME, &[("name", &"Anjali")])
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sahayak=info".parse()?)
                .add_directive("preview=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let direct = args.iter().any(|a| a == "--direct");
    let code = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or("hi");
    let language = Language::from_code(code)?;

    let config = ClientConfig::from_env();
    let backend = build_backend(&config, direct)?;

    let translator = Translator::new(backend, config.translator_options(language));
    let mut updates = translator.subscribe();

    println!("\n{} ({}), first render:", language.name(), language.native_name());
    render(&translator);

    if !language.is_canonical() {
        // Send the strings queued by the first render without waiting out the debounce
        match translator.flush().await {
            FlushOutcome::Translated { count, .. } => info!("Cached {} translations", count),
            FlushOutcome::Failed { .. } => bail!("Translation batch failed; see the log above"),
            FlushOutcome::Idle | FlushOutcome::Busy => {
                let wait = config.debounce() + config.timeout();
                match tokio::time::timeout(wait, updates.changed()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => bail!("Translator stopped before publishing translations"),
                    Err(_) => bail!("No translations arrived within {:?}", wait),
                }
            }
        }

        println!("\nAfter translation (version {}):", updates.borrow().version);
        render(&translator);
    }

    let report = translator.metrics().report();
    println!("\n{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
