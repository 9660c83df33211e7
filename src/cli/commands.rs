//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::info;

use crate::core::client::AsyncTranslator;
use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::models::LanguagePair;
use crate::core::probe::{HubProbe, PairStatus};

/// Commands for the opus-mt translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web translator
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Listen port
        #[arg(short, long, default_value_t = 7860)]
        port: u16,
    },

    /// Translate a single text
    Translate {
        /// Source language name (e.g. English)
        #[arg(short, long, default_value = "English")]
        from: String,

        /// Target language name (e.g. French)
        #[arg(short, long, default_value = "French")]
        to: String,

        /// Text to translate
        text: String,
    },

    /// List selectable languages
    Languages {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check which language pairs have a published model
    ///
    /// A pair counts as published only when its repo carries rust_model.ot
    /// weights. Repos with PyTorch or safetensors weights alone show as missing.
    Probe {
        /// Only probe pairs starting from this language name
        #[arg(short, long)]
        from: Option<String>,
    },
}

/// Handle server command
pub async fn handle_serve(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    let translator = AsyncTranslator::new(config)?;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Translator running on http://{}:{}", host, port);
    println!("📄 OpenAPI: http://{}:{}/api-docs/openapi.json", host, port);

    run_server(translator, host, port).await?;

    Ok(())
}

/// Handle one-shot translation command
pub async fn handle_translate(
    config: TranslatorConfig,
    from: String,
    to: String,
    text: String,
) -> anyhow::Result<()> {
    let translator = AsyncTranslator::new(config)?;

    match translator.translate_selection(&text, &from, &to).await {
        Ok(result) => {
            println!("{}", result.translation);
            Ok(())
        }
        Err(e @ TranslationError::ModelUnavailable { .. }) => {
            eprintln!("{}", e);
            anyhow::bail!("no model for {} -> {}", from, to)
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle languages listing command
pub fn handle_languages(config: &TranslatorConfig, json: bool) -> anyhow::Result<()> {
    let languages = &config.languages;

    if json {
        println!("{}", serde_json::to_string_pretty(languages)?);
        return Ok(());
    }

    for entry in languages.entries() {
        println!("{:<12} {}", entry.name, entry.code);
    }

    Ok(())
}

/// Handle hub probe command
pub async fn handle_probe(config: TranslatorConfig, from: Option<String>) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let languages = &config.languages;

    let pairs: Vec<LanguagePair> = match &from {
        Some(name) => {
            let source = languages.code_for(name)?;
            languages
                .entries()
                .iter()
                .filter(|e| e.code != source)
                .map(|e| LanguagePair::new(source, e.code.as_str()))
                .collect()
        }
        None => languages
            .ordered_pairs()
            .into_iter()
            .map(|(s, t)| LanguagePair::new(s, t))
            .collect(),
    };

    info!("Probing {} language pairs at {}", pairs.len(), config.hub_base());

    let probe = HubProbe::new(&config)?;

    let pb = ProgressBar::new(pairs.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
        .progress_chars("=>-"));

    let mut published = Vec::new();
    let mut missing = 0;
    let mut unknown = Vec::new();

    for pair in pairs {
        pb.set_message(pair.model_id());

        match probe.check(&pair).await {
            PairStatus::Published => published.push(pair),
            PairStatus::Missing => missing += 1,
            PairStatus::Unknown(reason) => unknown.push((pair, reason)),
        }

        pb.inc(1);
    }

    pb.finish_with_message("Completed");

    let name = |code: &str| languages.name_of(code).unwrap_or(code).to_string();

    println!("\n✅ Published models:");
    for pair in &published {
        println!(
            "   {} -> {}  ({})",
            name(&pair.source),
            name(&pair.target),
            pair.model_id()
        );
    }

    if !unknown.is_empty() {
        println!("\n⚠️  Could not check:");
        for (pair, reason) in &unknown {
            println!("   {}: {}", pair.model_id(), reason);
        }
    }

    println!("\n   Published: {}", published.len());
    println!("   Missing: {}", missing);
    println!("   Unknown: {}", unknown.len());
    println!("   Time: {:?}", start_time.elapsed());

    Ok(())
}
