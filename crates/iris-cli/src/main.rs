//! iris - voice-enabled chat assistant for the terminal

mod commands;
mod config;
mod console;
mod ui;
mod utils;

use clap::Parser;
use iris_agent::speech::VoiceSettings;
use iris_agent::{
    CommandSynthesizer, CpalMicrophone, LexiconAnalyzer, ProviderResponder, RecordingRecognizer,
    Sensitivity, SilentSynthesizer, SpeechSynthesizer, SynthCommand, TurnConfig, TurnProcessor,
    VoiceGender,
};
use iris_ai::providers::openai::OpenAIProvider;
use iris_ai::{Model, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// iris - chat with an assistant that listens and talks back
#[derive(Parser, Debug)]
#[command(name = "iris")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: llama3-groq-70b-8192-tool-use-preview)
    #[arg(short, long)]
    model: Option<String>,

    /// Provider (groq, openai, openrouter, ollama)
    #[arg(short, long)]
    provider: Option<String>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Don't speak replies
    #[arg(long)]
    mute: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

/// Logs go to stderr. The terminal UI shares it, so there they need --verbose.
fn init_tracing(verbose: bool, tui: bool) {
    let filter = if verbose {
        EnvFilter::new("iris=debug,iris_agent=debug,iris_ai=debug")
    } else if tui {
        return;
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn voice_settings(cfg: &config::SpeechSettings) -> VoiceSettings {
    let mut settings = VoiceSettings::default();
    match cfg.voice.parse::<VoiceGender>() {
        Ok(gender) => settings.gender = gender,
        Err(e) => tracing::warn!("{}; using {}", e, settings.gender),
    }
    if let Err(e) = settings.set_rate(cfg.rate) {
        tracing::warn!("{}; using {} wpm", e, settings.rate);
    }
    if let Err(e) = settings.set_volume(cfg.volume) {
        tracing::warn!("{}; using volume {}", e, settings.volume);
    }
    settings
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let use_tui = args.command.is_none() && !args.no_tui && cfg.tui.unwrap_or(true);
    init_tracing(args.verbose, use_tui);

    // Merge config with CLI args (CLI takes precedence)
    let provider_id = args
        .provider
        .or(cfg.provider.clone())
        .unwrap_or_else(|| config::DEFAULT_PROVIDER.to_string());
    let provider = Provider::from_id(&provider_id);
    let model_id = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| config::DEFAULT_MODEL.to_string());

    let mut model = Model::new(provider, model_id);
    if let Some(ref base_url) = cfg.base_url {
        model = model.with_base_url(base_url.as_str());
    }
    if model.base_url.is_empty() {
        anyhow::bail!(
            "Unknown provider '{}': set base_url in {}",
            provider_id,
            config::Config::config_path().display()
        );
    }

    let Some(api_key) = cfg.api_key(provider) else {
        let api_key_var = provider.api_key_env_var().unwrap_or("GROQ_API_KEY");
        eprintln!("Error: No API key found for {}", provider.name());
        eprintln!();
        eprintln!("Set your API key with: export {}=your-key", api_key_var);
        eprintln!("Or add it to config file: iris --init-config");
        std::process::exit(1);
    };

    let client = OpenAIProvider::new(api_key);
    let transcriber = Arc::new(client.transcriber(
        model.base_url.clone(),
        cfg.listen.transcription_model.clone(),
    ));
    let responder = Arc::new(ProviderResponder::new(Arc::new(client), model.clone()));
    let recognizer = Arc::new(
        RecordingRecognizer::new(CpalMicrophone, transcriber)
            .with_sensitivity(Sensitivity::from_level(cfg.listen.vad_mode)),
    );

    let settings = voice_settings(&cfg.speech);
    let synthesizer: Arc<dyn SpeechSynthesizer> = if args.mute || !cfg.speech.enabled {
        let silent = SilentSynthesizer::new();
        silent.set_voice(settings.gender)?;
        Arc::new(silent)
    } else {
        Arc::new(CommandSynthesizer::with_settings(
            SynthCommand::from_program(&cfg.speech.command),
            settings,
        ))
    };

    let mut turn_config = TurnConfig {
        listen_timeout: Duration::from_secs(cfg.listen.timeout_secs),
        phrase_limit: Duration::from_secs(cfg.listen.phrase_limit_secs),
        ..TurnConfig::default()
    };
    if let Some(ref prompt) = cfg.system_prompt {
        turn_config.system_prompt = prompt.clone();
    }

    let mut processor = TurnProcessor::new(
        turn_config,
        Arc::new(LexiconAnalyzer::new()),
        responder,
        recognizer,
        synthesizer,
    )?;
    tracing::debug!(model = %model.id, provider = provider.name(), "processor ready");

    if let Some(command) = args.command {
        console::run_command(&mut processor, &command).await
    } else if use_tui {
        ui::run_tui(&mut processor, &model, settings.gender).await
    } else {
        console::run_interactive(&mut processor, &model, settings.gender).await
    }
}
