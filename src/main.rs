use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voxbridge::cache::CacheStats;
use voxbridge::db::{self, DbPool, UserRepo};
use voxbridge::{
    Config, DeliveryOutcome, GoogleSpeechToText, GoogleTextToSpeech, GoogleTranslator,
    LocalVoiceStore, SqliteSpeechCache, SqliteTranslationCache, TelegramVoiceChannel,
    TranslationPipeline, VoiceChannel, VoiceHandler, VoiceMessage, lang,
};

/// Voxbridge - Spoken translation of voice messages
#[derive(Parser)]
#[command(name = "voxbridge", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a voice file into the local voice store
    Translate {
        /// OGG/Opus voice file
        file: PathBuf,
        /// Recording duration in seconds
        #[arg(short, long)]
        duration: u64,
        /// User to charge and read languages from
        #[arg(short, long, default_value = "local")]
        user: String,
        /// Voice store directory (defaults to the configured one)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Translate a voice file and deliver it to a Telegram chat
    Send {
        /// OGG/Opus voice file, or a Telegram file id with --telegram-file
        file: String,
        /// Telegram chat ID
        #[arg(short, long)]
        chat: String,
        /// Recording duration in seconds
        #[arg(short, long)]
        duration: u64,
        /// User to charge and read languages from
        #[arg(short, long, default_value = "local")]
        user: String,
        /// Message to reply to
        #[arg(long)]
        reply_to: Option<String>,
        /// Treat FILE as a Telegram file id and download it first
        #[arg(long)]
        telegram_file: bool,
    },
    /// Set a user's source and target languages
    Languages {
        /// User ID
        #[arg(short, long)]
        user: String,
        /// Language the user speaks
        #[arg(long)]
        source: String,
        /// Language to translate into
        #[arg(long)]
        target: String,
    },
    /// Swap a user's source and target languages
    Swap {
        /// User ID
        #[arg(short, long)]
        user: String,
    },
    /// Show cache entry and request counts
    CacheStats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voxbridge=info",
        1 => "info,voxbridge=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(db_path = %config.db_path.display(), "loaded configuration");

    let pool = db::init(&config.db_path)?;
    let users = UserRepo::new(pool.clone(), config.user_defaults());

    match cli.command {
        Command::Translate {
            file,
            duration,
            user,
            out_dir,
        } => {
            let store = LocalVoiceStore::new(out_dir.unwrap_or_else(|| config.out_dir.clone()));
            let audio = tokio::fs::read(&file).await?;
            let outcome =
                deliver(&config, &pool, users, Arc::new(store), &user, "local", None, audio, duration)
                    .await?;
            print_outcome(&outcome);
        }
        Command::Send {
            file,
            chat,
            duration,
            user,
            reply_to,
            telegram_file,
        } => {
            let token = config
                .telegram_token
                .clone()
                .ok_or_else(|| anyhow::anyhow!("TELEGRAM_BOT_TOKEN not set"))?;
            let telegram = TelegramVoiceChannel::new(token)?;

            let audio = if telegram_file {
                telegram.download_file(&file).await?
            } else {
                tokio::fs::read(Path::new(&file)).await?
            };

            let outcome = deliver(
                &config,
                &pool,
                users,
                Arc::new(telegram),
                &user,
                &chat,
                reply_to,
                audio,
                duration,
            )
            .await?;
            print_outcome(&outcome);
        }
        Command::Languages {
            user,
            source,
            target,
        } => {
            let (Some(source), Some(target)) = (lang::find(&source), lang::find(&target)) else {
                let codes: Vec<&str> = lang::SUPPORTED.iter().map(|l| l.code).collect();
                anyhow::bail!("unsupported language; choose from {}", codes.join(", "));
            };

            users.find_or_create(&user)?;
            users.set_languages(&user, source.code, target.code)?;
            println!("{user}: {} -> {}", source.label, target.label);
        }
        Command::Swap { user } => {
            users.find_or_create(&user)?;
            let updated = users.swap_languages(&user)?;
            println!("{user}: {} -> {}", updated.source_lang, updated.target_lang);
        }
        Command::CacheStats => {
            let stats = CacheStats::collect(&pool)?;
            println!(
                "translations: {} entries, {} requests",
                stats.translations.entries, stats.translations.requests
            );
            println!(
                "speech:       {} entries, {} requests",
                stats.speech.entries, stats.speech.requests
            );
        }
    }

    Ok(())
}

/// Build the pipeline and run one voice message through a channel
#[allow(clippy::too_many_arguments)]
async fn deliver(
    config: &Config,
    pool: &DbPool,
    users: UserRepo,
    channel: Arc<dyn VoiceChannel>,
    user_id: &str,
    chat_id: &str,
    reply_to: Option<String>,
    audio: Vec<u8>,
    duration_secs: u64,
) -> anyhow::Result<DeliveryOutcome> {
    let api_key = config.require_google_api_key()?;

    let pipeline = TranslationPipeline::new(
        Arc::new(GoogleSpeechToText::new(api_key.clone())?),
        Arc::new(GoogleTranslator::new(api_key.clone())?),
        Arc::new(GoogleTextToSpeech::new(api_key)?),
        Arc::new(SqliteTranslationCache::new(pool.clone())),
        Arc::new(SqliteSpeechCache::new(pool.clone())),
    )
    .with_sample_rates(config.sample_rates.clone());

    let user = users.find_or_create(user_id)?;
    let handler = VoiceHandler::new(Arc::new(pipeline), channel, Arc::new(users));

    let outcome = handler
        .handle(VoiceMessage {
            user_id: user.id,
            chat_id: chat_id.to_string(),
            reply_to,
            audio,
            duration_secs,
            source_lang: user.source_lang,
            target_lang: user.target_lang,
        })
        .await?;

    Ok(outcome)
}

fn print_outcome(outcome: &DeliveryOutcome) {
    println!("recognized: {}", outcome.recognized_text);
    println!("translated: {}", outcome.translated_text);
    println!("cost:       {}", outcome.cost);
    if let Some(reference) = &outcome.reference {
        let how = if outcome.reused { "reused" } else { "delivered" };
        println!("{how}:    {reference}");
    }
}
