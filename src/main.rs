//! Binary entrypoint for the wishbot CLI.
//!
//! Commands:
//! - `start` - run the bot server event loop
//! - `init` - create a starter `config.toml`
//! - `status` - print storage counts and configuration summary
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, info};

use wishbot::bot::BotServer;
use wishbot::config::Config;
use wishbot::storage::Store;

#[derive(Parser)]
#[command(name = "wishbot")]
#[command(about = "A conversational wishlist assistant with password-protected sharing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot server
    Start,
    /// Initialize a new configuration file
    Init,
    /// Show storage status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting wishbot v{}", env!("CARGO_PKG_VERSION"));
            let mut server = BotServer::new(&config)?;

            // The transport collaborator attaches here via event_sender() /
            // take_reply_receiver(). Without one, drain replies into the debug
            // log so the loop still runs and can be probed by hand.
            let _event_tx = server.event_sender();
            if let Some(mut replies) = server.take_reply_receiver() {
                tokio::spawn(async move {
                    while let Some(reply) = replies.recv().await {
                        debug!(
                            "reply chat_id={} level={:?} text={}",
                            reply.chat_id,
                            reply.level,
                            wishbot::logutil::escape_log(&reply.text)
                        );
                    }
                });
            }

            info!("Bot server starting...");
            server.run().await?;
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            Config::create_default(&cli.config).await?;
            info!("Created starter configuration at {}", cli.config);
            println!("Created {}. Set bot.token before starting.", cli.config);
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let store = Store::open(&config.storage.data_dir)?;
            println!("Wishbot status");
            println!("  data dir:  {}", config.storage.data_dir);
            println!("  users:     {}", store.count_users());
            println!("  wishes:    {}", store.count_wishes());
            println!(
                "  session idle timeout: {} min",
                config.session.idle_timeout_minutes
            );
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.as_deref())
            .and_then(|l| l.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    if let Some(file) = log_file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // When stdout is a terminal, mirror log lines to the console too.
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
