use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use rs_unread_mail::config::{Config, load_config, resolve_log_path};
use rs_unread_mail::domain::email::ListEntry;
use rs_unread_mail::mail::mail_app::MailAppProvider;
use rs_unread_mail::mail::provider::MailProvider;
use rs_unread_mail::terminal::{TuiOptions, run_tui};

#[derive(Parser)]
#[command(name = "rs_unread_mail")]
#[command(about = "Unread mail at a glance (Apple Mail TUI)", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive view of unread mail (default)
    Tui {
        /// Seconds between background refreshes
        #[arg(long)]
        interval: Option<u64>,

        /// Maximum number of unread messages to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the current unread messages once
    List {
        #[arg(long)]
        json: bool,
    },

    /// Mark every unread message as read
    MarkAllRead,
}

fn provider(cfg: &Config) -> MailAppProvider {
    MailAppProvider::new(cfg.mailbox.clone(), cfg.max_unread)
}

/// The TUI owns the screen, so its log goes to a file.
fn init_file_logger(cfg: &Config) -> Result<()> {
    let path = resolve_log_path(cfg)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref())?;

    match cli.cmd.unwrap_or(Command::Tui {
        interval: None,
        limit: None,
    }) {
        Command::Tui { interval, limit } => {
            if let Some(secs) = interval {
                cfg.refresh_interval_secs = secs;
            }
            if let Some(n) = limit {
                cfg.max_unread = n;
            }
            init_file_logger(&cfg)?;

            let provider: Arc<dyn MailProvider> = Arc::new(provider(&cfg));
            run_tui(
                provider,
                &TuiOptions {
                    refresh_every: cfg.refresh_every(),
                },
            )
        }

        Command::List { json } => {
            env_logger::init();
            let items = provider(&cfg).list_unread()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("All caught up!");
            } else {
                let now = chrono::Local::now().naive_local();
                for e in &items {
                    println!("{:>3}  {}", e.index, e.title());
                    println!("     {}", e.description(now));
                }
            }
            Ok(())
        }

        Command::MarkAllRead => {
            env_logger::init();
            provider(&cfg).mark_all_read()?;
            println!("Marked all unread messages as read.");
            Ok(())
        }
    }
}
