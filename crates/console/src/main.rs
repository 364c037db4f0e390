//! ACF console host
//!
//! Reads command lines from stdin and dispatches them as the console issuer.
//! A line starting with `?` prints completions for the rest of the line
//! instead of running it.

mod demo;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use acf_core::config::TomlConfig;
use acf_core::permissions::{PermissionSet, WILDCARD};
use acf_core::{
    AsyncDispatcher, CommandIssuer, CommandManager, IssuerRef, ManagerConfig, Messages,
    QueuedIssuer, TaskQueue,
};
use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Interactive console for the command framework
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Manager settings file. Created with defaults when missing.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Message catalog file. Created with defaults when missing.
    #[arg(long)]
    messages: Option<PathBuf>,

    /// Dispatch on a worker thread and deliver replies through the task queue
    #[arg(long = "async")]
    run_async: bool,
}

/// The local operator
struct ConsoleIssuer {
    permissions: PermissionSet,
}

impl ConsoleIssuer {
    fn new() -> Self {
        let mut permissions = PermissionSet::new();
        permissions.add(&[WILDCARD]);
        Self { permissions }
    }
}

impl CommandIssuer for ConsoleIssuer {
    fn is_player(&self) -> bool {
        false
    }

    fn unique_id(&self) -> Uuid {
        Uuid::nil()
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has(permission)
    }

    fn send_message(&self, message: &str) {
        println!("{message}");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let config = match &args.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };
    let manager = Arc::new(CommandManager::with_config(config)?);
    if let Some(path) = &args.messages {
        manager.set_message_provider(Arc::new(Messages::load(path)?));
    }
    demo::register(&manager)?;
    info!(
        "Registered commands: {}",
        manager.registered_root_commands().join(", ")
    );

    let console: IssuerRef = Arc::new(ConsoleIssuer::new());
    let queue = TaskQueue::default();
    let dispatcher = if args.run_async {
        Some(AsyncDispatcher::spawn(Arc::clone(&manager))?)
    } else {
        None
    };

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if line.is_empty() {
            prompt()?;
            continue;
        }

        if let Some(buffer) = line.strip_prefix('?') {
            println!("{}", manager.complete(&console, buffer).join("  "));
        } else {
            let result = match &dispatcher {
                Some(dispatcher) => {
                    let issuer: IssuerRef = QueuedIssuer::new(Arc::clone(&console), queue.clone());
                    let result = dispatcher.submit(issuer, line)?.recv()?;
                    queue.process_queued_tasks();
                    result
                }
                None => manager.dispatch(&console, line),
            };
            if let Err(e) = result {
                debug!("Command failed: {}", e);
            }
        }
        prompt()?;
    }

    if let Some(dispatcher) = dispatcher {
        dispatcher.shutdown();
    }
    info!("Console closed");
    Ok(())
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
