mod app;
mod cli;
mod error;
mod input;
mod paths;
mod render;
mod terminal;
mod theme;

use std::fs;
use std::fs::File;
use std::time::Duration;
use std::time::Instant;

use clap::Parser;
use crossterm::event::Event;
use crossterm::event::EventStream;
use discover_lib::DiscoverClient;
use discover_lib::FetchRequest;
use discover_lib::api::PageSource;
use discover_lib::api::query::Page;
use discover_lib::cache::FetchTicket;
use discover_lib::error::FetchError;
use futures::StreamExt;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::App;
use crate::cli::Args;
use crate::error::AppError;
use crate::terminal::TerminalGuard;
use crate::theme::ThemeMode;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type FetchDone = (FetchTicket, Result<Page, FetchError>);

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    init_logging(args.log_level())?;
    info!("Starting against {}", args.endpoint);

    let mut builder = DiscoverClient::builder()
        .url(args.endpoint.as_str())
        .connect_timeout(CONNECT_TIMEOUT);
    if let Some(timeout) = args.timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    let mode = if args.dark {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    };
    let mut app = App::new(args.view_config(), args.debounce(), mode);

    let mut terminal = TerminalGuard::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchDone>();
    let mut events = EventStream::new();

    let (_, height) = terminal.size()?;
    let mut fetches = app.mount();
    fetches.extend(app.resize(render::viewport_rows(height)));
    spawn_fetches(&client, &tx, fetches);

    loop {
        let (width, height) = terminal.size()?;
        terminal.draw(&render::render(&app, width, height))?;
        if app.should_quit() {
            break;
        }

        let deadline = app.next_deadline();
        let fetches = tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => app.handle_key(key, Instant::now()),
                Some(Ok(Event::Mouse(mouse))) => app.handle_mouse(mouse),
                Some(Ok(Event::Resize(_, height))) => app.resize(render::viewport_rows(height)),
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => return Err(AppError::Terminal(e)),
                None => break,
            },
            Some((ticket, result)) = rx.recv() => app.complete(ticket, result),
            _ = sleep_until(deadline) => app.tick(Instant::now()),
        };
        spawn_fetches(&client, &tx, fetches);
    }

    info!("Exiting");
    Ok(())
}

/// Runs each fetch on the runtime and reports back over `tx`.
fn spawn_fetches(
    client: &DiscoverClient,
    tx: &UnboundedSender<FetchDone>,
    fetches: Vec<FetchRequest>,
) {
    for fetch in fetches {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.fetch(&fetch.request).await;
            let _ = tx.send((fetch.ticket, result));
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

/// Logs go to a rotating file in the cache dir, never to the terminal.
fn init_logging(level: LevelFilter) -> Result<(), AppError> {
    let Some(dir) = paths::cache_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&dir).map_err(|e| AppError::Logger(e.to_string()))?;
    paths::rotate_logs(&dir);

    let file = File::create(paths::log_file(&dir)).map_err(|e| AppError::Logger(e.to_string()))?;
    WriteLogger::init(level, Config::default(), file).map_err(|e| AppError::Logger(e.to_string()))
}
