mod app;
mod config;
mod countdown;
mod data;
mod error;
mod model;
mod pages;
mod stats;
mod theme;
mod ui;
mod worker;

use std::{fs::File, io, sync::Arc, sync::Mutex, time::Duration};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use data::DataClient;
use worker::{Request, Update};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dashboard refresh interval in seconds
    #[arg(short, long, default_value_t = 60)]
    interval: u64,

    /// Competition code, e.g. PL, PD, BL1
    #[arg(short, long, default_value = "PL")]
    competition: String,

    /// Open straight onto this team's page
    #[arg(short, long)]
    team: Option<u64>,

    /// Seconds a fetched response is reused before asking the API again (0 disables)
    #[arg(long, default_value_t = 60)]
    cache_secs: u64,

    /// Where to write logs; the terminal is taken by the UI
    #[arg(long, default_value = "pl-dash.log")]
    log_file: String,
}

fn init_logging(path: &str) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("could not open log file {}", path))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Fail before touching the terminal so the message stays readable.
    let config = Config::from_env(&args.competition, Duration::from_secs(args.cache_secs))?;
    init_logging(&args.log_file)?;
    info!(?config, interval = args.interval, "starting");

    let client = Arc::new(DataClient::new(&config)?);
    let (request_tx, request_rx) = mpsc::unbounded_channel::<Request>();
    let (update_tx, mut update_rx) = mpsc::channel::<Update>(32);
    tokio::spawn(worker::run(
        client,
        request_rx,
        update_tx,
        Duration::from_secs(args.interval.max(1)),
    ));

    let (mut app, requests) = App::new(args.team);
    send_all(&request_tx, requests)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &config.competition, &request_tx, &mut update_rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }
    info!("shutting down");

    Ok(())
}

/// Hands requests to the worker. Fails once the worker has stopped.
fn send_all(tx: &mpsc::UnboundedSender<Request>, requests: Vec<Request>) -> io::Result<()> {
    for request in requests {
        if tx.send(request).is_err() {
            error!("background worker stopped; requests can no longer be served");
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "background worker stopped"));
        }
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    competition: &str,
    requests: &mpsc::UnboundedSender<Request>,
    updates: &mut mpsc::Receiver<Update>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app, competition))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    send_all(requests, app.on_key(key.code))?;
                }
            }
        }

        while let Ok(update) = updates.try_recv() {
            send_all(requests, app.apply(update))?;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_beyond_any_buffer_are_all_delivered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let requests: Vec<Request> = (0..100).map(Request::Team).collect();
        send_all(&tx, requests).expect("worker is listening");
        let mut delivered = 0;
        while rx.try_recv().is_ok() {
            delivered += 1;
        }
        assert_eq!(delivered, 100);
    }

    #[test]
    fn stopped_worker_is_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let err = send_all(&tx, vec![Request::Dashboard { fresh: false }]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(send_all(&tx, Vec::new()).is_ok());
    }
}
