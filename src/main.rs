//! livescroll-subreddit — walk a subreddit's newest threads in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ PollMsg ┌────────────┐ drain() ┌──────────┐ draw() ┌──────────┐
//! │  poll.rs │ ──────► │ session.rs │ ──────► │  app.rs  │ ─────► │  ui.rs   │
//! │  (task)  │ (mpsc)  │ (owner of  │         │ (state)  │        │ (render) │
//! └──────────┘         │  sessions) │         └──────────┘        └──────────┘
//!      │               └────────────┘              ▲
//!      │ fetch_page()                              │ handle_key_event()
//! ┌──────────┐                                ┌──────────┐
//! │ source/  │                                │ input.rs │
//! └──────────┘                                └──────────┘
//! ```
//!
//! * **`source/`** — the `FeedClient` trait, the HTTP client and the
//!   `Thread` record items are normalised into.
//! * **`poll`** — one async task per session: fetch, accumulate, publish, wait.
//! * **`session`** — starts/stops sessions and keeps the latest snapshot.
//! * **`app`** — UI state: pager, selection, prompts, notices.
//! * **`ui`** / **`input`** — rendering and key mapping.
//! * **`channel`**, **`export`**, **`pager`** — input parsing, CSV output,
//!   page arithmetic.
//! * **`main`** — wires everything together: parse args, start the runtime,
//!   set up the terminal, and run the event loop.

mod app;
mod channel;
mod config;
mod export;
mod input;
mod logging;
mod pager;
mod poll;
mod session;
mod source;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use config::{Args, Config};
use session::SessionController;
use source::RedditClient;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    logging::init(&config.log_file, &config.log_level)?;
    info!(base_url = %config.client.base_url, interval = ?config.poll.interval, "starting");

    // Polling tasks run on the runtime's workers; the UI loop stays on this
    // thread and only ever drains channels.
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let client = RedditClient::new(config.client.clone())?;
    let sessions = SessionController::new(runtime.handle().clone(), Arc::new(client), config.poll);
    let mut app = App::new(
        sessions,
        config.page_size,
        config.output_dir.clone(),
        config.feed_host.clone(),
    );
    if let Some(channel) = &config.initial_channel {
        app.submit_channel(channel);
    }

    install_panic_hook();
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply whatever the poller published.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // Dropping the app cancels any running session before the runtime goes.
    drop(app);
    runtime.shutdown_timeout(Duration::from_secs(1));
    info!("exiting");
    Ok(())
}
