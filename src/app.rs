use std::path::PathBuf;

use ratatui::widgets::TableState;
use tracing::{info, warn};

use crate::channel::parse_channel;
use crate::export::ExportFile;
use crate::pager::Pager;
use crate::session::{SessionController, SessionEvent, SessionStatus};
use crate::source::Thread;

/// What keystrokes currently go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing a subreddit name or link.
    Channel(String),
    /// Typing a one-based page number.
    JumpToPage(String),
}

/// A modal message that blocks input until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

pub struct App {
    pub sessions: SessionController,
    pub pager: Pager,
    /// Row selection, relative to the visible page.
    pub table_state: TableState,
    pub mode: Mode,
    pub notice: Option<Notice>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    /// Frame counter driving the activity spinner.
    pub ticks: usize,
    output_dir: PathBuf,
    feed_host: String,
}

impl App {
    pub fn new(
        sessions: SessionController,
        page_size: usize,
        output_dir: PathBuf,
        feed_host: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            pager: Pager::new(page_size),
            table_state: TableState::default(),
            mode: Mode::Normal,
            notice: None,
            quit: false,
            status: "Press s to choose a subreddit".into(),
            ticks: 0,
            output_dir,
            feed_host: feed_host.into(),
        }
    }

    /// Apply whatever the poller published since the last frame.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);

        let events = self.sessions.drain();
        self.apply(events);
    }

    fn apply(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::Updated { count } => {
                    self.status = format!("Fetched {count} threads");
                }
                SessionEvent::Completed { count } => {
                    self.status = format!("Reached the end of the listing ({count} threads)");
                }
                SessionEvent::Failed(err) => {
                    self.status = "Polling failed".into();
                    self.notice = Some(Notice {
                        title: "Download error".into(),
                        message: format!("An error occurred while downloading more data.\n{err}"),
                    });
                }
            }
        }

        let len = self.threads().len();
        self.pager.clamp(len);
        self.clamp_selection();
    }

    pub fn threads(&self) -> &[Thread] {
        self.sessions.threads()
    }

    /// Threads on the current page.
    pub fn visible_threads(&self) -> &[Thread] {
        let threads = self.threads();
        &threads[self.pager.visible(threads.len())]
    }

    pub fn selected_thread(&self) -> Option<&Thread> {
        self.table_state
            .selected()
            .and_then(|i| self.visible_threads().get(i))
    }

    // -- sessions ------------------------------------------------------------

    /// Parse `input` and start polling it, replacing any running session.
    pub fn submit_channel(&mut self, input: &str) {
        match parse_channel(input, &self.feed_host) {
            Ok(channel) => {
                self.sessions.start(&channel);
                self.pager.first();
                self.table_state.select(None);
                self.status = format!("Polling r/{channel}…");
            }
            Err(err) => {
                self.notice = Some(Notice {
                    title: "Invalid subreddit".into(),
                    message: err.to_string(),
                });
            }
        }
    }

    /// Stop polling.  Anything the run reported before the stop landed is
    /// applied first, so a failure still opens its notice.
    pub fn stop(&mut self) {
        if !self.sessions.is_active() {
            return;
        }
        let events = self.sessions.stop();
        self.apply(events);
        if self.sessions.status() == SessionStatus::Stopped {
            self.status = "Stopped".into();
        }
    }

    /// Write the accumulation to the output directory.  Refused while
    /// polling.
    pub fn export(&mut self) {
        if self.sessions.is_active() {
            self.status = "Stop polling before exporting".into();
            return;
        }

        let file = ExportFile::threads(self.threads());
        match file.save_in(&self.output_dir) {
            Ok(path) => {
                info!(
                    path = %path.display(),
                    mime = file.mime_type,
                    rows = self.threads().len(),
                    "export written"
                );
                self.status = format!("Saved {} threads to {}", self.threads().len(), path.display());
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.notice = Some(Notice {
                    title: "Export failed".into(),
                    message: err.to_string(),
                });
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// True while a session is polling; drives which controls are live.
    pub fn is_busy(&self) -> bool {
        self.sessions.is_active()
    }

    // -- text entry ----------------------------------------------------------

    pub fn begin_channel_entry(&mut self) {
        self.mode = Mode::Channel(String::new());
    }

    pub fn begin_page_jump(&mut self) {
        self.mode = Mode::JumpToPage(String::new());
    }

    pub fn push_char(&mut self, c: char) {
        match &mut self.mode {
            Mode::Channel(buf) => buf.push(c),
            Mode::JumpToPage(buf) if c.is_ascii_digit() => buf.push(c),
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        if let Mode::Channel(buf) | Mode::JumpToPage(buf) = &mut self.mode {
            buf.pop();
        }
    }

    pub fn cancel_entry(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn confirm_entry(&mut self) {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Channel(input) => self.submit_channel(&input),
            Mode::JumpToPage(digits) => {
                if let Ok(page) = digits.parse::<usize>() {
                    let len = self.threads().len();
                    self.pager.jump_to(page, len);
                    self.table_state.select(None);
                }
            }
            Mode::Normal => {}
        }
    }

    // -- paging --------------------------------------------------------------

    pub fn next_page(&mut self) {
        let len = self.threads().len();
        self.pager.next(len);
        self.table_state.select(None);
    }

    pub fn previous_page(&mut self) {
        self.pager.previous();
        self.table_state.select(None);
    }

    pub fn first_page(&mut self) {
        self.pager.first();
        self.table_state.select(None);
    }

    pub fn last_page(&mut self) {
        let len = self.threads().len();
        self.pager.last(len);
        self.table_state.select(None);
    }

    pub fn cycle_page_size(&mut self, forward: bool) {
        self.pager.cycle_size(forward);
        self.table_state.select(None);
    }

    // -- row selection -------------------------------------------------------

    pub fn select_next(&mut self) {
        let rows = self.visible_threads().len();
        if rows == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 1).min(rows - 1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.visible_threads().is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let rows = self.visible_threads().len();
        match self.table_state.selected() {
            Some(_) if rows == 0 => self.table_state.select(None),
            Some(i) if i >= rows => self.table_state.select(Some(rows - 1)),
            _ => {}
        }
    }
}
