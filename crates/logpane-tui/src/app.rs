//! App: terminal setup and the event loop around the logs page and the
//! single-log page opened from it.
//!
//! Architecture:
//! - A blocking task reads terminal events and sends them over an mpsc channel.
//! - Producer tasks send `TailMessage`s over a second channel.
//! - The loop draws when something changed, then awaits the next message and
//!   drains whatever else is queued before drawing again.

use std::io;
use std::time::{Duration, Instant};

use ratatui::crossterm::{
    event::{self, Event as TermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use logpane_core::Event;

use crate::config::TailConfig;
use crate::keymap::{self, Command, Screen};
use crate::page::LogsPage;
use crate::single_log::SingleLogPage;
use crate::tail::{self, LogLine, Source, TailMessage};
use crate::theme::Theme;
use crate::widgets::{
    log_view,
    status_bar::{self, Notice},
};

/// Queued messages handled per wakeup before the next draw.
const MAX_DRAIN: usize = 256;

const NOTICE_TTL: Duration = Duration::from_secs(5);

pub struct App {
    page: LogsPage,
    single: SingleLogPage,
    screen: Screen,
    theme: Theme,
    notice: Option<(Notice, Instant)>,
    should_quit: bool,
}

impl App {
    pub fn new(page: LogsPage, theme: Theme) -> Self {
        Self {
            page,
            single: SingleLogPage::new(80, 24),
            screen: Screen::Logs,
            theme,
            notice: None,
            should_quit: false,
        }
    }

    pub fn page(&self) -> &LogsPage {
        &self.page
    }

    pub fn single_log(&self) -> &SingleLogPage {
        &self.single
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    fn is_capturing_input(&self) -> bool {
        match self.screen {
            Screen::Logs => self.page.is_capturing_input(),
            Screen::SingleLog => self.single.is_capturing_input(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref().map(|(n, _)| n)
    }

    fn set_notice(&mut self, text: String, error: bool) {
        self.notice = Some((Notice { text, error }, Instant::now()));
    }

    // ── Message handling ─────────────────────────────────────────────────────

    /// Apply one terminal event. Returns whether a redraw is needed.
    pub fn handle_terminal_event(&mut self, ev: TermEvent) -> bool {
        match ev {
            TermEvent::Key(key) => {
                match keymap::map_key(key, self.screen, self.is_capturing_input()) {
                    Some(command) => {
                        self.handle_command(command);
                        true
                    }
                    None => false,
                }
            }
            TermEvent::Resize(..) => true,
            _ => false,
        }
    }

    pub fn handle_command(&mut self, command: Command) {
        debug!("command {:?}", command);
        match command {
            Command::View(event) => self.handle_view_event(event),
            Command::ToggleContext => self.page.toggle_context(),
            Command::ReverseOrder => self.page.reverse_order(),
            Command::CycleTimestamps => self.page.cycle_timestamps(),
            Command::CycleSources => self.page.cycle_sources(),
            Command::TogglePause => {
                let paused = self.page.toggle_pause();
                info!("log stream {}", if paused { "paused" } else { "resumed" });
            }
            Command::ClearLogs => self.page.clear(),
            Command::NudgeUp => self.page.scroll_up_by_one(),
            Command::NudgeDown => self.page.scroll_down_by_one(),
            Command::OpenLog => {
                if let Some(log) = self.page.selected_log() {
                    self.single.show_log(log);
                    self.screen = Screen::SingleLog;
                }
            }
            Command::NextLog => {
                self.page.scroll_down_by_one();
                self.show_selected_log();
            }
            Command::PrevLog => {
                self.page.scroll_up_by_one();
                self.show_selected_log();
            }
            Command::Quit => self.should_quit = true,
        }
    }

    fn handle_view_event(&mut self, event: Event) {
        let effects = match self.screen {
            Screen::Logs => self.page.handle_event(event),
            Screen::SingleLog => {
                // esc leaves the page once there is no filter left to clear
                let leaving = event == Event::Clear
                    && !self.single.is_capturing_input()
                    && !self.single.has_applied_filter();
                if leaving {
                    self.screen = Screen::Logs;
                    return;
                }
                self.single.handle_event(event)
            }
        };
        for effect in effects {
            debug!("effect {:?}", effect);
        }
    }

    fn show_selected_log(&mut self) {
        if let Some(log) = self.page.selected_log() {
            self.single.show_log(log);
        }
    }

    /// Apply a run of producer messages, merging all their lines into a
    /// single append.
    pub fn handle_tail_messages(&mut self, messages: impl IntoIterator<Item = TailMessage>) {
        let mut lines: Vec<LogLine> = Vec::new();
        for msg in messages {
            match msg {
                TailMessage::Lines(batch) => lines.extend(batch),
                TailMessage::Ended(source) => {
                    // lines before the end marker belong to the source
                    self.page.append(std::mem::take(&mut lines));
                    self.page.mark_source_ended(&source);
                    self.set_notice(format!("{} ended", source.short), false);
                }
                TailMessage::Failed(source, error) => {
                    self.page.append(std::mem::take(&mut lines));
                    self.page.mark_source_ended(&source);
                    self.set_notice(error, true);
                }
            }
        }
        self.page.append(lines);
    }

    fn expire_notice(&mut self) -> bool {
        match &self.notice {
            Some((_, at)) if at.elapsed() >= NOTICE_TTL => {
                self.notice = None;
                true
            }
            _ => false,
        }
    }

    // ── Drawing ──────────────────────────────────────────────────────────────

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        let (width, height) = (chunks[0].width as usize, chunks[0].height as usize);
        self.page.set_dimensions(width, height);
        self.single.set_dimensions(width, height);
        match self.screen {
            Screen::Logs => log_view::draw(frame, chunks[0], self.page.view(), &self.theme),
            Screen::SingleLog => log_view::draw(frame, chunks[0], self.single.view(), &self.theme),
        }
        status_bar::draw(
            frame,
            chunks[1],
            &self.page,
            self.screen,
            self.is_capturing_input(),
            self.notice(),
            &self.theme,
        );
    }

    // ── Main run loop ────────────────────────────────────────────────────────

    pub async fn run(mut self, sources: Vec<Source>, tail_config: TailConfig) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, sources, tail_config).await;

        // ── Teardown ─────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        sources: Vec<Source>,
        tail_config: TailConfig,
    ) -> anyhow::Result<()> {
        // ── Background task: terminal events ─────────────────────────────────
        let (term_tx, mut term_rx) = mpsc::channel::<TermEvent>(1024);
        // polls so the task notices the loop is gone and lets the runtime exit
        tokio::task::spawn_blocking(move || {
            while !term_tx.is_closed() {
                match event::poll(Duration::from_millis(100)).and_then(|ready| {
                    if ready {
                        event::read().map(Some)
                    } else {
                        Ok(None)
                    }
                }) {
                    Ok(Some(ev)) => {
                        if term_tx.blocking_send(ev).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("terminal read failed: {}", e);
                        break;
                    }
                }
            }
        });

        // ── Background tasks: log producers ──────────────────────────────────
        let (tail_tx, mut tail_rx) = mpsc::channel::<TailMessage>(1024);
        let producers = tail::spawn_sources(sources, &tail_config, tail_tx);
        info!("started {} log sources", producers.len());

        let mut ui_tick = tokio::time::interval(Duration::from_millis(500));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(ev) = term_rx.recv() => {
                    let mut redraw = self.handle_terminal_event(ev);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN && !self.should_quit {
                        let Ok(next) = term_rx.try_recv() else { break };
                        drained += 1;
                        redraw |= self.handle_terminal_event(next);
                    }
                    needs_redraw = redraw;
                }

                Some(msg) = tail_rx.recv() => {
                    let mut batch = vec![msg];
                    while batch.len() < MAX_DRAIN {
                        let Ok(next) = tail_rx.try_recv() else { break };
                        batch.push(next);
                    }
                    self.handle_tail_messages(batch);
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    needs_redraw = self.expire_notice();
                }
            }
        }

        for producer in producers {
            producer.abort();
        }
        Ok(())
    }
}
