//! Interactive terminal front end.
//!
//! Paths are typed or pasted (a file manager drop pastes quoted paths), the
//! batch is sent with Enter on an empty input line, and the first statement
//! summary is shown with a debit/credit chart. The request runs on the tokio
//! runtime and reports back over a std channel that the draw loop polls.

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ledgerlens_client::{AnalysisTransport, SubmissionController};
use ledgerlens_core::{Completion, CurrencyFormat, Presenter, SubmissionState};
use ledgerlens_ingest::{collect_candidates, split_dropped_paths};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span, Text},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph,
        Wrap,
    },
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tokio::runtime::Handle;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// What the loop should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<T: AnalysisTransport + 'static> {
    controller: SubmissionController<T>,
    format: CurrencyFormat,
    runtime: Handle,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    input: String,
    notice: Option<String>,
    selected: usize,
    scroll: u16,
    tick: usize,
}

const IDLE_HELP: &str = "path (Enter adds; Enter on empty line analyzes; Del removes; Esc quits)";

impl<T: AnalysisTransport + 'static> App<T> {
    pub fn new(
        controller: SubmissionController<T>,
        format: CurrencyFormat,
        runtime: Handle,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            controller,
            format,
            runtime,
            tx,
            rx,
            input: String::new(),
            notice: None,
            selected: 0,
            scroll: 0,
            tick: 0,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        self.controller.state()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn batch_len(&self) -> usize {
        self.controller.session().selector().len()
    }

    /// Load paths into the batch and report what happened on the notice line.
    pub fn add_paths(&mut self, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        let accepted = self.controller.session().selector().config().accepted_media_type.clone();
        let collected = match collect_candidates(paths, &accepted) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "could not load dropped paths");
                self.notice = Some(format!("{e:#}"));
                return;
            }
        };
        let skipped = collected.skipped;
        self.notice = match self.controller.add(collected.files) {
            Ok(out) if out.ignored + skipped > 0 => Some(format!(
                "Added {} file(s), ignored {} non-PDF file(s)",
                out.added,
                out.ignored + skipped
            )),
            Ok(out) => Some(format!("Added {} file(s)", out.added)),
            Err(e) => Some(e.to_string()),
        };
    }

    pub fn paste(&mut self, text: &str) {
        if !matches!(self.state(), SubmissionState::Idle) {
            return;
        }
        match split_dropped_paths(text) {
            Ok(paths) => self.add_paths(&paths),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// Start the request on the runtime. The completion arrives via `poll_completion`.
    pub fn submit(&mut self) {
        match self.controller.submit() {
            Ok(pending) => {
                tracing::info!(
                    ticket = %pending.ticket(),
                    files = pending.files().len(),
                    "submitting batch"
                );
                let tx = self.tx.clone();
                self.runtime.spawn(async move {
                    let completion = pending.run().await;
                    let _ = tx.send(completion);
                });
                self.notice = None;
                self.selected = 0;
                self.scroll = 0;
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// Apply any finished request. Returns true if the state changed.
    pub fn poll_completion(&mut self) -> bool {
        let mut changed = false;
        while let Ok(c) = self.rx.try_recv() {
            changed |= self.controller.complete(c);
        }
        changed
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.controller.cancel();
            return Flow::Quit;
        }

        if matches!(self.state(), SubmissionState::Idle) {
            return self.idle_key(key.code);
        }
        if matches!(self.state(), SubmissionState::InFlight { .. }) {
            if key.code == KeyCode::Esc {
                self.controller.cancel();
            }
            return Flow::Continue;
        }

        // a result or a failure is on screen
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('r') => {
                self.controller.reset();
                self.notice = None;
                self.scroll = 0;
            }
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
        Flow::Continue
    }

    fn idle_key(&mut self, code: KeyCode) -> Flow {
        match code {
            KeyCode::Esc if self.input.is_empty() => return Flow::Quit,
            KeyCode::Esc => self.input.clear(),
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                if line.trim().is_empty() {
                    self.submit();
                } else {
                    self.paste(&line);
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.batch_len() {
                    self.selected += 1;
                }
            }
            KeyCode::Delete => {
                if let Some(f) = self.controller.remove(self.selected) {
                    self.notice = Some(format!("Removed {}", f.name()));
                    if self.selected >= self.batch_len() {
                        self.selected = self.batch_len().saturating_sub(1);
                    }
                }
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        Flow::Continue
    }

    fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(f.area());

        let state = self.controller.state();
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "LedgerLens",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(state.label(), Style::default().fg(Color::Cyan)),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(header, chunks[0]);

        match state {
            SubmissionState::Idle => self.draw_selector(f, chunks[1]),
            SubmissionState::InFlight { files, .. } => {
                let spin = SPINNER[self.tick % SPINNER.len()];
                let body = Paragraph::new(vec![
                    Line::raw(""),
                    Line::raw(format!("{spin} Analyzing {files} file(s)...")),
                ])
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("analysis"));
                f.render_widget(body, chunks[1]);
            }
            SubmissionState::Succeeded(_) => {
                match self.controller.session().presenter(&self.format) {
                    Some(p) => draw_results(f, chunks[1], &p, self.scroll),
                    None => f.render_widget(Paragraph::new("No statements in result"), chunks[1]),
                }
            }
            SubmissionState::Failed(err) => {
                let body = Paragraph::new(vec![
                    Line::raw(""),
                    Line::styled(err.user_message(), Style::default().fg(Color::Red)),
                    Line::styled(err.to_string(), Style::default().fg(Color::DarkGray)),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("error"));
                f.render_widget(body, chunks[1]);
            }
        }

        let footer = match state {
            SubmissionState::Idle => Paragraph::new(self.input.as_str())
                .block(Block::default().borders(Borders::ALL).title(IDLE_HELP)),
            SubmissionState::InFlight { .. } => {
                Paragraph::new("Esc cancels").block(Block::default().borders(Borders::ALL))
            }
            _ => Paragraph::new("r: new analysis  q: quit  Up/Down: scroll")
                .block(Block::default().borders(Borders::ALL)),
        };
        f.render_widget(footer, chunks[2]);
    }

    fn draw_selector(&self, f: &mut Frame, area: Rect) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let selector = self.controller.session().selector();
        let items: Vec<ListItem> = selector
            .files()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                ListItem::new(format!("{:>2}. {}  ({:.2} MB)", i + 1, c.name(), c.size_mb()))
            })
            .collect();
        let title = format!("statements {}/{}", selector.len(), selector.max_files());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut ls = ListState::default();
        if !selector.is_empty() {
            ls.select(Some(self.selected));
        }
        f.render_stateful_widget(list, parts[0], &mut ls);

        let notice = self.notice.as_deref().unwrap_or("Paste or type PDF paths");
        f.render_widget(
            Paragraph::new(Span::styled(notice, Style::default().fg(Color::Gray))),
            parts[1],
        );
    }
}

fn draw_results(f: &mut Frame, area: Rect, p: &Presenter<'_>, scroll: u16) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let h = p.headline();
    let net_style = if h.net_is_negative {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    let mut lines = vec![
        Line::from(Span::styled(
            h.file_name.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(format!("Transactions: {}", h.transaction_count)),
        Line::raw(format!("Debits:  {}", h.total_debits)),
        Line::raw(format!("Credits: {}", h.total_credits)),
        Line::from(vec![Span::raw("Net:     "), Span::styled(h.net, net_style)]),
    ];
    if p.hidden_documents() > 0 {
        lines.push(Line::styled(
            format!("({} more statement(s) not shown)", p.hidden_documents()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let categories = p.categories();
    if !categories.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Spending by category", Style::default().fg(Color::Yellow)));
        for c in &categories {
            lines.push(Line::raw(format!("{}  {} ({})", c.name, c.total, c.transaction_count)));
            for m in &c.merchants {
                lines.push(Line::raw(format!("  {}. {}  {}", m.rank, m.name, m.amount)));
            }
        }
    }
    for (title, rows) in [("Top expenses", p.top_expenses()), ("Top revenues", p.top_revenues())] {
        if rows.is_empty() {
            continue;
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(title, Style::default().fg(Color::Yellow)));
        for r in &rows {
            lines.push(Line::raw(format!("{}. {}  {}  {}", r.rank, r.label, r.date, r.amount)));
        }
    }

    let summary = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("summary"));
    f.render_widget(summary, cols[0]);

    let debits: Vec<(f64, f64)> = p
        .chart_series()
        .enumerate()
        .map(|(i, pt)| (i as f64, pt.debits))
        .collect();
    let credits: Vec<(f64, f64)> = p
        .chart_series()
        .enumerate()
        .map(|(i, pt)| (i as f64, pt.credits))
        .collect();

    let y_max = p
        .chart_series()
        .map(|pt| pt.debits.max(pt.credits))
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let x_max = (debits.len().saturating_sub(1) as f64).max(1.0);
    let first = p.chart_series().next().map(|pt| pt.date.to_string()).unwrap_or_default();
    let last = p.chart_series().last().map(|pt| pt.date.to_string()).unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .name("debits")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&debits),
        Dataset::default()
            .name("credits")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&credits),
    ];
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("balance over time"))
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(vec![first, last]))
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(vec![p.money(0.0), p.money(y_max)]),
        );
    f.render_widget(chart, cols[1]);
}

pub fn run_tui<T: AnalysisTransport + 'static>(mut app: App<T>, initial: &[PathBuf]) -> Result<()> {
    app.add_paths(initial);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;

    res
}

fn event_loop<T: AnalysisTransport + 'static>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<T>,
) -> Result<()> {
    loop {
        app.poll_completion();
        app.tick = app.tick.wrapping_add(1);
        terminal.draw(|f| app.draw(f))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
            }
            Event::Paste(text) => app.paste(&text),
            _ => {}
        }
    }
    Ok(())
}
