//! fieldtest TUI Dashboard Module
//! ================================
//!
//! Live terminal view of a running simulated test.
//! Uses Ratatui for rendering and Crossbeam for frame delivery.
//!
//! Enable with the `dashboard` feature flag.
//!
//! Features:
//! - Run header (tick, simulated time, overall state)
//! - Eventually progress gauge
//! - Pending-sequence sparkline (last 100 ticks)
//! - Per-sequence verdict tables for both sets

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossbeam::channel::Receiver;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fieldtest_env::{CloseSignal, Display, EnvError};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Row, Sparkline, Table},
    Frame, Terminal,
};

use crate::validation::{ValidationFrame, ValidationReport, ValidationStatus};

const HISTORY_LEN: usize = 100;
const FRAME_POLL: Duration = Duration::from_millis(50);

// =============================================================================
// LAYOUTS
// =============================================================================

/// Screen arrangement selected by the `layout` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardLayout {
    /// Header, gauges, sparkline and both tables
    #[default]
    Full,

    /// Header and both tables only
    Compact,
}

impl DashboardLayout {
    /// Parses a layout id; `None` for ids this dashboard does not know.
    pub fn parse(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "full" | "default" => Some(Self::Full),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }

    /// Resolves an optional layout id, falling back to the default.
    pub fn from_id(id: Option<&str>) -> Self {
        id.and_then(Self::parse).unwrap_or_default()
    }
}

// =============================================================================
// VALIDATION DASHBOARD
// =============================================================================

/// TUI display of validation verdicts.
pub struct ValidationDashboard {
    rx: Receiver<ValidationFrame>,
    signal: CloseSignal,
    layout: DashboardLayout,
    latest: Option<ValidationFrame>,
    pending_history: VecDeque<u64>,
    frame_count: usize,
}

impl ValidationDashboard {
    /// Create a dashboard fed by the given frame receiver.
    pub fn new(rx: Receiver<ValidationFrame>, layout: DashboardLayout) -> Self {
        Self {
            rx,
            signal: CloseSignal::new(),
            layout,
            latest: None,
            pending_history: VecDeque::with_capacity(HISTORY_LEN),
            frame_count: 0,
        }
    }

    /// Drain all frames that arrived since the last draw.
    fn drain_frames(&mut self) {
        while let Ok(frame) = self.rx.try_recv() {
            let pending = frame.eventually.count(ValidationStatus::Pending)
                + frame.eventually.count(ValidationStatus::Failed);
            self.pending_history.push_back(pending as u64);
            if self.pending_history.len() > HISTORY_LEN {
                self.pending_history.pop_front();
            }
            self.latest = Some(frame);
        }
    }

    /// Run the TUI loop until 'q'/Esc is pressed or the close signal fires.
    fn run_terminal(&mut self) -> io::Result<()> {
        let _guard = TerminalGuard::enter()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        while !self.signal.is_closed() {
            self.drain_frames();

            terminal.draw(|f| self.ui(f))?;
            self.frame_count += 1;

            if event::poll(FRAME_POLL)? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                        self.signal.close();
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn ui(&self, f: &mut Frame) {
        let constraints: Vec<Constraint> = match self.layout {
            DashboardLayout::Full => vec![
                Constraint::Length(3), // Header
                Constraint::Length(3), // Progress gauge
                Constraint::Length(6), // Sparkline
                Constraint::Min(5),    // Tables
                Constraint::Length(1), // Footer
            ],
            DashboardLayout::Compact => vec![
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ],
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(constraints)
            .split(f.area());

        f.render_widget(self.header(), chunks[0]);

        let tables_area = match self.layout {
            DashboardLayout::Full => {
                f.render_widget(self.progress_gauge(), chunks[1]);

                let history: Vec<u64> = self.pending_history.iter().copied().collect();
                let sparkline = Sparkline::default()
                    .block(Block::default().title("Unmet eventually sequences (last 100 ticks)").borders(Borders::ALL))
                    .data(&history)
                    .style(Style::default().fg(Color::Yellow));
                f.render_widget(sparkline, chunks[2]);
                chunks[3]
            }
            DashboardLayout::Compact => chunks[1],
        };

        self.render_tables(f, tables_area);

        let footer = Paragraph::new("Press 'q' to close")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(footer, chunks[chunks.len() - 1]);
    }

    fn header(&self) -> Paragraph<'static> {
        let (tick, elapsed) = self
            .latest
            .as_ref()
            .map(|frame| (frame.world.tick, frame.elapsed_s))
            .unwrap_or((0, 0.0));

        let (state, color) = match &self.latest {
            None => ("WAITING", Color::DarkGray),
            Some(frame) if frame.always.count(ValidationStatus::Failed) > 0 => ("ALWAYS VIOLATED", Color::Red),
            Some(frame) if frame.eventually.sequences.iter().all(|s| s.status == ValidationStatus::Passed) => {
                ("EVENTUALLY MET", Color::Green)
            }
            Some(_) => ("RUNNING", Color::Yellow),
        };

        Paragraph::new(Line::from(vec![
            Span::styled("fieldtest", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  |  "),
            Span::styled(format!("t={:.2}s", elapsed), Style::default().fg(Color::Cyan)),
            Span::raw("  |  "),
            Span::raw(format!("Tick: {}", tick)),
            Span::raw("  |  "),
            Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]))
        .block(Block::default().borders(Borders::BOTTOM))
    }

    fn progress_gauge(&self) -> Gauge<'static> {
        let (passed, total) = self
            .latest
            .as_ref()
            .map(|frame| {
                (
                    frame.eventually.count(ValidationStatus::Passed),
                    frame.eventually.sequences.len(),
                )
            })
            .unwrap_or((0, 0));
        let ratio = if total > 0 { passed as f64 / total as f64 } else { 1.0 };

        Gauge::default()
            .block(Block::default().title("Eventually").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Green))
            .percent((ratio * 100.0) as u16)
            .label(format!("{}/{}", passed, total))
    }

    fn render_tables(&self, f: &mut Frame, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let empty = ValidationReport::default();
        let (always, eventually) = match &self.latest {
            Some(frame) => (&frame.always, &frame.eventually),
            None => (&empty, &empty),
        };

        f.render_widget(report_table("Always", always), halves[0]);
        f.render_widget(report_table("Eventually", eventually), halves[1]);
    }
}

fn report_table(title: &'static str, report: &ValidationReport) -> Table<'static> {
    let header_cells = ["Sequence", "Status", "Predicate"]
        .iter()
        .map(|h| Span::styled(*h, Style::default().add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = report
        .sequences
        .iter()
        .map(|seq| {
            let color = match seq.status {
                ValidationStatus::Passed => Color::Green,
                ValidationStatus::Pending => Color::Yellow,
                ValidationStatus::Failed => Color::Red,
            };
            Row::new(vec![
                Span::raw(seq.sequence.clone()),
                Span::styled(seq.status.to_string(), Style::default().fg(color)),
                Span::raw(seq.predicate.clone().unwrap_or_else(|| "-".to_string())),
            ])
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Length(9),
            Constraint::Percentage(55),
        ],
    )
    .header(header)
    .block(Block::default().title(title).borders(Borders::ALL))
}

impl Display for ValidationDashboard {
    fn close_signal(&self) -> CloseSignal {
        self.signal.clone()
    }

    fn show(&mut self) -> Result<(), EnvError> {
        self.run_terminal().map_err(EnvError::display)
    }
}

// =============================================================================
// TERMINAL
// =============================================================================

/// Raw mode and the alternate screen, restored on drop even if the draw loop errors.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // Undoes raw mode if entering the alternate screen fails
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

// =============================================================================
// TESTS
// =============================================================================
