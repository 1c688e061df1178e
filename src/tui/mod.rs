//! Ratatui-based rating form.
//!
//! The form has one rating control (ten labelled levels), a submit control that
//! shows a loading state, and three dismissible notices (success, error,
//! geo-error) that clear themselves when their deadline passes.

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};

use crate::config::Config;
use crate::domain::{LEVELS, Rating, ValidationError};
use crate::error::AppError;
use crate::geo::Locator;
use crate::remote::Endpoint;
use crate::workflow::{AttemptId, Clock, NoticeSlot, StatusBoard, Workflow};

const CELL_WIDTH: u16 = 5;
const DEFAULT_LEVEL: i64 = 5;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Start the TUI.
pub fn run(config: &Config) -> Result<(), AppError> {
    let (workflow, board) = crate::app::build_workflow(config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(workflow, board);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<L, E, C> {
    workflow: Workflow<L, E, C>,
    board: StatusBoard,
    selected: Option<Rating>,
    field_error: Option<ValidationError>,
    /// Opened on submit, run after the loading state has been drawn.
    pending: Option<(AttemptId, Rating)>,
}

impl<L: Locator, E: Endpoint, C: Clock> App<L, E, C> {
    fn new(workflow: Workflow<L, E, C>, board: StatusBoard) -> Self {
        Self {
            workflow,
            board,
            selected: None,
            field_error: None,
            pending: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.board.tick(Instant::now()) {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // The loading state is on screen; now block on the attempt.
            if self.run_pending() {
                needs_redraw = true;
                continue;
            }

            if !event::poll(self.poll_wait(Instant::now()))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.select(self.selected.map(Rating::prev)),
            KeyCode::Right => self.select(self.selected.map(Rating::next)),
            KeyCode::Char(c @ '0'..='9') => {
                let value = if c == '0' { 10 } else { i64::from(c as u8 - b'0') };
                self.select(Rating::new(value).ok());
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.submit(),
            KeyCode::Char('s') => self.board.dismiss(NoticeSlot::Success),
            KeyCode::Char('e') => self.board.dismiss(NoticeSlot::Error),
            KeyCode::Char('g') => self.board.dismiss(NoticeSlot::GeoError),
            KeyCode::Char('x') => self.board.dismiss_all(),
            _ => {}
        }
        false
    }

    /// Wake up no later than the next notice deadline.
    fn poll_wait(&self, now: Instant) -> Duration {
        self.board
            .next_deadline()
            .map_or(POLL_INTERVAL, |d| d.saturating_duration_since(now).min(POLL_INTERVAL))
    }

    fn select(&mut self, rating: Option<Rating>) {
        // Arrow keys on an empty control start from the middle of the scale.
        self.selected = rating.or_else(|| Rating::new(DEFAULT_LEVEL).ok());
        self.field_error = None;
    }

    fn submit(&mut self) {
        // The disabled submit control: one attempt at a time.
        if self.board.is_submitting() {
            return;
        }
        match Rating::from_selection(self.selected.map(Rating::value)) {
            Ok(rating) => {
                self.field_error = None;
                let attempt = self.board.begin();
                self.pending = Some((attempt, rating));
            }
            Err(err) => self.field_error = Some(err),
        }
    }

    fn run_pending(&mut self) -> bool {
        let Some((attempt, rating)) = self.pending.take() else {
            return false;
        };
        self.workflow.run(attempt, rating, &mut self.board);
        true
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_rating(frame, chunks[1]);
        self.draw_submit(frame, chunks[2]);
        self.draw_notices(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("rate", Style::default().fg(Color::Green)),
            Span::raw(" · how is your energy right now?"),
        ]);
        let p = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_rating(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chosen = self.selected.map(Rating::value).unwrap_or(0);
        let mut faces = Vec::with_capacity(LEVELS.len());
        let mut numbers = Vec::with_capacity(LEVELS.len());
        for level in &LEVELS {
            let style = if level.value <= chosen {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            // Emoji render two columns wide.
            faces.push(Span::styled(format!(" {}  ", level.emoji), style));
            numbers.push(Span::styled(
                format!("{:^width$}", level.value, width = CELL_WIDTH as usize),
                style,
            ));
        }

        let mut lines = vec![Line::from(faces), Line::from(numbers)];
        if let Some(err) = &self.field_error {
            lines.push(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Red),
            )));
        }

        let title = if self.field_error.is_some() { "Rating *" } else { "Rating" };
        let border = if self.field_error.is_some() { Color::Red } else { Color::Gray };
        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            );
        frame.render_widget(p, area);
    }

    fn draw_submit(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (label, style) = if self.board.is_submitting() {
            ("Submitting…", Style::default().fg(Color::DarkGray))
        } else {
            (
                "Submit",
                Style::default().fg(Color::White).bg(Color::Green).add_modifier(Modifier::BOLD),
            )
        };
        let p = Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_notices(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines = Vec::new();
        if let Some(n) = self.board.notice(NoticeSlot::Success) {
            lines.push(Line::from(Span::styled(
                n.message.clone(),
                Style::default().fg(Color::Green),
            )));
        }
        if let Some(n) = self.board.notice(NoticeSlot::Error) {
            lines.push(Line::from(Span::styled(
                format!("⚠️ {}", n.message),
                Style::default().fg(Color::Red),
            )));
        }
        if let Some(n) = self.board.notice(NoticeSlot::GeoError) {
            lines.push(Line::from(Span::styled(
                format!("⚠️ {}", n.message),
                Style::default().fg(Color::Yellow),
            )));
        }

        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(Block::default().title("Status").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ or 1-9,0 pick  Enter submit  s/e/g dismiss one  x dismiss all  q quit";
        let p = Paragraph::new(Span::styled(help, Style::default().fg(Color::Gray)))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::domain::{Coordinates, RemoteReply, SubmissionPayload};
    use crate::geo::{DeniedLocator, FixedLocator, PositionOptions};
    use crate::remote::SubmitError;
    use crate::workflow::{NoticeKind, SubmissionStatus, SystemClock};

    struct AlwaysOk;

    impl Endpoint for AlwaysOk {
        fn submit(&self, _payload: &SubmissionPayload) -> Result<RemoteReply, SubmitError> {
            Ok(RemoteReply {
                success: true,
                message: None,
            })
        }
    }

    fn app<L: Locator>(locator: L) -> App<L, AlwaysOk, SystemClock> {
        let workflow = Workflow::new(locator, AlwaysOk, PositionOptions::default());
        App::new(workflow, StatusBoard::new(Duration::from_secs(3)))
    }

    fn screen(buffer: &ratatui::buffer::Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn submitting_without_selection_shows_required() {
        let mut app = app(DeniedLocator);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.field_error, Some(ValidationError::Required));
        assert!(app.pending.is_none());
        assert_eq!(app.board.status(), SubmissionStatus::Idle);

        app.handle_key(KeyCode::Right);
        assert_eq!(app.selected.map(Rating::value), Some(5));
        assert_eq!(app.field_error, None);
    }

    #[test]
    fn keys_pick_levels() {
        let mut app = app(DeniedLocator);
        app.handle_key(KeyCode::Char('0'));
        assert_eq!(app.selected.map(Rating::value), Some(10));
        app.handle_key(KeyCode::Right);
        assert_eq!(app.selected.map(Rating::value), Some(10));
        app.handle_key(KeyCode::Char('1'));
        app.handle_key(KeyCode::Left);
        assert_eq!(app.selected.map(Rating::value), Some(1));
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn submit_shows_loading_then_runs_once() {
        let pos = Coordinates::new(37.7749, -122.4194).unwrap();
        let mut app = app(FixedLocator::new(pos));
        app.handle_key(KeyCode::Char('7'));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.board.status(), SubmissionStatus::Submitting);

        // A second press while submitting is ignored.
        app.handle_key(KeyCode::Enter);
        let (first, _) = app.pending.expect("pending attempt");
        assert_eq!(app.board.current_attempt(), Some(first));

        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        assert!(screen(terminal.backend().buffer()).contains("Submitting…"));

        assert!(app.run_pending());
        assert!(!app.run_pending());
        assert_eq!(app.board.status(), SubmissionStatus::Success);

        terminal.draw(|f| app.draw(f)).unwrap();
        assert!(screen(terminal.backend().buffer()).contains("Submitted successfully!"));

        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.board.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn notices_dismiss_one_at_a_time() {
        let mut app = app(DeniedLocator);
        app.handle_key(KeyCode::Char('4'));
        app.handle_key(KeyCode::Enter);
        app.run_pending();
        assert!(app.board.notice(NoticeSlot::GeoError).is_some());
        assert!(app.board.notice(NoticeSlot::Success).is_some());

        app.handle_key(KeyCode::Char('g'));
        assert!(app.board.notice(NoticeSlot::GeoError).is_none());
        assert!(app.board.notice(NoticeSlot::Success).is_some());
        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.board.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn poll_wait_shrinks_near_a_deadline() {
        let mut app = app(DeniedLocator);
        let now = Instant::now();
        assert_eq!(app.poll_wait(now), POLL_INTERVAL);

        let attempt = app.board.begin();
        app.board.raise(attempt, NoticeKind::Success, "ok", now);
        let deadline = app.board.next_deadline().expect("deadline");
        assert_eq!(app.poll_wait(now), POLL_INTERVAL);
        assert_eq!(
            app.poll_wait(deadline - Duration::from_millis(30)),
            Duration::from_millis(30)
        );
        assert_eq!(app.poll_wait(deadline + Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn draws_validation_message_inline() {
        let mut app = app(DeniedLocator);
        app.handle_key(KeyCode::Enter);
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        assert!(screen(terminal.backend().buffer()).contains("Rating is required"));
    }
}
