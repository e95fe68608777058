use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::config::AppConfig;
use crate::error::TrackerError;
use crate::models::{AttendanceStatus, StudyData, SubjectId};
use crate::projector::{project_subject, Standing};
use crate::state::{AppState, ScheduledClass};
use crate::store::{load_study_or_default, Store};
use crate::models::WEEK_DAYS;
use crate::timer::{check_minutes, StudyTimer, TickOutcome, TimerState, MAX_SESSION_MINUTES};
use crate::tui::events::{Event, EventHandler, TICK_RATE};
use crate::tui::theme;
use crate::tui::widgets::statusbar::Notice;
use crate::tui::widgets::{classes, header, statusbar, streak, timer};
use crate::utils::format::{format_minutes, format_percent};

const NOTICE_SECS: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

pub struct App<'a> {
    store: &'a dyn Store,
    pub view: View,
    pub config: AppConfig,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub notice: Option<Notice>,

    pub state: AppState,
    pub study: StudyData,
    pub timer: StudyTimer,
    /// Index into `state.subjects` of the subject the timer will use.
    pub study_subject: Option<usize>,
    pub minutes: u32,

    pub today: NaiveDate,
    pub classes: Vec<ScheduledClass>,
}

impl<'a> App<'a> {
    pub fn new(store: &'a dyn Store, config: AppConfig) -> Self {
        let minutes = config.study.default_minutes.clamp(1, MAX_SESSION_MINUTES);
        let study = StudyData::with_goals(
            config.study.daily_goal_minutes,
            config.study.weekly_goal_minutes,
        );
        App {
            store,
            view: View::Dashboard,
            config,
            focus_idx: 0,
            should_quit: false,
            notice: None,
            state: AppState::default(),
            study,
            timer: StudyTimer::new(),
            study_subject: None,
            minutes,
            today: Local::now().date_naive(),
            classes: Vec::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        self.state = self.store.load_state()?;
        self.study = load_study_or_default(
            self.store,
            &self.config.profile.username,
            self.config.study.daily_goal_minutes,
            self.config.study.weekly_goal_minutes,
        )?;
        self.refresh_classes();
        self.follow_focus();
        if self.study_subject.is_none() && !self.state.subjects.is_empty() {
            self.study_subject = Some(0);
        }
        Ok(())
    }

    /// While idle, the study subject tracks the focused class.
    fn follow_focus(&mut self) {
        if self.timer.state() != TimerState::Idle {
            return;
        }
        if let Some(idx) = self
            .classes
            .get(self.focus_idx)
            .and_then(|c| self.subject_index(c.subject.id))
        {
            self.study_subject = Some(idx);
        }
    }

    fn refresh_classes(&mut self) {
        self.classes = self.state.classes_on(self.today);
        if self.focus_idx >= self.classes.len() {
            self.focus_idx = self.classes.len().saturating_sub(1);
        }
    }

    fn subject_index(&self, id: SubjectId) -> Option<usize> {
        self.state.subjects.iter().position(|s| s.id == id)
    }

    pub fn study_subject_id(&self) -> Option<SubjectId> {
        self.study_subject
            .and_then(|i| self.state.subjects.get(i))
            .map(|s| s.id)
    }

    fn study_subject_name(&self) -> Option<&str> {
        let id = self.timer.subject_id().or(self.study_subject_id())?;
        self.state.subject(id).map(|s| s.name.as_str())
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
            ttl_secs: NOTICE_SECS,
        });
    }

    fn notify_error(&mut self, err: &TrackerError) {
        log::warn!("{}", err);
        self.notice = Some(Notice {
            text: err.to_string(),
            is_error: true,
            ttl_secs: NOTICE_SECS,
        });
    }

    /// One second has passed.
    pub fn tick(&mut self, now: NaiveDateTime) {
        if let Some(n) = &mut self.notice {
            n.ttl_secs = n.ttl_secs.saturating_sub(1);
            if n.ttl_secs == 0 {
                self.notice = None;
            }
        }

        if now.date() != self.today {
            self.today = now.date();
            self.refresh_classes();
        }

        if self.timer.tick() == TickOutcome::Completed {
            self.stop_timer_at(now);
        }
    }

    pub fn mark_focused(&mut self, status: AttendanceStatus) {
        let Some(class) = self.classes.get(self.focus_idx).cloned() else {
            self.notify_error(&TrackerError::validation("No class selected"));
            return;
        };

        let mut next = self.state.clone();
        match next.mark(class.subject.id, self.today, &class.slot, status) {
            Ok(_) => {}
            Err(e) => return self.notify_error(&e),
        }
        // Keep the previous state if the write fails so memory matches disk.
        if let Err(e) = self.store.save_state(&next) {
            return self.notify_error(&e);
        }
        self.state = next;
        self.refresh_classes();
        self.notify(format!(
            "{} marked {}",
            class.subject.name,
            status.as_str()
        ));
    }

    pub fn start_timer_at(&mut self, now: NaiveDateTime) {
        match self.timer.start(self.study_subject_id(), self.minutes, now) {
            Ok(()) => self.notify(format!("Studying for {}", format_minutes(self.minutes))),
            Err(e) => self.notify_error(&e),
        }
    }

    pub fn start_with(
        &mut self,
        subject_id: SubjectId,
        minutes: u32,
        now: NaiveDateTime,
    ) -> Result<(), TrackerError> {
        self.minutes = check_minutes(minutes)?;
        self.study_subject = self.subject_index(subject_id);
        self.start_timer_at(now);
        Ok(())
    }

    pub fn stop_timer_at(&mut self, now: NaiveDateTime) {
        if self.timer.state() == TimerState::Idle {
            return;
        }
        let mut next = self.study.clone();
        match self.timer.stop(now, &mut next) {
            Some(session) => {
                // Only adopt the new session once it is on disk.
                if let Err(e) = self.store.save_study(&self.config.profile.username, &next) {
                    return self.notify_error(&e);
                }
                self.study = next;
                self.notify(format!(
                    "Session recorded: {} · streak {}",
                    format_minutes(session.duration_minutes),
                    self.study.streak
                ));
            }
            None => self.notify("Session under a minute, nothing recorded"),
        }
    }

    fn cycle_study_subject(&mut self) {
        if self.timer.state() != TimerState::Idle || self.state.subjects.is_empty() {
            return;
        }
        let n = self.state.subjects.len();
        self.study_subject = Some(match self.study_subject {
            Some(i) => (i + 1) % n,
            None => 0,
        });
    }

    fn adjust_minutes(&mut self, delta: i32) {
        if self.timer.state() != TimerState::Idle {
            return;
        }
        let next = self.minutes as i32 + delta;
        self.minutes = next.clamp(1, MAX_SESSION_MINUTES as i32) as u32;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let now = Local::now().naive_local();
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, now),
            View::Stats => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('s')) {
                    self.view = View::Dashboard;
                }
            }
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    self.view = View::Dashboard;
                }
            }
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, now: NaiveDateTime) {
        match key.code {
            KeyCode::Esc => {
                // Leaving ends any session in progress.
                self.stop_timer_at(now);
                self.should_quit = true;
            }
            KeyCode::Char('?') => self.view = View::Help,
            KeyCode::Char('s') => self.view = View::Stats,
            KeyCode::Up => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
                self.follow_focus();
            }
            KeyCode::Down => {
                if self.focus_idx + 1 < self.classes.len() {
                    self.focus_idx += 1;
                }
                self.follow_focus();
            }
            KeyCode::Char('p') | KeyCode::Enter => self.mark_focused(AttendanceStatus::Present),
            KeyCode::Char('a') => self.mark_focused(AttendanceStatus::Absent),
            KeyCode::Tab => self.cycle_study_subject(),
            KeyCode::Char('t') => self.start_timer_at(now),
            KeyCode::Char(' ') => {
                self.timer.toggle_pause();
            }
            KeyCode::Char('x') => self.stop_timer_at(now),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_minutes(5),
            KeyCode::Char('-') => self.adjust_minutes(-5),
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }
    }

    fn student_label(&self) -> String {
        match (self.state.student_name.is_empty(), self.state.roll_no.is_empty()) {
            (true, _) => self.config.profile.username.clone(),
            (false, true) => self.state.student_name.clone(),
            (false, false) => format!("{} · {}", self.state.student_name, self.state.roll_no),
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer[0],
            &self.student_label(),
            self.today,
            self.state.overall_percentage(),
        );
        statusbar::render(frame, outer[2], self.notice.as_ref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer[1]);

        classes::render(frame, columns[0], &self.classes, self.focus_idx);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(7)])
            .split(columns[1]);

        timer::render(
            frame,
            right[0],
            &self.timer,
            self.study_subject_name(),
            self.minutes,
        );
        streak::render(
            frame,
            right[1],
            self.study.current_streak(self.today),
            self.study.daily_progress(self.today),
            self.study.weekly_progress(self.today),
        );
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(12),
                Constraint::Length(9),
                Constraint::Min(0),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Attendance  ", theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(
                    "overall {} · target {}",
                    format_percent(self.state.overall_percentage()),
                    format_percent(self.config.attendance.target_percent)
                ),
                theme::dim(),
            ),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let target = self.config.attendance.target_percent;
        let limits = self.config.attendance.limits();
        let mut bars = Vec::new();
        let mut lines = vec![Line::from("")];
        for s in &self.state.subjects {
            let att = self.state.attendance(s.id);
            let pct = att.percentage();
            let (style, outcome) = match project_subject(&att, target, limits) {
                Ok(outcome) => {
                    let style = match Standing::of(&outcome) {
                        Standing::Safe => theme::green(),
                        Standing::AtRisk => theme::amber(),
                        Standing::Short => theme::red(),
                    };
                    (style, outcome.to_string())
                }
                Err(e) => (theme::red(), e.to_string()),
            };
            bars.push(
                Bar::default()
                    .label(Line::from(s.name.clone()))
                    .value(pct.round() as u64)
                    .text_value(format_percent(pct))
                    .style(style),
            );
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<18}", s.name), theme::bold()),
                Span::styled(format!("{:>3}/{:<3}  ", att.attended, att.total), theme::dim()),
                Span::styled(outcome, style),
            ]));
        }

        let chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(theme::border(false))
                    .style(theme::surface()),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(9)
            .bar_gap(2)
            .max(100);
        frame.render_widget(chart, chunks[1]);
        self.draw_week_chart(frame, chunks[2]);

        let by_subject = self.study.minutes_by_subject();
        if !by_subject.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("  Study time", theme::accent())));
            for (id, minutes) in &by_subject {
                let name = self
                    .state
                    .subject(*id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| format!("subject {}", id));
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<18}", name), theme::bold()),
                    Span::styled(format_minutes(*minutes), theme::dim()),
                ]));
            }
        }
        frame.render_widget(Paragraph::new(lines), chunks[3]);
    }

    fn draw_week_chart(&self, frame: &mut Frame, area: Rect) {
        let bars: Vec<Bar> = self
            .study
            .minutes_by_day(self.today, WEEK_DAYS as u32)
            .into_iter()
            .map(|(date, minutes)| {
                let style = if date == self.today {
                    theme::accent()
                } else {
                    theme::green()
                };
                Bar::default()
                    .label(Line::from(date.format("%a").to_string()))
                    .value(minutes as u64)
                    .text_value(format!("{}m", minutes))
                    .style(style)
            })
            .collect();

        let chart = BarChart::default()
            .block(
                Block::default()
                    .title(Span::styled(" Study, last 7 days ", theme::accent()))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(theme::border(false))
                    .style(theme::surface()),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(5)
            .bar_gap(2);
        frame.render_widget(chart, area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let y = area.height / 4;
        let popup_area = Rect {
            x: area.width / 4,
            y,
            width: area.width / 2,
            height: (area.height / 2).max(14).min(area.height.saturating_sub(y)),
        };
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[p] / Enter", "Mark focused class present"),
            ("[a]", "Mark focused class absent"),
            ("[↑ ↓]", "Move between classes"),
            ("[Tab]", "Choose subject to study"),
            ("[+ -]", "Adjust session length"),
            ("[t]", "Start study timer"),
            ("[space]", "Pause / resume"),
            ("[x]", "Stop and record session"),
            ("[s]", "Attendance stats"),
            ("[Esc]", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, what) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<13}", key), theme::accent()),
                Span::styled(what, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the TUI event loop, optionally starting a study session right away.
pub fn run(store: &dyn Store, config: AppConfig, start: Option<(SubjectId, u32)>) -> Result<()> {
    let mut app = App::new(store, config);
    app.load()?;
    if let Some((subject_id, minutes)) = start {
        app.start_with(subject_id, minutes, Local::now().naive_local())?;
    }

    let mut terminal = ratatui::init();
    let events = EventHandler::new(TICK_RATE);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key);
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Tick) => app.tick(Local::now().naive_local()),
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    result
}
