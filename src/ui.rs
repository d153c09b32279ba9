use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lobbyist_registry::{Command, CommandKind, Config};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use rusqlite::Connection;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

const PAGE: usize = 20;

/// Input being collected for a command
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: CommandKind,
    pub answers: Vec<String>,
    pub input: String,
}

impl Prompt {
    fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            answers: Vec::new(),
            input: String::new(),
        }
    }

    pub fn question(&self) -> &'static str {
        self.kind.prompts().get(self.answers.len()).copied().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Prompt(Prompt),
}

pub struct App {
    conn: Connection,
    display_cap: usize,
    output_file: PathBuf,
    pub transcript: Vec<String>,
    pub mode: Mode,
    pub status: String,
    /// Lines scrolled up from the bottom; 0 follows new output
    pub scroll_back: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(conn: Connection, config: &Config) -> Self {
        let mut app = Self {
            conn,
            display_cap: config.display_cap,
            output_file: config.output_file.clone(),
            transcript: Vec::new(),
            mode: Mode::Normal,
            status: "Ready".to_string(),
            scroll_back: 0,
            should_quit: false,
        };

        app.transcript
            .push("** Welcome to the Chicago Lobbyist Database Application **".to_string());
        app.transcript.push(String::new());
        app.execute(Command::GeneralStats, CommandKind::GeneralStats);
        app.status = "Ready".to_string();

        app
    }

    /// Begin a command: run it now if it needs no input, otherwise prompt.
    pub fn start(&mut self, kind: CommandKind) {
        if kind.prompts().is_empty() {
            match kind.build(&[]) {
                Ok(command) => self.execute(command, kind),
                Err(e) => self.report_input_error(e.to_string()),
            }
        } else {
            self.mode = Mode::Prompt(Prompt::new(kind));
            self.status = format!("{}: Enter to submit, Esc to cancel", kind.title());
        }
    }

    fn submit(&mut self) {
        let mut prompt = match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Prompt(p) => p,
            Mode::Normal => return,
        };

        prompt.answers.push(std::mem::take(&mut prompt.input));
        if prompt.answers.len() < prompt.kind.prompts().len() {
            self.mode = Mode::Prompt(prompt);
            return;
        }

        match prompt.kind.build(&prompt.answers) {
            Ok(command) => self.execute(command, prompt.kind),
            Err(e) => self.report_input_error(e.to_string()),
        }
    }

    fn execute(&mut self, command: Command, kind: CommandKind) {
        info!(?command, "running command");
        command.run(&self.conn, self.display_cap, &mut self.transcript);
        self.scroll_back = 0;
        self.status = format!("{} finished", kind.title());
    }

    fn report_input_error(&mut self, message: String) {
        self.transcript.push(String::new());
        self.transcript.push(message);
        self.scroll_back = 0;
        self.status = "Invalid input".to_string();
    }

    pub fn cancel(&mut self) {
        if let Mode::Prompt(p) = &self.mode {
            self.status = format!("{} cancelled", p.kind.title());
        }
        self.mode = Mode::Normal;
    }

    pub fn clear_output(&mut self) {
        self.transcript.clear();
        self.scroll_back = 0;
        self.status = "Output cleared".to_string();
    }

    /// Write the transcript to the configured output file.
    pub fn save_output(&mut self) -> lobbyist_registry::Result<PathBuf> {
        let mut text = format!(
            "# Chicago Lobbyist Database output, saved {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        for line in &self.transcript {
            text.push_str(line);
            text.push('\n');
        }

        fs::write(&self.output_file, text)?;
        Ok(self.output_file.clone())
    }

    fn save_and_report(&mut self) {
        match self.save_output() {
            Ok(path) => self.status = format!("Saved output to {}", path.display()),
            Err(e) => {
                error!(%e, "saving transcript failed");
                self.status = "Save failed".to_string();
            }
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.transcript.len().saturating_sub(1);
        self.scroll_back = (self.scroll_back + lines).min(max);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save_and_report(),
                KeyCode::Char('q') | KeyCode::Char('c') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        if matches!(self.mode, Mode::Prompt(_)) {
            self.handle_prompt_key(key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(kind) = CommandKind::from_key(c) {
                    self.start(kind);
                }
            }
            KeyCode::Char('c') => self.clear_output(),
            KeyCode::Char('s') => self.save_and_report(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(PAGE),
            KeyCode::PageDown => self.scroll_down(PAGE),
            KeyCode::Home => self.scroll_up(self.transcript.len()),
            KeyCode::End => self.scroll_back = 0,
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => self.cancel(),
            KeyCode::Backspace => {
                if let Mode::Prompt(p) = &mut self.mode {
                    p.input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Mode::Prompt(p) = &mut self.mode {
                    p.input.push(c);
                }
            }
            _ => {}
        }
    }

    /// The slice of the transcript visible in `height` rows.
    pub fn visible_lines(&self, height: usize) -> &[String] {
        let end = self.transcript.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        &self.transcript[start..end]
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(%err, "terminal UI stopped with an error");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let prompt_height = if matches!(app.mode, Mode::Prompt(_)) { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Command toolbar
            Constraint::Min(0),                // Transcript
            Constraint::Length(prompt_height), // Input prompt
            Constraint::Length(3),             // Status bar
        ])
        .split(f.size());

    render_toolbar(f, chunks[0]);
    render_transcript(f, chunks[1], app);
    if let Mode::Prompt(prompt) = &app.mode {
        render_prompt(f, chunks[2], prompt);
    }
    render_status_bar(f, chunks[3], app);
}

fn render_toolbar(f: &mut Frame, area: Rect) {
    let mut spans = vec![];
    for (i, kind) in CommandKind::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        spans.push(Span::styled(
            kind.key().to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(": "));
        spans.push(Span::raw(kind.title()));
    }

    let toolbar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Chicago Lobbyist Database "),
    );

    f.render_widget(toolbar, area);
}

fn render_transcript(f: &mut Frame, area: Rect, app: &App) {
    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .visible_lines(height)
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();

    let title = if app.scroll_back > 0 {
        format!(" Output (↑{}) ", app.scroll_back)
    } else {
        " Output ".to_string()
    };

    let transcript = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );

    f.render_widget(transcript, area);
}

fn render_prompt(f: &mut Frame, area: Rect, prompt: &Prompt) {
    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::raw(prompt.input.as_str()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", prompt.question())),
    );

    f.render_widget(input, area);

    let cursor_x = area.x + 3 + prompt.input.chars().count() as u16;
    f.set_cursor(cursor_x.min(area.right().saturating_sub(2)), area.y + 1);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" {} ", app.status),
        Style::default().fg(Color::Cyan),
    )];

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("0-5", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Command | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Scroll | "));
    status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Clear | "));
    status_spans.push(Span::styled("s", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Save | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
