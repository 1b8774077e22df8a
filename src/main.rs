mod app;
mod event;
mod logging;
mod ui;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing::{error, info, warn};

use examdrill::bank::audit::audit;
use examdrill::bank::library::BankLibrary;
use examdrill::config::{Config, StoreBackend};
use examdrill::engine::classify::QuestionKind;
use examdrill::engine::filter::ViewMode;
use examdrill::export::text::PlainTextRenderer;
use examdrill::export::write_export;
use examdrill::session::{Navigator, Screen};

use app::{App, Focus, StatusKind};
use event::AppEvent;
use ui::components::filter_panel::{FilterPanel, FilterRow};
use ui::components::handwriting_card::HandwritingCard;
use ui::components::question_card::QuestionCard;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "examdrill",
    version,
    about = "Terminal exam practice with favorites and missed-question review"
)]
struct Cli {
    #[arg(short, long, help = "User name the progress row is stored under")]
    user: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory with question banks, overriding the bundled ones")]
    bank_dir: Option<PathBuf>,

    #[arg(long, help = "Progress table JSON file (selects the file backend)")]
    store_file: Option<PathBuf>,

    #[arg(long, help = "Progress table URL (selects the http backend)")]
    store_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Check every bundled or configured bank for malformed options
    Validate,
    /// Write a filtered question set to a printable text file
    Export(ExportArgs),
    /// Write the current configuration to the config file
    InitConfig,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long, help = "Exam prefix, e.g. Law")]
    exam: String,
    #[arg(long, help = "Subject; defaults to the first one in the bank")]
    subject: Option<String>,
    #[arg(long, default_value = "normal", help = "normal, favorites or missed")]
    mode: ViewMode,
    #[arg(long = "year", help = "Restrict to a year; repeatable")]
    years: Vec<u32>,
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long, help = "Output directory; defaults to export_dir from the config")]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // A missing log file only costs diagnostics.
    let log_path = logging::init().ok();

    let mut config = Config::load().context("cannot read config file")?;
    apply_overrides(&mut config, &cli);
    config.validate();
    info!(user = %config.username, log = ?log_path, "starting");

    match cli.command {
        Some(Command::Validate) => run_validate(&config),
        Some(Command::Export(args)) => run_export(&config, args).map(|()| ExitCode::SUCCESS),
        Some(Command::InitConfig) => {
            config.save()?;
            println!("wrote {}", Config::config_path().display());
            Ok(ExitCode::SUCCESS)
        }
        None => run_tui(config).map(|()| ExitCode::SUCCESS),
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(user) = &cli.user {
        config.username = user.clone();
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if let Some(dir) = &cli.bank_dir {
        config.bank_dir = Some(dir.to_string_lossy().to_string());
    }
    if let Some(file) = &cli.store_file {
        config.store.backend = StoreBackend::File;
        config.store.file_path = file.to_string_lossy().to_string();
    }
    if let Some(url) = &cli.store_url {
        config.store.backend = StoreBackend::Http;
        config.store.url = Some(url.clone());
    }
}

fn open_navigator(config: &Config) -> Result<Navigator> {
    let library = BankLibrary::new(config.bank_dir());
    let catalog = library.catalog()?;
    let store = config.store.open()?;
    Ok(Navigator::new(&config.username, catalog, library, store))
}

fn run_validate(config: &Config) -> Result<ExitCode> {
    let mut library = BankLibrary::new(config.bank_dir());
    let catalog = library.catalog()?;
    let mut problems = 0;

    for exam in &catalog.exams {
        match library.questions(&exam.bank) {
            Ok(bank) => {
                let report = audit(&bank);
                println!(
                    "{} [{}] {}: {} questions ({} single, {} multi-select, {} disputed)",
                    exam.name,
                    exam.prefix,
                    exam.bank,
                    report.total(),
                    report.count(QuestionKind::Single),
                    report.count(QuestionKind::Multiple),
                    report.count(QuestionKind::Disputed),
                );
                if !report.is_clean() {
                    for (id, err) in &report.malformed {
                        println!("  question {id}: {err}");
                    }
                    problems += report.malformed.len();
                }
            }
            Err(err) => {
                println!("{} [{}]: {err}", exam.name, exam.prefix);
                problems += 1;
            }
        }
        if let Some(file) = &exam.handwriting {
            match library.handwriting(file) {
                Ok(bank) => println!("  {file}: {} prompts", bank.len()),
                Err(err) => {
                    println!("  {err}");
                    problems += 1;
                }
            }
        }
    }

    if problems > 0 {
        println!("{problems} problem(s) found");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_export(config: &Config, request: ExportArgs) -> Result<()> {
    let mut nav = open_navigator(config)?;
    if let Some(warning) = nav.enter_exam(&request.exam)? {
        eprintln!("warning: {warning}");
    }

    let subjects = nav.subjects();
    let subject = match request.subject {
        Some(s) if subjects.contains(&s) => s,
        Some(s) => bail!("subject {s} not in {} (have: {})", request.exam, subjects.join(", ")),
        None => match subjects.first() {
            Some(s) => s.clone(),
            None => bail!("{} has no questions", request.exam),
        },
    };
    nav.enter_subject(&subject)?;
    nav.set_mode(request.mode);
    if !request.years.is_empty() {
        nav.set_years(request.years);
    }
    if let Some(keyword) = &request.keyword {
        nav.set_keyword(keyword);
    }

    let Some(document) = nav.print_document() else {
        bail!("nothing to export");
    };
    let dir = request
        .out
        .unwrap_or_else(|| PathBuf::from(&config.export_dir));
    let renderer = PlainTextRenderer::new(config.export_page_lines);
    let path = write_export(&document, &renderer, &dir)?;
    println!("{} questions -> {}", document.entries.len(), path.display());
    Ok(())
}

fn run_tui(config: Config) -> Result<()> {
    let loaded = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, available = ?Theme::available_themes(), "unknown theme, using default");
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(loaded));
    let nav = open_navigator(&config)?;
    let mut app = App::new(config, nav, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match event::next_event(Duration::from_millis(250))? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Resize => {}
            AppEvent::Idle => app.expire_status(),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.keyword_input.is_some() {
        app.handle_keyword_key(key);
        return;
    }
    if app.draft_input.is_some() {
        app.handle_draft_key(key);
        return;
    }

    match app.nav.screen() {
        Screen::ExamSelect | Screen::SubjectSelect => handle_menu_key(app, key),
        Screen::Quiz => match app.focus {
            Focus::Question => handle_question_key(app, key),
            Focus::Filters => handle_filter_key(app, key),
        },
        Screen::Handwriting => handle_handwriting_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc if app.nav.screen() == Screen::ExamSelect => app.should_quit = true,
        KeyCode::Esc => app.go_back(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.activate_menu(app.menu.selected),
        KeyCode::Char(ch) => {
            if let Some(index) = app.menu.index_of_key(ch) {
                app.menu.selected = index;
                app.activate_menu(index);
            }
        }
        _ => {}
    }
}

fn handle_question_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Tab => app.focus = Focus::Filters,
        KeyCode::Char(ch @ '1'..='9') => {
            let index = ch as usize - '1' as usize;
            app.pick_option(index);
        }
        KeyCode::Char(ch @ 'a'..='d') => app.pick_letter(ch),
        KeyCode::Enter => app.submit(),
        KeyCode::Right | KeyCode::Char('n') => app.next_question(),
        KeyCode::Left | KeyCode::Char('p') => app.prev_question(),
        KeyCode::Char('f') => app.toggle_favorite(),
        KeyCode::Char('m') => app.cycle_mode(),
        KeyCode::Char('w') => app.save_now(),
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('/') => app.start_keyword_edit(),
        _ => {}
    }
}

fn handle_filter_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.focus = Focus::Question,
        KeyCode::Up | KeyCode::Char('k') => app.filter_row = app.filter_row.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.filter_row = app.filter_row.next(),
        KeyCode::Left | KeyCode::Char('h') => app.adjust_filter(false),
        KeyCode::Right | KeyCode::Char('l') => app.adjust_filter(true),
        KeyCode::Char(' ') if app.filter_row == FilterRow::Years => app.toggle_year_at_cursor(),
        KeyCode::Enter | KeyCode::Char('/') if app.filter_row == FilterRow::Keyword => {
            app.start_keyword_edit()
        }
        KeyCode::Enter if app.filter_row == FilterRow::Years => app.toggle_year_at_cursor(),
        _ => {}
    }
}

fn handle_handwriting_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_back(),
        KeyCode::Right | KeyCode::Char('n') => app.handwriting_step(true),
        KeyCode::Left | KeyCode::Char('p') => app.handwriting_step(false),
        KeyCode::Char(ch @ '1'..='9') => {
            app.toggle_handwriting_year(ch as usize - '1' as usize);
        }
        KeyCode::Char('t') => app.cycle_handwriting_kind(),
        KeyCode::Char('r') => app.show_reference = !app.show_reference,
        KeyCode::Char(' ') => app.toggle_practiced(),
        KeyCode::Char('w') => app.save_now(),
        KeyCode::Enter | KeyCode::Char('i') => app.start_draft_edit(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.nav.screen() {
        Screen::ExamSelect | Screen::SubjectSelect => render_menu(frame, app),
        Screen::Quiz => render_quiz(frame, app),
        Screen::Handwriting => render_handwriting(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let ctx = app.nav.context();
    let mut info = format!(" {}", ctx.username());
    if let Some(exam) = ctx.exam() {
        info.push_str(&format!(" | {}", exam.name));
    }
    if let Some(subject) = ctx.subject() {
        info.push_str(&format!(" | {subject} | {}", ctx.mode().label()));
    }
    info.push_str(&format!(
        " | ★ {} ✗ {}",
        ctx.progress().favorites.len(),
        ctx.progress().missed.len()
    ));

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " examdrill ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(colors.muted()).bg(colors.header_bg())),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

/// Key hints, with the status message (if any) taking the last line.
fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.success(),
            StatusKind::Warning => colors.warning(),
            StatusKind::Error => colors.error(),
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color),
        )));
    }
    let skip = lines.len().saturating_sub(area.height as usize);
    let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
    frame.render_widget(Paragraph::new(visible), area);
}

fn footer_height(app: &App, hints: &[&str], width: u16) -> u16 {
    let hint_lines = pack_hint_lines(hints, width as usize).len();
    let status = usize::from(app.status.is_some());
    (hint_lines + status).clamp(1, 4) as u16
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let hints: &[&str] = if app.nav.screen() == Screen::ExamSelect {
        &["[↑↓] Move", "[Enter] Open", "[1-9] Jump", "[q] Quit"]
    } else {
        &["[↑↓] Move", "[Enter] Open", "[h] Handwriting", "[Esc] Back", "[q] Quit"]
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(footer_height(app, hints, area.width)),
        ])
        .split(area);

    render_header(frame, app, layout[0]);
    let menu_area = ui::layout::centered_rect(60, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);
    render_footer(frame, app, layout[2], hints);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let hints: &[&str] = match app.focus {
        Focus::Question => &[
            "[1-9/a-d] Choose",
            "[Enter] Submit",
            "[←→] Prev/Next",
            "[f] Favorite",
            "[m] Mode",
            "[/] Search",
            "[w] Save",
            "[e] Export",
            "[Tab] Filters",
            "[Esc] Back",
        ],
        Focus::Filters => &[
            "[↑↓] Row",
            "[←→] Change",
            "[Space] Toggle year",
            "[Enter] Edit search",
            "[Tab] Questions",
        ],
    };
    let layout = AppLayout::new(area, footer_height(app, hints, area.width));
    render_header(frame, app, layout.header);

    let ctx = app.nav.context();
    let filter = ctx.filter();
    let pool = app.nav.pool();

    let years = app
        .nav
        .available_years()
        .into_iter()
        .map(|y| (y, filter.years.contains(&y)))
        .collect();
    let panel = FilterPanel {
        mode_label: ctx.mode().label(),
        years,
        year_cursor: app.year_cursor,
        keyword: &filter.keyword,
        keyword_input: app.keyword_input.as_ref(),
        categories: &pool.categories,
        category: &filter.category,
        sub_categories: &pool.sub_categories,
        sub_category: &filter.sub_category,
        pool_size: pool.questions.len(),
        active: (app.focus == Focus::Filters).then_some(app.filter_row),
        theme: app.theme,
    };
    frame.render_widget(&panel, layout.panel);

    let index = app
        .question_index
        .min(pool.questions.len().saturating_sub(1));
    let question = pool.questions.get(index).copied();
    let outcome = match (&app.outcome, question) {
        (Some((id, outcome)), Some(q)) if id == &q.id => Some(outcome),
        _ => None,
    };
    let card = QuestionCard {
        question,
        position: (index, pool.questions.len()),
        selected: &app.selected,
        outcome,
        is_favorite: question.is_some_and(|q| ctx.progress().is_favorite(&q.id)),
        is_missed: question.is_some_and(|q| ctx.progress().is_missed(&q.id)),
        focused: app.focus == Focus::Question,
        theme: app.theme,
    };
    frame.render_widget(&card, layout.main);

    render_footer(frame, app, layout.footer, hints);
}

fn render_handwriting(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let step_hint = app
        .nav
        .handwriting()
        .and_then(|drill| match (drill.has_prev(), drill.has_next()) {
            (true, true) => Some("[←→] Prev/Next"),
            (true, false) => Some("[←] Prev"),
            (false, true) => Some("[→] Next"),
            (false, false) => None,
        });
    let hints: Vec<&str> = if app.draft_input.is_some() {
        vec!["[Esc] Done editing"]
    } else {
        step_hint
            .into_iter()
            .chain([
                "[1-9] Toggle year",
                "[t] Type",
                "[Enter] Write",
                "[r] Reference",
                "[Space] Practiced",
                "[Esc] Back",
            ])
            .collect()
    };
    let hints = hints.as_slice();
    let layout = AppLayout::new(area, footer_height(app, hints, area.width));
    render_header(frame, app, layout.header);

    let Some(drill) = app.nav.handwriting() else {
        render_footer(frame, app, layout.footer, hints);
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        "Years",
        Style::default().fg(colors.accent()),
    ))];
    for (i, year) in drill.available_years().into_iter().enumerate() {
        let mark = if drill.years().contains(&year) { "x" } else { " " };
        lines.push(Line::from(Span::styled(
            format!(" {} [{mark}] {year}", i + 1),
            Style::default().fg(colors.fg()),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Type",
        Style::default().fg(colors.accent()),
    )));
    lines.push(Line::from(Span::styled(
        format!(" {}", drill.kind().label()),
        Style::default().fg(colors.fg()),
    )));
    let panel = Paragraph::new(lines)
        .block(Block::bordered().border_style(Style::default().fg(colors.border())))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, layout.panel);

    let question = drill.current();
    let draft = app
        .draft_input
        .as_ref()
        .map(|input| input.value())
        .unwrap_or(drill.draft());
    let card = HandwritingCard {
        question,
        position: drill.position(),
        practiced: question.is_some_and(|q| app.nav.context().progress().is_favorite(&q.id)),
        draft,
        editing: app.draft_input.is_some(),
        show_reference: app.show_reference,
        theme: app.theme,
    };
    frame.render_widget(&card, layout.main);

    render_footer(frame, app, layout.footer, hints);
}
