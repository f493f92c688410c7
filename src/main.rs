use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use ranked_board::cache_store::CacheStore;
use ranked_board::config::{self, Config};
use ranked_board::leaderboard_render::{
    EMPTY_TABLE_MESSAGE, FeatureCard, RankBadge, StreakCell, TableRow, feature_cards, render_rows,
};
use ranked_board::logging;
use ranked_board::match_render::{MatchPlayerCard, TeamOutcome, TeamPanel, render_match};
use ranked_board::provider;
use ranked_board::state::{
    self, AppState, MatchPanel, ProviderCommand, Screen, apply_delta, leaderboard_status_label,
    match_status_label,
};
use ranked_board::view_model::visible_range;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search.editing {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.state.toggle_screen(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.send(ProviderCommand::RefreshLeaderboard, "Leaderboard refresh")
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.send(ProviderCommand::RefreshMatch, "Match refresh")
            }
            KeyCode::Char('D') => self.send(ProviderCommand::LoadDemoMatch, "Demo match"),
            KeyCode::Char('/') => {
                self.state.screen = Screen::Leaderboard;
                self.state.search.editing = true;
            }
            KeyCode::Char('x') => {
                self.state.search.clear();
                self.state.apply_search("");
            }
            KeyCode::Char('n') | KeyCode::Right => self.state.next_page(),
            KeyCode::Char('p') | KeyCode::Left => self.state.prev_page(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.state.search.editing = false,
            KeyCode::Backspace => self.state.search.backspace(now),
            KeyCode::Char(c) => self.state.search.push_char(c, now),
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand, label: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {label} unavailable"));
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {label} request failed"));
        } else {
            self.state.push_log(format!("[INFO] {label} requested"));
        }
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let config = Config::from_env();
    logging::init_logging(&config);
    let cache = CacheStore::from_path(config.cache_file());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(config, cache, tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        if let Some(term) = app.state.search.poll(Instant::now()) {
            app.state.apply_search(&term);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Leaderboard => render_leaderboard(frame, chunks[1], &app.state),
        Screen::Match => render_match_screen(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Leaderboard => "RANKED BOARD | LEADERBOARD",
        Screen::Match => "RANKED BOARD | LATEST MATCH",
    };
    format!(
        "{title}\nBoard: {} | Match: {}",
        leaderboard_status_label(&state.board_status),
        match_status_label(state)
    )
}

fn footer_text(state: &AppState) -> String {
    let keys = if state.search.editing {
        "Type to search | Backspace Edit | Enter/Esc Done".to_string()
    } else {
        "Tab View | r Refresh board | m Refresh match | / Search | x Clear | ←/→ Page | ? Help | q Quit"
            .to_string()
    };
    format!("{keys}\n{}", console_text(state))
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(2);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_leaderboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_feature_cards(frame, sections[0], &feature_cards(state.board.full()));
    render_search_line(frame, sections[1], state);
    render_table(frame, sections[2], state);
    render_page_line(frame, sections[3], state);
}

fn render_feature_cards(frame: &mut Frame, area: Rect, cards: &[FeatureCard]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (idx, col) in cols.iter().enumerate() {
        let Some(card) = cards.get(idx) else {
            let empty = Paragraph::new("-")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, *col);
            continue;
        };
        let text = format!(
            "Rank #{}\nMMR {} | W-L {}\nWinrate {} | Max {}\nCurrent streak: {}",
            card.rank, card.mmr, card.record, card.winrate, card.peak_mmr, card.streak_label
        );
        let title = format!(" {} ", card.name);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(
                Style::default().fg(badge_color(RankBadge::for_rank(card.position as u32))),
            );
        frame.render_widget(Paragraph::new(text).block(block), *col);
    }
}

fn render_search_line(frame: &mut Frame, area: Rect, state: &AppState) {
    let cursor = if state.search.editing { "_" } else { "" };
    let pending = if state.search.is_pending() {
        " (searching...)"
    } else {
        ""
    };
    let text = format!("Search: {}{cursor}{pending}", state.search.input);
    let style = if state.search.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let widths = table_columns();
    let header = Row::new(vec![
        "Rank", "Player", "MMR", "W-L", "Winrate", "Games", "Peak", "Streak",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let page = state.board.visible_page();
    let all_rows = render_rows(&page.players, page.rank_basis);
    // Borders and the header take three lines.
    let visible = area.height.saturating_sub(3).max(1) as usize;
    let (start, end) = visible_range(state.selected, all_rows.len(), visible);

    let rows: Vec<Row> = all_rows
        .into_iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(idx, row)| match row {
            TableRow::Player(row) => {
                let selected = idx == state.selected;
                let row_style = if selected {
                    Style::default().fg(Color::White).bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let record = row.record_text();
                Row::new(vec![
                    Cell::from(format!("#{}", row.rank))
                        .style(Style::default().fg(badge_color(row.badge))),
                    Cell::from(row.name),
                    Cell::from(row.mmr.to_string()),
                    Cell::from(record),
                    Cell::from(row.winrate),
                    Cell::from(row.total_games.to_string()),
                    Cell::from(row.peak_mmr.to_string()),
                    Cell::from(row.streak.text()).style(streak_style(&row.streak)),
                ])
                .style(row_style)
            }
            TableRow::Empty => Row::new(vec![Cell::from(""), Cell::from(EMPTY_TABLE_MESSAGE)])
                .style(Style::default().fg(Color::DarkGray)),
        })
        .collect();

    let title = if end - start < page.players.len() {
        format!(" {}-{} of {} ", start + 1, end, page.players.len())
    } else {
        String::new()
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_page_line(frame: &mut Frame, area: Rect, state: &AppState) {
    let indicator = state.board.page_indicator();
    let mut text = if state.board.pagination_visible() {
        format!("← p  {indicator}  n →")
    } else {
        indicator
    };
    if let Some(player) = state.selected_player() {
        text.push_str(&format!("   Profile: ?player={}", player.id));
    }
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn table_columns() -> [Constraint; 8] {
    [
        Constraint::Length(6),
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(7),
    ]
}

fn render_match_screen(frame: &mut Frame, area: Rect, state: &AppState) {
    match &state.match_panel {
        MatchPanel::Loading => {
            let loading = Paragraph::new("Loading match...")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title("Latest Match").borders(Borders::ALL));
            frame.render_widget(loading, area);
        }
        MatchPanel::Error(message) => {
            let error = Paragraph::new(format!("Unable to Load Match\n\n{message}"))
                .style(Style::default().fg(Color::LightRed))
                .block(Block::default().title("Latest Match").borders(Borders::ALL));
            frame.render_widget(error, area);
        }
        MatchPanel::Loaded(enriched) => {
            let view = render_match(enriched);
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(area);
            let info = format!("{} | {}", view.title, view.time_label);
            frame.render_widget(
                Paragraph::new(info).style(Style::default().add_modifier(Modifier::BOLD)),
                rows[0],
            );

            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[1]);
            render_team_panel(frame, cols[0], &view.panels[0]);
            render_team_panel(frame, cols[1], &view.panels[1]);
        }
    }
}

fn render_team_panel(frame: &mut Frame, area: Rect, panel: &TeamPanel) {
    let border = match panel.outcome {
        TeamOutcome::Victory => Color::Green,
        TeamOutcome::Defeat => Color::Red,
        TeamOutcome::NoResult => Color::DarkGray,
    };
    let block = Block::default()
        .title(format!(" {} - {} ", panel.name, panel.outcome.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let mut lines: Vec<Line> = Vec::new();
    for card in &panel.players {
        lines.extend(player_card_lines(card));
    }
    if lines.is_empty() {
        lines.push(Line::from("No players"));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn player_card_lines(card: &MatchPlayerCard) -> Vec<Line<'static>> {
    let change_color = if card.change_positive {
        Color::Green
    } else {
        Color::Red
    };
    let avatar = if card.avatar_is_placeholder {
        format!("avatar* {}", card.avatar_url)
    } else {
        format!("avatar {}", card.avatar_url)
    };
    vec![
        Line::from(vec![
            Span::styled(
                format!("{:<6}", card.rank_label),
                Style::default().fg(badge_color(card.badge)),
            ),
            Span::styled(
                card.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(format!("  Pre-Match {}  MMR Change ", card.pre_match_mmr)),
            Span::styled(card.mmr_change.clone(), Style::default().fg(change_color)),
        ]),
        Line::from(Span::styled(
            format!("  {avatar}"),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn badge_color(badge: RankBadge) -> Color {
    match badge {
        RankBadge::First => Color::Yellow,
        RankBadge::Second => Color::White,
        RankBadge::Third => Color::Rgb(205, 127, 50),
        RankBadge::TopTen => Color::Cyan,
        RankBadge::Default => Color::Gray,
    }
}

fn streak_style(streak: &StreakCell) -> Style {
    match streak {
        StreakCell::Positive { color, .. } => {
            Style::default().fg(parse_hex_color(color).unwrap_or(Color::Red))
        }
        StreakCell::Negative(_) => Style::default().fg(Color::LightRed),
        StreakCell::Zero => Style::default().fg(Color::DarkGray),
    }
}

fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Ranked Board - Help",
        "",
        "Global:",
        "  Tab          Leaderboard / Match",
        "  r            Refresh leaderboard",
        "  m            Refresh match",
        "  D            Load demo match",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Leaderboard:",
        "  /            Search by name (applies after 1s)",
        "  x            Clear search",
        "  ←/→ or p/n   Previous / next page",
        "  ↑/↓ or k/j   Move selection",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
