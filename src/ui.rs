use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use tracing::{info, warn};

use domain_portfolio::{
    export, roi_statistics, status_breakdown, AppConfig, DomainRecord, DomainStatus,
    MetricsEngine, PortfolioError, PortfolioResult, PortfolioStore, SaleReconciler,
};

/// Domains expiring within this many days are flagged on the dashboard
const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Domains,
    Evaluations,
    Sales,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::Domains, Page::Evaluations, Page::Sales];

    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Domains,
            Page::Domains => Page::Evaluations,
            Page::Evaluations => Page::Sales,
            Page::Sales => Page::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Dashboard => Page::Sales,
            Page::Domains => Page::Dashboard,
            Page::Evaluations => Page::Domains,
            Page::Sales => Page::Evaluations,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Domains => "Domains",
            Page::Evaluations => "Evaluations",
            Page::Sales => "Sales",
        }
    }
}

pub struct App {
    pub store: PortfolioStore,
    pub config: AppConfig,
    pub engine: MetricsEngine,
    pub current_page: Page,
    pub domains_state: TableState,
    pub evaluations_state: TableState,
    pub sales_state: TableState,
    pub status_filter: Option<DomainStatus>,
    pub show_detail: bool,
    pub message: Option<String>,
    pub today: NaiveDate,
}

impl App {
    pub fn new(store: PortfolioStore, config: AppConfig) -> Self {
        let engine = MetricsEngine::with_multiplier(config.value_multiplier);

        let mut app = Self {
            store,
            config,
            engine,
            current_page: Page::Dashboard,
            domains_state: TableState::default(),
            evaluations_state: TableState::default(),
            sales_state: TableState::default(),
            status_filter: None,
            show_detail: false,
            message: None,
            today: Local::now().date_naive(),
        };

        for page in [Page::Domains, Page::Evaluations, Page::Sales] {
            app.clamp_selection(page);
        }
        app
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    /// Domains after the status filter, in collection order
    pub fn visible_domains(&self) -> Vec<&DomainRecord> {
        self.store
            .domains()
            .iter()
            .filter(|d| self.status_filter.map_or(true, |s| d.status == s))
            .collect()
    }

    pub fn selected_domain(&self) -> Option<&DomainRecord> {
        self.domains_state
            .selected()
            .and_then(|i| self.visible_domains().get(i).copied())
    }

    pub fn apply_filter(&mut self, filter: Option<DomainStatus>) {
        self.status_filter = filter;
        self.domains_state.select(if self.visible_domains().is_empty() { None } else { Some(0) });
    }

    fn rows_on(&self, page: Page) -> usize {
        match page {
            Page::Dashboard => 0,
            Page::Domains => self.visible_domains().len(),
            Page::Evaluations => self.store.evaluations().len(),
            Page::Sales => self.store.sales().len(),
        }
    }

    fn state_mut(&mut self, page: Page) -> Option<&mut TableState> {
        match page {
            Page::Dashboard => None,
            Page::Domains => Some(&mut self.domains_state),
            Page::Evaluations => Some(&mut self.evaluations_state),
            Page::Sales => Some(&mut self.sales_state),
        }
    }

    /// Keep the selection inside the table after a removal
    fn clamp_selection(&mut self, page: Page) {
        let len = self.rows_on(page);
        if let Some(state) = self.state_mut(page) {
            let selected = match (len, state.selected()) {
                (0, _) => None,
                (_, Some(i)) if i >= len => Some(len - 1),
                (_, None) => Some(0),
                (_, current) => current,
            };
            state.select(selected);
        }
    }

    /// Move the selection by `delta` rows, wrapping at the ends when `wrap`
    fn move_selection(&mut self, delta: isize, wrap: bool) {
        let page = self.current_page;
        let len = self.rows_on(page) as isize;
        if len == 0 {
            return;
        }

        if let Some(state) = self.state_mut(page) {
            let current = state.selected().unwrap_or(0) as isize;
            let target = current + delta;
            let i = if wrap {
                target.rem_euclid(len)
            } else {
                target.clamp(0, len - 1)
            };
            state.select(Some(i as usize));
        }
    }

    pub fn next(&mut self) {
        self.move_selection(1, true);
    }

    pub fn previous(&mut self) {
        self.move_selection(-1, true);
    }

    pub fn page_down(&mut self) {
        self.move_selection(20, false);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-20, false);
    }

    pub fn select_first(&mut self) {
        self.move_selection(isize::MIN / 2, false);
    }

    pub fn select_last(&mut self) {
        self.move_selection(isize::MAX / 2, false);
    }

    /// Delete whatever is selected on the current page
    pub fn delete_selected(&mut self) {
        let page = self.current_page;
        let outcome = match page {
            Page::Dashboard => return,
            Page::Domains => {
                let id = self.selected_domain().map(|d| d.id.clone());
                match id {
                    Some(id) => self.store.delete_domain(&id).map(|summary| {
                        format!(
                            "Deleted {} and {} evaluation(s)",
                            summary.domain.name,
                            summary.evaluations_removed.len()
                        )
                    }),
                    None => return,
                }
            }
            Page::Evaluations => {
                let id = self
                    .evaluations_state
                    .selected()
                    .and_then(|i| self.store.evaluations().get(i))
                    .map(|e| e.id.clone());
                match id {
                    Some(id) => self
                        .store
                        .delete_evaluation(&id)
                        .map(|e| format!("Deleted {} evaluation", e.tool)),
                    None => return,
                }
            }
            Page::Sales => {
                let id = self
                    .sales_state
                    .selected()
                    .and_then(|i| self.store.sales().get(i))
                    .map(|s| s.id.clone());
                match id {
                    Some(id) => self
                        .store
                        .delete_sale(&id)
                        .map(|s| format!("Deleted sale of {}", s.domain_name)),
                    None => return,
                }
            }
        };

        self.message = Some(match outcome {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "delete failed");
                format!("Delete failed: {}", e)
            }
        });

        for page in [Page::Domains, Page::Evaluations, Page::Sales] {
            self.clamp_selection(page);
        }
    }

    /// Workbook + sales CSV into the configured export directory
    pub fn export_all(&mut self) {
        self.message = Some(match self.write_exports() {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "export failed");
                format!("Export failed: {}", e)
            }
        });
    }

    fn write_exports(&self) -> PortfolioResult<String> {
        let dir = &self.config.export_dir;
        std::fs::create_dir_all(dir)
            .map_err(|e| PortfolioError::Export(format!("cannot create {}: {}", dir.display(), e)))?;

        let workbook = export::write_domains_workbook(dir, self.store.domains(), self.today)?;
        let ledger = export::write_sales_csv(dir, self.store.sales())?;
        info!(workbook = %workbook.display(), ledger = %ledger.display(), "exported from UI");

        Ok(format!("Exported {} and {}", workbook.display(), ledger.display()))
    }

    /// Domains whose expiration falls within the warning window, soonest first
    pub fn expiring_soon(&self) -> Vec<(&DomainRecord, i64)> {
        let mut expiring: Vec<(&DomainRecord, i64)> = self
            .store
            .domains()
            .iter()
            .filter(|d| !d.is_sold())
            .map(|d| (d, d.days_until_expiration(self.today)))
            .filter(|(_, days)| (0..=EXPIRY_WARNING_DAYS).contains(days))
            .collect();

        expiring.sort_by_key(|(_, days)| *days);
        expiring
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
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter if app.current_page == Page::Domains => app.toggle_detail(),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                KeyCode::Char('x') => app.export_all(),
                KeyCode::Char('c') if app.current_page == Page::Domains => app.apply_filter(None),
                KeyCode::Char(n @ '1'..='4') if app.current_page == Page::Domains => {
                    let index = (n as usize) - ('1' as usize);
                    app.apply_filter(Some(DomainStatus::ALL[index]));
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.select_first(),
                KeyCode::End => app.select_last(),
                _ => {}
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Domains {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_domains(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Dashboard => render_dashboard(f, chunks[1], app),
            Page::Domains => render_domains(f, chunks[1], app),
            Page::Evaluations => render_evaluations(f, chunks[1], app),
            Page::Sales => render_sales(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn status_color(status: DomainStatus) -> Color {
    match status {
        DomainStatus::Active => Color::Green,
        DomainStatus::ForSale => Color::Yellow,
        DomainStatus::Sold => Color::Cyan,
        DomainStatus::Expired => Color::Red,
    }
}

fn label_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn table_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn highlight() -> Style {
    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let sold = app.store.domains().iter().filter(|d| d.is_sold()).count();

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Domains: {}", app.store.domains().len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(format!("Sold: {}", sold), Style::default().fg(Color::Cyan)));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let metrics = app.store.metrics(&app.engine);
    let roi = roi_statistics(app.store.domains(), app.store.sales());
    let breakdown = status_breakdown(app.store.domains());
    let report = app.store.reconcile(&SaleReconciler::new());

    let roi_color = if metrics.roi >= 0.0 { Color::Green } else { Color::Red };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Portfolio",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Domains:          ", label_style()),
            Span::raw(format!("{}", metrics.total_domains)),
        ]),
        Line::from(vec![
            Span::styled("  Investment:       ", label_style()),
            Span::raw(format!("{:.2}", metrics.total_investment)),
        ]),
        Line::from(vec![
            Span::styled("  Sales revenue:    ", label_style()),
            Span::raw(format!("{:.2}", metrics.total_sales_revenue)),
        ]),
        Line::from(vec![
            Span::styled("  ROI:              ", label_style()),
            Span::styled(format!("{:.1}%", metrics.roi), Style::default().fg(roi_color)),
        ]),
        Line::from(vec![
            Span::styled("  Profit:           ", label_style()),
            Span::raw(format!("{:.2}", roi.profit)),
        ]),
        Line::from(vec![
            Span::styled("  Estimated value:  ", label_style()),
            Span::raw(format!("{:.2}", metrics.estimated_portfolio_value)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Status",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    for status in DomainStatus::ALL {
        content.push(Line::from(vec![
            Span::styled(format!("  {:<10}", status.as_str()), Style::default().fg(status_color(status))),
            Span::raw(format!("{:>5}", breakdown.count(status))),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        format!("  Expiring within {} days", EXPIRY_WARNING_DAYS),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )));
    content.push(Line::from(""));

    let expiring = app.expiring_soon();
    if expiring.is_empty() {
        content.push(Line::from(Span::styled("  none", Style::default().fg(Color::DarkGray))));
    }
    for (domain, days) in expiring {
        content.push(Line::from(vec![
            Span::raw(format!("  {:<30}", truncate(&domain.name, 30))),
            Span::styled(format!("{} days", days), Style::default().fg(Color::Red)),
        ]));
    }

    content.push(Line::from(""));
    let reconcile_color = if report.is_consistent() { Color::Green } else { Color::Yellow };
    content.push(Line::from(Span::styled(
        format!("  {}", report.summary()),
        Style::default().fg(reconcile_color),
    )));

    let paragraph = Paragraph::new(content).block(table_block(" Dashboard ".to_string()));
    f.render_widget(paragraph, area);
}

fn render_domains(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["Name", "Registrar", "Category", "Expires", "Status", "Bought", "Sold"]);

    let rows: Vec<Row> = app
        .visible_domains()
        .iter()
        .map(|d| {
            let color = status_color(d.status);
            let expires_style = if d.days_until_expiration(app.today) < 0 && !d.is_sold() {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(truncate(&d.name, 30)),
                Cell::from(d.registrar.clone()),
                Cell::from(truncate(&d.category, 14)),
                Cell::from(d.expiration_date.to_string()).style(expires_style),
                Cell::from(d.status.as_str()).style(Style::default().fg(color)),
                Cell::from(format!("{:.2}", d.purchase_price)),
                Cell::from(d.sale_price.map(|p| format!("{:.2}", p)).unwrap_or_default()),
            ])
            .height(1)
        })
        .collect();

    let title = match app.status_filter {
        Some(status) => format!(" Domains ({}) ", status.as_str()),
        None => " Domains ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(table_block(title))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.domains_state);
}

fn render_evaluations(f: &mut Frame, area: Rect, app: &mut App) {
    let header = header_row(&["Domain", "Tool", "Date", "Estimated value"]);

    let rows: Vec<Row> = app
        .store
        .evaluations()
        .iter()
        .map(|e| {
            Row::new(vec![
                Cell::from(truncate(app.store.domain_name_for(&e.domain_id), 30)),
                Cell::from(e.tool.clone()),
                Cell::from(e.date.to_string()),
                Cell::from(format!("{:.2}", e.estimated_value)).style(Style::default().fg(Color::Green)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(table_block(" Evaluations ".to_string()))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.evaluations_state);
}

fn render_sales(f: &mut Frame, area: Rect, app: &mut App) {
    let summary = app.store.sales_summary();
    let header = header_row(&["Domain", "Date", "Price", "Buyer"]);

    let rows: Vec<Row> = app
        .store
        .sales()
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(truncate(&s.domain_name, 30)),
                Cell::from(s.sale_date.to_string()),
                Cell::from(format!("{:.2}", s.sale_price)).style(Style::default().fg(Color::Green)),
                Cell::from(truncate(&s.buyer, 24)),
            ])
            .height(1)
        })
        .collect();

    let title = format!(
        " Sales - {} total {:.2}, avg {:.2} ",
        summary.count, summary.total, summary.average
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(26),
        ],
    )
    .header(header)
    .block(table_block(title))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.sales_state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Domain Details ");

    let domain = match app.selected_domain() {
        Some(d) => d,
        None => {
            f.render_widget(Paragraph::new("No domain selected").block(block), area);
            return;
        }
    };

    let field = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, label_style()), Span::raw(value)])
    };

    let mut content = vec![
        Line::from(""),
        field("  Name: ", domain.name.clone()),
        field("  Registrar: ", domain.registrar.clone()),
        field("  Category: ", domain.category.clone()),
        Line::from(vec![
            Span::styled("  Status: ", label_style()),
            Span::styled(domain.status.as_str(), Style::default().fg(status_color(domain.status))),
        ]),
        Line::from(""),
        field("  Purchased: ", domain.purchase_date.to_string()),
        field(
            "  Expires: ",
            format!(
                "{} ({} days)",
                domain.expiration_date,
                domain.days_until_expiration(app.today)
            ),
        ),
        field("  Purchase price: ", format!("{:.2}", domain.purchase_price)),
    ];

    if domain.is_sold() {
        content.push(Line::from(""));
        content.push(field(
            "  Sale price: ",
            domain.sale_price.map(|p| format!("{:.2}", p)).unwrap_or_default(),
        ));
        content.push(field(
            "  Sale date: ",
            domain.sale_date.map(|d| d.to_string()).unwrap_or_default(),
        ));
        content.push(field("  Buyer: ", domain.buyer.clone().unwrap_or_default()));
    }

    content.push(Line::from(""));
    content.push(Line::from("  ─────────────────────────────────────"));
    content.push(Line::from(Span::styled(
        "  EVALUATIONS",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )));

    let evaluations = app.store.evaluations_for(&domain.id);
    if evaluations.is_empty() {
        content.push(Line::from(Span::styled("  none", Style::default().fg(Color::DarkGray))));
    }
    for e in evaluations {
        content.push(Line::from(format!("  {} {:<10} {:.2}", e.date, e.tool, e.estimated_value)));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if app.current_page != Page::Dashboard {
        let selected = match app.current_page {
            Page::Domains => app.domains_state.selected(),
            Page::Evaluations => app.evaluations_state.selected(),
            _ => app.sales_state.selected(),
        };
        status_spans.push(Span::styled(
            format!(" Row: {}/{} ", selected.map(|i| i + 1).unwrap_or(0), app.rows_on(app.current_page)),
            Style::default().fg(Color::Cyan),
        ));
        status_spans.push(Span::raw(" | "));
    }

    if let Some(message) = &app.message {
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" | "));
    }

    let keys: &[(&str, &str)] = match app.current_page {
        Page::Dashboard => &[("Tab", " Page | "), ("x", " Export | ")],
        Page::Domains => &[
            ("Enter", " Details | "),
            ("1-4", " Filter | "),
            ("c", " Clear | "),
            ("d", " Delete | "),
            ("x", " Export | "),
        ],
        _ => &[("Tab", " Page | "), ("d", " Delete | "), ("x", " Export | ")],
    };

    for (key, label) in keys {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(*label));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_portfolio::NewEvaluation;

    fn create_test_app() -> App {
        let mut store = PortfolioStore::with_demo_data("test").unwrap();
        let id = store.domains()[0].id.clone();
        store
            .create_evaluation(NewEvaluation {
                domain_id: id,
                tool: "Atom".to_string(),
                date: None,
                estimated_value: 80.0,
            })
            .unwrap();

        let mut config = AppConfig::default();
        config.export_dir = std::env::temp_dir().join("domain-portfolio-ui-test");
        App::new(store, config)
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Dashboard;
        for _ in 0..4 {
            page = page.next();
        }
        assert_eq!(page, Page::Dashboard);
        assert_eq!(Page::Dashboard.previous(), Page::Sales);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = create_test_app();
        app.current_page = Page::Domains;

        assert_eq!(app.domains_state.selected(), Some(0));
        app.previous();
        assert_eq!(app.domains_state.selected(), Some(1));
        app.next();
        assert_eq!(app.domains_state.selected(), Some(0));
        app.select_last();
        assert_eq!(app.domains_state.selected(), Some(1));
    }

    #[test]
    fn test_delete_selected_domain_cascades() {
        let mut app = create_test_app();
        app.current_page = Page::Domains;
        let evaluations_before = app.store.evaluations().len();

        app.delete_selected();

        assert_eq!(app.store.domains().len(), 1);
        assert!(app.store.evaluations().len() < evaluations_before);
        assert!(app.message.as_deref().unwrap_or("").starts_with("Deleted"));
        assert_eq!(app.domains_state.selected(), Some(0));
    }

    #[test]
    fn test_status_filter() {
        let mut app = create_test_app();
        app.apply_filter(Some(DomainStatus::Sold));

        assert!(app.visible_domains().iter().all(|d| d.status == DomainStatus::Sold));

        app.apply_filter(Some(DomainStatus::Expired));
        assert!(app.selected_domain().is_none());

        app.apply_filter(None);
        assert_eq!(app.visible_domains().len(), app.store.domains().len());
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("catégorie-très-longue", 10), "catégor...");
        assert_eq!(truncate("court", 10), "court");
    }
}
