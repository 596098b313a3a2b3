use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::aggregate::{Aggregation, TOP_CATEGORIES};
use crate::error::Result;
use crate::fmt::{amount, label_list, number};
use crate::models::ExpenseTable;
use crate::settings::load_settings;
use crate::state::{recompute, AppState, DashboardView};
use crate::tui::{
    amount_span, install_panic_hook, scroll_window, wrap_text, FOCUS_STYLE, FOOTER_STYLE,
    HEADER_STYLE, SELECTED_STYLE,
};

const SIDEBAR_WIDTH: u16 = 34;
const PAGE_ROWS: usize = 10;

const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);
const BORDER_STYLE: Style = Style::new().fg(Color::DarkGray);
const BAR_STYLE: Style = Style::new().fg(Color::Rgb(80, 160, 220));
const HEADER_ROW_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);

#[derive(Clone, Copy, PartialEq, Debug)]
enum Focus {
    Price,
    Dates,
    Modules,
    Table,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Price => Self::Dates,
            Self::Dates => Self::Modules,
            Self::Modules => Self::Table,
            Self::Table => Self::Price,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Price => Self::Table,
            Self::Dates => Self::Price,
            Self::Modules => Self::Dates,
            Self::Table => Self::Modules,
        }
    }
}

/// Which end of the price range Left/Right moves.
#[derive(Clone, Copy, PartialEq, Debug)]
enum Bound {
    Min,
    Max,
}

struct Dashboard {
    state: AppState,
    source_name: String,
    dates: Vec<String>,
    modules: Vec<String>,
    bounds: Option<(f64, f64)>,
    step: f64,
    focus: Focus,
    bound: Bound,
    date_cursor: usize,
    module_cursor: usize,
    table_offset: usize,
    export_dir: String,
    status_message: Option<String>,
}

/// Slider step: a twentieth of the observed range, at least 1.
fn price_step(bounds: Option<(f64, f64)>) -> f64 {
    match bounds {
        Some((lo, hi)) => ((hi - lo) / 20.0).round().max(1.0),
        None => 1.0,
    }
}

fn toggle(selected: &mut BTreeSet<String>, label: &str) {
    if !selected.remove(label) {
        selected.insert(label.to_string());
    }
}

/// Keys shared by the date and module lists.
fn handle_list_key(
    code: KeyCode,
    cursor: &mut usize,
    options: &[String],
    selected: &mut BTreeSet<String>,
) {
    match code {
        KeyCode::Up => *cursor = cursor.saturating_sub(1),
        KeyCode::Down => *cursor = (*cursor + 1).min(options.len().saturating_sub(1)),
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(label) = options.get(*cursor) {
                toggle(selected, label);
            }
        }
        KeyCode::Char('a') => selected.extend(options.iter().cloned()),
        KeyCode::Char('n') => selected.clear(),
        _ => {}
    }
}

impl Dashboard {
    fn new(table: ExpenseTable, source: &Path, export_dir: String) -> Self {
        let dates = table.distinct_dates();
        let modules = table.distinct_modules();
        let bounds = table.price_bounds();
        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());
        let status_message = if table.warnings.is_empty() {
            None
        } else {
            Some(format!(
                "{} price value(s) could not be parsed and are left out of totals",
                table.warnings.len()
            ))
        };
        Self {
            state: AppState::new(table),
            source_name,
            dates,
            modules,
            bounds,
            step: price_step(bounds),
            focus: Focus::Price,
            bound: Bound::Min,
            date_cursor: 0,
            module_cursor: 0,
            table_offset: 0,
            export_dir,
            status_message,
        }
    }

    fn adjust_price(&mut self, steps: f64) {
        let Some((lo, hi)) = self.bounds else {
            return;
        };
        let mut min = self.state.spec.price_min();
        let mut max = self.state.spec.price_max();
        match self.bound {
            Bound::Min => min = (min + steps * self.step).max(lo).min(max),
            Bound::Max => max = (max + steps * self.step).min(hi).max(min),
        }
        if let Err(e) = self.state.spec.set_price_range(min, max) {
            self.status_message = Some(e.to_string());
        }
    }

    fn export(&mut self) {
        self.status_message = Some(match do_export(&self.state, &self.export_dir) {
            Ok(path) => format!("Exported {}", path.display()),
            Err(e) => format!("Export failed: {e}"),
        });
    }

    /// Returns true when the dashboard should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        self.status_message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('r') => {
                self.state.reset_filters();
                self.table_offset = 0;
                self.status_message = Some("Filters reset".to_string());
            }
            KeyCode::Char('e') => self.export(),
            _ => match self.focus {
                Focus::Price => match code {
                    KeyCode::Up | KeyCode::Char('[') => self.bound = Bound::Min,
                    KeyCode::Down | KeyCode::Char(']') => self.bound = Bound::Max,
                    KeyCode::Left => self.adjust_price(-1.0),
                    KeyCode::Right => self.adjust_price(1.0),
                    _ => {}
                },
                Focus::Dates => handle_list_key(
                    code,
                    &mut self.date_cursor,
                    &self.dates,
                    &mut self.state.spec.allowed_dates,
                ),
                Focus::Modules => handle_list_key(
                    code,
                    &mut self.module_cursor,
                    &self.modules,
                    &mut self.state.spec.allowed_modules,
                ),
                Focus::Table => match code {
                    KeyCode::Up => self.table_offset = self.table_offset.saturating_sub(1),
                    KeyCode::Down => self.table_offset += 1,
                    KeyCode::PageUp => self.table_offset = self.table_offset.saturating_sub(PAGE_ROWS),
                    KeyCode::PageDown => self.table_offset += PAGE_ROWS,
                    KeyCode::Home => self.table_offset = 0,
                    _ => {}
                },
            },
        }
        false
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep, body_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let view = recompute(&self.state);
        self.table_offset = self.table_offset.min(view.rows.len().saturating_sub(1));

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" Expense Dashboard: {}", self.source_name), HEADER_STYLE),
                Span::raw(format!(
                    "   {} of {} rows   Total ",
                    number(view.rows.len() as i64),
                    number(self.state.table.len() as i64)
                )),
                amount_span(view.total),
            ])),
            header_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(BORDER_STYLE), sep);

        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
                .areas(body_area);
        self.draw_sidebar(frame, sidebar);
        draw_main(
            frame,
            main,
            &view,
            &self.state.table.extra_headers,
            self.table_offset,
            self.focus == Focus::Table,
        );

        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
                hints_area,
            );
        } else {
            frame.render_widget(
                Paragraph::new(
                    " Tab=focus  Up/Down=move  Left/Right=price  Space=toggle  a/n=all/none  r=reset  e=export PDF  q=quit",
                )
                .style(FOOTER_STYLE),
                hints_area,
            );
        }
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let spec = &self.state.spec;
        let summary = format!(
            "Selected Price Range: {} to {}\nSelected Months: {}\nSelected Modules: {}",
            amount(spec.price_min()),
            amount(spec.price_max()),
            label_list(&spec.selected_dates()),
            label_list(&spec.selected_modules()),
        );
        let (wrapped, summary_lines) = wrap_text(&summary, area.width.saturating_sub(2) as usize);

        let [price_area, dates_area, modules_area, summary_area] = Layout::vertical([
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(summary_lines + 2),
        ])
        .areas(area);

        // Price range "slider"
        let focused = self.focus == Focus::Price;
        let marker = |b: Bound| if focused && self.bound == b { ">" } else { " " };
        let observed = match self.bounds {
            Some((lo, hi)) => format!(" Observed {} to {}", amount(lo), amount(hi)),
            None => " No numeric prices".to_string(),
        };
        let price_lines = vec![
            Line::from(vec![
                Span::raw(format!("{} Min  ", marker(Bound::Min))),
                Span::styled(amount(spec.price_min()), BOLD),
            ]),
            Line::from(vec![
                Span::raw(format!("{} Max  ", marker(Bound::Max))),
                Span::styled(amount(spec.price_max()), BOLD),
            ]),
            Line::from(Span::styled(observed, FOOTER_STYLE)),
        ];
        frame.render_widget(
            Paragraph::new(price_lines).block(panel(" Price Range ", focused)),
            price_area,
        );

        draw_selection_list(
            frame,
            dates_area,
            "Months",
            &self.dates,
            &spec.allowed_dates,
            self.date_cursor,
            self.focus == Focus::Dates,
        );
        draw_selection_list(
            frame,
            modules_area,
            "Modules",
            &self.modules,
            &spec.allowed_modules,
            self.module_cursor,
            self.focus == Focus::Modules,
        );

        frame.render_widget(
            Paragraph::new(wrapped).block(panel(" Filters ", false)),
            summary_area,
        );
    }
}

#[cfg(feature = "pdf")]
fn do_export(state: &AppState, export_dir: &str) -> Result<PathBuf> {
    let path = super::export::output_path(None, export_dir);
    super::export::write_report(&state.table, &state.spec, &path)?;
    Ok(path)
}

#[cfg(not(feature = "pdf"))]
fn do_export(_state: &AppState, _export_dir: &str) -> Result<PathBuf> {
    Err(crate::error::DashError::Other(
        "PDF export requires the 'pdf' feature".into(),
    ))
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .title(title.to_string())
        .title_style(if focused { FOCUS_STYLE } else { BOLD })
        .borders(Borders::ALL)
        .border_style(if focused { FOCUS_STYLE } else { BORDER_STYLE })
}

fn draw_selection_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    options: &[String],
    selected: &BTreeSet<String>,
    cursor: usize,
    focused: bool,
) {
    let height = area.height.saturating_sub(2) as usize;
    let start = scroll_window(cursor, options.len(), height);
    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, label)| {
            let mark = if selected.contains(label) { "[x]" } else { "[ ]" };
            let style = if focused && i == cursor {
                SELECTED_STYLE
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!(" {mark} {label}"), style))
        })
        .collect();
    let chosen = options.iter().filter(|o| selected.contains(*o)).count();
    let title = format!(" {title} ({chosen}/{}) ", options.len());
    frame.render_widget(Paragraph::new(lines).block(panel(&title, focused)), area);
}

fn draw_main(
    frame: &mut Frame,
    area: Rect,
    view: &DashboardView,
    extra_headers: &[String],
    offset: usize,
    table_focused: bool,
) {
    let [top_row, bottom_row, table_area] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Fill(1),
    ])
    .areas(area);
    let halves = [Constraint::Percentage(50), Constraint::Percentage(50)];
    let [monthly_area, category_area] = Layout::horizontal(halves).areas(top_row);
    let [priority_area, top_area] = Layout::horizontal(halves).areas(bottom_row);

    draw_bar_chart(frame, monthly_area, " Total Monthly Expense ", &view.by_date);
    draw_category_breakdown(frame, category_area, &view.by_module);
    draw_bar_chart(frame, priority_area, " Priority Analysis ", &view.by_priority);
    draw_top_categories(frame, top_area, &view.top_modules);
    draw_rows(frame, table_area, view, extra_headers, offset, table_focused);
}

/// Bar heights are whole units; negative totals draw as empty bars.
fn bar_value(val: f64) -> u64 {
    val.max(0.0).round() as u64
}

/// Compact amount for bar labels: 950, 1.2k, 3M.
fn compact(val: f64) -> String {
    let abs = val.abs();
    let sign = if val < 0.0 { "-" } else { "" };
    let (scaled, suffix) = if abs >= 1_000_000.0 {
        (abs / 1_000_000.0, "M")
    } else if abs >= 1000.0 {
        (abs / 1000.0, "k")
    } else {
        return format!("{sign}{}", abs.round() as u64);
    };
    if scaled == scaled.floor() {
        format!("{sign}{}{suffix}", scaled as u64)
    } else {
        format!("{sign}{scaled:.1}{suffix}")
    }
}

fn empty_panel(frame: &mut Frame, area: Rect, title: &str) {
    frame.render_widget(
        Paragraph::new(" No data for the current filters")
            .style(FOOTER_STYLE)
            .block(panel(title, false)),
        area,
    );
}

fn draw_bar_chart(frame: &mut Frame, area: Rect, title: &str, agg: &Aggregation) {
    if agg.is_empty() {
        return empty_panel(frame, area, title);
    }
    let bars: Vec<Bar> = agg
        .iter()
        .map(|(key, total)| {
            Bar::default()
                .value(bar_value(total))
                .text_value(compact(total))
                .label(Line::from(key.to_string()))
        })
        .collect();
    let inner = area.width.saturating_sub(2) as usize;
    let bar_width = (inner / agg.len()).saturating_sub(1).clamp(1, 9) as u16;
    let chart = BarChart::default()
        .block(panel(title, false))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(BAR_STYLE)
        .value_style(Style::default().fg(Color::Black).bg(Color::Rgb(80, 160, 220)))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Module totals with their share of the filtered total (the pie chart, as text).
fn draw_category_breakdown(frame: &mut Frame, area: Rect, agg: &Aggregation) {
    let title = " Category Breakdown ";
    if agg.is_empty() {
        return empty_panel(frame, area, title);
    }
    let name_width = agg.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(8).min(18);
    let lines: Vec<Line> = agg
        .iter()
        .map(|(key, total)| {
            let share = agg.share(key);
            let blocks = "█".repeat((share / 10.0).round().clamp(0.0, 10.0) as usize);
            Line::from(vec![
                Span::raw(format!(" {:<name_width$.name_width$} ", key)),
                Span::styled(format!("{blocks:<10}"), BAR_STYLE),
                Span::raw(format!(" {share:>5.1}%  ")),
                amount_span(total),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel(title, false)), area);
}

fn draw_top_categories(frame: &mut Frame, area: Rect, top: &[(String, f64)]) {
    let title = format!(" Top {TOP_CATEGORIES} Categories ");
    if top.is_empty() {
        return empty_panel(frame, area, &title);
    }
    let bars: Vec<Bar> = top
        .iter()
        .map(|(module, total)| {
            Bar::default()
                .value(bar_value(*total))
                .text_value(amount(*total))
                .label(Line::from(module.clone()))
        })
        .collect();
    let chart = BarChart::default()
        .block(panel(&title, false))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(BAR_STYLE)
        .value_style(Style::default().fg(Color::Black).bg(Color::Rgb(80, 160, 220)))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn draw_rows(
    frame: &mut Frame,
    area: Rect,
    view: &DashboardView,
    extra_headers: &[String],
    offset: usize,
    focused: bool,
) {
    let visible = area.height.saturating_sub(3) as usize;
    let mut header = vec!["Date", "Module", "Priority", "Price"];
    header.extend(extra_headers.iter().map(String::as_str));

    let rows: Vec<Row> = view
        .rows
        .iter()
        .skip(offset)
        .take(visible)
        .map(|r| {
            let mut cells = vec![
                Cell::from(r.date.clone().unwrap_or_default()),
                Cell::from(r.module.clone().unwrap_or_default()),
                Cell::from(r.priority.clone().unwrap_or_default()),
                Cell::from(r.price.map(amount_span).unwrap_or_default()),
            ];
            cells.extend(r.extra.iter().map(|v| Cell::from(v.clone())));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![
        Constraint::Length(12),
        Constraint::Length(18),
        Constraint::Length(10),
        Constraint::Length(14),
    ];
    widths.extend(extra_headers.iter().map(|_| Constraint::Fill(1)));

    let shown_to = (offset + rows.len()).min(view.rows.len());
    let title = if view.rows.is_empty() {
        " Filtered Expense Data Table (no rows) ".to_string()
    } else {
        format!(
            " Filtered Expense Data Table ({}-{} of {}) ",
            offset + 1,
            shown_to,
            view.rows.len()
        )
    };
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(HEADER_ROW_STYLE))
        .block(panel(&title, focused));
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

pub fn run(table: ExpenseTable, source: &Path) -> Result<()> {
    let settings = load_settings();
    let mut dashboard = Dashboard::new(table, source, settings.export_dir);

    install_panic_hook();
    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| dashboard.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break Ok(());
                }
                if dashboard.handle_key(key.code) {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}
