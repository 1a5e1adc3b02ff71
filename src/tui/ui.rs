use crate::tui::app::App;
use crate::tui::chart::StrategyChart;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap},
    Frame,
};
use serverscope::report::detail_rows;

pub fn ui(f: &mut Frame, app: &App) {
    let show_error = app.error.is_some();

    let mut constraints = vec![
        Constraint::Length(3), // Server ID form
        Constraint::Min(0),    // Details + chart
    ];
    if show_error {
        constraints.push(Constraint::Length(3)); // Error slot
    }
    constraints.push(Constraint::Length(3)); // Footer/Help

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    render_form(f, app, chunks[0]);
    render_results(f, app, chunks[1]);

    let footer_area = if let Some(error) = &app.error {
        let error_para = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Error ")
                    .border_style(Style::default().fg(Color::Red)),
            );
        f.render_widget(error_para, chunks[2]);
        chunks[3]
    } else {
        chunks[2]
    };

    let help = if app.editing {
        "Enter: Fetch | Esc: Leave input | Ctrl-C: Quit"
    } else {
        "i: Edit server ID | r: Refetch | ↑/↓: Scroll | q: Quit"
    };
    let footer_text = match &app.last_event {
        Some(last) => format!("{} | {}", help, last),
        None => help.to_string(),
    };
    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, footer_area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.editing {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default()
    };
    let cursor = if app.editing { "_" } else { "" };

    let form = Paragraph::new(format!(" > {}{}", app.input, cursor)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Server ID ")
            .border_style(border_style),
    );
    f.render_widget(form, area);
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(area);

    let details_block = Block::default().borders(Borders::ALL).title(" Server Details ");

    if app.loading {
        let server_id = app.pending_server_id.as_deref().unwrap_or_default();
        let loading = Paragraph::new(format!("⏳ Fetching server {}...", server_id))
            .block(details_block);
        f.render_widget(loading, chunks[0]);
    } else if let Some(report) = &app.report {
        let mut lines: Vec<Line> = detail_rows(&report.record)
            .into_iter()
            .map(|row| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", row.label),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(row.value),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Fetched {}", report.fetched_at.format("%Y-%m-%d %H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )));

        let details = Paragraph::new(lines)
            .block(details_block)
            .wrap(Wrap { trim: false })
            .scroll((app.details_scroll, 0));
        f.render_widget(details, chunks[0]);
    } else {
        let empty = Paragraph::new("Enter a server ID and press [Enter].")
            .style(Style::default().fg(Color::DarkGray))
            .block(details_block);
        f.render_widget(empty, chunks[0]);
    }

    match app.chart.current() {
        Some(chart) => render_chart(f, chart, chunks[1]),
        None => {
            let text = if app.report.is_some() {
                "No strategy scores available."
            } else {
                ""
            };
            let empty = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(" Strategy Scores "));
            f.render_widget(empty, chunks[1]);
        }
    }
}

fn render_chart(f: &mut Frame, chart: &StrategyChart, area: Rect) {
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .map(|bar| {
            Bar::default()
                .value(bar.height)
                .text_value(bar.text.clone())
                .label(Line::from(bar.label.clone()))
        })
        .collect();

    let barchart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(chart.title.clone())
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1)
        .max(100)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(barchart, area);
}
