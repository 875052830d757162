use crate::animation::LOADER_ARC_EXTENT;
use crate::app::{App, ErrorDialog, MetricDisplay, StatusTone};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

// One hue per metric. Borders and empty bar tracks share RULE.
const DOWNLOAD: Color = Color::Rgb(134, 194, 156);
const UPLOAD: Color = Color::Rgb(147, 180, 220);
const PING: Color = Color::Rgb(220, 180, 130);
const RULE: Color = Color::Rgb(60, 60, 65);
const SUCCESS: Color = DOWNLOAD;
const ACTIVE: Color = Color::Rgb(100, 149, 237);
const FAILURE: Color = Color::Rgb(224, 108, 117);
const TEXT: Color = Color::Rgb(230, 230, 230);
const TEXT_DIM: Color = Color::Rgb(160, 160, 160);
const TEXT_FAINT: Color = Color::Rgb(100, 100, 100);

const CONTENT_WIDTH: u16 = 72;
const MIN_CONTENT_WIDTH: u16 = 40;

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let content = match &app.widgets.image {
        Some(image) if area.width >= image.columns() + MIN_CONTENT_WIDTH => {
            let [left, right] =
                Layout::horizontal([Constraint::Min(MIN_CONTENT_WIDTH), Constraint::Length(image.columns())])
                    .areas(area);
            frame.render_widget(image, right);
            left
        }
        _ => area,
    };

    draw_main(frame, content, app);

    if let Some(dialog) = &app.dialog {
        draw_error_dialog(frame, area, dialog);
    }
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App) {
    let [column] = Layout::horizontal([Constraint::Max(CONTENT_WIDTH)])
        .flex(Flex::Center)
        .areas(area);

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Length(12),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(column);

    draw_header(frame, chunks[0]);
    draw_status(frame, chunks[1], app);
    if app.widgets.loader.is_running() {
        draw_loader(frame, chunks[2], app.widgets.loader.angle());
    }

    let sections = Layout::vertical([Constraint::Length(4); 3]).split(chunks[3]);
    draw_metric(frame, sections[0], &app.widgets.download, DOWNLOAD);
    draw_metric(frame, sections[1], &app.widgets.upload, UPLOAD);
    draw_metric(frame, sections[2], &app.widgets.ping, PING);

    draw_trigger(frame, chunks[4], app);
    draw_help(frame, chunks[6], app);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(RULE));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let title = Paragraph::new("Internet Speed Checker")
        .style(Style::default().fg(TEXT).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, inner);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let status = &app.widgets.status;
    let color = match status.tone {
        StatusTone::Neutral => TEXT_DIM,
        StatusTone::Active => ACTIVE,
        StatusTone::Success => SUCCESS,
        StatusTone::Error => FAILURE,
    };

    frame.render_widget(
        Paragraph::new(status.text.as_str())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_loader(frame: &mut Frame, area: Rect, angle: u16) {
    let [spot] = Layout::horizontal([Constraint::Length(8)])
        .flex(Flex::Center)
        .areas(area);

    let points = arc_points(angle);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.2, 1.2])
        .y_bounds([-1.2, 1.2])
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &points,
                color: ACTIVE,
            });
        });

    frame.render_widget(canvas, spot);
}

/// Unit-circle points of the loader arc, counter-clockwise from `start` degrees.
fn arc_points(start: u16) -> Vec<(f64, f64)> {
    (0..=LOADER_ARC_EXTENT)
        .step_by(3)
        .map(|offset| {
            let radians = f64::from(start + offset).to_radians();
            (radians.cos(), radians.sin())
        })
        .collect()
}

fn draw_metric(frame: &mut Frame, area: Rect, metric: &MetricDisplay, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(RULE))
        .title(Span::styled(
            format!(" {} ", metric.title),
            Style::default().fg(color),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    frame.render_widget(
        Paragraph::new(format!(" {}", metric.value))
            .style(Style::default().fg(TEXT).add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    draw_progress_bar(frame, chunks[1], metric.bar.value() / 100.0, color);
}

fn draw_progress_bar(frame: &mut Frame, area: Rect, ratio: f64, color: Color) {
    if area.width < 4 {
        return;
    }

    let width = (area.width - 2) as usize;
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);

    let bar = Line::from(vec![
        Span::raw(" "),
        Span::styled("━".repeat(filled), Style::default().fg(color)),
        Span::styled("━".repeat(empty), Style::default().fg(RULE)),
        Span::raw(" "),
    ]);

    frame.render_widget(Paragraph::new(bar), area);
}

fn draw_trigger(frame: &mut Frame, area: Rect, app: &App) {
    let trigger = &app.widgets.trigger;
    let [button] = Layout::horizontal([Constraint::Length(24)])
        .flex(Flex::Center)
        .areas(area);

    let (label_style, border_color) = if trigger.enabled {
        (Style::default().fg(ACTIVE).add_modifier(Modifier::BOLD), ACTIVE)
    } else {
        (Style::default().fg(TEXT_FAINT), RULE)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    frame.render_widget(
        Paragraph::new(trigger.label)
            .style(label_style)
            .alignment(Alignment::Center)
            .block(block),
        button,
    );
}

fn draw_help(frame: &mut Frame, area: Rect, app: &App) {
    let help = if app.dialog.is_some() {
        "enter dismiss"
    } else if app.widgets.trigger.enabled {
        "enter test · q quit"
    } else {
        "q quit"
    };

    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(TEXT_FAINT))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_error_dialog(frame: &mut Frame, area: Rect, dialog: &ErrorDialog) {
    let [row] = Layout::vertical([Constraint::Length(10)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(56)])
        .flex(Flex::Center)
        .areas(row);

    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(FAILURE))
        .title(Span::styled(
            format!(" {} ", dialog.title),
            Style::default().fg(FAILURE).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [body, footer] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    frame.render_widget(
        Paragraph::new(dialog.message.as_str())
            .style(Style::default().fg(TEXT))
            .wrap(Wrap { trim: false }),
        body,
    );
    frame.render_widget(
        Paragraph::new("[ OK ]")
            .style(Style::default().fg(FAILURE).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        footer,
    );
}
