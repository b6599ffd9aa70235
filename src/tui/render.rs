//! Draws the demo scene: window layer, popup stack, loading mask, toasts, a
//! state sidebar and the most recent log lines.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::demo::{Card, DemoScene, Phase};
use crate::kernel::services::ports::{InstanceId, Layer};
use crate::kernel::{FocusOwner, LifecycleState};

const SIDEBAR_WIDTH: u16 = 34;
const LOG_HEIGHT: u16 = 8;
const HELP: &str = "1-3 window  w close  i/o/c/x popup  z close top  Esc back  t/d toast  m mask  s/r swap mask  space pause  +/- latency  q quit";

pub fn render(scene: &DemoScene, frame: &mut Frame) {
    let area = frame.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(LOG_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
        .split(rows[0]);

    let stage = cols[0];
    render_window(scene, frame, stage);
    render_popups(scene, frame, stage);
    render_mask(scene, frame, stage);
    render_toasts(scene, frame, stage);
    render_sidebar(scene, frame, cols[1]);
    render_logs(scene, frame, rows[1]);

    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );
}

fn render_window(scene: &DemoScene, frame: &mut Frame, area: Rect) {
    let board = scene.board();
    let card = scene
        .scene()
        .active_in(Layer::Window)
        .last()
        .and_then(|id| board.cards.get(id));

    let Some(card) = card else {
        let text = match (scene.ui().current_window(), scene.ui().window_state()) {
            (Some(name), Some(LifecycleState::Loading)) => format!("loading {name}..."),
            (Some(name), _) => format!("{name} (no view)"),
            (None, _) => "no window".to_string(),
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("window")),
            area,
        );
        return;
    };

    frame.render_widget(card_widget(card, "window"), area);
}

fn render_popups(scene: &DemoScene, frame: &mut Frame, area: Rect) {
    let board = scene.board();
    let names = scene.ui().popup_names();

    // Stack order first; popups still playing their close animation go on top.
    let mut shown: Vec<(usize, InstanceId, &Card)> = scene
        .scene()
        .active_in(Layer::Popup)
        .into_iter()
        .filter_map(|id| {
            let card = board.cards.get(&id)?;
            let depth = if card.closing {
                usize::MAX
            } else {
                names.iter().position(|n| *n == card.name)?
            };
            Some((depth, id, card))
        })
        .collect();
    shown.sort_by_key(|(depth, id, _)| (*depth, *id));

    for (step, (_, _, card)) in shown.into_iter().enumerate() {
        let offset = (step as u16).saturating_mul(2);
        let (width, height) = if card.overlay { (28, 5) } else { (44, 9) };
        let Some(rect) = centered(area, width, height, offset) else {
            continue;
        };
        frame.render_widget(Clear, rect);
        frame.render_widget(card_widget(card, "popup"), rect);
    }
}

fn render_mask(scene: &DemoScene, frame: &mut Frame, area: Rect) {
    let board = scene.board();
    let mask = &board.mask;
    let style = match mask.phase {
        Phase::Hidden => return,
        Phase::Shown => Style::default().fg(Color::Yellow),
        Phase::Leaving => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::DIM),
    };
    let Some(rect) = centered(area, 30, 3, 0) else {
        return;
    };
    let label = match mask.phase {
        Phase::Leaving => format!("{} mask fading", mask.style),
        _ => format!("loading ({} mask)", mask.style),
    };
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(label)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style)),
        rect,
    );
}

fn render_toasts(scene: &DemoScene, frame: &mut Frame, area: Rect) {
    let board = scene.board();
    let bottom = area.y.saturating_add(area.height);
    let mut y = bottom.saturating_sub(4);
    for toast in board.toasts.iter().filter(|t| t.phase != Phase::Hidden) {
        let width = (toast.content.chars().count() as u16)
            .saturating_add(4)
            .min(area.width);
        let x = area.x + area.width.saturating_sub(width) / 2;
        if y < area.y {
            break;
        }
        let rect = Rect::new(x, y, width, 3);
        let style = match toast.phase {
            Phase::Leaving => Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM),
            _ => Style::default().fg(Color::Cyan),
        };
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.content.as_str())
                .style(style)
                .block(Block::default().borders(Borders::ALL).border_style(style)),
            rect,
        );
        y = y.saturating_sub(3);
    }
}

fn render_sidebar(scene: &DemoScene, frame: &mut Frame, area: Rect) {
    let ui = scene.ui();
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled("window", heading)));
    lines.push(Line::from(match (ui.current_window(), ui.window_state()) {
        (Some(name), Some(state)) => format!("  {name} {state:?}"),
        _ => "  -".to_string(),
    }));

    lines.push(Line::from(Span::styled("popups (top last)", heading)));
    let names = ui.popup_names();
    if names.is_empty() {
        lines.push(Line::from("  -"));
    }
    for name in &names {
        let visible = ui.popup_visible(name).unwrap_or(false);
        lines.push(Line::from(format!(
            "  {name}{}",
            if visible { "" } else { " (hidden)" }
        )));
    }

    lines.push(Line::from(Span::styled("focus", heading)));
    lines.push(Line::from(match ui.focus_owner() {
        Some(FocusOwner::Window(name)) => format!("  window {name}"),
        Some(FocusOwner::Popup(name)) => format!("  popup {name}"),
        Some(FocusOwner::LoadingMask) => "  loading mask".to_string(),
        None => "  -".to_string(),
    }));

    lines.push(Line::from(Span::styled("loading mask", heading)));
    lines.push(Line::from(format!(
        "  held {} visible {}",
        ui.loading_mask_held(),
        ui.loading_mask_visible()
    )));

    lines.push(Line::from(Span::styled("toast", heading)));
    lines.push(Line::from(format!(
        "  {} on screen {}",
        ui.toast_content().unwrap_or("-"),
        ui.toasts_on_screen()
    )));

    lines.push(Line::from(Span::styled("loads in flight", heading)));
    let in_flight = scene.in_flight();
    if in_flight.is_empty() {
        lines.push(Line::from("  -"));
    }
    for (kind, name, left) in in_flight {
        lines.push(Line::from(format!("  {kind:?} {name} {left:.1}s")));
    }

    let stats = ui.stats();
    lines.push(Line::from(Span::styled("pools live/free/built", heading)));
    for (label, s) in [
        ("window", stats.windows),
        ("popup", stats.popups),
        ("toast", stats.toasts),
    ] {
        lines.push(Line::from(format!(
            "  {label:<7}{}/{}/{}",
            s.live, s.free, s.constructed
        )));
    }

    lines.push(Line::from(format!(
        "latency {:.1}s{}",
        scene.latency(),
        if scene.is_paused() { "  PAUSED" } else { "" }
    )));

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("state")),
        area,
    );
}

fn render_logs(scene: &DemoScene, frame: &mut Frame, area: Rect) {
    let logs = scene.logs();
    let rows = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = logs
        .iter()
        .skip(logs.len().saturating_sub(rows))
        .map(|l| Line::from(l.as_str()))
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("log")),
        area,
    );
}

fn card_widget<'a>(card: &'a Card, kind: &'static str) -> Paragraph<'a> {
    let border = if card.focused {
        Style::default().fg(Color::Green)
    } else if card.closing {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let mut title = format!("{kind}: {}", card.name);
    if card.overlay {
        title.push_str(" (overlay)");
    }
    if card.closing {
        title.push_str(" closing");
    }
    let lines = vec![
        Line::from(format!("param {}", card.param.as_deref().unwrap_or("-"))),
        Line::from(format!(
            "last key {}",
            card.last_key
                .map(|k| format!("{k:?}"))
                .unwrap_or_else(|| "-".to_string())
        )),
        Line::from(if card.focused { "focused" } else { "" }),
    ];
    Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    )
}

fn centered(area: Rect, width: u16, height: u16, offset: u16) -> Option<Rect> {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    if width < 10 || height < 3 {
        return None;
    }
    let x = area.x + area.width.saturating_sub(width) / 2 + offset;
    let y = area.y + area.height.saturating_sub(height) / 2 + offset / 2;
    let right = area.x.saturating_add(area.width);
    let bottom = area.y.saturating_add(area.height);
    Some(Rect::new(
        x.min(right.saturating_sub(width)),
        y.min(bottom.saturating_sub(height)),
        width,
        height,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/tui/render.rs"]
mod tests;
