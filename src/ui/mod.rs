use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, EDITOR_GUTTER_WIDTH};
use crate::chat::{ChatMessage, Sender};
use crate::definitions::{DevelopTab, FocusArea, HitTarget, PanelId};
use crate::workspace::preview::SANDBOX_ATTRIBUTES;

mod theme;
use theme::*;

const SIDEBAR_WIDTH: u16 = 5;
const CHAT_MIN_WIDTH: u16 = 28;
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 16;

const INPUT_PLACEHOLDER: &str = "Want to change anything? Type your message...";
const DISCLAIMER: &str =
    "AI responses may be inaccurate or incomplete. Please verify important information.";

const QUICK_ACCESS: [&str; 3] = [
    "Patient Intake Form",
    "Appointment Scheduler",
    "Clinical Guidelines",
];

/// Output of the Develop › Terminal tab. There is no real process behind it.
const TERMINAL_LINES: [&str; 8] = [
    "$ npm install",
    "...",
    "$ npm start",
    "Compiled successfully!",
    "You can now view your app in the browser.",
    "  Local:            http://localhost:3000",
    "  On Your Network:  http://192.168.1.10:3000",
    "$ ▋",
];

fn cell_width(text: &str) -> u16 {
    UnicodeWidthStr::width(text).min(u16::MAX as usize) as u16
}

pub fn render(f: &mut Frame<'_>, app: &mut App) {
    let size = f.size();
    app.hits.clear();
    if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
        let block = Paragraph::new(format!(
            "Terminal too small; resize to at least {MIN_WIDTH}x{MIN_HEIGHT}."
        ))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title("Mission Control")
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(FG_PRIMARY).bg(BG_PRIMARY));
        f.render_widget(block, size);
        return;
    }

    let base = Block::default().style(Style::default().bg(BG_PRIMARY));
    f.render_widget(base, size);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(size);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(vertical[0]);

    render_sidebar(f, app, body[0]);
    render_workspace(f, app, body[1]);
    render_control_bar(f, app, vertical[1]);
}

fn render_sidebar(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    f.render_widget(
        Block::default().style(Style::default().bg(BG_SIDEBAR)),
        area,
    );
    let active = app.layout.active_panel();
    let area_bottom = area.y.saturating_add(area.height);
    for (idx, panel) in PanelId::ALL.iter().enumerate() {
        let y = area.y.saturating_add(1 + idx as u16 * 3);
        if y.saturating_add(3) > area_bottom {
            break;
        }
        let rect = Rect {
            x: area.x,
            y,
            width: area.width,
            height: 3,
        };
        let style = if active == Some(*panel) {
            Style::default()
                .fg(BAR_HIGHLIGHT_TEXT)
                .bg(BAR_HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(FG_PRIMARY).bg(BG_SIDEBAR)
        };
        let button = Paragraph::new(vec![
            Line::from(format!("[{}]", panel.glyph())),
            Line::from(Span::styled(
                format!("F{}", idx + 2),
                Style::default().fg(FG_DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .style(style);
        f.render_widget(button, rect);
        app.hits.register(HitTarget::SidebarButton(*panel), rect);
    }
}

/// Side panel, divider and chat. The panel width comes from the animated
/// layout, capped so the chat keeps a usable width.
fn render_workspace(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    app.layout.set_container_width(area.width);
    let max_panel = area.width.saturating_sub(CHAT_MIN_WIDTH + 1);
    let panel_width = app.layout.panel_width_cells().min(max_panel);
    if panel_width == 0 {
        render_chat(f, app, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(panel_width),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
    render_side_panel(f, app, columns[0]);
    render_divider(f, app, columns[1]);
    render_chat(f, app, columns[2]);
}

fn focus_block(title: &str, focused: bool) -> Block<'static> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_IDLE))
        .title(Span::styled(title.to_string(), Style::default().fg(FG_PRIMARY)))
        .style(Style::default().bg(BG_PANEL));
    if focused {
        block = block.border_style(
            Style::default()
                .fg(BORDER_FOCUS)
                .add_modifier(Modifier::BOLD),
        );
    }
    block
}

fn render_divider(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let color = if app.layout.is_resizing() {
        DIVIDER_ACTIVE
    } else {
        BORDER_IDLE
    };
    let lines: Vec<Line> = (0..area.height).map(|_| Line::from("│")).collect();
    f.render_widget(
        Paragraph::new(lines).style(Style::default().fg(color).bg(BG_PRIMARY)),
        area,
    );
    app.hits.register(HitTarget::Divider, area);
}

fn render_side_panel(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let active = app.layout.active_panel();
    let title = active.map(|panel| panel.label()).unwrap_or_default();
    let block = focus_block(title, active.is_some() && app.focus == FocusArea::Panel);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    // Still collapsing after a close: draw the empty frame only.
    let Some(panel) = active else {
        return;
    };
    app.hits.register(HitTarget::PanelBody, inner);
    if area.width > 8 {
        let close = Rect {
            x: area.x + area.width - 4,
            y: area.y,
            width: 3,
            height: 1,
        };
        f.render_widget(
            Paragraph::new("[x]").style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL)),
            close,
        );
        app.hits.register(HitTarget::PanelClose, close);
    }

    match panel {
        PanelId::Browser => render_browser(f, inner),
        PanelId::Develop => render_develop(f, app, inner),
        PanelId::Tools => render_tools(f, app, inner),
    }
}

fn render_browser(f: &mut Frame<'_>, area: Rect) {
    let heading = Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(
            "Welcome to Mission Control",
            Style::default().fg(USER_ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Access your healthcare tools, forms, assessments and educational resources in one organized place.",
            Style::default().fg(FG_PRIMARY),
        )),
        Line::default(),
        Line::from(Span::styled("Quick Access", heading)),
    ];
    lines.extend(QUICK_ACCESS.iter().map(|name| {
        Line::from(Span::styled(
            format!("  ▸ {name}"),
            Style::default().fg(FG_PRIMARY),
        ))
    }));
    lines.extend([
        Line::default(),
        Line::from(Span::styled("Featured Resource", heading)),
        Line::from(Span::styled(
            "Advanced Diagnostics",
            Style::default().fg(TOOL_ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Explore the latest tools and techniques for more accurate and faster patient diagnostics.",
            Style::default().fg(FG_DIM),
        )),
    ]);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(BG_PANEL));
    f.render_widget(paragraph, area);
}

fn render_develop(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    render_develop_tabs(f, app, rows[0]);
    match app.document.active_tab() {
        DevelopTab::Editor => render_editor(f, app, rows[1]),
        DevelopTab::Preview => render_preview(f, app, rows[1]),
        DevelopTab::Terminal => render_terminal(f, rows[1]),
    }
}

fn render_develop_tabs(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let active = app.document.active_tab();
    let area_end = area.x.saturating_add(area.width);
    let mut cursor = area.x;
    let mut spans: Vec<Span> = Vec::new();

    for tab in DevelopTab::ALL {
        if cursor >= area_end {
            break;
        }
        let label = format!(" {} ", tab.label());
        let width = cell_width(&label).min(area_end - cursor);
        let style = if tab == active {
            Style::default()
                .fg(BAR_HIGHLIGHT_TEXT)
                .bg(BAR_HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(FG_DIM).bg(BG_PANEL)
        };
        spans.push(Span::styled(label, style));
        app.hits.register(
            HitTarget::DevelopTab(tab),
            Rect {
                x: cursor,
                y: area.y,
                width,
                height: 1,
            },
        );
        cursor = cursor.saturating_add(width);
        if cursor < area_end {
            spans.push(Span::raw(" "));
            cursor = cursor.saturating_add(1);
        }
    }

    if app.animator.is_revealing() {
        let (done, total) = app.animator.progress();
        spans.push(Span::styled(
            format!(" typing {done}/{total}"),
            Style::default().fg(RESEARCH_BADGE),
        ));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG_PANEL)),
        area,
    );
}

/// Draws the animator's displayed text, which equals the document text
/// whenever no reveal is running.
fn render_editor(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let height = area.height as usize;
    if height == 0 {
        return;
    }
    let text_width = area.width.saturating_sub(EDITOR_GUTTER_WIDTH).max(1) as usize;
    let revealing = app.animator.is_revealing();
    let show_cursor = !revealing && app.focus == FocusArea::Panel;
    let total = app.animator.displayed().split('\n').count();
    let (cursor_line, cursor_col) = app.document.cursor_position();

    if revealing {
        // follow the text as it is typed
        app.editor_scroll = total.saturating_sub(height);
    } else if show_cursor {
        if cursor_line < app.editor_scroll {
            app.editor_scroll = cursor_line;
        } else if cursor_line >= app.editor_scroll + height {
            app.editor_scroll = cursor_line + 1 - height;
        }
    }
    app.editor_scroll = app.editor_scroll.min(total.saturating_sub(1));
    let scroll = app.editor_scroll;

    let rows: Vec<Line> = app
        .animator
        .displayed()
        .split('\n')
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(idx, line)| {
            let highlight = show_cursor && idx == cursor_line;
            let (fg, bg) = if highlight {
                (EDITOR_LINE_HIGHLIGHT_FG, EDITOR_LINE_HIGHLIGHT_BG)
            } else {
                (FG_PRIMARY, BG_PANEL)
            };
            Line::from(vec![
                Span::styled(
                    format!("{:>4} │ ", idx + 1),
                    Style::default().fg(GUTTER_FG).bg(bg),
                ),
                Span::styled(clip_to_width(line, text_width), Style::default().fg(fg).bg(bg)),
            ])
        })
        .collect();

    f.render_widget(
        Paragraph::new(rows).style(Style::default().bg(BG_PANEL)),
        area,
    );

    if show_cursor && cursor_line >= scroll && cursor_line < scroll + height {
        let column: usize = app
            .animator
            .displayed()
            .split('\n')
            .nth(cursor_line)
            .map(|line| {
                line.chars()
                    .take(cursor_col)
                    .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
                    .sum()
            })
            .unwrap_or(0);
        let cursor_x = area
            .x
            .saturating_add(EDITOR_GUTTER_WIDTH)
            .saturating_add(column.min(text_width - 1) as u16);
        let cursor_y = area.y.saturating_add((cursor_line - scroll) as u16);
        f.set_cursor(cursor_x, cursor_y);
    }
}

fn render_preview(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let title = app
        .preview
        .title()
        .unwrap_or("Untitled document")
        .to_string();
    let header = Line::from(vec![
        Span::styled(
            title,
            Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  reload #{}", app.preview.generation()),
            Style::default().fg(FG_DIM),
        ),
    ]);
    f.render_widget(
        Paragraph::new(header).style(Style::default().bg(BG_PANEL)),
        rows[0],
    );

    let body_width = rows[1].width.max(1) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for line in app.preview.lines() {
        push_wrapped_line(&mut lines, line, Style::default().fg(FG_PRIMARY), body_width);
    }
    app.preview_scroll = app.preview_scroll.min(lines.len().saturating_sub(1));
    let visible: Vec<Line> = lines.into_iter().skip(app.preview_scroll).collect();
    f.render_widget(
        Paragraph::new(visible).style(Style::default().bg(BG_PANEL)),
        rows[1],
    );

    let footer = format!("sandbox: {SANDBOX_ATTRIBUTES} · Ctrl+E export");
    f.render_widget(
        Paragraph::new(Span::styled(footer, Style::default().fg(FG_DIM)))
            .style(Style::default().bg(BG_PANEL)),
        rows[2],
    );
}

fn render_terminal(f: &mut Frame<'_>, area: Rect) {
    let lines: Vec<Line> = TERMINAL_LINES
        .iter()
        .map(|line| {
            let color = if line.starts_with("Compiled") {
                TERMINAL_OK
            } else {
                FG_DIM
            };
            Line::from(Span::styled(*line, Style::default().fg(color)))
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(BG_PANEL)),
        area,
    );
}

fn render_tools(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = rows[0];
    let width = list_area.width.max(1) as usize;

    let specs = app.chat.tools().specs();
    let items: Vec<ListItem> = specs
        .iter()
        .map(|spec| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    spec.name.clone(),
                    Style::default().fg(TOOL_ACCENT).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    clip_to_width(&spec.description, width),
                    Style::default().fg(FG_DIM),
                )),
            ])
        })
        .collect();

    let mut state = ListState::default();
    if !specs.is_empty() {
        state.select(Some(app.tool_selected.min(specs.len() - 1)));
    }
    let list = List::new(items)
        .style(Style::default().bg(BG_PANEL))
        .highlight_style(Style::default().bg(LIST_HIGHLIGHT_BG));
    f.render_stateful_widget(list, list_area, &mut state);

    let list_bottom = list_area.y.saturating_add(list_area.height);
    for (row, index) in (state.offset()..specs.len()).enumerate() {
        let y = list_area.y.saturating_add(row as u16 * 2);
        if y.saturating_add(2) > list_bottom {
            break;
        }
        app.hits.register(
            HitTarget::ToolEntry(index),
            Rect {
                x: list_area.x,
                y,
                width: list_area.width,
                height: 2,
            },
        );
    }

    f.render_widget(
        Paragraph::new(Span::styled(
            "↑/↓ select · Enter: /tool command in chat",
            Style::default().fg(FG_DIM),
        ))
        .style(Style::default().bg(BG_PANEL)),
        rows[1],
    );
}

fn render_chat(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Length(2),
        ])
        .split(area);

    render_chat_history(f, app, sections[0]);
    render_chat_activity(f, app, sections[1]);
    render_chat_input(f, app, sections[2]);

    f.render_widget(
        Paragraph::new(Span::styled(DISCLAIMER, Style::default().fg(FG_DIM)))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Style::default().bg(BG_PRIMARY)),
        sections[3],
    );
}

fn render_chat_history(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let mut title = vec![Span::styled("AI Chat", Style::default().fg(FG_PRIMARY))];
    if app.chat.deep_research() {
        title.push(Span::styled(
            " [Deep Research]",
            Style::default()
                .fg(RESEARCH_BADGE)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_IDLE))
        .title(Line::from(title))
        .style(Style::default().bg(BG_PANEL));
    if app.focus == FocusArea::Chat {
        block = block.border_style(
            Style::default()
                .fg(BORDER_FOCUS)
                .add_modifier(Modifier::BOLD),
        );
    }
    let wrap_width = block.inner(area).width.max(1) as usize;

    let conversation = app.chat.conversation();
    let items: Vec<ListItem> = conversation
        .messages()
        .iter()
        .map(|message| message_item(message, wrap_width))
        .collect();
    let mut state = ListState::default();
    state.select(Some(conversation.selected_index()));

    let list = List::new(items)
        .block(block)
        .style(Style::default().bg(BG_PANEL))
        .highlight_style(Style::default().bg(LIST_HIGHLIGHT_BG));
    f.render_stateful_widget(list, area, &mut state);
    app.hits.register(HitTarget::ChatHistory, area);
}

fn message_item(message: &ChatMessage, width: usize) -> ListItem<'static> {
    let accent = match message.sender {
        Sender::User => USER_ACCENT,
        Sender::Ai => AI_ACCENT,
    };
    let mut header = vec![Span::styled(
        message.sender.label(),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )];
    if let Some(timestamp) = message.timestamp.as_ref() {
        header.push(Span::styled(
            format!("  {timestamp}"),
            Style::default().fg(FG_DIM),
        ));
    }

    let mut lines = vec![Line::from(header)];
    for line in message.text.lines() {
        push_wrapped_line(&mut lines, line, Style::default().fg(FG_PRIMARY), width);
    }
    if let Some(tool) = message.tool_suggestion.as_ref() {
        push_wrapped_line(
            &mut lines,
            &format!("Tool Suggestion: {tool}"),
            Style::default().fg(TOOL_ACCENT),
            width,
        );
    }
    if let Some(reasoning) = message.reasoning.as_ref() {
        push_wrapped_line(
            &mut lines,
            reasoning,
            Style::default().fg(FG_DIM).add_modifier(Modifier::ITALIC),
            width,
        );
    }
    if let Some(action) = message.preview_action.as_ref() {
        push_wrapped_line(
            &mut lines,
            &format!(
                "Preview → {} › {}",
                action.target_panel.label(),
                action.target_develop_tab.label()
            ),
            Style::default().fg(TOOL_ACCENT),
            width,
        );
    }
    lines.push(Line::default());
    ListItem::new(lines)
}

fn render_chat_activity(f: &mut Frame<'_>, app: &App, area: Rect) {
    let line = if app.chat.is_loading() {
        let verb = if app.chat.deep_research() {
            "researching"
        } else {
            "thinking"
        };
        Line::from(vec![
            Span::styled(
                format!(" {} Assistant is {verb}…", app.spinner()),
                Style::default().fg(RESEARCH_BADGE),
            ),
            Span::styled("  Esc cancels", Style::default().fg(FG_DIM)),
        ])
    } else {
        Line::default()
    };
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(BG_PRIMARY)),
        area,
    );
}

fn render_chat_input(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let focused = app.focus == FocusArea::Chat;
    let block = focus_block("Message (Enter send / Shift+Enter newline)", focused);
    let inner = block.inner(area);

    let text = app.composer.text();
    let input_lines: Vec<Line> = if text.is_empty() {
        vec![Line::from(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(FG_DIM),
        ))]
    } else {
        text.split('\n')
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(FG_PRIMARY),
                ))
            })
            .collect()
    };

    let (row, col) = app.composer.cursor_position();
    let visible_rows = inner.height.max(1) as usize;
    let scroll = row.saturating_sub(visible_rows - 1);
    let paragraph = Paragraph::new(input_lines)
        .block(block)
        .style(Style::default().bg(BG_PANEL))
        .scroll((scroll as u16, 0));

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
    app.hits.register(HitTarget::ChatInput, area);

    if focused && inner.width > 0 {
        let column: usize = text
            .split('\n')
            .nth(row)
            .map(|line| {
                line.chars()
                    .take(col)
                    .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
                    .sum()
            })
            .unwrap_or(0);
        let cursor_x = inner
            .x
            .saturating_add(column.min(inner.width as usize - 1) as u16);
        let cursor_y = inner.y.saturating_add((row - scroll) as u16);
        f.set_cursor(cursor_x, cursor_y);
    }
}

fn render_control_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let panel = match app.layout.active_panel() {
        Some(panel) => format!("{} {:.0}%", panel.label(), app.layout.width_percent()),
        None => String::from("closed"),
    };
    let segments = [
        format!("[FOCUS:{}]", app.focus.label()),
        format!("[PANEL:{panel}]"),
        format!("[TAB:{}]", app.document.active_tab().label()),
        format!("[AI:{}]", app.chat.generator_name()),
        format!(
            "[RESEARCH:{}]",
            if app.chat.deep_research() { "ON" } else { "OFF" }
        ),
    ];

    let mut spans: Vec<Span> = Vec::new();
    for segment in segments {
        spans.push(Span::styled(
            segment,
            Style::default().fg(BAR_TEXT).bg(BAR_BG),
        ));
        spans.push(Span::styled(" ", Style::default().bg(BAR_BG)));
    }
    spans.push(Span::styled(
        app.status_message.clone(),
        Style::default()
            .fg(BAR_HIGHLIGHT_TEXT)
            .bg(BAR_BG)
            .add_modifier(Modifier::BOLD),
    ));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().fg(BAR_TEXT).bg(BAR_BG))
            .alignment(Alignment::Left),
        area,
    );
}

fn push_wrapped_line(lines: &mut Vec<Line<'static>>, text: &str, style: Style, width: usize) {
    for segment in wrap_to_width(text, width) {
        lines.push(Line::from(Span::styled(segment, style)));
    }
}

fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
        if current_width + ch_width > width && !current.is_empty() {
            result.push(current);
            current = String::new();
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    result.push(current);
    result
}

/// Cuts `text` to at most `width` terminal cells.
fn clip_to_width(text: &str, width: usize) -> String {
    let mut used = 0usize;
    text.chars()
        .take_while(|ch| {
            used += UnicodeWidthChar::width(*ch).unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::app::CommandAction;
    use crate::app::test_app;
    use crate::chat::orchestrator::tests::Behaviour;

    fn app() -> App {
        test_app(Behaviour::Fail)
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn first_frame_shows_chat_and_sidebar() {
        let mut app = app();
        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("AI Chat"));
        assert!(screen.contains("[B]"));
        assert_eq!(
            app.hits.hit_test(2, 2),
            Some(HitTarget::SidebarButton(PanelId::Browser))
        );
        assert_eq!(app.hits.hit_test(2, 5), Some(HitTarget::SidebarButton(PanelId::Develop)));
    }

    #[test]
    fn open_panel_registers_divider_after_transition() {
        let mut app = app();
        draw(&mut app, 120, 40);
        app.execute_action(CommandAction::TogglePanel(PanelId::Tools));
        while app.on_frame() {}
        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("searchDrugLabel"));

        let divider_x = SIDEBAR_WIDTH + app.layout.panel_width_cells();
        assert_eq!(app.hits.hit_test(divider_x, 10), Some(HitTarget::Divider));
        assert_eq!(app.hits.hit_test(divider_x - 4, 0), Some(HitTarget::PanelClose));
    }

    #[test]
    fn develop_tabs_are_clickable() {
        let mut app = app();
        app.execute_action(CommandAction::TogglePanel(PanelId::Develop));
        while app.on_frame() {}
        draw(&mut app, 120, 40);
        let tab = (SIDEBAR_WIDTH..120)
            .find_map(|x| match app.hits.hit_test(x, 1) {
                Some(HitTarget::DevelopTab(tab)) => Some(tab),
                _ => None,
            });
        assert_eq!(tab, Some(DevelopTab::Editor));
    }

    #[test]
    fn small_terminal_shows_notice_only() {
        let mut app = app();
        let screen = draw(&mut app, 40, 10);
        assert!(screen.contains("Terminal too small"));
        assert_eq!(app.hits.hit_test(2, 2), None);
    }

    #[test]
    fn clip_respects_wide_characters() {
        assert_eq!(clip_to_width("abcdef", 3), "abc");
        assert_eq!(clip_to_width("日本語", 4), "日本");
        assert_eq!(wrap_to_width("abcd", 2), vec!["ab", "cd"]);
    }
}
