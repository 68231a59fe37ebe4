use assistant_core::{view, ChatRole, SessionSnapshot};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, prompt, transcript, response/image, footer
    let [header_area, prompt_area, transcript_area, result_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Min(5),
        Constraint::Length(6),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_prompt(app, frame, prompt_area);
    render_transcript(app, frame, transcript_area);
    render_result(app, frame, result_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" LangChain Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let prompt = app.session.prompt();
    let text = if prompt.is_empty() && !editing {
        Text::from(Span::styled("Enter your prompt...", Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(prompt)
    };

    let input = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Prompt "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(input, area);

    if editing {
        // Place the cursor, assuming the prompt fits on one wrapped row per width
        let inner_width = area.width.saturating_sub(2).max(1) as usize;
        let row = (app.prompt_cursor / inner_width) as u16;
        let col = (app.prompt_cursor % inner_width) as u16;
        frame.set_cursor_position((area.x + 1 + col, area.y + 1 + row));
    }
}

fn transcript_lines(snapshot: &SessionSnapshot<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in view::transcript(snapshot.conversation) {
        let style = match entry.role {
            ChatRole::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ChatRole::Assistant => Style::default().fg(Color::White),
        };
        let mut content = entry.content.lines();
        let first = content.next().unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", entry.speaker), style.add_modifier(Modifier::BOLD)),
            Span::styled(first.to_string(), style),
        ]));
        for rest in content {
            lines.push(Line::styled(rest.to_string(), style));
        }
    }
    lines
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let snapshot = app.session.snapshot();
    let lines = transcript_lines(&snapshot);

    // Rough wrapped height so following the tail keeps the newest turn visible
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let inner_height = area.height.saturating_sub(2);
    let total: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let max_scroll = (total as u16).saturating_sub(inner_height);

    if app.follow_transcript {
        app.transcript_scroll = max_scroll;
    } else {
        app.transcript_scroll = app.transcript_scroll.min(max_scroll);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");
    let transcript = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.transcript_scroll, 0));
    frame.render_widget(transcript, area);
}

fn render_result(app: &App, frame: &mut Frame, area: Rect) {
    let snapshot = app.session.snapshot();
    let block = Block::default().borders(Borders::ALL).title(" Response ");

    let body: Text = if snapshot.loading {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        Text::from(Span::styled(
            format!("{}{}", view::status_line(&snapshot).trim_end_matches('.'), dots),
            Style::default().fg(Color::Gray).italic(),
        ))
    } else if let Some(image) = view::image_preview(&snapshot) {
        Text::from(vec![
            Line::from(Span::styled(
                format!("🖼  Image ready ({} KB PNG)", image.decoded_len() / 1024),
                Style::default().fg(Color::Green),
            )),
            Line::from(Span::styled(
                "Press s to save it to the gallery",
                Style::default().fg(Color::DarkGray),
            )),
        ])
    } else if let Some(text) = view::response_panel(&snapshot) {
        Text::from(text.to_string())
    } else {
        Text::default()
    };

    let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let line = if let Some(notice) = &app.notice {
        Line::from(vec![
            Span::styled(format!(" {} ", notice.title), Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::raw(" "),
            Span::raw(notice.body.clone()),
        ])
    } else {
        let hint = match app.input_mode {
            InputMode::Editing => " Enter chat · Esc commands · Ctrl-C quit",
            InputMode::Normal => " i edit · c chat · m image · v voice · s save · j/k scroll · q quit",
        };
        let mut spans = vec![Span::styled(hint, Style::default().fg(Color::DarkGray))];
        if app.saving {
            spans.push(Span::styled("  saving...", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}
