use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, EditForm, FormField, ListForm, Screen};
use crate::model::Task;
use crate::tasks::countdown;

// ─── Root draw ────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let now  = Utc::now();

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg()).fg(app.theme.fg())),
        area,
    );

    // [ list tabs(3) | tasks | error(1) | status(1) ]
    let rows = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ]).split(area);

    draw_lists(f, app, rows[0]);
    draw_tasks(f, app, rows[1], now);
    draw_error(f, app, rows[2]);
    draw_statusbar(f, app, rows[3]);

    match &app.screen {
        Screen::Edit(form)     => draw_form(f, area, app, form),
        Screen::ListEdit(form) => draw_list_form(f, area, app, form),
        Screen::Help           => draw_help(f, area, app),
        Screen::Home           => {}
    }
}

// ─── List tabs ────────────────────────────────────────────────────────────────

fn draw_lists(f: &mut Frame, app: &App, area: Rect) {
    let t     = &app.theme;
    let block = panel(app, " Lists ", false);

    if app.lists.is_empty() {
        f.render_widget(
            Paragraph::new("  No lists").block(block).style(Style::default().fg(t.fg_dim())),
            area,
        );
        return;
    }

    let (sel_bg, sel_fg) = t.selected_highlight();
    let mut spans = Vec::with_capacity(app.lists.len() * 2);
    for list in &app.lists {
        let active = app.view.selected_list.as_deref() == Some(list.id.as_str());
        let style  = if active {
            Style::default().bg(sel_bg).fg(sel_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.fg())
        };
        spans.push(Span::styled(format!(" {} ", list.title), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ─── Tasks panel ──────────────────────────────────────────────────────────────

fn draw_tasks(f: &mut Frame, app: &App, area: Rect, now: DateTime<Utc>) {
    let t       = &app.theme;
    let title   = format!(" Tasks — {} ", app.view.mode.label());
    let block   = panel(app, &title, app.screen == Screen::Home);
    let visible = app.visible_tasks();

    if visible.is_empty() {
        f.render_widget(
            Paragraph::new("  No tasks").block(block).style(Style::default().fg(t.fg_dim())),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|task| {
        let (check, cs) = if task.done {
            (" ✔ ", Style::default().fg(t.done_color()))
        } else {
            (" ○ ", Style::default().fg(t.fg_dim()))
        };
        let due_style = match task.limit.as_deref().map(countdown::parse_limit) {
            Some(Ok(due)) if due <= now => Style::default().fg(t.error()),
            Some(Err(_))                => Style::default().fg(t.warning()),
            _                           => Style::default().fg(t.fg_dim()),
        };
        ListItem::new(vec![
            Line::from(vec![
                Span::styled(check, cs),
                Span::styled(task.title.clone(), Style::default().fg(t.fg())),
            ]),
            Line::from(Span::styled(format!("   {}", due_summary(task, now)), due_style)),
        ])
    }).collect();

    let (bg, fg) = t.selected_highlight();
    let mut state = ListState::default();
    state.select(Some(app.task_cursor));
    f.render_stateful_widget(
        List::new(items).block(block)
            .highlight_style(Style::default().bg(bg).fg(fg))
            .highlight_symbol("▶"),
        area, &mut state,
    );
}

/// Second line of a task row. Re-evaluated against `now` on every frame.
pub fn due_summary(task: &Task, now: DateTime<Utc>) -> String {
    let Some(raw) = task.limit.as_deref() else {
        return countdown::Remaining::NoDueDate.to_string();
    };
    match countdown::parse_limit(raw) {
        Ok(due) => format!(
            "due {}  ·  {}",
            countdown::to_local_display(due),
            countdown::remaining(Some(due), now),
        ),
        Err(e) => {
            tracing::debug!("task {}: {e}", task.id);
            "invalid due date".to_owned()
        }
    }
}

// ─── Error + status bars ──────────────────────────────────────────────────────

fn draw_error(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    f.render_widget(
        Paragraph::new(format!(" {}", app.error_message))
            .style(Style::default().fg(t.error()).bg(t.bg())),
        area,
    );
}

fn draw_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let hints = match app.screen {
        Screen::Edit(_) => "  Tab:field  Space:toggle status  ^s:save  ^d:delete  Esc:back",
        Screen::ListEdit(_) => "  Enter:save  Esc:back",
        _ => "  ←→:list  ↑↓:task  Enter:edit  n:new  N:new list  e:rename list  m:todo/done  ?:help  q:quit",
    };
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", app.view.mode.label().to_uppercase()),
            Style::default().bg(t.accent()).fg(t.bg()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(hints, Style::default().fg(t.fg_dim())),
        Span::styled(
            format!("  {}", app.status),
            Style::default().fg(t.fg_dim()).add_modifier(Modifier::ITALIC),
        ),
    ])).style(Style::default().bg(t.bg2()));
    f.render_widget(bar, area);
}

// ─── Task editor ──────────────────────────────────────────────────────────────

fn draw_form(f: &mut Frame, area: Rect, app: &App, form: &EditForm) {
    let t    = &app.theme;
    let rect = centered(70, 60, area);
    f.render_widget(Clear, rect);

    let heading = if form.task_id.is_some() { " Edit Task " } else { " New Task " };
    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            heading,
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    if form.loading {
        f.render_widget(
            Paragraph::new("\n  Loading…").block(block).style(Style::default().fg(t.fg_dim())),
            rect,
        );
        return;
    }

    let acc = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(t.fg_dim());
    let fg  = Style::default().fg(t.fg());

    let row = |field: FormField, label: &str, value: String| -> Line<'static> {
        let active = form.field == field;
        let cursor = if active && field != FormField::Status { "█" } else { "" };
        Line::from(vec![
            Span::styled(format!("{} {label:<8}", if active { "▶" } else { " " }), if active { acc } else { dim }),
            Span::styled(format!("{value}{cursor}"), if active { fg } else { dim }),
        ])
    };

    let status = if form.done { "[x] done   [ ] todo" } else { "[ ] done   [x] todo" };
    let mut lines = vec![
        Line::from(""),
        row(FormField::Title, "Title", form.title.clone()),
        Line::from(""),
    ];
    let mut detail = form.detail.split('\n');
    lines.push(row(FormField::Detail, "Detail", detail.next().unwrap_or("").to_owned()));
    lines.extend(detail.map(|l| Line::from(Span::styled(format!("           {l}"), dim))));
    lines.extend([
        Line::from(""),
        row(FormField::Status, "Status", status.to_owned()),
        Line::from(""),
        row(FormField::Limit, "Due", form.limit.clone()),
        Line::from(Span::styled("           YYYY-MM-DD HH:MM, empty for none", dim)),
    ]);

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── List title editor ────────────────────────────────────────────────────────

fn draw_list_form(f: &mut Frame, area: Rect, app: &App, form: &ListForm) {
    let t    = &app.theme;
    let rect = centered(50, 20, area);
    f.render_widget(Clear, rect);

    let heading = if form.list_id.is_some() { " Rename List " } else { " New List " };
    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            heading,
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("▶ Title    ", Style::default().fg(t.accent()).add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}█", form.title), Style::default().fg(t.fg())),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

// ─── Help overlay ─────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(64, 70, area);
    f.render_widget(Clear, rect);

    let title = Line::from(Span::styled(
        " Keyboard Shortcuts ",
        Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
    ));
    let block = Block::default()
        .title(Title::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let accent = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim    = Style::default().fg(t.fg_dim());
    let lines  = vec![
        Line::from(""),
        Line::from(Span::styled("  Lists & tasks", accent)),
        Line::from(Span::styled("  ← / h   → / l      Previous / next list", dim)),
        Line::from(Span::styled("  ↑ / k   ↓ / j      Move between tasks", dim)),
        Line::from(Span::styled("  m                  Show todo / done", dim)),
        Line::from(Span::styled("  r                  Refetch from server", dim)),
        Line::from(""),
        Line::from(Span::styled("  Editing", accent)),
        Line::from(Span::styled("  Enter              Edit selected task", dim)),
        Line::from(Span::styled("  n                  New task in this list", dim)),
        Line::from(Span::styled("  Tab / Shift+Tab    Next / previous field", dim)),
        Line::from(Span::styled("  Space              Toggle done (status field)", dim)),
        Line::from(Span::styled("  Ctrl+s  Ctrl+d     Save / delete", dim)),
        Line::from(Span::styled("  N   e              New list / rename this list", dim)),
        Line::from(""),
        Line::from(Span::styled("  General", accent)),
        Line::from(Span::styled("  ?                  Help (any key closes)", dim)),
        Line::from(Span::styled("  Esc                Back", dim)),
        Line::from(Span::styled("  q                  Quit", dim)),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().fg(t.fg())),
        rect,
    );
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn panel<'a>(app: &App, title: &'a str, focused: bool) -> Block<'a> {
    let t  = &app.theme;
    let bs = Style::default().fg(if focused { t.border_active() } else { t.border() });
    Block::default()
        .title(Title::from(Line::from(Span::styled(title, Style::default().fg(t.accent())))))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(bs)
        .style(Style::default().bg(t.bg()))
}

fn centered(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let vert = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ]).split(r);
    Layout::default().direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ]).split(vert[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{memory::MemoryTaskApi, worker::ApiWorker};
    use crate::model::List;
    use crate::theme::ThemeConfig;
    use chrono::Duration;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn task(limit: Option<&str>) -> Task {
        Task {
            id: "1".into(), title: "t".into(), detail: String::new(),
            done: false, limit: limit.map(str::to_owned),
        }
    }

    #[test]
    fn due_summary_variants() {
        let now = Utc::now();
        assert_eq!(due_summary(&task(None), now), "no due date");
        assert_eq!(due_summary(&task(Some("soon")), now), "invalid due date");

        let due = countdown::to_wire(now + Duration::seconds(90_061));
        assert!(due_summary(&task(Some(&due)), now).ends_with("1d 1h 1m"));
        let past = countdown::to_wire(now - Duration::seconds(5));
        assert!(due_summary(&task(Some(&past)), now).ends_with("expired"));
    }

    #[tokio::test]
    async fn home_screen_renders_lists_and_tasks() {
        let mut app = App::new(
            ApiWorker::spawn(Arc::new(MemoryTaskApi::default())),
            ThemeConfig::default(),
        );
        app.lists = vec![List { id: "1".into(), title: "Groceries".into() }];
        app.view.selected_list = Some("1".into());
        app.tasks = vec![Task { title: "Buy eggs".into(), ..task(None) }];
        app.error_message = "タスクの取得に失敗しました。boom".into();

        let mut term = Terminal::new(TestBackend::new(100, 20)).unwrap();
        term.draw(|f| draw(f, &app)).unwrap();

        let screen: String = term.backend().buffer().content().iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Groceries"));
        assert!(screen.contains("Buy eggs"));
        assert!(screen.contains("no due date"));
        assert!(screen.contains("boom"));
    }

    #[tokio::test]
    async fn list_editor_popup_shows_the_title() {
        let mut app = App::new(
            ApiWorker::spawn(Arc::new(MemoryTaskApi::default())),
            ThemeConfig::default(),
        );
        app.screen = Screen::ListEdit(ListForm { list_id: Some("1".into()), title: "Chores".into() });

        let mut term = Terminal::new(TestBackend::new(100, 30)).unwrap();
        term.draw(|f| draw(f, &app)).unwrap();

        let screen: String = term.backend().buffer().content().iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Rename List"));
        assert!(screen.contains("Chores"));
    }
}
