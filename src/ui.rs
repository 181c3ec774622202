use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Clear, List, Paragraph, Row, Table},
};

use crate::domain::{CtvConfig, FilterKind};
use crate::model::{Model, UIData};
use crate::table::{Cell, Direction};

pub const FILTERLINE_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;

pub struct TableUI {}

impl TableUI {
    pub fn new(_cfg: &CtvConfig) -> Self {
        Self {}
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.view();

        let [filter_area, table_area, status_area] = Layout::vertical([
            Constraint::Length(FILTERLINE_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.draw_filterline(&uidata, filter_area, frame);
        self.draw_table(&uidata, table_area, frame);
        self.draw_statusline(&uidata, status_area, frame);

        if let Some((candidates, selected)) = &uidata.selector {
            self.draw_selector(candidates, *selected, frame);
        }
        if let Some(message) = &uidata.popup {
            self.draw_popup(message, frame);
        }
    }

    fn draw_filterline(&self, uidata: &UIData, area: Rect, frame: &mut Frame) {
        let line = match &uidata.input {
            Some((FilterKind::Name, text)) => {
                Line::from(vec!["filter name> ".bold().yellow(), text.as_str().into()])
            }
            Some((FilterKind::Currency, text)) => Line::from(vec![
                "filter currency> ".bold().yellow(),
                text.as_str().into(),
            ]),
            None => Line::from(vec![
                "name: ".bold(),
                uidata.filter_name.as_str().into(),
                "  currency: ".bold(),
                uidata.filter_currency.as_str().into(),
                "  (n/c to edit, a to add a column, ? for help)".dim(),
            ]),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_table(&self, uidata: &UIData, area: Rect, frame: &mut Frame) {
        let header = Row::new(uidata.columns.iter().map(|col| {
            let marker = match col.sort {
                Some(Direction::Ascending) => " ▲",
                Some(Direction::Descending) => " ▼",
                None => "",
            };
            let mut style = Style::new().add_modifier(Modifier::BOLD);
            if col.active {
                style = style.add_modifier(Modifier::REVERSED);
            }
            ratatui::widgets::Cell::from(format!("{}{}", col.label, marker)).style(style)
        }));

        let rows = uidata.rows.iter().map(|cells| {
            Row::new(cells.iter().map(|cell| match cell {
                Cell::Text(text) => ratatui::widgets::Cell::from(text.as_str()),
                Cell::Image(url) => {
                    ratatui::widgets::Cell::from(url.as_str()).style(Style::new().dim())
                }
            }))
        });

        let widths = uidata.columns.iter().map(|_| Constraint::Fill(1));
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(Line::from(" ctv ".bold()).centered()));
        frame.render_widget(table, area);
    }

    fn draw_statusline(&self, uidata: &UIData, area: Rect, frame: &mut Frame) {
        let line = Line::from(vec![
            format!("Page {}/{}", uidata.page, uidata.page_count).bold(),
            format!("  {} of {} countries  ", uidata.nrows, uidata.total).into(),
            uidata.status_message.as_str().yellow(),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_selector(&self, candidates: &[String], selected: usize, frame: &mut Frame) {
        let area = centered_rect(40, 60, frame.area());
        frame.render_widget(Clear, area);

        let items: Vec<String> = if candidates.is_empty() {
            vec!["No fields available".to_string()]
        } else {
            candidates
                .iter()
                .enumerate()
                .map(|(idx, field)| {
                    if idx == selected {
                        format!("> {field}")
                    } else {
                        format!("  {field}")
                    }
                })
                .collect()
        };
        let list = List::new(items).block(
            Block::bordered()
                .title(" Additional columns ")
                .title_bottom(Line::from(" Enter to show, Esc to close ").centered()),
        );
        frame.render_widget(list, area);
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame) {
        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(message).block(Block::bordered().title(" Help ")),
            area,
        );
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
