use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub latest_block: Option<u64>,
    pub current_tab: usize,
    pub api_host: String,
}

const TABS: &[&str] = &[
    "Dashboard [1]",
    "Blocks [2]",
    "Transactions [3]",
    "Pending [4]",
    "Status [5]",
];

impl Header {
    pub fn new(api_url: &str) -> Self {
        Self {
            latest_block: None,
            current_tab: 0,
            api_host: host_of(api_url),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(14),
                Constraint::Min(0),
                Constraint::Length(40),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " cc-explorer",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let tab_titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
        let tabs = Tabs::new(tab_titles)
            .select(self.current_tab)
            .style(THEME.muted_style())
            .highlight_style(THEME.accent_style().add_modifier(Modifier::BOLD))
            .divider(Span::raw(" | "));
        frame.render_widget(tabs, chunks[1]);

        let block_str = self
            .latest_block
            .map(|n| format!("#{}", utils::format_number(n)))
            .unwrap_or_else(|| "#-".to_string());
        let network_info = Line::from(vec![
            Span::styled(self.api_host.as_str(), Style::default().fg(THEME.text)),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(format!("{block_str} "), THEME.accent_style()),
        ]);
        let network_paragraph = Paragraph::new(network_info)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(network_paragraph, chunks[2]);
    }
}

/// `http://host:port/api/` -> `host:port`
fn host_of(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest).to_string()
}
