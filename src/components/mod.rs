pub mod asset_address;
pub mod asset_type;
pub mod block_detail;
pub mod block_list;
pub mod blocks;
pub mod dashboard;
pub mod header;
pub mod help;
pub mod paged_table;
pub mod pagination;
pub mod parcel_detail;
pub mod pending_parcels;
pub mod platform_address;
pub mod search;
pub mod status;
pub mod status_bar;
pub mod toast;
pub mod transactions;
pub mod tx_detail;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tracing::warn;

use crate::data::error::ApiError;
use crate::events::AppEvent;
use crate::theme::THEME;

/// Trait for all UI components
pub trait Component {
    /// Handle a key event, optionally returning an AppEvent
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent>;

    /// Render the component into the given area
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Log a failed fetch and turn it into a toast for the app loop.
pub(crate) fn failure(what: &str, error: &ApiError) -> Option<AppEvent> {
    warn!(%error, "failed to load {what}");
    Some(AppEvent::Error(format!("Failed to load {what}: {error}")))
}

/// Label/value row used by the detail pages.
pub(crate) fn field_row(label: &'static str, value: String, style: Style) -> Row<'static> {
    Row::new(vec![
        Cell::from(label).style(THEME.muted_style()),
        Cell::from(value).style(style),
    ])
}

/// Centered single-line message such as "Loading..." or "not found".
pub(crate) fn render_placeholder(frame: &mut Frame, area: Rect, message: &str, style: Style) {
    let paragraph = Paragraph::new(message.to_string())
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, centered_rect(area, placeholder_width(message), 1));
}

/// Display columns for a placeholder, one cell of padding each side.
fn placeholder_width(message: &str) -> u16 {
    u16::try_from(Line::from(message).width())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
}

/// Returns a centered rectangle of the given width/height within the parent area.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_parent() {
        let parent = Rect::new(0, 0, 10, 4);
        assert_eq!(centered_rect(parent, 4, 2), Rect::new(3, 1, 4, 2));
        assert_eq!(centered_rect(parent, 40, 9), Rect::new(0, 0, 10, 4));
    }

    #[test]
    fn test_placeholder_width_counts_columns() {
        assert_eq!(placeholder_width("Loading..."), 12);
        assert_eq!(placeholder_width("Montréal"), 10);
        assert_eq!(placeholder_width("読み込み中"), 12);
    }

    #[test]
    fn test_failure_becomes_error_event() {
        let event = failure("block", &ApiError::Network("refused".to_string()));
        assert!(matches!(event, Some(AppEvent::Error(msg)) if msg.contains("block")));
    }
}
