use ratatui::style::{Color, Modifier, Style};

/// Colours for the explorer. Every widget styles itself through `THEME`.
pub struct Theme {
    pub bg: Color,
    pub surface: Color,
    pub surface_bright: Color,
    pub text: Color,
    pub text_muted: Color,
    pub text_accent: Color,
    pub confirmed: Color,
    pub error: Color,
    pub warning: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub amount: Color,
    pub address: Color,
    pub hash: Color,
}

pub const THEME: Theme = Theme {
    bg: Color::Rgb(14, 18, 30),
    surface: Color::Rgb(22, 28, 44),
    surface_bright: Color::Rgb(34, 42, 64),
    text: Color::Rgb(218, 222, 232),
    text_muted: Color::Rgb(118, 126, 146),
    text_accent: Color::Rgb(90, 170, 250),
    confirmed: Color::Rgb(98, 200, 120),
    error: Color::Rgb(235, 90, 90),
    warning: Color::Rgb(240, 200, 80),
    selected_bg: Color::Rgb(36, 64, 110),
    selected_fg: Color::White,
    border: Color::Rgb(56, 64, 86),
    border_focused: Color::Rgb(90, 170, 250),
    amount: Color::Rgb(98, 200, 160),
    address: Color::Rgb(255, 179, 71),
    hash: Color::Rgb(150, 156, 190),
};

impl Theme {
    pub const fn header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    pub const fn selected_style(&self) -> Style {
        Style::new().fg(self.selected_fg).bg(self.selected_bg).add_modifier(Modifier::BOLD)
    }

    pub const fn border_style(&self) -> Style {
        Style::new().fg(self.border)
    }

    pub const fn border_focused_style(&self) -> Style {
        Style::new().fg(self.border_focused)
    }

    pub const fn muted_style(&self) -> Style {
        Style::new().fg(self.text_muted)
    }

    pub const fn accent_style(&self) -> Style {
        Style::new().fg(self.text_accent)
    }

    /// Confirmed parcels and successful transactions.
    pub const fn success_style(&self) -> Style {
        Style::new().fg(self.confirmed)
    }

    pub const fn error_style(&self) -> Style {
        Style::new().fg(self.error)
    }

    /// Pending parcels, "not found" placeholders and notices.
    pub const fn warning_style(&self) -> Style {
        Style::new().fg(self.warning)
    }

    pub const fn amount_style(&self) -> Style {
        Style::new().fg(self.amount)
    }

    pub const fn address_style(&self) -> Style {
        Style::new().fg(self.address).add_modifier(Modifier::UNDERLINED)
    }

    pub const fn hash_style(&self) -> Style {
        Style::new().fg(self.hash)
    }

    pub const fn table_header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface_bright).add_modifier(Modifier::BOLD)
    }
}
