//! Shared drawing: palette, HUD and the menu / paused / game-over / won
//! overlays every game uses. Games draw only their own world.

use crate::platform::{Surface, TextAlign};
use crate::state::GameState;

/// Colors shared across games
pub mod palette {
    pub const BACKGROUND: &str = "#111418";
    pub const FOREGROUND: &str = "#e8e8e8";
    pub const MUTED: &str = "#8a8f98";
    pub const ACCENT: &str = "#4caf50";
    pub const ACCENT_BRIGHT: &str = "#8bc34a";
    pub const DANGER: &str = "#f44336";
    pub const GOLD: &str = "#ffc107";
    pub const CARD_BACK: &str = "#3f51b5";
    pub const CARD_FACE: &str = "#fafafa";
    pub const CARD_MATCHED: &str = "#2e7d32";
    pub const SCRIM: &str = "rgba(0, 0, 0, 0.6)";
}

/// What the overlays need to know about the session
#[derive(Debug, Clone, Copy)]
pub struct HudInfo<'a> {
    pub title: &'a str,
    pub state: GameState,
    pub score: u64,
    pub high_score: u64,
    /// Set when the finished run beat the stored high score
    pub new_high_score: bool,
    pub pausable: bool,
}

/// Score line in the top corners
pub fn draw_hud(surface: &mut dyn Surface, info: &HudInfo<'_>) {
    let w = surface.width();
    surface.fill_text(
        &format!("Score: {}", info.score),
        8.0,
        18.0,
        14.0,
        palette::FOREGROUND,
        TextAlign::Left,
    );
    surface.fill_text(
        &format!("Best: {}", info.high_score),
        w - 8.0,
        18.0,
        14.0,
        palette::MUTED,
        TextAlign::Right,
    );
}

/// Full-screen overlay for non-playing states
pub fn draw_overlay(surface: &mut dyn Surface, info: &HudInfo<'_>) {
    let (w, h) = (surface.width(), surface.height());
    let cx = w / 2.0;
    let cy = h / 2.0;
    let title_size = (h / 8.0).clamp(14.0, 36.0);
    let body_size = (title_size * 0.5).max(10.0);

    let (heading, color, hint) = match info.state {
        GameState::Playing => return,
        GameState::Menu => (info.title.to_string(), palette::ACCENT, "Press Enter or click to start"),
        GameState::Paused => ("Paused".to_string(), palette::FOREGROUND, "Press P to resume"),
        GameState::GameOver => ("Game Over".to_string(), palette::DANGER, "Press Enter or click to play again"),
        GameState::Won => ("You Win!".to_string(), palette::GOLD, "Press Enter or click to play again"),
    };

    surface.fill_rect(0.0, 0.0, w, h, palette::SCRIM);
    surface.fill_text(&heading, cx, cy - title_size * 0.5, title_size, color, TextAlign::Center);

    if info.state.is_terminal() {
        surface.fill_text(
            &format!("Score: {}", info.score),
            cx,
            cy + body_size,
            body_size,
            palette::FOREGROUND,
            TextAlign::Center,
        );
        if info.new_high_score {
            surface.fill_text(
                "New high score!",
                cx,
                cy + body_size * 2.4,
                body_size,
                palette::GOLD,
                TextAlign::Center,
            );
        }
    } else if info.state == GameState::Menu {
        surface.fill_text(
            &format!("High score: {}", info.high_score),
            cx,
            cy + body_size,
            body_size,
            palette::MUTED,
            TextAlign::Center,
        );
    }

    let hint = if info.state == GameState::Menu && info.pausable {
        format!("{hint} - P pauses")
    } else {
        hint.to_string()
    };
    surface.fill_text(&hint, cx, h - body_size, body_size, palette::MUTED, TextAlign::Center);
}
