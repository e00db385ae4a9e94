//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Border of the focused input or list
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Header and status bar background
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Toast background
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Modal dialogs
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
