use serde::{Deserialize, Serialize};

/// Rules that stay fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Resolve every promotion to a queen without asking.
    pub auto_promote: bool,
    /// Full moves without a pawn move or capture before the game is drawn.
    pub move_rule_count: u32,
    /// Occurrences of the same position that draw the game.
    pub repetition_count: u32,
}

impl Settings {
    /// Load settings from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Settings {
            auto_promote: std::env::var("CHESS_AUTO_PROMOTE")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.auto_promote),
            move_rule_count: std::env::var("CHESS_MOVE_RULE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.move_rule_count),
            repetition_count: std::env::var("CHESS_REPETITION_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 1)
                .unwrap_or(defaults.repetition_count),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auto_promote: true,
            move_rule_count: 50,
            repetition_count: 3,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
