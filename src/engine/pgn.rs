//! PGN (Portable Game Notation) import and export.
//!
//! Headers carry the Seven Tag Roster; move text is numbered SAN. Optional
//! `SetUp`/`FEN` tags start the game from a custom position.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::engine::fen;
use crate::engine::game::Game;
use crate::engine::san;
use crate::engine::types::{ChessError, Side};

/// Line length the move text is wrapped at.
const LINE_WIDTH: usize = 80;

// =========================================================================
// Headers
// =========================================================================

/// A tag of the Seven Tag Roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Header {
    Event,
    Site,
    Date,
    Round,
    White,
    Black,
    Result,
}

impl Header {
    /// Roster order, which is also export order.
    pub const ROSTER: [Header; 7] = [
        Header::Event,
        Header::Site,
        Header::Date,
        Header::Round,
        Header::White,
        Header::Black,
        Header::Result,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Header::Event => "Event",
            Header::Site => "Site",
            Header::Date => "Date",
            Header::Round => "Round",
            Header::White => "White",
            Header::Black => "Black",
            Header::Result => "Result",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Header> {
        Header::ROSTER.into_iter().find(|h| h.tag() == tag)
    }
}

/// Header values of a game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    values: BTreeMap<Header, String>,
    /// FEN of the starting position when it is not the standard one.
    starting_fen: Option<String>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers for a fresh casual game dated today.
    pub fn new_game() -> Self {
        let mut meta = MetaData::new();
        meta.set(Header::Event, "Casual Game");
        meta.set(Header::Site, "?");
        meta.set(Header::Date, Utc::now().format("%Y.%m.%d").to_string());
        meta.set(Header::Round, "-");
        meta.set(Header::White, "?");
        meta.set(Header::Black, "?");
        meta.set(Header::Result, "*");
        meta
    }

    pub fn get(&self, header: Header) -> Option<&str> {
        self.values.get(&header).map(String::as_str)
    }

    pub fn set(&mut self, header: Header, value: impl Into<String>) {
        self.values.insert(header, value.into());
    }

    pub fn starting_fen(&self) -> Option<&str> {
        self.starting_fen.as_deref()
    }

    pub fn set_starting_fen(&mut self, fen: impl Into<String>) {
        self.starting_fen = Some(fen.into());
    }
}

/// A game decoded from PGN together with its headers.
#[derive(Clone, Debug)]
pub struct PgnGame {
    pub meta: MetaData,
    pub game: Game,
}

// =========================================================================
// Import
// =========================================================================

/// Decode a single PGN game and replay its move text.
///
/// Comments (`{...}`, `;...`), variations and NAGs are skipped. When the
/// replayed game is still in progress, a result token ends it: `1/2-1/2`
/// as an agreed draw, a decisive result as a resignation.
pub fn parse(text: &str, settings: Settings) -> Result<PgnGame, ChessError> {
    let mut meta = MetaData::new();
    let mut movetext = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            parse_header(line, &mut meta)?;
        } else {
            let line = line.split_once(';').map_or(line, |(code, _)| code);
            movetext.push_str(line);
            movetext.push(' ');
        }
    }

    let mut game = match meta.starting_fen() {
        Some(start) => fen::game_from_fen(start, settings)
            .map_err(|e| ChessError::InvalidPgn(format!("FEN tag: {e}")))?,
        None => Game::new(settings),
    };

    let mut result = None;
    for token in strip_comments(&movetext)?.split_whitespace() {
        if is_result(token) {
            result = Some(token.to_string());
            break;
        }
        if token.starts_with('$') {
            continue;
        }
        let mv = token.rsplit('.').next().unwrap_or(token);
        if mv.is_empty() {
            continue;
        }
        let ply = san::find_ply(&game, mv).map_err(|e| {
            ChessError::InvalidPgn(format!("ply {}: {e}", game.all_plies().len() + 1))
        })?;
        game.play(ply);
        debug!(token = mv, plies = game.all_plies().len(), "loaded PGN ply");
    }

    let result = result.or_else(|| meta.get(Header::Result).map(str::to_string));
    if !game.is_over() {
        match result.as_deref() {
            Some("1/2-1/2") => game.agree_to_draw(),
            Some("1-0") | Some("0-1") => game.resign(),
            _ => {}
        }
    }

    Ok(PgnGame { meta, game })
}

fn parse_header(line: &str, meta: &mut MetaData) -> Result<(), ChessError> {
    let malformed = || ChessError::InvalidPgn(format!("malformed header: {line}"));

    let inner = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(malformed)?
        .trim();
    let (tag, value) = inner.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let value = value
        .trim()
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(malformed)?
        .replace("\\\"", "\"")
        .replace("\\\\", "\\");

    match (Header::from_tag(tag), tag) {
        (Some(header), _) => {
            debug!(tag, value = %value, "loaded PGN header");
            meta.set(header, value);
        }
        (None, "FEN") => meta.set_starting_fen(value),
        (None, "SetUp") => {}
        (None, _) => warn!(tag, "skipping unknown PGN tag"),
    }
    Ok(())
}

/// Remove `{...}` comments and `(...)` variations.
fn strip_comments(movetext: &str) -> Result<String, ChessError> {
    let mut out = String::with_capacity(movetext.len());
    let mut in_comment = false;
    let mut depth = 0usize;
    for c in movetext.chars() {
        match c {
            '{' if !in_comment => in_comment = true,
            '}' if in_comment => {
                in_comment = false;
                out.push(' ');
            }
            _ if in_comment => {}
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ChessError::InvalidPgn("unbalanced ')'".into()))?;
                out.push(' ');
            }
            _ if depth > 0 => {}
            _ => out.push(c),
        }
    }
    if in_comment || depth > 0 {
        return Err(ChessError::InvalidPgn("unterminated comment or variation".into()));
    }
    Ok(out)
}

fn is_result(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

// =========================================================================
// Export
// =========================================================================

/// Encode `game` as PGN. The `Result` header and the trailing token come
/// from the game itself; other roster tags missing from `meta` print `?`.
pub fn write(game: &Game, meta: &MetaData) -> String {
    let result = game.result_string().unwrap_or("*");
    let mut pgn = String::with_capacity(512);

    for header in Header::ROSTER {
        let value = match header {
            Header::Result => result,
            _ => meta.get(header).unwrap_or("?"),
        };
        push_tag(&mut pgn, header.tag(), value);
    }
    if let Some(start) = meta.starting_fen() {
        push_tag(&mut pgn, "SetUp", "1");
        push_tag(&mut pgn, "FEN", start);
    }
    pgn.push('\n');

    let history = game.all_plies();
    let black_plies = history.iter().filter(|p| p.turn() == Side::Black).count() as u32;
    let mut move_num = game.state().full_move_index().saturating_sub(black_plies).max(1);

    let mut line = String::new();
    for (i, ply) in history.iter().enumerate() {
        let token = match ply.turn() {
            Side::White => format!("{move_num}. {ply}"),
            Side::Black if i == 0 => format!("{move_num}... {ply}"),
            Side::Black => ply.to_string(),
        };
        push_word(&mut pgn, &mut line, &token);
        if ply.turn() == Side::Black {
            move_num += 1;
        }
    }
    push_word(&mut pgn, &mut line, result);
    pgn.push_str(&line);
    pgn.push('\n');

    pgn
}

fn push_tag(pgn: &mut String, tag: &str, value: &str) {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    pgn.push_str(&format!("[{tag} \"{escaped}\"]\n"));
}

/// Append `word` to the current line, flushing it at the wrap width.
fn push_word(pgn: &mut String, line: &mut String, word: &str) {
    if !line.is_empty() && line.len() + word.len() + 1 > LINE_WIDTH {
        pgn.push_str(line);
        pgn.push('\n');
        line.clear();
    }
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(word);
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Outcome;

    const SCHOLARS_MATE: &str = r#"[Event "Casual Game"]
[Site "?"]
[Date "2024.01.01"]
[Round "-"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0
"#;

    fn play_all(game: &mut Game, tokens: &[&str]) {
        for token in tokens {
            let ply = san::find_ply(game, token).unwrap();
            game.play(ply);
        }
    }

    #[test]
    fn header_tags() {
        assert_eq!(Header::from_tag("Round"), Some(Header::Round));
        assert_eq!(Header::from_tag("ECO"), None);
        for header in Header::ROSTER {
            assert_eq!(Header::from_tag(header.tag()), Some(header));
        }
    }

    #[test]
    fn new_game_headers() {
        let meta = MetaData::new_game();
        assert_eq!(meta.get(Header::Event), Some("Casual Game"));
        assert_eq!(meta.get(Header::Result), Some("*"));
        let date = meta.get(Header::Date).unwrap();
        assert_eq!(date.len(), 10);
        assert_eq!(date.matches('.').count(), 2);
    }

    #[test]
    fn parse_scholars_mate() {
        let pgn = parse(SCHOLARS_MATE, Settings::default()).unwrap();
        assert_eq!(pgn.meta.get(Header::White), Some("Alice"));
        assert_eq!(pgn.meta.get(Header::Date), Some("2024.01.01"));
        assert_eq!(pgn.game.all_plies().len(), 7);
        assert_eq!(pgn.game.outcome(), Some(Outcome::CheckMate));
        assert_eq!(pgn.game.result_string(), Some("1-0"));
    }

    #[test]
    fn write_scholars_mate() {
        let mut game = Game::default();
        play_all(&mut game, &["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7"]);
        let mut meta = MetaData::new_game();
        meta.set(Header::White, "Alice");

        let pgn = write(&game, &meta);
        assert!(pgn.starts_with("[Event \"Casual Game\"]\n[Site \"?\"]\n"));
        assert!(pgn.contains("[White \"Alice\"]"));
        assert!(pgn.contains("[Result \"1-0\"]"));
        assert!(pgn.ends_with("\n\n1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7+ 1-0\n"));
    }

    #[test]
    fn write_empty_game() {
        let pgn = write(&Game::default(), &MetaData::new());
        assert!(pgn.contains("[Event \"?\"]"));
        assert!(pgn.ends_with("[Result \"*\"]\n\n*\n"));
    }

    #[test]
    fn comments_variations_and_nags_skipped() {
        let text = "1. e4 {best by test} e5 (1... c5 2. Nf3) 2. Nf3 $1 ; king's knight\nNc6 *";
        let pgn = parse(text, Settings::default()).unwrap();
        let notation: Vec<String> = pgn.game.all_plies().iter().map(|p| p.to_string()).collect();
        assert_eq!(notation, ["e4", "e5", "Nf3", "Nc6"]);
        assert!(!pgn.game.is_over());
    }

    #[test]
    fn attached_move_numbers() {
        let pgn = parse("1.e4 e5 2.Nf3 2...Nc6", Settings::default()).unwrap();
        assert_eq!(pgn.game.all_plies().len(), 4);
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let text = "[ECO \"C20\"]\n[Event \"Test\"]\n\n1. e4 *";
        let pgn = parse(text, Settings::default()).unwrap();
        assert_eq!(pgn.meta.get(Header::Event), Some("Test"));
        assert_eq!(pgn.game.all_plies().len(), 1);
    }

    #[test]
    fn escaped_header_values() {
        let text = "[Event \"The \\\"Big\\\" One\"]\n\n*";
        let pgn = parse(text, Settings::default()).unwrap();
        assert_eq!(pgn.meta.get(Header::Event), Some("The \"Big\" One"));
        let out = write(&pgn.game, &pgn.meta);
        assert!(out.contains("[Event \"The \\\"Big\\\" One\"]"));
    }

    #[test]
    fn result_token_ends_game() {
        let drawn = parse("1. e4 e5 1/2-1/2", Settings::default()).unwrap();
        assert_eq!(drawn.game.outcome(), Some(Outcome::DrawByAgreement));

        let resigned = parse("1. e4 e5 2. Qh5 1-0", Settings::default()).unwrap();
        assert_eq!(resigned.game.outcome(), Some(Outcome::Resigned));
    }

    #[test]
    fn starts_from_fen_tag() {
        let text = "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/8/R3K3 b - - 0 12\"]\n\n12... Kd7 13. Ra7+ *";
        let pgn = parse(text, Settings::default()).unwrap();
        assert_eq!(pgn.game.all_plies().len(), 2);
        assert_eq!(
            pgn.meta.starting_fen(),
            Some("4k3/8/8/8/8/8/8/R3K3 b - - 0 12")
        );

        let out = write(&pgn.game, &pgn.meta);
        assert!(out.contains("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/8/R3K3 b - - 0 12\"]\n"));
        assert!(out.ends_with("12... Kd7 13. Ra7+ *\n"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse("[Event Casual]\n1. e4", Settings::default()),
            Err(ChessError::InvalidPgn(_))
        ));
        assert!(matches!(
            parse("1. e5", Settings::default()),
            Err(ChessError::InvalidPgn(_))
        ));
        assert!(matches!(
            parse("1. e4 {unterminated", Settings::default()),
            Err(ChessError::InvalidPgn(_))
        ));
        // Plies after mate are not legal.
        assert!(parse("1. f3 e5 2. g4 Qh4 3. a3", Settings::default()).is_err());
        // Unreachable starting positions.
        for start in [
            "P3k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/3n1n2/8/r3K3 w - - 0 1",
        ] {
            let text = format!("[SetUp \"1\"]\n[FEN \"{start}\"]\n\n*");
            assert!(matches!(
                parse(&text, Settings::default()),
                Err(ChessError::InvalidPgn(_))
            ));
        }
    }

    #[test]
    fn long_games_wrap() {
        let settings = Settings {
            repetition_count: 100,
            ..Settings::default()
        };
        let mut game = Game::new(settings);
        for _ in 0..6 {
            play_all(&mut game, &["Nf3", "Nf6", "Ng1", "Ng8"]);
        }
        assert!(!game.is_over());
        let pgn = write(&game, &MetaData::new());
        let movetext = pgn.split("\n\n").nth(1).unwrap();
        assert!(movetext.lines().count() > 1);
        assert!(movetext.lines().all(|l| l.len() <= LINE_WIDTH));
        assert!(movetext.contains("12. Ng1"));
    }

    #[test]
    fn metadata_serializes() {
        let meta = MetaData::new_game();
        let json = serde_json::to_string(&meta).unwrap();
        let back: MetaData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
