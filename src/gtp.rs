//! Go Text Protocol (GTP) implementation.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements GTP version 2, allowing the engine to be used
//! with graphical Go interfaces like Sabaki, GoGui, or Lizzie.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`, `known_command`, `quit`
//! - `boardsize`, `clear_board`, `komi`
//! - `play`, `genmove`, `time_left`
//! - `dead_group_list`, `chat`, `done` (scoring/session-lifecycle commands)
//! - `kgs-rules`/`moyo-config` - apply an engine configuration string
//! - `showboard`, `cputime`, `help`
//!
//! ## Example
//!
//! ```ignore
//! use moyo::gtp::GtpEngine;
//! let mut engine = GtpEngine::new();
//! engine.run();
//! ```

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::config::EngineConfig;
use crate::constants::{N, PASS_MOVE, RESIGN_MOVE};
use crate::mcts::{ClockState, SearchConfig, SearchController};
use crate::position::{format_position_with_owner, parse_coord, pass_move, play_move, str_coord, Position};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "chat",
    "clear_board",
    "cputime",
    "dead_group_list",
    "done",
    "genmove",
    "help",
    "known_command",
    "komi",
    "list_commands",
    "moyo-config",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "time_left",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    pos: Position,
    controller: SearchController,
    config: EngineConfig,
    clock: ClockState,
    start_time: std::time::Instant,
}

impl GtpEngine {
    /// Create a new GTP engine with default settings.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let pos = Position::new();
        let controller = Self::fresh_controller(&pos, &config);
        GtpEngine {
            pos,
            controller,
            config,
            clock: ClockState {
                main_time_remaining: Duration::from_secs(30),
                byoyomi_time: Duration::ZERO,
                byoyomi_stones_remaining: 0,
            },
            start_time: std::time::Instant::now(),
        }
    }

    fn fresh_controller(pos: &Position, config: &EngineConfig) -> SearchController {
        SearchController::new(
            pos.copy(),
            SearchConfig {
                threads: config.threads,
                thread_model: config.thread_model,
                resign_ratio: config.resign_ratio,
                seed: config.force_seed.unwrap_or(1),
            },
        )
    }

    /// Print the board state to stderr with owner map.
    fn print_board(&self) {
        let owner_map = self.controller.ownermap.snapshot();
        let n_sims = self.controller.ownermap.playouts().max(1) as usize;
        let board_str = format_position_with_owner(&self.pos, Some(&owner_map), n_sims);
        eprint!("{}", board_str);
    }

    fn get_turn_indicator(&self) -> &'static str {
        if self.pos.is_black_to_play() { "●" } else { "○" }
    }

    /// Run the GTP command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stderr = io::stderr();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let response = self.execute(&command, args);

            self.print_board();
            stderr.flush().unwrap();

            let (success, message) = response;
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(stdout, "{prefix}{id_str} {message}\n").unwrap();
            stdout.flush().unwrap();

            write!(stderr, "{} moyo> ", self.get_turn_indicator()).unwrap();
            stderr.flush().unwrap();

            if command == "quit" || command == "done" {
                break;
            }
        }
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let mut chars = trimmed.char_indices();

        if let Some((_, c)) = chars.next() {
            if c.is_ascii_digit() {
                let end = chars
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map(|(i, _)| i)
                    .unwrap_or(trimmed.len());

                if let Ok(id) = trimmed[..end].parse::<u32>() {
                    return (Some(id), trimmed[end..].trim());
                }
            }
        }

        (None, trimmed)
    }

    fn notify_play(&mut self, mv: crate::position::Point) {
        self.controller.notify_play(mv, &self.pos);
    }

    /// Whether every empty point's ownermap verdict is "sure" for one side
    /// or the other, gated on the ownermap having accumulated at least
    /// `GJ_MINGAMES` playouts - the Board-API `pass_is_safe(b, colour,
    /// dead_groups)` contract, backed by the search that just ran rather
    /// than a static syntactic board check run before any search.
    fn search_confirms_pass_is_safe(&self) -> bool {
        use crate::ownermap::Judgement;
        let om = &self.controller.ownermap;
        let min_games = crate::constants::GJ_MINGAMES as i64;
        if om.playouts() < min_games {
            return false;
        }
        (crate::constants::BOARD_IMIN..crate::constants::BOARD_IMAX)
            .all(|pt| om.judge(pt, min_games) != Judgement::Contested)
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "moyo".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),
            "done" => (true, String::new()),

            "boardsize" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                match args[0].parse::<usize>() {
                    Ok(size) if size == N => (true, String::new()),
                    Ok(size) => (false, format!("unacceptable size, only {N} is supported (got {size})")),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.pos.clear();
                self.controller = Self::fresh_controller(&self.pos, &self.config);
                (true, String::new())
            }

            "komi" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                match args[0].parse::<f32>() {
                    Ok(komi) => {
                        self.pos.komi = komi;
                        (true, String::new())
                    }
                    Err(_) => (false, "invalid komi".to_string()),
                }
            }

            "moyo-config" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                match self.config.apply(&args.join(" ")) {
                    Ok(()) => {
                        self.controller = Self::fresh_controller(&self.pos, &self.config);
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "time_left" => {
                if args.len() < 3 {
                    return (false, "missing arguments".to_string());
                }
                let Ok(seconds) = args[1].parse::<f64>() else {
                    return (false, "invalid time".to_string());
                };
                let Ok(stones) = args[2].parse::<u32>() else {
                    return (false, "invalid stones".to_string());
                };
                if stones == 0 {
                    self.clock.main_time_remaining = Duration::from_secs_f64(seconds.max(0.0));
                } else {
                    self.clock.main_time_remaining = Duration::ZERO;
                    self.clock.byoyomi_time = Duration::from_secs_f64(seconds.max(0.0));
                    self.clock.byoyomi_stones_remaining = stones;
                }
                (true, String::new())
            }

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }

                let vertex = args[1].to_lowercase();
                let pt = parse_coord(&vertex);

                if vertex == "pass" || pt == PASS_MOVE {
                    pass_move(&mut self.pos);
                    self.notify_play(PASS_MOVE);
                    return (true, String::new());
                }

                match play_move(&mut self.pos, pt) {
                    Ok(()) => {
                        self.notify_play(pt);
                        (true, String::new())
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }

                let opponent_just_passed = self.pos.last == PASS_MOVE && self.pos.n > 2;
                let pt = self.controller.genmove(&self.clock);

                // Only trust a pass-is-safe verdict once the search just run
                // has accumulated enough ownermap playouts to back it
                // (the `GJ_MINGAMES` gate), not from a static pre-search
                // board check.
                if opponent_just_passed && self.search_confirms_pass_is_safe() {
                    pass_move(&mut self.pos);
                    self.notify_play(PASS_MOVE);
                    return (true, "pass".to_string());
                }

                if pt == RESIGN_MOVE {
                    return (true, "resign".to_string());
                }
                if pt == PASS_MOVE {
                    pass_move(&mut self.pos);
                    self.notify_play(PASS_MOVE);
                    return (true, "pass".to_string());
                }

                match play_move(&mut self.pos, pt) {
                    Ok(()) => {
                        self.notify_play(pt);
                        (true, str_coord(pt))
                    }
                    Err(e) => (false, e.to_string()),
                }
            }

            "dead_group_list" => {
                // A stone is dead once the ownermap is "sure" its point
                // belongs to the other color's territory.
                use crate::ownermap::Judgement;
                let om = &self.controller.ownermap;
                let min_games = crate::constants::GJ_MINGAMES as i64;
                let mut dead = Vec::new();
                for pt in crate::constants::BOARD_IMIN..crate::constants::BOARD_IMAX {
                    let c = self.pos.color[pt];
                    let judgement = om.judge(pt, min_games);
                    let dead_black = c == crate::constants::STONE_BLACK && judgement == Judgement::SureOpponent;
                    let dead_white = c == crate::constants::STONE_WHITE && judgement == Judgement::SureCurrent;
                    if dead_black || dead_white {
                        dead.push(str_coord(pt));
                    }
                }
                (true, dead.join(" "))
            }

            "chat" => (true, String::new()),

            "showboard" => {
                let owner_map = self.controller.ownermap.snapshot();
                let n_sims = self.controller.ownermap.playouts().max(1) as usize;
                let board_str = format_position_with_owner(&self.pos, Some(&owner_map), n_sims);
                eprint!("{}", board_str);
                (true, format!("\n{}", board_str.trim_end()))
            }

            "cputime" => (true, format!("{:.3}", self.start_time.elapsed().as_secs_f64())),

            "help" => (true, KNOWN_COMMANDS.join("\n")),

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = GtpEngine::new();
        let (success, response) = engine.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "moyo");
    }

    #[test]
    fn test_protocol_version() {
        let mut engine = GtpEngine::new();
        let (success, response) = engine.execute("protocol_version", &[]);
        assert!(success);
        assert_eq!(response, "2");
    }

    #[test]
    fn test_known_command() {
        let mut engine = GtpEngine::new();

        let (success, response) = engine.execute("known_command", &["name"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["unknown_cmd"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_boardsize() {
        let mut engine = GtpEngine::new();

        let (success, _) = engine.execute("boardsize", &[&N.to_string()]);
        assert!(success);

        let (success, _) = engine.execute("boardsize", &["19"]);
        assert!(!success);
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = GtpEngine::new();

        let (success, _) = engine.execute("play", &["black", "D4"]);
        assert!(success);

        let (success, _) = engine.execute("clear_board", &[]);
        assert!(success);
        assert_eq!(engine.pos.n, 0);
    }

    #[test]
    fn test_config_command() {
        let mut engine = GtpEngine::new();
        let (success, _) = engine.execute("moyo-config", &["threads=2"]);
        assert!(success);
        assert_eq!(engine.config.threads, 2);
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        let mut engine = GtpEngine::new();
        let (success, _) = engine.execute("moyo-config", &["bogus=1"]);
        assert!(!success);
    }
}
