//! Line-oriented text protocol, modelled on the Go Text Protocol.
//!
//! Each line is an optional numeric id followed by a command and its
//! arguments. Successful commands answer `=[id] result`, failures
//! `?[id] message`, each followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <width> <height>` - start a new game on another board
//! - `clear_board` - back to the initial layout
//! - `mode <player-mode>` - the preset used by `genmove`
//! - `play <move>` - apply a move given in notation (`b2-c3/A`, `pass`)
//! - `genmove` - let the engine move for the side to move
//! - `legal_moves`, `showboard`, `winner`
//!
//! ## Example
//!
//! ```ignore
//! use fanorona::protocol::ProtocolEngine;
//! let mut engine = ProtocolEngine::new(Default::default());
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use tracing::debug;

use crate::agent::{Agent, PlayerMode};
use crate::config::GameConfig;
use crate::moves::Notation;
use crate::state::State;

const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "mode",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
    "winner",
];

pub struct ProtocolEngine {
    config: GameConfig,
    state: State,
    mode: PlayerMode,
    /// Built lazily for `mode` at the current position.
    agent: Option<Box<dyn Agent>>,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl ProtocolEngine {
    pub fn new(config: GameConfig) -> Self {
        Self::with_mode(config, PlayerMode::MctsQuick)
    }

    pub fn with_mode(config: GameConfig, mode: PlayerMode) -> Self {
        Self {
            state: State::from_config(&config),
            config,
            mode,
            agent: None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.serve(stdin.lock(), &mut stdout)
    }

    /// Run the command loop over arbitrary streams until `quit` or end of
    /// input.
    pub fn serve(&mut self, input: impl BufRead, output: &mut impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command id off the front of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    fn restart(&mut self) {
        self.state = State::from_config(&self.config);
        self.agent = None;
    }

    /// Execute one command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "boardsize" => {
                let [w, h] = args else {
                    return (false, "expected: boardsize <width> <height>".to_string());
                };
                let (Ok(w), Ok(h)) = (w.parse::<usize>(), h.parse::<usize>()) else {
                    return (false, "invalid size".to_string());
                };
                match GameConfig::new(w, h) {
                    Ok(config) => {
                        self.config = GameConfig {
                            width: config.width,
                            height: config.height,
                            ..self.config
                        };
                        self.restart();
                        (true, String::new())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "clear_board" => {
                self.restart();
                (true, String::new())
            }

            "mode" => {
                let Some(arg) = args.first() else {
                    return (true, self.mode.to_string());
                };
                match PlayerMode::from_str(arg, true) {
                    Ok(mode) => {
                        self.mode = mode;
                        self.agent = None;
                        (true, String::new())
                    }
                    Err(_) => (false, format!("unknown mode: {arg}")),
                }
            }

            "play" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let notation: Notation = match arg.parse() {
                    Ok(n) => n,
                    Err(err) => return (false, err.to_string()),
                };
                let legal = self.state.available_moves();
                let mv = match notation.resolve(&legal) {
                    Ok(mv) => mv.clone(),
                    Err(err) => return (false, err.to_string()),
                };
                match self.state.execute_move(&mv) {
                    Ok(next) => {
                        self.state = next;
                        if let Some(agent) = self.agent.as_mut() {
                            agent.observe(&mv);
                        }
                        (true, mv.to_string())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "genmove" => {
                if let Some(winner) = self.state.winner() {
                    return (false, format!("game over, {winner} won"));
                }
                if self.agent.is_none() {
                    debug!(mode = %self.mode, "building agent");
                    self.agent = self.mode.agent(&self.state, self.config.seed);
                }
                let Some(agent) = self.agent.as_mut() else {
                    return (false, format!("mode {} cannot generate moves", self.mode));
                };
                let mv = agent.decide(&self.state);
                match self.state.execute_move(&mv) {
                    Ok(next) => {
                        self.state = next;
                        agent.observe(&mv);
                        (true, mv.to_string())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "legal_moves" => {
                let moves: Vec<String> = self
                    .state
                    .available_moves()
                    .iter()
                    .map(|mv| mv.to_string())
                    .collect();
                (true, moves.join(" "))
            }

            "showboard" => {
                let player = self.state.to_move();
                let turn = match self.state.chain() {
                    Some(chain) => format!("{player} to move, continuing from {}", chain.square),
                    None => format!("{player} to move"),
                };
                (true, format!("\n{}{turn}", self.state.board()))
            }

            "winner" => match self.state.winner() {
                Some(winner) => (true, winner.to_string()),
                None => (true, "none".to_string()),
            },

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ProtocolEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ProtocolEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = ProtocolEngine::default();
        let (success, response) = engine.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "fanorona");
    }

    #[test]
    fn test_known_command() {
        let mut engine = ProtocolEngine::default();

        let (success, response) = engine.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["komi"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_boardsize() {
        let mut engine = ProtocolEngine::default();

        let (success, _) = engine.execute("boardsize", &["9", "5"]);
        assert!(success);
        assert_eq!(engine.state().board().width(), 9);
        assert_eq!(engine.state().board().height(), 5);

        let (success, _) = engine.execute("boardsize", &["11", "5"]);
        assert!(!success);
        let (success, _) = engine.execute("boardsize", &["9"]);
        assert!(!success);
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = ProtocolEngine::default();
        let first = engine.state().available_moves()[0].to_string();

        let (success, response) = engine.execute("play", &[&first]);
        assert!(success);
        assert_eq!(response, first);
        assert_ne!(engine.state(), &State::new(7, 7));

        let (success, _) = engine.execute("play", &["a1-a2"]);
        assert!(!success);

        let (success, _) = engine.execute("clear_board", &[]);
        assert!(success);
        assert_eq!(engine.state(), &State::new(7, 7));
    }

    #[test]
    fn test_genmove_follows_mode() {
        let config = GameConfig::new(5, 5).unwrap();
        let mut engine = ProtocolEngine::with_mode(config, PlayerMode::Random);
        let before = engine.state().clone();
        let (success, response) = engine.execute("genmove", &[]);
        assert!(success);
        let legal: Vec<String> = before
            .available_moves()
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert!(legal.contains(&response));

        let (success, _) = engine.execute("mode", &["human"]);
        assert!(success);
        let (success, _) = engine.execute("genmove", &[]);
        assert!(!success);
        let (success, _) = engine.execute("mode", &["grandmaster"]);
        assert!(!success);
    }

    #[test]
    fn test_serve_formats_responses() {
        let mut engine = ProtocolEngine::default();
        let input = "1 name\n# comment\nwinner\nbogus\nquit\nname\n".as_bytes();
        let mut output = Vec::new();
        engine.serve(input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "=1 fanorona\n\n= none\n\n? unknown command: bogus\n\n= \n\n");
    }
}
