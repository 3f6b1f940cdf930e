//! Match runner: threads one [`State`] through the two sides' agents.
//!
//! A side without an agent is played by hand through [`Game::play`]. Every
//! applied move is reported to both agents so persistent search trees stay on
//! the game's line.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::agent::{Agent, PlayerMode};
use crate::board::Player;
use crate::config::GameConfig;
use crate::moves::Move;
use crate::state::{MoveError, State};

/// How a match ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    Winner(Player),
    /// The ply limit was reached first.
    Draw,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Winner(p) => write!(f, "{p} wins"),
            GameResult::Draw => write!(f, "draw"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{0} is played by hand")]
    HumanToMove(Player),
    #[error(transparent)]
    Move(#[from] MoveError),
}

pub struct Game {
    state: State,
    white: Option<Box<dyn Agent>>,
    black: Option<Box<dyn Agent>>,
    plies: usize,
    max_plies: usize,
}

impl Game {
    /// Start from the initial layout of `config`.
    pub fn new(
        config: &GameConfig,
        white: Option<Box<dyn Agent>>,
        black: Option<Box<dyn Agent>>,
    ) -> Self {
        Self {
            state: State::from_config(config),
            white,
            black,
            plies: 0,
            max_plies: config.max_plies,
        }
    }

    /// Build both sides from presets. The two agents get distinct seeds
    /// derived from `config.seed`.
    pub fn from_modes(config: &GameConfig, white: PlayerMode, black: PlayerMode) -> Self {
        let state = State::from_config(config);
        let w = white.agent(&state, config.seed);
        let b = black.agent(&state, config.seed.wrapping_add(1));
        Self::new(config, w, b)
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Moves applied so far. Each step of a capture chain counts.
    pub fn plies(&self) -> usize {
        self.plies
    }

    pub fn result(&self) -> Option<GameResult> {
        if let Some(winner) = self.state.winner() {
            return Some(GameResult::Winner(winner));
        }
        if self.plies >= self.max_plies {
            return Some(GameResult::Draw);
        }
        None
    }

    /// Whether the game is waiting for a move from a side with no agent.
    pub fn awaiting_human(&self) -> bool {
        self.result().is_none() && self.agent_for(self.state.to_move()).is_none()
    }

    fn agent_for(&self, player: Player) -> Option<&dyn Agent> {
        match player {
            Player::White => self.white.as_deref(),
            Player::Black => self.black.as_deref(),
        }
    }

    /// Apply `mv` for the side to move and report it to both agents.
    pub fn play(&mut self, mv: &Move) -> Result<(), MoveError> {
        let mover = self.state.to_move();
        self.state = self.state.execute_move(mv)?;
        self.plies += 1;
        info!(ply = self.plies, player = %mover, %mv, "move");
        for agent in [&mut self.white, &mut self.black].into_iter().flatten() {
            agent.observe(mv);
        }
        Ok(())
    }

    /// Let the side to move's agent play one move. Returns the move, or
    /// `None` if the game is over.
    pub fn step(&mut self) -> Result<Option<Move>, GameError> {
        if self.result().is_some() {
            return Ok(None);
        }
        let player = self.state.to_move();
        let agent = match player {
            Player::White => self.white.as_mut(),
            Player::Black => self.black.as_mut(),
        };
        let Some(agent) = agent else {
            return Err(GameError::HumanToMove(player));
        };
        let mv = agent.decide(&self.state);
        self.play(&mv)?;
        Ok(Some(mv))
    }

    /// Play automated moves until the game ends.
    pub fn run(&mut self) -> Result<GameResult, GameError> {
        loop {
            if let Some(result) = self.result() {
                info!(plies = self.plies, %result, "game over");
                return Ok(result);
            }
            self.step()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RandomAgent;

    fn config() -> GameConfig {
        GameConfig::new(5, 5).unwrap().with_seed(9)
    }

    fn transcript(white: PlayerMode, black: PlayerMode) -> (Vec<Move>, GameResult) {
        let mut game = Game::from_modes(&config().with_max_plies(60), white, black);
        let mut moves = Vec::new();
        while let Some(mv) = game.step().unwrap() {
            moves.push(mv);
        }
        (moves, game.result().unwrap())
    }

    #[test]
    fn test_random_game_finishes() {
        let mut game = Game::new(
            &config(),
            Some(Box::new(RandomAgent::new(1))),
            Some(Box::new(RandomAgent::new(2))),
        );
        let result = game.run().unwrap();
        assert!(game.plies() <= config().max_plies);
        match result {
            GameResult::Winner(p) => assert_eq!(game.state().winner(), Some(p)),
            GameResult::Draw => assert_eq!(game.plies(), config().max_plies),
        }
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let a = transcript(PlayerMode::Random, PlayerMode::MctsQuick);
        let b = transcript(PlayerMode::Random, PlayerMode::MctsQuick);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ply_limit_draws() {
        let cfg = config().with_max_plies(3);
        let mut game = Game::from_modes(&cfg, PlayerMode::Random, PlayerMode::Random);
        let result = game.run().unwrap();
        if game.state().winner().is_none() {
            assert_eq!(result, GameResult::Draw);
            assert_eq!(game.plies(), 3);
        }
    }

    #[test]
    fn test_human_side_waits() {
        let mut game = Game::from_modes(&config(), PlayerMode::Human, PlayerMode::Random);
        assert!(game.awaiting_human());
        assert_eq!(game.step(), Err(GameError::HumanToMove(Player::White)));

        let mv = game.state().available_moves()[0].clone();
        game.play(&mv).unwrap();
        assert_eq!(game.plies(), 1);
        assert!(game.play(&Move::Pass).is_err());
    }
}
