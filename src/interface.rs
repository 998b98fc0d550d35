//! Session boundary for a GUI or other interactive front-end
//!
//! A [`PlaySession`] wraps one agent and one game in progress. The
//! front-end drives it with three calls: [`PlaySession::request_ai_move`]
//! when it is the engine's turn, [`PlaySession::report_human_move`] when
//! the human has moved, and [`PlaySession::report_outcome`] once the game
//! is over. Board legality is enforced here, so the front-end never has
//! to duplicate the rules.

use std::path::Path;

use crate::{
    Result,
    game::{BoardState, Mark, Outcome},
    persistence::{self, SavedAgent, TrainingMetadata},
    q_learning::{Hyperparameters, QLearningAgent},
};

/// One human-vs-AI game session
pub struct PlaySession {
    agent: QLearningAgent,
    board: BoardState,
    moves: Vec<usize>,
    games_played: u64,
    online_learning: bool,
}

impl PlaySession {
    /// Start a session around an existing agent, learning disabled
    pub fn new(agent: QLearningAgent) -> Self {
        Self {
            agent,
            board: BoardState::new(),
            moves: Vec::new(),
            games_played: 0,
            online_learning: false,
        }
    }

    /// Enable learning from reported game outcomes
    pub fn with_online_learning(mut self) -> Self {
        self.online_learning = true;
        self
    }

    /// Load an agent from disk, falling back to a fresh one
    ///
    /// A missing, corrupt, or mismatched save file is logged and replaced
    /// by an untrained agent rather than surfaced to the front-end.
    pub fn load_or_fresh(path: &Path, mark: Mark, hyper: Hyperparameters) -> Self {
        let agent = match persistence::load_from_file(path) {
            Ok(saved) if saved.mark() == mark => saved.into_agent(),
            Ok(saved) => {
                log::warn!(
                    "agent at {path:?} was trained as {}, starting fresh as {mark}",
                    saved.mark()
                );
                QLearningAgent::new(mark, hyper)
            }
            Err(err) => {
                log::warn!("could not load agent from {path:?} ({err}), starting fresh");
                QLearningAgent::new(mark, hyper)
            }
        };
        Self::new(agent)
    }

    /// Board as the session currently sees it
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    /// Terminal outcome of the current game, if it has ended
    pub fn outcome(&self) -> Option<Outcome> {
        self.board.outcome()
    }

    /// Have the engine move, returning the position it chose
    ///
    /// Selection is greedy over the agent's table; with online learning
    /// enabled the agent keeps exploring at its current ε instead. The
    /// move is applied to the session board before returning.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoLegalMoves`] if the game is already over.
    pub fn request_ai_move(&mut self) -> Result<usize> {
        let position = if self.online_learning {
            self.agent.select_move(&self.board)?
        } else {
            self.agent.greedy_move(&self.board)?
        };
        self.board = self.board.make_move(position)?;
        self.moves.push(position);
        Ok(position)
    }

    /// Apply a human move to the session board
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalMove`] if the position is out of
    /// range, occupied, or the game is over; the board is left unchanged
    /// and the front-end should re-prompt.
    pub fn report_human_move(&mut self, position: usize) -> Result<()> {
        self.board = self.board.make_move(position)?;
        self.moves.push(position);
        Ok(())
    }

    /// Close out the finished game and reset for the next one
    ///
    /// With online learning enabled the agent replays the recorded moves
    /// and updates its table from `outcome`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalMove`] if the recorded moves fail to
    /// replay, which indicates a corrupted session.
    pub fn report_outcome(&mut self, outcome: Outcome) -> Result<()> {
        if self.online_learning && !self.moves.is_empty() {
            self.agent.learn_from_episode(&self.moves, outcome)?;
        }
        self.games_played += 1;
        self.reset();
        Ok(())
    }

    /// Abandon the current game without learning from it
    pub fn reset(&mut self) {
        self.board = BoardState::new();
        self.moves.clear();
    }

    /// Persist the session's agent
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Persistence`] if the snapshot cannot be
    /// written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let metadata = TrainingMetadata {
            episodes_trained: self.games_played,
            opponent: "human".to_string(),
            ..TrainingMetadata::default()
        };
        persistence::save_to_file(&SavedAgent::from_agent(&self.agent, metadata), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_session(mark: Mark) -> PlaySession {
        PlaySession::new(QLearningAgent::new(mark, Hyperparameters::default()).with_seed(1))
    }

    #[test]
    fn ai_opens_in_the_first_free_cell_with_a_flat_table() {
        let mut session = fresh_session(Mark::X);
        assert_eq!(session.request_ai_move().unwrap(), 0);
        assert_eq!(session.board().encode(), "X........");
    }

    #[test]
    fn illegal_human_move_leaves_the_board_unchanged() {
        let mut session = fresh_session(Mark::O);
        session.report_human_move(4).unwrap();
        let before = *session.board();

        assert!(matches!(
            session.report_human_move(4),
            Err(crate::Error::IllegalMove { position: 4 })
        ));
        assert_eq!(*session.board(), before);
    }

    #[test]
    fn moves_alternate_between_human_and_engine() {
        let mut session = fresh_session(Mark::O);
        session.report_human_move(4).unwrap();
        let reply = session.request_ai_move().unwrap();
        // flat table: greedy O answers the center opening at position 0
        assert_eq!(reply, 0);
        assert_eq!(session.board().encode(), "O...X....");
    }

    #[test]
    fn reported_outcome_updates_the_table_when_learning() {
        let mut session = fresh_session(Mark::X).with_online_learning();
        // X takes the top row: 0, 1, 2 against human 3, 4.
        session.request_ai_move().unwrap(); // X -> 0
        session.report_human_move(3).unwrap();
        session.report_human_move(1).unwrap(); // X (driven manually)
        session.report_human_move(4).unwrap();
        session.report_human_move(2).unwrap(); // X completes the row
        assert_eq!(session.outcome(), Some(Outcome::Win(Mark::X)));

        session.report_outcome(Outcome::Win(Mark::X)).unwrap();
        assert!(!session.agent().table().is_empty());
        // board is ready for the next game
        assert_eq!(session.board().encode(), ".........");
    }

    #[test]
    fn online_learning_session_keeps_exploring() {
        // At ε = 1.0 every engine move is a uniform draw over the nine
        // openings; some seed must pick something other than position 0.
        let hyper = Hyperparameters {
            epsilon: 1.0,
            ..Hyperparameters::default()
        };
        let mut openings = std::collections::HashSet::new();
        for seed in 0..20 {
            let agent = QLearningAgent::new(Mark::X, hyper).with_seed(seed);
            let mut session = PlaySession::new(agent).with_online_learning();
            openings.insert(session.request_ai_move().unwrap());
        }
        assert!(
            openings.len() > 1,
            "exploring sessions should vary their openings, got {openings:?}"
        );
    }

    #[test]
    fn playback_session_stays_greedy_despite_high_epsilon() {
        let hyper = Hyperparameters {
            epsilon: 1.0,
            ..Hyperparameters::default()
        };
        for seed in 0..20 {
            let agent = QLearningAgent::new(Mark::X, hyper).with_seed(seed);
            let mut session = PlaySession::new(agent);
            assert_eq!(session.request_ai_move().unwrap(), 0);
        }
    }

    #[test]
    fn outcome_without_learning_leaves_the_table_empty() {
        let mut session = fresh_session(Mark::X);
        session.request_ai_move().unwrap();
        session.report_human_move(4).unwrap();
        session.reset();
        session.report_outcome(Outcome::Draw).unwrap();
        assert!(session.agent().table().is_empty());
    }

    #[test]
    fn load_or_fresh_falls_back_on_a_missing_file() {
        let session = PlaySession::load_or_fresh(
            Path::new("/tmp/no_such_agent_55555.msgpack"),
            Mark::O,
            Hyperparameters::default(),
        );
        assert_eq!(session.agent().mark(), Mark::O);
        assert!(session.agent().table().is_empty());
    }

    #[test]
    fn save_then_load_restores_the_agent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.msgpack");

        let mut session = fresh_session(Mark::X).with_online_learning();
        for mv in [0, 3, 1, 4, 2] {
            session.report_human_move(mv).unwrap();
        }
        session.report_outcome(Outcome::Win(Mark::X)).unwrap();
        session.save(&path).unwrap();

        let restored = PlaySession::load_or_fresh(&path, Mark::X, Hyperparameters::default());
        assert_eq!(
            restored.agent().table().len(),
            session.agent().table().len()
        );
    }
}
