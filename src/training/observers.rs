//! Observer pattern for training runs
//!
//! Observers allow composable progress reporting without coupling the
//! training loop to a particular output format.

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Result,
    game::{Mark, Outcome},
};

/// Receives callbacks from a training run
pub trait Observer {
    /// Called once before the first episode
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each completed episode
    fn on_episode_end(&mut self, _episode: usize, _outcome: Outcome) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Progress bar observer showing a running X-perspective W/D/L tally
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    wins: usize,
    draws: usize,
    losses: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            wins: 0,
            draws: 0,
            losses: 0,
        }
    }

    fn tally_message(&self) -> String {
        format!("{} D:{} L:{}", self.wins, self.draws, self.losses)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (W:{msg})")
                .map_err(|e| crate::Error::ProgressTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Win(Mark::X) => self.wins += 1,
            Outcome::Win(Mark::O) => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64 + 1);
            pb.set_message(self.tally_message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.tally_message());
        }
        Ok(())
    }
}
