//! Observer pattern for training pipelines
//!
//! Observers allow composable progress reporting during training without
//! coupling training logic to any output.

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Result,
    ports::{Observer, ProgressReporter},
    tictactoe::{GameOutcome, Mark},
};

/// Progress bar observer - Shows training progress in the terminal
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    wins: usize,
    draws: usize,
    losses: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            wins: 0,
            draws: 0,
            losses: 0,
        }
    }

    fn tally(&self) -> String {
        format!("{} D:{} L:{}", self.wins, self.draws, self.losses)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total: usize) -> Result<()> {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} (W:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: GameOutcome) -> Result<()> {
        match outcome {
            GameOutcome::Win(Mark::O) => self.wins += 1,
            GameOutcome::Win(Mark::X) => self.losses += 1,
            GameOutcome::Draw => self.draws += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(game_num as u64 + 1);
            pb.set_message(self.tally());
        }
        Ok(())
    }

    fn on_iteration(&mut self, iteration: usize, _limit: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(iteration as u64);
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.tally());
        }
        Ok(())
    }
}

/// Forwards training progress to a job's [`ProgressReporter`].
///
/// Reports are throttled to one per `every_percent` step; the last game
/// always reports. A reporter error (a cancelled job) aborts training.
pub struct ReporterObserver<'a> {
    reporter: &'a mut dyn ProgressReporter,
    every_percent: f64,
    total: usize,
    last_reported: Option<f64>,
}

impl<'a> ReporterObserver<'a> {
    pub fn new(reporter: &'a mut dyn ProgressReporter, every_percent: f64) -> Self {
        Self {
            reporter,
            every_percent: every_percent.max(0.0),
            total: 0,
            last_reported: None,
        }
    }

    fn report(&mut self, done: usize, limit: usize, message: String) -> Result<()> {
        let percent = if limit == 0 {
            100.0
        } else {
            (done as f64 / limit as f64 * 100.0).min(100.0)
        };
        let due = match self.last_reported {
            None => true,
            Some(last) => done >= limit || percent - last >= self.every_percent,
        };
        if due {
            self.reporter.report(percent, &message)?;
            self.last_reported = Some(percent);
        }
        Ok(())
    }
}

impl Observer for ReporterObserver<'_> {
    fn on_training_start(&mut self, total: usize) -> Result<()> {
        self.total = total;
        self.last_reported = None;
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, _outcome: GameOutcome) -> Result<()> {
        let done = game_num + 1;
        let total = self.total;
        self.report(done, total, format!("Games played: {done}/{total}"))
    }

    fn on_iteration(&mut self, iteration: usize, limit: usize) -> Result<()> {
        self.report(iteration, limit, format!("Planning sweep {iteration}"))
    }

    /// Planners usually converge before their sweep limit; close at 100%.
    fn on_training_end(&mut self) -> Result<()> {
        if self.last_reported.is_none_or(|last| last < 100.0) {
            self.reporter.report(100.0, "Training finished")?;
            self.last_reported = Some(100.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        reports: Vec<(f64, String)>,
    }

    impl ProgressReporter for Recorder {
        fn report(&mut self, percent: f64, message: &str) -> Result<()> {
            self.reports.push((percent, message.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_reporter_throttles_to_percent_steps() {
        let mut recorder = Recorder::default();
        {
            let mut observer = ReporterObserver::new(&mut recorder, 10.0);
            observer.on_training_start(100).unwrap();
            for game in 0..100 {
                observer.on_game_end(game, GameOutcome::Draw).unwrap();
            }
        }

        let percents: Vec<f64> = recorder.reports.iter().map(|(p, _)| *p).collect();
        // 1%, then roughly every 10%, then the final game
        assert!((10..=12).contains(&percents.len()), "{percents:?}");
        assert_eq!(percents.first(), Some(&1.0));
        assert_eq!(percents.last(), Some(&100.0));
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            recorder.reports.last().map(|(_, m)| m.as_str()),
            Some("Games played: 100/100")
        );
    }

    #[test]
    fn test_reporter_error_aborts() {
        struct Cancelled;
        impl ProgressReporter for Cancelled {
            fn report(&mut self, _percent: f64, _message: &str) -> Result<()> {
                Err(crate::Error::Cancelled)
            }
        }

        let mut reporter = Cancelled;
        let mut observer = ReporterObserver::new(&mut reporter, 1.0);
        observer.on_training_start(3).unwrap();
        assert!(matches!(
            observer.on_game_end(0, GameOutcome::Draw),
            Err(crate::Error::Cancelled)
        ));
    }
}
