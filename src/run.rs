use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::record::RecordBuilder;
use crate::error::AppError;
use crate::model::Identity;
use crate::storage::{GameRef, RecordSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub submitted: usize,
    pub already_seen: usize,
    pub recorded: usize,
    pub identity_not_found: usize,
    pub match_not_found: usize,
    pub roster_invalid: usize,
    pub other_errors: usize,
    /// Registry entries at the end of the run, misses included.
    pub players_cached: usize,
    pub stopped_early: bool,
}

/// Works through a list of games one at a time, appending a record per game.
pub struct BatchRunner {
    builder: RecordBuilder,
    sink: Box<dyn RecordSink>,
    window_size: usize,
    stop: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(builder: RecordBuilder, sink: Box<dyn RecordSink>, window_size: usize) -> Self {
        BatchRunner {
            builder,
            sink,
            window_size,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Setting the flag stops the run before the next game starts.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn run(&self, games: &[GameRef]) -> Result<RunSummary, AppError> {
        self.run_with_progress(games, |_| {})
    }

    /// Like `run`, calling `on_game` after each game is handled.
    pub fn run_with_progress<F>(&self, games: &[GameRef], mut on_game: F) -> Result<RunSummary, AppError>
    where
        F: FnMut(&RunSummary),
    {
        let mut seen: HashSet<String> = self.sink.seen_match_ids()?;
        let mut summary = RunSummary {
            submitted: games.len(),
            ..RunSummary::default()
        };
        info!(games = games.len(), already_recorded = seen.len(), "starting run");

        for game in games {
            if self.stop.load(Ordering::SeqCst) {
                summary.stopped_early = true;
                break;
            }

            if !seen.insert(game.match_id.clone()) {
                summary.already_seen += 1;
                on_game(&summary);
                continue;
            }

            match self
                .builder
                .build(&game.match_id, &Identity::new(&game.player), self.window_size)
            {
                Ok(record) => {
                    self.sink.append(&record)?;
                    summary.recorded += 1;
                }
                Err(e) => {
                    warn!(match_id = %game.match_id, player = %game.player, error = %e, "game skipped");
                    match e {
                        AppError::IdentityNotFound(_) => summary.identity_not_found += 1,
                        AppError::MatchNotFound(_) => summary.match_not_found += 1,
                        AppError::RosterInvalid { .. } => summary.roster_invalid += 1,
                        _ => summary.other_errors += 1,
                    }
                }
            }
            on_game(&summary);
        }

        summary.players_cached = self.builder.registry().len();
        info!(
            recorded = summary.recorded,
            players = summary.players_cached,
            already_seen = summary.already_seen,
            "run finished"
        );
        Ok(summary)
    }
}
