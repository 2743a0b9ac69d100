use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use hanabi_bot::HanabiPlayer;
use hanabi_core::{Deck, GameState, GameView, MoveView};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{event, Level};

use crate::config::{BenchConfig, ResolvedOutputs};

/// Well past the longest possible game (deck + final rotation + clue turns).
const TURN_LIMIT: usize = 200;

/// One JSONL row per finished game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRow {
    pub seed: u64,
    pub players: usize,
    pub score: u8,
    pub max_score: u8,
    pub lives_left: u8,
    pub turns: usize,
    pub misplays: usize,
}

#[derive(Debug)]
pub struct RunSummary {
    pub games_played: usize,
    pub mean_score: f64,
    pub perfect_games: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

pub struct SelfPlayRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
}

impl SelfPlayRunner {
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let base_seed = self.config.games.seed.unwrap_or(0);
        let players = self.config.games.players;

        if let Some(parent) = self.outputs.jsonl.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
        let file = File::create(&self.outputs.jsonl)
            .with_context(|| format!("creating {}", self.outputs.jsonl.display()))?;
        let mut writer = BufWriter::new(file);

        let mut rows = Vec::with_capacity(self.config.games.count);
        for index in 0..self.config.games.count {
            let seed = base_seed.wrapping_add(index as u64);
            let row = play_game(seed, players)
                .with_context(|| format!("self-play game with seed {seed}"))?;
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            event!(
                target: "hanabi_bench::game",
                Level::INFO,
                seed,
                score = row.score,
                max_score = row.max_score,
                turns = row.turns,
            );
            rows.push(row);
        }
        writer.flush()?;

        let summary = self.write_summary(&rows)?;
        Ok(summary)
    }

    fn write_summary(&self, rows: &[GameRow]) -> Result<RunSummary> {
        let games_played = rows.len();
        let mean_score = if games_played == 0 {
            0.0
        } else {
            rows.iter().map(|row| row.score as f64).sum::<f64>() / games_played as f64
        };
        let perfect_games = rows.iter().filter(|row| row.score == 25).count();

        if let Some(parent) = self.outputs.summary_md.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
        let mut summary = String::new();
        summary.push_str(&format!("# Self-play run `{}`\n\n", self.config.run_id));
        summary.push_str(&format!(
            "- games: {games_played}\n- players: {}\n- mean score: {mean_score:.2}\n- perfect games: {perfect_games}\n\n",
            self.config.games.players
        ));
        summary.push_str("| seed | score | max | lives | turns | misplays |\n");
        summary.push_str("|---|---|---|---|---|---|\n");
        for row in rows {
            summary.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                row.seed, row.score, row.max_score, row.lives_left, row.turns, row.misplays
            ));
        }
        fs::write(&self.outputs.summary_md, summary)
            .with_context(|| format!("writing {}", self.outputs.summary_md.display()))?;

        Ok(RunSummary {
            games_played,
            mean_score,
            perfect_games,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }
}

/// Plays one full game engine-vs-itself and reports the outcome.
pub fn play_game(seed: u64, players: usize) -> Result<GameRow> {
    let deck = Deck::shuffled_with_seed(seed);
    let starting_player = (seed % players as u64) as usize;
    let mut state = GameState::deal(players, deck, starting_player);
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed_cafe);

    let mut bots: Vec<HanabiPlayer> = (0..players)
        .map(|seat| HanabiPlayer::new(seat, players))
        .collect();
    let mut histories: Vec<Vec<GameView>> =
        (0..players).map(|seat| vec![state.view_for(seat)]).collect();

    let mut turns = 0usize;
    let mut misplays = 0usize;
    while !state.is_over() {
        if turns >= TURN_LIMIT {
            bail!("game with seed {seed} exceeded {TURN_LIMIT} turns");
        }

        let actor = state.current_player();
        let mv = bots[actor].play_own_turn(&histories[actor], &mut rng)?;
        state = state.apply(mv)?;
        turns += 1;

        for seat in 0..players {
            histories[seat].push(state.view_for(seat));
            if seat != actor {
                bots[seat] = bots[seat].observe_others_turn(&histories[seat]);
            }
        }

        if let Some(view) = histories[0].last() {
            if matches!(
                view.last_move,
                Some(MoveView::Play {
                    successful: false,
                    ..
                })
            ) {
                misplays += 1;
            }
        }
    }

    Ok(GameRow {
        seed,
        players,
        score: state.score(),
        max_score: state.max_score(),
        lives_left: state.lives(),
        turns,
        misplays,
    })
}
