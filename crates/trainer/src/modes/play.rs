//! Play against the engine with per-move feedback, or free play without one

use std::io::{self, BufRead, Write};

use puzzle_core::eval::describe_advantage;
use puzzle_core::input::{Command, Input};
use puzzle_core::search::{best_move, evaluate, top_moves};
use puzzle_core::{review_move, QualityLabel, Rules, Search, SearchBudget, Side, Standard};
use shakmaty::{Chess, Position};
use tracing::{info, warn};

use crate::board;
use crate::console::Console;

const HELP: &str = "Commands:
  moves  list the legal moves
  hint   show the engine's top moves
  best   show the engine's best move
  eval   show a detailed evaluation
  undo   take back the last turn
  quit   return to the menu
Type a square (e.g. e2) to see the moves of the piece on it.";

const NO_ENGINE: &str = "Engine not available: install Stockfish or set STOCKFISH_PATH for analysis. \
Free play: you move both sides and moves are not evaluated.";

#[derive(Debug, Clone, Copy)]
pub struct PlaySettings {
    /// Opponent search depth
    pub opponent_depth: u32,
    /// Budget for reviewing moves, evaluations and hints
    pub review_budget: SearchBudget,
    pub hint_count: u32,
    /// Evaluate every position before the prompt
    pub show_evaluation: bool,
}

pub async fn run_play<S: Search, I: BufRead, O: Write>(
    console: &mut Console<I, O>,
    search: &mut S,
    settings: PlaySettings,
) -> io::Result<()> {
    let rules = Standard;
    let mut history: Vec<Chess> = vec![rules.initial_position()];
    let mut last_uci: Option<String> = None;
    let mut with_engine = search.is_available();

    if with_engine {
        info!(depth = settings.opponent_depth, "Supervised game started");
        console.say("You play White. Type 'help' for commands.")?;
    } else {
        info!("Free play started without an engine");
        console.say(NO_ENGINE)?;
    }

    loop {
        let Some(position) = history.last().cloned() else {
            break;
        };
        let marks = last_uci.as_deref().map(board::move_squares).unwrap_or_default();
        console.say(board::render(&position, &marks))?;
        if let Some(result) = game_result(&position) {
            console.say(result)?;
            break;
        }
        if position.is_check() {
            console.say("Check!")?;
        }
        if with_engine && settings.show_evaluation {
            show_evaluation(console, search, &position, settings.review_budget).await?;
        }
        console.say(format!("{} to move.", rules.side_to_move(&position)))?;

        let Some(line) = console.prompt("Your move: ")? else {
            break;
        };
        let text = match Input::parse(&line) {
            Input::Empty => continue,
            Input::Command(Command::Quit | Command::Menu) => break,
            Input::Command(Command::Help) => {
                console.say(HELP)?;
                continue;
            }
            Input::Command(Command::Moves) => {
                let moves: Vec<String> = rules
                    .legal_moves(&position)
                    .iter()
                    .map(|mv| rules.to_short_form(mv, &position))
                    .collect();
                console.say(format!("Legal moves: {}", moves.join(", ")))?;
                continue;
            }
            Input::Command(Command::Undo) => {
                // One turn is the user's move plus the engine reply, or a single move in free play
                let turn = if with_engine { 2 } else { 1 };
                let undo = turn.min(history.len() - 1);
                if undo == 0 {
                    console.say("Nothing to undo.")?;
                } else {
                    history.truncate(history.len() - undo);
                    last_uci = None;
                    console.say("Move undone.")?;
                }
                continue;
            }
            Input::Command(Command::Hint) => {
                let fen = rules.to_canonical(&position);
                let lines = top_moves(search, &fen, settings.review_budget, settings.hint_count).await;
                if lines.is_empty() {
                    console.say("No suggestions available.")?;
                }
                for (i, line) in lines.iter().enumerate() {
                    let san = short_form(&rules, &position, &line.mv);
                    console.say(format!("{}. {san} ({})", i + 1, line.score))?;
                }
                continue;
            }
            Input::Command(Command::Best) => {
                let fen = rules.to_canonical(&position);
                match best_move(search, &fen, settings.review_budget).await {
                    Some(uci) => console.say(format!("Best move: {}", short_form(&rules, &position, &uci)))?,
                    None => console.say("No evaluation available.")?,
                }
                continue;
            }
            Input::Command(Command::Eval) => {
                show_detailed_evaluation(console, search, &position, settings.review_budget).await?;
                continue;
            }
            Input::Command(Command::Solution) => {
                console.say("There is no solution in free play. Try 'hint'.")?;
                continue;
            }
            Input::Move(text) => text,
        };

        let mv = match rules.read_move(&text, &position) {
            Ok(mv) => mv,
            Err(e) => {
                match rules.moves_from_square(&text, &position) {
                    Some((square, moves)) if !moves.is_empty() => {
                        let destinations: Vec<String> = moves.iter().map(|m| rules.destination(m)).collect();
                        let names: Vec<String> = moves.iter().map(|m| rules.to_short_form(m, &position)).collect();
                        console.say(board::render(&position, &board::squares(&destinations)))?;
                        console.say(format!("Moves from {square}: {}", names.join(", ")))?;
                    }
                    Some((square, _)) => console.say(format!("No legal moves from {square}"))?,
                    None => console.say(e.to_string())?,
                }
                continue;
            }
        };
        let played = rules.to_short_form(&mv, &position);
        let review = review_move(&rules, search, &position, &text, settings.review_budget).await;
        if review.label == QualityLabel::Unknown {
            console.say(format!("{played}: no evaluation available"))?;
        } else {
            console.say(format!("{played}: {} ({:+.2})", review.label, review.eval_change))?;
            if review.label != QualityLabel::Best {
                if let Some(best) = &review.best_move {
                    console.say(format!("Best was {best}"))?;
                }
            }
            let white = white_pawns(&rules, &position, review.eval_after);
            console.say(format!("Evaluation: {white:+.2} ({})", describe_advantage(white)))?;
        }

        let after_user = match rules.apply(&mv, &position) {
            Ok(next) => next,
            Err(e) => {
                console.say(e.to_string())?;
                continue;
            }
        };
        history.push(after_user.clone());
        last_uci = Some(rules.to_long_form(&mv).to_string());
        if !with_engine || game_result(&after_user).is_some() {
            continue;
        }

        let fen = rules.to_canonical(&after_user);
        let reply = best_move(search, &fen, SearchBudget::Depth(settings.opponent_depth))
            .await
            .and_then(|uci| rules.parse_move(&uci, &after_user));
        let Some(reply) = reply else {
            if !search.is_available() {
                warn!("Engine lost mid-game, switching to free play");
                with_engine = false;
                console.say(NO_ENGINE)?;
                continue;
            }
            console.say("The engine could not find a reply. Game stopped.")?;
            break;
        };
        let san = rules.to_short_form(&reply, &after_user);
        match rules.apply(&reply, &after_user) {
            Ok(next) => {
                console.say(format!("Engine plays {san}"))?;
                last_uci = Some(rules.to_long_form(&reply).to_string());
                history.push(next);
            }
            Err(e) => {
                console.say(format!("Engine reply rejected: {e}"))?;
                break;
            }
        }
    }

    Ok(())
}

fn short_form(rules: &Standard, position: &Chess, uci: &str) -> String {
    rules
        .parse_move(uci, position)
        .map(|mv| rules.to_short_form(&mv, position))
        .unwrap_or_else(|| uci.to_string())
}

/// Side-to-move score converted to White's point of view
fn white_pawns(rules: &Standard, position: &Chess, pawns: f64) -> f64 {
    match rules.side_to_move(position) {
        Side::White => pawns,
        Side::Black => -pawns,
    }
}

async fn show_evaluation<S: Search, I: BufRead, O: Write>(
    console: &mut Console<I, O>,
    search: &mut S,
    position: &Chess,
    budget: SearchBudget,
) -> io::Result<()> {
    let rules = Standard;
    let sample = evaluate(search, &rules.to_canonical(position), budget).await;
    if sample.degraded {
        return console.say("Evaluation: not available");
    }
    let white = white_pawns(&rules, position, sample.pawns());
    console.say(format!("Evaluation: {white:+.2} ({})", describe_advantage(white)))?;
    if let Some(best) = &sample.best_move {
        console.say(format!("Best move: {}", short_form(&rules, position, best)))?;
    }
    Ok(())
}

async fn show_detailed_evaluation<S: Search, I: BufRead, O: Write>(
    console: &mut Console<I, O>,
    search: &mut S,
    position: &Chess,
    budget: SearchBudget,
) -> io::Result<()> {
    let rules = Standard;
    let sample = evaluate(search, &rules.to_canonical(position), budget).await;
    if sample.degraded {
        return console.say("No evaluation available.");
    }
    let white = white_pawns(&rules, position, sample.pawns());
    console.say(format!("Score: {white:+.2}"))?;
    console.say(format!("Assessment: {}", describe_advantage(white)))?;
    if let Some(best) = &sample.best_move {
        console.say(format!("Best move: {}", short_form(&rules, position, best)))?;
    }
    if sample.mate_in().is_some() {
        console.say(format!("Mate: {}", sample.score))?;
    }
    Ok(())
}

/// Final result text once the game is over
fn game_result(pos: &Chess) -> Option<String> {
    if pos.is_checkmate() {
        Some(format!("Checkmate. {} wins.", Standard.side_to_move(pos).opposite()))
    } else if pos.is_stalemate() {
        Some("Stalemate. Draw.".to_string())
    } else if pos.is_insufficient_material() {
        Some("Insufficient material. Draw.".to_string())
    } else {
        None
    }
}
