//! Solving one puzzle at the prompt

use std::io::{self, BufRead, Write};

use puzzle_core::input::{Command, Input};
use puzzle_core::session::{Advance, SquareInfo};
use puzzle_core::{PreparedPuzzle, Standard, Step, StepError};

use super::Outcome;
use crate::board;
use crate::console::Console;

const HELP: &str = "Commands:
  hint      show the next solution move
  solution  show the full solution
  quit      return to the menu
Type a square (e.g. e4) to see the moves of the piece on it.";

pub fn solve_puzzle<I: BufRead, O: Write>(
    console: &mut Console<I, O>,
    puzzle: &PreparedPuzzle<Standard>,
) -> io::Result<Outcome> {
    console.say(format!("\nPuzzle #{}", puzzle.id))?;
    console.say(format!("Rating: {}", puzzle.rating))?;
    if !puzzle.themes.is_empty() {
        console.say(format!("Themes: {}", puzzle.themes.join(", ")))?;
    }

    let mut session = puzzle.session();
    if session.is_complete() {
        console.say("This puzzle has no solution moves. Skipping it.")?;
        return Ok(Outcome::Broken);
    }

    let mut revealed = false;
    let mut highlight = puzzle.last_move().map(|m| (m.uci.clone(), m.san.clone()));

    loop {
        let marks = highlight.as_ref().map(|(uci, _)| board::move_squares(uci)).unwrap_or_default();
        console.say(board::render(session.position(), &marks))?;
        if let Some((_, san)) = &highlight {
            console.say(format!("Last move: {san}"))?;
        }
        console.say(format!("{} to play and win!", session.turn()))?;

        let Some(line) = console.prompt("Your move: ")? else {
            return Ok(Outcome::Quit);
        };

        let text = match Input::parse(&line) {
            Input::Empty => continue,
            Input::Command(Command::Quit | Command::Menu) => return Ok(Outcome::Quit),
            Input::Command(Command::Help) => {
                console.say(HELP)?;
                continue;
            }
            Input::Command(Command::Hint) => {
                if let Some(hint) = session.hint() {
                    console.say(format!("Hint: {hint}"))?;
                }
                continue;
            }
            Input::Command(Command::Solution) => {
                console.say(format!("Solution: {}", session.reveal_solution()))?;
                revealed = true;
                continue;
            }
            Input::Command(Command::Undo | Command::Moves | Command::Best | Command::Eval) => {
                console.say("Not available while solving a puzzle. Type 'help' for commands.")?;
                continue;
            }
            Input::Move(text) => text,
        };

        match session.submit(&text) {
            Step::Correct(advance) => {
                console.say(format!("Correct! {}", describe_advance(&advance)))?;
                highlight = Some(last_played(&advance));
            }
            Step::Complete(advance) => {
                let (uci, _) = last_played(&advance);
                console.say(board::render(session.position(), &board::move_squares(&uci)))?;
                console.say(format!("Puzzle solved! {}", describe_advance(&advance)))?;
                return Ok(if revealed { Outcome::Assisted } else { Outcome::Solved });
            }
            Step::Incorrect { .. } => {
                console.say("Incorrect. Try again!")?;
                highlight = None;
            }
            Step::Square(info) => show_square(console, session.position(), &info)?,
            Step::Error(StepError::Unparseable(text)) => {
                console.say(format!("Invalid move: {text}"))?;
            }
            Step::Error(StepError::BrokenSolution(entry)) => {
                console.say(format!("This puzzle's solution cannot be played ({entry}). Skipping it."))?;
                return Ok(Outcome::Broken);
            }
            Step::Error(StepError::Finished) => return Ok(Outcome::Quit),
        }
    }
}

fn last_played(advance: &Advance) -> (String, String) {
    let mv = advance.reply.as_ref().unwrap_or(&advance.solver_move);
    (mv.uci.clone(), mv.san.clone())
}

fn describe_advance(advance: &Advance) -> String {
    match &advance.reply {
        Some(reply) => format!("You played {}, opponent replied {}.", advance.solver_move.san, reply.san),
        None => format!("You played {}.", advance.solver_move.san),
    }
}

fn show_square<I: BufRead, O: Write>(
    console: &mut Console<I, O>,
    position: &shakmaty::Chess,
    info: &SquareInfo,
) -> io::Result<()> {
    console.say(board::render(position, &board::squares(&info.destinations)))?;
    if info.moves.is_empty() {
        console.say(format!("No legal moves from {}", info.square))
    } else {
        console.say(format!("Moves from {}: {}", info.square, info.moves.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use puzzle_core::PuzzlePayload;

    use super::*;

    fn puzzle(solution: &[&str]) -> PreparedPuzzle<Standard> {
        let mut payload = PuzzlePayload::default();
        payload.game.pgn = "d4 d5 c4 e5 Nf3 c6 cxd5".into();
        payload.puzzle.id = "test1".into();
        payload.puzzle.initial_ply = 7;
        payload.puzzle.solution = solution.iter().map(|s| s.to_string()).collect();
        PreparedPuzzle::from_payload(Standard, payload)
    }

    fn run(puzzle: &PreparedPuzzle<Standard>, input: &str) -> (Outcome, String) {
        let mut console = Console::new(input.as_bytes(), Vec::new());
        let outcome = solve_puzzle(&mut console, puzzle).unwrap();
        (outcome, String::from_utf8(console.output().clone()).unwrap())
    }

    #[test]
    fn test_solve_with_mistake() {
        let puzzle = puzzle(&["e5d4", "f3d4", "c6d5"]);
        let (outcome, out) = run(&puzzle, "Qa5+\nexd4\n\ne5\ncxd5\n");
        assert_eq!(outcome, Outcome::Solved);
        assert!(out.contains("Last move: cxd5"));
        assert!(out.contains("Black to play and win!"));
        assert!(out.contains("Incorrect. Try again!"));
        assert!(out.contains("opponent replied Nxd4"));
        assert!(out.contains("Puzzle solved!"));
    }

    #[test]
    fn test_commands() {
        let puzzle = puzzle(&["e5d4", "f3d4", "c6d5"]);
        let (outcome, out) = run(&puzzle, "hint\nsolution\nzz\ne5\nquit\n");
        assert_eq!(outcome, Outcome::Quit);
        assert!(out.contains("Hint: exd4"));
        assert!(out.contains("Solution: 4... exd4 5. Nxd4 cxd5"));
        assert!(out.contains("Invalid move: zz"));
        assert!(out.contains("Moves from e5: "));
    }

    #[test]
    fn test_empty_solution_is_broken() {
        let (outcome, out) = run(&puzzle(&[]), "exd4\n");
        assert_eq!(outcome, Outcome::Broken);
        assert!(out.contains("no solution moves"));
    }

    #[test]
    fn test_revealed_solution_is_assisted() {
        let puzzle = puzzle(&["e5d4", "f3d4", "c6d5"]);
        let (outcome, _) = run(&puzzle, "solution\nexd4\ncxd5\n");
        assert_eq!(outcome, Outcome::Assisted);
    }

    #[test]
    fn test_end_of_input_quits() {
        let (outcome, _) = run(&puzzle(&["e5d4", "f3d4", "c6d5"]), "");
        assert_eq!(outcome, Outcome::Quit);
    }

    #[test]
    fn test_broken_reply_skips_puzzle() {
        let (outcome, out) = run(&puzzle(&["e5d4", "a1a8"]), "exd4\n");
        assert_eq!(outcome, Outcome::Broken);
        assert!(out.contains("(a1a8)"));
    }
}
