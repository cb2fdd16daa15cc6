//! Plain ASCII board rendering

use shakmaty::{Chess, File, Position, Rank, Square};

/// Board with White at the bottom. `marks` are drawn as `*` when empty.
pub fn render(pos: &Chess, marks: &[Square]) -> String {
    let board = pos.board();
    let mut out = String::from("  +-----------------+\n");
    for rank in (0..8u32).rev() {
        out.push_str(&format!("{} |", rank + 1));
        for file in 0..8u32 {
            let sq = Square::from_coords(File::new(file), Rank::new(rank));
            let ch = match board.piece_at(sq) {
                Some(piece) => piece.char(),
                None if marks.contains(&sq) => '*',
                None => '.',
            };
            out.push(' ');
            out.push(ch);
        }
        out.push_str(" |\n");
    }
    out.push_str("  +-----------------+\n");
    out.push_str("    a b c d e f g h");
    out
}

/// From and to squares of a long-form move, for highlighting
pub fn move_squares(uci: &str) -> Vec<Square> {
    [uci.get(0..2), uci.get(2..4)]
        .into_iter()
        .flatten()
        .filter_map(|name| name.parse().ok())
        .collect()
}

pub fn squares(names: &[String]) -> Vec<Square> {
    names.iter().filter_map(|name| name.parse().ok()).collect()
}
