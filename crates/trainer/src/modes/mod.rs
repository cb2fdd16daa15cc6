//! Interactive shell modes

pub mod endless;
pub mod play;
pub mod solve;

/// How a single puzzle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Solved,
    /// Finished after the full solution was revealed
    Assisted,
    /// Solution data could not be played; nothing to count
    Broken,
    Quit,
}
