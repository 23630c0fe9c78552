use std::{collections::HashSet, fmt::Display};

use serde::{Deserialize, Serialize};
use util::{
  error::{XWordError, XWordResult},
  grid::{Grid, Gridlike, MutGridlike},
  pos::{Diff, Pos},
};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
  Horizontal,
  Vertical,
}

impl Orientation {
  pub const ALL: [Orientation; 2] = [Orientation::Vertical, Orientation::Horizontal];

  pub const fn is_vertical(self) -> bool {
    matches!(self, Orientation::Vertical)
  }

  pub const fn from_vertical(vertical: bool) -> Self {
    if vertical {
      Orientation::Vertical
    } else {
      Orientation::Horizontal
    }
  }

  pub const fn step(self) -> Diff {
    match self {
      Orientation::Horizontal => Diff::DX,
      Orientation::Vertical => Diff::DY,
    }
  }

  pub const fn cross(self) -> Self {
    match self {
      Orientation::Horizontal => Orientation::Vertical,
      Orientation::Vertical => Orientation::Horizontal,
    }
  }
}

impl Display for Orientation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Orientation::Horizontal => write!(f, "across"),
      Orientation::Vertical => write!(f, "down"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardWord {
  pub word: String,
  pub orientation: Orientation,
  pub row: u32,
  pub col: u32,
}

impl BoardWord {
  pub fn len(&self) -> u32 {
    self.word.chars().count() as u32
  }

  pub fn is_empty(&self) -> bool {
    self.word.is_empty()
  }

  pub fn start(&self) -> Pos {
    Pos { x: self.col as i32, y: self.row as i32 }
  }

  pub fn letter_positions(&self) -> impl Iterator<Item = (char, Pos)> + '_ {
    let start = self.start();
    let step = self.orientation.step();
    self
      .word
      .chars()
      .enumerate()
      .map(move |(idx, letter)| (letter, start + step * idx as i32))
  }

  pub fn letter_index_at(&self, pos: Pos) -> Option<usize> {
    let diff = pos - self.start();
    let (along, across) = match self.orientation {
      Orientation::Horizontal => (diff.x, diff.y),
      Orientation::Vertical => (diff.y, diff.x),
    };
    (across == 0 && along >= 0 && (along as u32) < self.len()).then_some(along as usize)
  }
}

impl Display for BoardWord {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {} at row {} col {}", self.word, self.orientation, self.row, self.col)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
  rows: u32,
  cols: u32,
  words: Vec<BoardWord>,
}

impl Board {
  /// Builds a board from word placements in arbitrary (possibly negative)
  /// coordinates, shifting them so the bounding box starts at (0, 0).
  pub fn normalized(placements: impl IntoIterator<Item = (String, Orientation, Pos)>) -> Self {
    let placements: Vec<_> = placements.into_iter().collect();
    let bounds = placements.iter().fold(None, |bounds, (word, orientation, start)| {
      let len = word.chars().count() as i32;
      let end = *start + orientation.step() * (len - 1).max(0);
      let (min, max) = bounds.unwrap_or((*start, end));
      Some((
        Pos { x: min.x.min(start.x), y: min.y.min(start.y) },
        Pos { x: max.x.max(end.x), y: max.y.max(end.y) },
      ))
    });

    let Some((min, max)) = bounds else {
      return Self { rows: 0, cols: 0, words: vec![] };
    };

    let words = placements
      .into_iter()
      .map(|(word, orientation, start)| {
        let start = start - (min - Pos::zero());
        BoardWord { word, orientation, row: start.y as u32, col: start.x as u32 }
      })
      .collect();

    Self {
      rows: (max.y - min.y + 1) as u32,
      cols: (max.x - min.x + 1) as u32,
      words,
    }
  }

  pub fn from_parts(rows: u32, cols: u32, words: Vec<BoardWord>) -> XWordResult<Self> {
    let board = Self { rows, cols, words };
    board.verify()?;
    Ok(board)
  }

  pub fn rows(&self) -> u32 {
    self.rows
  }

  pub fn cols(&self) -> u32 {
    self.cols
  }

  pub fn words(&self) -> &[BoardWord] {
    &self.words
  }

  pub fn word(&self, word: &str) -> Option<&BoardWord> {
    self.words.iter().find(|board_word| board_word.word == word)
  }

  pub fn word_through(&self, pos: Pos, orientation: Orientation) -> Option<&BoardWord> {
    self.words.iter().find(|board_word| {
      board_word.orientation == orientation && board_word.letter_index_at(pos).is_some()
    })
  }

  pub fn letter_grid(&self) -> XWordResult<Grid<Option<char>>> {
    let mut grid = Grid::new(self.cols, self.rows);
    for board_word in &self.words {
      for (letter, pos) in board_word.letter_positions() {
        let tile = grid.get_mut(pos).ok_or_else(|| {
          XWordError::Internal(format!("Word {board_word} leaves the board at {pos}"))
        })?;
        match tile {
          Some(existing) if *existing != letter => {
            return Err(
              XWordError::Internal(format!(
                "Conflicting letters at {pos}: {letter} vs {existing}"
              ))
              .into(),
            );
          }
          _ => *tile = Some(letter),
        }
      }
    }
    Ok(grid)
  }

  /// Checks the layout invariants: every word is on the board, crossing
  /// words agree on their shared letter, parallel words never share a cell,
  /// and the layout touches row 0 and column 0.
  pub fn verify(&self) -> XWordResult {
    self.letter_grid()?;

    let mut covered = HashSet::new();
    for board_word in &self.words {
      for (_, pos) in board_word.letter_positions() {
        if !covered.insert((pos, board_word.orientation)) {
          return Err(
            XWordError::Internal(format!(
              "Two {} words overlap at {pos}",
              board_word.orientation
            ))
            .into(),
          );
        }
      }
    }

    if !self.words.is_empty()
      && (self.words.iter().all(|word| word.row > 0) || self.words.iter().all(|word| word.col > 0))
    {
      return Err(XWordError::Internal("Board is not normalized".to_owned()).into());
    }

    Ok(())
  }
}

impl Display for Board {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let grid = self.letter_grid().map_err(|_| std::fmt::Error)?;
    (0..grid.height()).try_fold((), |_, y| {
      grid
        .iter_row(y)
        .try_fold((), |_, tile| write!(f, "{}", tile.unwrap_or('.')))?;
      writeln!(f)
    })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;
  use util::{grid::Gridlike, pos::Pos};

  use super::{Board, BoardWord, Orientation};

  fn cat_art() -> Board {
    Board::normalized([
      ("CAT".to_owned(), Orientation::Horizontal, Pos { x: 0, y: 0 }),
      ("ART".to_owned(), Orientation::Vertical, Pos { x: 1, y: 0 }),
      ("TIE".to_owned(), Orientation::Horizontal, Pos { x: 1, y: 2 }),
    ])
  }

  #[gtest]
  fn test_normalize_shifts_to_origin() {
    let board = Board::normalized([
      ("CAT".to_owned(), Orientation::Horizontal, Pos { x: 3, y: 5 }),
      ("PET".to_owned(), Orientation::Vertical, Pos { x: 5, y: 3 }),
    ]);

    expect_eq!(board.rows(), 3);
    expect_eq!(board.cols(), 3);
    expect_eq!(
      board.words().to_vec(),
      vec![
        BoardWord { word: "CAT".to_owned(), orientation: Orientation::Horizontal, row: 2, col: 0 },
        BoardWord { word: "PET".to_owned(), orientation: Orientation::Vertical, row: 0, col: 2 },
      ]
    );
    expect_that!(board.verify(), ok(anything()));
  }

  #[gtest]
  fn test_normalize_empty() {
    let board = Board::normalized([]);
    expect_eq!(board.rows(), 0);
    expect_eq!(board.cols(), 0);
    expect_true!(board.words().is_empty());
  }

  #[gtest]
  fn test_letter_grid() {
    let board = cat_art();
    let grid = board.letter_grid().unwrap();
    expect_eq!(grid.width(), 4);
    expect_eq!(grid.height(), 3);
    expect_that!(grid.get(Pos { x: 1, y: 1 }).cloned().flatten(), some(eq('R')));
    expect_that!(grid.get(Pos { x: 0, y: 2 }).cloned().flatten(), none());
    expect_eq!(board.to_string(), "CAT.\n.R..\n.TIE\n");
  }

  #[gtest]
  fn test_word_through() {
    let board = cat_art();
    expect_that!(
      board
        .word_through(Pos { x: 1, y: 2 }, Orientation::Vertical)
        .map(|word| word.word.as_str()),
      some(eq("ART"))
    );
    expect_that!(
      board
        .word_through(Pos { x: 1, y: 2 }, Orientation::Horizontal)
        .map(|word| word.word.as_str()),
      some(eq("TIE"))
    );
    expect_that!(board.word_through(Pos { x: 0, y: 1 }, Orientation::Vertical), none());
  }

  #[gtest]
  fn test_verify_conflicting_letters() {
    let board = Board::from_parts(
      1,
      3,
      vec![
        BoardWord { word: "CAT".to_owned(), orientation: Orientation::Horizontal, row: 0, col: 0 },
        BoardWord { word: "COT".to_owned(), orientation: Orientation::Horizontal, row: 0, col: 0 },
      ],
    );
    expect_that!(board, err(anything()));
  }

  #[gtest]
  fn test_verify_parallel_overlap() {
    let board = Board::from_parts(
      1,
      5,
      vec![
        BoardWord { word: "CAT".to_owned(), orientation: Orientation::Horizontal, row: 0, col: 0 },
        BoardWord { word: "TAB".to_owned(), orientation: Orientation::Horizontal, row: 0, col: 2 },
      ],
    );
    expect_that!(board, err(anything()));
  }

  #[gtest]
  fn test_verify_out_of_bounds() {
    let board = Board::from_parts(
      2,
      2,
      vec![BoardWord {
        word: "CAT".to_owned(),
        orientation: Orientation::Horizontal,
        row: 0,
        col: 0,
      }],
    );
    expect_that!(board, err(anything()));
  }
}
