use std::{
  collections::HashSet,
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use util::error::{XWordError, XWordResult};

use crate::board::{Board, BoardWord, Orientation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BoardType {
  Grid,
  List,
}

impl From<BoardType> for u8 {
  fn from(value: BoardType) -> Self {
    match value {
      BoardType::Grid => 0,
      BoardType::List => 1,
    }
  }
}

impl TryFrom<u8> for BoardType {
  type Error = XWordError;

  fn try_from(value: u8) -> Result<Self, XWordError> {
    match value {
      0 => Ok(BoardType::Grid),
      1 => Ok(BoardType::List),
      _ => Err(XWordError::Parse(format!("Unknown board type {value}"))),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelWord {
  pub word: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub vertical: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub row_index: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub col_index: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub coin_indices: Option<Vec<u32>>,
  #[serde(default)]
  pub award_coins: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelFile {
  #[serde(rename = "type")]
  pub board_type: BoardType,
  pub letters: String,
  pub words: Vec<LevelWord>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub row_count: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub col_count: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
}

#[derive(Clone, Debug)]
pub enum LevelFileName {
  /// `<prefix><number>.json`, moving on to the next free number when the
  /// file exists and overwriting is off.
  Batch { prefix: String, number: u32 },
  Single { name: Option<String> },
}

fn sha256_hex(bytes: &[u8]) -> String {
  Sha256::digest(bytes)
    .iter()
    .map(|byte| format!("{byte:02x}"))
    .collect()
}

/// Letter indices of `board_word` that carry a coin: every letter of a
/// starred word, otherwise the letters shared with a starred crossing word.
fn coin_indices(board: &Board, board_word: &BoardWord, starred: &HashSet<String>) -> Vec<u32> {
  let is_starred = starred.contains(&board_word.word);
  board_word
    .letter_positions()
    .enumerate()
    .filter(|&(_, (_, pos))| {
      is_starred
        || board
          .word_through(pos, board_word.orientation.cross())
          .is_some_and(|crossing| starred.contains(&crossing.word))
    })
    .map(|(idx, _)| idx as u32)
    .collect()
}

impl LevelFile {
  pub fn for_board(letters: &str, board: &Board, starred: &HashSet<String>) -> XWordResult<Self> {
    let words = board
      .words()
      .iter()
      .map(|board_word| LevelWord {
        word: board_word.word.clone(),
        vertical: Some(board_word.orientation.is_vertical()),
        row_index: Some(board_word.row),
        col_index: Some(board_word.col),
        coin_indices: Some(coin_indices(board, board_word, starred)),
        award_coins: starred.contains(&board_word.word),
      })
      .collect();

    Self {
      board_type: BoardType::Grid,
      letters: letters.to_owned(),
      words,
      row_count: Some(board.rows()),
      col_count: Some(board.cols()),
      id: None,
    }
    .with_id()
  }

  pub fn for_word_list(letters: &str, words: &[String], starred: &HashSet<String>) -> XWordResult<Self> {
    let words = words
      .iter()
      .map(|word| LevelWord {
        word: word.clone(),
        vertical: None,
        row_index: None,
        col_index: None,
        coin_indices: None,
        award_coins: starred.contains(word),
      })
      .collect();

    Self {
      board_type: BoardType::List,
      letters: letters.to_owned(),
      words,
      row_count: None,
      col_count: None,
      id: None,
    }
    .with_id()
  }

  /// The level id is the SHA-256 of the level JSON serialized without an id.
  fn with_id(mut self) -> XWordResult<Self> {
    self.id = None;
    let id = sha256_hex(serde_json::to_string(&self)?.as_bytes());
    self.id = Some(id);
    Ok(self)
  }

  pub fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  pub fn to_json(&self) -> XWordResult<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn parse(contents: &str) -> XWordResult<Self> {
    let level: Self = serde_json::from_str(contents)?;
    if level.letters.is_empty() || level.words.is_empty() {
      return Err(
        XWordError::Parse("Level needs at least one letter and one word".to_owned()).into(),
      );
    }
    Ok(level)
  }

  pub fn word_list(&self) -> impl Iterator<Item = &str> {
    self.words.iter().map(|level_word| level_word.word.as_str())
  }

  pub fn board(&self) -> XWordResult<Option<Board>> {
    if self.board_type == BoardType::List {
      return Ok(None);
    }

    let missing = |field: &str, word: &str| {
      XWordError::Parse(format!("Grid level word {word} is missing {field}"))
    };
    let words = self
      .words
      .iter()
      .map(|level_word| {
        Ok(BoardWord {
          word: level_word.word.clone(),
          orientation: Orientation::from_vertical(
            level_word
              .vertical
              .ok_or_else(|| missing("vertical", &level_word.word))?,
          ),
          row: level_word
            .row_index
            .ok_or_else(|| missing("rowIndex", &level_word.word))?,
          col: level_word
            .col_index
            .ok_or_else(|| missing("colIndex", &level_word.word))?,
        })
      })
      .collect::<XWordResult<Vec<_>>>()?;

    let rows = self
      .row_count
      .ok_or_else(|| XWordError::Parse("Grid level is missing rowCount".to_owned()))?;
    let cols = self
      .col_count
      .ok_or_else(|| XWordError::Parse("Grid level is missing colCount".to_owned()))?;
    Board::from_parts(rows, cols, words).map(Some)
  }

  /// Writes the level into `folder`, creating it if needed. Returns the path
  /// written, or `None` if a single level file already exists and
  /// `overwrite` is off.
  pub fn export(
    &self,
    folder: &Path,
    name: &LevelFileName,
    overwrite: bool,
  ) -> XWordResult<Option<PathBuf>> {
    fs::create_dir_all(folder)?;

    let path = match name {
      LevelFileName::Batch { prefix, number } => {
        let path = folder.join(format!("{prefix}{number}.json"));
        if path.exists() && !overwrite {
          Self::unique_batch_path(folder, prefix, *number)
        } else {
          path
        }
      }
      LevelFileName::Single { name } => {
        let stem = match name.as_deref() {
          Some(name) if !name.is_empty() => name.to_owned(),
          _ => self
            .id()
            .ok_or_else(|| XWordError::Export("Level has no id".to_owned()))?
            .to_owned(),
        };
        let path = folder.join(format!("{stem}.json"));
        if path.exists() && !overwrite {
          return Ok(None);
        }
        path
      }
    };

    fs::write(&path, self.to_json()?)?;
    Ok(Some(path))
  }

  fn unique_batch_path(folder: &Path, prefix: &str, start: u32) -> PathBuf {
    (start..)
      .map(|number| folder.join(format!("{prefix}{number}.json")))
      .find(|path| !path.exists())
      .unwrap_or_else(|| folder.join(format!("{prefix}{start}.json")))
  }
}

pub fn load_level_files(folder: &Path) -> XWordResult<Vec<(PathBuf, XWordResult<LevelFile>)>> {
  let mut levels = vec![];
  let mut pending = vec![folder.to_path_buf()];
  while let Some(dir) = pending.pop() {
    for entry in fs::read_dir(&dir)? {
      let path = entry?.path();
      if path.is_dir() {
        pending.push(path);
      } else if path.extension().is_some_and(|ext| ext == "json") {
        let level = fs::read_to_string(&path)
          .map_err(Into::into)
          .and_then(|contents| LevelFile::parse(&contents));
        levels.push((path, level));
      }
    }
  }
  levels.sort_by(|(a, _), (b, _)| a.cmp(b));
  Ok(levels)
}
