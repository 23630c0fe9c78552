pub mod board;
pub mod level;
