pub mod prompt;

pub use prompt::{confirm, prompt_line};
