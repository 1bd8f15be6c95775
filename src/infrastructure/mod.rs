pub mod dom_driver;

pub use dom_driver::{js_string, DomDriver};
