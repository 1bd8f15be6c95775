pub mod driver;

pub use driver::{normalize_site_url, SessionDriver};
