pub mod excel_loader;
pub mod mapping_loader;

pub use excel_loader::load_products;
pub use mapping_loader::{read_mapping, write_template};
