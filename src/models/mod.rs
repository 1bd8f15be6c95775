pub mod loaders;
pub mod mapping;
pub mod product;

pub use loaders::{load_products, read_mapping, write_template};
pub use mapping::TranslationMap;
pub use product::{ProductRecord, ProductRow};
