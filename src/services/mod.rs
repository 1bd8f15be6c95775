pub mod field_setter;
pub mod navigator;
pub mod product_form;
pub mod report_writer;
pub mod taxonomy;

pub use field_setter::{FieldSetter, FieldTarget, Locator, SetOutcome};
pub use navigator::{NavOutcome, Navigator, PageTarget};
pub use product_form::{ProductForm, PublishSignal, SubmitOutcome, WpProductForm};
pub use report_writer::ReportWriter;
pub use taxonomy::{
    resolution_plan, ChecklistEntry, ResolutionPlan, ResolveOutcome, TaxonomyResolver,
    TaxonomyTarget,
};
