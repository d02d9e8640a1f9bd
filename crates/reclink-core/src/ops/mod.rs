pub mod projection;
pub mod resolve;

pub use projection::{is_subrecord_field, load_and_project, project, SUBRECORD_FIELDS};
pub use resolve::{resolve, Resolution};
