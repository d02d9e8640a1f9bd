pub mod filter;
pub mod locator;
pub mod record_type;
pub mod relation;
pub mod response;
pub mod selection;
pub mod snapshot;

/// Store-assigned primary key, unique within a record type
pub type RecordKey = i64;

pub use filter::{SearchFilter, SearchOperator, MAINLINE_FIELD};
pub use locator::{IdCandidate, IdValue, RecordLocator, Scalar};
pub use record_type::{NotValid, RecordType};
pub use relation::{ChildRelationSpec, TraversalResult};
pub use response::ResponseEnvelope;
pub use selection::{normalize_field_id, FieldSelection, ProjectionSpec};
pub use snapshot::{Line, RecordSnapshot};
