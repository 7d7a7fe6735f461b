pub mod post;

pub use post::{BlogDraft, REQUIRED_FIELDS};
