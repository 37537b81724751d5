pub mod submission;

pub use submission::{Field, Submission};
