//! # Repository Layer
//!
//! Repositories wrap SeaORM operations. Everything except the chapter
//! catalog takes an explicit [`OrganizationId`](crate::tracker::OrganizationId).

pub mod assignment;
pub mod chapter;
pub mod organization;
pub mod reader;
pub mod snapshot;

pub use assignment::{AssignmentRepository, NewAssignment};
pub use chapter::ChapterRepository;
pub use organization::OrganizationRepository;
pub use reader::{NewReader, ReaderRepository};
pub use snapshot::load_snapshot;
