//! # campus-catalog — Course Catalog Domain
//!
//! Courses and categories: the records the marketplace lists, and the
//! rule for who may edit a published course. Prices are integers in
//! minor currency units; floats never appear in stored records or on
//! the wire.

pub mod category;
pub mod course;

pub use category::{slugify, Category};
pub use course::{can_edit, Course, CourseError};
