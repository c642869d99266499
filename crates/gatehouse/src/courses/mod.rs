//! Course records behind the CAPTCHA gate.

mod store;

pub use store::{CourseStore, MemoryCourseStore, RedisCourseStore};
