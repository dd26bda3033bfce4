pub mod branch_repository;
pub mod exam_type_repository;
pub mod paper_repository;
pub mod semester_repository;
pub mod user_repository;

pub use branch_repository::*;
pub use exam_type_repository::*;
pub use paper_repository::*;
pub use semester_repository::*;
pub use user_repository::*;
