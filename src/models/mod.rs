pub mod branch;
pub mod paper;
pub mod user;

pub use branch::*;
pub use paper::*;
pub use user::*;
