pub mod finder;
pub mod reference;
pub mod storage;

pub use finder::*;
pub use reference::*;
pub use storage::*;
