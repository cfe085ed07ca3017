pub mod aktien;
pub mod symbol;
pub mod paging;
pub mod response;

pub use aktien::*;
pub use symbol::*;
pub use paging::*;
pub use response::*;
