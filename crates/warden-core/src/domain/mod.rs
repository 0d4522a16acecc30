//! Domain model (categories, handle ids, handle lists).

pub mod category;
pub mod handle_lists;
pub mod ids;

pub use self::category::Category;
pub use self::handle_lists::HandleLists;
pub use self::ids::{HandleId, HandleIdAllocator};
