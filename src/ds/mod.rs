pub mod bitmap;
pub mod index_list;

pub use bitmap::Bitmap;
pub use index_list::{IndexList, IndexListIter, UNLINKED};
