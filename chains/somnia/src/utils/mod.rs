pub mod format;
pub mod recipient_pool;

pub use recipient_pool::RecipientPool;
