//! Infrastructure layer - option stores and form tokens

pub mod nonce;
pub mod storage;

pub use nonce::HmacNonceProvider;
pub use storage::memory::InMemoryOptionStore;
pub use storage::repositories::SeaOrmOptionStore;
