// Auth module - where the bearer token comes from
mod token_store;

pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
