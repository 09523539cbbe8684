//! Client-side session management: persisted bearer/refresh tokens, the cached
//! user, and the auth endpoints that create, refresh and destroy them.

pub mod repository;
pub mod store;
pub mod types;

pub use repository::{FileRepository, MemoryRepository, SessionRepository, StorageError};
pub use store::SessionStore;
pub use types::{Session, User};
