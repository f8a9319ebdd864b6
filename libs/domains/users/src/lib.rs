//! Users Domain
//!
//! Record management for a single entity: users, stored in MongoDB.
//!
//! # Features
//!
//! - Create, update, soft delete and point lookup
//! - Filtered, paginated listing (`POST /filter`)
//! - Password hashing with Argon2, never echoed back
//! - Unique email and nickname, enforced by the store
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, run through the request pipeline
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Password hashing, pagination envelope
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, requests, filter, validation
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{MongoUserRepository, UserService, handlers};
//!
//! # async fn example(db: mongodb::Database) {
//! let repository = MongoUserRepository::new(&db);
//! let service = UserService::new(repository);
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod password;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{CONFLICT_MESSAGE, NOT_FOUND_MESSAGE, UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    ChangePassword, CreateUser, DEFAULT_LIMIT, FilterUsers, MAX_LIMIT, Meta, NewUser, Pagination,
    UpdateUser, User, UserFilter, UserId, UserPatch, UserStatus,
};
pub use mongodb::MongoUserRepository;
pub use password::{MAX_PASSWORD_BYTES, PasswordError};
pub use repository::UserRepository;
pub use service::UserService;
