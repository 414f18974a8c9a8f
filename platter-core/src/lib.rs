use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::PgConnection;

pub mod auth;
pub mod catalog;
pub mod error;
pub mod models;
pub mod orders;
pub mod restaurants;
pub mod schema;
pub mod users;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .expect("Failed to create database connection pool")
}
