use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self as diesel_r2d2, ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::result::Error as DieselError;
use dotenv::dotenv;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest};
use rocket::{Request, State};
use std::env;
use std::ops::{Deref, DerefMut};
use crate::types::ApiError;

pub mod schema;

// An alias to the type for a pool of Diesel SQLite connections.
pub type Pool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub struct DbConnection(pub PooledConnection<ConnectionManager<SqliteConnection>>);

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        R2D2(r2d2::Error);
        Diesel(DieselError);
    }
}

static SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL,
    article_id INTEGER NOT NULL REFERENCES articles (id)
);
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS citations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS articles_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles (id),
    category_id INTEGER NOT NULL REFERENCES categories (id)
);
CREATE TABLE IF NOT EXISTS articles_citations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles (id),
    citation_id INTEGER NOT NULL REFERENCES citations (id)
);
CREATE TABLE IF NOT EXISTS articles_users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles (id),
    user_id INTEGER NOT NULL REFERENCES users (id)
);
";

/// Turns off SQLite's foreign key enforcement on every pooled connection.
/// Link rows may outlive the category, citation or user they point at.
#[derive(Debug)]
struct ForeignKeysOff;

impl CustomizeConnection<SqliteConnection, diesel_r2d2::Error> for ForeignKeysOff {
    fn on_acquire(
        &self,
        connection: &mut SqliteConnection,
    ) -> ::std::result::Result<(), diesel_r2d2::Error> {
        connection
            .batch_execute("PRAGMA foreign_keys = OFF;")
            .map_err(diesel_r2d2::Error::QueryError)
    }
}

/// Attempts to retrieve a single connection from the managed database pool. If
/// no pool is currently managed, fails with an `InternalServerError` status. If
/// no connections are available, fails with a `ServiceUnavailable` status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for DbConnection {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<DbConnection, ()> {
        let pool = match request.guard::<&State<Pool>>().await {
            Outcome::Success(pool) => pool,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };
        match pool.get() {
            Ok(conn) => Outcome::Success(DbConnection(conn)),
            Err(e) => {
                log::error!("no database connection available: {}", e);
                Outcome::Error((Status::ServiceUnavailable, ()))
            }
        }
    }
}

// For the convenience of using an &mut DbConnection as an &mut SqliteConnection.
impl Deref for DbConnection {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Opens the pool named by `DATABASE_URL` and makes sure every table exists.
pub fn init_pool() -> Result<Pool> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")?;
    let manager = ConnectionManager::<SqliteConnection>::new(database_url.as_str());
    let pool = Pool::builder()
        .connection_customizer(Box::new(ForeignKeysOff))
        .build(manager)?;
    create_schema(&mut *pool.get()?)?;
    log::info!("opened database {}", database_url);
    Ok(pool)
}

/// A single-connection pool over a private in-memory database.
pub fn memory_pool() -> Result<Pool> {
    let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
    let pool = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_customizer(Box::new(ForeignKeysOff))
        .build(manager)?;
    create_schema(&mut *pool.get()?)?;
    Ok(pool)
}

pub fn create_schema(connection: &mut SqliteConnection) -> Result<()> {
    connection.batch_execute(SCHEMA)?;
    Ok(())
}

/// Loads an entity by primary key, turning absence into the entity's
/// not-found error.
pub trait TryLoadById
where
    Self: Sized,
{
    const NOT_FOUND: &'static str;

    fn load_by_id(id: i32, connection: &mut SqliteConnection) -> QueryResult<Option<Self>>;

    fn try_load_by_id(
        id: i32,
        connection: &mut SqliteConnection,
    ) -> ::std::result::Result<Self, ApiError> {
        match Self::load_by_id(id, connection)? {
            Some(entity) => Ok(entity),
            None => {
                log::warn!("lookup of id {} failed: {}", id, Self::NOT_FOUND);
                Err(ApiError::NotFound(Self::NOT_FOUND))
            }
        }
    }
}
