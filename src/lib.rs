#[macro_use]
extern crate diesel;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate rocket;

pub mod article;
pub mod category;
pub mod citation;
pub mod comment;
pub mod db;
pub mod types;
pub mod users;
mod utils;

use db::Pool;
use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::request::Request;
use rocket::{Build, Rocket};
use types::Failure;

#[catch(404)]
fn not_found(_req: &Request) -> Failure {
    Failure::new(Status::NotFound, "Page not found")
}

#[catch(400)]
fn bad_request(_req: &Request) -> Failure {
    Failure::new(Status::BadRequest, "Malformed request body.")
}

// Bodies are read as free-form JSON, so a 422 only comes from a path
// segment that does not parse as an id.
#[catch(422)]
fn unprocessable(_req: &Request) -> Failure {
    Failure::new(Status::NotFound, "Page not found")
}

#[catch(500)]
fn internal_error(_req: &Request) -> Failure {
    Failure::new(Status::InternalServerError, "Internal server error.")
}

#[catch(503)]
fn unavailable(_req: &Request) -> Failure {
    Failure::new(Status::ServiceUnavailable, "Service unavailable.")
}

#[get("/")]
fn welcome() -> &'static str {
    "Welcome to my news site! Feel free to add whatever articles and comments you'd like."
}

/// Builds the server around an already initialised pool.
pub fn rocket(pool: Pool) -> Rocket<Build> {
    rocket::build()
        .manage(pool)
        .attach(AdHoc::on_liftoff("Database pool", |rocket| {
            Box::pin(async move {
                if let Some(pool) = rocket.state::<Pool>() {
                    let state = pool.state();
                    log::info!(
                        "database pool ready: {} connections, {} idle",
                        state.connections, state.idle_connections
                    );
                }
            })
        }))
        .attach(AdHoc::on_shutdown("Close database pool", |rocket| {
            Box::pin(async move {
                if let Some(pool) = rocket.state::<Pool>() {
                    log::info!(
                        "closing database pool with {} connections",
                        pool.state().connections
                    );
                }
            })
        }))
        .mount(
            "/",
            routes![
                welcome,
                article::list,
                article::create,
                article::get,
                article::update,
                article::delete,
                article::follow,
                comment::list,
                comment::add,
                comment::update,
                comment::delete,
                category::assign,
                category::list,
                category::get,
                category::delete,
                citation::assign,
                citation::list,
                citation::get,
                citation::delete,
                users::list,
                users::register,
                users::get,
                users::delete,
            ],
        )
        .register(
            "/",
            catchers![
                not_found,
                bad_request,
                unprocessable,
                internal_error,
                unavailable
            ],
        )
}
