use crate::db::schema::users;
use crate::db::{DbConnection, TryLoadById};
use crate::types::{require_str, ApiResult, Success};
use diesel::prelude::*;
use diesel::{delete as diesel_delete, insert_into};
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::Value;

pub mod models;

use self::models::{NewUser, User, UserView};

#[derive(Debug, Serialize)]
pub struct UsersContainer<T> {
    pub users: T,
}

#[get("/users")]
pub fn list(mut connection: DbConnection) -> ApiResult<UsersContainer<Vec<UserView>>> {
    let conn = &mut *connection;
    let views = User::load_all(conn)?
        .into_iter()
        .map(|user| user.view(conn))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(Success::ok(UsersContainer { users: views }))
}

#[post("/users", data = "<registration>")]
pub fn register(
    mut connection: DbConnection,
    registration: Json<Value>,
) -> ApiResult<UserView> {
    let conn = &mut *connection;
    let username = require_str(&registration, "username")?;
    let user = insert_into(users::table)
        .values(&NewUser {
            username: &username,
        })
        .returning(User::as_returning())
        .get_result(conn)?;
    log::info!("registered user {}", user.id);
    Ok(Success::created(user.view(conn)?))
}

#[get("/users/<id>")]
pub fn get(id: i32, mut connection: DbConnection) -> ApiResult<UserView> {
    let conn = &mut *connection;
    let user = User::try_load_by_id(id, conn)?;
    Ok(Success::ok(user.view(conn)?))
}

#[delete("/users/<id>")]
pub fn delete(id: i32, mut connection: DbConnection) -> ApiResult<UserView> {
    let conn = &mut *connection;
    let user = User::try_load_by_id(id, conn)?;
    let view = user.clone().view(conn)?;
    diesel_delete(&user).execute(conn)?;
    log::info!("deleted user {}", id);
    Ok(Success::ok(view))
}
