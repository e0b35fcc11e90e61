use crate::article::Article;
use crate::db::schema::comments;
use crate::db::{DbConnection, TryLoadById};
use crate::types::{require_str, ApiError, ApiResult, Success};
use diesel::insert_into;
use diesel::prelude::*;
use diesel::{delete as diesel_delete, update as diesel_update};
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize,
)]
#[diesel(belongs_to(Article))]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: i32,
    pub description: String,
    pub article_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment<'a> {
    pub description: &'a str,
    pub article_id: i32,
}

#[derive(Debug, Serialize)]
pub struct CommentsContainer<T> {
    pub comments: T,
}

impl TryLoadById for Comment {
    const NOT_FOUND: &'static str = "Comment not found!";

    fn load_by_id(id: i32, connection: &mut SqliteConnection) -> QueryResult<Option<Comment>> {
        comments::table
            .find(id)
            .select(Comment::as_select())
            .first(connection)
            .optional()
    }
}

impl Comment {
    pub fn load_all(connection: &mut SqliteConnection) -> QueryResult<Vec<Comment>> {
        comments::table
            .order(comments::id)
            .select(Comment::as_select())
            .load(connection)
    }
}

// The article only has to exist; the listing is not narrowed to it.
#[get("/articles/<article_id>/comments")]
pub fn list(
    article_id: i32,
    mut connection: DbConnection,
) -> ApiResult<CommentsContainer<Vec<Comment>>> {
    let conn = &mut *connection;
    Article::try_load_by_id(article_id, conn)?;
    Ok(Success::ok(CommentsContainer {
        comments: Comment::load_all(conn)?,
    }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub fn add(
    article_id: i32,
    mut connection: DbConnection,
    details: Json<Value>,
) -> ApiResult<Comment> {
    let conn = &mut *connection;
    let article = Article::try_load_by_id(article_id, conn)?;
    let description = require_str(&details, "description")?;
    let comment = insert_into(comments::table)
        .values(&NewComment {
            description: &description,
            article_id: article.id,
        })
        .returning(Comment::as_returning())
        .get_result(conn)?;
    log::info!("created comment {} on article {}", comment.id, article.id);
    Ok(Success::ok(comment))
}

/// Both lookups run before either is checked; the comment is found by id
/// alone, whichever article it belongs to.
fn load_pair(
    article_id: i32,
    comment_id: i32,
    connection: &mut SqliteConnection,
) -> Result<Comment, ApiError> {
    let article = Article::load_by_id(article_id, connection)?;
    let comment = Comment::load_by_id(comment_id, connection)?;
    if article.is_none() {
        return Err(ApiError::NotFound(Article::NOT_FOUND));
    }
    comment.ok_or(ApiError::NotFound(Comment::NOT_FOUND))
}

#[post("/articles/<article_id>/comments/<comment_id>", data = "<details>")]
pub fn update(
    article_id: i32,
    comment_id: i32,
    mut connection: DbConnection,
    details: Json<Value>,
) -> ApiResult<Comment> {
    let conn = &mut *connection;
    let comment = load_pair(article_id, comment_id, conn)?;
    let description = require_str(&details, "description")?;
    let comment = diesel_update(&comment)
        .set(comments::description.eq(&description))
        .returning(Comment::as_returning())
        .get_result(conn)?;
    Ok(Success::ok(comment))
}

#[delete("/articles/<article_id>/comments/<comment_id>")]
pub fn delete(
    article_id: i32,
    comment_id: i32,
    mut connection: DbConnection,
) -> ApiResult<Comment> {
    let conn = &mut *connection;
    let comment = load_pair(article_id, comment_id, conn)?;
    diesel_delete(&comment).execute(conn)?;
    log::info!("deleted comment {}", comment.id);
    Ok(Success::ok(comment))
}
