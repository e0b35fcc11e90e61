use crate::article::{self, Article, ArticleView};
use crate::db::schema::{articles, articles_users, users};
use crate::db::TryLoadById;
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    #[serde(rename = "following articles")]
    pub following: Vec<ArticleView>,
}

impl TryLoadById for User {
    const NOT_FOUND: &'static str = "User not found!";

    fn load_by_id(id: i32, connection: &mut SqliteConnection) -> QueryResult<Option<User>> {
        users::table
            .find(id)
            .select(User::as_select())
            .first(connection)
            .optional()
    }
}

impl User {
    pub fn load_all(connection: &mut SqliteConnection) -> QueryResult<Vec<User>> {
        users::table
            .order(users::id)
            .select(User::as_select())
            .load(connection)
    }

    /// Usernames are not unique; the oldest match wins.
    pub fn load_by_name(
        name: &str,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::username.eq(name))
            .order(users::id)
            .select(User::as_select())
            .first(connection)
            .optional()
    }

    pub fn following(&self, connection: &mut SqliteConnection) -> QueryResult<Vec<Article>> {
        articles_users::table
            .inner_join(articles::table)
            .filter(articles_users::user_id.eq(self.id))
            .order(articles_users::id)
            .select(Article::as_select())
            .load(connection)
    }

    pub fn view(self, connection: &mut SqliteConnection) -> QueryResult<UserView> {
        let followed = self.following(connection)?;
        Ok(UserView {
            id: self.id,
            username: self.username,
            following: article::views(followed, connection)?,
        })
    }
}
