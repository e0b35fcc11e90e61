use crate::category::Category;
use crate::citation::Citation;
use crate::comment::Comment;
use crate::db::schema::{
    articles, articles_categories, articles_citations, articles_users, categories, citations,
    comments, users,
};
use crate::db::{DbConnection, TryLoadById};
use crate::types::{require_str, ApiError, ApiResult, Success};
use crate::users::models::User;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::{delete as diesel_delete, insert_into, update as diesel_update};
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = articles)]
pub struct Article {
    pub id: i32,
    pub description: String,
}

#[derive(Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticle<'a> {
    pub description: &'a str,
}

/// Shallow form used when an article is embedded elsewhere: scalars plus comments.
#[derive(Debug, PartialEq, Serialize)]
pub struct ArticleSummary {
    pub id: i32,
    pub description: String,
    pub comments: Vec<Comment>,
}

/// Full form. Related categories, citations and followers are always shallow,
/// so an article view never nests another article.
#[derive(Debug, PartialEq, Serialize)]
pub struct ArticleView {
    pub id: i32,
    pub description: String,
    pub comments: Vec<Comment>,
    pub categories: Vec<Category>,
    pub citations: Vec<Citation>,
    pub followers: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct ArticlesContainer<T> {
    pub articles: T,
}

impl TryLoadById for Article {
    const NOT_FOUND: &'static str = "Article not found!";

    fn load_by_id(id: i32, connection: &mut SqliteConnection) -> QueryResult<Option<Article>> {
        articles::table
            .find(id)
            .select(Article::as_select())
            .first(connection)
            .optional()
    }
}

impl Article {
    pub fn load_all(connection: &mut SqliteConnection) -> QueryResult<Vec<Article>> {
        articles::table
            .order(articles::id)
            .select(Article::as_select())
            .load(connection)
    }

    pub fn load_by_description(
        description_: &str,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Option<Article>> {
        articles::table
            .filter(articles::description.eq(description_))
            .select(Article::as_select())
            .first(connection)
            .optional()
    }

    pub fn comments(&self, connection: &mut SqliteConnection) -> QueryResult<Vec<Comment>> {
        Comment::belonging_to(self)
            .order(comments::id)
            .select(Comment::as_select())
            .load(connection)
    }

    pub fn categories(&self, connection: &mut SqliteConnection) -> QueryResult<Vec<Category>> {
        articles_categories::table
            .inner_join(categories::table)
            .filter(articles_categories::article_id.eq(self.id))
            .order(articles_categories::id)
            .select(Category::as_select())
            .load(connection)
    }

    pub fn citations(&self, connection: &mut SqliteConnection) -> QueryResult<Vec<Citation>> {
        articles_citations::table
            .inner_join(citations::table)
            .filter(articles_citations::article_id.eq(self.id))
            .order(articles_citations::id)
            .select(Citation::as_select())
            .load(connection)
    }

    pub fn followers(&self, connection: &mut SqliteConnection) -> QueryResult<Vec<User>> {
        articles_users::table
            .inner_join(users::table)
            .filter(articles_users::article_id.eq(self.id))
            .order(articles_users::id)
            .select(User::as_select())
            .load(connection)
    }

    // Association rows are appended unconditionally, so the same pair may be
    // linked more than once.
    pub fn add_category(
        &self,
        category: &Category,
        connection: &mut SqliteConnection,
    ) -> QueryResult<usize> {
        insert_into(articles_categories::table)
            .values((
                articles_categories::article_id.eq(self.id),
                articles_categories::category_id.eq(category.id),
            ))
            .execute(connection)
    }

    pub fn add_citation(
        &self,
        citation: &Citation,
        connection: &mut SqliteConnection,
    ) -> QueryResult<usize> {
        insert_into(articles_citations::table)
            .values((
                articles_citations::article_id.eq(self.id),
                articles_citations::citation_id.eq(citation.id),
            ))
            .execute(connection)
    }

    pub fn add_follower(
        &self,
        user: &User,
        connection: &mut SqliteConnection,
    ) -> QueryResult<usize> {
        insert_into(articles_users::table)
            .values((
                articles_users::article_id.eq(self.id),
                articles_users::user_id.eq(user.id),
            ))
            .execute(connection)
    }

    pub fn summary(self, connection: &mut SqliteConnection) -> QueryResult<ArticleSummary> {
        let comments = self.comments(connection)?;
        Ok(ArticleSummary {
            id: self.id,
            description: self.description,
            comments,
        })
    }

    pub fn view(self, connection: &mut SqliteConnection) -> QueryResult<ArticleView> {
        let comments = self.comments(connection)?;
        let categories = self.categories(connection)?;
        let citations = self.citations(connection)?;
        let followers = self.followers(connection)?;
        Ok(ArticleView {
            id: self.id,
            description: self.description,
            comments,
            categories,
            citations,
            followers,
        })
    }

    /// Removes the article together with its comments and every association
    /// row that names it.
    pub fn delete(&self, connection: &mut SqliteConnection) -> QueryResult<()> {
        connection.transaction::<_, DieselError, _>(|conn| {
            diesel_delete(
                articles_categories::table.filter(articles_categories::article_id.eq(self.id)),
            )
            .execute(conn)?;
            diesel_delete(
                articles_citations::table.filter(articles_citations::article_id.eq(self.id)),
            )
            .execute(conn)?;
            diesel_delete(articles_users::table.filter(articles_users::article_id.eq(self.id)))
                .execute(conn)?;
            diesel_delete(comments::table.filter(comments::article_id.eq(self.id)))
                .execute(conn)?;
            diesel_delete(self).execute(conn)?;
            Ok(())
        })
    }
}

pub fn views(
    articles_: Vec<Article>,
    connection: &mut SqliteConnection,
) -> QueryResult<Vec<ArticleView>> {
    articles_
        .into_iter()
        .map(|article| article.view(connection))
        .collect()
}

#[get("/articles")]
pub fn list(mut connection: DbConnection) -> ApiResult<ArticlesContainer<Vec<ArticleView>>> {
    let conn = &mut *connection;
    let all = Article::load_all(conn)?;
    Ok(Success::ok(ArticlesContainer {
        articles: views(all, conn)?,
    }))
}

#[post("/articles", data = "<details>")]
pub fn create(
    mut connection: DbConnection,
    details: Json<Value>,
) -> ApiResult<ArticleView> {
    let conn = &mut *connection;
    let description = require_str(&details, "description")?;
    if Article::load_by_description(&description, conn)?.is_some() {
        log::warn!("rejected duplicate article description {:?}", description);
        return Err(ApiError::Conflict("Enter a unique description."));
    }

    let article = insert_into(articles::table)
        .values(&NewArticle {
            description: &description,
        })
        .returning(Article::as_returning())
        .get_result(conn)?;
    log::info!("created article {}", article.id);
    Ok(Success::created(article.view(conn)?))
}

#[get("/articles/<id>")]
pub fn get(id: i32, mut connection: DbConnection) -> ApiResult<ArticleView> {
    let conn = &mut *connection;
    let article = Article::try_load_by_id(id, conn)?;
    Ok(Success::ok(article.view(conn)?))
}

#[post("/articles/<id>", data = "<details>")]
pub fn update(
    id: i32,
    mut connection: DbConnection,
    details: Json<Value>,
) -> ApiResult<ArticleView> {
    let conn = &mut *connection;
    let article = Article::try_load_by_id(id, conn)?;
    let description = require_str(&details, "description")?;
    let article = diesel_update(&article)
        .set(articles::description.eq(&description))
        .returning(Article::as_returning())
        .get_result(conn)?;
    Ok(Success::ok(article.view(conn)?))
}

#[delete("/articles/<id>")]
pub fn delete(id: i32, mut connection: DbConnection) -> ApiResult<ArticleView> {
    let conn = &mut *connection;
    let article = Article::try_load_by_id(id, conn)?;
    let view = article.clone().view(conn)?;
    article.delete(conn)?;
    log::info!("deleted article {}", id);
    Ok(Success::ok(view))
}

#[post("/articles/<id>/user", data = "<details>")]
pub fn follow(
    id: i32,
    mut connection: DbConnection,
    details: Json<Value>,
) -> ApiResult<ArticleView> {
    let conn = &mut *connection;
    let article = Article::try_load_by_id(id, conn)?;
    let user = match details.get("username").and_then(Value::as_str) {
        Some(name) => User::load_by_name(name, conn)?,
        None => None,
    };
    let user = match user {
        Some(user) => user,
        None => return Err(ApiError::NotFound("Invalid username.")),
    };
    article.add_follower(&user, conn)?;
    Ok(Success::ok(article.view(conn)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::NewCitation;
    use crate::comment::NewComment;
    use crate::db;

    fn article(description_: &str, connection: &mut SqliteConnection) -> Article {
        insert_into(articles::table)
            .values(&NewArticle {
                description: description_,
            })
            .returning(Article::as_returning())
            .get_result(connection)
            .unwrap()
    }

    #[test]
    fn summary_carries_comments_only() {
        let pool = db::memory_pool().unwrap();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let a = article("a", conn);
        insert_into(comments::table)
            .values(&NewComment {
                description: "first",
                article_id: a.id,
            })
            .execute(conn)
            .unwrap();

        let summary = a.summary(conn).unwrap();
        assert_eq!(summary.description, "a");
        assert_eq!(summary.comments.len(), 1);
        assert_eq!(summary.comments[0].description, "first");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
        assert!(json.get("categories").is_none());
    }

    #[test]
    fn delete_cascades_to_own_comments_only() {
        let pool = db::memory_pool().unwrap();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let doomed = article("doomed", conn);
        let kept = article("kept", conn);
        for owner in &[&doomed, &kept] {
            insert_into(comments::table)
                .values(&NewComment {
                    description: "c",
                    article_id: owner.id,
                })
                .execute(conn)
                .unwrap();
        }

        doomed.delete(conn).unwrap();
        assert_eq!(Article::load_by_id(doomed.id, conn).unwrap(), None);
        assert_eq!(Comment::load_all(conn).unwrap().len(), 1);
        assert_eq!(kept.comments(conn).unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_own_links_and_keeps_linked_rows() {
        let pool = db::memory_pool().unwrap();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let doomed = article("doomed", conn);
        let kept = article("kept", conn);
        let category = Category::find_or_create("tech", conn).unwrap();
        let citation = Citation::find_or_create(
            &NewCitation {
                title: "T",
                author: "A",
            },
            conn,
        )
        .unwrap();
        let user = insert_into(users::table)
            .values(users::username.eq("reader"))
            .returning(User::as_returning())
            .get_result(conn)
            .unwrap();
        for owner in &[&doomed, &kept] {
            owner.add_category(&category, conn).unwrap();
            owner.add_citation(&citation, conn).unwrap();
            owner.add_follower(&user, conn).unwrap();
        }

        doomed.delete(conn).unwrap();
        let links = (
            articles_categories::table.count().get_result::<i64>(conn).unwrap(),
            articles_citations::table.count().get_result::<i64>(conn).unwrap(),
            articles_users::table.count().get_result::<i64>(conn).unwrap(),
        );
        assert_eq!(links, (1, 1, 1));
        assert_eq!(kept.categories(conn).unwrap(), vec![category]);
        assert_eq!(kept.citations(conn).unwrap(), vec![citation]);
        assert_eq!(kept.followers(conn).unwrap(), vec![user]);
    }
}
