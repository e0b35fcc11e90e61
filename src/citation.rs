use crate::article::{self, Article, ArticleView};
use crate::db::schema::{articles, articles_citations, citations};
use crate::db::{DbConnection, TryLoadById};
use crate::types::{require_str, ApiResult, Success, ValidationError};
use diesel::prelude::*;
use diesel::{delete as diesel_delete, insert_into};
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = citations)]
pub struct Citation {
    pub id: i32,
    pub title: String,
    pub author: String,
}

#[derive(Insertable)]
#[diesel(table_name = citations)]
pub struct NewCitation<'a> {
    pub title: &'a str,
    pub author: &'a str,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CitationView {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub articles: Vec<ArticleView>,
}

#[derive(Debug, Serialize)]
pub struct CitationsContainer<T> {
    pub citations: T,
}

impl TryLoadById for Citation {
    const NOT_FOUND: &'static str = "Citation not found!";

    fn load_by_id(id: i32, connection: &mut SqliteConnection) -> QueryResult<Option<Citation>> {
        citations::table
            .find(id)
            .select(Citation::as_select())
            .first(connection)
            .optional()
    }
}

impl Citation {
    pub fn load_all(connection: &mut SqliteConnection) -> QueryResult<Vec<Citation>> {
        citations::table
            .order(citations::id)
            .select(Citation::as_select())
            .load(connection)
    }

    pub fn load_by_title(
        title_: &str,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Option<Citation>> {
        citations::table
            .filter(citations::title.eq(title_))
            .order(citations::id)
            .select(Citation::as_select())
            .first(connection)
            .optional()
    }

    /// Matches on title only: an existing citation keeps its author even when
    /// a different one is supplied. Not atomic under concurrent callers.
    pub fn find_or_create(
        new: &NewCitation,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Citation> {
        if let Some(existing) = Citation::load_by_title(new.title, connection)? {
            return Ok(existing);
        }
        let citation = insert_into(citations::table)
            .values(new)
            .returning(Citation::as_returning())
            .get_result(connection)?;
        log::info!("created citation {}", citation.id);
        Ok(citation)
    }

    pub fn articles(&self, connection: &mut SqliteConnection) -> QueryResult<Vec<Article>> {
        articles_citations::table
            .inner_join(articles::table)
            .filter(articles_citations::citation_id.eq(self.id))
            .order(articles_citations::id)
            .select(Article::as_select())
            .load(connection)
    }

    pub fn view(self, connection: &mut SqliteConnection) -> QueryResult<CitationView> {
        let articles_ = self.articles(connection)?;
        Ok(CitationView {
            id: self.id,
            title: self.title,
            author: self.author,
            articles: article::views(articles_, connection)?,
        })
    }
}

#[post("/articles/<article_id>/cite", data = "<details>")]
pub fn assign(
    article_id: i32,
    mut connection: DbConnection,
    details: Json<Value>,
) -> ApiResult<ArticleView> {
    let conn = &mut *connection;
    let article = Article::try_load_by_id(article_id, conn)?;
    let not_found = |e: ValidationError| e.with_status(Status::NotFound);
    let title = require_str(&details, "title").map_err(not_found)?;
    let author = require_str(&details, "author").map_err(not_found)?;
    let citation = Citation::find_or_create(
        &NewCitation {
            title: &title,
            author: &author,
        },
        conn,
    )?;
    article.add_citation(&citation, conn)?;
    Ok(Success::ok(article.view(conn)?))
}

#[get("/citations")]
pub fn list(mut connection: DbConnection) -> ApiResult<CitationsContainer<Vec<CitationView>>> {
    let conn = &mut *connection;
    let views = Citation::load_all(conn)?
        .into_iter()
        .map(|citation| citation.view(conn))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(Success::ok(CitationsContainer { citations: views }))
}

#[get("/citations/<id>")]
pub fn get(id: i32, mut connection: DbConnection) -> ApiResult<CitationView> {
    let conn = &mut *connection;
    let citation = Citation::try_load_by_id(id, conn)?;
    Ok(Success::ok(citation.view(conn)?))
}

#[delete("/citations/<id>")]
pub fn delete(id: i32, mut connection: DbConnection) -> ApiResult<CitationView> {
    let conn = &mut *connection;
    let citation = Citation::try_load_by_id(id, conn)?;
    let view = citation.clone().view(conn)?;
    diesel_delete(&citation).execute(conn)?;
    log::info!("deleted citation {}", id);
    Ok(Success::ok(view))
}
