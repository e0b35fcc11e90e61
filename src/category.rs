use crate::article::{self, Article, ArticleView};
use crate::db::schema::{articles, articles_categories, categories};
use crate::db::{DbConnection, TryLoadById};
use crate::types::{require_str, ApiResult, Success};
use diesel::prelude::*;
use diesel::{delete as diesel_delete, insert_into};
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub description: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CategoryView {
    pub id: i32,
    pub description: String,
    pub articles: Vec<ArticleView>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesContainer<T> {
    pub categories: T,
}

impl TryLoadById for Category {
    const NOT_FOUND: &'static str = "Category not found!";

    fn load_by_id(id: i32, connection: &mut SqliteConnection) -> QueryResult<Option<Category>> {
        categories::table
            .find(id)
            .select(Category::as_select())
            .first(connection)
            .optional()
    }
}

impl Category {
    pub fn load_all(connection: &mut SqliteConnection) -> QueryResult<Vec<Category>> {
        categories::table
            .order(categories::id)
            .select(Category::as_select())
            .load(connection)
    }

    pub fn load_by_description(
        description_: &str,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Option<Category>> {
        categories::table
            .filter(categories::description.eq(description_))
            .order(categories::id)
            .select(Category::as_select())
            .first(connection)
            .optional()
    }

    /// Reuses the first category with exactly this description, inserting one
    /// otherwise. The lookup and the insert are separate statements, so two
    /// concurrent callers can both insert.
    pub fn find_or_create(
        description_: &str,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Category> {
        if let Some(existing) = Category::load_by_description(description_, connection)? {
            return Ok(existing);
        }
        let category = insert_into(categories::table)
            .values(categories::description.eq(description_))
            .returning(Category::as_returning())
            .get_result(connection)?;
        log::info!("created category {}", category.id);
        Ok(category)
    }

    pub fn articles(&self, connection: &mut SqliteConnection) -> QueryResult<Vec<Article>> {
        articles_categories::table
            .inner_join(articles::table)
            .filter(articles_categories::category_id.eq(self.id))
            .order(articles_categories::id)
            .select(Article::as_select())
            .load(connection)
    }

    pub fn view(self, connection: &mut SqliteConnection) -> QueryResult<CategoryView> {
        let articles_ = self.articles(connection)?;
        Ok(CategoryView {
            id: self.id,
            description: self.description,
            articles: article::views(articles_, connection)?,
        })
    }
}

#[post("/articles/<article_id>/category", data = "<details>")]
pub fn assign(
    article_id: i32,
    mut connection: DbConnection,
    details: Json<Value>,
) -> ApiResult<ArticleView> {
    let conn = &mut *connection;
    let article = Article::try_load_by_id(article_id, conn)?;
    let description = require_str(&details, "description")
        .map_err(|e| e.with_status(Status::NotFound))?;
    let category = Category::find_or_create(&description, conn)?;
    article.add_category(&category, conn)?;
    Ok(Success::ok(article.view(conn)?))
}

#[get("/categories")]
pub fn list(mut connection: DbConnection) -> ApiResult<CategoriesContainer<Vec<CategoryView>>> {
    let conn = &mut *connection;
    let views = Category::load_all(conn)?
        .into_iter()
        .map(|category| category.view(conn))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(Success::ok(CategoriesContainer { categories: views }))
}

#[get("/categories/<id>")]
pub fn get(id: i32, mut connection: DbConnection) -> ApiResult<CategoryView> {
    let conn = &mut *connection;
    let category = Category::try_load_by_id(id, conn)?;
    Ok(Success::ok(category.view(conn)?))
}

// Links from articles to this category stay behind and are skipped on read.
#[delete("/categories/<id>")]
pub fn delete(id: i32, mut connection: DbConnection) -> ApiResult<CategoryView> {
    let conn = &mut *connection;
    let category = Category::try_load_by_id(id, conn)?;
    let view = category.clone().view(conn)?;
    diesel_delete(&category).execute(conn)?;
    log::info!("deleted category {}", id);
    Ok(Success::ok(view))
}
