table! {
    articles (id) {
        id -> Integer,
        description -> Text,
    }
}

table! {
    comments (id) {
        id -> Integer,
        description -> Text,
        article_id -> Integer,
    }
}

table! {
    categories (id) {
        id -> Integer,
        description -> Text,
    }
}

table! {
    citations (id) {
        id -> Integer,
        title -> Text,
        author -> Text,
    }
}

table! {
    users (id) {
        id -> Integer,
        username -> Text,
    }
}

table! {
    articles_categories (id) {
        id -> Integer,
        article_id -> Integer,
        category_id -> Integer,
    }
}

table! {
    articles_citations (id) {
        id -> Integer,
        article_id -> Integer,
        citation_id -> Integer,
    }
}

table! {
    articles_users (id) {
        id -> Integer,
        article_id -> Integer,
        user_id -> Integer,
    }
}

joinable!(comments -> articles (article_id));
joinable!(articles_categories -> articles (article_id));
joinable!(articles_categories -> categories (category_id));
joinable!(articles_citations -> articles (article_id));
joinable!(articles_citations -> citations (citation_id));
joinable!(articles_users -> articles (article_id));
joinable!(articles_users -> users (user_id));

allow_tables_to_appear_in_same_query!(
    articles,
    comments,
    categories,
    citations,
    users,
    articles_categories,
    articles_citations,
    articles_users,
);
