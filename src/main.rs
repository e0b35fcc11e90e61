use newsroom::db;
use std::env;

#[rocket::main]
async fn main() {
    let pool = db::init_pool().expect("Failed to create database pool");
    let port = env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(5000);
    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port));

    if let Err(e) = newsroom::rocket(pool).configure(figment).launch().await {
        log::error!("server failed: {}", e);
        std::process::exit(1);
    }
}
