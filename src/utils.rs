use rocket::http::Status;
use rocket::request::Request;
use rocket::response::content::RawJson;
use rocket::response::{self, Responder, Response};
use serde::Serialize;

/// Serializes `body` as the JSON payload of a response carrying `status`.
pub fn try_respond<T: Serialize>(
    req: &Request<'_>,
    body: &T,
    status: Status,
) -> response::Result<'static> {
    let as_json = serde_json::to_string(body);
    match as_json {
        Ok(json) => Response::build_from(RawJson(json).respond_to(req)?)
            .status(status)
            .ok(),

        Err(e) => {
            log::error!("failed to serialize response body: {}", e);
            Err(Status::InternalServerError)
        }
    }
}
