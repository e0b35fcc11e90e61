use crate::utils::try_respond;
use diesel::result::Error as DieselError;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    Diesel(DieselError),
    Validation(ValidationError),
    NotFound(&'static str),
    Conflict(&'static str),
    Internal,
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> ApiError {
        ApiError::Validation(err)
    }
}

pub type ApiResult<T> = Result<Success<T>, ApiError>;

/// A required field was absent or not a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    field: &'static str,
    status: Status,
}

impl ValidationError {
    pub fn new(field: &'static str) -> Self {
        ValidationError {
            field,
            status: Status::BadRequest,
        }
    }

    /// Category and citation assignment report bad input as 404.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid {}.", self.field)
    }
}

/// Takes a body field that must be present and hold a JSON string. A body
/// that is not an object has no fields.
pub fn require_str(body: &Value, field: &'static str) -> Result<String, ValidationError> {
    match body.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => {
            log::warn!("rejected request: field `{}` missing or not a string", field);
            Err(ValidationError::new(field))
        }
    }
}

#[derive(Serialize)]
struct SuccessBody<'a, T> {
    success: bool,
    data: &'a T,
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: &'a str,
}

/// `{"success": true, "data": ...}` with 200, or 201 for creations.
#[derive(Debug)]
pub struct Success<T> {
    status: Status,
    data: T,
}

impl<T> Success<T> {
    pub fn ok(data: T) -> Self {
        Success {
            status: Status::Ok,
            data,
        }
    }

    pub fn created(data: T) -> Self {
        Success {
            status: Status::Created,
            data,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for Success<T> {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let body = SuccessBody {
            success: true,
            data: &self.data,
        };
        try_respond(req, &body, self.status)
    }
}

/// `{"success": false, "error": ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    status: Status,
    message: Cow<'static, str>,
}

impl Failure {
    pub fn new<M: Into<Cow<'static, str>>>(status: Status, message: M) -> Self {
        Failure {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Failure {
        match error {
            ApiError::Diesel(DieselError::NotFound) => {
                Failure::new(Status::NotFound, "Entity not found!")
            }
            ApiError::Diesel(error) => {
                log::error!("database error: {}", error);
                Failure::new(Status::InternalServerError, "Internal server error.")
            }
            ApiError::Validation(error) => Failure::new(error.status(), error.to_string()),
            ApiError::NotFound(message) => Failure::new(Status::NotFound, message),
            ApiError::Conflict(message) => Failure::new(Status::BadRequest, message),
            ApiError::Internal => {
                Failure::new(Status::InternalServerError, "Internal server error.")
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for Failure {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let body = FailureBody {
            success: false,
            error: &self.message,
        };
        try_respond(req, &body, self.status)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        Failure::from(self).respond_to(req)
    }
}
