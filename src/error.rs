use actix_web::{http::StatusCode, ResponseError};
use base64::DecodeError as BASE64_DECODE_ERROR;
use ece::Error as ECE_ERROR;
use jsonwebtoken::errors::Error as JWT_ERROR;
use reqwest::header::{
    InvalidHeaderName as INVALID_HEADER_NAME,
    InvalidHeaderValue as INVALID_HEADER_VALUE,
};
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use std::{env::VarError, io::Error as IO_ERROR, num::ParseIntError};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    Base64DecodeError(#[from] BASE64_DECODE_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Subscription has no encryption keys")]
    MissingKeysError(),

    #[error("Push service rejected the message with status {status}")]
    DeliveryError { status: u16 },

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("Server end with error: {0}")]
    ServerError(String),

    #[error("Parse message error: {0}")]
    ParseMessage(String),

    #[error("Lifecycle error: {0}")]
    LifecycleError(String),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    InvalidHeaderName(#[from] INVALID_HEADER_NAME),

    #[error("{0}")]
    InvalidHeaderValue(#[from] INVALID_HEADER_VALUE),

    #[error("Invalid option {option}")]
    InvalidOption { option: String },

    #[error("{0}")]
    EceError(#[from] ECE_ERROR),

    #[error("{0}")]
    JWT(#[from] JWT_ERROR),

    #[error("{0}")]
    AnyHowError(#[from] anyhow::Error),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - client sent invalid input
            Error::InvalidOption { .. }
            | Error::MissingKeysError()
            | Error::ParseMessage(_)
            | Error::LifecycleError(_)
            | Error::JsonError(_)
            | Error::Base64DecodeError(_) => StatusCode::BAD_REQUEST,

            // 502 Bad Gateway - push service error
            Error::ReqwestError(_) | Error::DeliveryError { .. } => {
                StatusCode::BAD_GATEWAY
            },

            // 503 Service Unavailable - dispatch capability not configured
            Error::ConfigurationError(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error - everything else
            Error::Io(_)
            | Error::URL(_)
            | Error::INT(_)
            | Error::VAR(_)
            | Error::TokioJoinError(_)
            | Error::ServerError(_)
            | Error::SetGlobalDefaultError(_)
            | Error::InvalidHeaderName(_)
            | Error::InvalidHeaderValue(_)
            | Error::EceError(_)
            | Error::JWT(_)
            | Error::AnyHowError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
