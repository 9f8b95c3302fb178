//! HTTP handlers for the messaging transport and session inspection.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::Deserialize;

use crate::dialogue::models::{InboundContent, InboundMessage, Replies, Selection};
use crate::documents::UploadedDocument;
use crate::errors::AppError;
use crate::session::{SessionSnapshot, UserId};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub user_id: UserId,
    pub content: MessageContent,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    Voice,
    Document { file_name: String, data_base64: String },
}

impl TryFrom<MessageContent> for InboundContent {
    type Error = AppError;

    fn try_from(content: MessageContent) -> Result<Self, AppError> {
        Ok(match content {
            MessageContent::Text { text } => InboundContent::Text(text),
            MessageContent::Voice => InboundContent::Voice,
            MessageContent::Document {
                file_name,
                data_base64,
            } => {
                let bytes = STANDARD
                    .decode(data_base64.trim())
                    .map_err(|e| AppError::Validation(format!("data_base64 is not valid base64: {e}")))?;
                InboundContent::Document(UploadedDocument {
                    file_name,
                    bytes: Bytes::from(bytes),
                })
            }
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub user_id: UserId,
    pub label: String,
}

/// POST /api/v1/messages
pub async fn handle_message(
    State(state): State<AppState>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<Replies>, AppError> {
    let message = InboundMessage {
        user_id: req.user_id,
        content: req.content.try_into()?,
    };
    Ok(Json(state.engine.handle_message(message).await))
}

/// POST /api/v1/messages/document
/// Multipart form with a `user_id` text field and a `file` field.
pub async fn handle_document_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Replies>, AppError> {
    let mut user_id: Option<UserId> = None;
    let mut document: Option<UploadedDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable user_id: {e}")))?;
                user_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::Validation(format!("user_id must be an integer, got {text:?}")))?,
                );
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file: {e}")))?;
                document = Some(UploadedDocument { file_name, bytes });
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".into()))?;
    let document = document.ok_or_else(|| AppError::Validation("file is required".into()))?;

    let message = InboundMessage {
        user_id,
        content: InboundContent::Document(document),
    };
    Ok(Json(state.engine.handle_message(message).await))
}

/// POST /api/v1/selections
pub async fn handle_selection(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<Replies>, AppError> {
    let selection = Selection {
        user_id: req.user_id,
        label: req.label,
    };
    Ok(Json(state.engine.handle_selection(selection).await))
}

/// GET /api/v1/sessions/:user_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .engine
        .sessions()
        .snapshot(user_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No session for user {user_id}")))
}
