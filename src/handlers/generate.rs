use crate::error::AppError;
use crate::models::{GenerateContentRequest, GenerateContentResponse};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};

const API_KEY_HEADER: &str = "x-cursor-api-key";

/// `POST /v1beta/models/{model}` — run one agent generation and wrap its
/// output in a single-candidate envelope.
#[tracing::instrument(skip(state, headers, body), fields(model = %model))]
pub async fn generate(
    State(state): State<AppState>,
    Path(model): Path<String>,
    headers: HeaderMap,
    body: Result<Json<GenerateContentRequest>, JsonRejection>,
) -> Result<Json<GenerateContentResponse>, AppError> {
    tracing::info!("Incoming generate request");

    let Json(request) = body.map_err(|rejection| {
        tracing::error!("Failed to decode request body: {}", rejection.body_text());
        AppError::BadRequest(anyhow::anyhow!(rejection.body_text()))
    })?;

    let prompt = request.first_prompt().ok_or_else(|| {
        tracing::warn!("Request did not include any text prompt");
        AppError::BadRequest(anyhow::anyhow!("no text prompt found in contents.parts"))
    })?;

    if prompt.chars().count() > 200 {
        let preview: String = prompt.chars().take(200).collect();
        tracing::debug!("Prompt preview (first 200 chars): {:?}...", preview);
    } else {
        tracing::debug!("Prompt: {:?}", prompt);
    }

    let api_key = match headers.get(API_KEY_HEADER) {
        Some(value) => match value.to_str() {
            Ok(key) => {
                tracing::debug!("{} header detected", API_KEY_HEADER);
                Some(key)
            }
            Err(_) => {
                tracing::debug!(
                    "{} header is not valid UTF-8; dropping credential override",
                    API_KEY_HEADER
                );
                None
            }
        },
        None => {
            tracing::debug!(
                "No {} header provided; using default agent credentials",
                API_KEY_HEADER
            );
            None
        }
    };

    let output = state
        .agent
        .generate(&model, prompt, api_key)
        .await
        .map_err(|err| {
            tracing::error!("Error executing agent command: {}", err);
            tracing::debug!("Agent combined output: {}", err.output());
            AppError::AgentFailure(err)
        })?;

    let reply = output.trim().to_string();
    tracing::info!(payload_bytes = reply.len(), "Successfully generated response");

    Ok(Json(GenerateContentResponse::single(model, reply)))
}
