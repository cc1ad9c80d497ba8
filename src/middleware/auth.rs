// src/middleware/auth.rs

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::i18n::Locale,
    models::identity::Caller,
};

/// Resolve o chamador de cada requisição e o guarda nas extensions.
///
/// - Sem `Authorization`: anônimo (as políticas decidem o que ele vê).
/// - `Authorization` que não é um Bearer válido, ou token rejeitado: 401.
pub async fn identity_layer(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = if request.headers().contains_key(header::AUTHORIZATION) {
        let verified = request
            .headers()
            .typed_try_get::<Authorization<Bearer>>()
            .ok()
            .flatten()
            .ok_or(AppError::InvalidToken)
            .and_then(|bearer| app_state.identity.verify(bearer.token()));

        match verified {
            Ok(caller) => caller,
            Err(err) => {
                let locale = Locale::from_headers(request.headers());
                return err.to_api_error(&locale, &app_state.i18n_store).into_response();
            }
        }
    } else {
        Caller::Anonymous
    };

    if let Caller::Authenticated(identity) = &caller {
        tracing::debug!(user_id = %identity.user_id, "Chamador autenticado");
    }

    request.extensions_mut().insert(caller);
    next.run(request).await
}

// Extrator para obter o chamador diretamente nos handlers
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Caller>().cloned().unwrap_or(Caller::Anonymous))
    }
}
