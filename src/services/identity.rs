// src/services/identity.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::identity::{coerce_uuid, Caller, Claims, Identity},
};

/// Valida os JWTs emitidos pelo provedor de identidade externo (HS256, segredo compartilhado).
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn new(jwt_secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        Self {
            key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Token inválido (assinatura, validade, audiência) é erro.
    /// Token válido com `sub` fora do formato de UUID vira anônimo.
    pub fn verify(&self, token: &str) -> Result<Caller, AppError> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        let claims = token_data.claims;
        match coerce_uuid(&claims.sub) {
            Some(user_id) => Ok(Caller::Authenticated(Identity { user_id, email: claims.email })),
            None => {
                tracing::warn!(sub = %claims.sub, "Token com 'sub' malformado; tratado como anônimo");
                Ok(Caller::Anonymous)
            }
        }
    }
}
