// src/models/identity.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Quem está fazendo a requisição.
// Vive apenas no escopo da requisição (extensions do axum); nunca é global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Identity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl Caller {
    pub fn authenticated(user_id: Uuid) -> Self {
        Caller::Authenticated(Identity { user_id, email: None })
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(identity) => Some(identity.user_id),
        }
    }

    // E-mail informado pelo provedor no token, quando houver
    pub fn email(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(identity) => identity.email.as_deref(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated(_))
    }
}

// "Claims" do JWT emitido pelo provedor de identidade externo
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (ID do usuário). Pode vir malformado.
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

/// Converte uma referência textual em UUID.
/// Qualquer coisa fora do formato canônico com hífens vira `None` (sem erro).
pub fn coerce_uuid(raw: &str) -> Option<Uuid> {
    let raw = raw.trim();
    if raw.len() != 36 {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_uuid_accepts_hyphenated_form() {
        let id = Uuid::new_v4();
        assert_eq!(coerce_uuid(&id.to_string()), Some(id));
        assert_eq!(coerce_uuid(&id.to_string().to_uppercase()), Some(id));
    }

    #[test]
    fn coerce_uuid_maps_garbage_to_none() {
        assert_eq!(coerce_uuid(""), None);
        assert_eq!(coerce_uuid("undefined"), None);
        assert_eq!(coerce_uuid("null"), None);
        assert_eq!(coerce_uuid("1234"), None);
        // Forma "simple" (sem hífens) não é considerada UUID aqui
        assert_eq!(coerce_uuid(&Uuid::new_v4().simple().to_string()), None);
    }

    #[test]
    fn anonymous_has_no_user_id() {
        assert_eq!(Caller::Anonymous.user_id(), None);
        assert!(!Caller::Anonymous.is_authenticated());

        let id = Uuid::new_v4();
        let caller = Caller::authenticated(id);
        assert_eq!(caller.user_id(), Some(id));
        assert!(caller.is_authenticated());
    }
}
