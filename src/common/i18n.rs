// src/common/i18n.rs

use std::{collections::HashMap, sync::OnceLock};

pub const DEFAULT_LANG: &str = "en";

// Traduções embutidas no binário (locales/*.json)
const EMBEDDED: [(&str, &str); 2] = [
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

#[derive(Debug, Default)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> anyhow::Result<Self> {
        let mut messages = HashMap::new();
        for (lang, raw) in sources {
            let table: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Arquivo de tradução '{}' inválido: {}", lang, e))?;
            messages.insert(lang.to_string(), table);
        }
        Ok(Self { messages })
    }

    pub fn load_embedded() -> anyhow::Result<Self> {
        Self::from_sources(EMBEDDED)
    }

    /// Instância compartilhada com as traduções embutidas.
    pub fn embedded() -> &'static I18nStore {
        static STORE: OnceLock<I18nStore> = OnceLock::new();
        STORE.get_or_init(|| {
            Self::load_embedded().unwrap_or_else(|e| {
                tracing::error!("{}", e);
                I18nStore::default()
            })
        })
    }

    // Idioma pedido -> inglês -> a própria chave
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANG]
            .iter()
            .find_map(|l| self.messages.get(*l).and_then(|table| table.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_locales_share_the_same_keys() {
        let store = I18nStore::embedded();
        let en = &store.messages["en"];
        let pt = &store.messages["pt"];
        let mut en_keys: Vec<_> = en.keys().collect();
        let mut pt_keys: Vec<_> = pt.keys().collect();
        en_keys.sort();
        pt_keys.sort();
        assert_eq!(en_keys, pt_keys);
    }

    #[test]
    fn translation_falls_back_to_english_then_key() {
        let store = I18nStore::embedded();
        assert_eq!(store.translate("pt", "not_found"), "Registro não encontrado.");
        assert_eq!(store.translate("fr", "not_found"), "Record not found.");
        assert_eq!(store.translate("pt", "sem_chave"), "sem_chave");
    }

    #[test]
    fn malformed_source_is_an_error() {
        assert!(I18nStore::from_sources([("en", "{ nope")]).is_err());
    }
}
