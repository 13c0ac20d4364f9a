// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_LANG: &str = "pt";

// Catálogos embutidos no binário
const CATALOGS: [(&str, &str); 2] = [
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Mensagens traduzidas, indexadas por idioma e depois por chave.
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

static EMBEDDED: LazyLock<I18nStore> = LazyLock::new(|| {
    I18nStore::embedded().unwrap_or_else(|e| {
        tracing::error!("🔥 Falha ao carregar as traduções embutidas: {:?}", e);
        I18nStore::default()
    })
});

impl I18nStore {
    pub fn embedded() -> anyhow::Result<Self> {
        let mut store = Self::default();
        for (lang, json) in CATALOGS {
            store.add_catalog(lang, json)?;
        }
        Ok(store)
    }

    /// Instância compartilhada, usada quando não há `AppState` à mão.
    pub fn shared() -> &'static I18nStore {
        &EMBEDDED
    }

    pub fn add_catalog(&mut self, lang: &str, json: &str) -> anyhow::Result<()> {
        let messages: HashMap<String, String> = serde_json::from_str(json)?;
        self.catalogs.insert(lang.to_string(), messages);
        Ok(())
    }

    /// Traduz `key` para `lang`, caindo para o idioma padrão e depois para a própria chave.
    /// Os argumentos substituem os marcadores `{nome}`.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |msg, (name, value)| {
            msg.replace(&format!("{{{}}}", name), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogos_embutidos_tem_as_mesmas_chaves() {
        let store = I18nStore::embedded().unwrap();
        let pt = &store.catalogs["pt"];
        let en = &store.catalogs["en"];
        let mut chaves_pt: Vec<_> = pt.keys().collect();
        let mut chaves_en: Vec<_> = en.keys().collect();
        chaves_pt.sort();
        chaves_en.sort();
        assert_eq!(chaves_pt, chaves_en);
    }

    #[test]
    fn traduz_com_argumentos() {
        let store = I18nStore::embedded().unwrap();
        let msg = store.translate("en", "material.not_found", &[("id", "42".into())]);
        assert_eq!(msg, "Material 42 not found.");
    }

    #[test]
    fn idioma_desconhecido_cai_para_portugues() {
        let store = I18nStore::embedded().unwrap();
        assert_eq!(
            store.translate("fr", "auth.user_not_found", &[]),
            "Usuário não encontrado."
        );
    }

    #[test]
    fn chave_desconhecida_retorna_a_propria_chave() {
        assert_eq!(I18nStore::default().translate("pt", "nao.existe", &[]), "nao.existe");
    }
}
