// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::material::Material;

pub const CATEGORIA_ABAIXO_MINIMO: &str = "ABAIXO_MINIMO";

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notificacao {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub material_id: Uuid,
    #[schema(example = "ABAIXO_MINIMO")]
    pub categoria: String,
    pub mensagem: String,
    pub lida: bool,
    pub criado: DateTime<Utc>,
}

pub fn mensagem_abaixo_minimo(material: &Material) -> String {
    format!(
        "O material '{}' está abaixo do mínimo ({} de {}).",
        material.nome, material.quantidade, material.minimo
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mensagem_inclui_nome_e_quantidades() {
        let material = Material {
            id: Uuid::new_v4(),
            nome: "Grampo".into(),
            descricao: String::new(),
            imagem_url: None,
            quantidade: 2,
            minimo: 10,
            criado_por: None,
            criado: Utc::now(),
        };
        assert_eq!(
            mensagem_abaixo_minimo(&material),
            "O material 'Grampo' está abaixo do mínimo (2 de 10)."
        );
    }
}
