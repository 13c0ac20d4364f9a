// src/models/material.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    #[schema(example = "Caneta azul")]
    pub nome: String,
    pub descricao: String,
    pub imagem_url: Option<String>,
    pub quantidade: i32,
    // Quantidade ideal: abaixo disso o criador é notificado
    pub minimo: i32,
    pub criado_por: Option<Uuid>,
    pub criado: DateTime<Utc>,
}

impl Material {
    pub fn abaixo_do_minimo(&self) -> bool {
        self.quantidade < self.minimo
    }
}

// Listagem enxuta usada por GET /api/materials
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialResumo {
    pub id: Uuid,
    pub nome: String,
    pub quantidade: i32,
    pub imagem_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovoMaterial {
    pub nome: String,
    pub descricao: String,
    pub imagem_url: Option<String>,
    pub quantidade: i32,
    pub minimo: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(quantidade: i32, minimo: i32) -> Material {
        Material {
            id: Uuid::new_v4(),
            nome: "Papel A4".into(),
            descricao: String::new(),
            imagem_url: None,
            quantidade,
            minimo,
            criado_por: None,
            criado: Utc::now(),
        }
    }

    #[test]
    fn abaixo_do_minimo_e_estrito() {
        assert!(material(4, 5).abaixo_do_minimo());
        assert!(!material(5, 5).abaixo_do_minimo());
        assert!(!material(0, 0).abaixo_do_minimo());
        assert!(material(-2, 0).abaixo_do_minimo());
    }
}
