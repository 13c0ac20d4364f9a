// src/models/movimento.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Tipos de Movimento ---
// O sinal do efeito na quantidade do material vem do tipo:
// ENTRADA e ADICAO somam, SAIDA subtrai, os demais são neutros.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "tipo_movimento", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum TipoMovimento {
    Entrada,    // Vira "ENTRADA"
    Saida,      // Vira "SAIDA"
    Adicao,     // Vira "ADICAO"
    Delete,     // Registro da remoção de um material
    Emprestimo, // Vira "EMPRESTIMO"
    Devolvido,  // Empréstimo concluído
}

impl TipoMovimento {
    pub fn sinal(self) -> i64 {
        match self {
            TipoMovimento::Entrada | TipoMovimento::Adicao => 1,
            TipoMovimento::Saida => -1,
            TipoMovimento::Delete | TipoMovimento::Emprestimo | TipoMovimento::Devolvido => 0,
        }
    }

    /// Efeito assinado de um movimento deste tipo sobre `Material.quantidade`.
    pub fn efeito(self, quantidade: i32) -> i64 {
        self.sinal() * i64::from(quantidade)
    }

    pub fn label(self) -> &'static str {
        match self {
            TipoMovimento::Entrada => "Entrada",
            TipoMovimento::Saida => "Saída",
            TipoMovimento::Adicao => "Adição",
            TipoMovimento::Delete => "Remoção",
            TipoMovimento::Emprestimo => "Empréstimo",
            TipoMovimento::Devolvido => "Devolvido",
        }
    }
}

// --- Status de Empréstimo (apenas apresentação, nunca persistido) ---
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
pub enum StatusEmprestimo {
    #[serde(rename = "Concluído")]
    Concluido,
    #[serde(rename = "Atrasado")]
    Atrasado,
    #[serde(rename = "Em andamento")]
    EmAndamento,
    #[serde(rename = "Sem data")]
    SemData,
    #[serde(rename = "-")]
    NaoSeAplica,
}

/// Deriva o status de um empréstimo a partir do tipo e da data de devolução.
/// Vencer hoje ainda conta como "Em andamento".
pub fn status_emprestimo(
    tipo: TipoMovimento,
    data_devolucao: Option<NaiveDate>,
    hoje: NaiveDate,
) -> StatusEmprestimo {
    match (tipo, data_devolucao) {
        (TipoMovimento::Devolvido, _) => StatusEmprestimo::Concluido,
        (TipoMovimento::Emprestimo, Some(prazo)) if prazo < hoje => StatusEmprestimo::Atrasado,
        (TipoMovimento::Emprestimo, Some(_)) => StatusEmprestimo::EmAndamento,
        (TipoMovimento::Emprestimo, None) => StatusEmprestimo::SemData,
        _ => StatusEmprestimo::NaoSeAplica,
    }
}

// --- MOVIMENTO (Livro-razão) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movimento {
    pub id: Uuid,
    // Nulo quando o material foi removido (histórico preservado)
    pub material_id: Option<Uuid>,
    pub tipo: TipoMovimento,
    pub quantidade: i32,
    pub nota: String,
    pub data_devolucao: Option<NaiveDate>,
    pub criado: DateTime<Utc>,
    pub usuario_id: Option<Uuid>,
}

impl Movimento {
    pub fn estado(&self) -> EstadoMovimento {
        EstadoMovimento {
            material_id: self.material_id,
            tipo: self.tipo,
            quantidade: self.quantidade,
        }
    }

    pub fn status_emprestimo(&self, hoje: NaiveDate) -> StatusEmprestimo {
        status_emprestimo(self.tipo, self.data_devolucao, hoje)
    }
}

/// A parte de um movimento que importa para a quantidade do material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstadoMovimento {
    pub material_id: Option<Uuid>,
    pub tipo: TipoMovimento,
    pub quantidade: i32,
}

impl EstadoMovimento {
    pub fn efeito(&self) -> i64 {
        self.tipo.efeito(self.quantidade)
    }
}

// Linha de listagem: o movimento mais o nome do material (LEFT JOIN).
#[derive(Debug, Clone, FromRow)]
pub struct MovimentoComMaterial {
    #[sqlx(flatten)]
    pub movimento: Movimento,
    pub material_nome: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovimentoDetalhe {
    #[serde(flatten)]
    pub movimento: Movimento,
    pub material_nome: Option<String>,
    pub status_emprestimo: StatusEmprestimo,
}

impl MovimentoDetalhe {
    pub fn new(row: MovimentoComMaterial, hoje: NaiveDate) -> Self {
        let status_emprestimo = row.movimento.status_emprestimo(hoje);
        Self {
            movimento: row.movimento,
            material_nome: row.material_nome,
            status_emprestimo,
        }
    }
}

/// Dados de entrada de um movimento, já vindos de um payload validado
/// ou montados internamente (estoque inicial, remoção de material).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovoMovimento {
    pub material_id: Option<Uuid>,
    pub tipo: TipoMovimento,
    pub quantidade: i32,
    pub nota: String,
    pub data_devolucao: Option<NaiveDate>,
}

impl NovoMovimento {
    /// Regras verificadas antes de qualquer escrita no banco.
    pub fn validar(&self) -> Result<(), AppError> {
        if self.quantidade < 0 {
            return Err(AppError::QuantidadeInvalida(self.quantidade));
        }
        if self.tipo == TipoMovimento::Emprestimo && self.data_devolucao.is_none() {
            return Err(AppError::EmprestimoSemPrazo);
        }
        Ok(())
    }

    pub fn estado(&self) -> EstadoMovimento {
        EstadoMovimento {
            material_id: self.material_id,
            tipo: self.tipo,
            quantidade: self.quantidade,
        }
    }
}

impl From<&Movimento> for NovoMovimento {
    fn from(movimento: &Movimento) -> Self {
        Self {
            material_id: movimento.material_id,
            tipo: movimento.tipo,
            quantidade: movimento.quantidade,
            nota: movimento.nota.clone(),
            data_devolucao: movimento.data_devolucao,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TODOS: [TipoMovimento; 6] = [
        TipoMovimento::Entrada,
        TipoMovimento::Saida,
        TipoMovimento::Adicao,
        TipoMovimento::Delete,
        TipoMovimento::Emprestimo,
        TipoMovimento::Devolvido,
    ];

    fn dia(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(TipoMovimento::Entrada, 5, 5)]
    #[case(TipoMovimento::Saida, 7, -7)]
    #[case(TipoMovimento::Adicao, 3, 3)]
    #[case(TipoMovimento::Delete, 9, 0)]
    #[case(TipoMovimento::Emprestimo, 2, 0)]
    #[case(TipoMovimento::Devolvido, 2, 0)]
    fn efeito_segue_o_sinal_do_tipo(
        #[case] tipo: TipoMovimento,
        #[case] quantidade: i32,
        #[case] esperado: i64,
    ) {
        assert_eq!(tipo.efeito(quantidade), esperado);
    }

    #[test]
    fn somente_entrada_saida_e_adicao_nao_sao_neutros() {
        let ajustam: Vec<_> = TODOS
            .into_iter()
            .filter(|t| t.sinal() != 0)
            .collect();
        assert_eq!(
            ajustam,
            vec![TipoMovimento::Entrada, TipoMovimento::Saida, TipoMovimento::Adicao]
        );
    }

    #[rstest]
    #[case(TipoMovimento::Devolvido, Some(dia(2024, 1, 1)), StatusEmprestimo::Concluido)]
    #[case(TipoMovimento::Devolvido, None, StatusEmprestimo::Concluido)]
    #[case(TipoMovimento::Emprestimo, Some(dia(2024, 5, 9)), StatusEmprestimo::Atrasado)]
    #[case(TipoMovimento::Emprestimo, Some(dia(2024, 5, 10)), StatusEmprestimo::EmAndamento)]
    #[case(TipoMovimento::Emprestimo, Some(dia(2024, 6, 1)), StatusEmprestimo::EmAndamento)]
    #[case(TipoMovimento::Emprestimo, None, StatusEmprestimo::SemData)]
    #[case(TipoMovimento::Entrada, Some(dia(2024, 1, 1)), StatusEmprestimo::NaoSeAplica)]
    #[case(TipoMovimento::Saida, None, StatusEmprestimo::NaoSeAplica)]
    fn status_de_emprestimo(
        #[case] tipo: TipoMovimento,
        #[case] prazo: Option<NaiveDate>,
        #[case] esperado: StatusEmprestimo,
    ) {
        assert_eq!(status_emprestimo(tipo, prazo, dia(2024, 5, 10)), esperado);
    }

    #[test]
    fn status_serializa_com_o_rotulo() {
        let json = serde_json::to_string(&StatusEmprestimo::EmAndamento).unwrap();
        assert_eq!(json, "\"Em andamento\"");
        assert_eq!(serde_json::to_string(&StatusEmprestimo::NaoSeAplica).unwrap(), "\"-\"");
    }

    #[test]
    fn emprestimo_sem_prazo_e_rejeitado() {
        let novo = NovoMovimento {
            material_id: Some(Uuid::new_v4()),
            tipo: TipoMovimento::Emprestimo,
            quantidade: 1,
            nota: String::new(),
            data_devolucao: None,
        };
        assert!(matches!(novo.validar(), Err(AppError::EmprestimoSemPrazo)));

        let com_prazo = NovoMovimento { data_devolucao: Some(dia(2024, 5, 10)), ..novo };
        assert!(com_prazo.validar().is_ok());
    }

    #[test]
    fn quantidade_negativa_e_rejeitada() {
        let novo = NovoMovimento {
            material_id: None,
            tipo: TipoMovimento::Saida,
            quantidade: -1,
            nota: String::new(),
            data_devolucao: None,
        };
        assert!(matches!(novo.validar(), Err(AppError::QuantidadeInvalida(-1))));
    }

    #[test]
    fn tipo_usa_nomes_em_maiusculas_no_json() {
        let tipo: TipoMovimento = serde_json::from_str("\"EMPRESTIMO\"").unwrap();
        assert_eq!(tipo, TipoMovimento::Emprestimo);
        assert_eq!(serde_json::to_string(&TipoMovimento::Adicao).unwrap(), "\"ADICAO\"");
    }
}
