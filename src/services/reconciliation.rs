// src/services/reconciliation.rs

//! Regra de reconciliação de quantidade.
//!
//! Um movimento criado soma seu efeito ao material; um movimento editado
//! desfaz o efeito anterior e aplica o novo (possivelmente em outro material);
//! um movimento removido desfaz seu efeito. Movimentos sem material não
//! alteram nada.

use uuid::Uuid;

use crate::models::movimento::EstadoMovimento;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AjusteMaterial {
    pub material_id: Uuid,
    pub delta: i64,
}

/// Ajustes a aplicar, um por material, ordenados pelo id do material
/// (ordem estável de travamento entre transações concorrentes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanoAjuste {
    ajustes: Vec<AjusteMaterial>,
}

impl PlanoAjuste {
    pub fn criacao(novo: &EstadoMovimento) -> Self {
        Self::default().somar(novo, 1)
    }

    pub fn atualizacao(anterior: &EstadoMovimento, novo: &EstadoMovimento) -> Self {
        Self::default().somar(anterior, -1).somar(novo, 1)
    }

    pub fn remocao(anterior: &EstadoMovimento) -> Self {
        Self::default().somar(anterior, -1)
    }

    pub fn ajustes(&self) -> &[AjusteMaterial] {
        &self.ajustes
    }

    pub fn is_empty(&self) -> bool {
        self.ajustes.is_empty()
    }

    /// Quantidade resultante de um material após o plano.
    /// `None` se o resultado não cabe na coluna (i32); o serviço recusa o ajuste.
    pub fn quantidade_final(&self, material_id: Uuid, atual: i32) -> Option<i32> {
        let delta = self
            .ajustes
            .iter()
            .find(|a| a.material_id == material_id)
            .map_or(0, |a| a.delta);
        i32::try_from(i64::from(atual) + delta).ok()
    }

    fn somar(mut self, estado: &EstadoMovimento, fator: i64) -> Self {
        let Some(material_id) = estado.material_id else {
            return self;
        };
        let delta = estado.efeito() * fator;

        match self.ajustes.binary_search_by_key(&material_id, |a| a.material_id) {
            Ok(pos) => {
                self.ajustes[pos].delta += delta;
                if self.ajustes[pos].delta == 0 {
                    self.ajustes.remove(pos);
                }
            }
            Err(pos) if delta != 0 => {
                self.ajustes.insert(pos, AjusteMaterial { material_id, delta });
            }
            Err(_) => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movimento::TipoMovimento;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn mov(material_id: Option<Uuid>, tipo: TipoMovimento, quantidade: i32) -> EstadoMovimento {
        EstadoMovimento { material_id, tipo, quantidade }
    }

    // Livro-razão em memória: aplica planos sobre quantidades iniciais.
    struct Ledger(HashMap<Uuid, i32>);

    impl Ledger {
        fn aplicar(&mut self, plano: &PlanoAjuste) {
            for (id, quantidade) in self.0.iter_mut() {
                *quantidade = plano.quantidade_final(*id, *quantidade).unwrap();
            }
        }
    }

    #[test]
    fn entrada_de_5_sobre_10_resulta_15() {
        let caneta = Uuid::new_v4();
        let plano = PlanoAjuste::criacao(&mov(Some(caneta), TipoMovimento::Entrada, 5));
        assert_eq!(plano.quantidade_final(caneta, 10), Some(15));
    }

    #[test]
    fn saida_de_7_sobre_20_resulta_13() {
        let papel = Uuid::new_v4();
        let plano = PlanoAjuste::criacao(&mov(Some(papel), TipoMovimento::Saida, 7));
        assert_eq!(plano.quantidade_final(papel, 20), Some(13));
    }

    #[test]
    fn tipos_neutros_nao_geram_ajuste() {
        let id = Uuid::new_v4();
        for tipo in [TipoMovimento::Delete, TipoMovimento::Emprestimo, TipoMovimento::Devolvido] {
            assert!(PlanoAjuste::criacao(&mov(Some(id), tipo, 4)).is_empty());
        }
    }

    #[test]
    fn material_nulo_e_no_op() {
        assert!(PlanoAjuste::criacao(&mov(None, TipoMovimento::Entrada, 3)).is_empty());
        assert!(PlanoAjuste::remocao(&mov(None, TipoMovimento::Saida, 3)).is_empty());
    }

    #[test]
    fn edicao_no_mesmo_material_gera_um_unico_ajuste() {
        let id = Uuid::new_v4();
        let plano = PlanoAjuste::atualizacao(
            &mov(Some(id), TipoMovimento::Entrada, 5),
            &mov(Some(id), TipoMovimento::Saida, 2),
        );
        assert_eq!(plano.ajustes(), &[AjusteMaterial { material_id: id, delta: -7 }]);
    }

    #[test]
    fn edicao_sem_mudanca_de_efeito_e_vazia() {
        let id = Uuid::new_v4();
        let estado = mov(Some(id), TipoMovimento::Adicao, 8);
        assert!(PlanoAjuste::atualizacao(&estado, &estado).is_empty());
    }

    #[test]
    fn troca_de_material_desfaz_em_um_e_aplica_no_outro() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let plano = PlanoAjuste::atualizacao(
            &mov(Some(a), TipoMovimento::Entrada, 4),
            &mov(Some(b), TipoMovimento::Entrada, 4),
        );
        assert_eq!(plano.quantidade_final(a, 10), Some(6));
        assert_eq!(plano.quantidade_final(b, 10), Some(14));

        let ids: Vec<_> = plano.ajustes().iter().map(|x| x.material_id).collect();
        let mut ordenados = ids.clone();
        ordenados.sort();
        assert_eq!(ids, ordenados);
    }

    #[test]
    fn resultado_fora_do_limite_e_detectado() {
        let id = Uuid::new_v4();
        let plano = PlanoAjuste::criacao(&mov(Some(id), TipoMovimento::Entrada, i32::MAX));
        assert_eq!(plano.quantidade_final(id, 1), None);
    }

    fn tipo_strategy() -> impl Strategy<Value = TipoMovimento> {
        prop::sample::select(vec![
            TipoMovimento::Entrada,
            TipoMovimento::Saida,
            TipoMovimento::Adicao,
            TipoMovimento::Delete,
            TipoMovimento::Emprestimo,
            TipoMovimento::Devolvido,
        ])
    }

    proptest! {
        #[test]
        fn edicao_equivale_a_so_o_novo_ter_existido(
            tipo_antigo in tipo_strategy(),
            qtd_antiga in 0..1_000i32,
            mat_antigo in 0..3usize,
            tipo_novo in tipo_strategy(),
            qtd_nova in 0..1_000i32,
            mat_novo in 0..3usize,
            base in prop::array::uniform2(-1_000..1_000i32),
        ) {
            // índice 2 = sem material
            let ids = [Uuid::new_v4(), Uuid::new_v4()];
            let material = |i: usize| ids.get(i).copied();
            let antigo = mov(material(mat_antigo), tipo_antigo, qtd_antiga);
            let novo = mov(material(mat_novo), tipo_novo, qtd_nova);

            let inicial: HashMap<_, _> = ids.iter().copied().zip(base).collect();

            let mut editado = Ledger(inicial.clone());
            editado.aplicar(&PlanoAjuste::criacao(&antigo));
            editado.aplicar(&PlanoAjuste::atualizacao(&antigo, &novo));

            let mut so_novo = Ledger(inicial);
            so_novo.aplicar(&PlanoAjuste::criacao(&novo));

            prop_assert_eq!(editado.0, so_novo.0);
        }

        #[test]
        fn criar_e_remover_volta_ao_inicio(
            tipo in tipo_strategy(),
            quantidade in 0..1_000i32,
            base in -1_000..1_000i32,
        ) {
            let id = Uuid::new_v4();
            let estado = mov(Some(id), tipo, quantidade);
            let mut ledger = Ledger(HashMap::from([(id, base)]));

            ledger.aplicar(&PlanoAjuste::criacao(&estado));
            ledger.aplicar(&PlanoAjuste::remocao(&estado));
            prop_assert_eq!(ledger.0[&id], base);
        }
    }
}
