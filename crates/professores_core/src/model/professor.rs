//! Professor domain model.
//!
//! # Responsibility
//! - Define the canonical professor record and its all-optional draft form.
//! - Provide merge and completeness helpers used by repository write paths.
//!
//! # Invariants
//! - `id` is assigned once at creation and never overwritten by a merge.
//! - The serialized shape is `{id, nome, email, telefone, dataAdmissao, salario}`.

use serde::{Deserialize, Serialize};

/// Stable identifier for one professor record.
///
/// Generated by the repository from the creation instant in epoch
/// milliseconds, bumped when needed to stay unique.
pub type ProfessorId = i64;

/// Canonical professor record as stored in the persisted slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: ProfessorId,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    /// ISO calendar date (`YYYY-MM-DD`).
    pub data_admissao: String,
    pub salario: f64,
}

/// Partial professor field set.
///
/// Used both as create input (all required fields must be set) and as an
/// update patch (only set fields are applied). `id` is accepted so that
/// round-tripped payloads deserialize, but repositories never honour it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessorDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfessorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_admissao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salario: Option<f64>,
}

impl Professor {
    /// Builds a record from a draft, assigning `id`.
    ///
    /// Returns `None` when any required field is missing or falsy: empty
    /// text, or a `salario` that is zero or NaN.
    pub fn from_draft(id: ProfessorId, draft: &ProfessorDraft) -> Option<Self> {
        let nome = non_empty(draft.nome.as_deref())?;
        let email = non_empty(draft.email.as_deref())?;
        let telefone = non_empty(draft.telefone.as_deref())?;
        let data_admissao = non_empty(draft.data_admissao.as_deref())?;
        let salario = draft.salario.filter(|value| *value != 0.0 && !value.is_nan())?;

        Some(Self {
            id,
            nome: nome.to_string(),
            email: email.to_string(),
            telefone: telefone.to_string(),
            data_admissao: data_admissao.to_string(),
            salario,
        })
    }

    /// Returns a copy with every field set in `patch` overwritten.
    ///
    /// `id` always comes from `self`, even when the patch carries one.
    pub fn merged(&self, patch: &ProfessorDraft) -> Self {
        Self {
            id: self.id,
            nome: patch.nome.clone().unwrap_or_else(|| self.nome.clone()),
            email: patch.email.clone().unwrap_or_else(|| self.email.clone()),
            telefone: patch
                .telefone
                .clone()
                .unwrap_or_else(|| self.telefone.clone()),
            data_admissao: patch
                .data_admissao
                .clone()
                .unwrap_or_else(|| self.data_admissao.clone()),
            salario: patch.salario.unwrap_or(self.salario),
        }
    }
}

impl ProfessorDraft {
    /// Returns whether the draft sets no field other than `id`.
    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.email.is_none()
            && self.telefone.is_none()
            && self.data_admissao.is_none()
            && self.salario.is_none()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
