//! Input validation for professor payloads.
//!
//! # Responsibility
//! - Turn a candidate draft into a validated payload or per-field errors.
//! - Hold the user-facing messages shown next to form fields.
//!
//! # Invariants
//! - Every field is evaluated; errors are not fail-fast.
//! - Repositories never call this module; it guards the UI boundary only.

use crate::model::professor::ProfessorDraft;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOME_MIN_CHARS: usize = 3;
const TELEFONE_MIN_CHARS: usize = 10;

const MSG_NOME_REQUIRED: &str = "O nome é obrigatório.";
const MSG_NOME_MIN: &str = "O nome deve ter pelo menos 3 caracteres.";
const MSG_EMAIL_INVALID: &str = "O e-mail deve ser válido.";
const MSG_TELEFONE_REQUIRED: &str = "O telefone é obrigatório.";
const MSG_TELEFONE_MIN: &str = "O telefone deve ter pelo menos 10 caracteres.";
const MSG_DATA_INVALID: &str = "A data de admissão deve ser uma data válida.";
const MSG_SALARIO_NOT_NUMBER: &str = "O salário deve ser um número.";
const MSG_SALARIO_NOT_POSITIVE: &str = "O salário deve ser um número positivo maior que zero.";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_'+\-]+(?:\.[A-Za-z0-9_'+\-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("valid email regex")
});
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

/// Professor field addressed by a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfessorField {
    Nome,
    Email,
    Telefone,
    DataAdmissao,
    Salario,
}

impl ProfessorField {
    /// Wire name of the field, as used in persisted JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nome => "nome",
            Self::Email => "email",
            Self::Telefone => "telefone",
            Self::DataAdmissao => "dataAdmissao",
            Self::Salario => "salario",
        }
    }
}

/// One field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: ProfessorField,
    pub message: &'static str,
}

/// Non-empty list of field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages reported for `field`, in evaluation order.
    pub fn messages_for(&self, field: ProfessorField) -> Vec<&'static str> {
        self.errors
            .iter()
            .filter(|error| error.field == field)
            .map(|error| error.message)
            .collect()
    }

    pub fn has_field(&self, field: ProfessorField) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field.as_str(), error.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Fully validated professor payload, ready for `ProfessorRepository::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProfessor {
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub data_admissao: NaiveDate,
    pub salario: f64,
}

impl ValidProfessor {
    pub fn into_draft(self) -> ProfessorDraft {
        ProfessorDraft {
            id: None,
            nome: Some(self.nome),
            email: Some(self.email),
            telefone: Some(self.telefone),
            data_admissao: Some(self.data_admissao.format("%Y-%m-%d").to_string()),
            salario: Some(self.salario),
        }
    }
}

/// Validates a create payload; every field is required.
pub fn validate_professor(draft: &ProfessorDraft) -> Result<ValidProfessor, ValidationErrors> {
    let mut errors = Vec::new();

    let nome = check(&mut errors, ProfessorField::Nome, check_nome(draft.nome.as_deref()));
    let email = check(&mut errors, ProfessorField::Email, check_email(draft.email.as_deref()));
    let telefone = check(
        &mut errors,
        ProfessorField::Telefone,
        check_telefone(draft.telefone.as_deref()),
    );
    let data_admissao = check(
        &mut errors,
        ProfessorField::DataAdmissao,
        check_data_admissao(draft.data_admissao.as_deref()),
    );
    let salario = check(&mut errors, ProfessorField::Salario, check_salario(draft.salario));

    match (nome, email, telefone, data_admissao, salario) {
        (Some(nome), Some(email), Some(telefone), Some(data_admissao), Some(salario))
            if errors.is_empty() =>
        {
            Ok(ValidProfessor {
                nome: nome.to_string(),
                email: email.to_string(),
                telefone: telefone.to_string(),
                data_admissao,
                salario,
            })
        }
        _ => Err(ValidationErrors { errors }),
    }
}

/// Validates an update patch; only fields present in the patch are checked.
pub fn validate_patch(patch: &ProfessorDraft) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if patch.nome.is_some() {
        check(&mut errors, ProfessorField::Nome, check_nome(patch.nome.as_deref()));
    }
    if patch.email.is_some() {
        check(&mut errors, ProfessorField::Email, check_email(patch.email.as_deref()));
    }
    if patch.telefone.is_some() {
        check(
            &mut errors,
            ProfessorField::Telefone,
            check_telefone(patch.telefone.as_deref()),
        );
    }
    if patch.data_admissao.is_some() {
        check(
            &mut errors,
            ProfessorField::DataAdmissao,
            check_data_admissao(patch.data_admissao.as_deref()),
        );
    }
    if patch.salario.is_some() {
        check(&mut errors, ProfessorField::Salario, check_salario(patch.salario));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}

fn check<T>(
    errors: &mut Vec<FieldError>,
    field: ProfessorField,
    result: Result<T, &'static str>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(FieldError { field, message });
            None
        }
    }
}

fn check_nome(value: Option<&str>) -> Result<&str, &'static str> {
    let nome = value.ok_or(MSG_NOME_REQUIRED)?;
    if nome.chars().count() < NOME_MIN_CHARS {
        return Err(MSG_NOME_MIN);
    }
    Ok(nome)
}

fn check_email(value: Option<&str>) -> Result<&str, &'static str> {
    value
        .filter(|email| EMAIL_RE.is_match(email))
        .ok_or(MSG_EMAIL_INVALID)
}

fn check_telefone(value: Option<&str>) -> Result<&str, &'static str> {
    let telefone = value.ok_or(MSG_TELEFONE_REQUIRED)?;
    if telefone.chars().count() < TELEFONE_MIN_CHARS {
        return Err(MSG_TELEFONE_MIN);
    }
    Ok(telefone)
}

fn check_data_admissao(value: Option<&str>) -> Result<NaiveDate, &'static str> {
    value
        .filter(|text| ISO_DATE_RE.is_match(text))
        .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
        .ok_or(MSG_DATA_INVALID)
}

fn check_salario(value: Option<f64>) -> Result<f64, &'static str> {
    let salario = value
        .filter(|salario| salario.is_finite())
        .ok_or(MSG_SALARIO_NOT_NUMBER)?;
    if salario <= 0.0 {
        return Err(MSG_SALARIO_NOT_POSITIVE);
    }
    Ok(salario)
}
