use professores_core::{
    KeyValueSlot, MemorySlot, Persistence, Professor, ProfessorDraft, ProfessorRepository,
    SlotProfessorRepository, DEFAULT_STORAGE_KEY,
};
use std::collections::HashSet;
use std::sync::Arc;

fn draft(nome: &str) -> ProfessorDraft {
    ProfessorDraft {
        id: None,
        nome: Some(nome.to_string()),
        email: Some(format!("{}@escola.br", nome.to_lowercase())),
        telefone: Some("1198765432".to_string()),
        data_admissao: Some("2021-03-15".to_string()),
        salario: Some(3200.0),
    }
}

fn sorted(mut records: Vec<Professor>) -> Vec<Professor> {
    records.sort_by_key(|record| record.id);
    records
}

fn stored_json(slot: &MemorySlot) -> Option<String> {
    slot.get(DEFAULT_STORAGE_KEY).unwrap()
}

#[tokio::test]
async fn create_assigns_id_and_keeps_input_fields() {
    let repo = SlotProfessorRepository::new(MemorySlot::new());

    let created = repo.create(&draft("Carla")).await.unwrap();
    assert!(created.is_durable());

    let professor = created.into_value();
    assert!(professor.id > 0);
    assert_eq!(professor.nome, "Carla");
    assert_eq!(professor.email, "carla@escola.br");
    assert_eq!(professor.telefone, "1198765432");
    assert_eq!(professor.data_admissao, "2021-03-15");
    assert_eq!(professor.salario, 3200.0);

    assert_eq!(repo.find_one(professor.id).await, Some(professor));
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let repo = SlotProfessorRepository::new(MemorySlot::new());
    let mut input = draft("Davi");
    input.id = Some(42);

    let created = repo.create(&input).await.unwrap().into_value();
    assert_ne!(created.id, 42);
}

#[tokio::test]
async fn rapid_creates_never_collide() {
    let repo = SlotProfessorRepository::new(MemorySlot::new());
    let mut ids = HashSet::new();

    for index in 0..200 {
        let created = repo.create(&draft(&format!("P{index}"))).await.unwrap();
        assert!(ids.insert(created.value.id), "duplicate id {}", created.value.id);
    }
    assert_eq!(repo.get_all().await.len(), 200);
}

#[tokio::test]
async fn create_with_missing_or_empty_field_writes_nothing() {
    let slot = Arc::new(MemorySlot::new());
    let repo = SlotProfessorRepository::new(Arc::clone(&slot));

    let mut missing_email = draft("Eva");
    missing_email.email = None;
    let mut empty_phone = draft("Eva");
    empty_phone.telefone = Some(String::new());
    let mut zero_salary = draft("Eva");
    zero_salary.salario = Some(0.0);

    for input in [missing_email, empty_phone, zero_salary, ProfessorDraft::default()] {
        assert!(repo.create(&input).await.is_none());
    }

    assert!(repo.get_all().await.is_empty());
    assert!(stored_json(&slot).is_none());
}

#[tokio::test]
async fn update_merges_supplied_fields_and_preserves_id() {
    let repo = SlotProfessorRepository::new(MemorySlot::new());
    let original = repo.create(&draft("Fabio")).await.unwrap().into_value();

    let patch = ProfessorDraft {
        id: Some(original.id + 1000),
        salario: Some(5100.0),
        telefone: Some("2133334444".to_string()),
        ..ProfessorDraft::default()
    };
    let updated = repo.update(original.id, &patch).await.unwrap();
    assert!(updated.is_durable());

    let expected = Professor {
        salario: 5100.0,
        telefone: "2133334444".to_string(),
        ..original.clone()
    };
    assert_eq!(updated.value, expected);
    assert_eq!(repo.find_one(original.id).await, Some(expected));
    assert!(repo.find_one(original.id + 1000).await.is_none());
}

#[tokio::test]
async fn update_unknown_id_returns_none_and_leaves_slot_unchanged() {
    let slot = Arc::new(MemorySlot::new());
    let repo = SlotProfessorRepository::new(Arc::clone(&slot));
    repo.create(&draft("Gil")).await.unwrap();
    let before = stored_json(&slot);

    let patch = ProfessorDraft {
        nome: Some("Ghost".to_string()),
        ..ProfessorDraft::default()
    };
    assert!(repo.update(999, &patch).await.is_none());
    assert_eq!(stored_json(&slot), before);
}

#[tokio::test]
async fn destroy_removes_exactly_one_record_and_ignores_unknown_ids() {
    let repo = SlotProfessorRepository::new(MemorySlot::new());
    let first = repo.create(&draft("Hana")).await.unwrap().into_value();
    let second = repo.create(&draft("Igor")).await.unwrap().into_value();

    assert_eq!(repo.destroy(first.id).await, Persistence::Durable);
    assert_eq!(repo.get_all().await, vec![second.clone()]);

    assert_eq!(repo.destroy(first.id).await, Persistence::Durable);
    assert_eq!(repo.destroy(123).await, Persistence::Durable);
    assert_eq!(repo.get_all().await, vec![second]);
}

#[tokio::test]
async fn reload_from_slot_reproduces_in_memory_view() {
    let slot = Arc::new(MemorySlot::new());
    let repo = SlotProfessorRepository::new(Arc::clone(&slot));

    let a = repo.create(&draft("Joana")).await.unwrap().into_value();
    let b = repo.create(&draft("Kleber")).await.unwrap().into_value();
    let c = repo.create(&draft("Lia")).await.unwrap().into_value();
    let patch = ProfessorDraft {
        nome: Some("Joana Lima".to_string()),
        ..ProfessorDraft::default()
    };
    repo.update(a.id, &patch).await.unwrap();
    repo.destroy(b.id).await;

    let reloaded = SlotProfessorRepository::new(Arc::clone(&slot));
    assert_eq!(
        sorted(reloaded.get_all().await),
        sorted(repo.get_all().await)
    );
    assert_eq!(reloaded.find_one(c.id).await, Some(c.clone()));

    // Ids keep increasing after a reload.
    let d = reloaded.create(&draft("Mara")).await.unwrap().into_value();
    assert!(d.id > c.id);
}

#[tokio::test]
async fn persisted_slot_uses_wire_field_names() {
    let slot = Arc::new(MemorySlot::new());
    let repo = SlotProfessorRepository::new(Arc::clone(&slot));
    let created = repo.create(&draft("Nina")).await.unwrap().into_value();

    let json: serde_json::Value = serde_json::from_str(&stored_json(&slot).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], created.id);
    assert_eq!(records[0]["dataAdmissao"], "2021-03-15");
    assert_eq!(records[0]["salario"], 3200.0);
}

#[tokio::test]
async fn corrupt_or_empty_slot_loads_as_empty_collection() {
    for raw in ["", "   ", "not json", "{}", "null", r#"[{"id": "x"}]"#] {
        let slot = Arc::new(MemorySlot::new());
        slot.set(DEFAULT_STORAGE_KEY, raw).unwrap();

        let repo = SlotProfessorRepository::new(Arc::clone(&slot));
        assert!(repo.get_all().await.is_empty(), "{raw:?} should load empty");

        // The next mutation overwrites the unreadable value.
        repo.create(&draft("Otto")).await.unwrap();
        let reloaded = SlotProfessorRepository::new(Arc::clone(&slot));
        assert_eq!(reloaded.get_all().await.len(), 1);
    }
}

#[tokio::test]
async fn custom_storage_key_isolates_collections() {
    let slot = Arc::new(MemorySlot::new());
    let primary = SlotProfessorRepository::new(Arc::clone(&slot));
    let secondary = SlotProfessorRepository::load(Arc::clone(&slot), "professores_backup");
    assert_eq!(secondary.storage_key(), "professores_backup");

    primary.create(&draft("Paula")).await.unwrap();
    assert!(secondary.get_all().await.is_empty());
    assert!(slot.get("professores_backup").unwrap().is_none());
}

#[tokio::test]
async fn failed_save_keeps_in_memory_mutation_and_reports_it() {
    let slot = Arc::new(MemorySlot::with_quota(64));
    let repo = SlotProfessorRepository::new(Arc::clone(&slot));

    let created = repo.create(&draft("Quiteria")).await.unwrap();
    assert!(matches!(
        &created.persistence,
        Persistence::Failed { reason } if reason.contains("quota")
    ));
    assert_eq!(repo.get_all().await, vec![created.value.clone()]);

    let reloaded = SlotProfessorRepository::new(Arc::clone(&slot));
    assert!(reloaded.get_all().await.is_empty());

    // A later save that fits the quota brings the slot back in sync.
    assert!(repo.destroy(created.value.id).await.is_durable());
    assert_eq!(stored_json(&slot).as_deref(), Some("[]"));
}

#[tokio::test]
async fn non_finite_salary_patch_is_not_persisted() {
    let slot = Arc::new(MemorySlot::new());
    let repo = SlotProfessorRepository::new(Arc::clone(&slot));
    let created = repo.create(&draft("Rui")).await.unwrap().into_value();
    let before = stored_json(&slot);

    let patch = ProfessorDraft {
        salario: Some(f64::INFINITY),
        ..ProfessorDraft::default()
    };
    let updated = repo.update(created.id, &patch).await.unwrap();
    assert!(!updated.is_durable());
    assert_eq!(stored_json(&slot), before);
}
