use super::*;
use crate::storage::MemoryStore;

fn store() -> (Arc<MemoryStore>, SettingsStore) {
    let backend = Arc::new(MemoryStore::new());
    let settings = SettingsStore::new(backend.clone());
    (backend, settings)
}

fn saved(backend: &MemoryStore) -> Value {
    serde_json::from_str(&backend.get(SETTINGS_KEY).unwrap().unwrap()).unwrap()
}

// =============================================================
// load
// =============================================================

#[test]
fn load_without_saved_blob_yields_defaults() {
    let (_, mut settings) = store();
    assert_eq!(settings.load().unwrap(), &ModelParameters::default());
}

#[test]
fn load_round_trips_persisted_params() {
    let (backend, mut settings) = store();
    let params = ModelParameters {
        provider: Provider::Google,
        model: "gemini-2.0-flash".into(),
        temperature: 1.5,
        max_tokens: 2048,
        top_p: 0.25,
        seed: Some(1234),
        system_prompt: "Be terse.".into(),
        api_key: "sk-abc".into(),
    };
    save_json(backend.as_ref(), SETTINGS_KEY, &params).unwrap();

    assert_eq!(settings.load().unwrap(), &params);
}

#[test]
fn load_merges_old_blob_over_defaults() {
    let (backend, mut settings) = store();
    backend
        .set(SETTINGS_KEY, r#"{"model":"gpt-4","temperature":0.1,"legacyField":true}"#)
        .unwrap();

    let params = settings.load().unwrap();
    assert_eq!(params.model, "gpt-4");
    assert!((params.temperature - 0.1).abs() < f64::EPSILON);
    assert_eq!(params.max_tokens, 1000);
    assert_eq!(params.provider, Provider::OpenAi);
}

#[test]
fn load_null_numerics_fall_back_to_field_defaults() {
    let (backend, mut settings) = store();
    backend
        .set(
            SETTINGS_KEY,
            r#"{"provider":"openai","model":"gpt-4","temperature":null,"maxTokens":null,"topP":0.5,"seed":null,"systemPrompt":"hi"}"#,
        )
        .unwrap();

    let params = settings.load().unwrap();
    assert!((params.temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);
    assert_eq!(params.max_tokens, DEFAULT_MAX_TOKENS);
    assert!((params.top_p - 0.5).abs() < f64::EPSILON);
    assert_eq!(params.seed, None);
    assert_eq!(params.model, "gpt-4");
    assert_eq!(params.system_prompt, "hi");
}

#[test]
fn load_unknown_provider_falls_back_and_reconciles_model() {
    let (backend, mut settings) = store();
    backend.set(SETTINGS_KEY, r#"{"provider":"local","model":"local","maxTokens":"lots"}"#).unwrap();

    let params = settings.load().unwrap();
    assert_eq!(params.provider, Provider::OpenAi);
    assert_eq!(params.model, "gpt-4o");
    assert_eq!(params.max_tokens, DEFAULT_MAX_TOKENS);
}

#[test]
fn load_replaces_model_the_provider_no_longer_offers() {
    let (backend, mut settings) = store();
    backend.set(SETTINGS_KEY, r#"{"provider":"google","model":"gemini-1.5-pro"}"#).unwrap();

    let params = settings.load().unwrap();
    assert_eq!(params.provider, Provider::Google);
    assert_eq!(params.model, "gemini-2.5-flash");
    assert!(Provider::Google.offers(&params.model));
}

#[test]
fn load_non_object_json_yields_defaults() {
    let (backend, mut settings) = store();
    backend.set(SETTINGS_KEY, "42").unwrap();
    assert_eq!(settings.load().unwrap(), &ModelParameters::default());
}

#[test]
fn reconcile_model_keeps_offered_model() {
    let (_, mut settings) = store();
    settings.update(SettingField::Model, "gpt-4").unwrap();
    assert!(!settings.reconcile_model());
    assert_eq!(settings.params().model, "gpt-4");

    settings.update(SettingField::Provider, "google").unwrap();
    assert!(settings.reconcile_model());
    assert_eq!(settings.params().model, "gemini-2.5-flash");
}

#[test]
fn load_corrupt_blob_is_decode_error() {
    let (backend, mut settings) = store();
    backend.set(SETTINGS_KEY, "{oops").unwrap();
    assert!(matches!(settings.load(), Err(StorageError::Decode { .. })));
}

// =============================================================
// update
// =============================================================

#[test]
fn update_coerces_and_persists_each_change() {
    let (backend, mut settings) = store();
    settings.update(SettingField::Temperature, "1.3").unwrap();
    assert_eq!(saved(&backend)["temperature"], 1.3);

    settings.update(SettingField::MaxTokens, "512").unwrap();
    assert_eq!(saved(&backend)["maxTokens"], 512);

    settings.update(SettingField::TopP, "0.9").unwrap();
    settings.update(SettingField::SystemPrompt, "You are a pirate.").unwrap();
    settings.update(SettingField::ApiKey, "k").unwrap();
    let blob = saved(&backend);
    assert_eq!(blob["topP"], 0.9);
    assert_eq!(blob["systemPrompt"], "You are a pirate.");
    assert_eq!(blob["apiKey"], "k");
}

#[test]
fn update_invalid_numbers_fall_back_to_defaults() {
    let (_, mut settings) = store();
    settings.update(SettingField::Temperature, "hot").unwrap();
    settings.update(SettingField::MaxTokens, "lots").unwrap();
    settings.update(SettingField::TopP, "NaN").unwrap();
    let p = settings.params();
    assert!((p.temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);
    assert_eq!(p.max_tokens, DEFAULT_MAX_TOKENS);
    assert!((p.top_p - DEFAULT_TOP_P).abs() < f64::EPSILON);
}

#[test]
fn update_max_tokens_accepts_slider_float() {
    let (_, mut settings) = store();
    settings.update(SettingField::MaxTokens, "1500.0").unwrap();
    assert_eq!(settings.params().max_tokens, 1500);
}

#[test]
fn update_seed_empty_or_invalid_clears_it() {
    let (backend, mut settings) = store();
    settings.update(SettingField::Seed, "42").unwrap();
    assert_eq!(settings.params().seed, Some(42));

    settings.update(SettingField::Seed, "").unwrap();
    assert_eq!(settings.params().seed, None);
    assert!(saved(&backend)["seed"].is_null());

    settings.update(SettingField::Seed, "abc").unwrap();
    assert_eq!(settings.params().seed, None);
}

#[test]
fn update_unknown_provider_keeps_current() {
    let (_, mut settings) = store();
    settings.update(SettingField::Provider, "google").unwrap();
    settings.update(SettingField::Provider, "mistral").unwrap();
    assert_eq!(settings.params().provider, Provider::Google);
}

#[test]
fn update_surfaces_storage_errors() {
    let backend = Arc::new(MemoryStore::with_quota(10));
    let mut settings = SettingsStore::new(backend);
    let err = settings.update(SettingField::Model, "gpt-4o").unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { .. }));
}

// =============================================================
// reset / seed
// =============================================================

#[test]
fn reset_declined_changes_nothing() {
    let (_, mut settings) = store();
    settings.update(SettingField::Model, "gpt-4").unwrap();
    assert!(!settings.reset(&|_: &str| false).unwrap());
    assert_eq!(settings.params().model, "gpt-4");
}

#[test]
fn reset_confirmed_restores_defaults_and_persists() {
    let (backend, mut settings) = store();
    settings.update(SettingField::Model, "gpt-4").unwrap();

    let asked = std::cell::RefCell::new(String::new());
    let confirmed = settings
        .reset(&|q: &str| {
            asked.borrow_mut().push_str(q);
            true
        })
        .unwrap();

    assert!(confirmed);
    assert_eq!(asked.borrow().as_str(), RESET_QUESTION);
    assert_eq!(settings.params(), &ModelParameters::default());
    assert_eq!(saved(&backend)["model"], "gpt-3.5-turbo");
}

#[test]
fn randomize_seed_stays_in_range_and_persists() {
    let (backend, mut settings) = store();
    let seed = settings.randomize_seed().unwrap();
    assert!((0..SEED_RANGE_END).contains(&seed));
    assert_eq!(saved(&backend)["seed"], seed);
}
