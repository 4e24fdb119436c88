use marksync::types::errors::*;

// === AddressError Tests ===

#[test]
fn address_error_carries_the_address() {
    let err = AddressError::InvalidAddress("content://x/y".to_string());
    assert_eq!(err.to_string(), "Invalid address: content://x/y");
}

// === PlanError Tests ===

#[test]
fn plan_error_display_variants() {
    assert_eq!(
        PlanError::UnknownResource("labels".to_string()).to_string(),
        "Unknown resource: labels"
    );
    assert_eq!(
        PlanError::MissingSearchCriteria.to_string(),
        "No search criteria given for query"
    );
    assert_eq!(
        PlanError::InvalidColumn("secret".to_string()).to_string(),
        "Column not allowed: secret"
    );
    assert_eq!(
        PlanError::InvalidSort("random()".to_string()).to_string(),
        "Invalid sort expression: random()"
    );
}

#[test]
fn plan_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(PlanError::MissingSearchCriteria);
    assert!(err.source().is_none());
}

// === StoreError Tests ===

#[test]
fn store_error_display_variants() {
    assert_eq!(StoreError::NotFound(12).to_string(), "Record not found: 12");
    assert_eq!(
        StoreError::MissingField("external_id").to_string(),
        "Missing required field: external_id"
    );
    assert_eq!(
        StoreError::InvalidUrl("nope".to_string()).to_string(),
        "Invalid bookmark URL: nope"
    );
}

#[test]
fn store_error_wraps_storage_failures() {
    let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StoreError::StorageFailure(_)));
    assert!(err.to_string().starts_with("Storage failure:"));
}

// === SessionError Tests ===

#[test]
fn session_error_display_variants() {
    let aborted = SessionError::TransactionAborted(rusqlite::Error::QueryReturnedNoRows);
    assert!(aborted.to_string().starts_with("Session transaction aborted:"));

    let storage: SessionError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(storage, SessionError::StorageFailure(_)));
}

// === SettingsError / LocaleError Tests ===

#[test]
fn settings_and_locale_error_display() {
    assert_eq!(
        SettingsError::IoError("disk full".to_string()).to_string(),
        "Settings I/O error: disk full"
    );
    assert_eq!(
        SettingsError::SerializationError("bad json".to_string()).to_string(),
        "Settings serialization error: bad json"
    );
    assert_eq!(
        LocaleError::UnsupportedLocale("xx".to_string()).to_string(),
        "Unsupported locale: xx"
    );
}

// === ProviderError Tests ===

#[test]
fn provider_error_is_transparent_over_component_errors() {
    let err: ProviderError = PlanError::MissingSearchCriteria.into();
    assert_eq!(err.to_string(), "No search criteria given for query");
    assert!(matches!(err, ProviderError::Plan(PlanError::MissingSearchCriteria)));

    let err: ProviderError = AddressError::InvalidAddress("a".to_string()).into();
    assert_eq!(err.to_string(), "Invalid address: a");

    let err: ProviderError = StoreError::NotFound(3).into();
    assert!(matches!(err, ProviderError::Store(StoreError::NotFound(3))));
}
