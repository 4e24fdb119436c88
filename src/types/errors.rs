use thiserror::Error;

// === AddressError ===

/// Errors raised while classifying a resource address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The address does not match any registered resource pattern.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

// === PlanError ===

/// Errors raised while turning a resolved resource into a SQL plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The resource kind does not support the requested operation.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
    /// A search was requested without query text and without a bound filter.
    #[error("No search criteria given for query")]
    MissingSearchCriteria,
    /// A projection or field name is not on the resource's allow-list.
    #[error("Column not allowed: {0}")]
    InvalidColumn(String),
    /// A sort expression could not be parsed against the allow-list.
    #[error("Invalid sort expression: {0}")]
    InvalidSort(String),
}

// === StoreError ===

/// Errors related to bookmark and label record operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record with the given internal ID was not found.
    #[error("Record not found: {0}")]
    NotFound(i64),
    /// A required field was absent from the payload.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// The bookmark URL could not be parsed or has no host.
    #[error("Invalid bookmark URL: {0}")]
    InvalidUrl(String),
    /// Underlying storage engine failure.
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] rusqlite::Error),
}

// === SessionError ===

/// Errors related to the session cookie snapshot.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A replace-all step failed; the previous cookie set was left untouched.
    #[error("Session transaction aborted: {0}")]
    TransactionAborted(rusqlite::Error),
    /// Underlying storage engine failure outside a replace-all.
    #[error("Session storage failure: {0}")]
    StorageFailure(#[from] rusqlite::Error),
}

// === SettingsError ===

/// Errors related to loading and saving store settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// The settings file could not be parsed or serialized.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
}

// === LocaleError ===

/// Errors related to localization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocaleError {
    /// The requested locale has no catalog.
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
    /// A catalog could not be parsed.
    #[error("Malformed locale catalog: {0}")]
    MalformedCatalog(String),
}

// === ProviderError ===

/// Top-level error returned by the address-based [`crate::provider::Provider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] rusqlite::Error),
}
