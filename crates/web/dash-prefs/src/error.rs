use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown preference key: {0}")]
    UnknownKey(String),

    #[error("Value {value:?} is not allowed for {key}")]
    NotAllowed { key: String, value: String },
}
