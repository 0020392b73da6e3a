/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text exceeded the permitted length
    #[error("Text cannot exceed {max} characters")]
    TooLong { max: usize },
    /// The input text contained a line break
    #[error("Text cannot span multiple lines")]
    MultiLine,
    /// The input was not a plausible email address
    #[error("Invalid email address")]
    InvalidEmail,
}

/// Maximum length of a patient display name.
pub const MAX_PATIENT_NAME_CHARS: usize = 30;

/// Maximum length of an email address (RFC 5321 path limit).
const MAX_EMAIL_CHARS: usize = 254;

/// A patient's display name.
///
/// This type wraps a `String` and guarantees the name is non-empty, fits on a
/// single line, and does not exceed [`MAX_PATIENT_NAME_CHARS`] characters.
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientName(String);

impl PatientName {
    /// Creates a new `PatientName` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, spans multiple lines, or is longer than
    /// [`MAX_PATIENT_NAME_CHARS`], an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(PatientName)` if the trimmed input is valid, or a
    /// `TextError` describing the first violated constraint.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.contains('\n') || trimmed.contains('\r') {
            return Err(TextError::MultiLine);
        }
        if trimmed.chars().count() > MAX_PATIENT_NAME_CHARS {
            return Err(TextError::TooLong {
                max: MAX_PATIENT_NAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An email address.
///
/// This type applies conservative guardrails rather than full RFC parsing:
/// - rejects empty or whitespace-only strings
/// - bounds the length to avoid pathological inputs
/// - requires exactly one `@` with a non-empty local part and domain
/// - restricts characters to a conservative ASCII set
///
/// The input is trimmed and lowercased during construction, so two addresses
/// differing only in case compare equal. Email uniqueness across patients
/// relies on this normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new `EmailAddress` from the given input.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(EmailAddress)` holding the normalised (trimmed, lowercased)
    /// address, or `TextError::Empty`/`TextError::TooLong`/
    /// `TextError::InvalidEmail` on violation.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.len() > MAX_EMAIL_CHARS {
            return Err(TextError::TooLong {
                max: MAX_EMAIL_CHARS,
            });
        }
        if !trimmed.is_ascii() {
            return Err(TextError::InvalidEmail);
        }

        let (local, domain) = trimmed.split_once('@').ok_or(TextError::InvalidEmail)?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(TextError::InvalidEmail);
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(TextError::InvalidEmail);
        }

        let local_ok = local
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_' | b'+'));
        let domain_ok = domain
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-'));
        if !local_ok || !domain_ok {
            return Err(TextError::InvalidEmail);
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_text_type_traits {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ty::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_text_type_traits!(PatientName);
impl_text_type_traits!(EmailAddress);
