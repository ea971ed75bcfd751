//! Credential payloads for login, registration and account deletion.
//!
//! Handlers build these from form fields before calling the account service,
//! so the service only ever sees trimmed usernames and non-empty passwords.

use zeroize::Zeroizing;

use crate::domain::{UserValidationError, Username};

/// Errors returned when credential form values are unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// The username field was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The password field was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// The username failed [`Username`] validation.
    #[error(transparent)]
    InvalidUsername(UserValidationError),
}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        match value {
            UserValidationError::EmptyUsername => Self::EmptyUsername,
            other => Self::InvalidUsername(other),
        }
    }
}

fn require_password(password: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if password.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Username and password presented at login or for a credentialed delete.
///
/// The password keeps caller whitespace and is wiped from memory on drop.
///
/// # Examples
/// ```
/// use vault::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "pw1").expect("valid");
/// assert_eq!(creds.username().as_ref(), "alice");
/// assert_eq!(creds.password(), "pw1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw form values.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username)?;
        let password = require_password(password)?;
        Ok(Self { username, password })
    }

    /// Submitted username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Submitted plaintext password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Registration form: username, password and its confirmation.
///
/// Whether the two passwords match is checked by the account service after
/// the username availability check, so a taken username is reported first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    username: Username,
    password: Zeroizing<String>,
    confirmation: Zeroizing<String>,
}

impl RegistrationRequest {
    /// Validate raw form values.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username)?;
        let password = require_password(password)?;
        Ok(Self {
            username,
            password,
            confirmation: Zeroizing::new(confirmation.to_owned()),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Chosen plaintext password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether the confirmation repeats the password exactly.
    pub fn passwords_match(&self) -> bool {
        self.password.as_str() == self.confirmation.as_str()
    }
}
