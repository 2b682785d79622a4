//! User record data model.
//!
//! A [`UserRecord`] is identified by its [`Email`] and carries the three core
//! profile fields plus any number of extension attributes. Records are built
//! from client-submitted [`UserFields`] so field-presence and shape rules live
//! in one place, ahead of any storage access.

use std::fmt;

use serde_json::{Map, Value};

/// Field names every record carries outside the extension attributes.
pub const EMAIL_FIELD: &str = "email";
/// First name field.
pub const FIRST_NAME_FIELD: &str = "first_name";
/// Last name field.
pub const LAST_NAME_FIELD: &str = "last_name";
/// Password field.
pub const PASSWORD_FIELD: &str = "password";

/// Fields required to register a user, in the order they are checked.
pub const REQUIRED_CREATE_FIELDS: [&str; 4] = [
    LAST_NAME_FIELD,
    FIRST_NAME_FIELD,
    EMAIL_FIELD,
    PASSWORD_FIELD,
];

fn is_core_field(name: &str) -> bool {
    REQUIRED_CREATE_FIELDS.contains(&name)
}

/// Validation errors raised while building or merging user records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// A required field was absent or `null`.
    MissingField { field: &'static str },
    /// A core field was present but not a string.
    NotAString { field: String },
    /// The email has no `@` delimiter.
    InvalidEmail { value: String },
    /// An update carried no fields at all.
    EmptyUpdate,
    /// An update attempted to change the record's email.
    EmailChange { current: String, requested: String },
    /// Extension attributes may not shadow core fields.
    ReservedAttribute { name: String },
    /// The submitted payload was not a JSON object.
    NotAnObject,
}

impl UserValidationError {
    /// Name of the offending field, when one applies.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } => Some(field),
            Self::NotAString { field } => Some(field.as_str()),
            Self::InvalidEmail { .. } | Self::EmailChange { .. } => Some(EMAIL_FIELD),
            Self::ReservedAttribute { name } => Some(name.as_str()),
            Self::EmptyUpdate | Self::NotAnObject => None,
        }
    }

    /// Machine-readable reason attached to error details.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::NotAString { .. } => "not_a_string",
            Self::InvalidEmail { .. } => "invalid_email",
            Self::EmptyUpdate => "empty_update",
            Self::EmailChange { .. } => "email_immutable",
            Self::ReservedAttribute { .. } => "reserved_attribute",
            Self::NotAnObject => "not_an_object",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing required field: {field}"),
            Self::NotAString { field } => write!(f, "{field} must be a string"),
            Self::InvalidEmail { value } => write!(f, "email looks invalid: {value}"),
            Self::EmptyUpdate => write!(f, "update must contain at least one field"),
            Self::EmailChange { current, requested } => write!(
                f,
                "email cannot be changed from {current} to {requested}"
            ),
            Self::ReservedAttribute { name } => {
                write!(f, "attribute name {name} is reserved")
            }
            Self::NotAnObject => write!(f, "user fields must be a JSON object"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Unique user identifier.
///
/// ## Invariants
/// - Contains an `@` delimiter.
///
/// # Examples
/// ```
/// use user_directory::domain::Email;
///
/// assert!(Email::new("ada@example.com").is_ok());
/// assert!(Email::new("ada").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and construct an email identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if !value.contains('@') {
            return Err(UserValidationError::InvalidEmail { value });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Unvalidated JSON object submitted for registration or update.
///
/// A `null` value is treated as "absent" for core fields and as "remove" for
/// extension attributes during updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields(Map<String, Value>);

impl UserFields {
    /// Wrap an existing JSON map.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Accept any JSON value, rejecting non-objects.
    pub fn from_value(value: Value) -> Result<Self, UserValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(UserValidationError::NotAnObject),
        }
    }

    /// Look up a field, treating `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// Whether the payload carries no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over every submitted key and value.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    fn string_field(&self, name: &str) -> Result<Option<String>, UserValidationError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(UserValidationError::NotAString {
                field: name.to_owned(),
            }),
        }
    }

    fn required_string(&self, name: &'static str) -> Result<String, UserValidationError> {
        self.string_field(name)?
            .ok_or(UserValidationError::MissingField { field: name })
    }
}

impl From<Map<String, Value>> for UserFields {
    fn from(value: Map<String, Value>) -> Self {
        Self::new(value)
    }
}

/// Stored user record.
///
/// ## Invariants
/// - `email` satisfies [`Email`] validation.
/// - Extension attribute names never collide with core field names.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    email: Email,
    first_name: String,
    last_name: String,
    password: String,
    attributes: Map<String, Value>,
}

impl UserRecord {
    /// Build a record with no extension attributes.
    pub fn new(
        email: Email,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email,
            first_name: first_name.into(),
            last_name: last_name.into(),
            password: password.into(),
            attributes: Map::new(),
        }
    }

    /// Attach extension attributes, rejecting names reserved for core fields.
    pub fn try_with_attributes(
        mut self,
        attributes: Map<String, Value>,
    ) -> Result<Self, UserValidationError> {
        if let Some(name) = attributes.keys().find(|name| is_core_field(name)) {
            return Err(UserValidationError::ReservedAttribute { name: name.clone() });
        }
        self.attributes = attributes;
        Ok(self)
    }

    /// Validate a registration payload.
    ///
    /// Required fields are checked in [`REQUIRED_CREATE_FIELDS`] order, and
    /// the email is validated as soon as it is reached. Any further non-null
    /// keys become extension attributes.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use user_directory::domain::{UserFields, UserRecord, UserValidationError};
    ///
    /// let fields = UserFields::from_value(json!({
    ///     "last_name": "Lovelace",
    ///     "first_name": "Ada",
    ///     "email": "ada@example.com",
    /// }))
    /// .unwrap();
    /// let err = UserRecord::try_from_fields(&fields).unwrap_err();
    /// assert_eq!(err, UserValidationError::MissingField { field: "password" });
    /// ```
    pub fn try_from_fields(fields: &UserFields) -> Result<Self, UserValidationError> {
        let last_name = fields.required_string(LAST_NAME_FIELD)?;
        let first_name = fields.required_string(FIRST_NAME_FIELD)?;
        let email = Email::new(fields.required_string(EMAIL_FIELD)?)?;
        let password = fields.required_string(PASSWORD_FIELD)?;

        let attributes = fields
            .iter()
            .filter(|(name, value)| !is_core_field(name) && !value.is_null())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Self::new(email, first_name, last_name, password).try_with_attributes(attributes)
    }

    /// Produce the record that results from applying `fields` to `self`.
    ///
    /// The email may be repeated but never changed. Core fields must be
    /// strings. Other keys replace extension attributes, and `null` removes
    /// them.
    pub fn merged_with(&self, fields: &UserFields) -> Result<Self, UserValidationError> {
        if fields.is_empty() {
            return Err(UserValidationError::EmptyUpdate);
        }

        let mut merged = self.clone();
        for (name, value) in fields.iter() {
            match name.as_str() {
                EMAIL_FIELD => {
                    if value.as_str() != Some(self.email.as_ref()) {
                        return Err(UserValidationError::EmailChange {
                            current: self.email.to_string(),
                            requested: value
                                .as_str()
                                .map_or_else(|| value.to_string(), str::to_owned),
                        });
                    }
                }
                FIRST_NAME_FIELD => merged.first_name = core_string(name, value)?,
                LAST_NAME_FIELD => merged.last_name = core_string(name, value)?,
                PASSWORD_FIELD => merged.password = core_string(name, value)?,
                _ if value.is_null() => {
                    merged.attributes.remove(name);
                }
                _ => {
                    merged.attributes.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(merged)
    }

    /// Record identifier.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Stored password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Extension attributes outside the core fields.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Full JSON representation, password included, as signed by version
    /// tokens.
    pub fn to_json(&self) -> Value {
        let mut map = self.attributes.clone();
        map.insert(EMAIL_FIELD.to_owned(), Value::from(self.email.as_ref()));
        map.insert(FIRST_NAME_FIELD.to_owned(), Value::from(self.first_name.as_str()));
        map.insert(LAST_NAME_FIELD.to_owned(), Value::from(self.last_name.as_str()));
        map.insert(PASSWORD_FIELD.to_owned(), Value::from(self.password.as_str()));
        Value::Object(map)
    }
}

fn core_string(name: &str, value: &Value) -> Result<String, UserValidationError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| UserValidationError::NotAString {
            field: name.to_owned(),
        })
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"<redacted>")
            .field("attributes", &self.attributes)
            .finish()
    }
}
