//! Entity base type.
//!
//! Every record in the store is an [`Entity`]: an identity/timestamp envelope
//! tagged with an [`EntityKind`], plus a map of dynamic attributes attached
//! after construction. The kinds carry no fields of their own.
//!
//! The serialized form is a [`Projection`]. Turning an entity into a
//! projection and back must preserve its id and both timestamps exactly, which
//! is why timestamps are kept at microsecond precision, the precision of the
//! serialized format.

use crate::error::{EntityError, EntityResult};
use crate::id::EntityId;
use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key naming the concrete kind in a projection.
pub const CLASS_KEY: &str = "__class__";

/// Names that cannot be set through [`Entity::set`].
pub const RESERVED_ATTRIBUTES: [&str; 4] = ["id", "created_at", "updated_at", CLASS_KEY];

/// Canonical timestamp layout written to disk.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepts any (or no) fractional seconds.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// The kinds of entity the console knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// The generic base record.
    BaseModel,
    User,
    Place,
    City,
    Review,
    State,
    Amenity,
}

impl EntityKind {
    /// Every kind, in the order the console lists them.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::BaseModel,
        EntityKind::User,
        EntityKind::City,
        EntityKind::Place,
        EntityKind::Review,
        EntityKind::State,
        EntityKind::Amenity,
    ];

    /// Get the class name used in composite keys and projections.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::BaseModel => "BaseModel",
            EntityKind::User => "User",
            EntityKind::Place => "Place",
            EntityKind::City => "City",
            EntityKind::Review => "Review",
            EntityKind::State => "State",
            EntityKind::Amenity => "Amenity",
        }
    }

    /// Look up a kind by its exact class name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the composite key `"<Kind>.<id>"`.
pub fn object_key(kind: EntityKind, id: &str) -> String {
    format!("{}.{}", kind.name(), id)
}

/// A dynamic attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Interpret raw console text.
    ///
    /// All-digit text becomes an integer, then a finite float parse is tried,
    /// and anything else stays a string. Digit strings too large for `i64`
    /// fall through to the float parse. Non-finite floats are kept as text
    /// because JSON cannot represent them.
    pub fn coerce(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return AttrValue::Int(n);
            }
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => AttrValue::Float(f),
            _ => AttrValue::Str(raw.to_string()),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(n) => write!(f, "{n}"),
            AttrValue::Float(x) => write!(f, "{x:?}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        AttrValue::Float(x)
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

/// Serializable dictionary form of an entity.
///
/// The kind travels in `__class__` as a tag, never as an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "__class__")]
    pub kind: EntityKind,
    pub id: EntityId,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttrValue>,
}

/// A persisted record with identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    id: EntityId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    attributes: BTreeMap<String, AttrValue>,
}

impl Entity {
    /// Create a fresh entity with a new id and `created_at == updated_at`.
    ///
    /// This does not register the entity anywhere; use
    /// [`FileStorage::create`](crate::storage::FileStorage::create) for that.
    pub fn new(kind: EntityKind) -> Self {
        let now = now();
        Self {
            kind,
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            attributes: BTreeMap::new(),
        }
    }

    /// Rebuild an entity from its projection.
    pub fn from_projection(projection: Projection) -> EntityResult<Self> {
        Ok(Self {
            kind: projection.kind,
            id: projection.id,
            created_at: parse_timestamp(&projection.created_at)?,
            updated_at: parse_timestamp(&projection.updated_at)?,
            attributes: projection.attributes,
        })
    }

    /// Project into the serializable dictionary form.
    pub fn to_projection(&self) -> Projection {
        Projection {
            kind: self.kind,
            id: self.id.clone(),
            created_at: format_timestamp(&self.created_at),
            updated_at: format_timestamp(&self.updated_at),
            attributes: self.attributes.clone(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The composite storage key, `"<Kind>.<id>"`.
    pub fn key(&self) -> String {
        object_key(self.kind, self.id.as_str())
    }

    /// All dynamic attributes.
    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// Get one dynamic attribute.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Set a dynamic attribute, returning the previous value.
    ///
    /// Values are not validated. Only the reserved names are refused.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> EntityResult<Option<AttrValue>> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(EntityError::ReservedAttribute(name));
        }
        Ok(self.attributes.insert(name, value.into()))
    }

    /// Bump `updated_at` to now. Never moves it backwards.
    pub fn touch(&mut self) {
        self.updated_at = now().max(self.updated_at);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{\"id\": {:?}, \"created_at\": {:?}, \"updated_at\": {:?}",
            self.kind,
            self.id,
            self.id.as_str(),
            format_timestamp(&self.created_at),
            format_timestamp(&self.updated_at),
        )?;
        for (name, value) in &self.attributes {
            write!(f, ", {name:?}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Whether `name` is one of the reserved attribute names.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// Current time truncated to the precision of the serialized format.
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// Format a timestamp in the canonical, sortable form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written by [`format_timestamp`].
///
/// RFC 3339 text with an explicit offset is accepted too and normalized to UTC.
pub fn parse_timestamp(value: &str) -> EntityResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_PARSE_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|source| EntityError::Timestamp {
            value: value.to_string(),
            source,
        })
}
