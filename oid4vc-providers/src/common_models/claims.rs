use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Origin wire format of a claim set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum ClaimFormat {
    #[serde(rename = "sd-jwt")]
    #[strum(serialize = "sd-jwt")]
    SdJwt,
    #[serde(rename = "mdoc")]
    #[strum(serialize = "mdoc")]
    Mdoc,
}

impl ClaimFormat {
    /// Maps a format designation as used in presentation definitions and credential offers.
    pub fn from_designation(designation: &str) -> Option<Self> {
        match designation {
            "vc+sd-jwt" | "dc+sd-jwt" => Some(ClaimFormat::SdJwt),
            "mso_mdoc" => Some(ClaimFormat::Mdoc),
            _ => None,
        }
    }
}

/// Claims of exactly one presented credential, after decoding and integrity checks.
///
/// The value is immutable once built: parsers hand it out and every consumer only reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalClaims {
    format: ClaimFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    values: Map<String, Value>,
}

impl CanonicalClaims {
    pub fn sd_jwt(values: Map<String, Value>) -> Self {
        Self {
            format: ClaimFormat::SdJwt,
            namespace: None,
            values,
        }
    }

    pub fn mdoc(namespace: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            format: ClaimFormat::Mdoc,
            namespace: Some(namespace.into()),
            values,
        }
    }

    pub fn format(&self) -> ClaimFormat {
        self.format
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// JSON view used for JSONPath evaluation.
    ///
    /// mdoc claims are nested under their namespace (`$['org.iso.18013.5.1']['family_name']`),
    /// SD-JWT claims are the reconstructed payload itself.
    pub fn document(&self) -> Value {
        match (&self.format, &self.namespace) {
            (ClaimFormat::Mdoc, Some(namespace)) => {
                let mut document = Map::new();
                document.insert(namespace.to_owned(), Value::Object(self.values.clone()));
                Value::Object(document)
            }
            _ => Value::Object(self.values.clone()),
        }
    }

    /// Looks up a claim by dot/bracket path, e.g. `address.street` or `nationalities[0]`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path_segments(path)?.into_iter();

        let first = match segments.next()? {
            PathSegment::Key(key) => self.values.get(&key)?,
            PathSegment::Index(_) => return None,
        };

        segments.try_fold(first, |current, segment| match segment {
            PathSegment::Key(key) => current.as_object()?.get(&key),
            PathSegment::Index(index) => current.as_array()?.get(index),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

fn path_segments(path: &str) -> Option<Vec<PathSegment>> {
    let mut segments = vec![];
    let mut key = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
            }
            '[' => {
                if !key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut key)));
                }
                let index: String = chars.by_ref().take_while(|c| *c != ']').collect();
                segments.push(PathSegment::Index(index.trim().parse().ok()?));
            }
            c => key.push(c),
        }
    }

    if !key.is_empty() {
        segments.push(PathSegment::Key(key));
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
