use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::MethodRefError;

/// Scope name used in qualified keys of top-level functions.
pub const GLOBAL_SCOPE: &str = "Global";

// ── Symbol Records ──────────────────────────────────────────────────────────

/// One function or method declaration found in a source file.
///
/// Top-level functions never carry class context: `class_name` and
/// `super_class` are `None` and `is_static` is false. Use
/// [`SymbolRecord::function`] and [`SymbolRecord::method`] to build records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Name of the function or method.
    pub method_name: String,
    /// Owning class, `None` for top-level functions.
    pub class_name: Option<String>,
    /// True only for `static` class members.
    pub is_static: bool,
    /// Immediate superclass of the owning class, if it is a plain identifier.
    pub super_class: Option<String>,
    /// File the declaration was found in.
    pub source_path: PathBuf,
}

impl SymbolRecord {
    /// A top-level function declaration.
    pub fn function(name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            method_name: name.into(),
            class_name: None,
            is_static: false,
            super_class: None,
            source_path: source_path.into(),
        }
    }

    /// A method declared in the body of `class_name`.
    pub fn method(
        name: impl Into<String>,
        class_name: impl Into<String>,
        is_static: bool,
        super_class: Option<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            method_name: name.into(),
            class_name: Some(class_name.into()),
            is_static,
            super_class,
            source_path: source_path.into(),
        }
    }

    /// Whether this record is a top-level function.
    pub fn is_global(&self) -> bool {
        self.class_name.is_none()
    }

    /// The registry key of this record.
    pub fn qualified_key(&self) -> QualifiedKey {
        QualifiedKey::for_record(self)
    }
}

impl std::fmt::Display for SymbolRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.class_name {
            Some(class) => {
                if self.is_static {
                    write!(f, "static ")?;
                }
                write!(f, "{}.{}", class, self.method_name)?;
                if let Some(parent) = &self.super_class {
                    write!(f, " extends {}", parent)?;
                }
            }
            None => write!(f, "function {}", self.method_name)?,
        }
        write!(f, " ({})", self.source_path.display())
    }
}

// ── Qualified Keys ──────────────────────────────────────────────────────────

/// `"<class>.<method>"` for methods, `"Global.<function>"` for functions.
///
/// Keys identify a declaration within one file; several files may declare
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedKey(String);

impl QualifiedKey {
    pub fn new(scope: Option<&str>, name: &str) -> Self {
        Self(format!("{}.{}", scope.unwrap_or(GLOBAL_SCOPE), name))
    }

    pub fn for_record(record: &SymbolRecord) -> Self {
        Self::new(record.class_name.as_deref(), &record.method_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QualifiedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for QualifiedKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ── Collision Policy ────────────────────────────────────────────────────────

/// How a per-file registry resolves two declarations with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later declaration in source order replaces the earlier one.
    #[default]
    LastWins,
    /// The first declaration is kept, later ones are dropped.
    FirstWins,
    /// A duplicate key fails the file with [`MethodRefError::DuplicateSymbol`].
    Reject,
}

/// Policy used when none is configured.
pub const DEFAULT_COLLISION_POLICY: CollisionPolicy = CollisionPolicy::LastWins;

impl std::fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastWins => write!(f, "last-wins"),
            Self::FirstWins => write!(f, "first-wins"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for CollisionPolicy {
    type Err = MethodRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "last-wins" | "last" => Ok(Self::LastWins),
            "first-wins" | "first" => Ok(Self::FirstWins),
            "reject" | "error" => Ok(Self::Reject),
            _ => Err(MethodRefError::Config(format!(
                "unknown collision policy: {s}"
            ))),
        }
    }
}

/// Whether `path` names a source file under the given suffix (e.g. `.js`).
pub fn has_source_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}
