//! Behavior configuration blocks and typed parameter access.
//!
//! A [`ParameterBlock`] is what the application hands over for one configured
//! behavior: a unique key, the registered kind to instantiate, an enabled
//! flag, a priority, and a flat string-to-string parameter map.  Behaviors
//! read their parameters in `load_parameters` through the typed accessors
//! below; a parameter falling back to its default is an explicit branch
//! (`parse_or`) and is logged.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::ParamError;

// ── Priority ──────────────────────────────────────────────────────────────────

/// Execution slot of a behavior within one step.  Pipelines run `High`
/// first and `Low` last; the order inside a slot is the configuration order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High   => "high",
            Priority::Normal => "normal",
            Priority::Low    => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high"   => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low"    => Ok(Priority::Low),
            _ => Err(ParamError::Invalid {
                name:   "priority".into(),
                value:  s.to_owned(),
                reason: "expected high, normal or low".into(),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ParameterBlock ────────────────────────────────────────────────────────────

/// Configuration of one behavior instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterBlock {
    /// Unique name of this instance, used in every diagnostic.
    pub key: String,

    /// Registered behavior kind (`"advection"`, `"dispersion"`, ...).
    pub kind: String,

    #[cfg_attr(feature = "serde", serde(default = "enabled_by_default"))]
    pub enabled: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,

    #[cfg_attr(feature = "serde", serde(default))]
    pub params: BTreeMap<String, String>,
}

#[cfg(feature = "serde")]
fn enabled_by_default() -> bool {
    true
}

impl ParameterBlock {
    /// An enabled, normal-priority block with no parameters.
    pub fn new(key: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            key:      key.into(),
            kind:     kind.into(),
            enabled:  true,
            priority: Priority::Normal,
            params:   BTreeMap::new(),
        }
    }

    /// Set one parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    // ── Access ────────────────────────────────────────────────────────────

    /// Raw value of `name`.  Blank values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Parse `name` if present.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>, ParamError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ParamError::Invalid {
                name:   name.to_owned(),
                value:  raw.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    /// Parse `name`, failing if it is absent.
    pub fn require<T>(&self, name: &str) -> Result<T, ParamError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.parse(name)?
            .ok_or_else(|| ParamError::Missing { name: name.to_owned() })
    }

    /// Parse `name`, falling back to `default` (with a warning) if absent.
    /// A present but malformed value is still an error.
    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T, ParamError>
    where
        T: FromStr + fmt::Display,
        T::Err: fmt::Display,
    {
        match self.parse(name)? {
            Some(v) => Ok(v),
            None => {
                warn!(behavior = %self.key, parameter = name, default = %default, "parameter not set, using default");
                Ok(default)
            }
        }
    }

    /// Boolean switch.  Accepts `true/false`, `yes/no`, `on/off`, `1/0`.
    /// Absent switches take `default` silently.
    pub fn flag(&self, name: &str, default: bool) -> Result<bool, ParamError> {
        let Some(raw) = self.get(name) else {
            return Ok(default);
        };
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1"  => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(ParamError::Invalid {
                name:   name.to_owned(),
                value:  raw.to_owned(),
                reason: "expected a boolean".into(),
            }),
        }
    }
}
