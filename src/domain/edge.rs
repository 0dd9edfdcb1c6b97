use crate::domain::method::MethodIdentity;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How a call edge was established by the analysis engine.
///
/// Opaque to the pipeline: it is carried through to the sinks by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallKind {
    // ============ Invoke instructions ============
    Static,
    Special, // constructors, private and super calls
    Virtual,
    Interface,

    // ============ Implicit calls ============
    Clinit,
    Thread,
    Executor,
    AsyncTask,
    Finalize,
    Privileged,
    NewInstance,

    // ============ Reflection ============
    ReflInvoke,
    ReflConstrNewInstance,
    ReflClassNewInstance,

    /// Any label the engine defines that is not listed above.
    Other(String),
}

impl CallKind {
    pub fn as_str(&self) -> &str {
        match self {
            CallKind::Static => "STATIC",
            CallKind::Special => "SPECIAL",
            CallKind::Virtual => "VIRTUAL",
            CallKind::Interface => "INTERFACE",
            CallKind::Clinit => "CLINIT",
            CallKind::Thread => "THREAD",
            CallKind::Executor => "EXECUTOR",
            CallKind::AsyncTask => "ASYNCTASK",
            CallKind::Finalize => "FINALIZE",
            CallKind::Privileged => "PRIVILEGED",
            CallKind::NewInstance => "NEWINSTANCE",
            CallKind::ReflInvoke => "REFL_INVOKE",
            CallKind::ReflConstrNewInstance => "REFL_CONSTR_NEWINSTANCE",
            CallKind::ReflClassNewInstance => "REFL_CLASS_NEWINSTANCE",
            CallKind::Other(label) => label,
        }
    }
}

impl FromStr for CallKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_uppercase().as_str() {
            "STATIC" => CallKind::Static,
            "SPECIAL" => CallKind::Special,
            "VIRTUAL" => CallKind::Virtual,
            "INTERFACE" => CallKind::Interface,
            "CLINIT" => CallKind::Clinit,
            "THREAD" => CallKind::Thread,
            "EXECUTOR" => CallKind::Executor,
            "ASYNCTASK" => CallKind::AsyncTask,
            "FINALIZE" => CallKind::Finalize,
            "PRIVILEGED" => CallKind::Privileged,
            "NEWINSTANCE" => CallKind::NewInstance,
            "REFL_INVOKE" => CallKind::ReflInvoke,
            "REFL_CONSTR_NEWINSTANCE" => CallKind::ReflConstrNewInstance,
            "REFL_CLASS_NEWINSTANCE" => CallKind::ReflClassNewInstance,
            _ => CallKind::Other(s.to_string()),
        };
        Ok(kind)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CallKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        let Ok(kind) = label.parse::<CallKind>();
        Ok(kind)
    }
}

/// A directed call edge: `source` may call `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "src")]
    pub source: MethodIdentity,
    #[serde(rename = "tgt")]
    pub target: MethodIdentity,
    pub kind: CallKind,
}

impl Edge {
    pub fn new(source: MethodIdentity, target: MethodIdentity, kind: CallKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}
