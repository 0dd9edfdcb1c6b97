use serde::{Deserialize, Serialize};

/// Identity of one method as reported by the analysis engine.
///
/// `signature` is the dedup and upsert key: it is unique across the run and
/// determines every other field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodIdentity {
    /// Fully qualified owning type, e.g. `jadx.gui.JadxGUI`
    #[serde(rename = "class")]
    pub owning_type: String,
    #[serde(rename = "name")]
    pub simple_name: String,
    #[serde(rename = "package")]
    pub namespace: String,
    #[serde(rename = "sig")]
    pub signature: String,
}

/// Class-level key derived from a method (name + namespace).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassIdentity {
    pub name: String,
    pub namespace: String,
}

impl MethodIdentity {
    pub fn new(
        owning_type: impl Into<String>,
        simple_name: impl Into<String>,
        namespace: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            owning_type: owning_type.into(),
            simple_name: simple_name.into(),
            namespace: namespace.into(),
            signature: signature.into(),
        }
    }

    /// Build an identity whose namespace is the owning type's package prefix.
    pub fn in_owning_namespace(
        owning_type: impl Into<String>,
        simple_name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        let owning_type = owning_type.into();
        let namespace = namespace_of(&owning_type).to_string();
        Self {
            owning_type,
            simple_name: simple_name.into(),
            namespace,
            signature: signature.into(),
        }
    }

    /// Owning type without its package, e.g. `JadxGUI` or `Outer$Inner`.
    pub fn class_short_name(&self) -> &str {
        short_name_of(&self.owning_type)
    }

    /// `owningType.simpleName`, the string identifier filters are tested against.
    pub fn identifier(&self) -> String {
        let mut id = String::with_capacity(self.owning_type.len() + 1 + self.simple_name.len());
        id.push_str(&self.owning_type);
        id.push('.');
        id.push_str(&self.simple_name);
        id
    }

    pub fn class_identity(&self) -> ClassIdentity {
        ClassIdentity {
            name: self.class_short_name().to_string(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Package prefix of a fully qualified type name; empty for the default package.
pub fn namespace_of(owning_type: &str) -> &str {
    owning_type
        .rfind('.')
        .map(|idx| &owning_type[..idx])
        .unwrap_or("")
}

pub fn short_name_of(owning_type: &str) -> &str {
    owning_type
        .rfind('.')
        .map(|idx| &owning_type[idx + 1..])
        .unwrap_or(owning_type)
}
