use uuid::Uuid;

/// Naming scheme for stored objects: `<prefix><uuid><suffix>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKeyPattern {
    pub prefix: String,
    pub suffix: String,
}

impl Default for ObjectKeyPattern {
    fn default() -> Self {
        Self {
            prefix: "sign_".to_string(),
            suffix: "_raw".to_string(),
        }
    }
}

impl ObjectKeyPattern {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn key_for(&self, id: &Uuid) -> String {
        format!("{}{}{}", self.prefix, id.hyphenated(), self.suffix)
    }

    /// Generates a fresh identifier together with its object key
    pub fn generate(&self) -> (Uuid, String) {
        let id = Uuid::new_v4();
        let key = self.key_for(&id);
        (id, key)
    }
}
