#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    /// The identity provider's user id. Everything else is keyed on it.
    pub(crate) external_id: String,
    pub(crate) email: String,
    pub(crate) name: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewUser {
    pub(crate) external_id: String,
    pub(crate) email: String,
    pub(crate) name: Option<String>,
}

impl NewUser {
    pub(crate) fn new(external_id: String, email: String, name: Option<String>) -> Self {
        Self {
            external_id,
            email,
            name: name.filter(|n| !n.trim().is_empty()),
        }
    }
}

impl User {
    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}
