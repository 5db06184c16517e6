/// Categories every new user starts with. They are not custom, so they
/// cannot be renamed or deleted.
pub(crate) const PREDEFINED_CATEGORIES: &[&str] = &[
    "Salário",
    "Renda Extra",
    "Cartões",
    "Moradia",
    "Lazer",
    "Investimento",
    "Saúde",
    "Educação",
];

#[derive(Debug, Clone)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_custom: bool,
}

impl Category {
    /// Find a category by name (case-insensitive) in a slice.
    pub(crate) fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.trim().to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a category by ID in a slice.
    pub(crate) fn find_by_id(categories: &[Category], id: i64) -> Option<&Category> {
        categories.iter().find(|c| c.id == id)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
