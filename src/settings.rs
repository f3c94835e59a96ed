// ⚙️ Custom Lists - allowed registrars, categories and evaluation tools
//
// Lists are advisory: records may carry values outside them. The import
// normalizer is the only place that snaps unknown values to the list head.

use serde::{Deserialize, Serialize};

/// Registrar used when the allowed list is empty
pub const DEFAULT_FALLBACK_REGISTRAR: &str = "GoDaddy";

/// Category used when the allowed list is empty
pub const DEFAULT_FALLBACK_CATEGORY: &str = "Business";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListKind {
    Registrars,
    Categories,
    EvaluationTools,
}

impl ListKind {
    pub fn name(&self) -> &str {
        match self {
            ListKind::Registrars => "registrars",
            ListKind::Categories => "categories",
            ListKind::EvaluationTools => "evaluationTools",
        }
    }
}

/// User-editable allowed sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomLists {
    pub registrars: Vec<String>,
    pub categories: Vec<String>,
    pub evaluation_tools: Vec<String>,
}

impl Default for CustomLists {
    fn default() -> Self {
        CustomLists {
            registrars: to_strings(&["GoDaddy", "OVH", "Namecheap", "Gandi"]),
            categories: to_strings(&["Business", "Personnel", "E-commerce", "Blog", "Portfolio"]),
            evaluation_tools: to_strings(&["Atom", "DNRater", "GoDaddy", "Autre"]),
        }
    }
}

impl CustomLists {
    pub fn list(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Registrars => &self.registrars,
            ListKind::Categories => &self.categories,
            ListKind::EvaluationTools => &self.evaluation_tools,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<String> {
        match kind {
            ListKind::Registrars => &mut self.registrars,
            ListKind::Categories => &mut self.categories,
            ListKind::EvaluationTools => &mut self.evaluation_tools,
        }
    }

    /// Append a trimmed value. Blank and already-present values are ignored.
    ///
    /// Returns true if the list changed.
    pub fn add(&mut self, kind: ListKind, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }

        let list = self.list_mut(kind);
        if list.iter().any(|item| item == value) {
            return false;
        }

        list.push(value.to_string());
        true
    }

    /// Remove an exact match. Returns true if the list changed.
    pub fn remove(&mut self, kind: ListKind, value: &str) -> bool {
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|item| item != value);
        list.len() != before
    }

    pub fn contains(&self, kind: ListKind, value: &str) -> bool {
        self.list(kind).iter().any(|item| item == value)
    }
}

/// Fallbacks applied by the import normalizer when a list is empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportDefaults {
    pub fallback_registrar: String,
    pub fallback_category: String,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        ImportDefaults {
            fallback_registrar: DEFAULT_FALLBACK_REGISTRAR.to_string(),
            fallback_category: DEFAULT_FALLBACK_CATEGORY.to_string(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lists() {
        let lists = CustomLists::default();

        assert_eq!(lists.registrars[0], "GoDaddy");
        assert_eq!(lists.categories.len(), 5);
        assert!(lists.contains(ListKind::EvaluationTools, "DNRater"));
    }

    #[test]
    fn test_add_trims_and_rejects_duplicates() {
        let mut lists = CustomLists::default();

        assert!(lists.add(ListKind::Registrars, "  Porkbun "));
        assert!(lists.contains(ListKind::Registrars, "Porkbun"));

        assert!(!lists.add(ListKind::Registrars, "Porkbun"));
        assert!(!lists.add(ListKind::Registrars, "   "));
        assert_eq!(lists.registrars.len(), 5);
    }

    #[test]
    fn test_remove() {
        let mut lists = CustomLists::default();

        assert!(lists.remove(ListKind::Categories, "Blog"));
        assert!(!lists.contains(ListKind::Categories, "Blog"));
        assert!(!lists.remove(ListKind::Categories, "Blog"));
    }

    #[test]
    fn test_deserialize_partial_lists_keeps_defaults() {
        let lists: CustomLists = serde_json::from_str(r#"{"registrars": []}"#).unwrap();

        assert!(lists.registrars.is_empty());
        assert_eq!(lists.categories, CustomLists::default().categories);
    }
}
