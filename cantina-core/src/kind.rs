use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a cart or order line points at: a whole daily menu bought as a
/// unit, or a single dish bought à la carte. The same tag flows through
/// cart lines and order lines so merge and pricing logic is written once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineKind {
    WholeMenu,
    Dish,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::WholeMenu => "WHOLE_MENU",
            LineKind::Dish => "DISH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "WHOLE_MENU" => Some(LineKind::WholeMenu),
            "DISH" => Some(LineKind::Dish),
            _ => None,
        }
    }

    /// Uniqueness key of a line within one cart. Adding the same entity
    /// again merges into the existing line instead of duplicating it.
    pub fn line_key(&self, entity_id: Uuid) -> String {
        format!("{}:{}", self.as_str(), entity_id)
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_key_includes_kind_and_entity() {
        let id = Uuid::new_v4();
        assert_eq!(LineKind::WholeMenu.line_key(id), format!("WHOLE_MENU:{}", id));
        assert_eq!(LineKind::Dish.line_key(id), format!("DISH:{}", id));
    }

    #[test]
    fn test_parse_round_trips() {
        assert_eq!(LineKind::parse("WHOLE_MENU"), Some(LineKind::WholeMenu));
        assert_eq!(LineKind::parse("DISH"), Some(LineKind::Dish));
        assert_eq!(LineKind::parse("MENU"), None);
    }
}
