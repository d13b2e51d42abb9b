use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of an ingredient as carried in recipes and slot inventory, e.g. `"tequila"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientId(pub String);

impl IngredientId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IngredientId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

macro_rules! uuid_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(RecipeId, "Identifies a stored cocktail recipe.");
uuid_id!(OrderId, "Identifies a placed order.");
uuid_id!(UserId, "Identifies the user who placed an order.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_id_sorts_lexicographically() {
        let mut ids = vec![
            IngredientId::new("vodka"),
            IngredientId::new("gin"),
            IngredientId::new("tequila"),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                IngredientId::new("gin"),
                IngredientId::new("tequila"),
                IngredientId::new("vodka"),
            ]
        );
    }

    #[test]
    fn order_ids_are_distinct() {
        assert_ne!(OrderId::new(), OrderId::new());
    }
}
