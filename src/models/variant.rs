//! Document variants.
//!
//! A variant names the shape of one watched table: whether it carries a
//! terms/schedule column and whether every listing in it is a summer role.

use serde::{Deserialize, Serialize};

use crate::services::RowSchema;

/// Shape and labels of one watched listing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Display label (e.g., "Summer", "Co-Op", "New Grad")
    pub label: String,

    /// Table has a terms/schedule column before the status cell
    #[serde(default)]
    pub has_terms_column: bool,

    /// Every listing is a summer role; rendered as "Summer {year}"
    #[serde(default)]
    pub is_summer_only: bool,

    /// Explicit cell layout, overriding the one derived from the flags
    #[serde(default)]
    pub schema: Option<RowSchema>,
}

impl Variant {
    pub fn summer() -> Self {
        Self {
            label: "Summer".to_string(),
            has_terms_column: false,
            is_summer_only: true,
            schema: None,
        }
    }

    pub fn co_op() -> Self {
        Self {
            label: "Co-Op".to_string(),
            has_terms_column: true,
            is_summer_only: false,
            schema: None,
        }
    }

    pub fn new_grad() -> Self {
        Self {
            label: "New Grad".to_string(),
            has_terms_column: false,
            is_summer_only: false,
            schema: None,
        }
    }

    /// Look up a preset by its CLI name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace(['_', ' '], "-").as_str() {
            "summer" => Some(Self::summer()),
            "co-op" | "coop" | "off-season" => Some(Self::co_op()),
            "new-grad" | "newgrad" => Some(Self::new_grad()),
            _ => None,
        }
    }

    /// Cell layout for rows of this variant.
    pub fn row_schema(&self) -> RowSchema {
        self.schema
            .clone()
            .unwrap_or_else(|| RowSchema::for_layout(self.has_terms_column))
    }
}
