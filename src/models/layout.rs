use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    Grid,
    List,
    Carousel,
}

impl Default for LayoutVariant {
    fn default() -> Self {
        LayoutVariant::Grid
    }
}

impl LayoutVariant {
    pub const ALL: [LayoutVariant; 3] = [
        LayoutVariant::Grid,
        LayoutVariant::List,
        LayoutVariant::Carousel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutVariant::Grid => "grid",
            LayoutVariant::List => "list",
            LayoutVariant::Carousel => "carousel",
        }
    }

    /// Resolve the `layout` query value. Absent or unrecognized values fall
    /// back to [`LayoutVariant::Grid`].
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("list") => LayoutVariant::List,
            Some("carousel") => LayoutVariant::Carousel,
            _ => LayoutVariant::Grid,
        }
    }

    pub fn container_class(&self) -> &'static str {
        match self {
            LayoutVariant::Grid => "options-grid",
            LayoutVariant::List => "options-list",
            LayoutVariant::Carousel => "options-carousel",
        }
    }
}
