// Place categories and the legend groups they are shown under
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Theatres,
    Fontainebleau,
    Versailles,
    Chasse,
    Residences,
    Normandie,
}

impl Category {
    pub const COUNT: usize = 6;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Theatres,
        Category::Fontainebleau,
        Category::Versailles,
        Category::Chasse,
        Category::Residences,
        Category::Normandie,
    ];

    /// Position in `ALL`, used to index per-category arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Theatres => "theatres",
            Category::Fontainebleau => "fontainebleau",
            Category::Versailles => "versailles",
            Category::Chasse => "chasse",
            Category::Residences => "residences",
            Category::Normandie => "normandie",
        }
    }

    /// Theatres are never filtered by the timeline.
    pub fn is_theatre(self) -> bool {
        self == Category::Theatres
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Category::Theatres => [0x9b, 0x59, 0xb6],
            Category::Fontainebleau => [0xe5, 0x73, 0x73],
            Category::Versailles => [0x64, 0xb5, 0xf6],
            Category::Chasse => [0x81, 0xc7, 0x84],
            Category::Residences => [0xff, 0xf1, 0x76],
            Category::Normandie => [0xd7, 0xcc, 0xc8],
        }
    }

    /// Label used on the category tag of the detail popup.
    pub fn label(self) -> &'static str {
        match self {
            Category::Theatres => "Principaux théâtres curiaux fréquentés en 1786",
            Category::Fontainebleau => {
                "Lieux fréquentés en saison d'automne (Fontainebleau lieu de séjour principal)"
            }
            Category::Versailles => {
                "Lieux fréquentés en saison d'hiver (Versailles lieu de séjour principal)"
            }
            Category::Chasse => "Pavillons de chasse",
            Category::Residences => "Autres résidences royales",
            Category::Normandie => "Voyage en Normandie (juin 1786)",
        }
    }

    /// Label used in the legend; shorter for theatres.
    pub fn legend_label(self) -> &'static str {
        match self {
            Category::Theatres => "Principaux théâtres curiaux",
            other => other.label(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A legend section with a "toggle whole group" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegendGroup {
    Theatres,
    Sejours,
    Autres,
}

impl LegendGroup {
    pub const ALL: [LegendGroup; 3] = [LegendGroup::Theatres, LegendGroup::Sejours, LegendGroup::Autres];

    pub fn title(self) -> &'static str {
        match self {
            LegendGroup::Theatres => "La saison théâtrale en 1786",
            LegendGroup::Sejours => "Les séjours de la cour en 1786",
            LegendGroup::Autres => "Autres séjours",
        }
    }

    pub fn members(self) -> &'static [Category] {
        match self {
            LegendGroup::Theatres => &[Category::Theatres],
            LegendGroup::Sejours => &[
                Category::Fontainebleau,
                Category::Versailles,
                Category::Chasse,
                Category::Residences,
            ],
            LegendGroup::Autres => &[Category::Normandie],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, cat) in Category::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
        }
    }

    #[test]
    fn test_every_category_in_exactly_one_group() {
        for cat in Category::ALL {
            let owners = LegendGroup::ALL.iter().filter(|g| g.members().contains(&cat)).count();
            assert_eq!(owners, 1, "{} belongs to {} groups", cat, owners);
        }
    }

    #[test]
    fn test_serde_keys() {
        let cat: Category = serde_json::from_str("\"chasse\"").unwrap();
        assert_eq!(cat, Category::Chasse);
        assert_eq!(serde_json::to_string(&Category::Normandie).unwrap(), "\"normandie\"");
        assert!(serde_json::from_str::<Category>("\"paris\"").is_err());
    }
}
