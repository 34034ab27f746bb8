// Static dataset: theatres and other places visited by the court in 1786
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::category::Category;
use crate::dates::DateCode;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl PlaceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlaceId {
    fn from(s: &str) -> Self {
        PlaceId(s.to_string())
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub category: Category,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub visit_dates: Vec<DateCode>,
    #[serde(default)]
    pub latlng_verified: bool,
}

impl Place {
    pub fn day_count(&self) -> usize {
        self.visit_dates.len()
    }

    #[cfg(test)]
    pub fn test_place(id: &str, category: Category) -> Self {
        Place {
            id: PlaceId::from(id),
            name: id.to_string(),
            category,
            lat: 48.8,
            lng: 2.1,
            details: None,
            history: None,
            visit_dates: Vec::new(),
            latlng_verified: false,
        }
    }
}

#[derive(Deserialize)]
struct DatasetFile {
    theatres: Vec<Place>,
    places: Vec<Place>,
}

/// Theatres first, then the other places, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    places: Vec<Place>,
    theatre_count: usize,
}

impl Dataset {
    pub fn new(theatres: Vec<Place>, places: Vec<Place>) -> Result<Self> {
        let theatre_count = theatres.len();
        let mut all = theatres;
        all.extend(places);

        let mut seen = FxHashSet::default();
        for place in &all {
            if !seen.insert(&place.id) {
                return Err(Error::DuplicatePlace(place.id.0.clone()));
            }
        }
        Ok(Self { places: all, theatre_count })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let file: DatasetFile = serde_json::from_str(&content)
            .map_err(|source| Error::Json { path: path.to_path_buf(), source })?;
        let dataset = Self::new(file.theatres, file.places)?;
        log::info!(
            "Loaded {} theatres and {} places from {:?}",
            dataset.theatres().len(),
            dataset.others().len(),
            path
        );
        Ok(dataset)
    }

    pub fn all(&self) -> &[Place] {
        &self.places
    }

    pub fn theatres(&self) -> &[Place] {
        &self.places[..self.theatre_count]
    }

    pub fn others(&self) -> &[Place] {
        &self.places[self.theatre_count..]
    }

    pub fn get(&self, id: &PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| &p.id == id)
    }

    /// Number of places per category, indexed by `Category::index`.
    pub fn counts(&self) -> [usize; Category::COUNT] {
        let mut counts = [0; Category::COUNT];
        for place in &self.places {
            counts[place.category.index()] += 1;
        }
        counts
    }
}
