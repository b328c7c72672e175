use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder written into text columns that carry no value
pub const NOT_SPECIFIED: &str = "Non spécifié";

/// Listing category on dakar-auto.com
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Voitures,
    Motos,
    Location,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Voitures, Category::Motos, Category::Location];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Voitures => "voitures",
            Category::Motos => "motos",
            Category::Location => "location",
        }
    }

    /// Listing page for the category (page 1)
    pub fn source_url(&self) -> &'static str {
        match self {
            Category::Voitures => "https://dakar-auto.com/senegal/voitures-4",
            Category::Motos => "https://dakar-auto.com/senegal/motos-and-scooters-3",
            Category::Location => "https://dakar-auto.com/senegal/location-de-voitures-19",
        }
    }

    pub fn records_gearbox(&self) -> bool {
        matches!(self, Category::Voitures | Category::Location)
    }

    pub fn records_fuel(&self) -> bool {
        matches!(self, Category::Voitures)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "voitures" => Ok(Category::Voitures),
            "motos" => Ok(Category::Motos),
            "location" => Ok(Category::Location),
            other => anyhow::bail!("unknown category: {}", other),
        }
    }
}

/// Transmission type read from listing bullets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gearbox {
    Automatique,
    Manuelle,
}

impl Gearbox {
    /// Detects the gearbox in free text; "automatique" is checked first.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("automatique") {
            Some(Gearbox::Automatique)
        } else if lower.contains("manuelle") {
            Some(Gearbox::Manuelle)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gearbox::Automatique => "Automatique",
            Gearbox::Manuelle => "Manuelle",
        }
    }
}

/// Fuel type read from listing bullets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Fuel {
    Diesel,
    Essence,
}

impl Fuel {
    /// Detects the fuel in free text; "diesel" is checked first.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("diesel") {
            Some(Fuel::Diesel)
        } else if lower.contains("essence") {
            Some(Fuel::Essence)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fuel::Diesel => "Diesel",
            Fuel::Essence => "Essence",
        }
    }
}

/// One listing as extracted from a category page, before cleaning
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawListing {
    pub titre_complet: String,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub annee: Option<String>,
    pub prix_texte: Option<String>,
    pub prix: Option<i64>,
    pub adresse: Option<String>,
    pub kilometrage: Option<i64>,
    pub boite_vitesse: Option<Gearbox>,
    pub carburant: Option<Fuel>,
    pub categorie: Option<Category>,
    pub url_page: Option<String>,
}

impl RawListing {
    pub fn new(titre_complet: impl Into<String>) -> Self {
        Self {
            titre_complet: titre_complet.into(),
            ..Default::default()
        }
    }
}

/// Cleaned listing row; the column order is the CSV column order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRow {
    pub titre_complet: String,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub annee: Option<i32>,
    pub prix_texte: Option<String>,
    pub prix: Option<i64>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub kilometrage: Option<i64>,
    pub boite_vitesse: Option<String>,
    pub carburant: Option<String>,
    pub categorie: Option<Category>,
    pub url_page: Option<String>,
}
