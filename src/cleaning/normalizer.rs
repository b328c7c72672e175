use crate::models::{Category, NormalizedRow, RawListing};
use std::collections::BTreeMap;

/// Lower-case brand spelling → canonical brand name
pub const BRANDS: [(&str, &str); 19] = [
    ("peugeot", "Peugeot"),
    ("renault", "Renault"),
    ("toyota", "Toyota"),
    ("hyundai", "Hyundai"),
    ("ford", "Ford"),
    ("bmw", "BMW"),
    ("kia", "Kia"),
    ("land rover", "Land Rover"),
    ("jeep", "Jeep"),
    ("citroen", "Citroën"),
    ("mazda", "Mazda"),
    ("mitsubishi", "Mitsubishi"),
    ("honda", "Honda"),
    ("yamaha", "Yamaha"),
    ("suzuki", "Suzuki"),
    ("sym", "SYM"),
    ("ktm", "KTM"),
    ("piaggio", "Piaggio"),
    ("haouju", "Haouju"),
];

/// Localities recognised in free-text addresses, checked in this order
pub const CITIES: [&str; 15] = [
    "Dakar",
    "Thiès",
    "Saint-Louis",
    "Ziguinchor",
    "Kaolack",
    "Mbour",
    "Diourbel",
    "Louga",
    "Tambacounda",
    "Kolda",
    "Matam",
    "Kaffrine",
    "Sédhiou",
    "Rufisque",
    "Guédiawaye",
];

/// Canonical brand name: dictionary hit, or title case otherwise
pub fn canonical_brand(raw: &str) -> String {
    let lower = raw.to_lowercase();
    BRANDS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| title_case(&lower))
}

/// Upper-case the first letter of every word, lower-case the rest.
/// Any non-letter starts a new word ("mercedes-benz" → "Mercedes-Benz").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Infer the city of an address.
///
/// A known locality anywhere in the text wins; otherwise whatever follows the
/// last comma; otherwise nothing.
pub fn extract_city(address: &str) -> Option<String> {
    let lower = address.to_lowercase();
    if let Some(city) = CITIES.iter().find(|c| lower.contains(&c.to_lowercase())) {
        return Some(city.to_string());
    }

    address
        .rsplit_once(',')
        .map(|(_, last)| last.trim().to_string())
}

/// Strict numeric read of a cell. Integral decimals ("45000.0") are accepted,
/// anything else that is not a plain number is missing.
pub fn coerce_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }

    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Normalize one extracted listing
pub fn normalize(raw: RawListing) -> NormalizedRow {
    let adresse = raw.adresse.map(|a| a.trim().to_string());
    let ville = adresse.as_deref().and_then(extract_city);

    NormalizedRow {
        titre_complet: raw.titre_complet,
        marque: raw.marque.as_deref().map(canonical_brand),
        modele: raw.modele,
        annee: raw
            .annee
            .as_deref()
            .and_then(coerce_int)
            .and_then(|y| i32::try_from(y).ok()),
        prix_texte: raw.prix_texte,
        prix: raw.prix,
        adresse,
        ville,
        kilometrage: raw.kilometrage,
        boite_vitesse: raw.boite_vitesse.map(|g| g.as_str().to_string()),
        carburant: raw.carburant.map(|f| f.as_str().to_string()),
        categorie: raw.categorie,
        url_page: raw.url_page,
    }
}

pub fn normalize_all(rows: Vec<RawListing>) -> Vec<NormalizedRow> {
    rows.into_iter().map(normalize).collect()
}

/// Concatenate per-category tables, tagging every row with its category
pub fn merge_categories(tables: BTreeMap<Category, Vec<RawListing>>) -> Vec<RawListing> {
    tables
        .into_iter()
        .flat_map(|(category, rows)| {
            rows.into_iter().map(move |mut row| {
                row.categorie = Some(category);
                row
            })
        })
        .collect()
}
