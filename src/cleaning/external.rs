use crate::cleaning::normalizer::coerce_int;
use crate::models::{Fuel, Gearbox, RawListing};
use crate::scrapers::extractor::{parse_digits, split_title};
use std::collections::HashMap;

/// Column names used by third-party exports, mapped to ours
pub const COLUMN_ALIASES: [(&str, &str); 7] = [
    ("Marque", "marque"),
    ("Prix", "prix_texte"),
    ("Adresse", "adresse"),
    ("Kilometrage", "kilometrage"),
    ("Boite_vitesse", "boite_vitesse"),
    ("Carburant", "carburant"),
    ("Annee", "annee"),
];

/// A table exported by another tool, kept as untyped text cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalTable {
    pub columns: Vec<String>,
    pub records: Vec<HashMap<String, String>>,
}

impl ExternalTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Add a record from cells given in column order
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record = self
            .columns
            .iter()
            .cloned()
            .zip(cells.into_iter().map(Into::into))
            .collect();
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn internal_name(column: &str) -> &str {
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == column)
        .map(|(_, name)| *name)
        .unwrap_or(column)
}

/// Convert an external table into raw listings using our column vocabulary.
///
/// When the table has no `titre_complet` column but has a brand column, the
/// brand cell is taken as the whole title and split into brand, model and
/// year. `prix` is read from the price text whenever that column exists.
pub fn from_external(table: &ExternalTable) -> Vec<RawListing> {
    let columns: Vec<&str> = table.columns.iter().map(|c| internal_name(c)).collect();
    let has = |name: &str| columns.contains(&name);
    let split_combined = !has("titre_complet") && has("marque");
    let price_from_text = has("prix_texte");

    table
        .records
        .iter()
        .map(|record| {
            let cells: HashMap<&str, &str> = record
                .iter()
                .map(|(k, v)| (internal_name(k), v.trim()))
                .filter(|(_, v)| !v.is_empty())
                .collect();
            let cell = |name: &str| cells.get(name).map(|v| v.to_string());

            let mut row = RawListing::default();

            if split_combined {
                if let Some(title) = cell("marque") {
                    let parts = split_title(&title);
                    row.marque = parts.marque;
                    row.modele = Some(parts.modele).filter(|m| !m.is_empty());
                    row.annee = parts.annee;
                    row.titre_complet = title;
                }
            } else {
                row.titre_complet = cell("titre_complet").unwrap_or_default();
                row.marque = cell("marque");
                row.modele = cell("modele");
                row.annee = cell("annee");
            }

            row.prix_texte = cell("prix_texte");
            row.prix = if price_from_text {
                row.prix_texte.as_deref().and_then(parse_digits)
            } else {
                cells.get("prix").and_then(|v| coerce_int(v))
            };

            row.adresse = cell("adresse");
            row.kilometrage = cells.get("kilometrage").and_then(|v| coerce_int(v));
            row.boite_vitesse = cells.get("boite_vitesse").and_then(|v| Gearbox::detect(v));
            row.carburant = cells.get("carburant").and_then(|v| Fuel::detect(v));
            row.categorie = cells.get("categorie").and_then(|v| v.parse().ok());
            row.url_page = cell("url_page");
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> ExternalTable {
        let mut table = ExternalTable::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().copied());
        }
        table
    }

    #[test]
    fn combined_title_is_split() {
        let t = table(
            &["Marque", "Prix", "Adresse", "Kilometrage"],
            &[&["Peugeot 3008 GT 2019", "12 500 000 F CFA", "Ouakam, Dakar", "60000"]],
        );
        let rows = from_external(&t);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.titre_complet, "Peugeot 3008 GT 2019");
        assert_eq!(row.marque.as_deref(), Some("Peugeot"));
        assert_eq!(row.modele.as_deref(), Some("3008 GT"));
        assert_eq!(row.annee.as_deref(), Some("2019"));
        assert_eq!(row.prix_texte.as_deref(), Some("12 500 000 F CFA"));
        assert_eq!(row.prix, Some(12_500_000));
        assert_eq!(row.adresse.as_deref(), Some("Ouakam, Dakar"));
        assert_eq!(row.kilometrage, Some(60_000));
    }

    #[test]
    fn brand_only_title_has_no_model() {
        let t = table(&["Marque"], &[&["Jeep"], &[""]]);
        let rows = from_external(&t);
        assert_eq!(rows[0].marque.as_deref(), Some("Jeep"));
        assert_eq!(rows[0].modele, None);
        assert_eq!(rows[1].marque, None);
        assert_eq!(rows[1].titre_complet, "");
    }

    #[test]
    fn existing_title_column_keeps_brand_as_is() {
        let t = table(
            &[
                "titre_complet",
                "Marque",
                "prix",
                "Annee",
                "Boite_vitesse",
                "Carburant",
                "categorie",
            ],
            &[&[
                "Kia Picanto 2016",
                "kia",
                "3 000 000",
                "2016",
                "Automatique",
                "Essence",
                "voitures",
            ]],
        );
        let row = &from_external(&t)[0];
        assert_eq!(row.titre_complet, "Kia Picanto 2016");
        assert_eq!(row.marque.as_deref(), Some("kia"));
        assert_eq!(row.modele, None);
        assert_eq!(row.annee.as_deref(), Some("2016"));
        // no price text column: the formatted price is not numeric
        assert_eq!(row.prix, None);
        assert_eq!(row.boite_vitesse, Some(Gearbox::Automatique));
        assert_eq!(row.carburant, Some(Fuel::Essence));
        assert_eq!(row.categorie, Some(crate::models::Category::Voitures));
    }

    #[test]
    fn malformed_numbers_are_missing() {
        let t = table(
            &["Marque", "Prix", "Kilometrage"],
            &[&["Ford Focus", "à débattre", "beaucoup"]],
        );
        let row = &from_external(&t)[0];
        assert_eq!(row.prix, None);
        assert_eq!(row.kilometrage, None);
        assert_eq!(row.annee, None);
    }
}
