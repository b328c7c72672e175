use crate::models::{Category, Fuel, Gearbox, RawListing};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Selector};

lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"\b(19|20)\d{2}\b").unwrap();
    static ref H2: Selector = Selector::parse("h2").unwrap();
    static ref H3: Selector = Selector::parse("h3").unwrap();
    static ref LI: Selector = Selector::parse("li").unwrap();
}

/// Brand, model and year read from a listing title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleParts {
    pub marque: Option<String>,
    /// Remaining words, possibly empty
    pub modele: String,
    pub annee: Option<String>,
}

/// Split "<Brand> <Model words> <Year>" into its parts.
///
/// The brand is the first word and the year the first `19xx`/`20xx` match
/// anywhere in the title. The model is every word after the brand, minus the
/// first word equal to the year. A model code that happens to equal the year
/// is therefore lost as well.
pub fn split_title(title: &str) -> TitleParts {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    let Some((brand, rest)) = tokens.split_first() else {
        return TitleParts::default();
    };

    let annee = YEAR_RE.find(title).map(|m| m.as_str().to_string());

    let mut model: Vec<&str> = rest.to_vec();
    if let Some(year) = annee.as_deref() {
        if let Some(pos) = model.iter().position(|t| *t == year) {
            model.remove(pos);
        }
    }

    TitleParts {
        marque: Some(brand.to_string()),
        modele: model.join(" "),
        annee,
    }
}

/// Keep only the ASCII digits of `text` and read them as an integer.
/// No digits (or an overflowing number) yields `None`, never zero.
pub fn parse_digits(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Text of an element: every text fragment trimmed, blanks dropped, glued together
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Extract one listing node. `None` means the node has no title and is skipped.
pub fn extract_listing(listing: &ElementRef<'_>, category: Category) -> Option<RawListing> {
    let title_el = listing.select(&H2).next()?;
    let title = element_text(&title_el);

    let parts = split_title(&title);
    let mut data = RawListing::new(title);
    data.marque = parts.marque;
    data.annee = parts.annee;
    if data.marque.is_some() {
        data.modele = Some(parts.modele);
    }

    if let Some(price_el) = listing.select(&H3).next() {
        let price_text = element_text(&price_el);
        data.prix = parse_digits(&price_text);
        data.prix_texte = Some(price_text);
        data.adresse = next_paragraph(&price_el).map(|p| element_text(&p));
    }

    extract_details(listing, category, &mut data);

    Some(data)
}

/// First `<p>` after `start` in document order, including `start`'s own content.
/// Walks `start`'s subtree, then the following siblings of `start` and of
/// each of its ancestors.
fn next_paragraph<'a>(start: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let start_node = **start;
    let following = std::iter::once(start_node)
        .chain(start_node.ancestors())
        .flat_map(|node| node.next_siblings())
        .flat_map(|sibling| sibling.descendants());

    start_node
        .descendants()
        .skip(1)
        .chain(following)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "p")
}

fn extract_details(listing: &ElementRef<'_>, category: Category, data: &mut RawListing) {
    for li in listing.select(&LI) {
        let text = element_text(&li).to_lowercase();

        if data.kilometrage.is_none() && text.contains("km") {
            data.kilometrage = parse_digits(&text);
        }

        if category.records_gearbox() {
            if let Some(gearbox) = Gearbox::detect(&text) {
                data.boite_vitesse = Some(gearbox);
            }
        }

        if category.records_fuel() {
            if let Some(fuel) = Fuel::detect(&text) {
                data.carburant = Some(fuel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_listing(html: &str, category: Category) -> Option<RawListing> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("div.listing").unwrap();
        let node = document.select(&selector).next().unwrap();
        extract_listing(&node, category)
    }

    #[test]
    fn splits_brand_model_year() {
        let parts = split_title("Toyota Corolla Cross 2018");
        assert_eq!(parts.marque.as_deref(), Some("Toyota"));
        assert_eq!(parts.modele, "Corolla Cross");
        assert_eq!(parts.annee.as_deref(), Some("2018"));
    }

    #[test]
    fn model_words_keep_their_order() {
        let title = "Mercedes Classe C 220 AMG Line 2015";
        let parts = split_title(title);
        let rebuilt = format!(
            "{} {} {}",
            parts.marque.unwrap(),
            parts.modele,
            parts.annee.unwrap()
        );
        assert_eq!(rebuilt, title);
        assert_eq!(parts.modele, "Classe C 220 AMG Line");
    }

    #[test]
    fn title_without_year() {
        let parts = split_title("Peugeot 208");
        assert_eq!(parts.marque.as_deref(), Some("Peugeot"));
        assert_eq!(parts.modele, "208");
        assert_eq!(parts.annee, None);
    }

    #[test]
    fn only_first_year_token_is_removed() {
        // Known limitation: a model code equal to the year is dropped, and
        // only its first occurrence goes.
        let parts = split_title("Kia 2018 Sportage 2018");
        assert_eq!(parts.annee.as_deref(), Some("2018"));
        assert_eq!(parts.modele, "Sportage 2018");
    }

    #[test]
    fn year_glued_to_a_word_stays_in_model() {
        let parts = split_title("Honda Civic 2012-2015");
        assert_eq!(parts.annee.as_deref(), Some("2012"));
        assert_eq!(parts.modele, "Civic 2012-2015");
    }

    #[test]
    fn empty_title_has_no_parts() {
        assert_eq!(split_title("   "), TitleParts::default());
    }

    #[test]
    fn digits_only_parse() {
        assert_eq!(parse_digits("5 500 000 F CFA"), Some(5_500_000));
        assert_eq!(parse_digits("45 000 km"), Some(45_000));
        assert_eq!(parse_digits("Prix sur demande"), None);
        assert_eq!(parse_digits(""), None);
        assert_eq!(parse_digits("99999999999999999999999"), None);
    }

    #[test]
    fn extracts_a_full_car_listing() {
        let html = r#"
            <div class="listing">
              <h2>Toyota Corolla 2018</h2>
              <h3>5 500 000 F CFA</h3>
              <p>Sicap Liberté, Dakar</p>
              <ul>
                <li>45 000 km</li>
                <li>Automatique</li>
                <li>Diesel</li>
              </ul>
            </div>
        "#;
        let listing = first_listing(html, Category::Voitures).unwrap();
        assert_eq!(listing.titre_complet, "Toyota Corolla 2018");
        assert_eq!(listing.marque.as_deref(), Some("Toyota"));
        assert_eq!(listing.modele.as_deref(), Some("Corolla"));
        assert_eq!(listing.annee.as_deref(), Some("2018"));
        assert_eq!(listing.prix_texte.as_deref(), Some("5 500 000 F CFA"));
        assert_eq!(listing.prix, Some(5_500_000));
        assert_eq!(listing.adresse.as_deref(), Some("Sicap Liberté, Dakar"));
        assert_eq!(listing.kilometrage, Some(45_000));
        assert_eq!(listing.boite_vitesse, Some(Gearbox::Automatique));
        assert_eq!(listing.carburant, Some(Fuel::Diesel));
    }

    #[test]
    fn node_without_title_is_skipped() {
        let html = r#"<div class="listing"><h3>1 000 F</h3></div>"#;
        assert!(first_listing(html, Category::Voitures).is_none());
    }

    #[test]
    fn non_numeric_price_is_missing() {
        let html = r#"<div class="listing"><h2>Yamaha X</h2><h3>Sur demande</h3></div>"#;
        let listing = first_listing(html, Category::Motos).unwrap();
        assert_eq!(listing.prix_texte.as_deref(), Some("Sur demande"));
        assert_eq!(listing.prix, None);
    }

    #[test]
    fn address_may_come_after_the_listing_node() {
        let html = r#"
            <div class="listing"><h2>Ford Ranger</h2><h3>9 000 000 F</h3></div>
            <p>Thiès</p>
        "#;
        let listing = first_listing(html, Category::Voitures).unwrap();
        assert_eq!(listing.adresse.as_deref(), Some("Thiès"));
    }

    #[test]
    fn address_is_searched_after_the_price_only() {
        let html = r#"
            <div class="listing">
              <p>Vendu par un particulier</p>
              <h2>Renault Clio 2014</h2>
              <div class="prix"><h3>2 800 000 F</h3></div>
              <div class="meta"><span><p>Guédiawaye</p></span></div>
              <p>Dernier paragraphe</p>
            </div>
        "#;
        let listing = first_listing(html, Category::Voitures).unwrap();
        assert_eq!(listing.adresse.as_deref(), Some("Guédiawaye"));
    }

    #[test]
    fn price_without_following_paragraph_has_no_address() {
        let html = r#"<div class="listing"><p>Avant</p><h2>Kia Rio</h2><h3>1 000 F</h3></div>"#;
        let listing = first_listing(html, Category::Voitures).unwrap();
        assert_eq!(listing.adresse, None);
    }

    #[test]
    fn first_mileage_wins() {
        let html = r#"
            <div class="listing"><h2>Kia Rio</h2>
              <ul><li>km: n/c</li><li>12 000 km</li><li>80 000 km</li></ul>
            </div>
        "#;
        let listing = first_listing(html, Category::Voitures).unwrap();
        assert_eq!(listing.kilometrage, Some(12_000));
    }

    #[test]
    fn category_gates_gearbox_and_fuel() {
        let html = r#"
            <div class="listing"><h2>Hyundai Tucson 2020</h2>
              <ul><li>Manuelle</li><li>Essence</li></ul>
            </div>
        "#;
        let location = first_listing(html, Category::Location).unwrap();
        assert_eq!(location.boite_vitesse, Some(Gearbox::Manuelle));
        assert_eq!(location.carburant, None);

        let moto = first_listing(html, Category::Motos).unwrap();
        assert_eq!(moto.boite_vitesse, None);
        assert_eq!(moto.carburant, None);
        assert_eq!(moto.kilometrage, None);
    }

    #[test]
    fn heading_text_fragments_are_trimmed_and_joined() {
        let html = r#"<div class="listing"><h2>  BMW <span> X5 </span> 2019 </h2></div>"#;
        let listing = first_listing(html, Category::Voitures).unwrap();
        assert_eq!(listing.titre_complet, "BMWX52019");
    }
}
