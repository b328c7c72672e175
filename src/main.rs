use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use dakar_auto::cleaning::SourceKind;
use dakar_auto::config::Config;
use dakar_auto::export;
use dakar_auto::models::Category;
use dakar_auto::pipeline::{self, PipelineOptions, PipelineResult};
use dakar_auto::scrapers::DakarAutoScraper;
use dakar_auto::summary::{self, DatasetSummary, RowFilter};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dakar-auto")]
#[command(about = "Scrape and clean vehicle listings from dakar-auto.com", long_about = None)]
struct Cli {
    /// Directory for CSV snapshots (overrides DAKAR_AUTO_OUTPUT_DIR)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Filters for the extra `filtered_*` snapshot
#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Keep only this brand (canonical name); repeat for several
    #[arg(long = "brand")]
    brands: Vec<String>,

    /// Lowest price kept, in F CFA (inclusive)
    #[arg(long)]
    min_price: Option<i64>,

    /// Highest price kept, in F CFA (inclusive)
    #[arg(long)]
    max_price: Option<i64>,
}

impl From<FilterArgs> for RowFilter {
    fn from(args: FilterArgs) -> Self {
        RowFilter {
            brands: args.brands,
            min_price: args.min_price,
            max_price: args.max_price,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape categories from the live site
    Scrape {
        /// Category to scrape (voitures, motos, location); repeat for several,
        /// default all
        #[arg(short, long = "category")]
        categories: Vec<Category>,

        /// Pages per category
        #[arg(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=10)
        )]
        pages: u32,

        /// Keep the raw tables only
        #[arg(long)]
        no_clean: bool,

        /// Do not write per-category raw snapshots
        #[arg(long)]
        no_save_raw: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Clean a CSV exported by another scraping tool
    Import {
        /// CSV file to clean
        file: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let output_dir = cli.output_dir.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output_dir)?;
    let now = Local::now();

    info!("🚗 Dakar Auto - Scraper & Cleaner");

    let (result, filter) = match cli.command {
        Command::Scrape {
            categories,
            pages,
            no_clean,
            no_save_raw,
            filter,
        } => {
            let options = PipelineOptions {
                categories: if categories.is_empty() {
                    Category::ALL.to_vec()
                } else {
                    categories
                },
                pages,
                auto_clean: !no_clean,
            };

            let scraper = DakarAutoScraper::with_params(config.params)?;
            let result = pipeline::run(&scraper, &options).await;

            if !no_save_raw {
                export::save_raw_snapshots(&output_dir, &result.raw, &now);
            }
            (result, RowFilter::from(filter))
        }
        Command::Import { file, filter } => {
            let table = export::read_external_csv_file(&file)?;
            info!(
                file = %file.display(),
                rows = table.len(),
                columns = table.columns.len(),
                "Imported file"
            );
            (pipeline::import_external(&table), RowFilter::from(filter))
        }
    };

    if let Some(cleaned) = &result.cleaned {
        export::save_cleaned_snapshot(&output_dir, result.source, cleaned, &now)?;

        if filter.is_active() {
            let filtered = summary::filter_rows(cleaned, &filter);
            info!(kept = filtered.len(), of = cleaned.len(), "Viewer filters applied");
            export::save_filtered_snapshot(&output_dir, result.source, &filtered, &now)?;
        }
    }

    report(&result, cli.json)
}

fn report(result: &PipelineResult, json: bool) -> Result<()> {
    for failure in &result.failures {
        eprintln!("Erreur lors du scraping de {}: {}", failure.category, failure.message);
    }

    let Some(cleaned) = &result.cleaned else {
        for (category, rows) in &result.raw {
            println!("{}: {} annonces scrapées", category, rows.len());
        }
        return Ok(());
    };

    let summary = DatasetSummary::from_rows(cleaned);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    match result.source {
        SourceKind::Native => {
            println!("\n✅ {} annonces scrapées et nettoyées\n", result.scraped_count())
        }
        SourceKind::External => println!(
            "\n✅ Avant nettoyage: {}, après nettoyage: {}\n",
            result.input_rows,
            cleaned.len()
        ),
    }

    println!("Total annonces: {}", summary.total);
    if let Some(mean) = summary.mean_price {
        println!("Prix moyen: {:.0} F CFA", mean);
    }
    println!("Marques: {}", summary.brands);
    println!("Catégories: {}", summary.categories);
    println!("Valeurs manquantes: {}", summary.missing_cells);

    println!("\nTop marques:");
    for (i, (brand, count)) in summary.top_brands.iter().enumerate() {
        println!("{}. {} ({})", i + 1, brand, count);
    }

    println!("\nRépartition par catégorie:");
    for (category, count) in &summary.by_category {
        println!("   {}: {}", category, count);
    }

    println!("\nPrix moyen par année:");
    for year in &summary.by_year {
        match year.mean_price {
            Some(mean) => println!(
                "   {}: {:.0} F CFA ({} annonces)",
                year.annee, mean, year.count
            ),
            None => println!("   {}: - ({} annonces)", year.annee, year.count),
        }
    }

    println!("\nTop villes:");
    for (city, count) in &summary.top_cities {
        println!("   {}: {}", city, count);
    }

    println!("\nDistribution des prix:");
    for bin in summary.price_histogram.iter().filter(|b| b.count > 0) {
        println!("   {:.0} - {:.0} F CFA: {}", bin.start, bin.end, bin.count);
    }

    println!("\nCorrélations:");
    let corr = &summary.correlations;
    for (i, column) in corr.columns.iter().enumerate() {
        let cells: Vec<String> = corr.matrix[i]
            .iter()
            .map(|c| c.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v)))
            .collect();
        println!("   {:<12} {}", column, cells.join("  "));
    }

    Ok(())
}
