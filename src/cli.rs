//! Command-line front end over the listing service.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use wanderlust::ai::{GeminiClient, RegionTable};
use wanderlust::config::Config;
use wanderlust::geocoding::{GeocodingResolver, NominatimGeocoder};
use wanderlust::models::{Image, Listing, ListingForm, ListingInput, PrincipalId, ReviewInput};
use wanderlust::search::{Resolution, SearchOutcome, SearchParams, SearchRequest};
use wanderlust::store::MemoryStore;
use wanderlust::ListingService;

#[derive(Parser)]
#[command(name = "wanderlust")]
#[command(about = "Browse, search and manage travel listings")]
#[command(version)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every listing
    List,

    /// Show a listing with its reviews
    Show { id: Uuid },

    /// Search listings by query, category and countries
    Search {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Comma-separated countries
        #[arg(long)]
        countries: Option<String>,
        /// Comma-separated alternative queries tried when nothing matches
        #[arg(long)]
        fallback_queries: Option<String>,
    },

    /// Describe what you are looking for and let the AI search for it
    Recommend {
        #[arg(required = true)]
        preferences: Vec<String>,
    },

    /// Create a listing
    Create {
        #[arg(long = "as")]
        principal: String,
        #[command(flatten)]
        fields: ListingArgs,
    },

    /// Edit a listing you own; omitted fields keep their current value
    Update {
        #[arg(long = "as")]
        principal: String,
        id: Uuid,
        #[command(flatten)]
        fields: ListingArgs,
    },

    /// Delete a listing you own, with all its reviews
    Delete {
        #[arg(long = "as")]
        principal: String,
        id: Uuid,
    },

    /// Manage reviews
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },

    /// Look up coordinates for listings that have none
    Backfill {
        /// Pause before each lookup in milliseconds (default from GEOCODE_BACKFILL_DELAY_MS)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Load the bundled sample listings
    Seed {
        #[arg(long, default_value = "admin")]
        owner: String,
    },
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// Review a listing
    Add {
        #[arg(long = "as")]
        principal: String,
        listing: Uuid,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: String,
    },
    /// Delete a review you wrote
    Delete {
        #[arg(long = "as")]
        principal: String,
        listing: Uuid,
        review: Uuid,
    },
}

#[derive(Args)]
struct ListingArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// URL of an uploaded image
    #[arg(long, requires = "image_filename")]
    image_url: Option<String>,
    #[arg(long, requires = "image_url")]
    image_filename: Option<String>,
}

impl ListingArgs {
    fn image(&self) -> Option<Image> {
        match (&self.image_url, &self.image_filename) {
            (Some(url), Some(filename)) => Some(Image {
                url: url.clone(),
                filename: filename.clone(),
            }),
            _ => None,
        }
    }

    fn into_form(self) -> ListingForm {
        let image = self.image();
        ListingForm {
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            country: self.country,
            category: self.category,
            image,
        }
    }

    /// Overlay the given fields on an existing listing
    fn merge_into(self, current: &Listing) -> ListingForm {
        let base = ListingInput::from_listing(current);
        let image = self.image();
        ListingForm {
            title: Some(self.title.unwrap_or(base.title)),
            description: Some(self.description.unwrap_or(base.description)),
            price: Some(self.price.unwrap_or(base.price)),
            location: Some(self.location.unwrap_or(base.location)),
            country: Some(self.country.unwrap_or(base.country)),
            category: Some(
                self.category
                    .unwrap_or_else(|| base.category.as_str().to_string()),
            ),
            image,
        }
    }
}

async fn build_service(config: &Config) -> Result<ListingService> {
    let store = Arc::new(
        MemoryStore::open(&config.data_path)
            .await
            .with_context(|| format!("Failed to open {}", config.data_path.display()))?,
    );
    let geocoder = Arc::new(
        NominatimGeocoder::new(&config.geocoder_url, &config.geocoder_user_agent)
            .context("Failed to create geocoder")?,
    );
    let mut service = ListingService::new(store, GeocodingResolver::new(geocoder));

    if let Some(key) = &config.gemini_api_key {
        let model = Arc::new(
            GeminiClient::new(key, &config.gemini_model).context("Failed to create Gemini client")?,
        );
        let regions = match &config.regions_path {
            Some(path) => RegionTable::load(path)
                .await
                .with_context(|| format!("Failed to load region table {}", path.display()))?,
            None => RegionTable::default(),
        };
        service = service.with_language_model(model, regions);
    }

    Ok(service)
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let service = build_service(&config).await?;
    let json = cli.json;

    match cli.command {
        Commands::List => {
            let listings = service.index().await?;
            print_listings(&listings, json)?;
        }
        Commands::Show { id } => {
            let detail = service.show(id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_listings(std::slice::from_ref(&detail.listing), false)?;
                for review in &detail.reviews {
                    println!("   ★{} {} ({})", review.rating, review.comment, review.author);
                }
            }
        }
        Commands::Search {
            query,
            category,
            countries,
            fallback_queries,
        } => {
            let request = SearchRequest::from_params(SearchParams {
                query,
                category,
                countries,
                fallback_queries,
            })
            .map_err(wanderlust::AppError::from)?;
            let outcome = service.search(&request).await?;
            print_outcome(&outcome, json)?;
        }
        Commands::Recommend { preferences } => {
            let recommendation = service.recommend(&preferences.join(" ")).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&recommendation)?);
            } else {
                info!(corrected = %recommendation.corrected_input, "Interpreted request");
                println!("Searching for: {}", recommendation.redirect);
                print_outcome(&recommendation.outcome, false)?;
            }
        }
        Commands::Create { principal, fields } => {
            let listing = service
                .create_from_form(&PrincipalId::new(principal), fields.into_form())
                .await?;
            println!("New listing created successfully: {}", listing.id);
        }
        Commands::Update {
            principal,
            id,
            fields,
        } => {
            let current = service.show(id).await?.listing;
            let input = fields
                .merge_into(&current)
                .into_input()
                .map_err(wanderlust::AppError::from)?;
            let listing = service.update(&PrincipalId::new(principal), id, input).await?;
            println!("Listing updated successfully: {}", listing.id);
        }
        Commands::Delete { principal, id } => {
            service.delete(&PrincipalId::new(principal), id).await?;
            println!("Listing deleted successfully!");
        }
        Commands::Review { command } => match command {
            ReviewCommands::Add {
                principal,
                listing,
                rating,
                comment,
            } => {
                let review = service
                    .add_review(&PrincipalId::new(principal), listing, ReviewInput { rating, comment })
                    .await?;
                println!("Review added: {}", review.id);
            }
            ReviewCommands::Delete {
                principal,
                listing,
                review,
            } => {
                service
                    .delete_review(&PrincipalId::new(principal), listing, review)
                    .await?;
                println!("Review deleted!");
            }
        },
        Commands::Backfill { delay_ms } => {
            let delay = delay_ms
                .map(Duration::from_millis)
                .unwrap_or(config.backfill_delay);
            let report = service.backfill_geometry(delay).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Updated {}, unresolved {}, failed {}",
                    report.updated.len(),
                    report.unresolved.len(),
                    report.failed.len()
                );
            }
        }
        Commands::Seed { owner } => {
            let count = service.seed(&PrincipalId::new(owner)).await?;
            println!("Seeded {count} listings");
        }
    }

    Ok(())
}

fn print_outcome(outcome: &SearchOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    match &outcome.resolution {
        Resolution::Primary => {}
        Resolution::Fallback { term, .. } => {
            println!("No exact matches. Showing results for \"{term}\" instead.\n")
        }
        Resolution::CountryOnly => {
            println!("No exact matches. Showing other stays in those countries.\n")
        }
        Resolution::Trending => println!("No matches. Here is what's trending.\n"),
    }
    print_listings(&outcome.listings, false)
}

fn print_listings(listings: &[Listing], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(listings)?);
        return Ok(());
    }

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({:.0} / night)", i + 1, listing.title, listing.price);
        println!("   {}, {} · {}", listing.location, listing.country, listing.category);
        if let Some(point) = &listing.geometry {
            println!("   At: {:.4}, {:.4}", point.latitude, point.longitude);
        }
        println!("   ID: {}", listing.id);
        println!("   Reviews: {}", listing.reviews.len());
        println!();
    }
    Ok(())
}
