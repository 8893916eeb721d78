use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use unlock_core::{ApiResponse, Config, Params, UnlockClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "unlock", version, about = "Unlock gazetteer CLI")]
pub struct Cli {
    /// Response format override, e.g. "json", "xml", "kml" or "txt".
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Gazetteer override, e.g. "unlock", "os" or "naturalearth".
    #[arg(long, global = true)]
    pub gazetteer: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store default parameters for future runs.
    Configure,

    /// Search for places by name.
    Search {
        /// Place name; repeat the flag to search several at once.
        #[arg(long, required = true)]
        name: Vec<String>,

        /// Restrict matches to one country.
        #[arg(long)]
        country: Option<String>,
    },

    /// Return the single closest match for a name.
    ClosestMatch {
        /// Place name.
        #[arg(long)]
        name: String,
    },

    /// Look up a feature by its identifier.
    FeatureLookup {
        /// Feature identifier.
        id: i64,
    },

    /// Look up the footprint geometry for a feature.
    FootprintLookup {
        /// Feature identifier.
        id: i64,
    },

    /// List the feature types the service supports.
    FeatureTypes,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli { format, gazetteer, command } = self;

        let config = Config::load()?;
        let mut client = UnlockClient::with_defaults(config.to_defaults());

        if let Some(format) = &format {
            client.set_response_format(format);
        }
        if let Some(gazetteer) = gazetteer {
            client.set_gazetteer(gazetteer);
        }

        let response = match command {
            Command::Configure => return configure(config),

            Command::Search { name, country } => {
                let names: Vec<&str> = name.iter().map(String::as_str).collect();
                match country {
                    Some(country) => {
                        client
                            .search_by_country_and_name(&names, &[country.as_str()], Params::new())
                            .await?
                    }
                    None => client.search_by_name(&names, Params::new()).await?,
                }
            }

            Command::ClosestMatch { name } => {
                client.closest_match_search(Params::new().with("name", name)).await?
            }

            Command::FeatureLookup { id } => {
                client.feature_lookup(Params::new().with("id", id)).await?
            }

            Command::FootprintLookup { id } => {
                client.footprint_lookup(Params::new().with("id", id)).await?
            }

            Command::FeatureTypes => client.supported_feature_types(Params::new()).await?,
        };

        print_response(&response)
    }
}

fn print_response(response: &ApiResponse) -> anyhow::Result<()> {
    match response {
        ApiResponse::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
        ApiResponse::Raw(body) => println!("{body}"),
    }

    Ok(())
}

/// Prompt for the default format and gazetteer, then persist them.
fn configure(current: Config) -> anyhow::Result<()> {
    let format = Select::new("Response format:", vec!["json", "xml", "kml", "txt"]).prompt()?;

    let gazetteer = Text::new("Gazetteer:")
        .with_default(current.gazetteer.as_deref().unwrap_or("unlock"))
        .prompt()?;

    let config =
        Config { format: Some(format.to_string()), gazetteer: Some(gazetteer), ..current };
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
