use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use suggestions::address::{
    bounded_kladr_id, copy_data_components, kladr_specificity, significant_kladr_id, Bounds, ComposeOptions,
};
use suggestions::metrics::init_logging;
use suggestions::{
    find_match, Config, HighlightOptions, MemoryTransport, Metrics, Session, Suggestion, SuggestionType,
    ADDRESS_COMPONENTS,
};

#[derive(Parser)]
#[command(name = "suggestions", about = "Suggestion matching, highlighting and address tools")]
struct Cli {
    /// TOML configuration file; environment variables are used otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Suggestion type; defaults to the configured one.
    #[arg(short = 't', long = "type", global = true)]
    kind: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Highlights the query in each value.
    Highlight {
        #[arg(short, long)]
        query: String,
        /// Visible length budget; longer values are cut and end with an ellipsis.
        #[arg(long)]
        max_length: Option<usize>,
        values: Vec<String>,
    },
    /// Finds the suggestion matching the query in a JSON list read from stdin.
    Match {
        #[arg(short, long)]
        query: String,
    },
    /// Renders a JSON list read from stdin the way a session shows it.
    Suggest {
        #[arg(short, long)]
        query: String,
    },
    /// Composes a value from a JSON data object read from stdin.
    Compose {
        #[arg(long)]
        keep_city_district: bool,
    },
    /// Prints the significant part and level of a KLADR id.
    Kladr {
        id: String,
        /// Truncates the id to the lowest level of these bounds.
        #[arg(long)]
        bounds: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);
    Metrics::describe();
    tracing::debug!(kind = %config.session.suggestion_type, "Configuration loaded");

    if let Err(e) = run(cli, &config) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(&path.to_string_lossy())?,
        None => Config::from_env()?,
    };
    if let Some(kind) = &cli.kind {
        config.session.suggestion_type = kind.clone();
    }
    Ok(config)
}

fn read_stdin() -> anyhow::Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

/// Rendered list items, cut to the configured count, and the index matching the query.
fn suggest(config: &Config, query: &str, suggestions: Vec<Suggestion>) -> anyhow::Result<(Vec<String>, Option<usize>)> {
    let transport = Arc::new(MemoryTransport::with_suggestions(suggestions));
    let mut session = Session::new(config.session.clone(), transport)
        .with_classes(config.classes.clone())
        .with_highlighter(config.highlighter()?);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let found = runtime.block_on(session.update_suggestions(query)).len();
    let shown = match config.session.count {
        0 => found,
        count => count.min(found),
    };

    let rendered = (0..shown).filter_map(|index| session.format_result(index)).collect();
    Ok((rendered, session.find_suggestion_index(query)))
}

/// Composes `data`, keeping only the components of the configured bounds.
fn compose(config: &Config, data: &Value, keep_city_district: bool) -> anyhow::Result<String> {
    let kind = SuggestionType::resolve(&config.session.suggestion_type);
    let bounded = match (config.session.bounds.as_deref(), kind.data_components()) {
        (Some(range), Some(components)) => {
            let bounds = Bounds::resolve(range, components);
            (!bounds.is_empty())
                .then(|| Value::Object(copy_data_components(data, &bounds.value_components(), components)))
        }
        _ => None,
    };

    let options = ComposeOptions {
        save_city_district: keep_city_district,
        ..Default::default()
    };
    match kind.compose_value(bounded.as_ref().unwrap_or(data), options) {
        Some(value) => Ok(value),
        None => anyhow::bail!("{} values can't be composed from data", kind.name()),
    }
}

fn run(cli: Cli, config: &Config) -> anyhow::Result<()> {
    let kind = SuggestionType::resolve(&config.session.suggestion_type);

    match cli.command {
        Command::Highlight {
            query,
            max_length,
            values,
        } => {
            let highlighter = config.highlighter()?;
            let mut options = HighlightOptions::with_stopwords(kind.unformattable_tokens());
            if let Some(max_length) = max_length {
                options = options.max_length(max_length);
            }
            for html in highlighter.highlight_all(values.as_slice(), &query, &options) {
                println!("{}", html);
            }
        }
        Command::Match { query } => {
            let suggestions: Vec<Suggestion> = serde_json::from_str(&read_stdin()?)?;
            match find_match(&kind.matchers(), &query, &suggestions) {
                Some(index) => println!("{}\t{}", index, suggestions[index].value),
                None => {
                    tracing::info!(query = %query, candidates = suggestions.len(), "No matching suggestion");
                }
            }
        }
        Command::Suggest { query } => {
            let suggestions: Vec<Suggestion> = serde_json::from_str(&read_stdin()?)?;
            let (rendered, matched) = suggest(config, &query, suggestions)?;
            for html in rendered {
                println!("{}", html);
            }
            if let Some(index) = matched {
                println!("match\t{}", index);
            }
        }
        Command::Compose { keep_city_district } => {
            let data: Value = serde_json::from_str(&read_stdin()?)?;
            println!("{}", compose(config, &data, keep_city_district)?);
        }
        Command::Kladr { id, bounds } => {
            let significant = significant_kladr_id(&id);
            let level = kladr_specificity(&significant, ADDRESS_COMPONENTS)
                .map(|index| ADDRESS_COMPONENTS[index].id)
                .unwrap_or("unknown");
            println!("{}\t{}", significant, level);

            if let Some(range) = bounds.or_else(|| config.session.bounds.clone()) {
                let bounds = Bounds::resolve(&range, ADDRESS_COMPONENTS);
                match bounded_kladr_id(&id, &bounds.all, ADDRESS_COMPONENTS) {
                    Some(bounded) => println!("{}", bounded),
                    None => anyhow::bail!("bounds {:?} don't define a KLADR level", range),
                }
            }
        }
    }
    Ok(())
}
