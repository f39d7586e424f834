//! misp-taxonomies CLI: print, search and resolve MISP machinetags.

use std::path::PathBuf;

use clap::Parser;
use miette::Result;

use misp_taxonomies::{KeyedCollection, ManifestLocation, TaxonomyCatalog};

#[derive(Parser)]
#[command(name = "misp-taxonomies", version, about = "Use MISP taxonomies")]
struct Cli {
    /// Use a local manifest file instead of the default manifest.
    #[arg(short, long, value_name = "PATH", conflicts_with = "url")]
    local: Option<PathBuf>,

    /// Use a remote manifest URL instead of the default manifest.
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Print all taxonomies as machinetags.
    #[arg(short, long)]
    all: bool,

    /// Print machinetags whose namespace, predicate or entry starts or ends with QUERY.
    #[arg(short, long, value_name = "QUERY")]
    search: Option<String>,

    /// Use expanded entry labels when searching.
    #[arg(short, long, requires = "search")]
    expanded: bool,

    /// Resolve a machinetag and describe what it refers to.
    #[arg(short, long, value_name = "MACHINETAG")]
    revert: Option<String>,

    /// Validate every taxonomy document against a JSON schema file.
    #[cfg(feature = "schema-validation")]
    #[arg(long, value_name = "SCHEMA")]
    validate: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let location = match (&cli.local, &cli.url) {
        (Some(path), _) => ManifestLocation::Local(path.clone()),
        (None, Some(url)) => ManifestLocation::Remote(url.clone()),
        (None, None) => ManifestLocation::default_location(),
    };
    let catalog = TaxonomyCatalog::load(&location)?;
    tracing::info!(
        taxonomies = catalog.len(),
        version = %catalog.version(),
        "catalog loaded"
    );

    #[cfg(feature = "schema-validation")]
    {
        if let Some(schema_path) = &cli.validate {
            let schema = misp_taxonomies::DocumentSource::LocalFile
                .load(&misp_taxonomies::Locator::Path(schema_path.clone()))?;
            catalog.validate_with_schema(&schema)?;
            println!("All {} taxonomies conform to the schema", catalog.len());
        }
    }

    if cli.all {
        print!("{}", catalog);
    }

    if let Some(query) = &cli.search {
        let hits = if cli.expanded {
            catalog.search_expanded(query)
        } else {
            catalog.search(query)
        };
        for tag in hits {
            println!("{tag}");
        }
    }

    if let Some(machinetag) = &cli.revert {
        let resolved = catalog.revert_machinetag(machinetag)?;
        let taxonomy = resolved.taxonomy;
        println!("namespace:   {} ({})", taxonomy.name(), taxonomy.description());
        println!(
            "predicate:   {}{}",
            resolved.predicate.value(),
            resolved
                .predicate
                .expanded()
                .map(|label| format!(" ({label})"))
                .unwrap_or_default()
        );
        if let Some(entry) = resolved.entry {
            println!(
                "entry:       {}{}",
                entry.value(),
                entry
                    .expanded()
                    .map(|label| format!(" ({label})"))
                    .unwrap_or_default()
            );
        }
    }

    Ok(())
}
