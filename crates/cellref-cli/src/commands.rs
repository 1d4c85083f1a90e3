use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;

use cellref_config::EngineConfig;
use cellref_engine::{Backends, ContentEngine, DocumentContext, InMemorySheet, Sheet};
use cellref_refs::{encode_reference, Classifier};
use cellref_store::LocalFileStore;
use cellref_types::ContentRecord;
use cellref_webhook::ReqwestTransport;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Classify(args) => cmd_classify(args, &config, &cli.format),
        Command::Encode(args) => cmd_encode(args, &config, &cli.format),
        Command::Load(args) => cmd_load(args, &config, &cli.format).await,
        Command::Save(args) => cmd_save(args, &config, &cli.format).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_classify(args: ClassifyArgs, config: &EngineConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let classifier = Classifier::new(args.editor, config.managed_urls());
    let classified = classifier.classify(&args.raw)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&classified)?),
        OutputFormat::Text => {
            println!("Kind: {}", format!("{:?}", classified.kind).cyan().bold());
            println!("Auto-loaded: {}", classified.auto_loaded);
            println!("Value: {}", classified.value);
        }
    }
    Ok(())
}

fn cmd_encode(args: EncodeArgs, config: &EngineConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let encoded = encode_reference(
        args.editor.config(),
        &config.managed_urls(),
        &args.locator,
        args.managed,
        args.auto_loaded,
    );
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "cell": encoded })),
        OutputFormat::Text => println!("{encoded}"),
    }
    Ok(())
}

async fn cmd_load(args: LoadArgs, config: &EngineConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let (engine, _) = open_engine(&args.store, config)?;
    let record = engine.load().await?;
    print_record(&record, format)
}

async fn cmd_save(args: SaveArgs, config: &EngineConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let (cell, record) = save(&args, config).await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "cell": cell, "record": record }))?
        ),
        OutputFormat::Text => {
            println!("{} Saved ({})", "✓".green().bold(), args.mode.to_string().yellow());
            println!("  Cell: {}", cell.bold());
            print_record(&record, format)?;
        }
    }
    Ok(())
}

/// Run a save and return the resulting cell value and record.
async fn save(args: &SaveArgs, config: &EngineConfig) -> anyhow::Result<(String, ContentRecord)> {
    let (engine, sheet) = open_engine(&args.store, config)?;
    let existing = ContentRecord {
        source: args.source.clone(),
        on_managed_store: args.managed,
        auto_loaded: args.auto_loaded,
        ..Default::default()
    };
    let record = engine.save(&args.content, args.mode, &existing).await?;
    Ok((sheet.read_active()?, record))
}

fn open_engine(
    store: &StoreArgs,
    config: &EngineConfig,
) -> anyhow::Result<(ContentEngine, Arc<InMemorySheet>)> {
    let files = LocalFileStore::open(&store.root, &config.project_name)
        .with_context(|| format!("opening file store at {}", store.root.display()))?;
    let transport = ReqwestTransport::new(config.request_timeout())?;
    let sheet = Arc::new(InMemorySheet::single_cell(
        &store.sheet,
        &store.key,
        &store.field,
        &store.cell,
    ));
    let engine = ContentEngine::new(
        store.editor,
        config,
        DocumentContext::in_memory(),
        Backends::new(Arc::new(files), Arc::new(transport)),
        sheet.clone(),
    );
    Ok((engine, sheet))
}

fn print_record(record: &ContentRecord, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => {
            match &record.source {
                Some(source) => println!("  Source: {}", source.cyan()),
                None => println!("  Source: {}", "inline".dimmed()),
            }
            if let Some(view) = &record.view_url {
                println!("  View: {}", view.blue());
            }
            println!(
                "  Store: {}  Auto-loaded: {}",
                if record.on_managed_store { "managed" } else { "other" },
                record.auto_loaded
            );
            println!("{}", record.content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellref_types::{EditorKind, ManagedUrls, SetMode};

    fn store_args(root: &std::path::Path, cell: &str) -> StoreArgs {
        StoreArgs {
            root: root.to_path_buf(),
            editor: EditorKind::Json,
            cell: cell.into(),
            sheet: "posts".into(),
            key: "hello".into(),
            field: "body".into(),
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            project_name: "Demo".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn new_internal_persists_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let args = SaveArgs {
            store: store_args(dir.path(), ""),
            content: "{\"saved\":1}".into(),
            mode: SetMode::NewInternal,
            source: None,
            managed: false,
            auto_loaded: false,
        };
        let (cell, record) = save(&args, &config()).await.unwrap();
        let id = record.source.unwrap();
        assert_eq!(cell, ManagedUrls::default().uc_url(&id));

        let (engine, _) = open_engine(&store_args(dir.path(), &cell), &config()).unwrap();
        let loaded = engine.load().await.unwrap();
        assert_eq!(loaded.content, "{\"saved\":1}");
        assert!(loaded.on_managed_store);
    }

    #[tokio::test]
    async fn raw_save_returns_content_as_cell() {
        let dir = tempfile::tempdir().unwrap();
        let args = SaveArgs {
            store: store_args(dir.path(), ""),
            content: "[1,2,3]".into(),
            mode: SetMode::Raw,
            source: None,
            managed: false,
            auto_loaded: false,
        };
        let (cell, _) = save(&args, &config()).await.unwrap();
        assert_eq!(cell, "[1,2,3]");
    }
}
