//! kmanager CLI: command-line front end for the knowledge manager API.
//!
//! Set KMANAGER_API_URL (or API_URL); see `ClientConfig::from_env` for the rest.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kmanager_api_client::{
    ApiClient, ContentGridSource, ContentSubmission, DocumentListSource, DocumentSubmission,
    PageSource, PagedList, TutorialGeneration, TutorialListSource, UrlIngestion,
};
use kmanager_cli::render;
use kmanager_cli::{
    check_path, init_tracing, parse_tags, print_json, read_upload_file, watch_progress,
    OutputFormat,
};
use kmanager_core::models::{ContentType, SearchParams, ALL_COLLECTIONS};
use kmanager_core::ErrorMetadata;

#[derive(Parser)]
#[command(name = "kmanager", about = "Knowledge manager CLI")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest an article, YouTube video or TikTok URL
    Submit {
        url: String,
        /// Content type: article, youtube, tiktok
        #[arg(long = "type", default_value = "article")]
        content_type: ContentType,
        /// Skip automatic tutorial generation
        #[arg(long)]
        no_tutorial: bool,
    },
    /// Upload a document (pdf, doc, txt, md)
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Document title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Browse and manage ingested content
    Content {
        #[command(subcommand)]
        sub: ContentCommands,
    },
    /// Browse and manage uploaded documents
    Document {
        #[command(subcommand)]
        sub: DocumentCommands,
    },
    /// Generate and browse tutorials
    Tutorial {
        #[command(subcommand)]
        sub: TutorialCommands,
    },
    /// Semantic search across the knowledge base
    Search {
        query: String,
        /// Collection to search, or "all"
        #[arg(long, default_value = ALL_COLLECTIONS)]
        collection: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Build an LLM prompt from the knowledge base
    Prompt { query: String },
}

#[derive(clap::Args)]
struct PageArgs {
    /// Number of pages to load
    #[arg(long, default_value = "1")]
    pages: u32,
    /// Load every page
    #[arg(long)]
    all: bool,
    /// Items per page (defaults to KMANAGER_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<u64>,
}

#[derive(Subcommand)]
enum ContentCommands {
    /// List ingested content across collections
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Show one content item
    Get { collection: String, id: String },
    /// Delete one content item
    Delete { collection: String, id: String },
    /// Check whether a URL was already ingested
    Exists {
        url: String,
        #[arg(long = "type", default_value = "article")]
        content_type: ContentType,
    },
}

#[derive(Subcommand)]
enum DocumentCommands {
    /// List uploaded documents
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Show a processed document
    Get { id: String },
    /// Delete a document
    Delete { id: String },
    /// Search document contents
    Search {
        query: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Download the original file
    Download {
        id: String,
        /// Destination path (defaults to the server-provided file name)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TutorialCommands {
    /// Generate a tutorial for ingested content
    Generate {
        content_id: String,
        #[arg(long = "type", default_value = "article")]
        content_type: ContentType,
    },
    /// List generated tutorials
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Show a tutorial with all sections
    Get { id: String },
    /// Delete a tutorial
    Delete { id: String },
}

/// Load pages into `list` as requested by `paging`.
async fn load_pages<S: PageSource>(list: &PagedList<S>, paging: &PageArgs) -> anyhow::Result<()> {
    let mut loaded = 0;
    while list.has_more() && (paging.all || loaded < paging.pages) {
        list.load_more().await.context("Failed to load page")?;
        loaded += 1;
    }
    Ok(())
}

fn page_size(client: &ApiClient, paging: &PageArgs) -> u64 {
    paging.page_size.unwrap_or(client.config().page_size)
}

fn print_deleted(format: OutputFormat, what: &str, id: &str) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(
            &serde_json::json!({ "success": true, "message": format!("{} {} deleted", what, id) }),
        ),
        OutputFormat::Table => {
            println!("{} {} deleted", what, id);
            Ok(())
        }
    }
}

async fn run(cli: Cli, client: ApiClient) -> anyhow::Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Submit {
            url,
            content_type,
            no_tutorial,
        } => {
            if no_tutorial || !content_type.supports_tutorial() {
                let controller = ContentSubmission::from_client(&client);
                let progress = watch_progress(controller.subscribe());
                let result = controller.submit(&url, content_type).await;
                progress.abort();
                let content = result?;
                match format {
                    OutputFormat::Json => print_json(&content)?,
                    OutputFormat::Table => render::print_content(&content),
                }
            } else {
                let ingestion = UrlIngestion::from_client(&client);
                let content_progress = watch_progress(ingestion.content_state());
                let tutorial_progress = watch_progress(ingestion.tutorial_state());
                let result = ingestion.ingest(&url, content_type).await;
                content_progress.abort();
                tutorial_progress.abort();
                let outcome = result?;
                match format {
                    OutputFormat::Json => print_json(&outcome)?,
                    OutputFormat::Table => render::print_ingestion(&outcome),
                }
            }
        }
        Commands::Upload { file, title, tags } => {
            let upload = read_upload_file(&file, title, parse_tags(tags.as_deref()))?;
            let controller = DocumentSubmission::from_client(&client);
            let progress = watch_progress(controller.subscribe());
            let result = controller.submit(upload).await;
            progress.abort();
            let document = result?;
            match format {
                OutputFormat::Json => print_json(&document)?,
                OutputFormat::Table => render::print_document(&document),
            }
        }
        Commands::Content { sub } => match sub {
            ContentCommands::List { paging } => {
                let source = ContentGridSource::new(
                    client.collections(),
                    client.config().content_collections.clone(),
                );
                let list = PagedList::new(source, page_size(&client, &paging));
                load_pages(&list, &paging).await?;
                let items = list.items();
                match format {
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "items": items,
                        "total": list.total(),
                        "has_more": list.has_more(),
                    }))?,
                    OutputFormat::Table => {
                        render::print_content_grid(&items, list.total(), list.has_more())
                    }
                }
            }
            ContentCommands::Get { collection, id } => {
                let detail = client.collections().content_detail(&collection, &id).await?;
                match format {
                    OutputFormat::Json => print_json(&detail)?,
                    OutputFormat::Table => render::print_content_detail(&detail),
                }
            }
            ContentCommands::Delete { collection, id } => {
                client.collections().delete_content(&collection, &id).await?;
                print_deleted(format, "Content", &id)?;
            }
            ContentCommands::Exists { url, content_type } => {
                let found = client
                    .collections()
                    .content_exists(content_type.collection(), &url)
                    .await?;
                let content_id = found.filter(|f| f.exists).and_then(|f| f.content_id);
                match format {
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "exists": content_id.is_some(),
                        "content_id": content_id,
                    }))?,
                    OutputFormat::Table => match content_id {
                        Some(id) => println!("Already ingested as {}", id),
                        None => println!("Not ingested yet"),
                    },
                }
            }
        },
        Commands::Document { sub } => match sub {
            DocumentCommands::List { paging } => {
                let source = DocumentListSource::new(client.collections(), client.documents());
                let list = PagedList::new(source, page_size(&client, &paging));
                load_pages(&list, &paging).await?;
                let items = list.items();
                match format {
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "items": items,
                        "total": list.total(),
                        "has_more": list.has_more(),
                    }))?,
                    OutputFormat::Table => {
                        render::print_document_grid(&items, list.total(), list.has_more())
                    }
                }
            }
            DocumentCommands::Get { id } => {
                let document = client.documents().get_document(&id).await?;
                match format {
                    OutputFormat::Json => print_json(&document)?,
                    OutputFormat::Table => render::print_document(&document),
                }
            }
            DocumentCommands::Delete { id } => {
                client.documents().delete(&id).await?;
                print_deleted(format, "Document", &id)?;
            }
            DocumentCommands::Search { query, limit } => {
                let documents = client.documents().search(&query, limit).await?;
                match format {
                    OutputFormat::Json => print_json(&documents)?,
                    OutputFormat::Table => {
                        if documents.is_empty() {
                            println!("No matching documents.");
                        }
                        for document in &documents {
                            render::print_document(document);
                        }
                    }
                }
            }
            DocumentCommands::Download { id, output } => {
                let download = client.documents().download(&id).await?;
                let path = output.unwrap_or_else(|| {
                    PathBuf::from(download.file_name.clone().unwrap_or_else(|| id.clone()))
                });
                check_path(&path)?;
                std::fs::write(&path, &download.bytes)
                    .with_context(|| format!("Failed to write file: {}", path.display()))?;
                match format {
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "path": path.display().to_string(),
                        "bytes": download.bytes.len(),
                        "content_type": download.content_type,
                    }))?,
                    OutputFormat::Table => {
                        println!("Saved {} bytes to {}", download.bytes.len(), path.display())
                    }
                }
            }
        },
        Commands::Tutorial { sub } => match sub {
            TutorialCommands::Generate {
                content_id,
                content_type,
            } => {
                let controller = TutorialGeneration::from_client(&client);
                let progress = watch_progress(controller.subscribe());
                let result = controller.generate(&content_id, content_type).await;
                progress.abort();
                let tutorial = result?;
                match format {
                    OutputFormat::Json => print_json(&tutorial)?,
                    OutputFormat::Table => render::print_tutorial(&tutorial),
                }
            }
            TutorialCommands::List { paging } => {
                let source = TutorialListSource::new(client.tutorials());
                let list = PagedList::new(source, page_size(&client, &paging));
                load_pages(&list, &paging).await?;
                let items = list.items();
                match format {
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "items": items,
                        "total": list.total(),
                        "has_more": list.has_more(),
                    }))?,
                    OutputFormat::Table => {
                        render::print_tutorial_list(&items, list.total(), list.has_more())
                    }
                }
            }
            TutorialCommands::Get { id } => {
                let detail = client.tutorials().detail(&id).await?;
                match format {
                    OutputFormat::Json => print_json(&detail)?,
                    OutputFormat::Table => render::print_tutorial_detail(&detail),
                }
            }
            TutorialCommands::Delete { id } => {
                client.tutorials().delete(&id).await?;
                print_deleted(format, "Tutorial", &id)?;
            }
        },
        Commands::Search {
            query,
            collection,
            limit,
        } => {
            let params = SearchParams::new(&query, &collection, limit)?;
            let response = client.search().search(&params).await?;
            match format {
                OutputFormat::Json => print_json(&response)?,
                OutputFormat::Table => render::print_search_results(&response),
            }
        }
        Commands::Prompt { query } => {
            let generated = client.prompts().generate(&query).await?;
            match format {
                OutputFormat::Json => print_json(&generated)?,
                OutputFormat::Table => println!("{}", generated.prompt),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let client = ApiClient::from_env().context(
        "Failed to create API client. Check KMANAGER_API_URL (or API_URL) and the other KMANAGER_* settings",
    )?;

    let cli = Cli::parse();

    if let Err(err) = run(cli, client).await {
        if let Some(client_err) = err.downcast_ref::<kmanager_core::ClientError>() {
            tracing::debug!(code = client_err.error_code(), "Command failed");
            eprintln!("Error: {}", client_err.client_message());
            if let Some(action) = client_err.suggested_action() {
                eprintln!("Hint: {}", action);
            }
            std::process::exit(1);
        }
        return Err(err);
    }

    Ok(())
}
