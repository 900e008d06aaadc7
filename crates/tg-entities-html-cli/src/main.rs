use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tg_entities_html::{Renderer, RendererConfig, TagResolver, TagTable, TelegramTags};

mod config;
mod input;

#[derive(Parser)]
#[command(version, about = "Render Telegram message entities as HTML", long_about = None)]
struct Cli {
    /// Bot API message (or update) JSON; reads stdin when omitted or `-`
    message: Option<PathBuf>,

    /// Raw message text, rendered with the entities from --entities
    #[arg(long, requires = "entities", conflicts_with = "message")]
    text: Option<PathBuf>,

    /// JSON array of entities for --text
    #[arg(long, requires = "text")]
    entities: Option<PathBuf>,

    /// JSON tag table replacing the built-in markup, e.g. {"bold": ["<strong>", "</strong>"]}
    #[arg(long)]
    tags: Option<PathBuf>,

    /// KDL config file
    #[arg(long, env = "TG_HTML_CONFIG")]
    config: Option<PathBuf>,

    /// Match entity boundaries that fall inside surrogate pairs
    #[arg(
        long,
        env = "TG_HTML_FIX_INACCURACIES",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    fix_inaccuracies: Option<bool>,

    /// Fail instead of printing the original text when rendering fails
    #[arg(
        long,
        env = "TG_HTML_THROW_ERRORS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    throw_errors: Option<bool>,

    /// Write HTML here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_miette()?;
    init_tracing();

    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => config::load(path)?,
        None => RendererConfig::default(),
    };
    let config = config::apply_overrides(file, cli.fix_inaccuracies, cli.throw_errors);

    let tags: Box<dyn TagResolver> = match &cli.tags {
        Some(path) => Box::new(load_tag_table(path)?),
        None => Box::new(TelegramTags),
    };
    let renderer = Renderer::with_tags(tags).with_config(config);

    let html = match (&cli.text, &cli.entities) {
        (Some(text), Some(entities)) => {
            let text = read_input(Some(text.as_path()))?;
            let entities = read_input(Some(entities.as_path()))?;
            let entities: Vec<Value> = serde_json::from_slice(&entities)
                .into_diagnostic()
                .wrap_err("entities must be a JSON array")?;
            renderer.render_bytes(&text, &entities)?.into_owned()
        }
        _ => {
            let raw = read_input(cli.message.as_deref())?;
            let message = input::parse_message(&raw)?;
            let (text, entities) = message.body();
            renderer.render(text, entities)?.into_owned().into_bytes()
        }
    };

    write_output(cli.output.as_deref(), &html)
}

fn load_tag_table(path: &Path) -> Result<TagTable> {
    let raw = std::fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read tag table {}", path.display()))?;
    let table: TagTable = serde_json::from_slice(&raw)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid tag table {}", path.display()))?;
    if table.is_empty() {
        tracing::warn!(path = %path.display(), "tag table is empty, every entity will be skipped");
    }
    Ok(table)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .into_diagnostic()
                .wrap_err("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, html: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, html)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html).into_diagnostic()?;
            stdout.flush().into_diagnostic()
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();
    Ok(())
}
