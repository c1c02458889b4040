use clap::{Parser, Subcommand};
use mathfield::{
    CommandRenderer, FileStore, MathField, MathRenderer, RendererConfig, render_to_html,
};
use miette::{IntoDiagnostic, Result};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Render and store text with inline LaTeX", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Renderer config file (.json or .toml)
    #[arg(long, global = true, env = "MATHFIELD_CONFIG")]
    config: Option<PathBuf>,

    /// Renderer executable, overrides the config file
    #[arg(long, global = true)]
    renderer: Option<String>,

    /// Script passed to the renderer before the fragments
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    /// Render with pulldown-latex in process instead of an external renderer
    #[cfg(feature = "mathml")]
    #[arg(long, global = true)]
    mathml: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the HTML for some text
    Render {
        /// Text to render, read from stdin if omitted
        text: Option<String>,
    },
    /// Print the stored form (`{"raw": ..., "html": ...}`) of some text
    Store {
        /// Raw text, read from stdin if omitted
        text: Option<String>,

        /// Already rendered HTML; skips rendering
        #[arg(long)]
        html: Option<String>,
    },
    /// Decode a stored value, rendering it if it is bare text
    Decode {
        /// Stored value, read from stdin if omitted
        stored: Option<String>,
    },
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let renderer = build_renderer(&cli)?;
    let field = MathField::new(renderer);

    match cli.command {
        Commands::Render { text } => {
            let text = text_or_stdin(text)?;
            println!("{}", render_to_html(&text, field.renderer())?);
        }
        Commands::Store { text, html } => {
            let text = text_or_stdin(text)?;
            println!("{}", field.encode_parts(text, html.as_deref())?);
        }
        Commands::Decode { stored } => {
            let stored = text_or_stdin(stored)?;
            let value = field.decode(Some(stored))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&value).into_diagnostic()?
            );
        }
    }

    Ok(())
}

fn build_renderer(cli: &Cli) -> Result<Box<dyn MathRenderer>> {
    #[cfg(feature = "mathml")]
    if cli.mathml {
        tracing::debug!("using in-process mathml renderer");
        return Ok(Box::new(mathfield::MathMlRenderer::inline()));
    }

    let mut config = match &cli.config {
        Some(path) => RendererConfig::load(&FileStore::new(path))?,
        None => RendererConfig::default(),
    }
    .with_env_overrides();
    if let Some(program) = &cli.renderer {
        config.program = program.clone();
    }
    if let Some(script) = &cli.script {
        config.script = Some(script.clone());
    }
    tracing::debug!(program = %config.program, script = ?config.script, "using external renderer");

    Ok(Box::new(CommandRenderer::new(config)))
}

fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
            }
            Ok(buf)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(3)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
