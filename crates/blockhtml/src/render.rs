use crate::prelude::{eprintln, println, *};
use blockhtml_core::{render_value, tree_depth, wrap_document, Diagnostic, Rendered};
use colored::Colorize;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Options for rendering a block tree
#[derive(Debug, clap::Args, Clone)]
pub struct RenderOptions {
    /// Block JSON file to read; `-` or nothing reads stdin
    #[clap(env = "BLOCKHTML_INPUT")]
    pub input: Option<PathBuf>,

    /// Write the result to this file instead of stdout
    #[arg(short, long, env = "BLOCKHTML_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output the HTML and its diagnostics as JSON
    #[arg(long)]
    pub json: bool,

    /// Wrap the fragment in a standalone HTML document
    #[arg(long)]
    pub document: bool,

    /// Title of the standalone document
    #[arg(long, env = "BLOCKHTML_TITLE", default_value = "Untitled")]
    pub title: String,

    /// Reject block trees nested deeper than this
    #[arg(long, env = "BLOCKHTML_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Fail when any block was skipped or unsupported
    #[arg(long)]
    pub strict: bool,

    /// Print a table of diagnostics to stderr
    #[arg(long)]
    pub diagnostics: bool,
}

pub fn run(options: RenderOptions, global: crate::Global) -> Result<()> {
    let input = read_input(options.input.as_deref())?;
    let Rendered { html, diagnostics } = render_data(&input, options.max_depth)?;

    for diagnostic in &diagnostics {
        log::warn!("{diagnostic}");
    }

    if options.diagnostics {
        print_diagnostics(&diagnostics);
    }

    let html = if options.document {
        wrap_document(&options.title, &html)
    } else {
        html
    };
    let html_length = html.len();

    let body = if options.json {
        serde_json::to_string_pretty(&Rendered {
            html,
            diagnostics: diagnostics.clone(),
        })?
    } else {
        html
    };

    write_output(&body, options.output.as_deref())?;

    if global.verbose {
        print_summary(html_length, &diagnostics, &options);
    }

    if options.strict && !diagnostics.is_empty() {
        return Err(Error::StrictDiagnostics(diagnostics.len()).into());
    }

    Ok(())
}

/// Parse block JSON, enforce the depth limit, and hand the tree to the core.
///
/// The core never limits depth itself, so the check has to happen here.
pub fn render_data(input: &str, max_depth: Option<usize>) -> Result<Rendered> {
    let value: Value = serde_json::from_str(input).context("Failed to parse block JSON")?;

    let depth = tree_depth(&value);
    log::debug!("Block tree is {depth} level(s) deep");

    if let Some(limit) = max_depth {
        if depth > limit {
            return Err(Error::TooDeep { depth, limit }.into());
        }
    }

    Ok(render_value(&value))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            log::debug!("Reading block JSON from stdin");
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn write_output(body: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {} bytes to {}", body.len(), path.display());
        }
        None => println!("{body}"),
    }

    Ok(())
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        eprintln!("{}", "No diagnostics".green());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Level", "Block", "Problem"]);
    for diagnostic in diagnostics {
        let block = diagnostic.block_id.as_deref().unwrap_or("-");
        let problem = diagnostic.kind.to_string();
        table.add_row(prettytable::row![diagnostic.nesting_level, block, problem]);
    }

    eprintln!("{table}");
}

fn print_summary(html_length: usize, diagnostics: &[Diagnostic], options: &RenderOptions) {
    // Only decorate when a human is watching
    if !std::io::stderr().is_terminal() {
        eprintln!(
            "{html_length} bytes, {} diagnostic(s)",
            diagnostics.len()
        );
        return;
    }

    eprintln!("\n{}", "=".repeat(80).bright_yellow());
    eprintln!("{}", "STATISTICS".bright_yellow().bold());
    eprintln!("{}", "=".repeat(80).bright_yellow());

    eprintln!(
        "\n{}: {}",
        "Output Size".green(),
        format!("{html_length} bytes").bright_cyan().bold()
    );
    eprintln!(
        "{}: {}",
        "Diagnostics".green(),
        if diagnostics.is_empty() {
            "0".bright_cyan().bold()
        } else {
            diagnostics.len().to_string().bright_red().bold()
        }
    );
    eprintln!(
        "{}: {}",
        "Output".green(),
        match &options.output {
            Some(path) => path.display().to_string().cyan(),
            None => "stdout".cyan(),
        }
    );

    if !diagnostics.is_empty() && !options.diagnostics {
        eprintln!("\n{}:", "To list skipped blocks".bright_white().bold());
        eprintln!("  {}", "blockhtml render <input> --diagnostics".cyan());
    }

    eprintln!();
}

// ============================================================================
// Tests
// ============================================================================
