//! PageFetch CLI - Command-line interface for fetching web content

mod mcp;

use clap::{Parser, Subcommand, ValueEnum};
use pagefetch::{ConverterKind, FetchRequest, FetchResult, OutputFormat, Tool, TOOL_LLMTXT};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// How the fetch subcommand prints its result
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputMode {
    /// Output with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// PageFetch - bounded web content fetching for agents
#[derive(Parser, Debug)]
#[command(name = "pagefetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Fetch URL and print it as text, markdown, or html
    Fetch {
        /// URL to fetch
        url: String,

        /// Content format: text, markdown, or html
        #[arg(long, short, default_value = "markdown")]
        format: OutputFormat,

        /// Timeout in seconds (default 30, at most 120)
        #[arg(long, short)]
        timeout: Option<u64>,

        /// How to print the result
        #[arg(long, short, default_value = "md")]
        output: OutputMode,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// Use the regex-based converter instead of the tree-aware one
        #[arg(long)]
        pattern_only: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server().await;
        }
        Some(Commands::Fetch {
            url,
            format,
            timeout,
            output,
            user_agent,
            pattern_only,
        }) => {
            let mut request = FetchRequest::new(url).format(format);
            if let Some(secs) = timeout {
                request = request.timeout(secs);
            }
            run_fetch(request, output, user_agent, pattern_only).await;
        }
        None => {
            eprintln!("Usage: pagefetch fetch <URL> [--format text|markdown|html]");
            eprintln!("   or: pagefetch mcp");
            eprintln!("   or: pagefetch --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr so stdout stays reserved for results and JSON-RPC frames
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_fetch(
    request: FetchRequest,
    output: OutputMode,
    user_agent: Option<String>,
    pattern_only: bool,
) {
    let mut builder = Tool::builder();

    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    if pattern_only {
        builder = builder.converter(ConverterKind::Pattern);
    }

    let tool = builder.build();

    match tool.execute(request).await {
        Ok(result) => match output {
            OutputMode::Md => writeln_safe(&format_md_with_frontmatter(&result)),
            OutputMode::Json => {
                let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                    eprintln!("Error serializing result: {}", e);
                    std::process::exit(1);
                });
                writeln_safe(&json);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format a result as its output preceded by a YAML frontmatter block
fn format_md_with_frontmatter(result: &FetchResult) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("title: {}\n", result.title));
    for (key, value) in &result.metadata {
        output.push_str(&format!("{}: {}\n", key, value));
    }
    output.push_str("---\n");
    output.push_str(&result.output);

    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_md_basic() {
        let result = FetchResult::new("https://example.com/ (text/html)", "# Hello World");

        let output = format_md_with_frontmatter(&result);

        assert!(output.starts_with("---\n"));
        assert!(output.contains("title: https://example.com/ (text/html)\n"));
        assert!(output.ends_with("---\n# Hello World"));
    }

    #[test]
    fn test_format_md_empty_metadata_adds_no_fields() {
        let result = FetchResult::new("t", "body");
        let output = format_md_with_frontmatter(&result);
        assert_eq!(output, "---\ntitle: t\n---\nbody");
    }

    #[test]
    fn test_parse_fetch_args() {
        let cli = Cli::try_parse_from([
            "pagefetch",
            "fetch",
            "http://example.com",
            "--format",
            "text",
            "--timeout",
            "10",
            "--output",
            "json",
            "--pattern-only",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Fetch {
                url,
                format,
                timeout,
                output,
                pattern_only,
                ..
            }) => {
                assert_eq!(url, "http://example.com");
                assert_eq!(format, OutputFormat::Text);
                assert_eq!(timeout, Some(10));
                assert!(matches!(output, OutputMode::Json));
                assert!(pattern_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_defaults() {
        let cli = Cli::try_parse_from(["pagefetch", "fetch", "https://example.com"]).unwrap();
        match cli.command {
            Some(Commands::Fetch {
                format,
                timeout,
                output,
                pattern_only,
                ..
            }) => {
                assert_eq!(format, OutputFormat::Markdown);
                assert_eq!(timeout, None);
                assert!(matches!(output, OutputMode::Md));
                assert!(!pattern_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from([
            "pagefetch",
            "fetch",
            "https://example.com",
            "--format",
            "pdf"
        ])
        .is_err());
    }
}
