//! Example: Fetch live URLs in each output format
//!
//! Run with: cargo run -p pagefetch --example fetch_formats

use pagefetch::{fetch, FetchRequest, FetchResult, OutputFormat};

struct Case {
    url: &'static str,
    format: OutputFormat,
    description: &'static str,
    expect_contains: &'static str,
}

const CASES: &[Case] = &[
    Case {
        url: "https://example.com",
        format: OutputFormat::Markdown,
        description: "HTML page as markdown",
        expect_contains: "# Example Domain",
    },
    Case {
        url: "https://example.com",
        format: OutputFormat::Text,
        description: "HTML page as text",
        expect_contains: "Example Domain",
    },
    Case {
        url: "http://example.com",
        format: OutputFormat::Html,
        description: "http:// URL upgraded to https://",
        expect_contains: "<h1>Example Domain</h1>",
    },
    Case {
        url: "https://httpbin.org/json",
        format: OutputFormat::Markdown,
        description: "JSON endpoint wrapped in a fence",
        expect_contains: "```\n{",
    },
];

#[tokio::main]
async fn main() {
    println!("PageFetch Format Examples");
    println!("=========================\n");

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {} ({})", case.url, case.format);

        let request = FetchRequest::new(case.url).format(case.format).timeout(20);

        match fetch(request).await {
            Ok(result) => {
                print_summary(&result);
                if result.output.contains(case.expect_contains) {
                    println!("   ✓ PASS\n");
                    passed += 1;
                } else {
                    println!("   Expected output to contain {:?}", case.expect_contains);
                    println!("   ✗ FAIL\n");
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   Error: {} ({:?})", e, e.kind());
                println!("   ✗ FAIL\n");
                failed += 1;
            }
        }
    }

    println!("=========================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_summary(result: &FetchResult) {
    println!("   Title: {}", result.title);
    println!("   Size: {} bytes", result.output.len());

    let preview: String = result.output.chars().take(100).collect();
    println!(
        "   Preview: {}{}",
        preview.replace('\n', " "),
        if result.output.chars().count() > 100 { "..." } else { "" }
    );
}
