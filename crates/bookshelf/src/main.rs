//! bookshelf - list a JSON book catalogue with AIP filter, order and paging.
//!
//! ```text
//! bookshelf data/books.json --filter 'tags = "fiction"' --order-by 'page_count desc' --page-size 1
//! bookshelf data/books.json --filter 'tags = "fiction"' --order-by 'page_count desc' --page-size 1 \
//!     --page-token <next_page_token from the previous call>
//! ```
//!
//! Page tokens are encrypted with the key from `--key` or `BOOKSHELF_KEY`
//! (base64, 32 bytes). `bookshelf --generate-key` prints a fresh one.

mod catalogue;

use std::path::{Path, PathBuf};

use aip_query::{ChaChaAead, CursorCodec};
use anyhow::{Context, Result};
use clap::Parser;

use catalogue::{list_books, Book, ListRequest};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "List books with AIP-style queries")]
struct Cli {
    /// JSON file holding an array of books.
    #[arg(required_unless_present = "generate_key")]
    data: Option<PathBuf>,

    /// AIP-160 filter expression.
    #[arg(long, default_value = "")]
    filter: String,

    /// Comma-separated sort keys, each optionally followed by `desc`.
    #[arg(long, default_value = "")]
    order_by: String,

    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Token from a previous response.
    #[arg(long)]
    page_token: Option<String>,

    /// Base64 page token key.
    #[arg(long, env = "BOOKSHELF_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Print a new random key and exit.
    #[arg(long)]
    generate_key: bool,
}

fn load_books(path: &Path) -> Result<Vec<Book>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn codec(key: Option<&str>) -> Result<CursorCodec<ChaChaAead>> {
    let aead = match key {
        Some(key) => ChaChaAead::from_base64(key).context("invalid page token key")?,
        None => {
            tracing::warn!("no key configured, page tokens will not survive a restart");
            ChaChaAead::generate()
        }
    };
    Ok(CursorCodec::new(aead))
}

fn run(cli: Cli) -> Result<String> {
    if cli.generate_key {
        return Ok(ChaChaAead::generate_key_base64());
    }
    let path = cli.data.context("missing data file")?;
    let books = load_books(&path)?;
    let codec = codec(cli.key.as_deref())?;
    let request = ListRequest {
        filter: cli.filter,
        order_by: cli.order_by,
        page_size: cli.page_size,
        page_token: cli.page_token,
    };
    let response = list_books(&books, &request, &codec)?;
    Ok(serde_json::to_string_pretty(&response)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = run(Cli::parse())?;
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn data_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(include_bytes!("../data/books.json")).unwrap();
        file
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bookshelf").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn lists_json() {
        let file = data_file();
        let path = file.path().to_str().unwrap();
        let out = run(cli(&[path, "--filter", "Dune", "--key", &ChaChaAead::generate_key_base64()]))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["books"][0]["title"], "Dune");
        assert!(json.get("next_page_token").is_none());
    }

    #[test]
    fn follows_tokens_with_a_fixed_key() {
        let file = data_file();
        let path = file.path().to_str().unwrap();
        let key = ChaChaAead::generate_key_base64();

        let first = run(cli(&[path, "--page-size", "3", "--key", &key])).unwrap();
        let first: serde_json::Value = serde_json::from_str(&first).unwrap();
        let token = first["next_page_token"].as_str().unwrap().to_string();

        let second = run(cli(&[path, "--page-size", "3", "--key", &key, "--page-token", &token]))
            .unwrap();
        let second: serde_json::Value = serde_json::from_str(&second).unwrap();
        let names: Vec<_> = second["books"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["books/4", "books/5"]);
    }

    #[test]
    fn generate_key_needs_no_data() {
        let key = run(cli(&["--generate-key"])).unwrap();
        assert!(ChaChaAead::from_base64(&key).is_ok());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = run(cli(&["/nonexistent/books.json", "--key", &ChaChaAead::generate_key_base64()]))
            .unwrap_err();
        assert!(err.to_string().contains("reading /nonexistent/books.json"));
    }

    #[test]
    fn bad_key_is_reported() {
        let file = data_file();
        let path = file.path().to_str().unwrap();
        let err = run(cli(&[path, "--key", "not base64!"])).unwrap_err();
        assert!(err.to_string().contains("invalid page token key"));
    }
}
