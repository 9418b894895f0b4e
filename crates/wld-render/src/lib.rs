//! wld-render
//!
//! Turns a [`CountrySummary`] into the persisted summary artifact. The
//! artifact is an 800x600 SVG: title, total count, the top-5 GDP list, and
//! a last-refreshed footer. The daemon serves the file back out from the
//! well-known path; render failures are the caller's to log, never fatal.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wld_schemas::CountrySummary;

pub const ARTIFACT_FILE: &str = "summary.svg";

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

/// Well-known location of the rendered artifact under `cache_dir`.
pub fn artifact_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(ARTIFACT_FILE)
}

/// Render `summary` into `cache_dir`, creating the directory if needed.
/// Returns the path written. Overwrites any previous artifact.
pub fn render_summary(cache_dir: &Path, summary: &CountrySummary) -> Result<PathBuf> {
    fs::create_dir_all(cache_dir)
        .with_context(|| format!("create cache dir failed: {}", cache_dir.display()))?;

    let path = artifact_path(cache_dir);
    let svg = build_svg(summary);
    fs::write(&path, svg).with_context(|| format!("write artifact failed: {}", path.display()))?;

    Ok(path)
}

fn build_svg(summary: &CountrySummary) -> String {
    let mut body = String::new();

    body.push_str(&text_line(
        WIDTH / 2,
        50,
        36,
        "#191970",
        "Countries Summary",
    ));
    body.push_str(&text_line(
        WIDTH / 2,
        120,
        24,
        "#00008b",
        &format!("Total Countries: {}", summary.total_countries),
    ));
    body.push_str(&text_line(
        WIDTH / 2,
        200,
        20,
        "#000000",
        "Top 5 Countries by Estimated GDP:",
    ));

    let mut y = 250;
    for (i, entry) in summary.top_by_gdp.iter().enumerate() {
        let line = format!(
            "{}. {} - ${}",
            i + 1,
            escape(&entry.name),
            format_thousands(entry.estimated_gdp)
        );
        body.push_str(&text_line(WIDTH / 2, y, 16, "#006400", &line));
        y += 35;
    }

    body.push_str(&text_line(
        WIDTH / 2,
        y + 40,
        14,
        "#808080",
        &format!(
            "Last Refreshed: {}",
            summary.last_refreshed_at.to_rfc3339()
        ),
    ));

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"#f0f8ff\"/>\n{body}</svg>\n"
    )
}

fn text_line(x: u32, y: u32, size: u32, fill: &str, content: &str) -> String {
    format!(
        "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" fill=\"{fill}\" \
         text-anchor=\"middle\" font-family=\"sans-serif\">{content}</text>\n"
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// `1234567.0` -> `"1,234,567"`. Truncates the fraction; these are rough
/// estimates rendered for a human.
fn format_thousands(value: f64) -> String {
    let whole = format!("{value:.0}");
    let digits: Vec<char> = whole.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 && ch.is_ascii_digit() {
            out.push(',');
        }
        out.push(*ch);
    }
    out
}
