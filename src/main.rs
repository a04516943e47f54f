//! chapterize - Find the chapters in an ebook

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use chapterize::{Chapter, ChapterMark, EbookConvert, ExtractConfig, Extractor, FlatTocEntry};

#[derive(Parser)]
#[command(name = "chapterize")]
#[command(version, about = "Find the chapters in an ebook", long_about = None)]
#[command(after_help = "EXAMPLES:
    chapterize book.epub                List chapters
    chapterize book.mobi --json         Chapters as JSON (converts via ebook-convert)
    chapterize book.epub --toc          Show the navigation document
    chapterize book.txt --text          Segment already-converted plain text")]
struct Cli {
    /// Input file (EPUB, or anything ebook-convert reads)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Print the flattened table of contents instead of chapters
    #[arg(long)]
    toc: bool,

    /// Emit JSON
    #[arg(long)]
    json: bool,

    /// Include each chapter's markup in JSON output
    #[arg(long)]
    keep_html: bool,

    /// Treat INPUT as plain text and segment it
    #[arg(long, conflicts_with = "toc")]
    text: bool,

    /// Never run ebook-convert; only the EPUB's own NCX is used
    #[arg(long)]
    no_convert: bool,

    /// Chapter mark for text conversion: pagebreak, rule, both or none
    #[arg(long, value_name = "MARK", default_value_t = ChapterMark::PageBreak)]
    chapter_mark: ChapterMark,

    /// Show the first N characters of each chapter
    #[arg(long, value_name = "N")]
    summary: Option<usize>,

    /// Log pipeline decisions to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct ChapterReport<'a> {
    index: usize,
    title: &'a str,
    word_count: usize,
    char_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

#[derive(Serialize)]
struct TocReport<'a> {
    title: &'a str,
    level: usize,
    href: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    play_order: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = if cli.toc {
        show_toc(&cli)
    } else {
        show_chapters(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn show_toc(cli: &Cli) -> Result<(), String> {
    let extractor = Extractor::default();
    let entries = extractor
        .table_of_contents(&cli.input)
        .map_err(|e| e.to_string())?;

    if cli.json {
        let report: Vec<_> = entries.iter().map(toc_report).collect();
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    for entry in &entries {
        let indent = "  ".repeat(entry.level.saturating_sub(1));
        println!("{indent}{}  [{}]", entry.title, entry.href);
    }
    Ok(())
}

fn show_chapters(cli: &Cli) -> Result<(), String> {
    let config = ExtractConfig::new()
        .with_keep_html(cli.keep_html)
        .with_chapter_mark(cli.chapter_mark);

    let chapters = if cli.text {
        let bytes = std::fs::read(&cli.input).map_err(|e| e.to_string())?;
        Extractor::new(config).extract_from_text_bytes(&bytes)
    } else {
        extractor(config, cli.no_convert)
            .extract(Path::new(&cli.input))
            .map_err(|e| e.to_string())?
    };

    if cli.json {
        let report: Vec<_> = chapters
            .iter()
            .map(|c| chapter_report(c, cli.summary))
            .collect();
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        eprintln!("{}: {} chapters", cli.input, chapters.len());
    }
    for chapter in &chapters {
        println!(
            "{:>4}. {} ({} words)",
            chapter.index + 1,
            chapter.title,
            chapter.word_count
        );
        if let Some(max) = cli.summary {
            println!("      {}", chapter.summary(max).replace('\n', " "));
        }
    }
    Ok(())
}

fn extractor(config: ExtractConfig, no_convert: bool) -> Extractor {
    let extractor = Extractor::new(config);
    if no_convert {
        return extractor;
    }
    match EbookConvert::locate() {
        Ok(converter) => extractor.with_converter(converter),
        Err(e) => {
            tracing::warn!(error = %e, "continuing without a converter");
            extractor
        }
    }
}

fn chapter_report(chapter: &Chapter, summary: Option<usize>) -> ChapterReport<'_> {
    ChapterReport {
        index: chapter.index,
        title: &chapter.title,
        word_count: chapter.word_count,
        char_count: chapter.char_count,
        summary: summary.map(|max| chapter.summary(max)),
        content: &chapter.content,
        html: chapter.html.as_deref(),
    }
}

fn toc_report(entry: &FlatTocEntry) -> TocReport<'_> {
    TocReport {
        title: &entry.title,
        level: entry.level,
        href: &entry.href,
        play_order: entry.play_order,
    }
}
