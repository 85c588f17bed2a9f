use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use seo_scorer::{analyze, AnalysisInput, AnalysisResult};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Parser)]
#[command(
    name = "seo-scorer",
    about = "Score text content for basic on-page SEO quality",
    version
)]
struct Cli {
    /// File paths to analyze (reads stdin if none provided)
    files: Vec<String>,

    /// Keyword the content should be optimized for
    #[arg(short, long, default_value = "")]
    keyword: String,

    /// Candidate meta title
    #[arg(short, long, default_value = "")]
    title: String,

    /// Candidate meta description
    #[arg(short, long, default_value = "")]
    description: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Exit with status 1 if any overall score is below this value
    #[arg(long)]
    min_score: Option<u32>,
}

impl Cli {
    fn input_for(&self, content: String) -> AnalysisInput {
        AnalysisInput::new(content)
            .with_target_keyword(self.keyword.as_str())
            .with_meta_title(self.title.as_str())
            .with_meta_description(self.description.as_str())
    }
}

/// One entry of the JSON array printed when several files are analyzed.
#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a str,
    #[serde(flatten)]
    result: &'a AnalysisResult,
}

struct Analyzed {
    label: Option<String>,
    result: AnalysisResult,
}

fn write_text(out: &mut impl Write, result: &AnalysisResult) -> io::Result<()> {
    let meta = &result.meta_analysis;
    let stats = &result.content_analysis;
    let flag = |ok: bool| if ok { "ok" } else { "needs work" };

    writeln!(
        out,
        "SEO score: {}/100 ({})",
        result.overall_score, result.band
    )?;
    writeln!(out, "Readability: {}/100", result.readability_score)?;
    writeln!(
        out,
        "Meta title: {} chars ({})",
        meta.title_length,
        flag(meta.title_optimal)
    )?;
    writeln!(
        out,
        "Meta description: {} chars ({})",
        meta.description_length,
        flag(meta.description_optimal)
    )?;
    writeln!(
        out,
        "Words: {}  Paragraphs: {}  Headings: {}  Avg words/sentence: {}",
        stats.word_count, stats.paragraph_count, stats.heading_count, stats.avg_words_per_sentence
    )?;

    if !result.keyword_density.is_empty() {
        writeln!(out, "\nTop keywords:")?;
        for (word, density) in result.keyword_density.iter() {
            writeln!(out, "  {word:<24} {density:>5.1}%")?;
        }
    }

    writeln!(out, "\nSuggestions:")?;
    for suggestion in &result.suggestions {
        writeln!(out, "  - {suggestion}")?;
    }
    Ok(())
}

fn write_reports(
    out: &mut impl Write,
    format: OutputFormat,
    reports: &[Analyzed],
) -> anyhow::Result<()> {
    let labelled = reports.len() > 1;
    match format {
        OutputFormat::Json if labelled => {
            let entries: Vec<FileReport<'_>> = reports
                .iter()
                .map(|r| FileReport {
                    file: r.label.as_deref().unwrap_or("stdin"),
                    result: &r.result,
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &entries)?;
            writeln!(out)?;
        }
        OutputFormat::Json => {
            for r in reports {
                serde_json::to_writer_pretty(&mut *out, &r.result)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Text => {
            for r in reports {
                if let Some(path) = r.label.as_deref().filter(|_| labelled) {
                    writeln!(out, "== {path} ==")?;
                }
                write_text(out, &r.result)?;
            }
        }
    }
    Ok(())
}

fn analyze_source(cli: &Cli, label: Option<String>, content: String) -> anyhow::Result<Analyzed> {
    let result = analyze(&cli.input_for(content)).with_context(|| {
        format!("cannot analyze {}", label.as_deref().unwrap_or("stdin"))
    })?;
    Ok(Analyzed { label, result })
}

fn run(cli: &Cli) -> anyhow::Result<Vec<u32>> {
    let mut reports = Vec::new();
    if cli.files.is_empty() {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        reports.push(analyze_source(cli, None, input)?);
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {path}"))?;
            log::debug!("read {} bytes from {path}", text.len());
            reports.push(analyze_source(cli, Some(path.clone()), text)?);
        }
    }

    let mut stdout = io::stdout().lock();
    write_reports(&mut stdout, cli.format, &reports)?;
    stdout.flush()?;
    Ok(reports.iter().map(|r| r.result.overall_score).collect())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let scores = match run(&cli) {
        Ok(scores) => scores,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(min) = cli.min_score {
        if let Some(low) = scores.iter().find(|&&s| s < min) {
            log::warn!("score {low} is below the required minimum {min}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(label: Option<&str>, content: &str) -> Analyzed {
        Analyzed {
            label: label.map(str::to_string),
            result: analyze(&AnalysisInput::new(content)).unwrap(),
        }
    }

    fn render(format: OutputFormat, reports: &[Analyzed]) -> String {
        let mut out = Vec::new();
        write_reports(&mut out, format, reports).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_report_lists_keywords_and_suggestions() {
        let text = render(
            OutputFormat::Text,
            &[report(None, "Writing helps writing skills grow.")],
        );
        assert!(text.starts_with("SEO score: "));
        assert!(text.contains("Top keywords:"));
        assert!(text.contains("writing"));
        assert!(text.contains(seo_scorer::MSG_TOO_SHORT));
        assert!(!text.contains("=="));
    }

    #[test]
    fn several_reports_become_one_json_array() {
        let json = render(
            OutputFormat::Json,
            &[
                report(Some("a.md"), "First document body."),
                report(Some("b.md"), "Second document body."),
            ],
        );
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["file"], "a.md");
        assert_eq!(entries[1]["file"], "b.md");
        assert!(entries[0]["overallScore"].is_u64());
        assert!(entries[1]["keywordDensity"]["second"].is_f64());
    }

    #[test]
    fn single_report_is_a_bare_object() {
        let json = render(OutputFormat::Json, &[report(None, "Only one document.")]);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_object());
        assert!(parsed.get("file").is_none());
    }
}
