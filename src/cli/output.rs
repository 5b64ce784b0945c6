use crate::fixed::flow::FlowNodeType;
use crate::fixed::map::PageFlow;
use crate::CheckResult;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonError<'a> {
    file: String,
    line: usize,
    column: usize,
    word: &'a str,
    suggestions: &'a [String],
    context: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_errors: usize,
    errors: Vec<JsonError<'a>>,
}

pub fn print_errors(file_path: &Path, result: &CheckResult, colored_output: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_errors(file_path, result, colored_output);
            Ok(())
        }
        OutputFormat::Json => print_json_errors(file_path, result),
    }
}

fn print_text_errors(file_path: &Path, result: &CheckResult, colored_output: bool) {
    if result.errors.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for error in &result.errors {
        let line_info = format!("{}:{}", error.line, error.column);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                error.word.red().bold(),
                format_context(&error.context, &error.word, colored_output)
            );

            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .take(5)
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {} {}", line_info, error.word, &error.context);

            if !error.suggestions.is_empty() {
                println!("    → {}", error.suggestions.iter().take(5).cloned().collect::<Vec<_>>().join(", "));
            }
        }
    }
}

fn print_json_errors(file_path: &Path, result: &CheckResult) -> Result<()> {
    let output = JsonOutput {
        files_checked: 1,
        total_errors: result.error_count,
        errors: result
            .errors
            .iter()
            .map(|e| JsonError {
                file: file_path.display().to_string(),
                line: e.line,
                column: e.column,
                word: &e.word,
                suggestions: &e.suggestions,
                context: &e.context,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output).context("Failed to encode errors")?);
    Ok(())
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_check_summary(total_errors: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        let file_word = if files.len() == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files.len(),
                file_word
            );
        } else {
            println!("✗ {} {} found in {} {}", total_errors, error_word, files.len(), file_word);
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonFlowNode {
    kind: FlowNodeType,
    node: String,
    length: usize,
}

#[derive(Debug, Serialize)]
struct JsonPage {
    file: String,
    page: usize,
    lines: usize,
    text: String,
    nodes: Vec<JsonFlowNode>,
}

/// Print the reconstructed flow of one page.
pub fn print_flow(file_path: &Path, page: usize, flow: &PageFlow, colored: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = JsonPage {
                file: file_path.display().to_string(),
                page,
                lines: flow.lines().len(),
                text: flow.text(),
                nodes: flow
                    .nodes()
                    .iter()
                    .map(|node| JsonFlowNode {
                        kind: node.node_type(),
                        node: node.to_string(),
                        length: node.len(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output).context("Failed to encode flow")?);
        }
        OutputFormat::Text => {
            let header = format!("{} page {}", file_path.display(), page + 1);
            if colored {
                println!("{}", header.bold().underline());
            } else {
                println!("{}", header);
            }
            let mut depth = 0usize;
            for node in flow.nodes() {
                if node.node_type() == FlowNodeType::End {
                    depth = depth.saturating_sub(1);
                }
                let label = node.to_string();
                let label = match (colored, node.node_type()) {
                    (true, FlowNodeType::Run) => label.green().to_string(),
                    (true, FlowNodeType::Object) => label.cyan().to_string(),
                    (true, _) => label.dimmed().to_string(),
                    (false, _) => label,
                };
                println!("  {}{}", "  ".repeat(depth), label);
                if node.node_type() == FlowNodeType::Start {
                    depth += 1;
                }
            }
            println!("  text ({} lines): {}", flow.lines().len(), flow.text());
        }
    }
    Ok(())
}
