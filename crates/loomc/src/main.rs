//! The Loom translator CLI.
//!
//! Provides the `loomc` command with two subcommands:
//!
//! - `loomc to-blocks <file>` - translate Surface source into Blocks XML
//! - `loomc to-surface <file>` - translate Blocks XML back into Surface source
//!
//! Options:
//! - `--output` - output path (defaults to stdout)
//! - `--components` - JSON file mapping component type to instance names,
//!   used by `to-blocks` to resolve `when Instance.Event` handlers

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;

use ariadne::{Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use loom::LoomError;

#[derive(Parser)]
#[command(name = "loomc", version, about = "The Loom translator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate Surface source into Blocks XML
    ToBlocks {
        /// Path to a Surface source file
        file: PathBuf,

        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file mapping component type to declared instance names
        #[arg(long)]
        components: Option<PathBuf>,
    },
    /// Translate Blocks XML back into Surface source
    ToSurface {
        /// Path to a Blocks XML file
        file: PathBuf,

        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::ToBlocks { file, output, components } => to_blocks(&file, output.as_deref(), components.as_deref()),
        Commands::ToSurface { file, output } => to_surface(&file, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn to_blocks(file: &Path, output: Option<&Path>, components: Option<&Path>) -> Result<(), String> {
    let source = std::fs::read_to_string(file).map_err(|e| format!("failed to read '{}': {e}", file.display()))?;
    let components = match components {
        Some(path) => load_components(path)?,
        None => HashMap::new(),
    };

    match loom::surface_to_blocks(&source, &components) {
        Ok(xml) => write_output(output, &xml),
        Err(e) => {
            report_error(&source, &file.display().to_string(), &e);
            Err("translation failed due to errors above".to_string())
        }
    }
}

fn to_surface(file: &Path, output: Option<&Path>) -> Result<(), String> {
    let xml = std::fs::read_to_string(file).map_err(|e| format!("failed to read '{}': {e}", file.display()))?;
    match loom::blocks_to_surface(&xml) {
        Ok(source) => write_output(output, &source),
        Err(e) => Err(format!("{e}")),
    }
}

fn load_components(path: &Path) -> Result<HashMap<String, Vec<String>>, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("failed to parse component registry '{}': {e}", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), String> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(|e| format!("failed to write '{}': {e}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

/// Renders a [`LoomError`] with `ariadne`, pointing at the offending
/// line/column when the error carries one. Only this crate reports errors
/// this way; the library crates only ever return them.
fn report_error(source: &str, file_name: &str, error: &LoomError) {
    match error {
        LoomError::Parse(errors) => {
            for err in errors {
                let start = byte_offset_of(source, err.position.line, err.position.column);
                let end = start + 1;
                let _ = Report::<std::ops::Range<usize>>::build(ReportKind::Error, start..end)
                    .with_message(format!("{file_name}: parse error"))
                    .with_label(Label::new(start..end).with_message(err.to_string()))
                    .finish()
                    .eprint(Source::from(source));
            }
        }
        other => eprintln!("{file_name}: error: {other}"),
    }
}

/// Converts a 1-based line/column back into a byte offset by walking lines.
/// Surface's `LineIndex` only translates offset -> position; the CLI is the
/// one place that needs the reverse, purely for diagnostic rendering.
fn byte_offset_of(source: &str, line: u32, column: u32) -> usize {
    let mut offset = 0usize;
    for (i, l) in source.split('\n').enumerate() {
        if i as u32 + 1 == line {
            return offset + (column.saturating_sub(1)) as usize;
        }
        offset += l.len() + 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_offset_finds_second_line_start() {
        let src = "global a = 1\nglobal b = 2";
        assert_eq!(byte_offset_of(src, 2, 1), 13);
    }

    #[test]
    fn byte_offset_finds_first_line_column() {
        let src = "abcdef";
        assert_eq!(byte_offset_of(src, 1, 3), 2);
    }
}
