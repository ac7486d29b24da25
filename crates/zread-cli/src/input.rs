use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use zread_decoder::PeekReader;

/// Compressed input for every subcommand: a file, or stdin for `-`.
pub type Input = PeekReader<Box<dyn Read>>;

pub fn open(path: &Path) -> Result<Input> {
    let reader: Box<dyn Read> = if path == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        Box::new(BufReader::new(file))
    };
    Ok(PeekReader::new(reader))
}

/// Name used in error messages.
pub fn label(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
