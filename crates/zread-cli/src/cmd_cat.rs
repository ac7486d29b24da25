/// Implementation of `zread cat`.
///
/// Streams decompressed bytes to stdout (or `-o <file>`) without holding
/// a whole frame in memory. By default every concatenated frame is
/// decoded in order; `--first-only` stops at the end of the first frame
/// and leaves whatever follows unread.
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use log::info;
use zread_decoder::{EngineConfig, FrameDecoder, MultiFrameDecoder};

use crate::{CatArgs, input};

/// Run the `zread cat` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened, a frame is corrupt or
/// truncated, or the output cannot be written.
pub fn run(args: &CatArgs, config: &EngineConfig) -> Result<()> {
    let source = input::open(&args.file)?;
    let label = input::label(&args.file);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let written = if args.first_only {
        match FrameDecoder::open_with_config(source, config)
            .with_context(|| format!("failed to open {label}"))?
        {
            Some(mut decoder) => io::copy(&mut decoder, &mut out)
                .with_context(|| format!("failed to decode {label}"))?,
            None => 0,
        }
    } else {
        let mut decoder = MultiFrameDecoder::open_with_config(source, config)
            .with_context(|| format!("failed to open {label}"))?;
        let n = io::copy(&mut decoder, &mut out)
            .with_context(|| format!("failed to decode {label}"))?;
        info!("{label}: {} frame(s)", decoder.frames());
        n
    };

    out.flush().context("cannot flush output")?;
    info!("{label}: {written} bytes written");
    Ok(())
}
