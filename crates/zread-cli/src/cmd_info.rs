/// Implementation of `zread info`.
///
/// Walks the input frame by frame and prints what each one holds. The
/// header fields come from [`FrameHeader::parse`] on the peeked bytes;
/// the decoded length and digest come from actually decoding the frame.
///
/// # Output format
///
/// ```text
/// frame  offset  compressed  declared  decoded  window   checksum  blake3
/// 0      0       1043        4096      4096     4096     no        9f2c…
/// 1      1043    22          unknown   0        1024     yes       af13…
/// ```
///
/// With `--json`, one object per line:
///
/// ```json
/// {"index":0,"offset":0,"compressed_len":1043,"declared_size":4096,...}
/// ```
use std::io::{self, Write as _};

use anyhow::{Context, Result};
use serde::Serialize;
use zread_decoder::{EngineConfig, FrameDecoder, PeekSource, Status};
use zread_wire::{FrameHeader, FrameKind};
use zread_wire::frame::PEEK_WINDOW;

use crate::{InfoArgs, input};

/// One row of `zread info` output.
#[derive(Debug, Serialize)]
pub struct FrameInfo {
    pub index: u64,
    pub offset: u64,
    pub compressed_len: u64,
    /// `None` when the header leaves the size undeclared.
    pub declared_size: Option<u64>,
    pub decoded_len: u64,
    pub window_size: Option<u64>,
    pub dictionary_id: Option<u32>,
    pub checksum: bool,
    pub blake3: String,
}

/// Run the `zread info` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or any frame fails to
/// decode.
pub fn run(args: &InfoArgs, config: &EngineConfig) -> Result<()> {
    let mut source = input::open(&args.file)?;
    let label = input::label(&args.file);

    // Peek before the decoder consumes the header.
    let mut next = Peeked::from_source(&mut source)?;

    let Some(mut decoder) = FrameDecoder::open_with_config(source, config)
        .with_context(|| next.context(&label, 0, 0))?
    else {
        if !args.json {
            println!("{label}: no frames");
        }
        return Ok(());
    };

    let mut stdout = io::stdout().lock();
    if !args.json {
        writeln!(
            stdout,
            "{:<6} {:<10} {:<11} {:<10} {:<10} {:<10} {:<9} blake3",
            "frame", "offset", "compressed", "declared", "decoded", "window", "checksum"
        )?;
    }

    let mut index = 0u64;
    let mut offset = 0u64;
    loop {
        let mut hasher = blake3::Hasher::new();
        let decoded_len = io::copy(&mut decoder, &mut hasher)
            .with_context(|| format!("{label}: frame {index}"))?;
        let end = decoder.source().position();

        let info = FrameInfo {
            index,
            offset,
            compressed_len: end - offset,
            declared_size: decoder.content_size().into(),
            decoded_len,
            window_size: next.header.as_ref().and_then(|h| h.window_size),
            dictionary_id: next.header.as_ref().and_then(|h| h.dictionary_id),
            checksum: next.header.as_ref().is_some_and(FrameHeader::has_checksum),
            blake3: hasher.finalize().to_hex().to_string(),
        };
        print_frame(&mut stdout, &info, args.json)?;

        index += 1;
        offset = end;
        next = Peeked::from_source(decoder.source_mut())?;
        match decoder
            .reopen(None)
            .with_context(|| next.context(&label, index, offset))?
        {
            Status::Active => {}
            Status::AtFrameEnd | Status::Errored => break,
        }
    }

    Ok(())
}

/// What the bytes at the start of the next frame look like, for display
/// and for error context.
struct Peeked {
    header: Option<FrameHeader>,
    kind: Option<FrameKind>,
}

impl Peeked {
    fn from_source<S: PeekSource>(source: &mut S) -> Result<Self> {
        let mut window = [0u8; PEEK_WINDOW];
        let n = source.peek(&mut window).context("cannot read input")?;
        Ok(Self {
            header: FrameHeader::parse(&window[..n]).ok(),
            kind: FrameKind::classify(&window[..n]).ok(),
        })
    }

    /// The reader reports every foreign magic as bad magic; name the
    /// skippable ones so the user knows what sits there.
    fn context(&self, label: &str, index: u64, offset: u64) -> String {
        match self.kind {
            Some(FrameKind::Skippable { magic }) => {
                format!("{label}: frame {index} at offset {offset} is a skippable frame ({magic:#010X})")
            }
            Some(FrameKind::Unknown { magic }) => {
                format!("{label}: frame {index} at offset {offset} has unknown magic {magic:#010X}")
            }
            Some(FrameKind::Zstd) | None => format!("{label}: frame {index} at offset {offset}"),
        }
    }
}

fn print_frame(out: &mut impl io::Write, info: &FrameInfo, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, info).context("cannot encode JSON")?;
        writeln!(out)?;
        return Ok(());
    }

    let opt = |v: Option<u64>| v.map_or_else(|| "unknown".to_string(), |v| v.to_string());
    writeln!(
        out,
        "{:<6} {:<10} {:<11} {:<10} {:<10} {:<10} {:<9} {}",
        info.index,
        info.offset,
        info.compressed_len,
        opt(info.declared_size),
        info.decoded_len,
        opt(info.window_size),
        if info.checksum { "yes" } else { "no" },
        &info.blake3[..16],
    )?;
    Ok(())
}
