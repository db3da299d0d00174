// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use crate::services::swap::scheduler::RunMode;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "autoswap: recurring router swaps with retry and recovery")]
pub struct Cli {
    /// Path to config file (default: config.{json,toml,...})
    #[arg(long)]
    pub config: Option<String>,

    /// Number of cycles to run (manual mode)
    #[arg(long)]
    pub cycles: Option<u32>,

    /// Run 3 cycles now and again every 24 hours
    #[arg(long, default_value_t = false)]
    pub daily: bool,
}

impl Cli {
    /// Mode chosen by flags alone; `None` means the user has to be asked.
    pub fn run_mode(&self) -> Result<Option<RunMode>, AppError> {
        if self.daily {
            return Ok(Some(RunMode::Daily));
        }
        match self.cycles {
            Some(0) => Err(AppError::Config("--cycles must be greater than 0".into())),
            Some(cycles) => Ok(Some(RunMode::Manual { cycles })),
            None => Ok(None),
        }
    }
}

/// Interactive fallback when neither `--daily` nor `--cycles` is given.
pub async fn prompt_run_mode<R, W>(
    reader: &mut R,
    writer: &mut W,
    default_cycles: u32,
) -> Result<RunMode, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let choice = ask(
        reader,
        writer,
        "Select cycle mode:\n  1) Manual (choose number of cycles)\n  2) Daily (3 cycles every 24 hours)\n> ",
    )
    .await?;
    match choice.as_str() {
        "2" | "d" | "daily" => return Ok(RunMode::Daily),
        "" | "1" | "m" | "manual" => {}
        other => {
            return Err(AppError::Config(format!("Unknown mode selection '{other}'")));
        }
    }

    loop {
        let answer = ask(
            reader,
            writer,
            &format!("Number of cycles [{default_cycles}]: "),
        )
        .await?;
        if answer.is_empty() {
            return Ok(RunMode::Manual {
                cycles: default_cycles,
            });
        }
        match answer.parse::<u32>() {
            Ok(cycles) if cycles > 0 => return Ok(RunMode::Manual { cycles }),
            _ => write_line(writer, "Cycle count must be a number greater than 0.\n").await?,
        }
    }
}

async fn ask<R, W>(reader: &mut R, writer: &mut W, question: &str) -> Result<String, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_line(writer, question).await?;
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .await
        .map_err(|e| AppError::Config(format!("Failed to read answer: {e}")))?;
    if read == 0 {
        return Err(AppError::Config("Input closed before a run mode was chosen".into()));
    }
    Ok(line.trim().to_lowercase())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<(), AppError> {
    writer
        .write_all(text.as_bytes())
        .await
        .map_err(|e| AppError::Config(format!("Failed to write prompt: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| AppError::Config(format!("Failed to write prompt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("autoswap").chain(args.iter().copied()))
    }

    #[test]
    fn daily_flag_wins_over_cycles() {
        assert_eq!(
            cli(&["--daily", "--cycles", "4"]).run_mode().unwrap(),
            Some(RunMode::Daily)
        );
        assert_eq!(
            cli(&["--cycles", "4"]).run_mode().unwrap(),
            Some(RunMode::Manual { cycles: 4 })
        );
        assert_eq!(cli(&[]).run_mode().unwrap(), None);
        assert!(cli(&["--cycles", "0"]).run_mode().is_err());
    }

    #[tokio::test]
    async fn prompt_defaults_and_revalidates() {
        let mut input: &[u8] = b"1\nzero\n0\n7\n";
        let mut output = Vec::new();
        let mode = prompt_run_mode(&mut input, &mut output, 3).await.unwrap();
        assert_eq!(mode, RunMode::Manual { cycles: 7 });
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("must be a number").count(), 2);

        let mut input: &[u8] = b"\n\n";
        let mut output = Vec::new();
        let mode = prompt_run_mode(&mut input, &mut output, 3).await.unwrap();
        assert_eq!(mode, RunMode::Manual { cycles: 3 });
    }

    #[tokio::test]
    async fn prompt_selects_daily_and_fails_on_eof() {
        let mut input: &[u8] = b"2\n";
        let mut output = Vec::new();
        assert_eq!(
            prompt_run_mode(&mut input, &mut output, 1).await.unwrap(),
            RunMode::Daily
        );

        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        assert!(prompt_run_mode(&mut input, &mut output, 1).await.is_err());
    }
}
