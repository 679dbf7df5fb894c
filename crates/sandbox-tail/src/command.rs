//! Command-line parsing and the commands themselves.

use crate::config::DEFAULT_LINES;
use sandbox_files::{File, Whence};
use std::io::Write;
use std::time::Duration;

/// Usage text printed on bad arguments.
pub const USAGE: &str = "\
usage: sandbox-tail <command> <path> [options]

commands:
  cat <path>                 print the whole file
  head <path> [-n N]         print the first N lines (default 10)
  tail <path> [-n N] [-f]    print the last N lines, optionally follow
  size <path>                print the size in bytes
  exists <path>              print whether the file exists";

/// Invalid command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing path")]
    MissingPath,

    #[error("invalid line count: {0}")]
    InvalidCount(String),

    #[error("unexpected argument: {0}")]
    Unexpected(String),
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Cat { path: String },
    Head { path: String, lines: usize },
    Tail { path: String, lines: usize, follow: bool },
    Size { path: String },
    Exists { path: String },
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let name = args.next().ok_or(UsageError::MissingCommand)?;
        let path = args.next().ok_or(UsageError::MissingPath)?;

        let mut lines = DEFAULT_LINES;
        let mut follow = false;
        let takes_lines = matches!(name.as_str(), "head" | "tail");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-n" if takes_lines => {
                    let value = args.next().ok_or(UsageError::InvalidCount(String::new()))?;
                    lines = value.parse().map_err(|_| UsageError::InvalidCount(value))?;
                }
                "-f" if name == "tail" => follow = true,
                _ => return Err(UsageError::Unexpected(arg)),
            }
        }

        match name.as_str() {
            "cat" => Ok(Self::Cat { path }),
            "head" => Ok(Self::Head { path, lines }),
            "tail" => Ok(Self::Tail {
                path,
                lines,
                follow,
            }),
            "size" => Ok(Self::Size { path }),
            "exists" => Ok(Self::Exists { path }),
            _ => Err(UsageError::UnknownCommand(name)),
        }
    }

    /// Path the command operates on.
    pub fn path(&self) -> &str {
        match self {
            Self::Cat { path }
            | Self::Head { path, .. }
            | Self::Tail { path, .. }
            | Self::Size { path }
            | Self::Exists { path } => path,
        }
    }
}

/// Run a command once, writing its output to `out`.
///
/// Following is handled separately by [`follow`].
pub async fn run<W: Write>(command: &Command, file: &mut File, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Cat { .. } => {
            let mut chunks = file.chunks(None);
            while let Some(chunk) = chunks.next().await? {
                out.write_all(&chunk.data)?;
            }
        }
        Command::Head { lines, .. } => {
            let mut reader = file.lines(None);
            for _ in 0..*lines {
                match reader.next().await? {
                    Some(line) => writeln!(out, "{line}")?,
                    None => break,
                }
            }
        }
        Command::Tail { lines, .. } => {
            let mut reader = file.lines_reverse(None);
            let mut last = Vec::with_capacity(*lines);
            while last.len() < *lines {
                match reader.next().await? {
                    Some(line) => last.push(line),
                    None => break,
                }
            }
            for line in last.iter().rev() {
                writeln!(out, "{line}")?;
            }
        }
        Command::Size { .. } => writeln!(out, "{}", file.size().await?)?,
        Command::Exists { .. } => writeln!(out, "{}", file.exists().await?)?,
    }
    out.flush()?;
    Ok(())
}

/// Print bytes appended after the current end of file, forever.
pub async fn follow<W: Write>(file: &mut File, out: &mut W, interval: Duration) -> anyhow::Result<()> {
    let start = file.seek(0, Whence::End).await?;
    tracing::debug!(file = %file, offset = start, "Following file");

    loop {
        tokio::time::sleep(interval).await;
        let fresh = file.read(None).await?;
        if !fresh.is_empty() {
            tracing::trace!(bytes = fresh.len(), offset = file.tell(), "New data");
            out.write_all(&fresh)?;
            out.flush()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_files::{FileConfig, MemoryHost};
    use std::sync::Arc;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn file(host: &Arc<MemoryHost>) -> File {
        File::new(host.clone(), "/log")
            .with_config(FileConfig::builder().chunk_size(4).build().unwrap())
    }

    async fn output(command: &str, content: &str) -> String {
        let host = Arc::new(MemoryHost::new("agent:5051").with_file("/log", content));
        let command = Command::parse(args(command)).unwrap();
        let mut out = Vec::new();
        run(&command, &mut file(&host), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Command::parse(args("cat /log")),
            Ok(Command::Cat {
                path: "/log".into()
            })
        );
        assert_eq!(
            Command::parse(args("tail stdout -n 3 -f")),
            Ok(Command::Tail {
                path: "stdout".into(),
                lines: 3,
                follow: true
            })
        );
        assert_eq!(
            Command::parse(args("head stdout")),
            Ok(Command::Head {
                path: "stdout".into(),
                lines: DEFAULT_LINES
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse(args("")), Err(UsageError::MissingCommand));
        assert_eq!(Command::parse(args("cat")), Err(UsageError::MissingPath));
        assert_eq!(
            Command::parse(args("grep /log")),
            Err(UsageError::UnknownCommand("grep".into()))
        );
        assert_eq!(
            Command::parse(args("head /log -n many")),
            Err(UsageError::InvalidCount("many".into()))
        );
        assert_eq!(
            Command::parse(args("cat /log -f")),
            Err(UsageError::Unexpected("-f".into()))
        );
    }

    #[tokio::test]
    async fn test_cat() {
        assert_eq!(output("cat /log", "a\nb\nunterminated").await, "a\nb\nunterminated");
    }

    #[tokio::test]
    async fn test_cat_keeps_multibyte_characters() {
        let content = "naïve\n日本語\n";
        assert_eq!(output("cat /log", content).await, content);
        assert_eq!(output("tail /log -n 1", content).await, "日本語\n");
    }

    #[tokio::test]
    async fn test_head_and_tail() {
        let content = "1\n2\n3\n4\n5\n";
        assert_eq!(output("head /log -n 2", content).await, "1\n2\n");
        assert_eq!(output("tail /log -n 2", content).await, "4\n5\n");
        assert_eq!(output("tail /log -n 9", content).await, content);
    }

    #[tokio::test]
    async fn test_size_and_exists() {
        assert_eq!(output("size /log", "12345").await, "5\n");
        assert_eq!(output("exists /log", "").await, "true\n");

        let host = Arc::new(MemoryHost::new("agent:5051"));
        let mut out = Vec::new();
        let command = Command::parse(args("exists /log")).unwrap();
        run(&command, &mut file(&host), &mut out).await.unwrap();
        assert_eq!(out, b"false\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_prints_appended_data() {
        let host = Arc::new(MemoryHost::new("agent:5051").with_file("/log", "old\n"));
        let mut f = file(&host);
        let mut out = Vec::new();

        let interval = Duration::from_secs(1);
        let appender = {
            let host = host.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                host.append("/log", "new\n");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        };

        tokio::select! {
            result = follow(&mut f, &mut out, interval) => panic!("follow ended: {result:?}"),
            _ = appender => {}
        }
        assert_eq!(out, b"new\n");
    }
}
