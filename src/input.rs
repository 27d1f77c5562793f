// input.rs - Target Collection
// Purpose: Gather URLs from the positional argument or, failing that, stdin

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Debug, Default)]
pub struct TargetList {
    pub targets: Vec<String>,
    /// Set when reading stdin failed part way; `targets` keeps what was read
    pub error: Option<std::io::Error>,
}

/// A positional URL wins and stdin is left untouched.
pub async fn collect_targets(url: Option<String>) -> TargetList {
    match url {
        Some(url) => TargetList {
            targets: vec![url],
            error: None,
        },
        None => read_targets(BufReader::new(tokio::io::stdin())).await,
    }
}

/// One target per line, whitespace trimmed, blank lines skipped.
///
/// Lines are read as raw bytes. Invalid UTF-8 is replaced rather than
/// rejected, so such a target fails later at fetch time and the lines after
/// it are still read. Only an I/O error stops reading.
pub async fn read_targets<R>(mut reader: R) -> TargetList
where
    R: AsyncBufRead + Unpin,
{
    let mut list = TargetList::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let target = line.trim();
                if !target.is_empty() {
                    list.targets.push(target.to_string());
                }
            }
            Err(e) => {
                list.error = Some(e);
                break;
            }
        }
    }

    list
}
