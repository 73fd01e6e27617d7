//! Session description rewriting that biases the encoder toward low latency.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Appended to every existing format-parameter line (kbps).
pub const BITRATE_HINTS: &str = ";max-bitrate=10000;min-bitrate=2000;start-bitrate=5000";

/// Parameters pinned for every H264 payload type.
pub const H264_PROFILE: &str =
    "profile-level-id=42e01f;level-asymmetry-allowed=1;packetization-mode=1";

static H264_RTPMAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^a=rtpmap:(\d+) H264/").expect("static pattern"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdpError {
    #[error("session description is empty")]
    Empty,
    #[error("session description does not start with a version line")]
    MissingVersion,
}

/// Rewrites `sdp` line by line, keeping its line endings:
///
/// * every `a=fmtp:` line gets [`BITRATE_HINTS`] appended;
/// * every `a=rtpmap:<pt> H264/...` line is followed by a new
///   `a=fmtp:<pt>` line carrying [`H264_PROFILE`].
///
/// The output is a pure function of the input.
pub fn bias_for_latency(sdp: &str) -> Result<String, SdpError> {
    if sdp.trim().is_empty() {
        return Err(SdpError::Empty);
    }
    if !sdp.starts_with("v=") {
        return Err(SdpError::MissingVersion);
    }

    let eol = if sdp.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines = Vec::new();

    for line in sdp.split(eol) {
        if line.starts_with("a=fmtp:") {
            lines.push(format!("{line}{BITRATE_HINTS}"));
            continue;
        }

        lines.push(line.to_owned());
        if let Some(caps) = H264_RTPMAP.captures(line) {
            lines.push(format!("a=fmtp:{} {}", &caps[1], H264_PROFILE));
        }
    }

    Ok(lines.join(eol))
}
