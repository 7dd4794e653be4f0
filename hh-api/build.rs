//! Stamps the hh-api binaries with the commit, build time and cargo profile
//! they were built from. `/build_info` and the startup log report them.

use std::process::Command;

/// Short commit id of the checkout, or "unknown" outside a git work tree
fn commit_id() -> String {
    let output = match Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output() {
        Ok(output) if output.status.success() => output.stdout,
        _ => return "unknown".to_string(),
    };
    String::from_utf8_lossy(&output).trim().to_string()
}

fn main() {
    let stamps = [
        ("GIT_HASH", commit_id()),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
        (
            "BUILD_PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];

    for (key, value) in stamps {
        println!("cargo:rustc-env={}={}", key, value);
    }

    // Without rerun-if-changed lines cargo reruns this on every build, which
    // keeps the timestamp and commit current.
}
