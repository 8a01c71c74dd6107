use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// Short commit id of the checkout, if built from a git tree.
fn commit_id() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let sha = String::from_utf8(output.stdout).ok()?;
    let sha = sha.trim();
    (!sha.is_empty()).then(|| sha.to_string())
}

/// Unix seconds; `SOURCE_DATE_EPOCH` wins for reproducible builds.
fn build_timestamp() -> String {
    env::var("SOURCE_DATE_EPOCH").unwrap_or_else(|_| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        now.as_secs().to_string()
    })
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let sha = commit_id().unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=JOBHUNT_GIT_SHA={sha}");
    println!("cargo:rustc-env=JOBHUNT_BUILD_TS={}", build_timestamp());
}
