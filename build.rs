use std::process::Command;

fn main() {
    // Container builds usually ship without .git, so let the caller stamp the hash.
    let from_env = std::env::var("GIT_HASH").ok().filter(|s| !s.trim().is_empty());

    let git_hash = from_env
        .or_else(|| {
            Command::new("git")
                .args(["rev-parse", "--short", "HEAD"])
                .output()
                .ok()
                .filter(|o| o.status.success())
                .and_then(|o| String::from_utf8(o.stdout).ok())
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-env-changed=GIT_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
