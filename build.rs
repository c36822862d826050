fn main() {
    // CI injects the hash; fall back to the local checkout
    let git_hash = std::env::var("KNOCK_BUILD_GIT_HASH")
        .ok()
        .or_else(get_git_hash)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=KNOCK_BUILD_GIT_HASH={git_hash}");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=KNOCK_BUILD_GIT_HASH");
}

fn get_git_hash() -> Option<String> {
    // Shell out to git; no git2 dependency
    use std::process::Command;

    let hash_output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !hash_output.status.success() {
        return None;
    }
    let hash = String::from_utf8(hash_output.stdout).ok()?;
    let short_hash = hash.trim();

    let diff_output = Command::new("git").args(["diff", "--quiet"]).output().ok();
    let is_dirty = diff_output.is_some_and(|output| !output.status.success());

    let suffix = if is_dirty { "-dirty" } else { "" };
    Some(format!("{short_hash}{suffix}"))
}
