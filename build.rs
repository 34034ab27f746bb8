use std::process::Command;

fn main() {
    // Git hash shown in the footer next to the sources
    let output = Command::new("git").args(["rev-parse", "--short", "HEAD"]).output();
    let git_hash = match output {
        Ok(o) if o.status.success() => {
            String::from_utf8_lossy(&o.stdout).trim().to_string()
        }
        _ => "unknown".to_string(),
    };
    println!("cargo:rustc-env=APP_GIT_HASH={}", git_hash);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=assets/data.json");
}
