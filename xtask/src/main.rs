use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

const EXTENSION_DIR: &str = "extension";
const DIST_DIR: &str = "extension/dist";
const WASM_TARGET: &str = "wasm32-unknown-unknown";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Daily Verses task runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the browser extension (popup + background worker) into extension/dist
    Build {
        /// Optimized build
        #[arg(short, long)]
        release: bool,
    },

    /// Run tests
    Test {
        #[command(subcommand)]
        test_type: Option<TestType>,
    },

    /// Run clippy linter
    Clippy,

    /// Remove extension/dist
    Clean,
}

#[derive(Subcommand)]
enum TestType {
    /// Test the scheduler/presenter core only
    Core,

    /// Run all native Rust tests
    Unit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { release } => build(release),
        Commands::Test { test_type } => test(test_type),
        Commands::Clippy => clippy(),
        Commands::Clean => clean(),
    }
}

fn build(release: bool) -> Result<()> {
    let profile = if release { "release" } else { "debug" };

    println!("🔨 Building popup with wasm-pack...");
    let mut args = vec![
        "build",
        EXTENSION_DIR,
        "--target",
        "web",
        "--out-dir",
        "dist/pkg/popup",
    ];
    if !release {
        args.push("--dev");
    }
    run_cmd("wasm-pack", &args)?;

    println!("🔨 Building background worker...");
    let mut args = vec![
        "build",
        "-p",
        "daily-verses-extension",
        "--bin",
        "background",
        "--no-default-features",
        "--target",
        WASM_TARGET,
    ];
    if release {
        args.push("--release");
    }
    run_cmd("cargo", &args)?;

    let wasm = format!("target/{}/{}/background.wasm", WASM_TARGET, profile);
    let out_dir = format!("{}/pkg/background", DIST_DIR);
    run_cmd(
        "wasm-bindgen",
        &["--target", "web", "--out-dir", &out_dir, &wasm],
    )?;

    println!("📦 Copying static files...");
    let static_dir = Path::new(EXTENSION_DIR).join("static");
    check_no_inline_scripts(&static_dir)?;
    copy_dir(&static_dir, Path::new(DIST_DIR))?;

    println!("\n✅ Extension ready in {} (load it unpacked)", DIST_DIR);
    Ok(())
}

fn test(test_type: Option<TestType>) -> Result<()> {
    match test_type {
        Some(TestType::Core) => {
            println!("🧪 Testing verse-core...");
            run_cmd("cargo", &["test", "-p", "verse-core"])?;
        }
        Some(TestType::Unit) | None => {
            println!("🧪 Running all tests...");
            run_cmd("cargo", &["test"])?;
        }
    }
    Ok(())
}

fn clippy() -> Result<()> {
    println!("🔍 Running clippy on native crates (warnings as errors)...");
    run_cmd("cargo", &["clippy", "--all-targets", "--", "-D", "warnings"])?;

    println!("🔍 Running clippy on the extension...");
    run_cmd(
        "cargo",
        &[
            "clippy",
            "-p",
            "daily-verses-extension",
            "--target",
            WASM_TARGET,
            "--",
            "-D",
            "warnings",
        ],
    )?;
    Ok(())
}

fn clean() -> Result<()> {
    println!("🧹 Removing {}...", DIST_DIR);
    // Ignore error if it was never built
    let _ = fs::remove_dir_all(DIST_DIR);
    Ok(())
}

// Helper functions

/// Extension pages run under `script-src 'self'`, so every script needs a `src`
fn check_no_inline_scripts(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("html") {
            continue;
        }
        let html = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if let Some(tag) = inline_script(&html) {
            anyhow::bail!("Inline script in {}: {}", path.display(), tag);
        }
    }
    Ok(())
}

fn inline_script(html: &str) -> Option<&str> {
    html.match_indices("<script").find_map(|(start, _)| {
        let end = html[start..].find('>')? + start + 1;
        let tag = &html[start..end];
        (!tag.contains("src=")).then_some(tag)
    })
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("Failed to create {}", to.display()))?;

    for entry in fs::read_dir(from).with_context(|| format!("Failed to read {}", from.display()))? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

fn run_cmd(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run: {} {}", program, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("Command failed: {} {}", program, args.join(" "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_script_detected() {
        let html = r#"<body><script type="module">init();</script></body>"#;
        assert_eq!(inline_script(html), Some(r#"<script type="module">"#));

        let html = r#"<body><script type="module" src="popup.js"></script></body>"#;
        assert_eq!(inline_script(html), None);
    }

    #[test]
    fn test_extension_pages_load_external_scripts() {
        let static_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join(EXTENSION_DIR)
            .join("static");
        check_no_inline_scripts(&static_dir).unwrap();
        assert!(static_dir.join("popup.js").exists());
    }
}
