//! asset-schema CLI - inspect game assets and dump them through the codecs.

use std::env;
use std::path::Path;

use asset_schema::assets::{
    Armature, ArmatureStructurer, Image, ImageStructurer, Level, LevelStructurer, Placeholder,
    PlaceholderStructurer,
};
use asset_schema::codec::{debug_text, json};
use asset_schema::{Content, Error, Field, JsonOptions, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// A decoded asset of any supported kind.
enum Asset {
    Armature(Armature),
    Level(Level),
    Placeholder(Placeholder),
    Image(Image),
}

impl Asset {
    fn load(path: &str) -> Result<Self> {
        let content = Content::open(path)?;
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        tracing::debug!(path, ext = %ext, size = content.len(), "loading asset");
        match ext.as_str() {
            "arm" => ArmatureStructurer::new(&content).read_value().map(Asset::Armature),
            "lvl" => LevelStructurer::new(&content).read_value().map(Asset::Level),
            "plh" => PlaceholderStructurer::new(&content).read_value().map(Asset::Placeholder),
            "png" => ImageStructurer::new(&content).read_value().map(Asset::Image),
            _ => Err(Error::unsupported("asset", format!("unknown extension {:?}", ext))),
        }
    }

    fn field(&self) -> &dyn Field {
        match self {
            Asset::Armature(a) => a,
            Asset::Level(l) => l,
            Asset::Placeholder(p) => p,
            Asset::Image(i) => i,
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "warn";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => with_file(&filtered_args, "info <file>", cmd_info),
        "json" | "j" => {
            let compact = filtered_args.iter().any(|&s| s == "--compact" || s == "-c");
            with_file(&filtered_args, "json <file> [--compact]", |path| cmd_json(path, compact))
        }
        "text" | "t" => with_file(&filtered_args, "text <file>", cmd_text),
        "version" | "V" | "--version" => {
            cmd_version();
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        // Passing a file directly is equivalent to 'info'
        path if Path::new(path).extension().is_some() => cmd_info(path),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'asset-schema-cli help' for usage.");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn with_file(args: &[&str], usage: &str, run: impl FnOnce(&str) -> Result<()>) -> Result<()> {
    match args.get(1) {
        Some(path) => run(path),
        None => {
            eprintln!("Error: missing file argument");
            eprintln!("Usage: asset-schema-cli {}", usage);
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("asset-schema-cli - game asset inspector");
    println!();
    println!("USAGE:");
    println!("    asset-schema-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>              Show a summary of the asset");
    println!("    j, json   <file> [--compact]  Dump the decoded asset as JSON");
    println!("    t, text   <file>              Dump the decoded asset as debug text");
    println!("    V, version                    Show version and build date");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("FORMATS:");
    println!("    .arm  armature      .lvl  level");
    println!("    .plh  placeholder   .png  RGB/RGBA image");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn cmd_info(path: &str) -> Result<()> {
    let asset = Asset::load(path)?;
    println!("File: {}", path);
    match &asset {
        Asset::Armature(a) => {
            println!("Armature: {}", a.name);
            println!("  Joints:  {} ({} roots)", a.joints.len(), a.root_count);
            println!("  Actions: {}", a.actions.len());
            for action in &a.actions {
                println!(
                    "    {} - {} frames{}{}",
                    action.name,
                    action.frames.len(),
                    if action.positions.is_some() { ", positions" } else { "" },
                    if action.orientations.is_some() { ", orientations" } else { "" },
                );
            }
        }
        Asset::Level(l) => {
            println!("Level: {}", l.name);
            println!("  Meshes: {}", l.meshes.len());
            for mesh in &l.meshes {
                println!(
                    "    {} - {} vertices, {} triangles{}",
                    mesh.name,
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    if mesh.uvs.is_some() { ", uvs" } else { "" },
                );
            }
        }
        Asset::Placeholder(p) => {
            println!("Placeholder: {}", p.name);
            println!("  Vertices:  {}", p.vertices.len() / 3);
            println!("  Triangles: {}", p.indices.len() / 3);
        }
        Asset::Image(i) => {
            println!("Image: {}x{}", i.width, i.height);
            println!("  Color:     {:?}", i.color);
            println!("  Bit depth: {}", i.bit_depth);
            println!("  Channels:  {}", i.channels);
        }
    }
    Ok(())
}

fn cmd_json(path: &str, compact: bool) -> Result<()> {
    let asset = Asset::load(path)?;
    let options = JsonOptions {
        pretty: !compact,
        ..JsonOptions::default()
    };
    println!("{}", json::to_string_with(asset.field(), options)?);
    Ok(())
}

fn cmd_text(path: &str) -> Result<()> {
    let asset = Asset::load(path)?;
    println!("{}", debug_text::to_string(asset.field())?);
    Ok(())
}

fn cmd_version() {
    println!("asset-schema-cli {}", env!("CARGO_PKG_VERSION"));
    println!(
        "built {} {}",
        env!("ASSET_SCHEMA_BUILD_DATE"),
        env!("ASSET_SCHEMA_BUILD_TIME")
    );
}
