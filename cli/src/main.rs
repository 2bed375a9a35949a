use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use geojson::Feature;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use shapes::{Measurement, Session, Shape};
use tokio::io::AsyncReadExt;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} contains no shapes")]
    NoShapes(String),
    #[error(transparent)]
    Shape(#[from] shapes::ShapeError),
    #[error(transparent)]
    Session(#[from] shapes::SessionError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "webgis", about = "Draw, measure, and overlay shapes against a WebGIS server")]
struct Cli {
    #[arg(long, env = "WEBGIS_BASE_URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is up.
    Ping,
    /// Print every stored feature as GeoJSON.
    List,
    /// Measure the shapes in a GeoJSON file.
    Measure {
        #[arg(default_value = "-", help = "GeoJSON file path, or - for stdin")]
        input: String,
    },
    /// Overlap of exactly two polygons.
    Intersect(OverlayArgs),
    /// Clip the first shape by the second (polygon) shape.
    Clip(OverlayArgs),
    /// Union of two or more polygons.
    Dissolve(OverlayArgs),
    /// Save every shape in a GeoJSON file as a new feature.
    Add {
        #[arg(default_value = "-", help = "GeoJSON file path, or - for stdin")]
        input: String,
        #[arg(long, help = "Name stored with every feature")]
        name: Option<String>,
    },
    /// Upload a shapefile (.zip, .shp) or any other ogr2ogr-readable file.
    Upload { path: PathBuf },
    /// Download the stored features as a zipped shapefile.
    Download {
        #[arg(short, long, default_value = "bangunan.zip")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct OverlayArgs {
    #[arg(default_value = "-", help = "GeoJSON file path, or - for stdin")]
    input: String,

    #[arg(long, default_value_t = false, help = "Save the result as a new feature")]
    save: bool,

    #[arg(long, help = "Name for the result feature")]
    name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlay {
    Intersect,
    Clip,
    Dissolve,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = CliContext { base_url: cli.base_url };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::List => run_list(&ctx).await,
        Command::Measure { input } => run_measure(&input).await,
        Command::Intersect(args) => run_overlay(&ctx, Overlay::Intersect, args).await,
        Command::Clip(args) => run_overlay(&ctx, Overlay::Clip, args).await,
        Command::Dissolve(args) => run_overlay(&ctx, Overlay::Dissolve, args).await,
        Command::Add { input, name } => run_add(&ctx, &input, name).await,
        Command::Upload { path } => run_upload(&ctx, &path).await,
        Command::Download { output } => run_download(&ctx, &output).await,
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let url = endpoint(&cli.base_url, "/healthz")?;
    ensure_success(reqwest::get(url).await?).await?;
    println!("ok");
    Ok(())
}

async fn run_list(cli: &CliContext) -> Result<(), CliError> {
    let url = endpoint(&cli.base_url, "/data.geojson")?;
    let json = ensure_success(reqwest::get(url).await?).await?.json::<Value>().await?;
    let count = json.get("features").and_then(Value::as_array).map_or(0, Vec::len);
    print_json(&json)?;
    eprintln!("{count} features");
    Ok(())
}

async fn run_measure(input: &str) -> Result<(), CliError> {
    let session = session_from_text(&read_input(input).await?, input)?;
    print!("{}", measure_table(&session));
    Ok(())
}

async fn run_overlay(cli: &CliContext, op: Overlay, args: OverlayArgs) -> Result<(), CliError> {
    let mut session = session_from_text(&read_input(&args.input).await?, &args.input)?;
    let Some(mut shape) = apply_overlay(&mut session, op)? else {
        eprintln!("shapes do not overlap; nothing to output");
        return Ok(());
    };
    if let Some(name) = args.name {
        shape.name = Some(name);
    }

    let feature = shape.to_feature();
    print_json(&serde_json::to_value(&feature)?)?;
    eprintln!("{}", Measurement::of(&shape));

    if args.save {
        let message = post_feature(cli, &feature).await?;
        eprintln!("{message}");
    }
    Ok(())
}

async fn run_add(cli: &CliContext, input: &str, name: Option<String>) -> Result<(), CliError> {
    let session = session_from_text(&read_input(input).await?, input)?;
    for shape in session.shapes() {
        let mut shape = shape.clone();
        if let Some(name) = &name {
            shape.name = Some(name.clone());
        }
        let message = post_feature(cli, &shape.to_feature()).await?;
        println!("{} {}: {message}", shape.kind.as_str(), shape.id);
    }
    Ok(())
}

async fn run_upload(cli: &CliContext, path: &Path) -> Result<(), CliError> {
    let data = tokio::fs::read(path).await.map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());

    let form = Form::new().part("file", Part::bytes(data).file_name(file_name));
    let url = endpoint(&cli.base_url, "/upload")?;
    let response = reqwest::Client::new().post(url).multipart(form).send().await?;
    println!("{}", ensure_success(response).await?.text().await?);
    Ok(())
}

async fn run_download(cli: &CliContext, output: &Path) -> Result<(), CliError> {
    let url = endpoint(&cli.base_url, "/download")?;
    let bytes = ensure_success(reqwest::get(url).await?).await?.bytes().await?;
    tokio::fs::write(output, &bytes).await.map_err(|source| CliError::Write {
        path: output.display().to_string(),
        source,
    })?;
    println!("saved {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

async fn post_feature(cli: &CliContext, feature: &Feature) -> Result<String, CliError> {
    let url = endpoint(&cli.base_url, "/add_feature")?;
    let response = reqwest::Client::new().post(url).json(feature).send().await?;
    Ok(ensure_success(response).await?.text().await?)
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CliError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CliError::ServerError { status: status.as_u16(), message })
}

fn endpoint(base_url: &str, path: &str) -> Result<String, CliError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_host {
        return Err(CliError::InvalidBaseUrl(base_url.to_owned()));
    }
    Ok(format!("{trimmed}{path}"))
}

async fn read_input(input: &str) -> Result<String, CliError> {
    let to_error = |source| CliError::Read { path: input.to_owned(), source };
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await.map_err(to_error)?;
        Ok(text)
    } else {
        tokio::fs::read_to_string(input).await.map_err(to_error)
    }
}

/// Load every shape in `text` into a fresh session with all of them selected.
fn session_from_text(text: &str, source: &str) -> Result<Session, CliError> {
    let shapes = shapes::parse_shapes(text)?;
    if shapes.is_empty() {
        return Err(CliError::NoShapes(source.to_owned()));
    }
    let mut session = Session::new();
    session.load(shapes);
    session.select_all();
    Ok(session)
}

fn apply_overlay(session: &mut Session, op: Overlay) -> Result<Option<Shape>, CliError> {
    let shape = match op {
        Overlay::Intersect => session.intersect_selected()?.cloned(),
        Overlay::Clip => session.clip_selected()?.cloned(),
        Overlay::Dissolve => Some(session.dissolve_selected()?.clone()),
    };
    Ok(shape)
}

fn measure_table(session: &Session) -> String {
    session
        .shapes()
        .iter()
        .map(|shape| {
            let name = shape.name.as_deref().unwrap_or("-");
            format!("{:>3}  {:<16} {}\n", shape.id, name, Measurement::of(shape))
        })
        .collect()
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
