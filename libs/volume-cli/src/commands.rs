//! Subcommand implementations.
//!
//! Each command returns the process exit code on success. Errors returned
//! here are harness failures (unreadable files, bad arguments) and map to
//! exit code 4 in `main`.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use config::constants::{DEFAULT_PREVIEW_SEGMENTS, QUATERNION_NORM_TOLERANCE};
use serde_json::{json, Value};
use std::fs;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use volume_engine::preview::volume_preview_mesh;
use volume_engine::schema::{json_schema, tool_schemas};
use volume_engine::{EngineConfig, ExecutionEngine, FailurePolicy, ResultReporter, SchemaValidator};
use volume_mesh::io::{mesh_from_json, mesh_to_json, write_obj};
use volume_mesh::EditableMesh;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON document result
    Json,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Tool-call document (`-` for stdin)
    #[arg(short, long)]
    pub document: PathBuf,

    /// Input mesh JSON file
    #[arg(short, long)]
    pub mesh: PathBuf,

    /// Write the mutated mesh as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the mutated mesh as Wavefront OBJ
    #[arg(long)]
    pub obj_out: Option<PathBuf>,

    /// Keep running after a failed call
    #[arg(long)]
    pub continue_on_error: bool,

    /// Accepted deviation of quaternion norms from 1
    #[arg(long, default_value_t = QUATERNION_NORM_TOLERANCE)]
    pub quaternion_tolerance: f64,

    /// Skip the volume-center sanity check
    #[arg(long)]
    pub no_scene_check: bool,

    /// Result format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Tool-call document (`-` for stdin)
    #[arg(short, long)]
    pub document: PathBuf,

    /// Accepted deviation of quaternion norms from 1
    #[arg(long, default_value_t = QUATERNION_NORM_TOLERANCE)]
    pub quaternion_tolerance: f64,

    /// Result format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Print one `{name, description, input_schema}` entry per function
    #[arg(long)]
    pub tools: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Tool-call document (`-` for stdin)
    #[arg(short, long)]
    pub document: PathBuf,

    /// Index of the call whose volume is previewed
    #[arg(short, long, default_value_t = 0)]
    pub call: usize,

    /// Segments for spheres and cylinders
    #[arg(long, default_value_t = DEFAULT_PREVIEW_SEGMENTS)]
    pub segments: u32,

    /// Output file; `.obj` writes OBJ, anything else JSON
    #[arg(short, long)]
    pub out: PathBuf,
}

/// Executes a document against a mesh file.
pub fn run(args: &RunArgs) -> Result<u8> {
    let text = read_input(&args.document)?;
    let mut mesh = load_mesh(&args.mesh)?;
    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loaded mesh"
    );

    let policy = if args.continue_on_error {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };
    let mut config = EngineConfig::default()
        .with_failure_policy(policy)
        .with_quaternion_tolerance(args.quaternion_tolerance);
    if args.no_scene_check {
        config = config.with_scene_bounds_margin(None);
    }

    let result = ExecutionEngine::new(config).execute_str(&text, &mut mesh);
    print_result(&result, args.format)?;

    if let Some(path) = &args.output {
        write_file(path, &mesh_to_json(&mesh)?)?;
    }
    if let Some(path) = &args.obj_out {
        write_obj_file(path, &mesh)?;
    }

    Ok(exit_code(result.exit_code()))
}

/// Validates a document and reports every violation.
pub fn validate(args: &ValidateArgs) -> Result<u8> {
    let text = read_input(&args.document)?;
    let validator = SchemaValidator::new().with_quaternion_tolerance(args.quaternion_tolerance);

    match validator.validate_str(&text) {
        Ok(document) => {
            match args.format {
                OutputFormat::Text => println!("valid: {} call(s)", document.len()),
                OutputFormat::Json => println!("{}", json!({"valid": true, "calls": document.len()})),
            }
            Ok(0)
        }
        Err(err) => {
            let raw = serde_json::from_str::<Value>(&text).ok();
            let result = ResultReporter::validation_failed(err, raw.as_ref());
            print_result(&result, args.format)?;
            Ok(exit_code(result.exit_code()))
        }
    }
}

/// Prints the document schema.
pub fn schema(args: &SchemaArgs) -> Result<u8> {
    let value = if args.tools {
        Value::Array(tool_schemas())
    } else {
        json_schema()
    };
    let text = serde_json::to_string_pretty(&value)?;

    match &args.output {
        Some(path) => write_file(path, &text)?,
        None => println!("{text}"),
    }
    Ok(0)
}

/// Writes the preview mesh of one call's volume.
pub fn preview(args: &PreviewArgs) -> Result<u8> {
    let text = read_input(&args.document)?;
    let document = match SchemaValidator::default().validate_str(&text) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("{err}");
            return Ok(1);
        }
    };

    let Some(call) = document.tool_calls.get(args.call) else {
        bail!(
            "call index {} out of range (document has {} calls)",
            args.call,
            document.len()
        );
    };

    let mesh = volume_preview_mesh(&call.volume, args.segments)
        .with_context(|| format!("failed to build preview for {}", call.volume))?;
    write_mesh(&args.out, &mesh)?;
    info!(call = args.call, volume = %call.volume, "wrote preview");
    println!("{}: {}", call.function(), call.volume);
    Ok(0)
}

fn print_result(result: &volume_engine::DocumentResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{result}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}

fn exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(4)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read document from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_mesh(path: &Path) -> Result<EditableMesh> {
    let text = read_input(path)?;
    mesh_from_json(&text).with_context(|| format!("invalid mesh file {}", path.display()))
}

fn write_mesh(path: &Path, mesh: &EditableMesh) -> Result<()> {
    let is_obj = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if is_obj {
        write_obj_file(path, mesh)
    } else {
        write_file(path, &mesh_to_json(mesh)?)
    }
}

fn write_obj_file(path: &Path, mesh: &EditableMesh) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_obj(mesh, BufWriter::new(file)).with_context(|| format!("failed to write {}", path.display()))
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    const CUBE: &str = r#"{
        "vertices": [[-1,-1,-1],[1,-1,-1],[1,1,-1],[-1,1,-1],[-1,-1,1],[1,-1,1],[1,1,1],[-1,1,1]],
        "faces": [[0,3,2,1],[4,5,6,7],[0,1,5,4],[2,3,7,6],[3,0,4,7],[1,2,6,5]],
        "materials": ["Glass"]
    }"#;

    const DOCUMENT: &str = r#"{"tool_calls": [{
        "function_name": "apply_material_to_volume",
        "parameters": {
            "volume_identifier": {"type": "box", "center_xyz": [0, 0, 1], "dimensions_xyz": [3, 3, 0.5]},
            "material_name": "Glass"
        }
    }]}"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_run_writes_mutated_mesh() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.json");
        let obj = dir.path().join("out.obj");

        let args = RunArgs {
            document: write(&dir, "doc.json", DOCUMENT),
            mesh: write(&dir, "mesh.json", CUBE),
            output: Some(out.clone()),
            obj_out: Some(obj.clone()),
            continue_on_error: false,
            quaternion_tolerance: QUATERNION_NORM_TOLERANCE,
            no_scene_check: false,
            format: OutputFormat::Json,
        };
        assert_eq!(run(&args).unwrap(), 0);

        let written = mesh_from_json(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written.face(1).material.as_deref(), Some("Glass"));
        assert!(fs::read_to_string(&obj).unwrap().contains("usemtl Glass"));
    }

    #[test]
    fn test_validate_reports_exit_code_one() {
        let dir = tempdir().unwrap();
        let args = ValidateArgs {
            document: write(
                &dir,
                "invalid.json",
                r#"{"tool_calls": [{"function_name": "melt", "parameters": {}}]}"#,
            ),
            quaternion_tolerance: QUATERNION_NORM_TOLERANCE,
            format: OutputFormat::Text,
        };
        assert_eq!(validate(&args).unwrap(), 1);
    }

    #[test]
    fn test_missing_file_is_harness_error() {
        let dir = tempdir().unwrap();
        let args = ValidateArgs {
            document: dir.path().join("does-not-exist.json"),
            quaternion_tolerance: QUATERNION_NORM_TOLERANCE,
            format: OutputFormat::Text,
        };
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_schema_writes_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("tools.json");
        let args = SchemaArgs {
            tools: true,
            output: Some(out.clone()),
        };
        assert_eq!(schema(&args).unwrap(), 0);

        let tools: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(tools.as_array().map(Vec::len), Some(7));
    }

    #[test]
    fn test_preview_writes_obj() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("preview.obj");
        let args = PreviewArgs {
            document: write(&dir, "preview-doc.json", DOCUMENT),
            call: 0,
            segments: 8,
            out: out.clone(),
        };
        assert_eq!(preview(&args).unwrap(), 0);
        let obj = fs::read_to_string(&out).unwrap();
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 8);

        let bad = PreviewArgs { call: 3, ..args };
        assert!(preview(&bad).is_err());
    }

    #[test]
    fn test_exit_code_range() {
        assert_eq!(exit_code(2), 2);
        assert_eq!(exit_code(-1), 4);
    }
}
