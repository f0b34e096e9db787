use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use solver_layout::gpu::vertex_buffer_layouts;
use solver_layout::logging::{init_logging, LoggingConfig};
use solver_layout::{
    palette, BuildVariant, Pairing, RecordLayout, SlotTable, UniformsVersion, VertexA,
    VertexArray, VertexVersion,
};

/// Solver renderer buffer layout inspector
#[derive(Parser, Debug)]
#[command(name = "solver-inspect")]
#[command(about = "Prints and validates the solver renderer's buffer layout tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Copy, Clone, Eq, PartialEq)]
enum Commands {
    /// Field tables of every uniforms and vertex schema
    Layouts,

    /// Slot tables of every build
    Slots,

    /// Which (build, uniforms, vertex) pairings are valid
    Pairings,

    /// Pack the reference triangle and verify the round trip
    Triangle,
}

// ── layouts ───────────────────────────────────────────────────────────────

fn all_layouts() -> Vec<RecordLayout> {
    UniformsVersion::ALL
        .iter()
        .map(|v| v.layout())
        .chain(VertexVersion::ALL.iter().map(|v| v.layout()))
        .collect()
}

fn layouts_text() -> Result<String> {
    let mut out = String::new();
    for layout in all_layouts() {
        writeln!(
            out,
            "{} ({} bytes, fingerprint {:016x})",
            layout.name(),
            layout.size(),
            layout.fingerprint()
        )?;
        for f in layout.fields() {
            writeln!(out, "  {:>4}  {:<16} {:<9} {:>3}", f.offset, f.name, f.ty, f.size)?;
        }
    }
    Ok(out)
}

fn layouts_json() -> Value {
    let records: Vec<Value> = all_layouts()
        .iter()
        .map(|layout| {
            let fields: Vec<Value> = layout
                .fields()
                .iter()
                .map(|f| json!({ "name": f.name, "type": f.ty.name(), "offset": f.offset, "size": f.size }))
                .collect();
            json!({
                "name": layout.name(),
                "size": layout.size(),
                "fingerprint": format!("{:016x}", layout.fingerprint()),
                "fields": fields,
            })
        })
        .collect();
    json!({ "records": records })
}

// ── slots ─────────────────────────────────────────────────────────────────

fn validated_table(build: BuildVariant) -> Result<SlotTable> {
    SlotTable::new(build, build.bindings().iter().copied())
        .with_context(|| format!("{build:?} slot table"))
}

fn slots_text() -> Result<String> {
    let mut out = String::new();
    for build in BuildVariant::ALL {
        let table = validated_table(build)?;
        writeln!(out, "{build:?}")?;
        for b in table.bindings() {
            writeln!(out, "  {:>2}  {:?}", b.slot, b.role)?;
        }
    }
    Ok(out)
}

fn slots_json() -> Result<Value> {
    let mut builds = Vec::new();
    for build in BuildVariant::ALL {
        let table = validated_table(build)?;
        let bindings: Vec<Value> = table
            .bindings()
            .iter()
            .map(|b| json!({ "role": format!("{:?}", b.role), "slot": b.slot }))
            .collect();
        builds.push(json!({ "build": format!("{build:?}"), "bindings": bindings }));
    }
    Ok(json!({ "builds": builds }))
}

// ── pairings ──────────────────────────────────────────────────────────────

fn all_pairings() -> impl Iterator<Item = Pairing> {
    BuildVariant::ALL.into_iter().flat_map(|build| {
        UniformsVersion::ALL.into_iter().flat_map(move |uniforms| {
            VertexVersion::ALL
                .into_iter()
                .map(move |vertex| Pairing::new(build, uniforms, vertex))
        })
    })
}

fn pairings_text() -> Result<String> {
    let mut out = String::new();
    for pairing in all_pairings() {
        let status = match vertex_buffer_layouts(&pairing) {
            Ok(buffers) => format!("ok ({} vertex buffers)", buffers.len()),
            Err(e) => format!("invalid: {e}"),
        };
        writeln!(
            out,
            "{:<12} {:<12} {:<9} {status}",
            format!("{:?}", pairing.build),
            pairing.uniforms.name(),
            pairing.vertex.name(),
        )?;
    }
    Ok(out)
}

fn pairings_json() -> Value {
    let rows: Vec<Value> = all_pairings()
        .map(|p| {
            let result = vertex_buffer_layouts(&p);
            json!({
                "build": format!("{:?}", p.build),
                "uniforms": p.uniforms.name(),
                "vertex": p.vertex.name(),
                "valid": result.is_ok(),
                "error": result.err().map(|e| e.to_string()),
            })
        })
        .collect();
    json!({ "pairings": rows })
}

// ── triangle ──────────────────────────────────────────────────────────────

fn reference_triangle() -> VertexArray {
    let n = [0.0, 0.0, 1.0];
    VertexArray::A(vec![
        VertexA::new([0.0, 0.0, 0.0], n, palette::RED),
        VertexA::new([0.0, 1.0, 0.0], n, palette::GREEN),
        VertexA::new([0.0, 0.0, 0.0], n, palette::BLUE),
    ])
}

fn triangle_bytes() -> Result<Vec<u8>> {
    let triangle = reference_triangle();
    let bytes = triangle.pack();
    let back = VertexArray::unpack(&bytes, VertexVersion::A).context("unpacking triangle")?;
    if back != triangle {
        bail!("triangle did not survive the round trip");
    }
    log::debug!("triangle packed to {} bytes", bytes.len());
    Ok(bytes)
}

fn triangle_text() -> Result<String> {
    let bytes = triangle_bytes()?;
    let mut out = String::new();
    writeln!(out, "{} bytes, round trip ok", bytes.len())?;
    // One row per 3-lane field.
    for (i, row) in bytes.chunks(12).enumerate() {
        let hex: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
        writeln!(out, "  {:>4}  {}", i * 12, hex.join(" "))?;
    }
    Ok(out)
}

fn triangle_json() -> Result<Value> {
    let bytes = triangle_bytes()?;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(json!({ "record": VertexVersion::A.name(), "length": bytes.len(), "hex": hex }))
}

fn run(cli: &Cli) -> Result<()> {
    let output = match (cli.command, cli.json) {
        (Commands::Layouts, false) => layouts_text()?,
        (Commands::Layouts, true) => serde_json::to_string_pretty(&layouts_json())?,
        (Commands::Slots, false) => slots_text()?,
        (Commands::Slots, true) => serde_json::to_string_pretty(&slots_json()?)?,
        (Commands::Pairings, false) => pairings_text()?,
        (Commands::Pairings, true) => serde_json::to_string_pretty(&pairings_json())?,
        (Commands::Triangle, false) => triangle_text()?,
        (Commands::Triangle, true) => serde_json::to_string_pretty(&triangle_json()?)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::for_cli(cli.verbose));
    log::debug!("{cli:?}");
    run(&cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("solver-inspect").chain(list.iter().copied()))
    }

    // ── argument parsing ──────────────────────────────────────────────────

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_command_and_flags() {
        let cli = parse(&["slots", "--json"]).unwrap();
        assert_eq!(cli.command, Commands::Slots);
        assert!(cli.json);
        assert!(!cli.verbose);

        let cli = parse(&["-v", "triangle"]).unwrap();
        assert_eq!(cli.command, Commands::Triangle);
        assert!(cli.verbose);
    }

    #[test]
    fn rejects_missing_or_unknown_command() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--json"]).is_err());
        assert!(parse(&["render"]).is_err());
    }

    // ── reports ───────────────────────────────────────────────────────────

    #[test]
    fn layouts_cover_every_schema() {
        let v = layouts_json();
        let records = v["records"].as_array().unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(records[0]["name"], "Uniforms V1");
        assert_eq!(records[0]["size"], 192);
        assert_eq!(records[5]["fields"][1]["offset"], 12);
        assert!(layouts_text().unwrap().contains("Vertex B (24 bytes"));
    }

    #[test]
    fn slots_report_split_uniforms_at_2() {
        let v = slots_json().unwrap();
        let split = &v["builds"][1];
        assert_eq!(split["build"], "SplitMesh");
        assert_eq!(split["bindings"][2], json!({ "role": "Uniforms", "slot": 2 }));
    }

    #[test]
    fn pairings_mark_split_with_normals_invalid() {
        let v = pairings_json();
        let rows = v["pairings"].as_array().unwrap();
        assert_eq!(rows.len(), 2 * 5 * 2);
        let invalid = rows.iter().filter(|r| r["valid"] == false).count();
        assert_eq!(invalid, 5);
        assert_eq!(pairings_text().unwrap().lines().count(), 20);
    }

    #[test]
    fn triangle_is_108_bytes() {
        assert_eq!(triangle_bytes().unwrap().len(), 108);
        let v = triangle_json().unwrap();
        assert_eq!(v["length"], 108);
        assert_eq!(v["hex"].as_str().unwrap().len(), 216);
        assert_eq!(triangle_text().unwrap().lines().count(), 1 + 9);
    }
}
