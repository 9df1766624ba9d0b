use std::io::prelude::*;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use env_logger::Builder;
use log::{Level, LevelFilter};
use openctm::prelude::*;
use owo_colors::OwoColorize;

mod menu;
use menu::Modules;

fn color_level(level: Level) -> String {
    match level {
        Level::Error => level.red().to_string(),
        Level::Warn => level.yellow().to_string(),
        Level::Info => level.green().to_string(),
        Level::Debug => level.blue().to_string(),
        Level::Trace => level.purple().to_string(),
    }
}

fn parse_method(name: &str) -> Result<Method> {
    match name.to_ascii_lowercase().as_str() {
        "raw" => Ok(Method::Raw),
        "mg1" => Ok(Method::Mg1),
        "mg2" => Ok(Method::Mg2),
        other => bail!("unknown method {other:?}, expected raw, mg1 or mg2"),
    }
}

fn method_name(method: Method) -> &'static str {
    match method {
        Method::Raw => "RAW",
        Method::Mg1 => "MG1",
        Method::Mg2 => "MG2",
    }
}

fn info(input: &str) -> Result<()> {
    let mesh = read_mesh_from_path(input).with_context(|| format!("reading {input}"))?;

    println!("{input}");
    println!("  vertices:   {}", mesh.vertex_count());
    println!("  triangles:  {}", mesh.triangle_count());
    println!("  normals:    {}", if mesh.normals.is_some() { "yes" } else { "no" });
    if !mesh.comment.is_empty() {
        println!("  comment:    {:?}", mesh.comment);
    }
    for (i, map) in mesh.uv_maps.iter().enumerate() {
        if map.file_name.is_empty() {
            println!("  uv map {i}:   {:?}", map.name);
        } else {
            println!("  uv map {i}:   {:?} ({})", map.name, map.file_name);
        }
    }
    for (i, map) in mesh.attrib_maps.iter().enumerate() {
        println!("  attrib {i}:   {:?}", map.name);
    }
    Ok(())
}

fn recode(params: menu::RecodeData) -> Result<()> {
    log::info!("Reading file {}", &params.input);
    let mut mesh = read_mesh_from_path(&params.input)
        .with_context(|| format!("reading {}", params.input))?;

    let mut options = EncodeOptions::new();
    if let Some(name) = &params.method {
        options.method = parse_method(name)?;
    }
    if let Some(step) = params.vertex_precision {
        options.vertex_precision = VertexPrecision::Absolute(step);
    }
    if let Some(step) = params.normal_precision {
        options.normal_precision = Some(step);
    }
    if let Some(comment) = params.comment {
        mesh.comment = comment;
    }

    let output = if let Some(output) = params.output {
        output
    } else {
        let mut new_path = PathBuf::from(&params.input);
        new_path.set_extension("recoded.ctm");
        new_path.to_string_lossy().into_owned()
    };

    log::info!("Writing file {} ({})", output, method_name(options.method));
    write_mesh_to_path(&mesh.as_ref(), &options, &output)
        .with_context(|| format!("writing {output}"))?;
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line input
    let args: menu::CtmTool = argp::parse_args_or_exit(argp::DEFAULT);

    // Build up a logger with custom formatting and set it to the verbosity from the command line
    Builder::new()
        .format(|buf, record| {
            writeln!(buf, "{} {}", color_level(record.level()), record.args())
        })
        .filter(
            None,
            if args.verbose { LevelFilter::Debug } else { LevelFilter::Info },
        )
        .init();

    match args.nested {
        Modules::Info(params) => info(&params.input),
        Modules::Recode(params) => recode(params),
    }
}
