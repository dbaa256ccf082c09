use std::path::PathBuf;

use anyhow::Context;

#[derive(clap::Parser, Debug)]
enum Operation {
    /// Check that the map can be compiled, and list its junctions.
    Validate,
    /// Compile the map and write the lane graph as JSON.
    Compile {
        /// If provided, write the lane graph to the file. Otherwise, write to stdout.
        output: Option<PathBuf>,
    },
    /// Compile the map and dump the lane graph, formatted as dot.
    Dump {
        /// If provided, dump the graph to the file. Otherwise, dump to stdout.
        output: Option<PathBuf>,
    },
}

#[derive(clap::Parser, Debug)]
struct Args {
    #[clap(subcommand)]
    operation: Operation,
    /// Map file, as written by the map editor.
    load: PathBuf,
    /// Node positions, used to order roads right to left.
    #[clap(short, long)]
    layout: Option<PathBuf>,
    /// Compile options, in TOML.
    #[clap(short, long)]
    config: Option<PathBuf>,
}

fn compile(args: &Args, map: &track::TrackMap) -> anyhow::Result<lanes::Compiled> {
    let config = match &args.config {
        Some(path) => lanes::CompileConfig::load_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => lanes::CompileConfig::default(),
    };
    let compiled = lanes::compile(map, map, &config)?;
    eprintln!("{}", compiled.report);
    Ok(compiled)
}

fn main() -> anyhow::Result<()> {
    match env_logger::try_init() {
        Ok(()) => (),
        Err(err) => eprintln!("Failed to initialize logger: {}", err),
    }

    use clap::Parser;
    let args = Args::parse();

    let mut map = track::TrackMap::load_file(&args.load)
        .with_context(|| format!("loading map {}", args.load.display()))?;
    if let Some(path) = &args.layout {
        let layout = track::Layout::load_file(path)
            .with_context(|| format!("loading layout {}", path.display()))?;
        map.apply_layout(&layout);
    }

    match &args.operation {
        Operation::Validate => {
            let report = map.validate();
            println!("{}", report);
            if !report.is_complete() {
                anyhow::bail!("map cannot be compiled");
            }
        }
        Operation::Compile { output } => {
            let compiled = compile(&args, &map)?;
            match output {
                Some(path) => compiled.graph.dump_file(path)?,
                None => println!("{}", compiled.graph.dump()?),
            }
        }
        Operation::Dump { output } => {
            let compiled = compile(&args, &map)?;
            match output {
                Some(path) => compiled.graph.dump_dot(&mut std::fs::File::create(path)?)?,
                None => compiled.graph.dump_dot(&mut std::io::stdout())?,
            }
        }
    }

    Ok(())
}
