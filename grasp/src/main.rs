use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use curenest::io::export::export;
use curenest::io::import::import;
use curenest::io::svg::layout_to_svg;
use grasp::config::GraspConfig;
use grasp::io;
use grasp::io::cli::Cli;
use grasp::io::output::GraspOutput;
use grasp::opt::orchestrator::GraspOptimizer;
use grasp::time::TimeStamp;
use log::{info, warn};

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let mut config: GraspConfig = match &args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config to provide a custom config");
            GraspConfig::default()
        }
        Some(config_file) => {
            let file = File::open(config_file)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).context("incorrect config file format")?
        }
    };
    if let Some(seed) = args.seed {
        config.prng_seed = Some(seed);
    }
    if let Some(limit) = args.time_limit_ms {
        config.time_budget.override_ms = Some(limit);
    }
    config.validate()?;

    info!("[MAIN] Successfully parsed GraspConfig: {config:?}");

    let input_stem = args
        .request_file
        .file_stem()
        .and_then(|s| s.to_str())
        .context("request file has no valid file name")?
        .to_owned();

    if !args.output_folder.exists() {
        fs::create_dir_all(&args.output_folder).with_context(|| {
            format!(
                "could not create output folder: {}",
                args.output_folder.display()
            )
        })?;
    }

    let request = io::read_request(&args.request_file)?;
    let instance = import(&request)?;
    let solution = GraspOptimizer::new(&instance, config, TimeStamp::now()).solve();

    {
        let output = GraspOutput {
            response: export(&instance, &solution),
            request,
            config,
        };
        let solution_path = args.output_folder.join(format!("sol_{input_stem}.json"));
        io::write_json(&output, Path::new(&solution_path))?;
    }

    if args.no_svg {
        return Ok(());
    }
    for ls in solution.used_layouts() {
        let bin_ext_id = instance.autoclave(ls.bin_id).ext_id;
        let svg_path = args
            .output_folder
            .join(format!("sol_{input_stem}_{bin_ext_id}.svg"));
        let title = format!("autoclave {bin_ext_id}");
        let svg = layout_to_svg(ls, &instance, config.svg_draw_options, &title);
        io::write_svg(&svg, Path::new(&svg_path))?;
    }

    Ok(())
}
