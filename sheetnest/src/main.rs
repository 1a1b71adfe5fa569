use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser as ClapParser;
use log::{info, warn};
use sheetnest::config::SheetNestConfig;
use sheetnest::entities::{Bin, import_parts};
use sheetnest::io::cli::{Cli, Mode};
use sheetnest::io::layout_to_svg::layout_to_svg;
use sheetnest::io::output::{CutlineOutput, NestOutput};
use sheetnest::nester::Nester;
use sheetnest::placement::placement_bounds;
use sheetnest::{EPOCH, io};
use stickercut::CutlineError;
use stickercut::raster::{RgbaBuffer, has_transparent_border};
use stickercut::session::CutlineSession;
use stickercut::svg::SvgParser;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let config = match &args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            SheetNestConfig::default()
        }
        Some(config_file) => {
            let file = File::open(config_file)
                .with_context(|| format!("could not open config file: {}", config_file.display()))?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).context("incorrect config file format")?
        }
    };

    info!("[MAIN] Successfully parsed SheetNestConfig: {config:?}");

    if !args.solution_folder.exists() {
        fs::create_dir_all(&args.solution_folder).with_context(|| {
            format!(
                "could not create solution folder: {}",
                args.solution_folder.display()
            )
        })?;
    }

    match args.mode {
        Mode::Cutline => {
            for input in &args.input_files {
                main_cutline(input, config, &args.solution_folder)?;
            }
            Ok(())
        }
        Mode::Nest => main_nest(&args, config),
    }
}

fn main_cutline(input: &Path, config: SheetNestConfig, output_folder: &Path) -> Result<()> {
    let stem = file_stem(input)?;
    let session = match extension(input).as_deref() {
        Some("svg") => {
            let text = fs::read_to_string(input)
                .with_context(|| format!("could not read {}", input.display()))?;
            CutlineSession::from_svg(&text, config.cutline, config.svg_parser)?
        }
        Some("png") => {
            let buffer = read_png(input)?;
            if !has_transparent_border(&buffer) {
                warn!(
                    "[MAIN] {} has an opaque border, the whole image may be traced as a rectangle",
                    input.display()
                );
            }
            CutlineSession::from_raster(&buffer, config.cutline)?
        }
        _ => bail!("unsupported input format: {}", input.display()),
    };

    info!(
        "[MAIN] {}: cut-line of {} contours, perimeter {:.1}",
        input.display(),
        session.cutline().len(),
        session.perimeter()
    );

    {
        let output = CutlineOutput {
            input: input.display().to_string(),
            report: session.report(),
            config,
        };
        let json_path = output_folder.join(format!("cut_{stem}.json"));
        io::write_json(&output, &json_path)?;
    }

    match session.cut_file() {
        Some(svg) => io::write_svg(&svg, &output_folder.join(format!("cut_{stem}.svg")))?,
        None => warn!("[MAIN] {}: empty cut-line, no cut file written", input.display()),
    }

    Ok(())
}

fn main_nest(args: &Cli, config: SheetNestConfig) -> Result<()> {
    let mut polygons = vec![];
    for input in &args.input_files {
        let text = fs::read_to_string(input)
            .with_context(|| format!("could not read {}", input.display()))?;
        let mut parser = SvgParser::new(config.svg_parser);
        parser
            .load(&text)
            .with_context(|| format!("could not parse {}", input.display()))?;
        parser.clean_input()?;
        let shapes = parser.polygons()?;
        info!("[MAIN] {}: {} shapes", input.display(), shapes.len());
        polygons.extend(shapes);
    }

    let parts = import_parts(&polygons, &config.nest)?;
    let bin = Bin::rectangle(args.bin_width, args.bin_height, &config.nest)?;
    let mut nester = Nester::new(parts, bin, config.nest);

    let unfittable = nester.unfittable_parts();
    for err in &unfittable {
        warn!("[MAIN] {err}");
    }

    let Some(solution) = nester.run() else {
        bail!("nothing to nest: none of the inputs contains a usable shape");
    };
    if !solution.unplaced.is_empty() {
        warn!(
            "[MAIN] partial nesting: {} of {} parts left unplaced",
            solution.unplaced.len(),
            nester.parts.len()
        );
    }

    {
        let output = NestOutput {
            inputs: args
                .input_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            bin_width: args.bin_width,
            bin_height: args.bin_height,
            n_parts: nester.parts.len(),
            bounds: placement_bounds(&nester.parts, &solution.placements),
            unfittable: unfittable
                .iter()
                .filter_map(|e| match e {
                    CutlineError::UnfittablePart { id, .. } => Some(*id),
                    _ => None,
                })
                .collect(),
            generations: nester.generation(),
            run_time_ms: EPOCH.elapsed().as_millis(),
            solution: solution.clone(),
            config,
        };
        io::write_json(&output, &args.solution_folder.join("nest.json"))?;
    }

    {
        let svg = layout_to_svg(
            &nester.bin,
            &nester.parts,
            &solution,
            config.svg_draw_options,
            config.nest.add_printing_marks,
            "",
        );
        io::write_svg(&svg, &args.solution_folder.join("nest.svg"))?;
    }

    Ok(())
}

fn read_png(path: &Path) -> Result<RgbaBuffer> {
    let image = image::open(path)
        .with_context(|| format!("could not decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(RgbaBuffer::new(
        width as usize,
        height as usize,
        image.into_raw(),
    )?)
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .with_context(|| format!("invalid input file name: {}", path.display()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
