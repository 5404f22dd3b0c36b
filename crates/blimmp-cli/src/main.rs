use blimmp_core::{
    AdjacencySource, MetadataSource, ModuleId, NodeSource, SourceSet, StateStore,
};
use blimmp_layout::Point;
use blimmp_render::color::Rgb;
use blimmp_render::{RenderConfig, ScoreView, ViewState, Viewer, render_svg};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Invalid(String),
    Io(std::io::Error),
    Core(blimmp_core::Error),
    Render(blimmp_render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Invalid(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl CliError {
    fn is_not_found(&self) -> bool {
        match self {
            CliError::Core(err) | CliError::Render(blimmp_render::Error::Core(err)) => {
                err.is_not_found()
            }
            _ => false,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<blimmp_core::Error> for CliError {
    fn from(value: blimmp_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<blimmp_render::Error> for CliError {
    fn from(value: blimmp_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Render,
    Scene,
    Layout,
    Inspect,
    List,
    Upload,
    ClearOverride,
    Threshold,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    positional: Option<String>,
    data_dir: Option<PathBuf>,
    nodes: Option<PathBuf>,
    adjacency: Option<PathBuf>,
    metadata: Option<PathBuf>,
    state_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    score_view: Option<ScoreView>,
    width: Option<f64>,
    height: Option<f64>,
    at: Option<Point>,
    pretty: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    out: Option<String>,
}

const DEFAULT_STATE_DIR: &str = ".blimmp";

fn usage() -> &'static str {
    "blimmp-cli\n\
\n\
USAGE:\n\
  blimmp-cli [render] [SOURCES] [VIEW] [--format svg|png] [--scale <n>] [--background <color>] [--out <path>] <module-id>\n\
  blimmp-cli scene [SOURCES] [VIEW] [--pretty] <module-id>\n\
  blimmp-cli layout [SOURCES] [--pretty] <module-id>\n\
  blimmp-cli inspect [SOURCES] [VIEW] --at <x>,<y> <module-id>\n\
  blimmp-cli list [SOURCES]\n\
  blimmp-cli upload [--state-dir <dir>] [<path>|-]\n\
  blimmp-cli clear-override [--state-dir <dir>]\n\
  blimmp-cli threshold [--state-dir <dir>] [<value>]\n\
\n\
SOURCES:\n\
  --data-dir <dir>      directory holding nodes.json, adjacency.json and (optionally) metadata.json\n\
  --nodes <path>        node source (overrides --data-dir)\n\
  --adjacency <path>    adjacency source (overrides --data-dir)\n\
  --metadata <path>     module metadata (overrides --data-dir)\n\
  --state-dir <dir>     override and threshold storage (default: ./.blimmp)\n\
\n\
VIEW:\n\
  --config <path>       render config JSON\n\
  --width <w>           requested width (capped by the config's max width)\n\
  --height <h>          drawing height\n\
  --score-view before|after, --after\n\
\n\
NOTES:\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to ./<module-id>.png.\n\
  - An uploaded override takes precedence over the node source for the modules it contains.\n\
  - Set BLIMMP_LOG (e.g. BLIMMP_LOG=debug) to control diagnostics on stderr.\n\
"
}

fn parse_point(text: &str) -> Option<Point> {
    let (x, y) = text.split_once(',')?;
    let x = x.trim().parse::<f64>().ok()?;
    let y = y.trim().parse::<f64>().ok()?;
    (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    let mut command_seen = false;
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            cmd @ ("render" | "scene" | "layout" | "inspect" | "list" | "upload"
            | "clear-override" | "threshold")
                if !command_seen && args.positional.is_none() =>
            {
                command_seen = true;
                args.command = match cmd {
                    "render" => Command::Render,
                    "scene" => Command::Scene,
                    "layout" => Command::Layout,
                    "inspect" => Command::Inspect,
                    "list" => Command::List,
                    "upload" => Command::Upload,
                    "clear-override" => Command::ClearOverride,
                    _ => Command::Threshold,
                };
            }
            "--pretty" => args.pretty = true,
            "--after" => args.score_view = Some(ScoreView::After),
            "--score-view" => {
                let Some(view) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.score_view = Some(
                    view.parse::<ScoreView>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--data-dir" | "--nodes" | "--adjacency" | "--metadata" | "--state-dir"
            | "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let path = Some(PathBuf::from(path));
                match a.as_str() {
                    "--data-dir" => args.data_dir = path,
                    "--nodes" => args.nodes = path,
                    "--adjacency" => args.adjacency = path,
                    "--metadata" => args.metadata = path,
                    "--state-dir" => args.state_dir = path,
                    _ => args.config = path,
                }
            }
            "--width" | "--height" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let v = v.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(v.is_finite() && v > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                if a == "--width" {
                    args.width = Some(v);
                } else {
                    args.height = Some(v);
                }
            }
            "--at" => {
                let Some(at) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.at = Some(parse_point(at).ok_or(CliError::Usage(usage()))?);
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => {
                if args.positional.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.positional = Some("-".to_string());
            }
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            value => {
                if args.positional.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.positional = Some(value.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("BLIMMP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn state_store(args: &Args) -> StateStore {
    StateStore::new(
        args.state_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR)),
    )
}

fn source_path(explicit: Option<&Path>, data_dir: Option<&Path>, file: &str) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| data_dir.map(|dir| dir.join(file)))
}

fn load_sources(args: &Args) -> Result<SourceSet, CliError> {
    let data_dir = args.data_dir.as_deref();
    let nodes = source_path(args.nodes.as_deref(), data_dir, "nodes.json")
        .ok_or(CliError::Invalid("missing --nodes (or --data-dir)".to_string()))?;
    let adjacency = source_path(args.adjacency.as_deref(), data_dir, "adjacency.json")
        .ok_or(CliError::Invalid("missing --adjacency (or --data-dir)".to_string()))?;

    let mut sources = SourceSet::new(
        NodeSource::from_path(&nodes)?,
        AdjacencySource::from_path(&adjacency)?,
    );

    // Metadata is optional when only a data directory was given.
    let metadata = match (&args.metadata, data_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(dir.join("metadata.json")).filter(|p| p.exists()),
        (None, None) => None,
    };
    if let Some(path) = metadata {
        sources = sources.with_metadata(MetadataSource::from_path(&path)?);
    }

    Ok(sources.with_override(state_store(args).load_override()?))
}

fn load_config(args: &Args) -> Result<RenderConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => RenderConfig::default(),
    };
    if let Some(h) = args.height {
        config.height = h;
    }
    Ok(config)
}

fn module_id(args: &Args) -> Result<ModuleId, CliError> {
    let Some(raw) = args.positional.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    Ok(ModuleId::parse(raw)?)
}

/// Loads the module through the viewer so a failed lookup leaves nothing drawn.
fn open_viewer(args: &Args) -> Result<Viewer, CliError> {
    let id = module_id(args)?;
    let sources = load_sources(args)?;
    let config = load_config(args)?;

    let mut view = ViewState::for_width(args.width.unwrap_or(config.max_width), &config);
    if let Some(score_view) = args.score_view {
        view.score_view = score_view;
    }

    let mut viewer = Viewer::new(config, view)?;
    let token = viewer.begin_request();
    viewer.complete(token, sources.resolve(&id))?;
    Ok(viewer)
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    match text.trim().to_ascii_lowercase().as_str() {
        "transparent" => Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        other => {
            let c = Rgb::parse_hex(other)?;
            Some(tiny_skia::Color::from_rgba8(c.r, c.g, c.b, 255))
        }
    }
}

fn render_svg_to_png(svg: &str, scale: f32, background: Option<&str>) -> Result<Vec<u8>, CliError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| CliError::Invalid(format!("failed to parse SVG for PNG rendering: {e}")))?;

    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(CliError::Usage(
        "failed to allocate pixmap for raster rendering",
    ))?;

    if let Some(bg) = background {
        let Some(color) = parse_tiny_skia_color(bg) else {
            return Err(CliError::Invalid(format!("invalid --background color: {bg}")));
        };
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| CliError::Invalid(format!("failed to encode PNG: {e}")))
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Render => {
            let viewer = open_viewer(&args)?;
            let Some(scene) = viewer.scene() else {
                return Ok(());
            };
            let svg = render_svg(scene);
            match args.render_format {
                RenderFormat::Svg => write_text(&svg, args.out.as_deref())?,
                RenderFormat::Png => {
                    let bytes =
                        render_svg_to_png(&svg, args.render_scale, args.background.as_deref())?;
                    let out = args
                        .out
                        .clone()
                        .unwrap_or_else(|| format!("{}.png", scene.module_id));
                    write_bytes(&bytes, &out)?;
                }
            }
            Ok(())
        }
        Command::Scene => {
            let viewer = open_viewer(&args)?;
            if let Some(scene) = viewer.scene() {
                write_json(scene, args.pretty)?;
            }
            Ok(())
        }
        Command::Layout => {
            let viewer = open_viewer(&args)?;
            if let Some(laid) = viewer.laid_out() {
                write_json(&laid.layout, args.pretty)?;
            }
            Ok(())
        }
        Command::Inspect => {
            let Some(at) = args.at else {
                return Err(CliError::Usage(usage()));
            };
            let mut viewer = open_viewer(&args)?;
            match viewer.hover(at) {
                Some(tooltip) => {
                    for line in &tooltip.lines {
                        println!("{line}");
                    }
                }
                None => tracing::info!(x = at.x, y = at.y, "nothing under the pointer"),
            }
            Ok(())
        }
        Command::List => {
            let sources = load_sources(&args)?;
            for id in sources.module_ids() {
                println!("{id}");
            }
            Ok(())
        }
        Command::Upload => {
            let text = read_input(args.positional.as_deref())?;
            let saved = state_store(&args).save_override(&text)?;
            eprintln!("stored override with {} module(s)", saved.len());
            Ok(())
        }
        Command::ClearOverride => {
            if !state_store(&args).clear_override()? {
                eprintln!("no override stored");
            }
            Ok(())
        }
        Command::Threshold => {
            let store = state_store(&args);
            match args.positional.as_deref() {
                Some(raw) => {
                    let value = raw
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| CliError::Invalid(format!("invalid threshold: {raw}")))?;
                    store.save_threshold(value)?;
                }
                None => {
                    if let Some(value) = store.load_threshold()? {
                        println!("{value}");
                    }
                }
            }
            Ok(())
        }
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) if err.is_not_found() => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("blimmp-cli")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn render_is_the_default_command() {
        let args = parse_args(&argv(&["--data-dir", "d", "M00001"])).unwrap();
        assert_eq!(args.command, Command::Render);
        assert_eq!(args.positional.as_deref(), Some("M00001"));
        assert_eq!(args.data_dir, Some(PathBuf::from("d")));
    }

    #[test]
    fn module_id_named_like_a_command_after_the_command() {
        let args = parse_args(&argv(&["threshold", "list"])).unwrap();
        assert_eq!(args.command, Command::Threshold);
        assert_eq!(args.positional.as_deref(), Some("list"));
    }

    #[test]
    fn parses_view_flags() {
        let args = parse_args(&argv(&[
            "inspect", "--at", "310.5,42", "--after", "--width", "900", "M00002",
        ]))
        .unwrap();
        assert_eq!(args.command, Command::Inspect);
        assert_eq!(args.at, Some(Point::new(310.5, 42.0)));
        assert_eq!(args.score_view, Some(ScoreView::After));
        assert_eq!(args.width, Some(900.0));
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(matches!(
            parse_args(&argv(&["--width", "-3", "M00001"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["--at", "12", "M00001"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["--bogus"])),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&argv(&["M00001", "M00002"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn background_colors() {
        assert!(parse_tiny_skia_color("white").is_some());
        assert!(parse_tiny_skia_color("#2c7fb8").is_some());
        assert!(parse_tiny_skia_color("nope").is_none());
    }
}
