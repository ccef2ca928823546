use etreemap::render::{
    CachingTextMeasurer, DeterministicTextMeasurer, HeadlessError, HeadlessRenderer, RenderOptions,
    Viewport,
};
use futures::executor::block_on;
use serde::Serialize;
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Treemap(HeadlessError),
    Json(serde_json::Error),
    InvalidSettings(Vec<String>),
    NoDiagram,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Treemap(err) => write!(f, "{}", err.messages().join("\n")),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::InvalidSettings(messages) => write!(f, "{}", messages.join("\n")),
            CliError::NoDiagram => write!(f, "No enhancedtreemap document detected"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Treemap(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Layout,
    Validate,
    Detect,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    html: bool,
    plugin_settings: Option<String>,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    diagram_id: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "etreemap-cli\n\
\n\
USAGE:\n\
  etreemap-cli [render] [--html] [--plugin-settings <path>] [--viewport-width <w>] [--viewport-height <h>] [--id <diagram-id>] [--out <path>] [<path>|-]\n\
  etreemap-cli layout [--pretty] [--plugin-settings <path>] [--viewport-width <w>] [--viewport-height <h>] [<path>|-]\n\
  etreemap-cli validate [--plugin-settings <path>] [<path>|-]\n\
  etreemap-cli detect [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - --plugin-settings reads saved plugin data (a JSON object) used as defaults.\n\
  - --viewport-width only matters for documents with \"fixed_width\": false.\n\
  - render --html writes the error block instead of failing when the document is invalid.\n\
  - Set ETREEMAP_LOG (or RUST_LOG) to control diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "layout" => args.command = Command::Layout,
            "validate" => args.command = Command::Validate,
            "detect" => args.command = Command::Detect,
            "--pretty" => args.pretty = true,
            "--html" => args.html = true,
            "--plugin-settings" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.plugin_settings = Some(path.clone());
            }
            "--viewport-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_width = Some(parse_extent(w)?);
            }
            "--viewport-height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_height = Some(parse_extent(h)?);
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn parse_extent(raw: &str) -> Result<f64, CliError> {
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
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
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn build_renderer(args: &Args) -> Result<HeadlessRenderer, CliError> {
    let mut renderer = HeadlessRenderer::new().with_options(RenderOptions {
        text_measurer: Arc::new(CachingTextMeasurer::new(DeterministicTextMeasurer::default())),
        ..RenderOptions::default()
    });
    if let Some(path) = args.plugin_settings.as_deref() {
        let data: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        renderer = renderer.with_plugin_data(&data)?;
    }
    if let Some(width) = args.viewport_width {
        renderer = renderer.with_viewport(Viewport {
            width,
            height: args.viewport_height,
        });
    }
    Ok(renderer)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Detect => {
            if !etreemap::is_treemap_block(&text) {
                return Err(CliError::NoDiagram);
            }
            println!("{}", etreemap::DOCUMENT_TYPE);
            Ok(())
        }
        Command::Validate => {
            let messages = build_renderer(&args)?.validate_sync(&text)?;
            if messages.is_empty() {
                tracing::info!("settings are valid");
                Ok(())
            } else {
                Err(CliError::InvalidSettings(messages))
            }
        }
        Command::Layout => {
            let renderer = build_renderer(&args)?;
            let layout = block_on(renderer.layout(&text))?;
            write_json(&layout, args.pretty)?;
            Ok(())
        }
        Command::Render => {
            let renderer = build_renderer(&args)?;
            let id = args.diagram_id.as_deref().unwrap_or("0");
            if args.html {
                let rendered = block_on(renderer.render_document(&text, id));
                write_text(&rendered.to_html(), args.out.as_deref())?;
            } else {
                let svg = block_on(renderer.render_svg(&text, id))?;
                write_text(&svg, args.out.as_deref())?;
            }
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = std::env::var("ETREEMAP_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
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
    init_logging();

    match run(args) {
        Ok(()) => {}
        Err(CliError::NoDiagram) => {
            eprintln!("{}", CliError::NoDiagram);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
