// Command-line interface for markdocx
//
// This binary converts Markdown (GitHub flavour with $-delimited math) to DOCX and back, and
// exposes the intermediate stages for inspection.
//
// The core capabilities live in the markdocx-babel crate. This crate is an interface for that
// library: it reads files, layers configuration and writes the result.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file
// extension, while being overwrittable by an explicit --from flag.
// Usage:
//  markdocx <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  markdocx convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  markdocx normalize <input.md>            - Print the math-normalized Markdown
//  markdocx inspect <path> [<transform>]    - Execute a transform (md-json for text, docx-parts for packages)
//  markdocx --list-formats                  - List conversion formats
//  markdocx --list-transforms               - List available transforms
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the DOCX side of the
// conversion, on top of the values from the configuration files.
// Example:
//  markdocx notes.md --to docx -o notes.docx --extra-images.max_px 640 --extra-normalize_math false

mod transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::{debug, info};
use markdocx_babel::{ensure_docx_extension, FormatRegistry, SerializedDocument};
use markdocx_config::{Loader, MarkdocxConfig, LOCAL_CONFIG_FILE};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SUBCOMMANDS: &[&str] = &["inspect", "convert", "normalize", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            let has_value = i + 1 < args.len() && !args[i + 1].starts_with('-');

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("markdocx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert Markdown with math to DOCX and back")
        .long_about(
            "markdocx converts GitHub-flavoured Markdown with $-delimited math into Word\n\
            documents (formulas become native, editable equations) and Word documents back\n\
            into Markdown.\n\n\
            Commands:\n  \
            - convert:   Transform between document formats (default)\n  \
            - normalize: Rewrite chat-style math notation into $...$ delimiters\n  \
            - inspect:   View intermediate representations\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            markdocx notes.md --to docx -o notes.docx   # Export to Word\n  \
            markdocx report.docx --to markdown          # Import to stdout\n  \
            markdocx normalize answer.md                # Show normalized Markdown\n  \
            markdocx inspect notes.md md-json           # Parsed node tree",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available conversion formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a markdocx.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log pipeline progress (debug level) to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect intermediate representations")
                .long_about(
                    "View a document at different processing stages.\n\n\
                    Transforms:\n  \
                    - md-json:        Parsed Markdown node tree as JSON (default for text)\n  \
                    - md-normalized:  Markdown after math normalization\n  \
                    - docx-parts:     Package parts and relationships (default for .docx)\n\n\
                    Examples:\n  \
                    markdocx inspect notes.md                 # Node tree as JSON\n  \
                    markdocx inspect report.docx              # Package listing",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the input file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults by file extension")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between Markdown and DOCX.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown (.md, .markdown)\n  \
                    - docx:     Word document (.docx)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Text output goes to stdout by default; DOCX output needs -o.\n\
                    A .docx extension is appended to the output name when missing.\n\n\
                    Examples:\n  \
                    markdocx convert notes.md --to docx -o notes      # Writes notes.docx\n  \
                    markdocx convert report.docx --to markdown        # Markdown on stdout\n  \
                    markdocx notes.md --to docx -o out/               # Uses default_file_name",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .long_help(
                            "Target format to convert to.\n\n\
                            Available formats: markdown, docx\n\
                            Use the format name, not the file extension.",
                        )
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print Markdown with math notation normalized")
                .long_about(
                    "Rewrite ad-hoc math notation ([ ... ] blocks, (\\alpha) parentheticals,\n\
                    \\( \\) and \\[ \\] delimiters, bare \\commands) into $...$ and $$...$$.\n\n\
                    Output is always written to stdout.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);
    let matches = parse_matches(&cleaned_args);

    init_logging(matches.get_flag("verbose"));

    if let Err(err) = run(&matches, extra_params) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Parse with clap, injecting `convert` when the first argument is a file rather than a
/// subcommand.
fn parse_matches(cleaned_args: &[String]) -> ArgMatches {
    let cli = build_cli();
    match cli.clone().try_get_matches_from(cleaned_args) {
        Ok(matches) => matches,
        Err(err) => {
            let implicit_convert = cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str());
            if !implicit_convert {
                err.exit();
            }
            let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
            new_args.extend_from_slice(&cleaned_args[1..]);
            cli.try_get_matches_from(&new_args)
                .unwrap_or_else(|retry_err| retry_err.exit())
        }
    }
}

/// `warn` by default, `debug` with --verbose; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(matches: &ArgMatches, extra_params: HashMap<String, String>) -> Result<(), String> {
    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return Ok(());
    }
    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return Ok(());
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(String::as_str))?;

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = required(sub_matches, "path")?;
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(String::as_str)
                .unwrap_or_else(|| transforms::default_transform(path));
            handle_inspect_command(path, transform, &extra_params, &config)
        }
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input")?;
            let to = required(sub_matches, "to")?;
            let registry = FormatRegistry::default();

            let from = match sub_matches.get_one::<String>("from") {
                Some(from) => from.to_string(),
                None => registry.detect_format_from_filename(input).ok_or_else(|| {
                    format!(
                        "Could not detect format from filename '{input}'. Please specify --from explicitly"
                    )
                })?,
            };

            let output = sub_matches.get_one::<String>("output").map(String::as_str);
            let request = ConvertRequest {
                input,
                from: &from,
                to,
                output,
            };
            handle_convert_command(&registry, &request, extra_params, &config)
        }
        Some(("normalize", sub_matches)) => {
            let input = required(sub_matches, "input")?;
            handle_normalize_command(input)
        }
        _ => Err("Unknown subcommand. Use --help for usage information.".to_string()),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing required argument <{name}>"))
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    transform: &str,
    extra_params: &HashMap<String, String>,
    config: &MarkdocxConfig,
) -> Result<(), String> {
    let source = fs::read(path).map_err(|e| format!("Error reading file '{path}': {e}"))?;

    let mut params = HashMap::from([(
        "normalize_math".to_string(),
        config.export.normalize_math.to_string(),
    )]);
    params.extend(extra_params.clone());

    let output = transforms::execute_transform(&source, transform, &params)?;
    print!("{output}");
    Ok(())
}

struct ConvertRequest<'a> {
    input: &'a str,
    from: &'a str,
    to: &'a str,
    output: Option<&'a str>,
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    request: &ConvertRequest,
    extra_params: HashMap<String, String>,
    config: &MarkdocxConfig,
) -> Result<(), String> {
    let target = registry.get(request.to).map_err(|e| e.to_string())?;
    if target.binary_output() && request.output.is_none() {
        return Err(format!(
            "Binary formats (like {}) require an output file. Use -o <path>.",
            request.to
        ));
    }

    let source = fs::read(request.input)
        .map_err(|e| format!("Error reading file '{}': {e}", request.input))?;

    let (parse_options, serialize_options) = conversion_options(request, extra_params, config);
    debug!(
        "Converting {} from {} to {}",
        request.input, request.from, request.to
    );

    let result = registry
        .convert(
            &source,
            request.from,
            request.to,
            &parse_options,
            &serialize_options,
        )
        .map_err(|e| format!("Conversion error: {e}"))?;

    match (request.output, result) {
        (Some(path), data) => {
            let path = output_path(path, request.to, &config.export.default_file_name);
            fs::write(&path, data.into_bytes())
                .map_err(|e| format!("Error writing file '{}': {e}", path.display()))?;
            info!("Wrote {}", path.display());
            Ok(())
        }
        (None, SerializedDocument::Text(text)) => {
            print!("{text}");
            Ok(())
        }
        (None, SerializedDocument::Binary(_)) => {
            Err(format!("Format '{}' produced binary output", request.to))
        }
    }
}

/// Option maps for the parse and serialize steps.
///
/// Configuration and `--extra-*` values apply to the DOCX side of the conversion: the
/// export settings when writing DOCX, the import settings when reading it.
fn conversion_options(
    request: &ConvertRequest,
    extra_params: HashMap<String, String>,
    config: &MarkdocxConfig,
) -> (HashMap<String, String>, HashMap<String, String>) {
    let mut parse_options = HashMap::new();
    let mut serialize_options = HashMap::new();

    if request.to == "docx" {
        serialize_options = config.export.to_options();
        if let Some(dir) = Path::new(request.input).parent() {
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            };
            serialize_options.insert(
                "images.base_dir".to_string(),
                dir.to_string_lossy().into_owned(),
            );
        }
        serialize_options.extend(extra_params);
    } else if request.from == "docx" {
        parse_options = config.import.to_options();
        parse_options.extend(extra_params);
    } else {
        serialize_options = extra_params;
    }

    (parse_options, serialize_options)
}

/// Final output path: DOCX targets get the `.docx` extension, and a directory target gets
/// the configured default file name inside it.
fn output_path(requested: &str, to: &str, default_file_name: &str) -> PathBuf {
    let requested_path = Path::new(requested);
    if to != "docx" {
        return requested_path.to_path_buf();
    }
    if requested_path.is_dir() {
        return requested_path.join(ensure_docx_extension(default_file_name));
    }
    PathBuf::from(ensure_docx_extension(requested))
}

/// Handle the normalize command
fn handle_normalize_command(input: &str) -> Result<(), String> {
    let registry = FormatRegistry::default();
    let source = fs::read(input).map_err(|e| format!("Error reading file '{input}': {e}"))?;
    let markdown = registry
        .parse(&source, "markdown")
        .map_err(|e| format!("Parse error: {e}"))?;
    let normalized = registry
        .serialize(&markdown, "markdown")
        .map_err(|e| format!("Serialization error: {e}"))?;
    print!("{normalized}");
    Ok(())
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    for (name, description) in transforms::TRANSFORM_DESCRIPTIONS {
        println!("  {name:<15} {description}");
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Available formats:\n");
    let registry = FormatRegistry::default();
    for name in registry.list_formats() {
        if let Ok(format) = registry.get(&name) {
            let extensions: Vec<String> = format
                .file_extensions()
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect();
            println!(
                "  {name:<10} {} ({})",
                format.description(),
                extensions.join(", ")
            );
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> Result<MarkdocxConfig, String> {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader
        .build()
        .map_err(|err| format!("Failed to load configuration: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_parse_extra_args_empty() {
        let args = strings(&["markdocx", "inspect", "notes.md"]);
        let (cleaned, extra) = parse_extra_args(&args);

        assert_eq!(cleaned, args);
        assert!(extra.is_empty());
    }

    #[test]
    fn test_parse_extra_args_mixed_with_regular_args() {
        let args = strings(&[
            "markdocx",
            "convert",
            "notes.md",
            "--to",
            "docx",
            "--extra-images.max_px",
            "640",
            "-o",
            "notes.docx",
        ]);
        let (cleaned, extra) = parse_extra_args(&args);

        assert_eq!(
            cleaned,
            strings(&["markdocx", "convert", "notes.md", "--to", "docx", "-o", "notes.docx"])
        );
        assert_eq!(extra.len(), 1);
        assert_eq!(extra.get("images.max_px"), Some(&"640".to_string()));
    }

    #[test]
    fn test_parse_extra_args_boolean_flag() {
        let args = strings(&["markdocx", "notes.md", "--extra-normalize_math", "--to", "docx"]);
        let (cleaned, extra) = parse_extra_args(&args);

        assert_eq!(cleaned, strings(&["markdocx", "notes.md", "--to", "docx"]));
        assert_eq!(extra.get("normalize_math"), Some(&"true".to_string()));
    }

    #[test]
    fn test_parse_extra_args_allows_extras_alias() {
        let args = strings(&["markdocx", "report.docx", "--extras-embed_images", "false"]);
        let (_, extra) = parse_extra_args(&args);
        assert_eq!(extra.get("embed_images"), Some(&"false".to_string()));
    }

    #[test]
    fn test_implicit_convert_is_injected() {
        let matches = parse_matches(&strings(&["markdocx", "notes.md", "--to", "docx"]));
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "convert");
        assert_eq!(sub.get_one::<String>("input").unwrap(), "notes.md");
    }

    #[test]
    fn test_export_options_layer_config_then_extras() {
        let config = load_cli_config(None).unwrap();
        let request = ConvertRequest {
            input: "docs/notes.md",
            from: "markdown",
            to: "docx",
            output: None,
        };
        let extras = HashMap::from([("theme.body_font".to_string(), "Georgia".to_string())]);

        let (parse, serialize) = conversion_options(&request, extras, &config);

        assert!(parse.is_empty());
        assert_eq!(serialize.get("theme.body_font"), Some(&"Georgia".to_string()));
        assert_eq!(serialize.get("images.max_px"), Some(&"480".to_string()));
        assert_eq!(serialize.get("images.base_dir"), Some(&"docs".to_string()));
    }

    #[test]
    fn test_import_options_come_from_config() {
        let config = load_cli_config(None).unwrap();
        let request = ConvertRequest {
            input: "report.docx",
            from: "docx",
            to: "markdown",
            output: None,
        };

        let (parse, serialize) = conversion_options(&request, HashMap::new(), &config);

        assert_eq!(parse.get("embed_images"), Some(&"true".to_string()));
        assert!(serialize.is_empty());
    }

    #[test]
    fn test_output_path_appends_docx_extension() {
        assert_eq!(
            output_path("out/report", "docx", "document.docx"),
            PathBuf::from("out/report.docx")
        );
        assert_eq!(
            output_path("Report.DOCX", "docx", "document.docx"),
            PathBuf::from("Report.DOCX")
        );
        assert_eq!(
            output_path("notes.txt", "markdown", "document.docx"),
            PathBuf::from("notes.txt")
        );
    }

    #[test]
    fn test_output_directory_uses_default_file_name() {
        let dir = std::env::temp_dir();
        let path = output_path(&dir.to_string_lossy(), "docx", "export");
        assert_eq!(path, dir.join("export.docx"));
    }
}
