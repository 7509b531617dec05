//! Command-Line Options
//!
//! Thin flag parsing over `std::env::args`. Flags override config-file
//! values; everything here is plumbing for the engines.

use std::path::PathBuf;

use crate::constants;
use crate::logic::report::ReportFormat;

#[derive(Debug, Clone)]
pub struct Options {
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub init_config: bool,
    pub cache_stats: bool,
    pub clear_cache: bool,
    pub no_llm: bool,
    pub no_network: bool,
    pub no_cache: bool,
    pub max_iterations: Option<u32>,
    pub model: Option<String>,
    pub ollama_url: Option<String>,
    pub top: usize,
    pub quiet: bool,
    pub verbose: bool,
    pub help: bool,
    pub version: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            output: None,
            config_path: None,
            init_config: false,
            cache_stats: false,
            clear_cache: false,
            no_llm: false,
            no_network: false,
            no_cache: false,
            max_iterations: None,
            model: None,
            ollama_url: None,
            top: 20,
            quiet: false,
            verbose: false,
            help: false,
            version: false,
        }
    }
}

/// Parse arguments (without the program name).
pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-j" | "--json" => options.format = ReportFormat::Json,
            "--markdown" => options.format = ReportFormat::Markdown,
            "-o" | "--output" => {
                options.output = Some(PathBuf::from(required_value(&arg, &mut iter)?))
            }
            "-c" | "--config" => {
                options.config_path = Some(PathBuf::from(required_value(&arg, &mut iter)?))
            }
            "--init-config" => options.init_config = true,
            "--cache-stats" => options.cache_stats = true,
            "--clear-cache" => options.clear_cache = true,
            "--no-llm" => options.no_llm = true,
            "--no-network" => options.no_network = true,
            "--no-cache" => options.no_cache = true,
            "--max-iterations" => {
                let value = required_value(&arg, &mut iter)?;
                options.max_iterations = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --max-iterations value '{}'", value))?,
                );
            }
            "--model" => options.model = Some(required_value(&arg, &mut iter)?),
            "--ollama-url" => options.ollama_url = Some(required_value(&arg, &mut iter)?),
            "--top" => {
                let value = required_value(&arg, &mut iter)?;
                options.top = value
                    .parse()
                    .map_err(|_| format!("invalid --top value '{}'", value))?;
            }
            "-q" | "--quiet" => options.quiet = true,
            "-v" | "--verbose" => options.verbose = true,
            "-h" | "--help" => options.help = true,
            "-V" | "--version" => options.version = true,
            unknown => return Err(format!("unknown option '{}'", unknown)),
        }
    }

    Ok(options)
}

fn required_value<I: Iterator<Item = String>>(flag: &str, iter: &mut I) -> Result<String, String> {
    iter.next().ok_or_else(|| format!("{} needs a value", flag))
}

pub fn usage() -> String {
    format!(
        "{name} {version} - process classification & host insight

USAGE:
    {name} [OPTIONS]

OPTIONS:
    -j, --json               JSON report
        --markdown           Markdown report
    -o, --output <file>      Write the report to a file
    -c, --config <file>      Use a specific configuration file
        --init-config        Create {config} with defaults and exit
        --no-llm             Skip inference-service classification
        --no-network         Skip connection capture and risk scoring
        --no-cache           Disable the classification result cache
        --max-iterations <n> Convergence iteration cap (default {iterations})
        --model <name>       Inference model (default {model})
        --ollama-url <url>   Inference service URL (default {url})
        --top <n>            Entries per report section (default 20)
        --cache-stats        Print cache statistics and exit
        --clear-cache        Remove every cached result and exit
    -q, --quiet              Minimal output
    -v, --verbose            Debug logging
    -h, --help               This help
    -V, --version            Version",
        name = constants::APP_NAME,
        version = constants::APP_VERSION,
        config = constants::CONFIG_FILE_NAME,
        iterations = constants::DEFAULT_MAX_ITERATIONS,
        model = constants::DEFAULT_OLLAMA_MODEL,
        url = constants::DEFAULT_OLLAMA_URL,
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let options = parse(args(&[])).unwrap();
        assert_eq!(options.format, ReportFormat::Text);
        assert_eq!(options.top, 20);
        assert!(!options.no_llm);
    }

    #[test]
    fn test_flags_and_values() {
        let options = parse(args(&[
            "--json",
            "--no-llm",
            "--max-iterations",
            "3",
            "--model",
            "llama3:8b",
            "-o",
            "out.json",
        ]))
        .unwrap();

        assert_eq!(options.format, ReportFormat::Json);
        assert!(options.no_llm);
        assert_eq!(options.max_iterations, Some(3));
        assert_eq!(options.model.as_deref(), Some("llama3:8b"));
        assert_eq!(options.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_missing_value_is_an_error() {
        assert!(parse(args(&["--max-iterations"])).is_err());
        assert!(parse(args(&["--max-iterations", "abc"])).is_err());
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        assert!(parse(args(&["--frobnicate"])).is_err());
    }
}
