use std::{ffi::OsString, io::Write, path::Path};

use anyhow::Context;
use clap::{CommandFactory, Parser, error::ErrorKind};
use pollen_core::{
    CliOverrides, ConfigError, Defaults, ForecastSource, PersistedSettings, ResolvedConfig,
    render, resolve,
};
use tracing::debug;

use crate::error::Failure;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "pollenflug",
    version,
    about = "Pollen forecast for German postal codes",
    after_help = "By default, date is set to today and plz to Hamburg.\n\
                  Data is fetched from Hexal's Pollenflugkalendar.\n\
                  Settings (plz, debug, en) are read from pollenflug.ini in your config directory."
)]
pub struct Cli {
    /// Set start date of pollen calendar
    #[arg(short, long, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,

    /// Set postal code/plz
    #[arg(short, long, value_name = "PLZ")]
    pub plz: Option<String>,

    /// Print verbose
    #[arg(short, long)]
    pub verbose: bool,

    /// Print plant names in English
    #[arg(short, long)]
    pub english: bool,
}

impl Cli {
    pub fn overrides(self) -> CliOverrides {
        CliOverrides {
            date: self.date,
            postal_code: self.plz,
            verbose: self.verbose,
            english: self.english,
        }
    }
}

/// What the command line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Print this text and exit successfully.
    Help(String),
    Run(CliOverrides),
}

/// Parse arguments (including the program name) without exiting the process.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(cli.overrides())),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Ok(Invocation::Help(err.render().to_string()))
            }
            _ => {
                let rendered = err.render().to_string();
                let message = rendered.lines().next().unwrap_or_default();
                Err(ConfigError::InvalidArguments(
                    message.trim_start_matches("error: ").to_string(),
                ))
            }
        },
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Read the settings file at `settings_path` (if any) and merge it with the overrides.
pub fn configure(
    overrides: &CliOverrides,
    settings_path: Option<&Path>,
    defaults: &Defaults,
) -> Result<ResolvedConfig, ConfigError> {
    let settings = match settings_path {
        Some(path) => PersistedSettings::load(path)?,
        None => {
            debug!("no config directory on this platform");
            None
        }
    };

    resolve(defaults, settings.as_ref(), overrides)
}

/// Fetch the forecast for `config` and write the table to `out`.
pub async fn show(
    config: &ResolvedConfig,
    source: &dyn ForecastSource,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let table = source.fetch(&config.request()).await?;

    for line in render(&table, config) {
        writeln!(out, "{line}").context("Failed to write forecast")?;
    }

    Ok(())
}

/// Resolve the configuration, then fetch and print the forecast.
///
/// `on_resolved` runs once the configuration is known and before any request is sent.
pub async fn execute(
    overrides: &CliOverrides,
    settings_path: Option<&Path>,
    defaults: &Defaults,
    source: &dyn ForecastSource,
    out: &mut impl Write,
    on_resolved: impl FnOnce(&ResolvedConfig),
) -> Result<(), Failure> {
    let config = configure(overrides, settings_path, defaults)
        .map_err(|err| Failure::new(err, overrides.verbose))?;

    on_resolved(&config);
    debug!(?config, "configuration");

    show(&config, source, out)
        .await
        .map_err(|err| Failure::new(err, config.verbose))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;
    use async_trait::async_trait;
    use pollen_core::{FetchError, ForecastRequest, ForecastRow, ForecastTable};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct StubSource {
        requests: Mutex<Vec<ForecastRequest>>,
        reject: bool,
    }

    impl StubSource {
        fn requests(&self) -> Vec<ForecastRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastSource for StubSource {
        async fn fetch(&self, request: &ForecastRequest) -> Result<ForecastTable, FetchError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.reject {
                return Err(FetchError::ServerRejected { message: "error".into() });
            }
            Ok(ForecastTable {
                pollen: vec!["Birch".into(), "Grass".into()],
                values: vec![ForecastRow {
                    date: request.date.clone(),
                    levels: vec!["0".into(), "3".into()],
                }],
            })
        }
    }

    fn run_args(args: &[&str]) -> CliOverrides {
        let argv = std::iter::once("pollenflug").chain(args.iter().copied());
        match parse_args(argv).unwrap() {
            Invocation::Run(overrides) => overrides,
            Invocation::Help(_) => panic!("expected a run invocation"),
        }
    }

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_long_and_short_flags() {
        let overrides = run_args(&["--date=2021-05-01", "-p", "10115", "-v", "-e"]);

        assert_eq!(
            overrides,
            CliOverrides {
                date: Some("2021-05-01".into()),
                postal_code: Some("10115".into()),
                verbose: true,
                english: true,
            }
        );
    }

    #[test]
    fn no_arguments_means_no_overrides() {
        assert_eq!(run_args(&[]), CliOverrides::default());
    }

    #[test]
    fn help_short_circuits() {
        let invocation = parse_args(["pollenflug", "-d", "2021-05-01", "--help"]).unwrap();
        match invocation {
            Invocation::Help(text) => assert!(text.contains("--plz")),
            Invocation::Run(_) => panic!("help must win over other flags"),
        }
    }

    #[test]
    fn unknown_flag_is_invalid_arguments() {
        let err = parse_args(["pollenflug", "--colour"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArguments(_)));
        assert!(err.to_string().contains("--colour"));
    }

    #[test]
    fn missing_value_is_invalid_arguments() {
        let err = parse_args(["pollenflug", "--plz"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArguments(_)));
    }

    #[test]
    fn usage_lists_all_flags() {
        let text = usage();
        for flag in ["--date", "--plz", "--verbose", "--english", "--help"] {
            assert!(text.contains(flag), "missing {flag}");
        }
    }

    #[test]
    fn configure_without_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pollenflug.ini");
        let cfg = configure(
            &CliOverrides::default(),
            Some(&path),
            &Defaults::for_date("2021-04-20"),
        )
        .unwrap();

        assert_eq!(cfg.postal_code, "20095");
        assert!(cfg.use_english_labels);
        assert!(!cfg.verbose);
    }

    #[test]
    fn configure_reads_settings_file() {
        let file = settings_file("[DEFAULT]\nplz = 55555\ndebug = True\nen = False\n");
        let cfg = configure(
            &CliOverrides::default(),
            Some(file.path()),
            &Defaults::for_date("2021-04-20"),
        )
        .unwrap();

        assert_eq!(
            (cfg.postal_code.as_str(), cfg.use_english_labels, cfg.verbose),
            ("55555", false, true)
        );
    }

    #[tokio::test]
    async fn execute_prints_forecast_table() {
        let file = settings_file("plz = 44331\n");
        let source = StubSource::default();
        let mut out = Vec::new();
        let mut seen = None;

        execute(
            &run_args(&["--date=2021-05-01"]),
            Some(file.path()),
            &Defaults::for_date("2021-04-20"),
            &source,
            &mut out,
            |cfg| seen = Some(cfg.clone()),
        )
        .await
        .unwrap();

        let requests = source.requests();
        assert_eq!(
            requests,
            vec![ForecastRequest {
                date: "2021-05-01".into(),
                postal_code: "44331".into(),
                history: true,
            }]
        );
        assert!(seen.is_some_and(|cfg| cfg.request_history));

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Data for 44331, Germany");
        assert_eq!(lines[1], "Date\t\tBirch\tGrass\t");
        assert_eq!(lines[2], "2021-05-01\t\x1b[92m0\x1b[0m\t\x1b[91m3\x1b[0m\t");
    }

    #[tokio::test]
    async fn invalid_settings_never_reach_the_source() {
        let file = settings_file("[DEFAULT]\nplz = abc\n");
        let source = StubSource::default();
        let mut out = Vec::new();

        let failure = execute(
            &CliOverrides::default(),
            Some(file.path()),
            &Defaults::for_date("2021-04-20"),
            &source,
            &mut out,
            |_| panic!("configuration must not resolve"),
        )
        .await
        .unwrap_err();

        assert_eq!(failure.exit_code(), exitcode::CONFIG);
        assert!(source.requests().is_empty());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn rejected_request_prints_nothing() {
        let source = StubSource { reject: true, ..Default::default() };
        let mut out = Vec::new();

        let failure = execute(
            &run_args(&["-v"]),
            None,
            &Defaults::for_date("2021-04-20"),
            &source,
            &mut out,
            |_| {},
        )
        .await
        .unwrap_err();

        assert_eq!(failure.exit_code(), exitcode::SOFTWARE);
        assert!(failure.verbose);
        assert!(out.is_empty());
        assert_eq!(source.requests().len(), 1);
        assert!(!source.requests()[0].history);
    }
}
