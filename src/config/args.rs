use std::{path::PathBuf, time::Duration};

use clap::{arg, command, value_parser, ArgMatches, Command};

use crate::platform::PlatformVersion;

// Config given as command line arguments
pub struct ArgsConfig {
    pub config_dir: Option<PathBuf>,
    pub os_version: Option<PlatformVersion>,
    pub mode: RunMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Print claims of an identity token.
    Decode { token: String },
    /// Print sign in availability for the platform version.
    Available,
    Test(TestMode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestMode {
    pub early_quit: bool,
    /// Overrides the config file value.
    pub response_delay: Option<Duration>,
}

pub fn command() -> Command<'static> {
    command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            arg!(--"config-dir" <DIR> "Directory of the config file. Default is the working directory.")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"os-version" <VERSION> "Platform version. Overrides config file value.")
                .required(false)
                .value_parser(value_parser!(PlatformVersion)),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode and print identity token claims without verification")
                .arg(arg!(<TOKEN> "Identity token").value_parser(value_parser!(String))),
        )
        .subcommand(Command::new("available").about("Print sign in availability"))
        .subcommand(
            Command::new("test")
                .about("Run QA tests against the simulated platform")
                .arg(
                    arg!(--"delay-ms" <MILLISECONDS> "Simulated platform response delay")
                        .value_parser(value_parser!(u64))
                        .required(false),
                )
                .arg(arg!(--"early-quit" "First error quits")),
        )
}

pub fn get_config() -> ArgsConfig {
    args_config(command().get_matches())
}

pub fn args_config(matches: ArgMatches) -> ArgsConfig {
    let mode = match matches.subcommand() {
        Some(("decode", sub_matches)) => RunMode::Decode {
            token: sub_matches
                .get_one::<String>("TOKEN")
                .map(ToOwned::to_owned)
                .unwrap_or_default(),
        },
        Some(("test", sub_matches)) => RunMode::Test(TestMode {
            early_quit: sub_matches.is_present("early-quit"),
            response_delay: sub_matches
                .get_one::<u64>("delay-ms")
                .map(|ms| Duration::from_millis(*ms)),
        }),
        _ => RunMode::Available,
    };

    ArgsConfig {
        config_dir: matches
            .get_one::<PathBuf>("config-dir")
            .map(ToOwned::to_owned),
        os_version: matches.get_one::<PlatformVersion>("os-version").copied(),
        mode,
    }
}
