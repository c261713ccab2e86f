use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use iam_policy_compactor_engine::api::model::{
    DEFAULT_ADMIN_POLICY_NAME, DEFAULT_CATALOG_PATH, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR,
    DEFAULT_READ_ONLY_POLICY_NAME,
};
use iam_policy_compactor_engine::policy::DEFAULT_ACCUMULATOR_SID;
use log::debug;

mod commands;

/// Fatal error: bad catalog, unreadable or invalid policy, failed write
const EXIT_FAILURE: u8 = 1;
/// The policy has no read-only actions
const EXIT_NO_READ_ONLY_POLICY: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "iam-policy-compactor",
    version,
    about = "Expand wildcard IAM policy actions, merge policies and derive read-only policies"
)]
struct Cli {
    #[command(flatten)]
    shared: SharedArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SharedArgs {
    /// Service catalog JSON with a top-level serviceMap
    #[arg(
        long,
        global = true,
        env = "IAM_POLICY_COMPACTOR_CATALOG",
        default_value = DEFAULT_CATALOG_PATH
    )]
    catalog: PathBuf,

    /// Id of the admin policies
    #[arg(
        long,
        global = true,
        env = "IAM_POLICY_COMPACTOR_ADMIN_POLICY_NAME",
        default_value = DEFAULT_ADMIN_POLICY_NAME
    )]
    admin_policy_name: String,

    /// Id of the read-only policy
    #[arg(
        long,
        global = true,
        env = "IAM_POLICY_COMPACTOR_READ_ONLY_POLICY_NAME",
        default_value = DEFAULT_READ_ONLY_POLICY_NAME
    )]
    read_only_policy_name: String,

    /// Sid of the statement that collects every allow-all action
    #[arg(
        long,
        global = true,
        env = "IAM_POLICY_COMPACTOR_ACCUMULATOR_SID",
        default_value = DEFAULT_ACCUMULATOR_SID
    )]
    accumulator_sid: String,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(
        long,
        global = true,
        env = "IAM_POLICY_COMPACTOR_DEBUG",
        value_parser = FalseyValueParser::new()
    )]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compact every policy in a directory into admin and read-only policies
    ///
    /// Writes adminPolicy.json, adminLongPolicy.json and, when any read-only
    /// action exists, readonlyPolicy.json.
    Compact {
        /// Directory holding the *.json policies
        #[arg(
            long,
            env = "IAM_POLICY_COMPACTOR_POLICIES_DIR",
            default_value = DEFAULT_INPUT_DIR
        )]
        policies_dir: PathBuf,

        /// Directory the output policies are written to
        #[arg(
            long,
            env = "IAM_POLICY_COMPACTOR_OUTPUT_DIR",
            default_value = DEFAULT_OUTPUT_DIR
        )]
        output_dir: PathBuf,
    },

    /// Print one policy with every wildcard action expanded
    Expand {
        /// Policy JSON file
        file: PathBuf,
    },

    /// Print the read-only form of one policy
    ///
    /// Exits with status 2 when the policy has no read-only actions.
    ReadOnly {
        /// Policy JSON file
        file: PathBuf,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.shared.debug);
    debug!("{:?}", cli);

    let outcome = match cli.command {
        Commands::Compact {
            policies_dir,
            output_dir,
        } => commands::compact(&cli.shared, policies_dir, output_dir).await,
        Commands::Expand { file } => commands::expand(&cli.shared, &file).await,
        Commands::ReadOnly { file } => commands::read_only(&cli.shared, &file).await,
    };

    match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
