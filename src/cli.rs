use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "spm-licenses",
    about = "Generate a JSON list of licenses for dependencies added via SwiftPM",
    version
)]
pub struct Cli {
    /// Path to the .xcodeproj, .xcworkspace or SwiftPM package directory
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Where to write the JSON report [default: ./licenses.json]
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output_json_file: Option<PathBuf>,

    /// Path to $BUILD_DIR; checkouts are read from SourcePackages/checkouts inside it.
    /// Without it, DerivedData is searched
    #[arg(long, value_name = "DIR")]
    pub custom_build_path: Option<PathBuf>,

    /// Use this Package.resolved instead of the one found from the project
    #[arg(long, value_name = "FILE")]
    pub lockfile: Option<PathBuf>,

    /// Use this checkouts directory instead of the one found from the project
    #[arg(long, value_name = "DIR")]
    pub checkouts: Option<PathBuf>,

    /// Config file [default: ./.spm-licenses/config.toml, fallback ~/.config/spm-licenses/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log every pin, checkout and license match
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the confirmation line
    #[arg(short, long)]
    pub quiet: bool,
}
