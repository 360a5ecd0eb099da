use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "workclock", about = "WorkClock API server")]
pub struct Cli {
    /// Path to a settings file. Defaults to settings/dev.toml in debug builds.
    #[arg(long)]
    pub settings: Option<String>,
}
