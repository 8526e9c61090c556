use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aic", about = "Investigate a monitoring alarm with the incident commander")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Print the response JSON on one line.
    #[arg(long, global = true)]
    pub compact: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one investigation for an alarm event.
    Invoke(InvokeArgs),
    /// Run an investigation against a recorded runtime event stream.
    Replay(ReplayArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InvokeArgs {
    /// Alarm event JSON file, or `-` for stdin.
    #[arg(long)]
    pub event: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ReplayArgs {
    /// JSONL file of runtime events.
    #[arg(long)]
    pub events: String,

    /// Alarm event JSON file, or `-` for stdin. Defaults to an empty alarm.
    #[arg(long)]
    pub event: Option<String>,
}
