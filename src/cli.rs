use std::path::PathBuf;

use clap::Parser;

use crate::planner::TimerHandoff;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Month calendar of study tasks with a countdown timer")]
pub struct Args {
    /// Directory holding tasks.json and the log file
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/study-planner/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Open straight into the timer with this many seconds; zero or invalid
    /// values leave it idle at 00:00
    #[arg(long)]
    pub duration: Option<String>,

    /// Label for the timer, percent-encoded or plain
    #[arg(long)]
    pub name: Option<String>,
}

impl Args {
    /// Timer parameters given on the command line, if any.
    pub fn timer_handoff(&self) -> Option<TimerHandoff> {
        if self.duration.is_none() && self.name.is_none() {
            return None;
        }
        Some(TimerHandoff::from_params(
            self.duration.as_deref(),
            self.name.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_flags_build_a_handoff() {
        let args = Args::parse_from(["study-planner", "--duration", "90", "--name", "Lab%20prep"]);
        assert_eq!(args.timer_handoff(), Some(TimerHandoff::new(90, "Lab prep")));

        let args = Args::parse_from(["study-planner", "--name", "Reading"]);
        assert_eq!(args.timer_handoff(), Some(TimerHandoff::new(0, "Reading")));

        let args = Args::parse_from(["study-planner", "--data-dir", "/tmp/x"]);
        assert_eq!(args.timer_handoff(), None);
    }
}
