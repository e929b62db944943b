use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "liceum")]
#[command(about = "Liceum - school events board API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Delete events whose blocks have all ended
    CleanEvents,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["liceum"]);
        assert_eq!(cli.command(), Commands::Serve);
    }

    #[test]
    fn test_parses_clean_events() {
        let cli = Cli::parse_from(["liceum", "clean-events"]);
        assert_eq!(cli.command(), Commands::CleanEvents);
    }

    #[test]
    fn test_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["liceum", "create-sysadmin"]).is_err());
    }
}
