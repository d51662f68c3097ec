use clap::Parser;

/// rechain - back up and reinstall JavaScript dependencies through safe-chain
#[derive(Parser)]
#[command(name = "rechain")]
#[command(about = "Back up a JavaScript project and reinstall its dependencies through the Aikido safe-chain scanner")]
#[command(version)]
pub struct Cli {}

impl Cli {
    /// Parse arguments; the run itself is fully interactive so there are
    /// no flags beyond the clap built-ins.
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        let result = Cli::try_parse_from(["rechain"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_cli_rejects_positional_args() {
        let result = Cli::try_parse_from(["rechain", "install"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_keeps_the_version_builtin() {
        let result = Cli::try_parse_from(["rechain", "--version"]);
        // clap reports --version through the error channel
        assert!(result.is_err());
    }
}
