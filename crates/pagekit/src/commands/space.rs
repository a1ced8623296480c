//! `pagekit space` command implementations.

use clap::{Args, Subcommand};
use pagekit_confluence::types::Space;

use super::ConnectionArgs;
use crate::error::CliError;
use crate::output::Output;

/// Space commands.
#[derive(Subcommand)]
pub(crate) enum SpaceCommand {
    /// Show a space.
    Get(GetArgs),
    /// List spaces visible to the authenticated user.
    List(ListArgs),
}

impl SpaceCommand {
    /// Execute the space subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Get(args) => args.execute(),
            Self::List(args) => args.execute(),
        }
    }
}

/// Arguments for `space get`.
#[derive(Args)]
pub(crate) struct GetArgs {
    /// Space key.
    key: String,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl GetArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let client = self.connection.connect()?;
        let space = client.get_space(&self.key)?;

        output.data(&format!("Key: {}", space.key));
        output.data(&format!("Name: {}", space.name));
        if let Some(space_type) = &space.space_type {
            output.data(&format!("Type: {space_type}"));
        }
        Ok(())
    }
}

/// Arguments for `space list`.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Offset of the first result.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Maximum number of results.
    #[arg(long, default_value_t = 25)]
    limit: usize,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl ListArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let client = self.connection.connect()?;
        let spaces = client.list_spaces(self.start, self.limit)?;

        for space in &spaces.results {
            output.data(&format_space(space));
        }
        output.info(&format!(
            "{} space(s) from offset {}",
            spaces.size, spaces.start
        ));
        Ok(())
    }
}

fn format_space(space: &Space) -> String {
    format!("{}\t{}", space.key, space.name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_format_space() {
        let space = Space {
            id: Some(7),
            key: "OPS".to_owned(),
            name: "Operations".to_owned(),
            space_type: Some("global".to_owned()),
        };
        assert_eq!(format_space(&space), "OPS\tOperations");
    }
}
