//! `pagekit search` command implementation.

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use pagekit_confluence::query::{ContentType, DateOp, Direction, OrderField, Query};
use pagekit_confluence::types::Page;

use super::ConnectionArgs;
use crate::error::CliError;
use crate::output::Output;

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Page,
    Blogpost,
    Comment,
    Attachment,
}

impl From<TypeArg> for ContentType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Page => Self::Page,
            TypeArg::Blogpost => Self::BlogPost,
            TypeArg::Comment => Self::Comment,
            TypeArg::Attachment => Self::Attachment,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Created,
    Modified,
    Title,
}

impl From<OrderArg> for OrderField {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Created => Self::Created,
            OrderArg::Modified => Self::LastModified,
            OrderArg::Title => Self::Title,
        }
    }
}

/// Arguments for the search command.
///
/// Filters are combined with AND.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Full-text search term.
    text: Option<String>,

    /// Title contains this term.
    #[arg(long)]
    title: Option<String>,

    /// Restrict to a space.
    #[arg(short, long)]
    space: Option<String>,

    /// Content type.
    #[arg(long = "type", value_enum)]
    content_type: Option<TypeArg>,

    /// Require a label (repeatable).
    #[arg(short, long)]
    label: Vec<String>,

    /// Created by this user.
    #[arg(long)]
    creator: Option<String>,

    /// Descendant of this page ID.
    #[arg(long)]
    ancestor: Option<String>,

    /// Created on or after this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    created_since: Option<NaiveDate>,

    /// Modified on or after this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    modified_since: Option<NaiveDate>,

    /// Sort field.
    #[arg(long, value_enum)]
    order_by: Option<OrderArg>,

    /// Sort descending.
    #[arg(long, requires = "order_by")]
    desc: bool,

    /// Offset of the first result.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Maximum number of results.
    #[arg(long, default_value_t = 25)]
    limit: usize,

    /// Print the CQL query without running it.
    #[arg(long)]
    cql: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl SearchArgs {
    /// Execute the search command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let query = self.build_query()?;

        if self.cql {
            output.data(&query.to_cql());
            return Ok(());
        }

        let client = self.connection.connect()?;
        let results = client.search(&query, self.start, self.limit)?;

        for page in &results.results {
            output.data(&format_hit(page));
        }
        output.info(&format!(
            "{} of {} result(s)",
            results.size,
            results.total_size.unwrap_or(results.size)
        ));
        Ok(())
    }

    fn build_query(&self) -> Result<Query, CliError> {
        let mut filters = Vec::new();

        if let Some(text) = &self.text {
            filters.push(Query::text(text.as_str()));
        }
        if let Some(title) = &self.title {
            filters.push(Query::title(title.as_str()));
        }
        if let Some(space) = &self.space {
            filters.push(Query::space(space.as_str()));
        }
        if let Some(kind) = self.content_type {
            filters.push(Query::content_type(kind.into()));
        }
        for label in &self.label {
            filters.push(Query::label(label.as_str()));
        }
        if let Some(creator) = &self.creator {
            filters.push(Query::creator(creator.as_str()));
        }
        if let Some(ancestor) = &self.ancestor {
            filters.push(Query::ancestor(ancestor.as_str()));
        }
        if let Some(date) = self.created_since {
            filters.push(Query::created(date, DateOp::OnOrAfter));
        }
        if let Some(date) = self.modified_since {
            filters.push(Query::last_modified(date, DateOp::OnOrAfter));
        }

        let mut query = filters
            .into_iter()
            .reduce(Query::and)
            .ok_or_else(|| CliError::Validation("search needs at least one filter".to_owned()))?;

        if let Some(field) = self.order_by {
            let direction = if self.desc {
                Direction::Desc
            } else {
                Direction::Asc
            };
            query = query.order_by(field.into(), direction);
        }
        Ok(query)
    }
}

fn format_hit(page: &Page) -> String {
    format!(
        "{}\t{}\tv{}\t{}",
        page.id,
        page.space_key().unwrap_or("-"),
        page.version.number,
        page.title
    )
}
