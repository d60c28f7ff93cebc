//! Terminal prompts and output rendering.
//!
//! Commands talk to the user only through [`UserInteraction`], so a command never decides how a
//! paper or a tag list is drawn. [`Terminal`] is the implementation used by the binary.

use dialoguer::{Confirm, Input};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "⚠️ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for user prompts
pub static PROMPT_PREFIX: &str = "❯ ";
/// Continuation line for tree structure
pub static CONTINUE_PREFIX: &str = "│  ";
/// Branch character for tree structure
pub static TREE_BRANCH: &str = "├";
/// Leaf character for tree structure (end of branch)
pub static TREE_LEAF: &str = "└";
/// Marker for list items
pub static BULLET: &str = "•";

/// Something a command wants shown to the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// One paper with all details
  Paper(&'a Paper),
  /// A list of papers, one summary block each
  Papers(&'a [Paper]),
  /// Tags on one paper
  Tags(&'a [PaperTag]),
  /// Distinct tag names of a user
  TagSummary(&'a TagSummary),
  /// Saved queries
  Queries(&'a [SavedQuery]),
  /// Digest definitions
  Digests(&'a [Digest]),
  /// One page of digest matches
  DigestPage(&'a DigestPage),
  /// Completed action
  Success(&'a str),
  /// Neutral message
  Info(&'a str),
  /// Something the user should look at
  Warning(&'a str),
  /// Failed command
  Error(&'a PaperboarddError),
}

/// How commands ask questions and report results.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Asks for a line of text.
  fn prompt(&self, message: &str) -> Result<String>;
  /// Shows `content`.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Interactive terminal session.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
  /// Answer every confirmation with yes
  accept_defaults: bool,
}

impl Terminal {
  /// Creates a terminal session. With `accept_defaults`, confirmations are never shown.
  pub fn new(accept_defaults: bool) -> Self { Self { accept_defaults } }
}

impl UserInteraction for Terminal {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      trace!("Accepting default for {message:?}");
      return Ok(true);
    }
    Ok(
      Confirm::new()
        .with_prompt(format!("{}{message}", style(PROMPT_PREFIX).cyan()))
        .default(false)
        .wait_for_newline(true)
        .interact()?,
    )
  }

  fn prompt(&self, message: &str) -> Result<String> {
    Ok(
      Input::<String>::new()
        .with_prompt(format!("{}{message}", style(PROMPT_PREFIX).cyan()))
        .interact_text()?,
    )
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Paper(paper) => print_paper(paper),
      ResponseContent::Papers(papers) => {
        for (index, paper) in papers.iter().enumerate() {
          println!("{} {}", style(format!("{:>3}.", index + 1)).dim(), style(&paper.title).bold());
          println!(
            "     {} {} {} {}",
            style(TREE_BRANCH).dim(),
            style(&paper.id).yellow(),
            style(BULLET).dim(),
            style(&paper.published).dim()
          );
          println!("     {} {}", style(TREE_LEAF).dim(), paper.authors.join(", "));
        }
        println!("{}{} papers", style(INFO_PREFIX).blue(), papers.len());
      },
      ResponseContent::Tags(tags) =>
        for tag in tags {
          println!(
            "{} {} {} {}",
            style(BULLET).dim(),
            style(&tag.name).bold(),
            style(format!("[{}]", tag.color)).dim(),
            style(&tag.id).yellow()
          );
        },
      ResponseContent::TagSummary(summary) =>
        for name in &summary.names {
          let color = summary.colors.get(name).map(String::as_str).unwrap_or_default();
          println!(
            "{} {} {}",
            style(BULLET).dim(),
            style(name).bold(),
            style(format!("[{color}]")).dim()
          );
        },
      ResponseContent::Queries(queries) =>
        for query in queries {
          println!("{} {}", style(BULLET).dim(), style(&query.name).bold());
          println!("  {} {}", style(TREE_BRANCH).dim(), query.query);
          println!("  {} {}", style(TREE_LEAF).dim(), style(&query.id).yellow());
        },
      ResponseContent::Digests(digests) =>
        for digest in digests {
          println!("{} {}", style(BULLET).dim(), style(&digest.name).bold());
          println!("  {} Topics: {}", style(TREE_BRANCH).dim(), digest.topics.join(", "));
          if !digest.description.is_empty() {
            println!("  {} {}", style(TREE_BRANCH).dim(), digest.description);
          }
          println!("  {} {}", style(TREE_LEAF).dim(), style(&digest.id).yellow());
        },
      ResponseContent::DigestPage(page) => {
        println!(
          "{}Page {} of {} ({} papers)",
          style(INFO_PREFIX).blue(),
          page.current_page,
          page.total_pages,
          page.total_papers
        );
        for result in &page.results {
          println!(
            "{} {} {}",
            style(format!("{:.2}", result.relevancy_score)).cyan(),
            style(&result.paper.title).bold(),
            style(&result.paper.id).yellow()
          );
          println!("     {} {}", style(TREE_LEAF).dim(), result.reason);
        }
      },
      ResponseContent::Success(message) => println!("{}{message}", style(SUCCESS_PREFIX).green()),
      ResponseContent::Info(message) => println!("{}{message}", style(INFO_PREFIX).blue()),
      ResponseContent::Warning(message) => println!("{}{message}", style(WARNING_PREFIX).yellow()),
      ResponseContent::Error(error) => eprintln!("{}{error}", style(ERROR_PREFIX).red()),
    }
    Ok(())
  }
}

/// Prints every field of one paper as a tree.
fn print_paper(paper: &Paper) {
  println!("{}", style(&paper.title).bold());
  let rows = [
    ("ID", paper.id.clone()),
    ("Authors", paper.authors.join(", ")),
    ("Published", paper.published.clone()),
    ("Category", paper.category.clone()),
    ("Link", paper.link.clone()),
    ("PDF", paper.pdf_url()),
  ];
  for (label, value) in rows {
    println!(
      "{} {} {}",
      style(TREE_BRANCH).dim(),
      style(format!("{label}:")).green().bold(),
      value
    );
  }
  println!("{} {}", style(TREE_LEAF).dim(), style("Summary:").green().bold());
  for line in textwrap(&paper.summary, 88) {
    println!("{CONTINUE_PREFIX}{line}");
  }
}

/// Greedy word wrap.
fn textwrap(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();
  let mut line = String::new();
  for word in text.split_whitespace() {
    if !line.is_empty() && line.len() + word.len() + 1 > width {
      lines.push(std::mem::take(&mut line));
    }
    if !line.is_empty() {
      line.push(' ');
    }
    line.push_str(word);
  }
  if !line.is_empty() {
    lines.push(line);
  }
  lines
}
