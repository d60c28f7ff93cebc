//! Tags on papers, the per-user tag summary, and the reading list.
//!
//! Each tag row ties one name and color to one paper for one user. Alongside the rows, every
//! user has a summary of distinct tag names with the color each name was first given, so the
//! same name keeps the same color across papers. The summary gains a name when its first tag is
//! added and loses it when its last tag is removed.
//!
//! The reading list is not a separate collection: a paper is on the reading list exactly when
//! it carries the tag [`READING_LIST`].
//!
//! Paper identifiers are version-stripped on every entry point, so `2301.07041v2` and
//! `2301.07041` address the same tags.

use super::*;
use crate::paper::strip_version;

/// Reserved tag name used as the bookmark list.
pub const READING_LIST: &str = "Reading List";

/// Palette tag colors are drawn from, as display class pairs.
pub const TAG_COLORS: [&str; 6] = [
  "bg-blue-100 text-blue-800",
  "bg-green-100 text-green-800",
  "bg-yellow-100 text-yellow-800",
  "bg-purple-100 text-purple-800",
  "bg-pink-100 text-pink-800",
  "bg-indigo-100 text-indigo-800",
];

/// Color given to the reading list the first time it is used.
pub const READING_LIST_COLOR: &str = TAG_COLORS[0];

/// Picks a palette color for a new tag name.
///
/// The choice is a pure function of the name: a rolling `hash * 31 + unit` over the UTF-16 code
/// units, where the multiplication is carried out on the 32-bit truncation of the running value,
/// as the web dashboard computes it. Colors chosen here therefore match the ones the dashboard
/// assigned to existing tags.
///
/// ```
/// use paperboard::store::color_for_tag;
///
/// assert_eq!(color_for_tag("ml"), "bg-green-100 text-green-800");
/// assert_eq!(color_for_tag("ml"), color_for_tag("ml"));
/// ```
pub fn color_for_tag(name: &str) -> &'static str {
  let hash = name.encode_utf16().fold(0f64, |acc, unit| {
    let shifted = to_int32(acc).wrapping_shl(5);
    f64::from(unit) + (f64::from(shifted) - acc)
  });
  // The hash is an integer well inside f64's exact range, so the remainder is exact.
  let index = (hash.abs() % TAG_COLORS.len() as f64) as usize;
  TAG_COLORS[index]
}

/// Truncates an integral float to 32 bits with wrap-around.
fn to_int32(value: f64) -> i32 { (value as i64) as i32 }

/// One tag on one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperTag {
  /// Store-assigned identifier
  pub id:         String,
  /// Tag name, trimmed
  pub name:       String,
  /// Display color
  pub color:      String,
  /// Version-less paper identifier
  pub paper_id:   String,
  /// Creation time in milliseconds since the epoch
  pub created_at: i64,
}

/// Distinct tag names of a user with their colors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
  /// Names in ascending order
  pub names:  Vec<String>,
  /// Color of each name
  pub colors: BTreeMap<String, String>,
}

/// Requested change to the reading list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingListAction {
  /// Put the paper on the list
  Add,
  /// Take the paper off the list
  Remove,
}

impl std::str::FromStr for ReadingListAction {
  type Err = PaperboardError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "add" => Ok(Self::Add),
      "remove" => Ok(Self::Remove),
      other => Err(PaperboardError::InvalidInput(format!("unknown reading list action {other:?}"))),
    }
  }
}

/// What a reading list toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
  /// The paper was added
  Added,
  /// The paper was removed
  Removed,
  /// The paper was already in the requested state
  Unchanged,
}

/// Maps a `paper_tags` row in column order `id, name, color, paper_id, created_at`.
fn tag_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PaperTag> {
  Ok(PaperTag {
    id:         row.get(0)?,
    name:       row.get(1)?,
    color:      row.get(2)?,
    paper_id:   row.get(3)?,
    created_at: row.get(4)?,
  })
}

/// Removes the summary entry for `name` if no tag with that name is left.
fn prune_summary(conn: &rusqlite::Connection, user_id: &str, name: &str) -> rusqlite::Result<()> {
  conn.execute(
    "DELETE FROM tag_colors
      WHERE user_id = ?1 AND name = ?2
        AND NOT EXISTS (SELECT 1 FROM paper_tags WHERE user_id = ?1 AND name = ?2)",
    params![user_id, name],
  )?;
  Ok(())
}

impl Store {
  /// Tags on one paper, newest first.
  pub async fn tags_for_paper(&self, user_id: &str, paper_id: &str) -> Result<Vec<PaperTag>> {
    require(user_id, "user id")?;
    require(paper_id, "paper id")?;
    let (user, paper) = (user_id.to_string(), strip_version(paper_id.trim()));
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, name, color, paper_id, created_at
             FROM paper_tags
            WHERE user_id = ?1 AND paper_id = ?2
            ORDER BY created_at DESC, rowid DESC",
        )?;
        let tags = stmt
          .query_map(params![user, paper], tag_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
      })
      .await
      .map_err(PaperboardError::from)
  }

  /// Distinct tag names of the user, sorted, with their colors.
  pub async fn tag_summary(&self, user_id: &str) -> Result<TagSummary> {
    require(user_id, "user id")?;
    let user = user_id.to_string();
    let pairs = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare_cached("SELECT name, color FROM tag_colors WHERE user_id = ?1")?;
        let pairs = stmt
          .query_map(params![user], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pairs)
      })
      .await?;

    let colors: BTreeMap<String, String> = pairs.into_iter().collect();
    Ok(TagSummary { names: colors.keys().cloned().collect(), colors })
  }

  /// Attaches a tag to a paper.
  ///
  /// The color is `existing_color` when given, otherwise [`color_for_tag`] of the trimmed name.
  /// The name enters the user's summary if it is not there yet; an existing summary color is
  /// left alone.
  ///
  /// # Errors
  ///
  /// - [`PaperboardError::InvalidInput`] for a blank user, paper or name
  /// - [`PaperboardError::DuplicateTag`] when the paper already carries a tag with this name
  pub async fn add_tag(
    &self,
    user_id: &str,
    paper_id: &str,
    name: &str,
    existing_color: Option<&str>,
  ) -> Result<PaperTag> {
    require(user_id, "user id")?;
    require(paper_id, "paper id")?;
    let name = name.trim();
    if name.is_empty() {
      return Err(PaperboardError::InvalidInput("tag name cannot be empty".into()));
    }

    let color = existing_color
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .unwrap_or_else(|| color_for_tag(name));
    let tag = PaperTag {
      id:         new_id(),
      name:       name.to_string(),
      color:      color.to_string(),
      paper_id:   strip_version(paper_id.trim()),
      created_at: now_millis(),
    };
    let (user, row) = (user_id.to_string(), tag.clone());
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO paper_tags (id, user_id, paper_id, name, color, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![row.id, user, row.paper_id, row.name, row.color, row.created_at],
        )?;
        if inserted > 0 {
          tx.execute(
            "INSERT OR IGNORE INTO tag_colors (user_id, name, color) VALUES (?1, ?2, ?3)",
            params![user, row.name, row.color],
          )?;
        }
        tx.commit()?;
        Ok(inserted > 0)
      })
      .await?;

    if !inserted {
      return Err(PaperboardError::DuplicateTag);
    }
    debug!("Tagged {} with {:?} for {user_id}", tag.paper_id, tag.name);
    Ok(tag)
  }

  /// Removes one tag by id.
  ///
  /// Fails with [`PaperboardError::NotFound`] when the user has no tag with this id.
  pub async fn remove_tag(&self, user_id: &str, tag_id: &str) -> Result<()> {
    require(user_id, "user id")?;
    require(tag_id, "tag id")?;
    let (user, id) = (user_id.to_string(), tag_id.to_string());
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let name: Option<String> = tx
          .query_row(
            "DELETE FROM paper_tags WHERE id = ?1 AND user_id = ?2 RETURNING name",
            params![id, user],
            |row| row.get(0),
          )
          .optional()?;
        if let Some(name) = &name {
          prune_summary(&tx, &user, name)?;
        }
        tx.commit()?;
        Ok(name)
      })
      .await?;

    match removed {
      Some(name) => {
        debug!("Removed tag {tag_id} ({name:?}) for {user_id}");
        Ok(())
      },
      None => Err(PaperboardError::NotFound),
    }
  }

  /// Identifiers of the papers carrying tag `name`, newest tag first.
  pub async fn paper_ids_for_tag(&self, user_id: &str, name: &str) -> Result<Vec<String>> {
    require(user_id, "user id")?;
    require(name, "tag name")?;
    let (user, name) = (user_id.to_string(), name.trim().to_string());
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT paper_id FROM paper_tags
            WHERE user_id = ?1 AND name = ?2
            ORDER BY created_at DESC, rowid DESC",
        )?;
        let ids = stmt
          .query_map(params![user, name], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
      })
      .await
      .map_err(PaperboardError::from)
  }

  /// Whether the paper is on the user's reading list.
  pub async fn in_reading_list(&self, user_id: &str, paper_id: &str) -> Result<bool> {
    require(user_id, "user id")?;
    require(paper_id, "paper id")?;
    let (user, paper) = (user_id.to_string(), strip_version(paper_id.trim()));
    self
      .conn
      .call(move |conn| {
        let found = conn
          .query_row(
            "SELECT 1 FROM paper_tags WHERE user_id = ?1 AND paper_id = ?2 AND name = ?3",
            params![user, paper, READING_LIST],
            |_| Ok(()),
          )
          .optional()?;
        Ok(found.is_some())
      })
      .await
      .map_err(PaperboardError::from)
  }

  /// Adds the paper to, or removes it from, the reading list.
  ///
  /// Applying the same action twice leaves the list as the first application did; the second
  /// call reports [`Toggle::Unchanged`].
  pub async fn toggle_reading_list(
    &self,
    user_id: &str,
    paper_id: &str,
    action: ReadingListAction,
  ) -> Result<Toggle> {
    require(user_id, "user id")?;
    require(paper_id, "paper id")?;
    let (user, paper) = (user_id.to_string(), strip_version(paper_id.trim()));
    let (id, created_at) = (new_id(), now_millis());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = match action {
          ReadingListAction::Add => {
            let color: String = tx
              .query_row(
                "SELECT color FROM tag_colors WHERE user_id = ?1 AND name = ?2",
                params![user, READING_LIST],
                |row| row.get(0),
              )
              .optional()?
              .unwrap_or_else(|| READING_LIST_COLOR.to_string());
            let added = tx.execute(
              "INSERT OR IGNORE INTO paper_tags (id, user_id, paper_id, name, color, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
              params![id, user, paper, READING_LIST, color, created_at],
            )?;
            if added > 0 {
              tx.execute(
                "INSERT OR IGNORE INTO tag_colors (user_id, name, color) VALUES (?1, ?2, ?3)",
                params![user, READING_LIST, color],
              )?;
              Toggle::Added
            } else {
              Toggle::Unchanged
            }
          },
          ReadingListAction::Remove => {
            let removed = tx.execute(
              "DELETE FROM paper_tags WHERE user_id = ?1 AND paper_id = ?2 AND name = ?3",
              params![user, paper, READING_LIST],
            )?;
            if removed > 0 {
              prune_summary(&tx, &user, READING_LIST)?;
              Toggle::Removed
            } else {
              Toggle::Unchanged
            }
          },
        };
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    debug!("Reading list {action:?} for {paper_id}: {outcome:?}");
    Ok(outcome)
  }
}
