//! Digest definitions and the results recorded for them.
//!
//! A digest is a named profile of topics plus a free-text description. Matching papers against
//! digests happens elsewhere (a nightly job); that job writes its matches as [`DigestResult`]s
//! keyed by user, day and digest name, and this module only reads them back.

use super::*;

/// A saved digest profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
  /// Store-assigned identifier
  pub id:          String,
  /// Owner
  pub user_id:     String,
  /// Display name, also the key results are stored under
  pub name:        String,
  /// Selected topics
  pub topics:      Vec<String>,
  /// Free-text interest description
  pub description: String,
  /// Creation time in milliseconds since the epoch
  pub created_at:  i64,
}

/// One paper matched to a digest on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestResult {
  /// Version-less paper identifier
  pub paper_id:        String,
  /// How well the paper matches, higher is better
  pub relevancy_score: f64,
  /// Why the paper was matched
  pub reason:          String,
}

/// Maps a `digests` row in column order `id, user_id, name, topics, description, created_at`.
fn digest_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Digest> {
  let topics: String = row.get(3)?;
  let topics = serde_json::from_str(&topics).map_err(|e| {
    rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
  })?;
  Ok(Digest {
    id: row.get(0)?,
    user_id: row.get(1)?,
    name: row.get(2)?,
    topics,
    description: row.get(4)?,
    created_at: row.get(5)?,
  })
}

/// Trims topics and drops blank ones.
fn clean_topics(topics: &[String]) -> Vec<String> {
  topics.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).map(String::from).collect()
}

impl Store {
  /// The user's digests, oldest first.
  pub async fn digests(&self, user_id: &str) -> Result<Vec<Digest>> {
    require(user_id, "user id")?;
    let user = user_id.to_string();
    let digests = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, user_id, name, topics, description, created_at
             FROM digests
            WHERE user_id = ?1
            ORDER BY created_at, rowid",
        )?;
        let digests =
          stmt.query_map(params![user], digest_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(digests)
      })
      .await?;
    debug!("Found {} digests for {user_id}", digests.len());
    Ok(digests)
  }

  /// Creates a digest. The name is trimmed and must not be blank.
  pub async fn create_digest(
    &self,
    user_id: &str,
    name: &str,
    topics: &[String],
    description: &str,
  ) -> Result<Digest> {
    require(user_id, "user id")?;
    require(name, "digest name")?;

    let digest = Digest {
      id:          new_id(),
      user_id:     user_id.to_string(),
      name:        name.trim().to_string(),
      topics:      clean_topics(topics),
      description: description.trim().to_string(),
      created_at:  now_millis(),
    };
    let topics_json = serde_json::to_string(&digest.topics)?;
    let row = digest.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO digests (id, user_id, name, topics, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![row.id, row.user_id, row.name, topics_json, row.description, row.created_at],
        )?;
        Ok(())
      })
      .await?;

    debug!("Created digest {:?} ({}) for {user_id}", digest.name, digest.id);
    Ok(digest)
  }

  /// Replaces the name, topics and description of one of the user's digests.
  ///
  /// Fails with [`PaperboardError::NotFound`] when the digest does not exist or belongs to
  /// someone else.
  pub async fn update_digest(
    &self,
    user_id: &str,
    digest_id: &str,
    name: &str,
    topics: &[String],
    description: &str,
  ) -> Result<Digest> {
    require(user_id, "user id")?;
    require(digest_id, "digest id")?;
    require(name, "digest name")?;

    let (user, id) = (user_id.to_string(), digest_id.to_string());
    let (name, description) = (name.trim().to_string(), description.trim().to_string());
    let topics_json = serde_json::to_string(&clean_topics(topics))?;
    let updated = self
      .conn
      .call(move |conn| {
        let digest = conn
          .query_row(
            "UPDATE digests SET name = ?3, topics = ?4, description = ?5
              WHERE id = ?1 AND user_id = ?2
              RETURNING id, user_id, name, topics, description, created_at",
            params![id, user, name, topics_json, description],
            digest_from_row,
          )
          .optional()?;
        Ok(digest)
      })
      .await?;

    updated.ok_or(PaperboardError::NotFound)
  }

  /// Deletes one of the user's digests.
  ///
  /// Recorded results stay in place; they are keyed by name and date, not by digest id.
  pub async fn delete_digest(&self, user_id: &str, digest_id: &str) -> Result<()> {
    require(user_id, "user id")?;
    require(digest_id, "digest id")?;
    let (user, id) = (user_id.to_string(), digest_id.to_string());
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM digests WHERE id = ?1 AND user_id = ?2", params![id, user])?)
      })
      .await?;

    if deleted == 0 {
      return Err(PaperboardError::NotFound);
    }
    debug!("Deleted digest {digest_id} for {user_id}");
    Ok(())
  }

  /// Results recorded for a digest on `date`, ordered by paper identifier.
  pub async fn digest_results(
    &self,
    user_id: &str,
    date: NaiveDate,
    digest_name: &str,
  ) -> Result<Vec<DigestResult>> {
    require(user_id, "user id")?;
    require(digest_name, "digest name")?;
    let (user, day, name) = (user_id.to_string(), date.to_string(), digest_name.trim().to_string());
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT paper_id, relevancy_score, reason
             FROM digest_results
            WHERE user_id = ?1 AND date = ?2 AND digest_name = ?3
            ORDER BY paper_id",
        )?;
        let results = stmt
          .query_map(params![user, day, name], |row| {
            Ok(DigestResult {
              paper_id:        row.get(0)?,
              relevancy_score: row.get(1)?,
              reason:          row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(results)
      })
      .await
      .map_err(PaperboardError::from)
  }

  /// Records (or replaces) one digest match. This is the write side used by the digest job.
  pub async fn record_digest_result(
    &self,
    user_id: &str,
    date: NaiveDate,
    digest_name: &str,
    result: &DigestResult,
  ) -> Result<()> {
    require(user_id, "user id")?;
    require(digest_name, "digest name")?;
    require(&result.paper_id, "paper id")?;
    let (user, day, name) = (user_id.to_string(), date.to_string(), digest_name.trim().to_string());
    let mut result = result.clone();
    result.paper_id = paper::strip_version(result.paper_id.trim());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO digest_results
             (user_id, date, digest_name, paper_id, relevancy_score, reason)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![user, day, name, result.paper_id, result.relevancy_score, result.reason],
        )?;
        Ok(())
      })
      .await
      .map_err(PaperboardError::from)
  }
}
