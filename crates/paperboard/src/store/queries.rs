//! Saved search queries.

use super::*;

/// A named search expression the user can rerun.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuery {
  /// Store-assigned identifier
  pub id:         String,
  /// Display name
  pub name:       String,
  /// arXiv search expression
  pub query:      String,
  /// Owner
  pub user_id:    String,
  /// Creation time in milliseconds since the epoch
  pub created_at: i64,
}

impl Store {
  /// The user's saved queries, newest first.
  pub async fn queries(&self, user_id: &str) -> Result<Vec<SavedQuery>> {
    require(user_id, "user id")?;
    let user_id = user_id.to_string();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "SELECT id, name, query, user_id, created_at
             FROM saved_queries
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
          Ok(SavedQuery {
            id:         row.get(0)?,
            name:       row.get(1)?,
            query:      row.get(2)?,
            user_id:    row.get(3)?,
            created_at: row.get(4)?,
          })
        })?;
        let queries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(queries)
      })
      .await
      .map_err(PaperboardError::from)
  }

  /// Saves a query under `name`.
  pub async fn save_query(&self, user_id: &str, name: &str, query: &str) -> Result<SavedQuery> {
    require(user_id, "user id")?;
    require(name, "name")?;
    require(query, "query")?;

    let saved = SavedQuery {
      id:         new_id(),
      name:       name.trim().to_string(),
      query:      query.trim().to_string(),
      user_id:    user_id.to_string(),
      created_at: now_millis(),
    };
    let row = saved.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO saved_queries (id, name, query, user_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![row.id, row.name, row.query, row.user_id, row.created_at],
        )?;
        Ok(())
      })
      .await?;

    debug!("Saved query {} for {user_id}", saved.id);
    Ok(saved)
  }

  /// Deletes one of the user's queries.
  ///
  /// Fails with [`PaperboardError::NotFound`] when the query does not exist or belongs to
  /// someone else.
  pub async fn delete_query(&self, user_id: &str, query_id: &str) -> Result<()> {
    require(user_id, "user id")?;
    require(query_id, "query id")?;
    let (user, id) = (user_id.to_string(), query_id.to_string());
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM saved_queries WHERE id = ?1 AND user_id = ?2",
          params![id, user],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(PaperboardError::NotFound);
    }
    Ok(())
  }
}
