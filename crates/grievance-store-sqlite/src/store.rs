//! [`SqliteStore`]: the SQLite implementation of [`ComplaintStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use grievance_core::{
  complaint::{
    Complaint, ComplaintFilter, ComplaintPatch, NewComplaint, ResolutionNote, Status,
  },
  lifecycle,
  store::ComplaintStore,
};

use crate::{
  Error, Result,
  encode::{
    COMPLAINT_COLUMNS, RawComplaint, RawNote, encode_category, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A complaint store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run on the connection thread) ──────────────────────────────

fn load_notes(
  conn: &rusqlite::Connection,
  complaint_id: &str,
) -> rusqlite::Result<Vec<RawNote>> {
  let mut stmt = conn.prepare_cached(
    "SELECT text, author, created_at FROM resolution_notes
     WHERE complaint_id = ?1
     ORDER BY position",
  )?;
  stmt
    .query_map(rusqlite::params![complaint_id], |row| {
      Ok(RawNote {
        text:       row.get(0)?,
        author:     row.get(1)?,
        created_at: row.get(2)?,
      })
    })?
    .collect()
}

fn load_complaint(
  conn: &rusqlite::Connection,
  complaint_id: &str,
) -> rusqlite::Result<Option<RawComplaint>> {
  let raw = conn
    .query_row(
      &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"),
      rusqlite::params![complaint_id],
      RawComplaint::from_row,
    )
    .optional()?;

  match raw {
    Some(mut raw) => {
      raw.notes = load_notes(conn, complaint_id)?;
      Ok(Some(raw))
    }
    None => Ok(None),
  }
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

impl ComplaintStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewComplaint) -> Result<Complaint> {
    let now = lifecycle::now();
    let complaint = Complaint {
      id:               Uuid::new_v4(),
      complainant_name: input.complainant_name,
      email:            input.email,
      phone_number:     input.phone_number,
      title:            input.title,
      description:      input.description,
      category:         input.category,
      assigned_to:      input.assigned_to,
      status:           Status::Open,
      completion_date:  None,
      resolution_notes: Vec::new(),
      created_at:       now,
      updated_at:       now,
    };

    let id_str       = encode_uuid(complaint.id);
    let name         = complaint.complainant_name.clone();
    let email        = complaint.email.clone();
    let phone        = complaint.phone_number.clone();
    let title        = complaint.title.clone();
    let description  = complaint.description.clone();
    let category_str = encode_category(complaint.category);
    let assigned_to  = complaint.assigned_to.clone();
    let status_str   = encode_status(complaint.status);
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO complaints (
             complaint_id, complainant_name, email, phone_number, title,
             description, category, assigned_to, status, completion_date,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?10)",
          rusqlite::params![
            id_str,
            name,
            email,
            phone,
            title,
            description,
            category_str,
            assigned_to,
            status_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %complaint.id, "inserted complaint");
    Ok(complaint)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Complaint>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| Ok(load_complaint(conn, &id_str)?))
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn find_many(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
    let status_str   = filter.status.map(encode_status);
    let category_str = filter.category.map(encode_category);

    let raws: Vec<RawComplaint> = self
      .conn
      .call(move |conn| {
        // NULL parameters disable their condition.
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPLAINT_COLUMNS} FROM complaints
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR category = ?2)
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let mut rows = stmt
          .query_map(
            rusqlite::params![status_str, category_str],
            RawComplaint::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        for raw in &mut rows {
          raw.notes = load_notes(conn, &raw.complaint_id)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }

  async fn set_lifecycle(
    &self,
    id: Uuid,
    status: Status,
    completion_date: Option<DateTime<Utc>>,
  ) -> Result<Option<Complaint>> {
    let id_str         = encode_uuid(id);
    let status_str     = encode_status(status);
    let completion_str = completion_date.map(encode_dt);
    let updated_str    = encode_dt(lifecycle::now());

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE complaints
           SET status = ?2, completion_date = ?3, updated_at = ?4
           WHERE complaint_id = ?1",
          rusqlite::params![id_str, status_str, completion_str, updated_str],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(load_complaint(conn, &id_str)?)
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn append_note(
    &self,
    id: Uuid,
    note: ResolutionNote,
    close_at: Option<DateTime<Utc>>,
  ) -> Result<Option<Complaint>> {
    let id_str      = encode_uuid(id);
    let closed_str  = encode_status(Status::ClosedNoResolution);
    let close_str   = close_at.map(encode_dt);
    let updated_str = encode_dt(lifecycle::now());
    let note        = RawNote::from_note(&note);

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some(close_str) = &close_str {
          tx.execute(
            "UPDATE complaints
             SET status = ?2, completion_date = ?3
             WHERE complaint_id = ?1 AND completion_date IS NULL",
            rusqlite::params![id_str, closed_str, close_str],
          )?;
        }

        // A non-null completion date means the status is terminal.
        let completed = tx.execute(
          "UPDATE complaints SET updated_at = ?2
           WHERE complaint_id = ?1 AND completion_date IS NOT NULL",
          rusqlite::params![id_str, updated_str],
        )?;
        if completed == 0 {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO resolution_notes (complaint_id, position, text, author, created_at)
           SELECT ?1, COALESCE(MAX(position) + 1, 0), ?2, ?3, ?4
           FROM resolution_notes WHERE complaint_id = ?1",
          rusqlite::params![id_str, note.text, note.author, note.created_at],
        )?;
        tx.commit()?;

        Ok(load_complaint(conn, &id_str)?)
      })
      .await?;

    if raw.is_some() {
      tracing::debug!(%id, "appended resolution note");
    }
    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn update_fields(
    &self,
    id: Uuid,
    patch: ComplaintPatch,
  ) -> Result<Option<Complaint>> {
    let id_str       = encode_uuid(id);
    let category_str = patch.category.map(encode_category);
    let updated_str  = encode_dt(lifecycle::now());
    let ComplaintPatch {
      complainant_name,
      email,
      phone_number,
      title,
      description,
      assigned_to,
      ..
    } = patch;

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        // NULL parameters keep the stored value.
        let updated = conn.execute(
          "UPDATE complaints SET
             complainant_name = COALESCE(?2, complainant_name),
             email            = COALESCE(?3, email),
             phone_number     = COALESCE(?4, phone_number),
             title            = COALESCE(?5, title),
             description      = COALESCE(?6, description),
             category         = COALESCE(?7, category),
             assigned_to      = COALESCE(?8, assigned_to),
             updated_at       = ?9
           WHERE complaint_id = ?1",
          rusqlite::params![
            id_str,
            complainant_name,
            email,
            phone_number,
            title,
            description,
            category_str,
            assigned_to,
            updated_str,
          ],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(load_complaint(conn, &id_str)?)
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }
}
