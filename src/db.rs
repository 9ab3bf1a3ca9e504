use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use crate::intake::{LeadSubmission, SupportRequest};

/// A persisted lead as stored in the `leads` table.
#[derive(Debug, Clone)]
pub struct LeadRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// Status assigned to every newly created lead.
pub const LEAD_STATUS_NEW: &str = "NEW";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Initialize database connection and create tables
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS leads (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                company_name TEXT NOT NULL,
                phone TEXT,
                status TEXT NOT NULL DEFAULT 'NEW',
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create leads table")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS support_requests (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                request_type TEXT NOT NULL,
                request_type_label TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create support_requests table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Check whether a lead with this email (the natural key) already exists.
    pub fn lead_exists(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM leads WHERE email = ?1")?;
        let count: i64 = stmt.query_row(params![email], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Insert a new lead with the given generated id and status NEW.
    ///
    /// The UNIQUE constraint on email backstops the caller's duplicate check;
    /// a constraint violation surfaces as a rusqlite error in the chain.
    pub fn insert_lead(&self, id: &str, lead: &LeadSubmission) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO leads (id, name, email, company_name, phone, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                lead.name,
                lead.email,
                lead.company_name,
                lead.phone,
                LEAD_STATUS_NEW,
                created_at
            ],
        )
        .context("Failed to insert lead")?;

        Ok(())
    }

    /// Fetch a lead by its email address.
    pub fn get_lead_by_email(&self, email: &str) -> Result<Option<LeadRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, email, company_name, phone, status, created_at
             FROM leads WHERE email = ?1",
        )?;

        let record = stmt
            .query_row(params![email], |row| {
                Ok(LeadRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    company_name: row.get(3)?,
                    phone: row.get(4)?,
                    status: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    /// Get count of stored leads
    pub fn lead_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM leads")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert a new support request.
    pub fn insert_support_request(&self, id: &str, request: &SupportRequest) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO support_requests
             (id, name, email, request_type, request_type_label, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                request.name,
                request.email,
                request.request_type.code(),
                request.request_type_label,
                request.description,
                created_at
            ],
        )
        .context("Failed to insert support request")?;

        Ok(())
    }

    /// Get count of stored support requests
    pub fn support_request_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM support_requests")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }
}
