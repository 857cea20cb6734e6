//! vCenter database queries.
//!
//! CRUD operations for the `vcenters` table. Input bounds are checked here,
//! uniqueness is left to the schema and surfaced as [`Error::Conflict`].

use chrono::{DateTime, SecondsFormat, Utc};
use octopunch_common::{Error, Result, VcenterId, MAX_INT};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, ToSql};
use uuid::Uuid;

use crate::models::{
    NewVcenter, VcenterFilters, VcenterInfo, VcenterUpdate, DEFAULT_VCENTER_STATUS,
};

const VCENTER_COLUMNS: &str = "id, name, host, port, username, password, datacenter, \
                               description, status, created_at, updated_at";

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_vcenter(row: &Row<'_>) -> rusqlite::Result<VcenterInfo> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let created_at: String = row.get(9)?;
    let updated_at: Option<String> = row.get(10)?;

    Ok(VcenterInfo {
        id: VcenterId::from(id),
        name: row.get(1)?,
        host: row.get(2)?,
        port: row.get(3)?,
        username: row.get(4)?,
        password: row.get(5)?,
        datacenter: row.get(6)?,
        description: row.get(7)?,
        status: row.get(8)?,
        created_at: parse_timestamp(9, &created_at)?,
        updated_at: updated_at
            .map(|ts| parse_timestamp(10, &ts))
            .transpose()?,
    })
}

/// Translate a write failure, reporting constraint violations as conflicts.
fn write_error(e: rusqlite::Error) -> Error {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => Error::conflict(e.to_string()),
        _ => Error::database(e.to_string()),
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_int_bounds(field: &str, value: i64) -> Result<()> {
    if !(0..=MAX_INT).contains(&value) {
        return Err(Error::invalid_input(format!(
            "{field} must be between 0 and {MAX_INT}, got {value}"
        )));
    }
    Ok(())
}

fn validate_new(values: &NewVcenter) -> Result<()> {
    require_non_empty("name", &values.name)?;
    require_non_empty("host", &values.host)?;
    require_non_empty("username", &values.username)?;
    check_int_bounds("port", values.port)
}

fn validate_update(update: &VcenterUpdate) -> Result<()> {
    if let Some(name) = &update.name {
        require_non_empty("name", name)?;
    }
    if let Some(host) = &update.host {
        require_non_empty("host", host)?;
    }
    if let Some(username) = &update.username {
        require_non_empty("username", username)?;
    }
    if let Some(port) = update.port {
        check_int_bounds("port", port)?;
    }
    Ok(())
}

/// Register a new vCenter.
///
/// # Returns
///
/// * `Ok(VcenterInfo)` - The stored record
/// * `Err(Error::InvalidInput)` - If a required field is empty or the port is out of range
/// * `Err(Error::Conflict)` - If the name or id is already registered
pub fn create_vcenter(conn: &Connection, values: &NewVcenter) -> Result<VcenterInfo> {
    validate_new(values)?;

    let vcenter = VcenterInfo {
        id: values.id.unwrap_or_default(),
        name: values.name.clone(),
        host: values.host.clone(),
        port: values.port,
        username: values.username.clone(),
        password: values.password.clone(),
        datacenter: values.datacenter.clone(),
        description: values.description.clone(),
        status: values
            .status
            .clone()
            .unwrap_or_else(|| DEFAULT_VCENTER_STATUS.to_string()),
        created_at: Utc::now(),
        updated_at: None,
    };

    conn.execute(
        "INSERT INTO vcenters (id, name, host, port, username, password, datacenter,
                               description, status, created_at)
         VALUES (:id, :name, :host, :port, :username, :password, :datacenter,
                 :description, :status, :created_at)",
        rusqlite::named_params! {
            ":id": vcenter.id.to_string(),
            ":name": vcenter.name,
            ":host": vcenter.host,
            ":port": vcenter.port,
            ":username": vcenter.username,
            ":password": vcenter.password,
            ":datacenter": vcenter.datacenter,
            ":description": vcenter.description,
            ":status": vcenter.status,
            ":created_at": format_timestamp(&vcenter.created_at),
        },
    )
    .map_err(write_error)?;

    Ok(vcenter)
}

/// Get a vCenter by ID.
///
/// # Returns
///
/// * `Ok(Some(VcenterInfo))` - The record if found
/// * `Ok(None)` - If no record has this ID
/// * `Err(Error)` - If a database error occurs
pub fn get_vcenter(conn: &Connection, id: VcenterId) -> Result<Option<VcenterInfo>> {
    let result = conn.query_row(
        &format!("SELECT {VCENTER_COLUMNS} FROM vcenters WHERE id = :id"),
        rusqlite::named_params! { ":id": id.to_string() },
        row_to_vcenter,
    );

    match result {
        Ok(vcenter) => Ok(Some(vcenter)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List vCenters matching every set filter, oldest first.
pub fn list_vcenters(conn: &Connection, filters: &VcenterFilters) -> Result<Vec<VcenterInfo>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<(&str, &dyn ToSql)> = Vec::new();

    if let Some(name) = &filters.name {
        clauses.push("name = :name");
        params.push((":name", name as &dyn ToSql));
    }
    if let Some(host) = &filters.host {
        clauses.push("host = :host");
        params.push((":host", host as &dyn ToSql));
    }
    if let Some(port) = &filters.port {
        clauses.push("port = :port");
        params.push((":port", port as &dyn ToSql));
    }
    if let Some(username) = &filters.username {
        clauses.push("username = :username");
        params.push((":username", username as &dyn ToSql));
    }
    if let Some(datacenter) = &filters.datacenter {
        clauses.push("datacenter = :datacenter");
        params.push((":datacenter", datacenter as &dyn ToSql));
    }
    if let Some(status) = &filters.status {
        clauses.push("status = :status");
        params.push((":status", status as &dyn ToSql));
    }

    let mut sql = format!("SELECT {VCENTER_COLUMNS} FROM vcenters");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at, name");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let vcenters = stmt
        .query_map(params.as_slice(), row_to_vcenter)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(vcenters)
}

/// Apply a partial update and return the stored result.
///
/// An empty update leaves the record untouched, including `updated_at`.
///
/// # Returns
///
/// * `Ok(VcenterInfo)` - The record after the update
/// * `Err(Error::NotFound)` - If no record has this ID
/// * `Err(Error::Conflict)` - If the new name is already taken
pub fn update_vcenter(
    conn: &Connection,
    id: VcenterId,
    update: &VcenterUpdate,
) -> Result<VcenterInfo> {
    validate_update(update)?;

    if !update.is_empty() {
        let updated_at = format_timestamp(&Utc::now());
        let id_str = id.to_string();
        let mut sets: Vec<&str> = vec!["updated_at = :updated_at"];
        let mut params: Vec<(&str, &dyn ToSql)> =
            vec![(":id", &id_str as &dyn ToSql), (":updated_at", &updated_at)];

        if let Some(name) = &update.name {
            sets.push("name = :name");
            params.push((":name", name as &dyn ToSql));
        }
        if let Some(host) = &update.host {
            sets.push("host = :host");
            params.push((":host", host as &dyn ToSql));
        }
        if let Some(port) = &update.port {
            sets.push("port = :port");
            params.push((":port", port as &dyn ToSql));
        }
        if let Some(username) = &update.username {
            sets.push("username = :username");
            params.push((":username", username as &dyn ToSql));
        }
        if let Some(password) = &update.password {
            sets.push("password = :password");
            params.push((":password", password as &dyn ToSql));
        }
        if let Some(datacenter) = &update.datacenter {
            sets.push("datacenter = :datacenter");
            params.push((":datacenter", datacenter as &dyn ToSql));
        }
        if let Some(description) = &update.description {
            sets.push("description = :description");
            params.push((":description", description as &dyn ToSql));
        }
        if let Some(status) = &update.status {
            sets.push("status = :status");
            params.push((":status", status as &dyn ToSql));
        }

        let sql = format!("UPDATE vcenters SET {} WHERE id = :id", sets.join(", "));
        let rows_affected = conn.execute(&sql, params.as_slice()).map_err(write_error)?;

        if rows_affected == 0 {
            return Err(Error::not_found("vcenter", id));
        }
    }

    get_vcenter(conn, id)?.ok_or_else(|| Error::not_found("vcenter", id))
}

/// Delete a vCenter.
///
/// # Returns
///
/// * `Ok(true)` - If the record was deleted
/// * `Ok(false)` - If no record had this ID
pub fn delete_vcenter(conn: &Connection, id: VcenterId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM vcenters WHERE id = :id",
            rusqlite::named_params! { ":id": id.to_string() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}
