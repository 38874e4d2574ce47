// ==========================================
// Fieldwork costing - element-costs store
// ==========================================
// Tables: project_types, element_costs, element_costs_values,
//         project_metadata (all children cascade on delete)
// Each public call locks the connection, runs one statement or
// one transaction, and releases the guard on every exit path.
// ==========================================
// Read-only during cost computation (ElementCostLookup).
// ==========================================

use crate::catalogue::length_band::LengthRange;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::cost::{CostElement, CostNode};
use crate::domain::types::ProjectType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// Number of subtitle columns in element_costs
pub const SUBTITLE_DEPTH: usize = 5;

/// One (level, length range) cost cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCostValue {
    pub level: String,
    pub length_min: u32,
    pub length_max: u32,
    pub cost_value: Decimal,
}

impl ElementCostValue {
    pub fn range(&self) -> LengthRange {
        LengthRange::new(self.length_min, self.length_max)
    }
}

/// One imported catalogue line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementCostRecord {
    pub subtitle_code: String,
    /// subtitle_1..subtitle_5; blanks trail
    pub subtitles: Vec<String>,
    pub row_order: i64,
    pub unit: String,
    pub values: Vec<ElementCostValue>,
}

impl ElementCostRecord {
    /// Non-blank subtitles in column order
    pub fn path_segments(&self) -> Vec<&str> {
        self.subtitles
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn subtitle(&self, index: usize) -> Option<&str> {
        self.subtitles
            .get(index)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Ordered level and length labels of a project type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub levels: Vec<String>,
    pub lengths: Vec<String>,
}

// ==========================================
// ElementCostLookup - read seam used by the price dispatcher
// ==========================================
pub trait ElementCostLookup {
    /// Cost cell for (project type, subtitle code, level) covering the length
    fn find_cost(
        &self,
        project_type: ProjectType,
        subtitle_code: &str,
        level: &str,
        interview_length: u32,
    ) -> RepositoryResult<Option<Decimal>>;
}

// ==========================================
// ElementCostRepository
// ==========================================
pub struct ElementCostRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ElementCostRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.init_schema()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Create the store tables if missing
    pub fn init_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        init_schema(&conn)?;
        Ok(())
    }

    // ===== project_types =====

    /// Insert a project type if absent; returns its id
    pub fn upsert_project_type(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        upsert_project_type_on(&conn, name)
    }

    pub fn list_project_types(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT name FROM project_types ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Delete a project type and, by cascade, all of its rows
    ///
    /// Returns false when the type did not exist.
    pub fn delete_project_type(&self, name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM project_types WHERE name = ?1", params![name.trim()])?;
        if affected > 0 {
            tracing::info!(project_type = name, "project type deleted");
        }
        Ok(affected > 0)
    }

    // ===== element_costs =====

    /// Replace every element of a project type in one transaction
    pub fn replace_elements(
        &self,
        project_type: &str,
        records: &[ElementCostRecord],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let type_id = upsert_project_type_on(&tx, project_type)?;
        tx.execute(
            "DELETE FROM element_costs WHERE project_type_id = ?1",
            params![type_id],
        )?;

        for record in records {
            tx.execute(
                r#"
                INSERT INTO element_costs (
                    project_type_id, subtitle_code,
                    subtitle_1, subtitle_2, subtitle_3, subtitle_4, subtitle_5,
                    row_order, unit
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    type_id,
                    record.subtitle_code.trim(),
                    record.subtitle(0),
                    record.subtitle(1),
                    record.subtitle(2),
                    record.subtitle(3),
                    record.subtitle(4),
                    record.row_order,
                    record.unit,
                ],
            )?;
            let element_id = tx.last_insert_rowid();

            for value in &record.values {
                tx.execute(
                    r#"
                    INSERT INTO element_costs_values (
                        element_cost_id, level, length_min, length_max, cost_value
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![
                        element_id,
                        value.level,
                        value.length_min,
                        value.length_max,
                        value.cost_value.to_string(),
                    ],
                )?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(project_type, rows = records.len(), "element costs replaced");
        Ok(records.len())
    }

    /// All elements of a project type in row order, with their cost cells
    pub fn list_elements(&self, project_type: &str) -> RepositoryResult<Vec<ElementCostRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e.id, e.subtitle_code,
                   e.subtitle_1, e.subtitle_2, e.subtitle_3, e.subtitle_4, e.subtitle_5,
                   e.row_order, e.unit
            FROM element_costs e
            JOIN project_types p ON p.id = e.project_type_id
            WHERE p.name = ?1
            ORDER BY e.row_order, e.id
            "#,
        )?;
        let rows = stmt
            .query_map(params![project_type.trim()], |row| {
                let mut subtitles = Vec::with_capacity(SUBTITLE_DEPTH);
                for col in 2..2 + SUBTITLE_DEPTH {
                    subtitles.push(row.get::<_, Option<String>>(col)?.unwrap_or_default());
                }
                Ok((
                    row.get::<_, i64>(0)?,
                    ElementCostRecord {
                        subtitle_code: row.get(1)?,
                        subtitles,
                        row_order: row.get(7)?,
                        unit: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                        values: Vec::new(),
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut value_stmt = conn.prepare(
            r#"
            SELECT level, length_min, length_max, cost_value
            FROM element_costs_values
            WHERE element_cost_id = ?1
            ORDER BY id
            "#,
        )?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, mut record) in rows {
            let raw_values = value_stmt
                .query_map(params![id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (level, length_min, length_max, raw) in raw_values {
                record.values.push(ElementCostValue {
                    level,
                    length_min,
                    length_max,
                    cost_value: parse_stored_decimal(&raw)?,
                });
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Cost cell lookup by project-type name
    pub fn find_cost_by_name(
        &self,
        project_type: &str,
        subtitle_code: &str,
        level: &str,
        interview_length: u32,
    ) -> RepositoryResult<Option<Decimal>> {
        let conn = self.get_conn()?;
        let raw: Option<String> = conn
            .query_row(
                r#"
                SELECT v.cost_value
                FROM element_costs_values v
                JOIN element_costs e ON e.id = v.element_cost_id
                JOIN project_types p ON p.id = e.project_type_id
                WHERE p.name = ?1
                  AND e.subtitle_code = ?2
                  AND v.level = ?3
                  AND v.length_min <= ?4 AND ?4 <= v.length_max
                ORDER BY e.row_order, v.id
                LIMIT 1
                "#,
                params![project_type.trim(), subtitle_code.trim(), level, interview_length],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|r| parse_stored_decimal(&r)).transpose()
    }

    // ===== project_metadata =====

    pub fn save_metadata(&self, project_type: &str, metadata: &ProjectMetadata) -> RepositoryResult<()> {
        let levels = to_json_column("levels", &metadata.levels)?;
        let lengths = to_json_column("lengths", &metadata.lengths)?;

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let type_id = upsert_project_type_on(&tx, project_type)?;
        tx.execute(
            r#"
            INSERT INTO project_metadata (project_type_id, levels, lengths)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(project_type_id) DO UPDATE SET
                levels = excluded.levels,
                lengths = excluded.lengths
            "#,
            params![type_id, levels, lengths],
        )?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    pub fn get_metadata(&self, project_type: &str) -> RepositoryResult<Option<ProjectMetadata>> {
        let conn = self.get_conn()?;
        let row: Option<(String, String)> = conn
            .query_row(
                r#"
                SELECT m.levels, m.lengths
                FROM project_metadata m
                JOIN project_types p ON p.id = m.project_type_id
                WHERE p.name = ?1
                "#,
                params![project_type.trim()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((levels, lengths)) => Ok(Some(ProjectMetadata {
                levels: from_json_column("levels", &levels)?,
                lengths: from_json_column("lengths", &lengths)?,
            })),
            None => Ok(None),
        }
    }

    // ===== hierarchy reconstruction =====

    /// Rebuild a cost tree from subtitle_1..5
    ///
    /// The deepest non-blank subtitle is the element description; the
    /// subtitles above it name the nodes. Cost cells are keyed by the
    /// canonical band label of their stored range.
    pub fn build_hierarchy(&self, project_type: &str) -> RepositoryResult<CostNode> {
        let records = self.list_elements(project_type)?;
        let mut root = CostNode::default();

        for record in &records {
            let segments = record.path_segments();
            let Some((description, parents)) = segments.split_last() else {
                tracing::warn!(code = %record.subtitle_code, "element without subtitles skipped");
                continue;
            };

            let mut element = CostElement::new(record.subtitle_code.clone(), record.unit.clone(), *description);
            for value in &record.values {
                element = element.with_cost(&value.level, &value.range().label(), value.cost_value);
            }

            let mut node = &mut root;
            for segment in parents {
                if !node.children.contains_key(segment) {
                    node.children.insert(*segment, CostNode::default());
                }
                node = match node.children.get_mut(segment) {
                    Some(child) => child,
                    None => {
                        return Err(RepositoryError::InternalError(format!(
                            "hierarchy node {} vanished during rebuild",
                            segment
                        )))
                    }
                };
            }
            node.elements.push(element);
        }

        tracing::debug!(project_type, elements = records.len(), "hierarchy rebuilt from store");
        Ok(root)
    }
}

impl ElementCostLookup for ElementCostRepository {
    fn find_cost(
        &self,
        project_type: ProjectType,
        subtitle_code: &str,
        level: &str,
        interview_length: u32,
    ) -> RepositoryResult<Option<Decimal>> {
        self.find_cost_by_name(project_type.as_str(), subtitle_code, level, interview_length)
    }
}

// ==========================================
// Helpers
// ==========================================

fn upsert_project_type_on(conn: &Connection, name: &str) -> RepositoryResult<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepositoryError::FieldValueError {
            field: "project_type".to_string(),
            message: "project type name is empty".to_string(),
        });
    }
    conn.execute(
        "INSERT OR IGNORE INTO project_types (name) VALUES (?1)",
        params![name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM project_types WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn parse_stored_decimal(raw: &str) -> RepositoryResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| RepositoryError::FieldValueError {
        field: "cost_value".to_string(),
        message: format!("{} ({})", e, raw),
    })
}

fn to_json_column(key: &str, values: &[String]) -> RepositoryResult<String> {
    serde_json::to_string(values).map_err(|e| RepositoryError::MalformedJson {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn from_json_column(key: &str, raw: &str) -> RepositoryResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::MalformedJson {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn repo() -> ElementCostRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        ElementCostRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn record(code: &str, subtitles: &[&str], order: i64, cost: Decimal) -> ElementCostRecord {
        ElementCostRecord {
            subtitle_code: code.to_string(),
            subtitles: subtitles.iter().map(|s| s.to_string()).collect(),
            row_order: order,
            unit: "Phiếu".to_string(),
            values: vec![
                ElementCostValue {
                    level: "L1".to_string(),
                    length_min: 0,
                    length_max: 14,
                    cost_value: cost,
                },
                ElementCostValue {
                    level: "L1".to_string(),
                    length_min: 15,
                    length_max: 30,
                    cost_value: cost + dec!(1000),
                },
            ],
        }
    }

    #[test]
    fn test_replace_and_find_cost() {
        let repo = repo();
        let rows = vec![
            record("C01", &["COMMUNICATION", "FW", "Điện thoại bàn"], 1, dec!(3000)),
            record("S01", &["STATIONERY", "Photo trắng đen"], 2, dec!(300.5)),
        ];
        assert_eq!(repo.replace_elements("CATI", &rows).unwrap(), 2);

        assert_eq!(
            repo.find_cost(ProjectType::Cati, "C01", "L1", 20).unwrap(),
            Some(dec!(4000))
        );
        assert_eq!(
            repo.find_cost(ProjectType::Cati, "S01", "L1", 10).unwrap(),
            Some(dec!(300.5))
        );
        assert_eq!(repo.find_cost(ProjectType::Cati, "S01", "L2", 10).unwrap(), None);
        assert_eq!(repo.find_cost(ProjectType::Clt, "S01", "L1", 10).unwrap(), None);

        // replacing drops the old rows
        repo.replace_elements("CATI", &rows[..1]).unwrap();
        assert_eq!(repo.list_elements("CATI").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_cascades() {
        let repo = repo();
        repo.replace_elements("CLT", &[record("X", &["OTHER", "Snack"], 1, dec!(10))])
            .unwrap();
        repo.save_metadata(
            "CLT",
            &ProjectMetadata {
                levels: vec!["L1".into()],
                lengths: vec!["< 15 phút".into()],
            },
        )
        .unwrap();

        assert!(repo.delete_project_type("CLT").unwrap());
        assert!(!repo.delete_project_type("CLT").unwrap());
        assert!(repo.list_elements("CLT").unwrap().is_empty());
        assert!(repo.get_metadata("CLT").unwrap().is_none());

        let conn = repo.get_conn().unwrap();
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM element_costs_values", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_metadata_round_trip() {
        let repo = repo();
        let meta = ProjectMetadata {
            levels: vec!["L1".into(), "L2".into()],
            lengths: vec!["< 15 phút".into(), "15-30 phút".into()],
        };
        repo.save_metadata("HUT", &meta).unwrap();
        assert_eq!(repo.get_metadata("HUT").unwrap(), Some(meta));
        assert_eq!(repo.list_project_types().unwrap(), vec!["HUT".to_string()]);
    }

    #[test]
    fn test_build_hierarchy_from_subtitles() {
        let repo = repo();
        repo.replace_elements(
            "F2F/D2D",
            &[
                record("Q1", &["QC", "Chi phí QC - In home"], 1, dec!(20000)),
                record("C1", &["COMMUNICATION", "FW", "Điện thoại bàn"], 2, dec!(3000)),
                record("C2", &["COMMUNICATION", "QC", "Điện thoại bàn"], 3, dec!(3000)),
            ],
        )
        .unwrap();

        let root = repo.build_hierarchy("F2F/D2D").unwrap();
        let top: Vec<&str> = root.children.keys().collect();
        assert_eq!(top, vec!["QC", "COMMUNICATION"]);

        let qc = root.children.get("QC").unwrap();
        assert_eq!(qc.elements[0].description, "Chi phí QC - In home");
        assert_eq!(qc.elements[0].costs["L1"]["< 15 phút"], dec!(20000));
        assert_eq!(qc.elements[0].costs["L1"]["15-30 phút"], dec!(21000));

        let comm = root.children.get("COMMUNICATION").unwrap();
        assert_eq!(comm.children.len(), 2);
        assert_eq!(root.element_count(), 3);
    }
}
