//! Record store contract and SQLite implementation.

use crate::db::DbError;
use crate::model::entity::EntityRef;
use crate::model::person::{MappedEntry, Person, PersonId, PERSON_TYPE};
use crate::model::relationship::{Relationship, RelationshipId, ASSIGNEE_TYPE_ATTR};
use crate::repo::mapping::MappingName;
use crate::role::has_role;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RelationshipId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "relationship not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid relationship data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Collaborator contract for people and relationship records.
pub trait RecordStore {
    fn find_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn find_relationship(&self, id: RelationshipId) -> RepoResult<Option<Relationship>>;
    /// First relationship linking `person` and `entity`, in either direction.
    fn get_relationship(
        &self,
        person: PersonId,
        entity: &EntityRef,
    ) -> RepoResult<Option<Relationship>>;
    /// Ids of every relationship linking `person` and `entity`.
    fn relationship_ids_between(
        &self,
        person: PersonId,
        entity: &EntityRef,
    ) -> RepoResult<Vec<RelationshipId>>;
    /// Re-reads a saved relationship.
    fn refresh(&self, relationship: &Relationship) -> RepoResult<Relationship>;
    /// Inserts or updates; returns the stored relationship with its id.
    fn save(&self, relationship: &Relationship) -> RepoResult<Relationship>;
    fn destroy(&self, relationship: &Relationship) -> RepoResult<()>;
    /// Committed people for `mapping` on `entity`, without duplicates.
    fn get_mapping(&self, entity: &EntityRef, mapping: &str) -> RepoResult<Vec<MappedEntry>>;
}

/// SQLite-backed record store over a migrated connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in ["people", "relationships", "relationship_attrs"] {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
                [table],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Inserts a person; used by import paths and tests.
    pub fn create_person(&self, name: &str, email: &str) -> RepoResult<Person> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "person name and email must not be blank".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT INTO people (name, email) VALUES (?1, ?2);",
            params![name.trim(), email.trim()],
        )?;
        Ok(Person::new(
            self.conn.last_insert_rowid(),
            name.trim(),
            email.trim(),
        ))
    }

    fn load_attrs(&self, id: RelationshipId) -> RepoResult<BTreeMap<String, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT attr_name, attr_value
             FROM relationship_attrs
             WHERE relationship_id = ?1;",
        )?;
        let rows = stmt.query_map([id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut attrs = BTreeMap::new();
        for row in rows {
            let (name, value): (String, String) = row?;
            attrs.insert(name, value);
        }
        Ok(attrs)
    }

    fn write_attrs(
        &self,
        tx: &rusqlite::Transaction<'_>,
        id: RelationshipId,
        attrs: &BTreeMap<String, String>,
    ) -> RepoResult<()> {
        tx.execute(
            "DELETE FROM relationship_attrs WHERE relationship_id = ?1;",
            [id],
        )?;
        for (name, value) in attrs {
            tx.execute(
                "INSERT INTO relationship_attrs (relationship_id, attr_name, attr_value)
                 VALUES (?1, ?2, ?3);",
                params![id, name, value],
            )?;
        }
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn find_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                "SELECT id, name, email FROM people WHERE id = ?1;",
                [id],
                parse_person_row,
            )
            .optional()?;
        Ok(person)
    }

    fn find_relationship(&self, id: RelationshipId) -> RepoResult<Option<Relationship>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, source_type, source_id, destination_type, destination_id, context_id
                 FROM relationships
                 WHERE id = ?1;",
                [id],
                parse_relationship_row,
            )
            .optional()?;

        match row {
            Some(mut relationship) => {
                relationship.attrs = self.load_attrs(id)?;
                Ok(Some(relationship))
            }
            None => Ok(None),
        }
    }

    fn get_relationship(
        &self,
        person: PersonId,
        entity: &EntityRef,
    ) -> RepoResult<Option<Relationship>> {
        match self.relationship_ids_between(person, entity)?.first() {
            Some(id) => self.find_relationship(*id),
            None => Ok(None),
        }
    }

    fn relationship_ids_between(
        &self,
        person: PersonId,
        entity: &EntityRef,
    ) -> RepoResult<Vec<RelationshipId>> {
        let mut stmt = self.conn.prepare(
            "SELECT id
             FROM relationships
             WHERE (source_type = ?1 AND source_id = ?2
                    AND destination_type = ?3 AND destination_id = ?4)
                OR (destination_type = ?1 AND destination_id = ?2
                    AND source_type = ?3 AND source_id = ?4)
             ORDER BY id ASC;",
        )?;
        let rows = stmt.query_map(
            params![PERSON_TYPE, person, entity.kind.as_str(), entity.id],
            |row| row.get(0),
        )?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn refresh(&self, relationship: &Relationship) -> RepoResult<Relationship> {
        let id = relationship.id.ok_or_else(|| {
            RepoError::InvalidData("cannot refresh an unsaved relationship".to_string())
        })?;
        self.find_relationship(id)?.ok_or(RepoError::NotFound(id))
    }

    fn save(&self, relationship: &Relationship) -> RepoResult<Relationship> {
        if relationship
            .assignee_type()
            .is_some_and(|value| value.trim().is_empty())
        {
            return Err(RepoError::InvalidData(format!(
                "{ASSIGNEE_TYPE_ATTR} must not be empty; destroy the relationship instead"
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        let id = match relationship.id {
            Some(id) => {
                let changed = tx.execute(
                    "UPDATE relationships
                     SET context_id = ?2,
                         updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1;",
                    params![id, relationship.context_id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(id));
                }
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO relationships (
                        source_type, source_id, destination_type, destination_id, context_id
                     ) VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        relationship.source.kind.as_str(),
                        relationship.source.id,
                        relationship.destination.kind.as_str(),
                        relationship.destination.id,
                        relationship.context_id,
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };
        self.write_attrs(&tx, id, &relationship.attrs)?;
        tx.commit()?;

        let mut saved = relationship.clone();
        saved.id = Some(id);
        Ok(saved)
    }

    fn destroy(&self, relationship: &Relationship) -> RepoResult<()> {
        let id = relationship.id.ok_or_else(|| {
            RepoError::InvalidData("cannot destroy an unsaved relationship".to_string())
        })?;
        let changed = self
            .conn
            .execute("DELETE FROM relationships WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_mapping(&self, entity: &EntityRef, mapping: &str) -> RepoResult<Vec<MappedEntry>> {
        let role = match MappingName::parse(mapping) {
            MappingName::AllPeople => None,
            MappingName::Role(role) => Some(role),
            MappingName::Unknown(name) => {
                warn!(
                    "event=mapping_resolve module=repo status=skip entity={} mapping={}",
                    entity, name
                );
                return Ok(Vec::new());
            }
        };

        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, p.email, a.attr_value
             FROM relationships r
             INNER JOIN people p
                ON (r.source_type = ?1 AND r.source_id = p.id
                    AND r.destination_type = ?2 AND r.destination_id = ?3)
                OR (r.destination_type = ?1 AND r.destination_id = p.id
                    AND r.source_type = ?2 AND r.source_id = ?3)
             LEFT JOIN relationship_attrs a
                ON a.relationship_id = r.id AND a.attr_name = ?4
             ORDER BY r.id ASC;",
        )?;
        let rows = stmt.query_map(
            params![PERSON_TYPE, entity.kind.as_str(), entity.id, ASSIGNEE_TYPE_ATTR],
            |row| {
                let roles: Option<String> = row.get(3)?;
                Ok((parse_person_row(row)?, roles))
            },
        )?;

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for row in rows {
            let (person, roles) = row?;
            let in_mapping = match role.as_deref() {
                None => true,
                Some(role) => roles.as_deref().is_some_and(|value| has_role(value, role)),
            };
            if in_mapping && seen.insert(person.id) {
                entries.push(MappedEntry::from(person));
            }
        }
        Ok(entries)
    }
}

fn parse_person_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person::new(
        row.get(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
    ))
}

fn parse_relationship_row(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: Some(row.get(0)?),
        source: EntityRef::new(row.get::<_, String>(1)?, row.get(2)?),
        destination: EntityRef::new(row.get::<_, String>(3)?, row.get(4)?),
        context_id: row.get(5)?,
        attrs: BTreeMap::new(),
    })
}
