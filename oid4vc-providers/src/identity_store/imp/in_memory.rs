use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::identity_store::{
    error::IdentityStoreError,
    model::{IdentityQuery, IdentityRecord, PidRecord, PorRecord},
    IdentityStore,
};
use crate::util::date_format::parse_date;

/// Records held in memory, loaded once at start-up from a spreadsheet export.
pub struct InMemoryIdentityStore {
    pid: Vec<PidRecord>,
    por: Vec<PorRecord>,
}

impl InMemoryIdentityStore {
    pub fn new(pid: Vec<PidRecord>, por: Vec<PorRecord>) -> Self {
        Self { pid, por }
    }

    /// Builds the store from JSON rows of the PID and POR sheets.
    ///
    /// The first row of each sheet flags mandatory columns and is skipped.
    pub fn from_sheet_rows(pid_rows: Value, por_rows: Value) -> Result<Self, IdentityStoreError> {
        Ok(Self::new(parse_sheet(pid_rows)?, parse_sheet(por_rows)?))
    }

    fn single<T>(mut matches: impl Iterator<Item = T>) -> Option<T> {
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }
}

fn parse_sheet<T: DeserializeOwned>(rows: Value) -> Result<Vec<T>, IdentityStoreError> {
    let Value::Array(rows) = rows else {
        return Err(IdentityStoreError::CouldNotLoad(
            "sheet is not an array of rows".to_owned(),
        ));
    };

    if rows.is_empty() {
        return Err(IdentityStoreError::EmptyDataset);
    }

    rows.into_iter()
        .skip(1)
        .map(|row| {
            serde_json::from_value(row).map_err(|e| IdentityStoreError::CouldNotLoad(e.to_string()))
        })
        .collect()
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find(
        &self,
        query: &IdentityQuery,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        if self.pid.is_empty() {
            return Err(IdentityStoreError::EmptyDataset);
        }

        let Some(birthdate) = parse_date(&query.birthdate) else {
            tracing::debug!("birthdate of identity query is not a date");
            return Ok(None);
        };

        let pid = Self::single(self.pid.iter().filter(|record| {
            record.family_name == query.family_name
                && record.given_name == query.given_name
                && parse_date(&record.birth_date) == Some(birthdate)
        }));

        let Some(pid) = pid else {
            return Ok(None);
        };

        let por = Self::single(self.por.iter().filter(|record| record.number == pid.number));

        Ok(por.map(|por| IdentityRecord {
            pid: pid.to_owned(),
            por: por.to_owned(),
        }))
    }
}
