//! Document listings and the rows a UI renders from them

use super::entities::{Document, DocumentStatus};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A validated `list()` response (Value Object).
///
/// Names are unique. If the backend reports the same name twice, the last
/// report wins and the row keeps the position of its first appearance; the
/// offending names are kept in `duplicates` so the caller can log them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentListing {
    documents: Vec<Document>,
    duplicates: Vec<String>,
}

impl DocumentListing {
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut unique: Vec<Document> = Vec::with_capacity(documents.len());
        let mut duplicates = Vec::new();

        for doc in documents {
            match index.get(&doc.name) {
                Some(&pos) => {
                    if !duplicates.contains(&doc.name) {
                        duplicates.push(doc.name.clone());
                    }
                    unique[pos] = doc;
                }
                None => {
                    index.insert(doc.name.clone(), unique.len());
                    unique.push(doc);
                }
            }
        }

        Self {
            documents: unique,
            duplicates,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

/// One line of the document panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    pub name: String,
    pub status: DocumentStatus,
    /// A delete request for this name has been sent and not yet settled.
    pub delete_pending: bool,
}

/// Merge the authoritative listing with client-local markers.
///
/// The in-flight upload shows as an `uploading` row only until the backend
/// listing contains that name.
pub fn build_rows(
    listing: &DocumentListing,
    pending_deletes: &HashSet<String>,
    uploading: Option<&str>,
) -> Vec<DocumentRow> {
    let mut rows: Vec<DocumentRow> = listing
        .documents()
        .iter()
        .map(|doc| DocumentRow {
            name: doc.name.clone(),
            status: doc.status.clone(),
            delete_pending: pending_deletes.contains(&doc.name),
        })
        .collect();

    if let Some(name) = uploading
        && !listing.contains(name)
    {
        rows.push(DocumentRow {
            name: name.to_string(),
            status: DocumentStatus::Uploading,
            delete_pending: false,
        });
    }

    rows
}
