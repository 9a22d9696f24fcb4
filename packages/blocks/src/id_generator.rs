use crc32fast::Hasher;

/// Stable identifier of a document, derived from its text
pub fn get_document_id(document: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(document.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block IDs within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(document: &str) -> Self {
        Self::from_seed(get_document_id(document))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
