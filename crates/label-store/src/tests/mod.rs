use crate::{Database, SettingsStore};

fn test_db() -> Database {
    Database::open_in_memory().expect("Failed to create test DB")
}

fn test_store() -> SettingsStore {
    SettingsStore::new(test_db())
}
