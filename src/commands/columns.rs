use crate::store::{MemoryStore, TabularStore};
use crate::Error;

/// Lists the columns of the loaded files, with their position
pub fn execute(store: &MemoryStore) -> Result<(), Error> {
    for (i, column) in store.schema().iter().enumerate() {
        println!("{:>3}  {}", i + 1, column);
    }
    Ok(())
}
