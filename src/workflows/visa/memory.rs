//! Process-lifetime stores backed by guarded vectors.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::domain::{ApplicationId, ValidationResult, ValidationResultId};
use super::repository::{Record, RecordId, RecordStore, RepositoryError, ValidationLedger};

/// Monotonic id source shared by every caller of one store.
#[derive(Debug)]
struct Sequence(AtomicU64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// `None` once the id space is used up; `u64::MAX` is never handed out.
    fn next(&self) -> Option<u64> {
        self.0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .ok()
    }

    /// Keep the sequence ahead of an id that was inserted explicitly.
    fn observe(&self, id: u64) -> Option<()> {
        let following = id.checked_add(1)?;
        self.0.fetch_max(following, Ordering::Relaxed);
        Some(())
    }
}

const VALIDATION_RESULT_KIND: &str = "validation result";

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

/// In-memory [`RecordStore`] preserving insertion order.
#[derive(Debug)]
pub struct InMemoryStore<T: Record> {
    records: Mutex<Vec<T>>,
    sequence: Sequence,
}

impl<T: Record> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            sequence: Sequence::new(),
        }
    }
}

impl<T: Record> InMemoryStore<T> {
    /// Seed the store; later records with an id already seen are rejected.
    pub fn seeded(records: Vec<T>) -> Result<Self, RepositoryError> {
        let store = Self::default();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }
}

impl<T: Record> RecordStore<T> for InMemoryStore<T> {
    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(lock(&self.records)?.clone())
    }

    fn fetch(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|record| record.id() == id).cloned())
    }

    fn allocate_id(&self) -> Result<T::Id, RepositoryError> {
        let next = self
            .sequence
            .next()
            .ok_or(RepositoryError::Exhausted { record: T::KIND })?;
        Ok(<T::Id as RecordId>::from_sequence(next))
    }

    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let id = record.id();
        if guard.iter().any(|existing| existing.id() == id) {
            return Err(RepositoryError::conflict::<T>(id));
        }
        self.sequence
            .observe(id.sequence())
            .ok_or(RepositoryError::Exhausted { record: T::KIND })?;
        guard.push(record.clone());
        Ok(record)
    }

    fn modify(&self, id: T::Id, change: &mut dyn FnMut(&mut T)) -> Result<T, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let record = guard
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| RepositoryError::not_found::<T>(id))?;
        change(record);
        Ok(record.clone())
    }

    fn remove(&self, id: T::Id) -> Result<T, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let index = guard
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| RepositoryError::not_found::<T>(id))?;
        Ok(guard.remove(index))
    }
}

/// In-memory [`ValidationLedger`].
#[derive(Debug)]
pub struct InMemoryLedger {
    results: Mutex<Vec<ValidationResult>>,
    sequence: Sequence,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self {
            results: Mutex::new(Vec::new()),
            sequence: Sequence::new(),
        }
    }
}

impl InMemoryLedger {
    /// Seed the ledger; a result id seen twice is rejected.
    pub fn seeded(results: Vec<ValidationResult>) -> Result<Self, RepositoryError> {
        let ledger = Self::default();
        {
            let mut guard = lock(&ledger.results)?;
            for result in results {
                let id = result.id.sequence();
                if guard.iter().any(|existing| existing.id == result.id) {
                    return Err(RepositoryError::Conflict {
                        record: VALIDATION_RESULT_KIND,
                        id,
                    });
                }
                ledger.observe(id)?;
                guard.push(result);
            }
        }
        Ok(ledger)
    }

    fn observe(&self, id: u64) -> Result<(), RepositoryError> {
        self.sequence.observe(id).ok_or(RepositoryError::Exhausted {
            record: VALIDATION_RESULT_KIND,
        })
    }
}

impl ValidationLedger for InMemoryLedger {
    fn all(&self) -> Result<Vec<ValidationResult>, RepositoryError> {
        Ok(lock(&self.results)?.clone())
    }

    fn results_for(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<ValidationResult>, RepositoryError> {
        let guard = lock(&self.results)?;
        Ok(guard
            .iter()
            .filter(|result| result.application_id == application_id)
            .cloned()
            .collect())
    }

    fn allocate_id(&self) -> Result<ValidationResultId, RepositoryError> {
        let next = self.sequence.next().ok_or(RepositoryError::Exhausted {
            record: VALIDATION_RESULT_KIND,
        })?;
        Ok(ValidationResultId(next))
    }

    fn replace(
        &self,
        application_id: ApplicationId,
        batch: Vec<ValidationResult>,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.results)?;
        for result in &batch {
            self.observe(result.id.sequence())?;
        }
        guard.retain(|result| result.application_id != application_id);
        guard.extend(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::visa::domain::{CheckStatus, Client, ClientDraft, ClientId, Severity};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn client(id: u64, first_name: &str) -> Client {
        Client::from_draft(
            ClientId(id),
            ClientDraft {
                first_name: first_name.to_string(),
                last_name: "Okafor".to_string(),
                email: format!("{}@example.com", first_name.to_lowercase()),
                ..ClientDraft::default()
            },
        )
    }

    fn result(id: u64, application: u64, field: &str) -> ValidationResult {
        ValidationResult {
            id: ValidationResultId(id),
            application_id: ApplicationId(application),
            field: field.to_string(),
            status: CheckStatus::Pass,
            message: "ok".to_string(),
            severity: Severity::Info,
            category: "Eligibility".to_string(),
        }
    }

    #[test]
    fn empty_store_allocates_from_one() {
        let store = InMemoryStore::<Client>::default();
        let ids: Vec<u64> = (0..4)
            .map(|_| store.allocate_id().expect("allocates").0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn seeded_store_continues_after_highest_id() {
        let store =
            InMemoryStore::seeded(vec![client(3, "Ada"), client(7, "Bo")]).expect("seeds");
        assert_eq!(store.allocate_id().expect("allocates"), ClientId(8));
    }

    #[test]
    fn duplicate_insert_is_a_conflict() {
        let store = InMemoryStore::seeded(vec![client(1, "Ada")]).expect("seeds");
        assert_eq!(
            store.insert(client(1, "Eve")),
            Err(RepositoryError::Conflict {
                record: "client",
                id: 1
            })
        );
    }

    #[test]
    fn modify_and_remove_report_missing_ids() {
        let store = InMemoryStore::<Client>::default();
        let missing = RepositoryError::NotFound {
            record: "client",
            id: 9,
        };
        assert_eq!(store.modify(ClientId(9), &mut |_: &mut Client| {}), Err(missing.clone()));
        assert_eq!(store.remove(ClientId(9)), Err(missing));
    }

    #[test]
    fn concurrent_allocation_never_repeats_ids() {
        let store = Arc::new(InMemoryStore::<Client>::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| store.allocate_id().expect("allocates").0)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("thread completes") {
                assert!(seen.insert(id), "id {id} handed out twice");
            }
        }
        assert_eq!(seen.len(), 400);
        assert_eq!(seen.iter().max(), Some(&400));
    }

    #[test]
    fn ledger_replace_only_touches_one_application() {
        let ledger = InMemoryLedger::seeded(vec![
            result(1, 1, "document_completeness"),
            result(2, 2, "document_completeness"),
            result(3, 1, "eligibility_check"),
        ])
        .expect("seeds");
        assert_eq!(ledger.allocate_id().expect("allocates"), ValidationResultId(4));

        ledger
            .replace(ApplicationId(1), vec![result(10, 1, "passport_on_file")])
            .expect("replaces");

        let first = ledger.results_for(ApplicationId(1)).expect("reads");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].field, "passport_on_file");
        assert_eq!(ledger.results_for(ApplicationId(2)).expect("reads").len(), 1);
        assert_eq!(ledger.allocate_id().expect("allocates"), ValidationResultId(11));
    }

    #[test]
    fn seeding_the_largest_id_is_rejected_instead_of_overflowing() {
        assert_eq!(
            InMemoryStore::seeded(vec![client(u64::MAX, "Ada")]).map(|_| ()),
            Err(RepositoryError::Exhausted { record: "client" })
        );

        let store = InMemoryStore::seeded(vec![client(u64::MAX - 1, "Ada")]).expect("seeds");
        assert_eq!(
            store.allocate_id(),
            Err(RepositoryError::Exhausted { record: "client" })
        );
        assert_eq!(store.list().expect("reads").len(), 1);
    }

    #[test]
    fn ledger_seed_rejects_duplicates_and_exhausted_ids() {
        assert_eq!(
            InMemoryLedger::seeded(vec![
                result(4, 1, "document_completeness"),
                result(4, 2, "eligibility_check"),
            ])
            .map(|_| ()),
            Err(RepositoryError::Conflict {
                record: "validation result",
                id: 4
            })
        );
        assert_eq!(
            InMemoryLedger::seeded(vec![result(u64::MAX, 1, "eligibility_check")]).map(|_| ()),
            Err(RepositoryError::Exhausted {
                record: "validation result"
            })
        );
    }

    #[test]
    fn ledger_replace_with_unusable_id_keeps_previous_batch() {
        let ledger =
            InMemoryLedger::seeded(vec![result(1, 1, "document_completeness")]).expect("seeds");
        assert!(ledger
            .replace(ApplicationId(1), vec![result(u64::MAX, 1, "eligibility_check")])
            .is_err());
        let kept = ledger.results_for(ApplicationId(1)).expect("reads");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].field, "document_completeness");
    }
}
