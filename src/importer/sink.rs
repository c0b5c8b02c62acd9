// ==========================================
// Такси-бэкофис - Интерфейс приёмника записей
// ==========================================
// Шов между загрузчиком и хранилищем: загрузчик знает только
// create и границы строки. Транзакционная граница - ровно одна
// строка: откат убирает частичные записи строки, ранее
// зафиксированные строки не трогаются.
// ==========================================

use crate::domain::{EntityKind, EntityRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};

/// Приёмник типизированных записей.
///
/// Последовательность на строку: begin_row -> create (1-2 раза) ->
/// commit_row, либо rollback_row при любой неудаче.
pub trait RecordSink {
    fn begin_row(&mut self) -> RepositoryResult<()>;

    /// Вставить запись, вернуть сгенерированный (или собственный) ключ.
    fn create(&mut self, record: &EntityRecord) -> RepositoryResult<i64>;

    fn commit_row(&mut self) -> RepositoryResult<()>;

    /// Откатить частичные записи текущей строки.
    fn rollback_row(&mut self) -> RepositoryResult<()>;
}

// ==========================================
// MemorySink - приёмник в памяти
// ==========================================
// Для тестов и прогона без базы: хранит зафиксированные записи,
// умеет имитировать отказ вставки заданного вида.
#[derive(Debug, Default)]
pub struct MemorySink {
    next_id: i64,
    pending: Vec<EntityRecord>,
    committed: Vec<EntityRecord>,
    rollback_count: usize,
    fail_on: Option<EntityKind>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Приёмник, отклоняющий вставку записей заданного вида
    /// (имитация нарушения уникальности).
    pub fn failing_on(kind: EntityKind) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::default()
        }
    }

    pub fn committed(&self) -> &[EntityRecord] {
        &self.committed
    }

    pub fn rollback_count(&self) -> usize {
        self.rollback_count
    }
}

impl RecordSink for MemorySink {
    fn begin_row(&mut self) -> RepositoryResult<()> {
        self.pending.clear();
        Ok(())
    }

    fn create(&mut self, record: &EntityRecord) -> RepositoryResult<i64> {
        if self.fail_on == Some(record.kind()) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "запись {} отклонена приёмником",
                record.kind()
            )));
        }
        self.next_id += 1;
        self.pending.push(record.clone());
        Ok(self.next_id)
    }

    fn commit_row(&mut self) -> RepositoryResult<()> {
        self.committed.append(&mut self.pending);
        Ok(())
    }

    fn rollback_row(&mut self) -> RepositoryResult<()> {
        self.rollback_count += 1;
        self.pending.clear();
        Ok(())
    }
}
