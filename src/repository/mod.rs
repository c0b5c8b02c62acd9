// ==========================================
// Такси-бэкофис - Слой хранения
// ==========================================
// Ответственность: доступ к данным (CRUD по ключу)
// Правило: слой хранения не содержит бизнес-логики
// ==========================================

pub mod car_repo;
pub mod client_repo;
pub mod datastore;
pub mod driver_repo;
pub mod error;
pub mod geoposition_repo;
pub mod order_repo;
pub mod payment_repo;
pub mod persona_repo;
pub mod review_repo;

pub use car_repo::{CarRepository, CarTypeRepository};
pub use client_repo::ClientRepository;
pub use datastore::SqliteDatastore;
pub use driver_repo::DriverRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use geoposition_repo::GeopositionRepository;
pub use order_repo::{OrderRepository, OrderStatusRepository};
pub use payment_repo::PaymentRepository;
pub use persona_repo::PersonaRepository;
pub use review_repo::ReviewRepository;
