// ==========================================
// Такси-бэкофис - Доменный слой
// ==========================================
// Ответственность: типизированные сущности реляционной схемы
// и модель значений импорта
// ==========================================

pub mod car;
pub mod client;
pub mod driver;
pub mod geoposition;
pub mod order;
pub mod payment;
pub mod persona;
pub mod review;
pub mod types;

pub use car::{Car, CarPatch, CarType, CarTypePatch};
pub use client::{Client, ClientPatch, ClientProfile, NewClient};
pub use driver::{Driver, DriverPatch, DriverProfile, NewDriver};
pub use geoposition::{Geoposition, GeopositionPatch};
pub use order::{Order, OrderPatch, OrderStatus, OrderStatusPatch};
pub use payment::{Payment, PaymentPatch};
pub use persona::{Persona, PersonaPatch};
pub use review::{Review, ReviewPatch};
pub use types::{EntityKind, EntityRecord, Value};
