//! sea-orm entities for the Cisne relational schema.
//!
//! Profile tables (`centres`, `therapists`, `patients`) are keyed by the owning
//! `users.id`. Relationship tables are keyed by the pair of endpoint ids.

pub mod buys;
pub mod centres;
pub mod consume;
pub mod course_invoices;
pub mod courses;
pub mod employs;
pub mod invoices;
pub mod natural_persons;
pub mod patients;
pub mod pays;
pub mod posts;
pub mod publish;
pub mod resources;
pub mod service_invoices;
pub mod services;
pub mod therapists;
pub mod treats;
pub mod users;
