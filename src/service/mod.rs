//! CrudService: generic CRUD over an entity store.

mod crud;
mod validation;
pub use crud::CrudService;
pub use validation::RequestValidator;
