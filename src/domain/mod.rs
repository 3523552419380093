// Domain module: assignment inputs, the MILP model and the solver contract

pub mod models;
pub mod seating;
pub mod solver_service;
pub mod value_objects;

pub use models::*;
pub use seating::*;
pub use solver_service::*;
pub use value_objects::*;
